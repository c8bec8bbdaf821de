//! Post model: the shared post header plus the eight content variants.
//!
//! Posts never derive `Deserialize` from their JSON `type` field directly;
//! decoding goes through `decode::PostRegistry`, which reads the
//! discriminator first and then applies the variant's schema.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::decode::PostRegistry;
use crate::params::ParamValue;

/// Post variant selector used by the posts listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PostType {
    #[default]
    All,
    Text,
    Quote,
    Link,
    Answer,
    Video,
    Audio,
    Photo,
    Chat,
}

impl PostType {
    /// Every concrete variant, in registry order.
    pub const VARIANTS: [PostType; 8] = [
        PostType::Text,
        PostType::Quote,
        PostType::Link,
        PostType::Answer,
        PostType::Video,
        PostType::Audio,
        PostType::Photo,
        PostType::Chat,
    ];

    /// Method path under `blog/{name}/` for listing posts of this type.
    pub fn method_path(self) -> &'static str {
        match self {
            PostType::Text => "posts/text",
            PostType::Quote => "posts/quote",
            PostType::Link => "posts/link",
            PostType::Answer => "posts/answer",
            PostType::Video => "posts/video",
            PostType::Audio => "posts/audio",
            PostType::Photo => "posts/photo",
            PostType::Chat => "posts/chat",
            PostType::All => "posts",
        }
    }

    /// JSON `type` value; `All` has none.
    pub fn discriminator(self) -> Option<&'static str> {
        match self {
            PostType::Text => Some("text"),
            PostType::Quote => Some("quote"),
            PostType::Link => Some("link"),
            PostType::Answer => Some("answer"),
            PostType::Video => Some("video"),
            PostType::Audio => Some("audio"),
            PostType::Photo => Some("photo"),
            PostType::Chat => Some("chat"),
            PostType::All => None,
        }
    }
}

/// Body format requested from the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostFilter {
    #[default]
    Html,
    Text,
    Raw,
}

impl PostFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            PostFilter::Html => "html",
            PostFilter::Text => "text",
            PostFilter::Raw => "raw",
        }
    }
}

impl fmt::Display for PostFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ParamValue for PostFilter {
    fn to_param(&self) -> Option<String> {
        Some(self.as_str().to_string())
    }
}

/// A decoded post of any variant.
#[derive(Debug, Clone, PartialEq)]
pub struct BasePost {
    pub common: PostCommon,
    pub content: PostContent,
}

impl BasePost {
    pub fn post_type(&self) -> PostType {
        self.content.post_type()
    }
}

impl<'de> Deserialize<'de> for BasePost {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        PostRegistry::global()
            .decode_post(&value)
            .map_err(serde::de::Error::custom)
    }
}

/// Fields every post carries regardless of its variant.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PostCommon {
    pub id: u64,
    pub blog_name: String,
    #[serde(default)]
    pub post_url: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub reblog_key: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub note_count: u64,
    pub source_url: Option<String>,
    pub source_title: Option<String>,
    pub liked: Option<bool>,
    pub state: Option<String>,
    pub slug: Option<String>,
    pub short_url: Option<String>,
    // Present only when `reblog_info` was requested.
    pub reblogged_from_id: Option<String>,
    pub reblogged_from_name: Option<String>,
    pub reblogged_root_id: Option<String>,
    pub reblogged_root_name: Option<String>,
    // Present only when `notes_info` was requested.
    pub notes: Option<Vec<Note>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Note {
    #[serde(rename = "type")]
    pub kind: String,
    pub blog_name: String,
    pub blog_url: Option<String>,
}

/// Variant-specific post content.
#[derive(Debug, Clone, PartialEq)]
pub enum PostContent {
    Text(TextPost),
    Quote(QuotePost),
    Link(LinkPost),
    Answer(AnswerPost),
    Video(VideoPost),
    Audio(AudioPost),
    Photo(PhotoPost),
    Chat(ChatPost),
}

impl PostContent {
    pub fn post_type(&self) -> PostType {
        match self {
            PostContent::Text(_) => PostType::Text,
            PostContent::Quote(_) => PostType::Quote,
            PostContent::Link(_) => PostType::Link,
            PostContent::Answer(_) => PostType::Answer,
            PostContent::Video(_) => PostType::Video,
            PostContent::Audio(_) => PostType::Audio,
            PostContent::Photo(_) => PostType::Photo,
            PostContent::Chat(_) => PostType::Chat,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextPost {
    pub title: Option<String>,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuotePost {
    pub text: String,
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinkPost {
    pub title: Option<String>,
    pub url: String,
    pub description: Option<String>,
    pub excerpt: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnswerPost {
    pub asking_name: String,
    pub asking_url: Option<String>,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoPost {
    pub caption: Option<String>,
    pub permalink_url: Option<String>,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub player: Vec<VideoPlayer>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoPlayer {
    pub width: u32,
    pub embed_code: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AudioPost {
    pub caption: Option<String>,
    pub player: Option<String>,
    pub plays: Option<u64>,
    pub album_art: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub track_name: Option<String>,
    pub track_number: Option<u32>,
    pub year: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PhotoPost {
    pub caption: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(default)]
    pub photos: Vec<PhotoInfo>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PhotoInfo {
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub alt_sizes: Vec<PhotoSize>,
    pub original_size: Option<PhotoSize>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PhotoSize {
    pub width: u32,
    pub height: u32,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatPost {
    pub title: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub dialogue: Vec<DialogueLine>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DialogueLine {
    pub name: String,
    pub label: String,
    pub phrase: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_paths_match_the_api() {
        assert_eq!(PostType::Photo.method_path(), "posts/photo");
        assert_eq!(PostType::All.method_path(), "posts");
        assert_eq!(PostType::default().method_path(), "posts");
        for post_type in PostType::VARIANTS {
            let expected = format!("posts/{}", post_type.discriminator().unwrap());
            assert_eq!(post_type.method_path(), expected);
        }
    }

    #[test]
    fn filter_serializes_lower_case() {
        assert_eq!(PostFilter::default(), PostFilter::Html);
        assert_eq!(PostFilter::Raw.to_param().as_deref(), Some("raw"));
        assert_eq!(PostFilter::Text.to_string(), "text");
    }

    #[test]
    fn post_deserializes_through_the_registry() {
        let post: BasePost = serde_json::from_str(
            r#"{"type":"quote","id":3,"blog_name":"staff","timestamp":1300000000,
                "text":"Be yourself","source":"Oscar"}"#,
        )
        .unwrap();
        assert_eq!(post.post_type(), PostType::Quote);
        assert_eq!(post.common.id, 3);
        assert_eq!(post.common.timestamp.timestamp(), 1_300_000_000);
        match post.content {
            PostContent::Quote(quote) => assert_eq!(quote.text, "Be yourself"),
            other => panic!("unexpected content: {other:?}"),
        }
    }

    #[test]
    fn unknown_type_fails_deserialization() {
        let result: Result<BasePost, _> = serde_json::from_str(
            r#"{"type":"poll","id":1,"blog_name":"staff","timestamp":0}"#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown post type `poll`"), "{err}");
    }
}
