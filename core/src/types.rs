//! Response entities for blog-level operations.
//!
//! These mirror the `response` member of the API envelope. They are only
//! ever produced by decoding.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::posts::BasePost;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlogInfo {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
    /// Total number of posts on the blog.
    #[serde(default)]
    pub posts: u64,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ask: bool,
    #[serde(default)]
    pub ask_anon: bool,
    /// Only published when the blog shares its likes.
    pub likes: Option<u64>,
    #[serde(default)]
    pub share_likes: bool,
    #[serde(default)]
    pub is_nsfw: bool,
}

/// Raw shape of `blog/{name}/info`.
#[derive(Debug, Clone, Deserialize)]
pub struct BlogInfoResponse {
    pub blog: BlogInfo,
}

/// A page of a blog's posts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Posts {
    pub blog: BlogInfo,
    pub posts: Vec<BasePost>,
    #[serde(default)]
    pub total_posts: u64,
}

/// A page of the posts a blog has liked.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Likes {
    pub liked_posts: Vec<BasePost>,
    #[serde(default)]
    pub liked_count: u64,
}
