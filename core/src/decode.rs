//! Response decoders, including the polymorphic post registry.
//!
//! # Design
//! A post's JSON shape depends on its `type` field. `PostRegistry` maps each
//! discriminator to a function that decodes the variant-specific fields;
//! the shared header is decoded separately into `PostCommon`. A discriminator
//! with no registered decoder is an error, never a fallback variant.
//!
//! The invoker is generic over `ResponseDecoder`, so each operation picks
//! how its `response` payload is turned into a typed value: `Json<T>` for
//! plain serde types, `PostArrayDecoder` for bare arrays of posts.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::DecodeError;
use crate::posts::{
    AnswerPost, AudioPost, BasePost, ChatPost, LinkPost, PhotoPost, PostCommon, PostContent,
    QuotePost, TextPost, VideoPost,
};

/// Decodes the variant-specific part of a post.
pub type VariantDecoder = fn(&Value) -> Result<PostContent, serde_json::Error>;

static GLOBAL: Lazy<PostRegistry> = Lazy::new(PostRegistry::standard);

/// Discriminator → variant decoder table.
#[derive(Clone, Default)]
pub struct PostRegistry {
    decoders: HashMap<&'static str, VariantDecoder>,
}

impl fmt::Debug for PostRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.decoders.keys().collect();
        names.sort();
        f.debug_struct("PostRegistry").field("types", &names).finish()
    }
}

impl PostRegistry {
    /// A registry that knows no post types.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry with the eight Tumblr post types.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry
            .register("text", |v| TextPost::deserialize(v).map(PostContent::Text))
            .register("quote", |v| QuotePost::deserialize(v).map(PostContent::Quote))
            .register("link", |v| LinkPost::deserialize(v).map(PostContent::Link))
            .register("answer", |v| AnswerPost::deserialize(v).map(PostContent::Answer))
            .register("video", |v| VideoPost::deserialize(v).map(PostContent::Video))
            .register("audio", |v| AudioPost::deserialize(v).map(PostContent::Audio))
            .register("photo", |v| PhotoPost::deserialize(v).map(PostContent::Photo))
            .register("chat", |v| ChatPost::deserialize(v).map(PostContent::Chat));
        registry
    }

    /// Shared standard registry used by `BasePost`'s `Deserialize` impl.
    pub fn global() -> &'static PostRegistry {
        &GLOBAL
    }

    pub fn register(&mut self, discriminator: &'static str, decoder: VariantDecoder) -> &mut Self {
        self.decoders.insert(discriminator, decoder);
        self
    }

    pub fn is_registered(&self, discriminator: &str) -> bool {
        self.decoders.contains_key(discriminator)
    }

    pub fn decode_post(&self, value: &Value) -> Result<BasePost, DecodeError> {
        let discriminator = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(DecodeError::MissingDiscriminator)?;
        let decoder = self
            .decoders
            .get(discriminator)
            .ok_or_else(|| DecodeError::UnknownPostType(discriminator.to_string()))?;

        let common = PostCommon::deserialize(value)?;
        let content = decoder(value)?;
        Ok(BasePost { common, content })
    }

    /// Decode a JSON array of posts, keeping the original order.
    pub fn decode_posts(&self, value: &Value) -> Result<Vec<BasePost>, DecodeError> {
        let items = value.as_array().ok_or(DecodeError::NotAnArray)?;
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                self.decode_post(item).map_err(|e| DecodeError::Element {
                    index,
                    source: Box::new(e),
                })
            })
            .collect()
    }
}

/// Turns the `response` member of an API envelope into a typed value.
pub trait ResponseDecoder {
    type Output;

    fn decode(&self, value: Value) -> Result<Self::Output, DecodeError>;
}

/// Plain serde decoding.
pub struct Json<T>(PhantomData<fn() -> T>);

impl<T> Json<T> {
    pub fn new() -> Self {
        Json(PhantomData)
    }
}

impl<T> Default for Json<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> ResponseDecoder for Json<T> {
    type Output = T;

    fn decode(&self, value: Value) -> Result<T, DecodeError> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Decodes a bare JSON array of mixed post types.
#[derive(Debug, Clone, Copy)]
pub struct PostArrayDecoder<'a> {
    registry: &'a PostRegistry,
}

impl<'a> PostArrayDecoder<'a> {
    pub fn new(registry: &'a PostRegistry) -> Self {
        Self { registry }
    }
}

impl Default for PostArrayDecoder<'static> {
    fn default() -> Self {
        Self::new(PostRegistry::global())
    }
}

impl ResponseDecoder for PostArrayDecoder<'_> {
    type Output = Vec<BasePost>;

    fn decode(&self, value: Value) -> Result<Vec<BasePost>, DecodeError> {
        self.registry.decode_posts(&value)
    }
}
