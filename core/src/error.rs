//! Error types for the Tumblr client.
//!
//! # Design
//! Argument errors (`Disposed`, `InvalidArgument`, `OutOfRange`) are
//! produced synchronously while a call is being built, so an invalid call
//! never reaches the transport. Everything else comes back from the single
//! network attempt the invoker makes.

use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TumblrError>;

/// Errors returned by `TumblrClient` operations.
#[derive(Debug, Error)]
pub enum TumblrError {
    /// The client was closed before the call was made.
    #[error("client has been closed")]
    Disposed,

    /// A required string argument was empty.
    #[error("argument `{name}` must not be empty")]
    InvalidArgument { name: &'static str },

    /// A numeric argument was outside its documented bounds.
    #[error("argument `{name}` = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// The API answered with a non-success status.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The hash provider could not sign the request.
    #[error("request signing failed: {0}")]
    Signing(String),

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response payload did not match the expected shape.
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// The caller's cancel signal fired while the call was pending.
    #[error("call cancelled")]
    Cancelled,

    #[error("call timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors produced while decoding response payloads.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A post object had no string `type` field.
    #[error("post is missing its `type` discriminator")]
    MissingDiscriminator,

    /// A post object named a type that no decoder is registered for.
    #[error("unknown post type `{0}`")]
    UnknownPostType(String),

    #[error("expected a JSON array of posts")]
    NotAnArray,

    /// An element of a post array failed to decode.
    #[error("post at index {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<DecodeError>,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl TumblrError {
    /// HTTP-ish status for errors that came back from the API.
    pub fn status(&self) -> Option<u16> {
        match self {
            TumblrError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
