//! Typed async client for the Tumblr v2 API.
//!
//! # Overview
//! Every operation follows the same pipeline: validate arguments, build a
//! default-suppressing `ParameterSet`, wrap it in an immutable
//! `MethodDescriptor`, and hand that to the shared `Invoker`, which signs
//! the request, performs one network round trip, unwraps the API envelope
//! and decodes the payload.
//!
//! # Design
//! - `build_*` methods on `TumblrClient` are synchronous and return the
//!   descriptor, so validation and parameter rules are testable without I/O.
//! - Posts are a closed set of eight variants decoded through
//!   `PostRegistry`, keyed on the JSON `type` field.
//! - The network sits behind the `Transport` trait; `ReqwestTransport` is
//!   the default and tests substitute their own.
//! - Calls take a `CancelSignal`; pass `CancelSignal::none()` when the call
//!   should only be bounded by the configured timeout.

pub mod cancel;
pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod http;
pub mod invoker;
pub mod method;
pub mod oauth;
pub mod params;
pub mod posts;
pub mod types;

#[cfg(test)]
mod testing;

pub use cancel::{CancelSignal, CancelSource};
pub use client::{PostQuery, PostsQuery, TaggedQuery, TumblrClient, TumblrClientBuilder, MAX_COUNT};
pub use config::ClientConfig;
pub use decode::{Json, PostArrayDecoder, PostRegistry, ResponseDecoder};
pub use error::{DecodeError, Result, TumblrError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use invoker::Invoker;
pub use method::{ApiPath, MethodDescriptor};
pub use oauth::{ConsumerCredentials, HashProvider, HmacSha1, OAuthSigner, OAuthToken};
pub use params::{ParamValue, ParameterSet};
pub use posts::{
    AnswerPost, AudioPost, BasePost, ChatPost, DialogueLine, LinkPost, Note, PhotoInfo, PhotoPost,
    PhotoSize, PostCommon, PostContent, PostFilter, PostType, QuotePost, TextPost, VideoPlayer,
    VideoPost,
};
pub use types::{BlogInfo, BlogInfoResponse, Likes, Posts};
