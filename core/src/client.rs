//! Typed accessors for the Tumblr v2 API.
//!
//! # Design
//! Each operation is split into a synchronous `build_*` method and an async
//! accessor. `build_*` checks the client lifecycle, validates arguments in a
//! fixed order, builds the `ParameterSet` and returns the
//! `MethodDescriptor`; any error it returns means no request was made. The
//! accessor hands the descriptor to the shared `Invoker` together with a
//! decoder and a projection from the raw response shape to the public one.
//!
//! The client has an explicit lifecycle: `close()` flips an atomic flag
//! exactly once and every later call fails with `TumblrError::Disposed`.
//! Calls that already passed the check when `close()` runs complete
//! normally.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::cancel::CancelSignal;
use crate::config::ClientConfig;
use crate::decode::{Json, PostArrayDecoder};
use crate::error::{Result, TumblrError};
use crate::http::{ReqwestTransport, Transport};
use crate::invoker::Invoker;
use crate::method::MethodDescriptor;
use crate::oauth::{ConsumerCredentials, HashProvider, OAuthSigner, OAuthToken};
use crate::params::ParameterSet;
use crate::posts::{BasePost, PostFilter, PostType};
use crate::types::{BlogInfo, BlogInfoResponse, Likes, Posts};

/// Largest page the API serves; also its default page size.
pub const MAX_COUNT: i64 = 20;

/// Options for `TumblrClient::get_posts`.
#[derive(Debug, Clone, PartialEq)]
pub struct PostsQuery {
    pub start_index: i64,
    pub count: i64,
    pub post_type: PostType,
    pub include_reblog_info: bool,
    pub include_notes_info: bool,
    pub filter: PostFilter,
    /// Only return posts with this tag.
    pub tag: Option<String>,
}

impl Default for PostsQuery {
    fn default() -> Self {
        Self {
            start_index: 0,
            count: MAX_COUNT,
            post_type: PostType::All,
            include_reblog_info: false,
            include_notes_info: false,
            filter: PostFilter::Html,
            tag: None,
        }
    }
}

impl PostsQuery {
    pub fn start_index(mut self, start_index: i64) -> Self {
        self.start_index = start_index;
        self
    }

    pub fn count(mut self, count: i64) -> Self {
        self.count = count;
        self
    }

    pub fn post_type(mut self, post_type: PostType) -> Self {
        self.post_type = post_type;
        self
    }

    pub fn include_reblog_info(mut self, include: bool) -> Self {
        self.include_reblog_info = include;
        self
    }

    pub fn include_notes_info(mut self, include: bool) -> Self {
        self.include_notes_info = include;
        self
    }

    pub fn filter(mut self, filter: PostFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// Options for `TumblrClient::get_post`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostQuery {
    pub include_reblog_info: bool,
    pub include_notes_info: bool,
    pub filter: PostFilter,
}

impl PostQuery {
    pub fn include_reblog_info(mut self, include: bool) -> Self {
        self.include_reblog_info = include;
        self
    }

    pub fn include_notes_info(mut self, include: bool) -> Self {
        self.include_notes_info = include;
        self
    }

    pub fn filter(mut self, filter: PostFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Options for `TumblrClient::get_tagged_posts`.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedQuery {
    /// Only return posts published before this instant.
    pub before: Option<DateTime<Utc>>,
    pub count: i64,
    pub filter: PostFilter,
}

impl Default for TaggedQuery {
    fn default() -> Self {
        Self {
            before: None,
            count: MAX_COUNT,
            filter: PostFilter::Html,
        }
    }
}

impl TaggedQuery {
    pub fn before(mut self, before: DateTime<Utc>) -> Self {
        self.before = Some(before);
        self
    }

    pub fn count(mut self, count: i64) -> Self {
        self.count = count;
        self
    }

    pub fn filter(mut self, filter: PostFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Client for the Tumblr v2 API, with or without an access token.
pub struct TumblrClient {
    invoker: Invoker,
    token: Option<OAuthToken>,
    closed: AtomicBool,
}

impl TumblrClient {
    /// Client with default configuration over HTTPS.
    pub fn new(
        hash: Arc<dyn HashProvider>,
        consumer_key: &str,
        consumer_secret: &str,
        token: Option<OAuthToken>,
    ) -> Result<Self> {
        let mut builder =
            TumblrClient::builder(hash, ConsumerCredentials::new(consumer_key, consumer_secret));
        if let Some(token) = token {
            builder = builder.token(token);
        }
        builder.build()
    }

    pub fn builder(hash: Arc<dyn HashProvider>, credentials: ConsumerCredentials) -> TumblrClientBuilder {
        TumblrClientBuilder {
            hash,
            credentials,
            token: None,
            config: ClientConfig::default(),
            transport: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Release the client. Returns `true` for the call that closed it.
    pub fn close(&self) -> bool {
        let was_closed = self.closed.swap(true, Ordering::AcqRel);
        if !was_closed {
            debug!("client closed");
        }
        !was_closed
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(TumblrError::Disposed);
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Blog info
    // ---------------------------------------------------------------------

    pub fn build_blog_info(&self, blog_name: &str) -> Result<MethodDescriptor> {
        self.ensure_open()?;
        require_non_empty("blog_name", blog_name)?;
        Ok(MethodDescriptor::blog(
            blog_name,
            "info",
            self.token.clone(),
            ParameterSet::new(),
        ))
    }

    pub async fn get_blog_info(&self, blog_name: &str, cancel: &CancelSignal) -> Result<BlogInfo> {
        let method = self.build_blog_info(blog_name)?;
        self.invoker
            .call(&method, &Json::<BlogInfoResponse>::new(), |r| r.blog, cancel)
            .await
    }

    // ---------------------------------------------------------------------
    // Posts
    // ---------------------------------------------------------------------

    pub fn build_posts(&self, blog_name: &str, query: &PostsQuery) -> Result<MethodDescriptor> {
        self.ensure_open()?;
        require_non_empty("blog_name", blog_name)?;
        require_range("start_index", query.start_index, 0, i64::MAX)?;
        require_range("count", query.count, 1, MAX_COUNT)?;

        let mut params = ParameterSet::new();
        params
            .add_with_default("offset", query.start_index, 0)
            .add_with_default("limit", query.count, MAX_COUNT)
            .add_with_default("reblog_info", query.include_reblog_info, false)
            .add_with_default("notes_info", query.include_notes_info, false)
            .add_with_default("filter", query.filter, PostFilter::Html)
            .add("tag", query.tag.as_deref());

        Ok(MethodDescriptor::blog(
            blog_name,
            query.post_type.method_path(),
            self.token.clone(),
            params,
        ))
    }

    pub async fn get_posts(
        &self,
        blog_name: &str,
        query: &PostsQuery,
        cancel: &CancelSignal,
    ) -> Result<Posts> {
        let method = self.build_posts(blog_name, query)?;
        self.invoker
            .call(&method, &Json::<Posts>::new(), |posts| posts, cancel)
            .await
    }

    // ---------------------------------------------------------------------
    // Single post
    // ---------------------------------------------------------------------

    pub fn build_post(&self, blog_name: &str, id: i64, query: &PostQuery) -> Result<MethodDescriptor> {
        self.ensure_open()?;
        require_non_empty("blog_name", blog_name)?;
        require_range("id", id, 0, i64::MAX)?;

        let mut params = ParameterSet::new();
        params
            .add("id", id)
            .add_with_default("reblog_info", query.include_reblog_info, false)
            .add_with_default("notes_info", query.include_notes_info, false)
            .add_with_default("filter", query.filter, PostFilter::Html);

        Ok(MethodDescriptor::blog(
            blog_name,
            PostType::All.method_path(),
            self.token.clone(),
            params,
        ))
    }

    /// Look up one post by id. `Ok(None)` when the blog has no such post.
    pub async fn get_post(
        &self,
        blog_name: &str,
        id: i64,
        query: &PostQuery,
        cancel: &CancelSignal,
    ) -> Result<Option<BasePost>> {
        let method = self.build_post(blog_name, id, query)?;
        self.invoker
            .call(
                &method,
                &Json::<Posts>::new(),
                |posts| posts.posts.into_iter().next(),
                cancel,
            )
            .await
    }

    // ---------------------------------------------------------------------
    // Likes
    // ---------------------------------------------------------------------

    pub fn build_blog_likes(
        &self,
        blog_name: &str,
        start_index: i64,
        count: i64,
    ) -> Result<MethodDescriptor> {
        self.ensure_open()?;
        require_non_empty("blog_name", blog_name)?;
        require_range("start_index", start_index, 0, i64::MAX)?;
        require_range("count", count, 1, MAX_COUNT)?;

        let mut params = ParameterSet::new();
        params
            .add_with_default("offset", start_index, 0)
            .add_with_default("limit", count, MAX_COUNT);

        Ok(MethodDescriptor::blog(
            blog_name,
            "likes",
            self.token.clone(),
            params,
        ))
    }

    pub async fn get_blog_likes(
        &self,
        blog_name: &str,
        start_index: i64,
        count: i64,
        cancel: &CancelSignal,
    ) -> Result<Likes> {
        let method = self.build_blog_likes(blog_name, start_index, count)?;
        self.invoker
            .call(&method, &Json::<Likes>::new(), |likes| likes, cancel)
            .await
    }

    // ---------------------------------------------------------------------
    // Tagged search
    // ---------------------------------------------------------------------

    /// Documented as requiring an access token; the API itself enforces it.
    pub fn build_tagged_posts(&self, tag: &str, query: &TaggedQuery) -> Result<MethodDescriptor> {
        self.ensure_open()?;
        require_non_empty("tag", tag)?;
        require_range("count", query.count, 1, MAX_COUNT)?;

        if self.token.is_none() {
            debug!(tag, "tagged search without an access token");
        }

        let mut params = ParameterSet::new();
        params
            .add("tag", tag)
            .add("before", query.before)
            .add_with_default("limit", query.count, MAX_COUNT)
            .add_with_default("filter", query.filter, PostFilter::Html);

        Ok(MethodDescriptor::global("tagged", self.token.clone(), params))
    }

    pub async fn get_tagged_posts(
        &self,
        tag: &str,
        query: &TaggedQuery,
        cancel: &CancelSignal,
    ) -> Result<Vec<BasePost>> {
        let method = self.build_tagged_posts(tag, query)?;
        self.invoker
            .call(&method, &PostArrayDecoder::default(), |posts| posts, cancel)
            .await
    }
}

pub struct TumblrClientBuilder {
    hash: Arc<dyn HashProvider>,
    credentials: ConsumerCredentials,
    token: Option<OAuthToken>,
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl TumblrClientBuilder {
    pub fn token(mut self, token: OAuthToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the default `reqwest` transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<TumblrClient> {
        if self.config.timeout.is_zero() {
            return Err(TumblrError::OutOfRange {
                name: "timeout",
                value: 0,
                min: 1,
                max: i64::MAX,
            });
        }
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(
                &self.config.user_agent,
                self.config.timeout,
            )?),
        };
        let signer = OAuthSigner::new(self.credentials, self.hash);
        Ok(TumblrClient {
            invoker: Invoker::new(&self.config, signer, transport),
            token: self.token,
            closed: AtomicBool::new(false),
        })
    }
}

fn require_non_empty(name: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(TumblrError::InvalidArgument { name });
    }
    Ok(())
}

fn require_range(name: &'static str, value: i64, min: i64, max: i64) -> Result<()> {
    if value < min || value > max {
        return Err(TumblrError::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}
