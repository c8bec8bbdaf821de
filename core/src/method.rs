//! Immutable description of one API call.
//!
//! # Design
//! A `MethodDescriptor` is everything the invoker needs to issue a call:
//! where (`ApiPath`), how (`HttpMethod`), as whom (optional token) and with
//! what (`ParameterSet`). Operations build one per call and drop it after;
//! nothing mutates it once built.

use crate::http::{HttpMethod, HttpRequest};
use crate::oauth::OAuthToken;
use crate::params::ParameterSet;

/// Resource path relative to the API root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiPath {
    /// `blog/{blog_name}/{method}`
    Blog { blog_name: String, method: String },
    /// A fixed endpoint such as `tagged`.
    Global(String),
}

impl ApiPath {
    pub fn render(&self) -> String {
        match self {
            ApiPath::Blog { blog_name, method } => {
                format!("blog/{}/{method}", urlencoding::encode(blog_name))
            }
            ApiPath::Global(endpoint) => endpoint.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    path: ApiPath,
    http_method: HttpMethod,
    token: Option<OAuthToken>,
    params: ParameterSet,
}

impl MethodDescriptor {
    /// A GET against `blog/{blog_name}/{method}`.
    pub fn blog(
        blog_name: &str,
        method: &str,
        token: Option<OAuthToken>,
        params: ParameterSet,
    ) -> Self {
        Self {
            path: ApiPath::Blog {
                blog_name: blog_name.to_string(),
                method: method.to_string(),
            },
            http_method: HttpMethod::Get,
            token,
            params,
        }
    }

    /// A GET against a fixed endpoint.
    pub fn global(endpoint: &str, token: Option<OAuthToken>, params: ParameterSet) -> Self {
        Self {
            path: ApiPath::Global(endpoint.to_string()),
            http_method: HttpMethod::Get,
            token,
            params,
        }
    }

    pub fn path(&self) -> &ApiPath {
        &self.path
    }

    pub fn http_method(&self) -> HttpMethod {
        self.http_method
    }

    pub fn token(&self) -> Option<&OAuthToken> {
        self.token.as_ref()
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Render as an unsigned request rooted at `base_url`.
    pub fn to_request(&self, base_url: &str) -> HttpRequest {
        HttpRequest {
            method: self.http_method,
            url: format!("{}/{}", base_url.trim_end_matches('/'), self.path.render()),
            query: self.params.clone().into_iter().collect(),
            headers: Vec::new(),
        }
    }
}
