//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

pub const DEFAULT_BASE_URL: &str = "https://api.tumblr.com/v2";

/// Settings shared by every call a `TumblrClient` makes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// API root; blog methods resolve under `{base_url}/blog/{name}/`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Upper bound on a single call. Written as `timeout_ms` in config files.
    /// Must be non-zero; `TumblrClientBuilder::build` rejects zero.
    #[serde(
        rename = "timeout_ms",
        default = "default_timeout",
        deserialize_with = "duration_from_millis"
    )]
    pub timeout: Duration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("tumblr-core/", env!("CARGO_PKG_VERSION")).to_string()
}

fn duration_from_millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}
