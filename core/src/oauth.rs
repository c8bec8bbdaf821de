//! OAuth 1.0a request signing.
//!
//! The signer adds an `Authorization: OAuth ...` header computed with
//! HMAC-SHA1 over the signature base string. The hash primitive is behind
//! `HashProvider` so callers can supply their own implementation.

use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use uuid::Uuid;

use crate::error::{Result, TumblrError};
use crate::http::HttpRequest;

/// Keyed hash used to sign requests.
pub trait HashProvider: Send + Sync {
    fn hmac_sha1(&self, key: &[u8], message: &[u8]) -> Result<Vec<u8>>;
}

/// `HashProvider` backed by the RustCrypto `hmac` and `sha1` crates.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha1;

impl HashProvider for HmacSha1 {
    fn hmac_sha1(&self, key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
        let mut mac = Hmac::<Sha1>::new_from_slice(key)
            .map_err(|e| TumblrError::Signing(e.to_string()))?;
        mac.update(message);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

/// Application key pair issued when registering with the API.
#[derive(Clone, PartialEq, Eq)]
pub struct ConsumerCredentials {
    pub key: String,
    pub secret: String,
}

impl ConsumerCredentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for ConsumerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumerCredentials")
            .field("key", &self.key)
            .field("secret", &"***")
            .finish()
    }
}

/// Access token authorizing calls on behalf of a blog account.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthToken {
    pub key: String,
    pub secret: String,
}

impl OAuthToken {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthToken")
            .field("key", &self.key)
            .field("secret", &"***")
            .finish()
    }
}

#[derive(Clone)]
pub struct OAuthSigner {
    credentials: ConsumerCredentials,
    hash: Arc<dyn HashProvider>,
}

impl fmt::Debug for OAuthSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthSigner")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl OAuthSigner {
    pub fn new(credentials: ConsumerCredentials, hash: Arc<dyn HashProvider>) -> Self {
        Self { credentials, hash }
    }

    pub fn consumer_key(&self) -> &str {
        &self.credentials.key
    }

    /// Sign with a fresh nonce and the current time.
    pub fn sign(&self, request: &mut HttpRequest, token: Option<&OAuthToken>) -> Result<()> {
        let nonce = Uuid::new_v4().simple().to_string();
        self.sign_with(request, token, &nonce, Utc::now().timestamp())
    }

    pub fn sign_with(
        &self,
        request: &mut HttpRequest,
        token: Option<&OAuthToken>,
        nonce: &str,
        timestamp: i64,
    ) -> Result<()> {
        let mut oauth_params = vec![
            ("oauth_consumer_key", self.credentials.key.clone()),
            ("oauth_nonce", nonce.to_string()),
            ("oauth_signature_method", "HMAC-SHA1".to_string()),
            ("oauth_timestamp", timestamp.to_string()),
        ];
        if let Some(token) = token {
            oauth_params.push(("oauth_token", token.key.clone()));
        }
        oauth_params.push(("oauth_version", "1.0".to_string()));

        let mut all_params: Vec<(&str, &str)> = request
            .query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        all_params.extend(oauth_params.iter().map(|(k, v)| (*k, v.as_str())));

        let base = signature_base_string(request.method.as_str(), &request.url, &all_params);
        let signing_key = format!(
            "{}&{}",
            encode(&self.credentials.secret),
            encode(token.map_or("", |t| t.secret.as_str()))
        );
        let signature = BASE64.encode(self.hash.hmac_sha1(signing_key.as_bytes(), base.as_bytes())?);

        let header = oauth_params
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .chain(std::iter::once(("oauth_signature", signature.as_str())))
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        request
            .headers
            .push(("Authorization".to_string(), format!("OAuth {header}")));
        Ok(())
    }
}

/// `METHOD&enc(url)&enc(sorted, encoded params)`.
pub fn signature_base_string(method: &str, url: &str, params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort();
    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}&{}&{}", method, encode(url), encode(&normalized))
}

fn encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::http::HttpMethod;

    #[derive(Default)]
    struct RecordingHash {
        calls: Mutex<Vec<(String, String)>>,
    }

    impl HashProvider for RecordingHash {
        fn hmac_sha1(&self, key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
            self.calls.lock().unwrap().push((
                String::from_utf8_lossy(key).into_owned(),
                String::from_utf8_lossy(message).into_owned(),
            ));
            Ok(b"sig".to_vec())
        }
    }

    struct BrokenHash;

    impl HashProvider for BrokenHash {
        fn hmac_sha1(&self, _key: &[u8], _message: &[u8]) -> Result<Vec<u8>> {
            Err(TumblrError::Signing("no key material".to_string()))
        }
    }

    fn get(url: &str, query: &[(&str, &str)]) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            headers: Vec::new(),
        }
    }

    #[test]
    fn hmac_sha1_matches_known_digest() {
        let digest = HmacSha1
            .hmac_sha1(b"key", b"The quick brown fox jumps over the lazy dog")
            .unwrap();
        assert_eq!(hex::encode(digest), "de7c9b85b8b78aa6bc8a7a36f70a90701c9db4d9");
    }

    #[test]
    fn signs_the_oauth_core_example() {
        let signer = OAuthSigner::new(
            ConsumerCredentials::new("dpf43f3p2l4k3l03", "kd94hf93k423kf44"),
            Arc::new(HmacSha1),
        );
        let token = OAuthToken::new("nnch734d00sl2jdk", "pfkkdhi9sl3r4s00");
        let mut request = get(
            "http://photos.example.net/photos",
            &[("file", "vacation.jpg"), ("size", "original")],
        );
        signer
            .sign_with(&mut request, Some(&token), "kllo9940pd9333jh", 1_191_242_096)
            .unwrap();
        let header = request.header("Authorization").unwrap();
        assert!(
            header.contains(r#"oauth_signature="tR3%2BTy81lMeYAr%2FFid0kMTYa%2FWM%3D""#),
            "{header}"
        );
    }

    #[test]
    fn base_string_sorts_and_encodes_query_params() {
        let hash = Arc::new(RecordingHash::default());
        let signer = OAuthSigner::new(ConsumerCredentials::new("ck", "cs"), hash.clone());
        let mut request = get(
            "https://api.tumblr.com/v2/blog/staff/posts",
            &[("tag", "new york"), ("limit", "5")],
        );
        signer
            .sign_with(&mut request, Some(&OAuthToken::new("tk", "ts")), "abc", 1_700_000_000)
            .unwrap();

        let calls = hash.calls.lock().unwrap();
        let (key, base) = &calls[0];
        assert_eq!(key, "cs&ts");
        assert_eq!(
            base,
            "GET&https%3A%2F%2Fapi.tumblr.com%2Fv2%2Fblog%2Fstaff%2Fposts&\
             limit%3D5%26oauth_consumer_key%3Dck%26oauth_nonce%3Dabc%26\
             oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1700000000%26\
             oauth_token%3Dtk%26oauth_version%3D1.0%26tag%3Dnew%2520york"
        );
    }

    #[test]
    fn unauthenticated_requests_omit_the_token() {
        let hash = Arc::new(RecordingHash::default());
        let signer = OAuthSigner::new(ConsumerCredentials::new("ck", "cs"), hash.clone());
        let mut request = get("https://api.tumblr.com/v2/tagged", &[("tag", "lol")]);
        signer.sign_with(&mut request, None, "n", 1).unwrap();

        assert_eq!(hash.calls.lock().unwrap()[0].0, "cs&");
        let header = request.header("authorization").unwrap();
        assert!(header.starts_with("OAuth oauth_consumer_key=\"ck\""));
        assert!(!header.contains("oauth_token"));
        assert!(header.ends_with("oauth_signature=\"c2ln\""));
    }

    #[test]
    fn fresh_nonces_differ() {
        let signer = OAuthSigner::new(ConsumerCredentials::new("ck", "cs"), Arc::new(HmacSha1));
        let mut first = get("https://api.tumblr.com/v2/tagged", &[]);
        let mut second = first.clone();
        signer.sign(&mut first, None).unwrap();
        signer.sign(&mut second, None).unwrap();
        assert_ne!(first.header("Authorization"), second.header("Authorization"));
    }

    #[test]
    fn hash_failure_leaves_the_request_unsigned() {
        let signer = OAuthSigner::new(ConsumerCredentials::new("ck", "cs"), Arc::new(BrokenHash));
        let mut request = get("https://api.tumblr.com/v2/tagged", &[("tag", "lol")]);
        let err = signer.sign_with(&mut request, None, "n", 1).unwrap_err();
        assert!(matches!(err, TumblrError::Signing(_)));
        assert!(request.header("Authorization").is_none());
    }

    #[test]
    fn hmac_accepts_empty_signing_keys() {
        assert!(HmacSha1.hmac_sha1(b"", b"message").is_ok());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let token = OAuthToken::new("visible", "hidden");
        let rendered = format!("{token:?}");
        assert!(rendered.contains("visible"));
        assert!(!rendered.contains("hidden"));
    }
}
