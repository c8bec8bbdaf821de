//! Shared invocation path for every API call.
//!
//! # Design
//! `Invoker::call` is the only place that performs I/O. It renders and signs
//! the descriptor, makes exactly one transport attempt raced against the
//! caller's cancel signal and the configured timeout, unwraps the API
//! envelope, decodes `response` with the caller's decoder, and applies the
//! caller's projection. Nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cancel::CancelSignal;
use crate::config::ClientConfig;
use crate::decode::ResponseDecoder;
use crate::error::{Result, TumblrError};
use crate::http::{HttpResponse, Transport};
use crate::method::MethodDescriptor;
use crate::oauth::OAuthSigner;

/// `{"meta": {...}, "response": ...}` wrapper around every payload.
#[derive(Debug, Deserialize)]
struct Envelope {
    meta: Option<Meta>,
    #[serde(default)]
    response: Value,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    status: u16,
    msg: String,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    detail: String,
}

pub struct Invoker {
    base_url: String,
    timeout: Duration,
    signer: OAuthSigner,
    transport: Arc<dyn Transport>,
}

impl Invoker {
    pub fn new(config: &ClientConfig, signer: OAuthSigner, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            signer,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn call<D, R, F>(
        &self,
        method: &MethodDescriptor,
        decoder: &D,
        projection: F,
        cancel: &CancelSignal,
    ) -> Result<R>
    where
        D: ResponseDecoder,
        F: FnOnce(D::Output) -> R,
    {
        let mut request = method.to_request(&self.base_url);
        self.signer.sign(&mut request, method.token())?;

        if cancel.is_cancelled() {
            debug!(url = %request.url, "call cancelled before dispatch");
            return Err(TumblrError::Cancelled);
        }

        debug!(
            method = request.method.as_str(),
            url = %request.url,
            params = request.query.len(),
            authenticated = method.token().is_some(),
            "dispatching API call"
        );
        let url = request.url.clone();

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(url = %url, "call cancelled in flight");
                return Err(TumblrError::Cancelled);
            }
            result = tokio::time::timeout(self.timeout, self.transport.execute(request)) => {
                match result {
                    Ok(Ok(response)) => response,
                    Ok(Err(e)) => {
                        warn!(url = %url, error = %e, "transport failed");
                        return Err(e);
                    }
                    Err(_) => {
                        warn!(url = %url, timeout = ?self.timeout, "call timed out");
                        return Err(TumblrError::Timeout(self.timeout));
                    }
                }
            }
        };

        let payload = unwrap_envelope(response).inspect_err(|e| {
            warn!(url = %url, error = %e, "API call failed");
        })?;
        let decoded = decoder.decode(payload).map_err(|e| {
            warn!(url = %url, error = %e, "response did not decode");
            TumblrError::Decode(e)
        })?;
        Ok(projection(decoded))
    }
}

/// Check HTTP and envelope status and return the `response` member.
fn unwrap_envelope(response: HttpResponse) -> Result<Value> {
    let envelope = serde_json::from_str::<Envelope>(&response.body);

    if !(200..300).contains(&response.status) {
        let message = match &envelope {
            Ok(envelope) => envelope_message(envelope),
            Err(_) => response.body.clone(),
        };
        return Err(TumblrError::Api {
            status: response.status,
            message,
        });
    }

    let envelope = envelope.map_err(|e| TumblrError::Decode(e.into()))?;
    if let Some(meta) = &envelope.meta {
        if !(200..300).contains(&meta.status) {
            return Err(TumblrError::Api {
                status: meta.status,
                message: envelope_message(&envelope),
            });
        }
    }
    Ok(envelope.response)
}

fn envelope_message(envelope: &Envelope) -> String {
    let msg = envelope.meta.as_ref().map_or("", |m| m.msg.as_str());
    match envelope.errors.iter().find(|e| !e.detail.is_empty()) {
        Some(error) if !msg.is_empty() => format!("{msg}: {}", error.detail),
        Some(error) => error.detail.clone(),
        None => msg.to_string(),
    }
}
