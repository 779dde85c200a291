use cyb3ria_core::config::resolve_against;
use cyb3ria_core::{Config, Error, Result};
use cyb3ria_storage::{CsrfTokens, KeyValueStore};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

pub const CSRF_HEADER: &str = "X-CSRF-Token";
const CONTENT_TYPE_JSON: (&str, &str) = ("Content-Type", "application/json");

/// Sends JSON requests with the stored CSRF token attached and stores the
/// token each successful response hands back.
///
/// Calls are independent. Two calls in flight at once both read the token
/// that was current when they started; whichever finishes last wins.
pub struct RequestHelper {
    transport: Arc<dyn HttpTransport>,
    tokens: CsrfTokens,
    base_url: String,
}

impl RequestHelper {
    pub fn new(transport: Arc<dyn HttpTransport>, tokens: CsrfTokens) -> Self {
        Self {
            transport,
            tokens,
            base_url: String::new(),
        }
    }

    /// Prefix applied to urls that start with `/`.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn from_config(config: &Config, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let transport = ReqwestTransport::from_config(&config.http)?;
        Ok(Self::new(Arc::new(transport), CsrfTokens::new(store)).with_base_url(&config.http.base_url))
    }

    pub fn tokens(&self) -> &CsrfTokens {
        &self.tokens
    }

    /// Header set for a request made while holding `token`.
    pub fn build_headers(token: &str) -> Vec<(String, String)> {
        let mut headers = vec![(CONTENT_TYPE_JSON.0.to_string(), CONTENT_TYPE_JSON.1.to_string())];
        if !token.is_empty() {
            headers.push((CSRF_HEADER.to_string(), token.to_string()));
        }
        headers
    }

    /// Perform one request and return the parsed JSON body.
    ///
    /// Non-2xx responses and transport failures come back as
    /// `Error::RequestFailed`; the stored token is left alone in that case.
    pub async fn send<B: Serialize + ?Sized>(&self, url: &str, method: &str, body: &B) -> Result<Value> {
        let result = self.send_inner(url, method, body).await;
        if let Err(e) = &result {
            error!(url, method, error = %e, "Request failed");
        }
        result
    }

    async fn send_inner<B: Serialize + ?Sized>(&self, url: &str, method: &str, body: &B) -> Result<Value> {
        let token = self
            .tokens
            .current()
            .map_err(|e| Error::RequestFailed(format!("Failed to read CSRF token: {}", e)))?;
        let body = serde_json::to_string(body)
            .map_err(|e| Error::RequestFailed(format!("Failed to serialize request body: {}", e)))?;

        let request = HttpRequest {
            url: resolve_against(&self.base_url, url),
            method: method.to_string(),
            headers: Self::build_headers(&token),
            body,
        };
        debug!(url = %request.url, method, with_token = !token.is_empty(), "Sending request");

        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            return Err(Error::RequestFailed(failure_message(&response)));
        }

        let data: Value = serde_json::from_str(&response.body)
            .map_err(|e| Error::RequestFailed(format!("Invalid JSON in response: {}", e)))?;
        debug!(status = response.status, "Request succeeded");

        match data.get("csrf_token").and_then(Value::as_str) {
            Some(next) => self
                .tokens
                .rotate(next)
                .map_err(|e| Error::RequestFailed(format!("Failed to store CSRF token: {}", e)))?,
            None => warn!(url, "Response carried no csrf_token, keeping the current one"),
        }
        Ok(data)
    }
}

/// Error text for a failed response: the body's `message` when it is JSON and
/// has one, otherwise a generic line with the status text.
pub fn failure_message(response: &HttpResponse) -> String {
    serde_json::from_str::<Value>(&response.body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| format!("Network response was not ok: {}", response.status_text))
}
