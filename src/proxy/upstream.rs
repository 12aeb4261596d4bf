/// HTTP client for forwarding admitted requests to backend services.
///
/// The gateway is a transparent relay: no retries (arbitrary methods carry no
/// idempotency guarantee) and no masking of upstream responses. Timeouts
/// bound resource pinning when a backend hangs.
use std::time::Duration;

use bytes::Bytes;

use crate::errors::AppError;

pub struct UpstreamClient {
    client: reqwest::Client,
}

impl Default for UpstreamClient {
    fn default() -> Self {
        Self::new()
    }
}

impl UpstreamClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .pool_max_idle_per_host(32)
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self { client }
    }

    /// Forwards a request and returns the upstream response, whatever its
    /// status. Only transport failures (connect refused, timeout) become
    /// gateway errors.
    pub async fn forward(
        &self,
        method: reqwest::Method,
        url: &str,
        headers: reqwest::header::HeaderMap,
        body: Bytes,
    ) -> Result<reqwest::Response, AppError> {
        self.client
            .request(method, url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(url = %url, "upstream request failed: {}", e);
                AppError::Upstream(e.to_string())
            })
    }
}
