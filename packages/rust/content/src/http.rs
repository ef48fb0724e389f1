//! HTTP content store: `GET <base_url>/<id>.md`.

use std::time::Duration;

use async_trait::async_trait;
use monotone_shared::{MonotoneError, Result, RouteParam};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::{ContentResolver, require_id};

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 3;

/// Maximum response size we accept (10 MB).
const MAX_RESPONSE_SIZE: u64 = 10 * 1024 * 1024;

/// User-Agent string for content requests.
const USER_AGENT: &str = concat!("Monotone/", env!("CARGO_PKG_VERSION"));

/// Resolver fetching tutorial bodies from a static file server.
#[derive(Debug, Clone)]
pub struct HttpResolver {
    base: Url,
    client: Client,
}

impl HttpResolver {
    /// Create a resolver for `base_url`. The timeout covers the whole request.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| MonotoneError::config(format!("invalid base_url '{base_url}': {e}")))?;

        // `Url::join` replaces the last segment unless the path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .build()
            .map_err(|e| MonotoneError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { base, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url_for(&self, file: &str) -> Result<Url> {
        self.base
            .join(file)
            .map_err(|e| MonotoneError::unavailable(format!("cannot build URL for {file}: {e}")))
    }
}

#[async_trait]
impl ContentResolver for HttpResolver {
    #[instrument(skip_all, fields(param = %param, base = %self.base))]
    async fn resolve(&self, param: &RouteParam) -> Result<String> {
        let id = require_id(param)?;
        let url = self.url_for(&format!("{id}.md"))?;

        let mut response = self.client.get(url.clone()).send().await.map_err(|e| {
            warn!(%url, error = %e, timeout = e.is_timeout(), "content request failed");
            if e.is_timeout() {
                MonotoneError::unavailable(format!("{url}: timed out"))
            } else {
                MonotoneError::unavailable(format!("{url}: {e}"))
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(%url, "tutorial not on server");
            return Err(MonotoneError::not_found(param.as_str()));
        }
        if !status.is_success() {
            warn!(%url, %status, "content request rejected");
            return Err(MonotoneError::unavailable(format!("{url}: HTTP {status}")));
        }

        if let Some(len) = response.content_length() {
            if len > MAX_RESPONSE_SIZE {
                return Err(MonotoneError::unavailable(format!(
                    "{url}: response too large ({len} bytes, max {MAX_RESPONSE_SIZE})"
                )));
            }
        }

        // Content-Length is absent for chunked responses; enforce the cap
        // on the bytes actually received.
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            MonotoneError::unavailable(format!("{url}: failed to read body: {e}"))
        })? {
            if (body.len() + chunk.len()) as u64 > MAX_RESPONSE_SIZE {
                warn!(%url, "content response exceeded size cap");
                return Err(MonotoneError::unavailable(format!(
                    "{url}: response too large (over {MAX_RESPONSE_SIZE} bytes)"
                )));
            }
            body.extend_from_slice(&chunk);
        }

        let body = String::from_utf8(body)
            .map_err(|_| MonotoneError::unavailable(format!("{url}: body is not valid UTF-8")))?;

        debug!(%url, len = body.len(), "tutorial fetched");
        Ok(body)
    }

    fn name(&self) -> &str {
        "http"
    }
}
