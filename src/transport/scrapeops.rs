//! Transport backed by the ScrapeOps proxy API.
//!
//! ScrapeOps fetches the target URL on our behalf and wraps the page in a
//! JSON envelope. [`ScrapeOpsClient`] unwraps it again so the transcript
//! engine sees what looks like a direct fetch of the original URL.
//!
//! Forwarded headers are JSON-encoded with lowercase names, as stored in
//! the `HeaderMap`.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

use super::{CookieJar, HttpTransport, QueryParams, TransportError, TransportResponse};

pub const SCRAPEOPS_ENDPOINT: &str = "https://proxy.scrapeops.io/v1/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_COUNTRY: &str = "us";

const YOUTUBE_HOSTS: &[&str] = &["youtube.com", "www.youtube.com", "m.youtube.com", "youtu.be"];

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// ScrapeOps-backed [`HttpTransport`]
pub struct ScrapeOpsClient {
    api_key: String,
    endpoint: String,
    country: String,
    timeout: Duration,
    client: Client,
    headers: HeaderMap,
    cookies: CookieJar,
}

impl ScrapeOpsClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: SCRAPEOPS_ENDPOINT.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            timeout: DEFAULT_TIMEOUT,
            client: Client::new(),
            headers: HeaderMap::new(),
            cookies: CookieJar::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    /// Assemble the query parameters for the ScrapeOps call.
    ///
    /// Backfills default browser headers into `self.headers` when targeting
    /// YouTube, so they stick for later calls.
    fn proxy_params(
        &mut self,
        url: &str,
        params: Option<&QueryParams<'_>>,
    ) -> std::result::Result<Vec<(&'static str, String)>, TransportError> {
        let is_youtube = is_youtube_url(url);

        let mut proxy_params = vec![
            ("api_key", self.api_key.clone()),
            ("url", merge_query(url, params)),
            ("optimize_request", "true".to_string()),
            ("render_js", "false".to_string()),
            ("keep_headers", "true".to_string()),
            ("country", self.country.clone()),
        ];

        if is_youtube {
            proxy_params.push(("premium", "true".to_string()));
            proxy_params.push(("browser_type", "chrome".to_string()));
        }

        if !self.headers.is_empty() {
            if is_youtube {
                if !self.headers.contains_key(USER_AGENT) {
                    self.headers
                        .insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
                }
                if !self.headers.contains_key(ACCEPT_LANGUAGE) {
                    self.headers
                        .insert(ACCEPT_LANGUAGE, HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE));
                }
            }

            let headers: BTreeMap<&str, String> = self
                .headers
                .iter()
                .map(|(name, value)| {
                    (name.as_str(), String::from_utf8_lossy(value.as_bytes()).into_owned())
                })
                .collect();
            let encoded = serde_json::to_string(&headers)
                .map_err(|source| TransportError::Serialize { field: "headers", source })?;
            proxy_params.push(("headers", encoded));
        }

        if !self.cookies.is_empty() {
            let encoded = serde_json::to_string(&self.cookies)
                .map_err(|source| TransportError::Serialize { field: "cookies", source })?;
            proxy_params.push(("cookies", encoded));
        }

        Ok(proxy_params)
    }

    async fn forward(
        &mut self,
        url: &str,
        params: Option<&QueryParams<'_>>,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let proxy_params = self.proxy_params(url, params)?;

        let upstream = self
            .client
            .get(&self.endpoint)
            .query(&proxy_params)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = upstream.status().as_u16();
        tracing::debug!("ScrapeOps API called with response status: {}", status);

        let raw = upstream.bytes().await?.to_vec();

        if status != 200 {
            tracing::error!("ScrapeOps API returned error status: {}", status);
            return Ok(TransportResponse::new(status, raw, url));
        }

        Ok(TransportResponse::new(200, unwrap_envelope(raw), url))
    }
}

/// Pull the page out of a ScrapeOps JSON envelope, or keep the raw bytes
fn unwrap_envelope(raw: Vec<u8>) -> Vec<u8> {
    match serde_json::from_slice::<Value>(&raw) {
        Ok(envelope) => match envelope.get("html").and_then(Value::as_str) {
            Some(html) => html.as_bytes().to_vec(),
            None => {
                tracing::warn!("No 'html' field in ScrapeOps JSON response, using raw content");
                raw
            }
        },
        Err(_) => {
            tracing::debug!("ScrapeOps response is not JSON, using as raw HTML");
            raw
        }
    }
}

#[async_trait]
impl HttpTransport for ScrapeOpsClient {
    async fn get(&mut self, url: &str, params: Option<&QueryParams<'_>>) -> TransportResponse {
        tracing::debug!("Making GET request to {} through ScrapeOps", url);

        match self.forward(url, params).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Error making ScrapeOps request: {}", e);
                TransportResponse::failure(url, e)
            }
        }
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn cookies_mut(&mut self) -> &mut CookieJar {
        &mut self.cookies
    }

    fn name(&self) -> &'static str {
        "scrapeops"
    }
}

/// Whether `url` points at a YouTube host
pub fn is_youtube_url(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_ascii_lowercase))
        .map(|host| YOUTUBE_HOSTS.contains(&host.as_str()))
        .unwrap_or(false)
}

/// Append `params` to the query string of `url`.
///
/// Plain string concatenation: keys already in `url` are neither
/// deduplicated nor escaped.
pub fn merge_query(url: &str, params: Option<&QueryParams<'_>>) -> String {
    match params {
        Some(params) if !params.is_empty() => {
            let query = params
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect::<Vec<_>>()
                .join("&");
            let separator = if url.contains('?') { '&' } else { '?' };
            format!("{}{}{}", url, separator, query)
        }
        _ => url.to_string(),
    }
}
