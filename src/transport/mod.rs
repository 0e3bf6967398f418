use async_trait::async_trait;
use reqwest::header::HeaderMap;
use std::borrow::Cow;
use std::collections::BTreeMap;

pub mod direct;
pub mod scrapeops;

pub use direct::DirectTransport;
pub use scrapeops::ScrapeOpsClient;

/// Cookies held by a transport, keyed by cookie name
pub type CookieJar = BTreeMap<String, String>;

/// Query parameters passed alongside a GET
pub type QueryParams<'a> = [(&'a str, &'a str)];

/// The request a response was produced for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub method: &'static str,
    pub url: String,
}

impl RequestDescriptor {
    pub fn get(url: &str) -> Self {
        Self {
            method: "GET",
            url: url.to_string(),
        }
    }
}

/// Uniform response handed back by every transport.
///
/// Always populated: a transport never surfaces an error from the outbound
/// call itself. Failures come back as status 500 with the error text as body.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,

    /// Raw response body
    pub body: Vec<u8>,

    /// Character encoding of `body`
    pub encoding: &'static str,

    /// Effective URL, always the caller's target URL
    pub url: String,

    /// Originating request
    pub request: RequestDescriptor,
}

impl TransportResponse {
    pub fn new(status: u16, body: Vec<u8>, url: &str) -> Self {
        Self {
            status,
            body,
            encoding: "utf-8",
            url: url.to_string(),
            request: RequestDescriptor::get(url),
        }
    }

    /// Synthesize the response for a failed outbound call
    pub fn failure(url: &str, message: impl std::fmt::Display) -> Self {
        Self::new(500, message.to_string().into_bytes(), url)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Failures of an outbound call, folded into a 500 response at the boundary
#[derive(thiserror::Error, Debug)]
pub(crate) enum TransportError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to serialize {field}: {source}")]
    Serialize {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

/// Render a cookie jar as a `Cookie` header value
pub(crate) fn cookie_header(cookies: &CookieJar) -> String {
    cookies
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Outbound HTTP used by the transcript engine.
///
/// Header and cookie state lives on the instance and is shared by every call
/// made through it, so calls take `&mut self`.
#[async_trait]
pub trait HttpTransport: Send {
    /// Issue a GET to `url`, merging `params` into its query string
    async fn get(&mut self, url: &str, params: Option<&QueryParams<'_>>) -> TransportResponse;

    /// Headers sent with every request
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Cookies sent with every request
    fn cookies_mut(&mut self) -> &mut CookieJar;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}
