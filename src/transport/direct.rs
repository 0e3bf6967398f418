use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONNECTION, COOKIE};
use reqwest::Client;
use std::time::Duration;

use super::{
    cookie_header, CookieJar, HttpTransport, QueryParams, RequestDescriptor, TransportError,
    TransportResponse,
};
use crate::config::ProxyConfig;
use crate::Result;

/// Plain reqwest transport, optionally routed through an HTTP(S) proxy
pub struct DirectTransport {
    client: Client,
    timeout: Duration,
    headers: HeaderMap,
    cookies: CookieJar,
}

impl DirectTransport {
    pub fn new(proxy: &ProxyConfig, timeout: Duration) -> Result<Self> {
        let mut builder = Client::builder();
        for proxy in proxy.reqwest_proxies()? {
            builder = builder.proxy(proxy);
        }

        let mut headers = HeaderMap::new();
        // Webshare rotates the exit IP per connection
        if proxy.prevents_keep_alive() {
            headers.insert(CONNECTION, HeaderValue::from_static("close"));
        }

        Ok(Self {
            client: builder.build()?,
            timeout,
            headers,
            cookies: CookieJar::new(),
        })
    }

    async fn send(
        &self,
        url: &str,
        params: Option<&QueryParams<'_>>,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let mut request = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .timeout(self.timeout);

        if let Some(params) = params {
            request = request.query(params);
        }

        if !self.cookies.is_empty() {
            request = request.header(COOKIE, HeaderValue::from_str(&cookie_header(&self.cookies))?);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let effective_url = response.url().to_string();
        let body = response.bytes().await?.to_vec();

        Ok(TransportResponse {
            status,
            body,
            encoding: "utf-8",
            url: effective_url,
            request: RequestDescriptor::get(url),
        })
    }
}

#[async_trait]
impl HttpTransport for DirectTransport {
    async fn get(&mut self, url: &str, params: Option<&QueryParams<'_>>) -> TransportResponse {
        tracing::debug!("GET {}", url);

        match self.send(url, params).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Request to {} failed: {}", url, e);
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
        "direct"
    }
}
