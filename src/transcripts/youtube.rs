use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT_LANGUAGE};
use std::path::{Path, PathBuf};

use super::parser::{self, CONSENT_FORM_MARKER};
use super::{FetchedTranscript, RetrievalFailure, Transcript, TranscriptEngine, TranscriptError, TranscriptList};
use crate::transport::{HttpTransport, TransportResponse};
use crate::utils::WATCH_URL;

const MAX_REASON_LEN: usize = 200;

/// Transcript engine scraping YouTube watch pages and timedtext tracks.
///
/// Only issues GETs, so it works over every [`HttpTransport`], the
/// ScrapeOps shim included.
pub struct YoutubeEngine {
    transport: Box<dyn HttpTransport>,
    cookie_path: Option<PathBuf>,
}

impl YoutubeEngine {
    pub fn new(mut transport: Box<dyn HttpTransport>, cookie_path: Option<PathBuf>) -> Self {
        transport
            .headers_mut()
            .insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US"));

        if let Some(path) = &cookie_path {
            tracing::warn!("{}", unapplied_cookies_notice(path));
        }

        Self {
            transport,
            cookie_path,
        }
    }

    pub fn cookie_path(&self) -> Option<&Path> {
        self.cookie_path.as_deref()
    }

    /// Watch page HTML, accepting the cookie consent interstitial if served
    async fn fetch_video_html(&mut self, video_id: &str) -> Result<String, TranscriptError> {
        let html = self.fetch_html(video_id).await?;
        if !html.contains(CONSENT_FORM_MARKER) {
            return Ok(html);
        }

        let value = parser::consent_value(&html).ok_or_else(|| {
            TranscriptError::new(video_id, RetrievalFailure::FailedToCreateConsentCookie)
        })?;
        tracing::debug!("Accepting cookie consent for {}", video_id);
        self.transport
            .cookies_mut()
            .insert("CONSENT".to_string(), format!("YES+{}", value));

        let html = self.fetch_html(video_id).await?;
        if html.contains(CONSENT_FORM_MARKER) {
            return Err(TranscriptError::new(
                video_id,
                RetrievalFailure::FailedToCreateConsentCookie,
            ));
        }

        Ok(html)
    }

    async fn fetch_html(&mut self, video_id: &str) -> Result<String, TranscriptError> {
        let response = self.transport.get(WATCH_URL, Some(&[("v", video_id)])).await;
        check_status(&response, video_id)?;
        Ok(response.text().into_owned())
    }
}

/// Cookie files are recorded but never loaded into the transport
fn unapplied_cookies_notice(path: &Path) -> String {
    format!(
        "Cookie file {} is recorded but not applied, requests are sent without authentication",
        path.display()
    )
}

/// Map HTTP error statuses to retrieval failures
fn check_status(response: &TransportResponse, video_id: &str) -> Result<(), TranscriptError> {
    let cause = match response.status {
        429 => RetrievalFailure::TooManyRequests,
        status if status >= 400 => {
            let text = response.text();
            let reason: String = text.trim().chars().take(MAX_REASON_LEN).collect();
            RetrievalFailure::RequestFailed { status, reason }
        }
        _ => return Ok(()),
    };

    Err(TranscriptError::new(video_id, cause))
}

#[async_trait]
impl TranscriptEngine for YoutubeEngine {
    async fn list(&mut self, video_id: &str) -> Result<TranscriptList, TranscriptError> {
        tracing::debug!("Listing transcripts for {} via {}", video_id, self.transport.name());

        let html = self.fetch_video_html(video_id).await?;
        parser::parse_watch_page(video_id, &html).map_err(|cause| TranscriptError::new(video_id, cause))
    }

    async fn fetch(&mut self, transcript: &Transcript) -> Result<FetchedTranscript, TranscriptError> {
        let video_id = transcript.video_id.as_str();
        tracing::debug!("Fetching {} transcript for {}", transcript.language_code, video_id);

        let response = self.transport.get(&transcript.url, None).await;
        check_status(&response, video_id)?;

        let snippets = parser::parse_timedtext(&response.text())
            .map_err(|cause| TranscriptError::new(video_id, cause))?;

        Ok(FetchedTranscript {
            video_id: video_id.to_string(),
            language: transcript.language.clone(),
            language_code: transcript.language_code.clone(),
            is_generated: transcript.is_generated,
            snippets,
        })
    }
}
