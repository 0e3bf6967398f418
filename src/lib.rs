//! YouTube Transcript - fetch YouTube transcripts from the command line
//!
//! Lists and downloads the transcripts of YouTube videos, either directly,
//! through an HTTP(S) or Webshare proxy, or through the ScrapeOps proxy API,
//! and renders them as JSON, plain text, WebVTT or SRT.

pub mod batch;
pub mod cli;
pub mod config;
pub mod output;
pub mod pipeline;
pub mod transcripts;
pub mod transport;
pub mod utils;

pub use batch::BatchOutcome;
pub use cli::{Cli, OutputFormat};
pub use config::{ProxyConfig, RunConfig, Settings, TransportKind};
pub use pipeline::{SelectionCriteria, TranscriptPipeline};
pub use transcripts::{FetchedTranscript, TranscriptEngine, TranscriptError, YoutubeEngine};
pub use transport::{DirectTransport, HttpTransport, ScrapeOpsClient};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Build the transport selected by `config`
pub fn build_transport(config: &RunConfig) -> Result<Box<dyn HttpTransport>> {
    match &config.transport {
        TransportKind::ScrapeOps {
            api_key,
            endpoint,
            country,
        } => {
            tracing::debug!("Routing requests through ScrapeOps at {}", endpoint);
            Ok(Box::new(
                ScrapeOpsClient::new(api_key.as_str())
                    .with_endpoint(endpoint.as_str())
                    .with_country(country.as_str())
                    .with_timeout(config.timeout),
            ))
        }
        TransportKind::Direct => Ok(Box::new(DirectTransport::new(&config.proxy, config.timeout)?)),
    }
}

/// Run the whole batch and render its output
pub async fn run(config: RunConfig, quiet: bool) -> Result<String> {
    let engine = YoutubeEngine::new(build_transport(&config)?, config.cookie_path.clone());
    let mut pipeline = TranscriptPipeline::new(engine, config.criteria, config.list_transcripts);

    let progress = batch::progress_spinner(quiet)?;
    let outcome = batch::run_batch(&mut pipeline, &config.video_ids, &progress).await;

    outcome.render(output::formatter_for(config.format).as_ref())
}
