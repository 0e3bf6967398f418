//! Runs the pipeline over every requested video id and renders the result.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::output::Formatter;
use crate::pipeline::{Resolution, TranscriptPipeline};
use crate::transcripts::{FetchedTranscript, TranscriptEngine, TranscriptError, TranscriptList};

/// Everything a batch produced, in input order per collection
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub errors: Vec<TranscriptError>,
    pub listings: Vec<TranscriptList>,
    pub transcripts: Vec<FetchedTranscript>,
}

impl BatchOutcome {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.listings.is_empty() && self.transcripts.is_empty()
    }

    /// Errors first, then listings or the formatted transcripts, separated by blank lines
    pub fn render(&self, formatter: &dyn Formatter) -> Result<String> {
        let mut sections: Vec<String> = self.errors.iter().map(|err| err.to_string()).collect();

        if !self.listings.is_empty() {
            sections.extend(self.listings.iter().map(|list| list.to_string()));
        } else if !self.transcripts.is_empty() {
            sections.push(formatter.format_transcripts(&self.transcripts)?);
        }

        Ok(sections.join("\n\n"))
    }
}

/// Spinner on stderr, or a hidden bar when `quiet`
pub fn progress_spinner(quiet: bool) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }

    let progress = ProgressBar::new_spinner();
    progress.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    progress.enable_steady_tick(Duration::from_millis(120));
    Ok(progress)
}

/// Resolve each id in turn; a failure never stops the batch
pub async fn run_batch<E: TranscriptEngine>(
    pipeline: &mut TranscriptPipeline<E>,
    video_ids: &[String],
    progress: &ProgressBar,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for (index, video_id) in video_ids.iter().enumerate() {
        progress.set_message(format!(
            "Retrieving {} ({}/{})",
            video_id,
            index + 1,
            video_ids.len()
        ));
        tracing::info!("Processing video {}", video_id);

        match pipeline.resolve(video_id).await {
            Ok(Resolution::Skipped) => {}
            Ok(Resolution::Listed(list)) => outcome.listings.push(list),
            Ok(Resolution::Fetched(transcript)) => {
                tracing::info!("Fetched {} snippets for {}", transcript.len(), video_id);
                outcome.transcripts.push(transcript);
            }
            Err(err) => {
                tracing::error!("{}", err);
                outcome.errors.push(err);
            }
        }
    }

    progress.finish_and_clear();
    outcome
}
