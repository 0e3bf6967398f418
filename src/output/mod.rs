use anyhow::Result;

use crate::cli::OutputFormat;
use crate::transcripts::FetchedTranscript;

pub mod formatters;

pub use formatters::*;

/// Renders fetched transcripts as text
pub trait Formatter {
    fn format_transcript(&self, transcript: &FetchedTranscript) -> Result<String>;

    /// Render several transcripts as one document.
    ///
    /// Defaults to the single renderings separated by two blank lines.
    fn format_transcripts(&self, transcripts: &[FetchedTranscript]) -> Result<String> {
        let rendered = transcripts
            .iter()
            .map(|transcript| self.format_transcript(transcript))
            .collect::<Result<Vec<_>>>()?;
        Ok(rendered.join("\n\n\n"))
    }
}

/// Formatter registered for an output format
pub fn formatter_for(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Pretty => Box::new(PrettyFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Webvtt => Box::new(WebVttFormatter),
        OutputFormat::Srt => Box::new(SrtFormatter),
    }
}
