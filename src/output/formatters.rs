use anyhow::{Context, Result};

use super::Formatter;
use crate::transcripts::{FetchedTranscript, Snippet};
use crate::utils::format_timestamp;

/// Indented JSON dump, the default
pub struct PrettyFormatter;

impl Formatter for PrettyFormatter {
    fn format_transcript(&self, transcript: &FetchedTranscript) -> Result<String> {
        serde_json::to_string_pretty(&transcript.to_raw_data())
            .context("Failed to serialize transcript")
    }

    fn format_transcripts(&self, transcripts: &[FetchedTranscript]) -> Result<String> {
        let raw: Vec<Vec<Snippet>> = transcripts.iter().map(|t| t.to_raw_data()).collect();
        serde_json::to_string_pretty(&raw).context("Failed to serialize transcripts")
    }
}

/// Compact JSON array of `{text, start, duration}`
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_transcript(&self, transcript: &FetchedTranscript) -> Result<String> {
        serde_json::to_string(&transcript.to_raw_data()).context("Failed to serialize transcript")
    }

    fn format_transcripts(&self, transcripts: &[FetchedTranscript]) -> Result<String> {
        let raw: Vec<Vec<Snippet>> = transcripts.iter().map(|t| t.to_raw_data()).collect();
        serde_json::to_string(&raw).context("Failed to serialize transcripts")
    }
}

/// Snippet text only, one per line
pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_transcript(&self, transcript: &FetchedTranscript) -> Result<String> {
        let lines: Vec<&str> = transcript.snippets.iter().map(|s| s.text.as_str()).collect();
        Ok(lines.join("\n"))
    }
}

pub struct WebVttFormatter;

impl Formatter for WebVttFormatter {
    fn format_transcript(&self, transcript: &FetchedTranscript) -> Result<String> {
        let cues: Vec<String> = cue_times(&transcript.snippets)
            .map(|(snippet, start, end)| {
                format!(
                    "{} --> {}\n{}",
                    format_timestamp(start, '.'),
                    format_timestamp(end, '.'),
                    snippet.text
                )
            })
            .collect();

        Ok(format!("WEBVTT\n\n{}\n", cues.join("\n\n")))
    }
}

pub struct SrtFormatter;

impl Formatter for SrtFormatter {
    fn format_transcript(&self, transcript: &FetchedTranscript) -> Result<String> {
        let cues: Vec<String> = cue_times(&transcript.snippets)
            .enumerate()
            .map(|(i, (snippet, start, end))| {
                format!(
                    "{}\n{} --> {}\n{}",
                    i + 1,
                    format_timestamp(start, ','),
                    format_timestamp(end, ','),
                    snippet.text
                )
            })
            .collect();

        Ok(format!("{}\n", cues.join("\n\n")))
    }
}

/// Cue bounds, clipping each cue so it ends before the next one starts
fn cue_times(snippets: &[Snippet]) -> impl Iterator<Item = (&Snippet, f64, f64)> {
    snippets.iter().enumerate().map(move |(i, snippet)| {
        let mut end = snippet.start + snippet.duration;
        if let Some(next) = snippets.get(i + 1) {
            if next.start < end {
                end = next.start;
            }
        }
        (snippet, snippet.start, end)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::output::formatter_for;

    fn transcript() -> FetchedTranscript {
        let snippet = |text: &str, start: f64, duration: f64| Snippet {
            text: text.to_string(),
            start,
            duration,
        };

        FetchedTranscript {
            video_id: "abc".to_string(),
            language: "English".to_string(),
            language_code: "en".to_string(),
            is_generated: false,
            snippets: vec![
                snippet("Test line 1", 0.0, 1.5),
                snippet("line between", 1.5, 2.0),
                snippet("testing the end line", 2.5, 3.25),
            ],
        }
    }

    #[test]
    fn json_parses_back_to_snippets() {
        let content = JsonFormatter.format_transcript(&transcript()).unwrap();

        let parsed: Vec<Snippet> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, transcript().snippets);
        assert!(!content.contains('\n'));
    }

    #[test]
    fn json_wraps_multiple_transcripts_in_array() {
        let content = JsonFormatter
            .format_transcripts(&[transcript(), transcript()])
            .unwrap();

        let parsed: Vec<Vec<Snippet>> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1][2].text, "testing the end line");
    }

    #[test]
    fn pretty_is_indented_json() {
        let content = PrettyFormatter.format_transcript(&transcript()).unwrap();

        assert!(content.starts_with("[\n  {"));
        let parsed: Vec<Snippet> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 3);
    }

    #[test]
    fn text_has_one_line_per_snippet() {
        let content = TextFormatter.format_transcript(&transcript()).unwrap();

        assert_eq!(content, "Test line 1\nline between\ntesting the end line");
    }

    #[test]
    fn text_separates_transcripts() {
        let content = TextFormatter
            .format_transcripts(&[transcript(), transcript()])
            .unwrap();

        assert_eq!(content.matches("\n\n\n").count(), 1);
        assert!(content.starts_with("Test line 1\n"));
    }

    #[test]
    fn webvtt_cues() {
        let content = WebVttFormatter.format_transcript(&transcript()).unwrap();
        let lines: Vec<&str> = content.split('\n').collect();

        assert_eq!(lines[0], "WEBVTT");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "00:00:00.000 --> 00:00:01.500");
        assert_eq!(lines[lines.len() - 2], "testing the end line");
        assert_eq!(lines[lines.len() - 1], "");
        // overlapping cue is clipped to the next start
        assert!(content.contains("00:00:01.500 --> 00:00:02.500\nline between"));
    }

    #[test]
    fn srt_numbers_cues() {
        let content = SrtFormatter.format_transcript(&transcript()).unwrap();

        assert!(content.starts_with("1\n00:00:00,000 --> 00:00:01,500\nTest line 1\n\n2\n"));
        assert!(content.ends_with("3\n00:00:02,500 --> 00:00:05,750\ntesting the end line\n"));
    }

    #[test]
    fn loader_covers_every_format() {
        for format in [
            OutputFormat::Pretty,
            OutputFormat::Json,
            OutputFormat::Text,
            OutputFormat::Webvtt,
            OutputFormat::Srt,
        ] {
            assert!(formatter_for(format).format_transcript(&transcript()).is_ok());
        }

        let json = formatter_for(OutputFormat::Json)
            .format_transcript(&transcript())
            .unwrap();
        assert!(json.starts_with("[{\"text\":\"Test line 1\""));
    }
}
