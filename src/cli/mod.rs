use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "youtube-transcript",
    about = "Fetch YouTube transcripts from the command line",
    version,
    long_about = "Prints the transcripts of the given YouTube videos. Requests can go out directly, \
                  through HTTP(S) proxies, through Webshare rotating proxies, or through the \
                  ScrapeOps proxy service. A failing video never stops the rest of the batch."
)]
pub struct Cli {
    /// The ids of the YouTube videos for which the transcript should be fetched
    #[arg(value_name = "VIDEO_ID")]
    pub video_ids: Vec<String>,

    /// Output format for the transcript
    #[arg(long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,

    /// Language codes in descending priority, e.g. "de en". "*" matches any language
    #[arg(long, num_args = 0.., default_values_t = [String::from("en")])]
    pub languages: Vec<String>,

    /// HTTP proxy used when fetching transcripts
    #[arg(long, default_value = "")]
    pub http_proxy: String,

    /// HTTPS proxy used when fetching transcripts
    #[arg(long, default_value = "")]
    pub https_proxy: String,

    /// Webshare proxy username
    #[arg(long, env = "WEBSHARE_PROXY_USERNAME")]
    pub webshare_proxy_username: Option<String>,

    /// Webshare proxy password
    #[arg(long, env = "WEBSHARE_PROXY_PASSWORD", hide_env_values = true)]
    pub webshare_proxy_password: Option<String>,

    /// Path to a cookies file (Mozilla/Netscape format). Recorded only, not sent with requests
    #[arg(long, value_name = "FILE")]
    pub cookies: Option<PathBuf>,

    /// ScrapeOps API key, routes every request through the ScrapeOps proxy service
    #[arg(long, env = "SCRAPEOPS_API_KEY", hide_env_values = true)]
    pub scrapeops_api_key: Option<String>,

    /// List the languages in which transcripts are available instead of printing them
    #[arg(long)]
    pub list_transcripts: bool,

    /// Do not retrieve transcripts generated by YouTube
    #[arg(long)]
    pub exclude_generated: bool,

    /// Do not retrieve manually created transcripts
    #[arg(long)]
    pub exclude_manually_created: bool,

    /// Language code to translate the transcript to (see --list-transcripts)
    #[arg(long, value_name = "LANG", default_value = "")]
    pub translate: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Indented structured dump
    Pretty,
    /// JSON array of snippets
    Json,
    /// Plain text, one line per snippet
    Text,
    /// WebVTT subtitles
    Webvtt,
    /// SRT subtitles
    Srt,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Pretty => write!(f, "pretty"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Webvtt => write!(f, "webvtt"),
            OutputFormat::Srt => write!(f, "srt"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["youtube-transcript", "abc"]);

        assert_eq!(cli.video_ids, vec!["abc"]);
        assert_eq!(cli.format, OutputFormat::Pretty);
        assert_eq!(cli.languages, vec!["en"]);
        assert_eq!(cli.http_proxy, "");
        assert_eq!(cli.translate, "");
        assert!(!cli.list_transcripts);
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Cli::try_parse_from(["youtube-transcript", "--format", "png", "abc"]).is_err());
    }

    #[test]
    fn accepts_no_video_ids() {
        let cli = Cli::parse_from(["youtube-transcript", "--format", "json"]);
        assert!(cli.video_ids.is_empty());
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
