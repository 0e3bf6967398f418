use crate::utils::watch_url;

/// A transcript could not be retrieved for one video
#[derive(thiserror::Error, Debug)]
#[error(
    "Could not retrieve a transcript for the video {}! This is most likely caused by:\n\n{cause}",
    watch_url(.video_id)
)]
pub struct TranscriptError {
    pub video_id: String,
    pub cause: RetrievalFailure,
}

impl TranscriptError {
    pub fn new(video_id: &str, cause: RetrievalFailure) -> Self {
        Self {
            video_id: video_id.to_string(),
            cause,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum RetrievalFailure {
    #[error("The video is no longer available")]
    VideoUnavailable,

    #[error(
        "You provided an invalid video id. Make sure you are using the video id and NOT the url!\n\n\
         Do NOT run: `youtube-transcript https://www.youtube.com/watch?v=1234`\n\
         Instead run: `youtube-transcript 1234`"
    )]
    InvalidVideoId,

    #[error(
        "YouTube is receiving too many requests from this IP and now requires solving a captcha \
         to continue. Use --webshare-proxy-username/--webshare-proxy-password, --http-proxy/\
         --https-proxy or --scrapeops-api-key to route requests through another IP"
    )]
    TooManyRequests,

    #[error("Subtitles are disabled for this video")]
    TranscriptsDisabled,

    #[error(
        "This video is age-restricted. Therefore, you will have to authenticate to be able to \
         retrieve transcripts for it. Cookie authentication is not supported yet"
    )]
    AgeRestricted,

    #[error(
        "No transcripts were found for any of the requested language codes: {requested:?}\n\n{available}"
    )]
    NoTranscriptFound {
        requested: Vec<String>,
        available: String,
    },

    #[error("The requested language is not translatable")]
    NotTranslatable,

    #[error("The requested translation language is not available")]
    TranslationLanguageNotAvailable,

    #[error("Failed to automatically give consent to saving cookies")]
    FailedToCreateConsentCookie,

    #[error("Request to YouTube failed: {status} {reason}")]
    RequestFailed { status: u16, reason: String },

    #[error("The data required to fetch the transcript is not parsable: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_the_video() {
        let err = TranscriptError::new("abc123", RetrievalFailure::TranscriptsDisabled);

        assert_eq!(
            err.to_string(),
            "Could not retrieve a transcript for the video https://www.youtube.com/watch?v=abc123! \
             This is most likely caused by:\n\nSubtitles are disabled for this video"
        );
    }

    #[test]
    fn no_transcript_found_lists_requested_codes() {
        let cause = RetrievalFailure::NoTranscriptFound {
            requested: vec!["en".to_string(), "de".to_string()],
            available: "listing".to_string(),
        };

        assert_eq!(
            cause.to_string(),
            "No transcripts were found for any of the requested language codes: [\"en\", \"de\"]\n\nlisting"
        );
    }
}
