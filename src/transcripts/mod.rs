//! Transcript model and the engine that lists and fetches transcripts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod errors;
pub mod parser;
pub mod youtube;

pub use errors::{RetrievalFailure, TranscriptError};
pub use youtube::YoutubeEngine;

/// A language a transcript can be translated to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationLanguage {
    pub language: String,
    pub language_code: String,
}

/// One timed unit of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub text: String,

    /// Offset from the start of the video, in seconds
    pub start: f64,

    /// Seconds on screen
    pub duration: f64,
}

/// Descriptor of a transcript that can be fetched
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub video_id: String,
    pub url: String,
    pub language: String,
    pub language_code: String,
    pub is_generated: bool,
    pub translation_languages: Vec<TranslationLanguage>,
}

impl Transcript {
    pub fn is_translatable(&self) -> bool {
        !self.translation_languages.is_empty()
    }

    /// Descriptor of this transcript machine-translated to `language_code`
    pub fn translate(&self, language_code: &str) -> Result<Transcript, TranscriptError> {
        if !self.is_translatable() {
            return Err(TranscriptError::new(&self.video_id, RetrievalFailure::NotTranslatable));
        }

        let target = self
            .translation_languages
            .iter()
            .find(|lang| lang.language_code == language_code)
            .ok_or_else(|| {
                TranscriptError::new(
                    &self.video_id,
                    RetrievalFailure::TranslationLanguageNotAvailable,
                )
            })?;

        Ok(Transcript {
            video_id: self.video_id.clone(),
            url: format!("{}&tlang={}", self.url, language_code),
            language: target.language.clone(),
            language_code: language_code.to_string(),
            is_generated: true,
            translation_languages: Vec::new(),
        })
    }
}

/// All transcripts available for one video, in page order
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptList {
    pub video_id: String,
    pub manually_created: Vec<Transcript>,
    pub generated: Vec<Transcript>,
    pub translation_languages: Vec<TranslationLanguage>,
}

impl TranscriptList {
    /// Manually created transcripts first, then generated ones
    pub fn iter(&self) -> impl Iterator<Item = &Transcript> {
        self.manually_created.iter().chain(self.generated.iter())
    }
}

impl fmt::Display for TranscriptList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let describe = |transcripts: &[Transcript]| {
            let lines: Vec<String> = transcripts
                .iter()
                .map(|t| {
                    format!(
                        " - {} (\"{}\"){}",
                        t.language_code,
                        t.language,
                        if t.is_translatable() { "[TRANSLATABLE]" } else { "" }
                    )
                })
                .collect();
            or_none(lines)
        };

        let translations = or_none(
            self.translation_languages
                .iter()
                .map(|lang| format!(" - {} (\"{}\")", lang.language_code, lang.language))
                .collect(),
        );

        write!(
            f,
            "For this video ({}) transcripts are available in the following languages:\n\n\
             (MANUALLY CREATED)\n{}\n\n\
             (GENERATED)\n{}\n\n\
             (TRANSLATION LANGUAGES)\n{}",
            self.video_id,
            describe(&self.manually_created),
            describe(&self.generated),
            translations,
        )
    }
}

fn or_none(lines: Vec<String>) -> String {
    if lines.is_empty() {
        "None".to_string()
    } else {
        lines.join("\n")
    }
}

/// Snippets of one fetched transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedTranscript {
    pub video_id: String,
    pub language: String,
    pub language_code: String,
    pub is_generated: bool,
    pub snippets: Vec<Snippet>,
}

impl FetchedTranscript {
    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    /// Snippets as plain `{text, start, duration}` objects
    pub fn to_raw_data(&self) -> Vec<Snippet> {
        self.snippets.clone()
    }
}

/// Lists and fetches transcripts for video ids
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptEngine: Send {
    /// Every transcript available for `video_id`
    async fn list(&mut self, video_id: &str) -> Result<TranscriptList, TranscriptError>;

    /// Download the snippets of `transcript`
    async fn fetch(&mut self, transcript: &Transcript) -> Result<FetchedTranscript, TranscriptError>;
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn translate_builds_generated_descriptor() {
        let original = transcript("abc", "en", false, true);

        let translated = original.translate("fr").unwrap();

        assert_eq!(translated.language_code, "fr");
        assert_eq!(translated.language, "French");
        assert!(translated.is_generated);
        assert!(!translated.is_translatable());
        assert!(translated.url.ends_with("&lang=en&tlang=fr"));
    }

    #[test]
    fn translate_requires_translatable_track() {
        let err = transcript("abc", "en", true, false).translate("fr").unwrap_err();

        assert_eq!(err.video_id, "abc");
        assert!(matches!(err.cause, RetrievalFailure::NotTranslatable));
    }

    #[test]
    fn translate_requires_known_language() {
        let err = transcript("abc", "en", false, true).translate("ja").unwrap_err();

        assert!(matches!(err.cause, RetrievalFailure::TranslationLanguageNotAvailable));
    }

    #[test]
    fn list_iterates_manual_before_generated() {
        let list = list("abc", &["de"], &["en", "fr"]);

        let codes: Vec<&str> = list.iter().map(|t| t.language_code.as_str()).collect();

        assert_eq!(codes, vec!["de", "en", "fr"]);
    }

    #[test]
    fn list_display() {
        let list = list("abc", &["de"], &[]);

        assert_eq!(
            list.to_string(),
            "For this video (abc) transcripts are available in the following languages:\n\n\
             (MANUALLY CREATED)\n - de (\"Language de\")[TRANSLATABLE]\n\n\
             (GENERATED)\nNone\n\n\
             (TRANSLATION LANGUAGES)\n - fr (\"French\")"
        );
    }
}
