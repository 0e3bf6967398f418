//! Per-video transcript resolution: list, select, translate, fetch.

use crate::transcripts::{
    FetchedTranscript, RetrievalFailure, Transcript, TranscriptEngine, TranscriptError,
    TranscriptList,
};

/// Language code that matches any transcript
pub const ANY_LANGUAGE: &str = "*";

/// Rules for picking one transcript out of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionCriteria {
    /// Language codes in descending priority
    pub languages: Vec<String>,

    /// Skip transcripts generated by YouTube
    pub exclude_generated: bool,

    /// Skip manually created transcripts
    pub exclude_manually_created: bool,

    /// Translate the selected transcript to this language
    pub translate: Option<String>,
}

impl Default for SelectionCriteria {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
            exclude_generated: false,
            exclude_manually_created: false,
            translate: None,
        }
    }
}

impl SelectionCriteria {
    /// Both exclusions together leave nothing to select
    pub fn is_contradictory(&self) -> bool {
        self.exclude_generated && self.exclude_manually_created
    }

    /// Pick the first transcript matching the language priority.
    ///
    /// `*` matches the first eligible transcript in listing order.
    pub fn select<'a>(&self, list: &'a TranscriptList) -> Result<&'a Transcript, TranscriptError> {
        let eligible: Vec<&Transcript> = list
            .iter()
            .filter(|t| !(self.exclude_generated && t.is_generated))
            .filter(|t| !(self.exclude_manually_created && !t.is_generated))
            .collect();

        for code in &self.languages {
            let found = if code == ANY_LANGUAGE {
                eligible.first()
            } else {
                eligible.iter().find(|t| t.language_code == *code)
            };
            if let Some(transcript) = found {
                return Ok(*transcript);
            }
        }

        Err(TranscriptError::new(
            &list.video_id,
            RetrievalFailure::NoTranscriptFound {
                requested: self.languages.clone(),
                available: list.to_string(),
            },
        ))
    }
}

/// What a pipeline run produced for one video
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Nothing to do, the criteria exclude every transcript
    Skipped,

    /// The listing itself was requested
    Listed(TranscriptList),

    /// A transcript was selected and fetched
    Fetched(FetchedTranscript),
}

/// Resolves one video id at a time against a [`TranscriptEngine`]
pub struct TranscriptPipeline<E> {
    engine: E,
    criteria: SelectionCriteria,
    list_only: bool,
}

impl<E: TranscriptEngine> TranscriptPipeline<E> {
    pub fn new(engine: E, criteria: SelectionCriteria, list_only: bool) -> Self {
        Self {
            engine,
            criteria,
            list_only,
        }
    }

    pub fn criteria(&self) -> &SelectionCriteria {
        &self.criteria
    }

    pub async fn resolve(&mut self, video_id: &str) -> Result<Resolution, TranscriptError> {
        if self.criteria.is_contradictory() {
            return Ok(Resolution::Skipped);
        }

        let list = self.engine.list(video_id).await?;
        if self.list_only {
            return Ok(Resolution::Listed(list));
        }

        let selected = self.criteria.select(&list)?;
        tracing::debug!(
            "Selected {} transcript ({}) for {}",
            selected.language_code,
            if selected.is_generated { "generated" } else { "manual" },
            video_id
        );

        let fetched = match &self.criteria.translate {
            Some(language_code) => {
                let translated = selected.translate(language_code)?;
                self.engine.fetch(&translated).await?
            }
            None => self.engine.fetch(selected).await?,
        };

        Ok(Resolution::Fetched(fetched))
    }
}
