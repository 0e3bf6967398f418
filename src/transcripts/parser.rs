use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use super::{RetrievalFailure, Snippet, Transcript, TranscriptList, TranslationLanguage};
use crate::utils::parse_seconds;

pub const CONSENT_FORM_MARKER: &str = "action=\"https://consent.youtube.com/s\"";

const CAPTIONS_MARKER: &str = "\"captions\":";
const VIDEO_DETAILS_MARKER: &str = ",\"videoDetails";
const RECAPTCHA_MARKER: &str = "class=\"g-recaptcha\"";
const PLAYABILITY_MARKER: &str = "\"playabilityStatus\":";
const LOGIN_REQUIRED_MARKER: &str = "\"status\":\"LOGIN_REQUIRED\"";
const AGE_CHECK_MARKER: &str = "confirm your age";

/// `playerCaptionsTracklistRenderer` and what we read from it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerCaptions {
    player_captions_tracklist_renderer: Option<CaptionsRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionsRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
    #[serde(default)]
    translation_languages: Vec<RawTranslationLanguage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    name: Label,
    language_code: String,
    kind: Option<String>,
    #[serde(default)]
    is_translatable: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTranslationLanguage {
    language_code: String,
    language_name: Label,
}

/// YouTube renders labels either as `simpleText` or as `runs`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Label {
    simple_text: Option<String>,
    #[serde(default)]
    runs: Vec<LabelRun>,
}

#[derive(Debug, Deserialize)]
struct LabelRun {
    text: String,
}

impl Label {
    fn into_text(self) -> String {
        self.simple_text
            .unwrap_or_else(|| self.runs.into_iter().map(|run| run.text).collect())
    }
}

fn consent_value_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"name="v" value="(.*?)""#).expect("static regex"))
}

fn text_element_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<text\b[^>]*/>|<text\b([^>]*)>(.*?)</text>").expect("static regex")
    })
}

fn start_attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\bstart="([^"]*)""#).expect("static regex"))
}

fn dur_attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\bdur="([^"]*)""#).expect("static regex"))
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<[^>]*>").expect("static regex"))
}

/// Value of the consent form's `v` field, used to build the CONSENT cookie
pub fn consent_value(html: &str) -> Option<String> {
    consent_value_regex()
        .captures(html)
        .map(|caps| caps[1].to_string())
}

/// Locate the captions JSON in a watch page and build the transcript list
pub fn parse_watch_page(video_id: &str, html: &str) -> Result<TranscriptList, RetrievalFailure> {
    let captions_json = extract_captions_json(video_id, html)?;

    let captions: PlayerCaptions = serde_json::from_str(&captions_json)
        .map_err(|e| RetrievalFailure::InvalidResponse(e.to_string()))?;

    let renderer = captions
        .player_captions_tracklist_renderer
        .ok_or(RetrievalFailure::TranscriptsDisabled)?;

    if renderer.caption_tracks.is_empty() {
        return Err(RetrievalFailure::TranscriptsDisabled);
    }

    Ok(build_transcript_list(video_id, renderer))
}

fn extract_captions_json(video_id: &str, html: &str) -> Result<String, RetrievalFailure> {
    let Some((_, after_marker)) = html.split_once(CAPTIONS_MARKER) else {
        return Err(diagnose_missing_captions(video_id, html));
    };

    let captions = after_marker
        .split(VIDEO_DETAILS_MARKER)
        .next()
        .unwrap_or_default();

    Ok(captions.replace('\n', ""))
}

fn diagnose_missing_captions(video_id: &str, html: &str) -> RetrievalFailure {
    if video_id.starts_with("http://") || video_id.starts_with("https://") {
        RetrievalFailure::InvalidVideoId
    } else if html.contains(RECAPTCHA_MARKER) {
        RetrievalFailure::TooManyRequests
    } else if html.contains(LOGIN_REQUIRED_MARKER) && html.contains(AGE_CHECK_MARKER) {
        RetrievalFailure::AgeRestricted
    } else if !html.contains(PLAYABILITY_MARKER) {
        RetrievalFailure::VideoUnavailable
    } else {
        RetrievalFailure::TranscriptsDisabled
    }
}

fn build_transcript_list(video_id: &str, renderer: CaptionsRenderer) -> TranscriptList {
    let translation_languages: Vec<TranslationLanguage> = renderer
        .translation_languages
        .into_iter()
        .map(|lang| TranslationLanguage {
            language: lang.language_name.into_text(),
            language_code: lang.language_code,
        })
        .collect();

    let mut manually_created = Vec::new();
    let mut generated = Vec::new();

    for track in renderer.caption_tracks {
        let is_generated = track.kind.as_deref() == Some("asr");
        let transcript = Transcript {
            video_id: video_id.to_string(),
            url: track.base_url,
            language: track.name.into_text(),
            language_code: track.language_code,
            is_generated,
            translation_languages: if track.is_translatable {
                translation_languages.clone()
            } else {
                Vec::new()
            },
        };

        if is_generated {
            generated.push(transcript);
        } else {
            manually_created.push(transcript);
        }
    }

    TranscriptList {
        video_id: video_id.to_string(),
        manually_created,
        generated,
        translation_languages,
    }
}

/// Parse a timedtext XML document into snippets.
///
/// Elements without text are skipped. Text is entity-decoded and
/// stripped of inline markup.
pub fn parse_timedtext(xml: &str) -> Result<Vec<Snippet>, RetrievalFailure> {
    let mut snippets = Vec::new();

    for caps in text_element_regex().captures_iter(xml) {
        let (Some(attrs), Some(body)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        if body.as_str().is_empty() {
            continue;
        }
        let attrs = attrs.as_str();

        let start = start_attr_regex()
            .captures(attrs)
            .and_then(|c| parse_seconds(&c[1]))
            .ok_or_else(|| {
                RetrievalFailure::InvalidResponse(format!("text element without start: <text{}>", attrs))
            })?;
        let duration = dur_attr_regex()
            .captures(attrs)
            .and_then(|c| parse_seconds(&c[1]))
            .unwrap_or(0.0);

        // XML escaping wraps HTML escaping, so decode twice
        let decoded = html_escape::decode_html_entities(body.as_str());
        let decoded = html_escape::decode_html_entities(&decoded);
        let text = tag_regex().replace_all(&decoded, "").into_owned();

        snippets.push(Snippet { text, start, duration });
    }

    Ok(snippets)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn watch_page(captions: &serde_json::Value) -> String {
        format!(
            "<html><script>var ytInitialPlayerResponse = {{\"playabilityStatus\":{{\"status\":\"OK\"}},\
             \"captions\":{},\"videoDetails\":{{\"videoId\":\"abc\"}}}};</script></html>",
            captions
        )
    }

    pub fn captions_fixture() -> serde_json::Value {
        serde_json::json!({
            "playerCaptionsTracklistRenderer": {
                "captionTracks": [
                    {
                        "baseUrl": "https://www.youtube.com/api/timedtext?v=abc&lang=de",
                        "name": { "simpleText": "German" },
                        "languageCode": "de",
                        "isTranslatable": true
                    },
                    {
                        "baseUrl": "https://www.youtube.com/api/timedtext?v=abc&lang=en&kind=asr",
                        "name": { "runs": [{ "text": "English " }, { "text": "(auto-generated)" }] },
                        "languageCode": "en",
                        "kind": "asr",
                        "isTranslatable": false
                    }
                ],
                "translationLanguages": [
                    { "languageCode": "fr", "languageName": { "simpleText": "French" } }
                ]
            }
        })
    }

    #[test]
    fn parses_caption_tracks() {
        let html = watch_page(&captions_fixture());

        let list = parse_watch_page("abc", &html).unwrap();

        assert_eq!(list.manually_created.len(), 1);
        assert_eq!(list.generated.len(), 1);

        let german = &list.manually_created[0];
        assert_eq!(german.language, "German");
        assert_eq!(german.language_code, "de");
        assert!(german.is_translatable());
        assert_eq!(german.url, "https://www.youtube.com/api/timedtext?v=abc&lang=de");

        let english = &list.generated[0];
        assert_eq!(english.language, "English (auto-generated)");
        assert!(english.is_generated);
        assert!(!english.is_translatable());

        assert_eq!(list.translation_languages[0].language_code, "fr");
    }

    #[test]
    fn missing_tracks_means_disabled() {
        let html = watch_page(&serde_json::json!({ "playerCaptionsTracklistRenderer": {} }));

        assert!(matches!(
            parse_watch_page("abc", &html),
            Err(RetrievalFailure::TranscriptsDisabled)
        ));
    }

    #[test]
    fn diagnoses_pages_without_captions() {
        let disabled = "<html>\"playabilityStatus\":{\"status\":\"OK\"}</html>";
        let unavailable = "<html>nothing here</html>";
        let captcha = "<div class=\"g-recaptcha\"></div>";
        let age = "\"playabilityStatus\":{\"status\":\"LOGIN_REQUIRED\",\"reason\":\"Sign in to confirm your age\"}";

        assert!(matches!(
            parse_watch_page("abc", disabled),
            Err(RetrievalFailure::TranscriptsDisabled)
        ));
        assert!(matches!(
            parse_watch_page("abc", unavailable),
            Err(RetrievalFailure::VideoUnavailable)
        ));
        assert!(matches!(
            parse_watch_page("abc", captcha),
            Err(RetrievalFailure::TooManyRequests)
        ));
        assert!(matches!(
            parse_watch_page("abc", age),
            Err(RetrievalFailure::AgeRestricted)
        ));
        assert!(matches!(
            parse_watch_page("https://www.youtube.com/watch?v=abc", unavailable),
            Err(RetrievalFailure::InvalidVideoId)
        ));
    }

    #[test]
    fn broken_captions_json_is_invalid_response() {
        let html = "\"captions\":{not json,\"videoDetails\"";

        assert!(matches!(
            parse_watch_page("abc", html),
            Err(RetrievalFailure::InvalidResponse(_))
        ));
    }

    #[test]
    fn extracts_consent_value() {
        let html = r#"<form action="https://consent.youtube.com/s"><input type="hidden" name="v" value="cb.20210328-17-p0"></form>"#;

        assert!(html.contains(CONSENT_FORM_MARKER));
        assert_eq!(consent_value(html).as_deref(), Some("cb.20210328-17-p0"));
        assert_eq!(consent_value("<form></form>"), None);
    }

    #[test]
    fn parses_timedtext() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript>
            <text start="0" dur="1.54">Hey, this is just a test</text>
            <text start="1.54" dur="4.16">this is &lt;i&gt;not&lt;/i&gt; the original transcript</text>
            <text start="5.7" dur="0.5"/>
            <text start="6.0">it&amp;#39;s multi
line</text>
        </transcript>"#;

        let snippets = parse_timedtext(xml).unwrap();

        assert_eq!(snippets.len(), 3);
        assert_eq!(snippets[0].text, "Hey, this is just a test");
        assert_eq!(snippets[0].duration, 1.54);
        assert_eq!(snippets[1].text, "this is not the original transcript");
        assert_eq!(snippets[1].start, 1.54);
        assert_eq!(snippets[2].text, "it's multi\nline");
        assert_eq!(snippets[2].start, 6.0);
        assert_eq!(snippets[2].duration, 0.0);
    }

    #[test]
    fn skips_text_elements_without_body() {
        let xml = r#"<transcript><text start="1" dur="1"></text><text start="2" dur="1">kept</text></transcript>"#;

        let snippets = parse_timedtext(xml).unwrap();

        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].text, "kept");
        assert_eq!(snippets[0].start, 2.0);
    }

    #[test]
    fn timedtext_without_start_is_invalid() {
        assert!(matches!(
            parse_timedtext("<transcript><text dur=\"1\">x</text></transcript>"),
            Err(RetrievalFailure::InvalidResponse(_))
        ));
    }
}
