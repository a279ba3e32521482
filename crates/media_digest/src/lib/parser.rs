//! # Yt Parser
//!
//! This module extracts caption data from YouTube responses: the innertube
//! API key embedded in a watch page, the caption track list of the innertube
//! `player` response, and caption events in the `json3` timed-text format.

use std::{ops::Deref, sync::LazyLock};

use itertools::Itertools;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::{error::TranscriptError, types::TranscriptSegment};

static INNERTUBE_API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).unwrap()
});

static FMT_PARAM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&fmt=[^&]*").unwrap());

/// A caption track listed in the player response
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    /// `"asr"` for auto-generated tracks
    pub kind: Option<String>,
}

impl CaptionTrack {
    pub fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }

    /// Track URL asking for the `json3` timed-text format
    pub fn json3_url(&self) -> String {
        let base = FMT_PARAM_RE.replace_all(&self.base_url, "");
        format!("{base}&fmt=json3")
    }
}

/// Extracts the caption tracks from an innertube `player` response.
///
/// # Parameters
/// * `player`: the decoded JSON body of `youtubei/v1/player`.
/// * `video_id`: used for error reporting only.
///
/// # Returns
/// * `Ok(Vec<CaptionTrack>)` with at least one track.
/// * `Err(TranscriptError)` if the video is unplayable or has no captions.
#[tracing::instrument(skip(player))]
pub fn parse_caption_tracks(player: &Value, video_id: &str) -> Result<Vec<CaptionTrack>, TranscriptError> {
    let playability = &player["playabilityStatus"];
    let status = playability["status"].as_str().unwrap_or("OK");

    if status != "OK" {
        let reason = playability["reason"]
            .as_str()
            .unwrap_or("no reason given")
            .to_string();
        if reason.contains("not a bot") {
            return Err(TranscriptError::RateLimited);
        }
        return Err(TranscriptError::VideoUnavailable {
            video_id: video_id.to_string(),
            reason,
        });
    }

    let tracks = player["captions"]["playerCaptionsTracklistRenderer"]["captionTracks"].clone();
    if tracks.is_null() {
        return Err(TranscriptError::NoCaptions(video_id.to_string()));
    }

    let tracks = serde_json::from_value::<Vec<CaptionTrack>>(tracks)?;
    if tracks.is_empty() {
        return Err(TranscriptError::NoCaptions(video_id.to_string()));
    }

    Ok(tracks)
}

/// Picks the caption track to use.
///
/// Languages are tried in order of preference; within a language a manually
/// created track wins over an auto-generated one. Falls back to the first
/// manual track, then the first track of any kind.
pub fn select_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    let by_preference = |track: &&CaptionTrack| track.is_generated();

    languages
        .iter()
        .find_map(|lang| {
            tracks
                .iter()
                .filter(|t| t.language_code == *lang)
                .sorted_by_key(by_preference)
                .next()
        })
        .or_else(|| tracks.iter().sorted_by_key(by_preference).next())
}

#[derive(Debug, Deserialize)]
struct Json3Document {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    segs: Option<Vec<Json3Seg>>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

/// Parses a `json3` timed-text document into segments ordered by start time.
pub fn parse_json3(body: &str) -> Result<Vec<TranscriptSegment>, TranscriptError> {
    let doc = serde_json::from_str::<Json3Document>(body)?;

    let segments = doc
        .events
        .into_iter()
        .filter_map(|event| {
            let text = event
                .segs?
                .iter()
                .map(|s| s.utf8.as_str())
                .collect::<String>()
                .split_whitespace()
                .join(" ");
            if text.is_empty() {
                return None;
            }
            Some(TranscriptSegment {
                start: event.t_start_ms as f64 / 1000.0,
                duration: event.d_duration_ms as f64 / 1000.0,
                text,
            })
        })
        .sorted_by(|a, b| a.start.total_cmp(&b.start))
        .collect();

    Ok(segments)
}

pub struct YtHtmlDocument(String);

impl Deref for YtHtmlDocument {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl YtHtmlDocument {
    pub fn new(doc: String) -> Self {
        YtHtmlDocument(doc)
    }

    /// YouTube serves a captcha page instead of the video when it throttles
    pub fn is_captcha(&self) -> bool {
        self.contains("class=\"g-recaptcha\"")
    }

    pub fn innertube_api_key(&self) -> Result<String, TranscriptError> {
        INNERTUBE_API_KEY_RE
            .captures(self)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or(TranscriptError::Parse(
                "Failed to extract INNERTUBE_API_KEY from the watch page",
            ))
    }
}

impl From<String> for YtHtmlDocument {
    fn from(value: String) -> Self {
        YtHtmlDocument(value)
    }
}
