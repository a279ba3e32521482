use std::{fmt, ops::Deref};

use bytes::Bytes;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Identifier of a remotely hosted video, e.g. a YouTube video id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoReference(String);

impl VideoReference {
    pub fn parse(raw: &str) -> Result<Self, PipelineError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PipelineError::InvalidRequest(PipelineError::VIDEO_ID_REQUIRED));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for VideoReference {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for VideoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A media file received with a request
#[derive(Debug, Clone)]
pub struct UploadedMedia {
    pub file_name: String,
    pub data: Bytes,
}

impl UploadedMedia {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Offset from the start of the video, in seconds
    pub start: f64,
    pub duration: f64,
    pub text: String,
}

/// Caption transcript of a remote video, ordered by start time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    segments: Vec<TranscriptSegment>,
}

impl Transcript {
    pub fn new(segments: Vec<TranscriptSegment>) -> Self {
        let segments = segments
            .into_iter()
            .sorted_by(|a, b| a.start.total_cmp(&b.start))
            .collect();
        Self { segments }
    }

    /// Spoken content joined into one space-separated string
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub text: String,
}

/// Progress of a single pipeline run, used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Received,
    InputStaged,
    Converted,
    Transcribed,
    Summarized,
    Completed,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::InputStaged => "input_staged",
            Self::Converted => "converted",
            Self::Transcribed => "transcribed",
            Self::Summarized => "summarized",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}
