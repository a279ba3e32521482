use std::time::Duration;

use axum::http::StatusCode;

use crate::openai::OpenAIError;

/// Reasons a caption transcript could not be retrieved.
///
/// All variants surface to callers as one "transcript unavailable" category;
/// the variant itself is only kept for logs.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("no captions available for video {0}")]
    NoCaptions(String),
    #[error("video {video_id} is unavailable: {reason}")]
    VideoUnavailable { video_id: String, reason: String },
    #[error("request was rate limited by YouTube")]
    RateLimited,
    #[error("HTTP error: {0}")]
    Request(reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected response: {0}")]
    Parse(&'static str),
}

// request urls carry the innertube api key
impl From<reqwest::Error> for TranscriptError {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(e.without_url())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("failed to start transcoder: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("transcoder {}: {diagnostic}", exit_description(.status))]
    Failed {
        status: Option<i32>,
        diagnostic: String,
    },
    #[error("transcoder timed out after {0:?}")]
    TimedOut(Duration),
    #[error("transcoder did not produce an output file")]
    MissingOutput,
}

fn exit_description(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exited with status {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("failed to load speech model: {0}")]
    ModelLoad(String),
    #[error("unreadable audio: {0}")]
    Audio(String),
    #[error("speech recognition failed: {0}")]
    Inference(String),
    #[error("speech engine error: {0}")]
    Engine(#[from] OpenAIError),
    #[error("transcription task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, thiserror::Error)]
pub enum SummarizationError {
    #[error("text generation engine error: {0}")]
    Engine(#[from] OpenAIError),
    #[error("text generation engine returned no content")]
    EmptyResponse,
    #[error("tokenizer error: {0}")]
    Tokenizer(String),
}

/// Outcome of a failed pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{0}")]
    InvalidRequest(&'static str),
    #[error("transcript unavailable: {0}")]
    TranscriptUnavailable(#[from] TranscriptError),
    #[error("failed to stage uploaded media: {0}")]
    Staging(#[from] std::io::Error),
    #[error("media conversion failed: {0}")]
    Conversion(#[from] ConversionError),
    #[error("transcription failed: {0}")]
    Transcription(#[from] TranscriptionError),
    #[error("summarization failed: {0}")]
    Summarization(#[from] SummarizationError),
}

impl PipelineError {
    pub const NO_FILE_PART: &'static str = "No file part in the request";
    pub const NO_FILE_SELECTED: &'static str = "No file selected";
    pub const VIDEO_ID_REQUIRED: &'static str = "video_id is required";

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::TranscriptUnavailable(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to a client
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidRequest(msg) => (*msg).to_string(),
            Self::TranscriptUnavailable(e) => format!(
                "Could not fetch transcript. This may be due to: 1) Video has no captions/subtitles, \
                 2) Network connectivity issues, 3) YouTube API rate limiting. Error: {e}"
            ),
            // staging errors carry a temp path in their io::Error context
            Self::Staging(_) => "Error processing file: could not store upload".to_string(),
            Self::Conversion(e) => format!("Error processing file: {e}"),
            Self::Transcription(e) => format!("Error processing file: {e}"),
            Self::Summarization(e) => format!("Failed to generate summary: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_request_maps_to_bad_request() {
        let err = PipelineError::InvalidRequest(PipelineError::NO_FILE_PART);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "No file part in the request");
    }

    #[test]
    fn test_transcript_failures_fold_into_one_message() {
        let rate_limited = PipelineError::from(TranscriptError::RateLimited);
        let no_captions = PipelineError::from(TranscriptError::NoCaptions("abc".into()));

        for err in [rate_limited, no_captions] {
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
            assert!(err
                .public_message()
                .starts_with("Could not fetch transcript."));
        }
    }

    #[test]
    fn test_stage_failures_map_to_server_error() {
        let err = PipelineError::from(ConversionError::MissingOutput);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.public_message().starts_with("Error processing file:"));

        let err = PipelineError::from(SummarizationError::EmptyResponse);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_exit_status_is_shown_without_option() {
        let err = ConversionError::Failed {
            status: Some(1),
            diagnostic: "Invalid data found when processing input".into(),
        };
        assert_eq!(
            PipelineError::from(err).public_message(),
            "Error processing file: media conversion failed: transcoder exited with status 1: \
             Invalid data found when processing input"
        );

        let err = ConversionError::Failed {
            status: None,
            diagnostic: String::new(),
        };
        assert!(!err.to_string().contains("None"));
        assert!(err.to_string().contains("terminated by a signal"));
    }

    #[tokio::test]
    async fn test_transcript_request_error_hides_url() {
        // nothing listens on port 9 (discard) locally
        let err = reqwest::get("http://127.0.0.1:9/youtubei/v1/player?key=AIzaSyA-secret")
            .await
            .unwrap_err();

        let message = PipelineError::from(TranscriptError::from(err)).public_message();
        assert!(message.starts_with("Could not fetch transcript."));
        assert!(!message.contains("AIzaSyA-secret"), "url leaked: {message}");
        assert!(!message.contains("127.0.0.1"), "url leaked: {message}");
    }

    #[test]
    fn test_staging_message_hides_paths() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "/tmp/secret/path: denied");
        let err = PipelineError::from(io);
        assert!(!err.public_message().contains("/tmp"));
    }
}
