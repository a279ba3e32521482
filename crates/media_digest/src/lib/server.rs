//! HTTP surface of the service.
//!
//! | Route                    | Body                            |
//! |--------------------------|---------------------------------|
//! | `POST /youtubeSummary`   | JSON `{"video_id": "..."}`      |
//! | `POST /localMediaSummary`| multipart, field `media_file`   |
//! | `GET /health`            |                                 |
//! | `GET /videoInfo`         | query `video_id`                |
//!
//! Successful summaries are returned as `{"transcript": "<summary>"}`; every
//! failure as `{"error": "<message>"}`.

use std::sync::Arc;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        DefaultBodyLimit, Multipart, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    media::MediaTranscoder, yt::TranscriptSource, MediaDigestProcessor, PipelineError, Summarizer,
    Summary, Transcriber, UploadedMedia,
};

pub const MEDIA_FIELD: &str = "media_file";

#[derive(Debug, Serialize)]
pub struct SummaryBody {
    // historical name, holds the summary
    pub transcript: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct VideoIdParams {
    pub video_id: Option<String>,
}

impl From<Summary> for SummaryBody {
    fn from(summary: Summary) -> Self {
        Self {
            transcript: summary.text,
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        error_response(self.status(), self.public_message())
    }
}

pub fn router<Y, M, T, S>(
    processor: Arc<MediaDigestProcessor<Y, M, T, S>>,
    max_upload_bytes: usize,
) -> Router
where
    Y: TranscriptSource + Send + Sync + 'static,
    M: MediaTranscoder + Send + Sync + 'static,
    T: Transcriber + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    Router::new()
        .route("/youtubeSummary", post(youtube_summary::<Y, M, T, S>))
        .route("/localMediaSummary", post(local_media_summary::<Y, M, T, S>))
        .route("/health", get(health))
        .route("/videoInfo", get(video_info))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(processor)
}

async fn youtube_summary<Y, M, T, S>(
    State(processor): State<Arc<MediaDigestProcessor<Y, M, T, S>>>,
    body: Result<Json<VideoIdParams>, JsonRejection>,
) -> Result<Json<SummaryBody>, PipelineError>
where
    Y: TranscriptSource + Send + Sync + 'static,
    M: MediaTranscoder + Send + Sync + 'static,
    T: Transcriber + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    // malformed bodies are treated like a missing id
    let video_id = body.ok().and_then(|Json(b)| b.video_id).unwrap_or_default();
    let summary = processor.remote_summary(&video_id).await?;
    Ok(Json(summary.into()))
}

/// Pulls the `media_file` file part out of the form, if present.
///
/// A plain text field with the same name is not a file part and is skipped.
async fn read_media_field(multipart: &mut Multipart) -> Result<Option<UploadedMedia>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(MEDIA_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field.bytes().await?;
        return Ok(Some(UploadedMedia { file_name, data }));
    }
    Ok(None)
}

async fn local_media_summary<Y, M, T, S>(
    State(processor): State<Arc<MediaDigestProcessor<Y, M, T, S>>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response
where
    Y: TranscriptSource + Send + Sync + 'static,
    M: MediaTranscoder + Send + Sync + 'static,
    T: Transcriber + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    let media = match multipart {
        Ok(mut multipart) => match read_media_field(&mut multipart).await {
            Ok(media) => media,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read multipart upload");
                return error_response(e.status(), format!("Error handling request: {}", e.body_text()));
            }
        },
        Err(_) => None,
    };

    match processor.local_media_summary(media).await {
        Ok(summary) => Json(SummaryBody::from(summary)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn health() -> &'static str {
    "Backend is Running"
}

async fn video_info(Query(params): Query<VideoIdParams>) -> Response {
    match params.video_id.filter(|id| !id.trim().is_empty()) {
        Some(video_id) => Json(serde_json::json!({ "video_id": video_id, "status": "ok" })).into_response(),
        None => error_response(StatusCode::BAD_REQUEST, "video_id parameter required"),
    }
}
