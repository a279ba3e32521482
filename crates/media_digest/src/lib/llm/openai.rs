//! Client for OpenAI compatible HTTP APIs.
//!
//! Used both for chat completions (summaries) and for audio transcriptions.
//! Any server exposing the same routes works, e.g. Ollama under
//! `http://localhost:11434/v1`.

use std::{path::Path, time::Duration};

use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{SummarizationError, TranscriptionError},
    llm::{
        summarizer::build_prompt,
        transcriber::{ModelLoader, Recognition, RecognizedSegment, SpeechModel},
    },
    Summarizer, Summary,
};

#[derive(Debug, Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    summary_model: String,
    transcription_model: String,
    context_window_limit: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum OpenAIError {
    #[error("HTTP error: {0}")]
    Request(reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

// the engine url stays in the logs, not in errors handed to clients
impl From<reqwest::Error> for OpenAIError {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(e.without_url())
    }
}

impl OpenAIClient {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:11434/v1";
    pub const TRANSCRIPTION_MODEL: &'static str = "whisper-1";

    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, OpenAIError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: None,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            summary_model: <Self as Summarizer>::SUMMARIZER_MODEL.into(),
            transcription_model: Self::TRANSCRIPTION_MODEL.into(),
            context_window_limit: <Self as Summarizer>::CONTEXT_WINDOW_LIMIT,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into()).filter(|k: &String| !k.is_empty());
        self
    }

    pub fn with_summary_model(mut self, model: impl Into<String>) -> Self {
        self.summary_model = model.into();
        self
    }

    pub fn with_transcription_model(mut self, model: impl Into<String>) -> Self {
        self.transcription_model = model.into();
        self
    }

    pub fn with_context_window_limit(mut self, tokens: usize) -> Self {
        self.context_window_limit = tokens;
        self
    }

    fn post(&self, route: &str) -> reqwest::RequestBuilder {
        let request = self.client.post(format!("{}/{route}", self.base_url));
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, OpenAIError> {
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(OpenAIError::Api { status, message });
        }
        Ok(resp)
    }

    pub async fn send_transcribe_request(
        &self,
        file: &Path,
        model_name: impl Into<String>,
    ) -> Result<TranscribeResponse, OpenAIError> {
        let bytes = tokio::fs::read(file).await?;
        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/wav")?;

        let form = reqwest::multipart::Form::new()
            .text("model", model_name.into())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "segment")
            .part("file", part);

        let resp = self
            .post("audio/transcriptions")
            .multipart(form)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        Ok(Self::check(resp).await?.json::<TranscribeResponse>().await?)
    }

    pub async fn send_completion_request(
        &self,
        model_name: impl Into<String>,
        user_content: impl Into<String>,
    ) -> Result<CompletionResponse, OpenAIError> {
        let body = serde_json::json!({
            "model": model_name.into(),
            "stream": false,
            "messages": [
                {
                    "role": "user",
                    "content": user_content.into()
                }
            ]
        });

        let resp = self
            .post("chat/completions")
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        Ok(Self::check(resp).await?.json::<CompletionResponse>().await?)
    }
}

#[derive(Debug, Deserialize)]
pub struct TranscribeResponse {
    pub text: String,
    pub language: Option<String>,
    pub segments: Option<Vec<RecognizedSegment>>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
pub struct CompletionMessage {
    pub content: Option<String>,
}

impl Summarizer for OpenAIClient {
    const SUMMARIZER_MODEL: &'static str = "Mjh1051702/youtube:latest";

    #[tracing::instrument(skip_all, fields(model = %self.summary_model, chars = transcript.len()))]
    async fn summarize(&self, transcript: &str) -> Result<Summary, SummarizationError> {
        let prompt = build_prompt(transcript, self.context_window_limit)?;

        let response = self
            .send_completion_request(&self.summary_model, prompt)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to summarize content"))?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(SummarizationError::EmptyResponse)?;

        Ok(Summary { text })
    }
}

/// Speech model served over the `/audio/transcriptions` route
#[derive(Debug, Clone)]
pub struct RemoteSpeechModel {
    client: OpenAIClient,
}

impl ModelLoader for OpenAIClient {
    type Model = RemoteSpeechModel;

    fn model_name(&self) -> &str {
        &self.transcription_model
    }

    async fn load(&self) -> Result<RemoteSpeechModel, TranscriptionError> {
        Ok(RemoteSpeechModel {
            client: self.clone(),
        })
    }
}

impl SpeechModel for RemoteSpeechModel {
    async fn recognize(&self, audio_path: &Path) -> Result<Recognition, TranscriptionError> {
        let response = self
            .client
            .send_transcribe_request(audio_path, &self.client.transcription_model)
            .await?;

        let segments = match response.segments {
            Some(segments) if !segments.is_empty() => segments,
            _ => vec![RecognizedSegment {
                start: 0.0,
                end: 0.0,
                text: response.text,
            }],
        };

        Ok(Recognition {
            segments,
            language: response.language,
        })
    }
}
