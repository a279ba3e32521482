use std::{future::Future, path::Path, sync::Arc};

use itertools::Itertools;
use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::error::TranscriptionError;

/// Turns an audio file into plain text.
pub trait Transcriber {
    fn transcribe(
        &self,
        audio_path: &Path,
    ) -> impl Future<Output = Result<String, TranscriptionError>> + Send;
}

/// A loaded speech-to-text model, shared read-only between pipeline runs.
pub trait SpeechModel: Send + Sync + 'static {
    fn recognize(
        &self,
        audio_path: &Path,
    ) -> impl Future<Output = Result<Recognition, TranscriptionError>> + Send;
}

/// Knows how to build a [`SpeechModel`]. Loading is expected to be expensive.
pub trait ModelLoader: Send + Sync {
    type Model: SpeechModel;

    fn model_name(&self) -> &str;

    fn load(&self) -> impl Future<Output = Result<Self::Model, TranscriptionError>> + Send;
}

/// Raw engine output, segments in whatever order the engine emitted them
#[derive(Debug, Clone, Default)]
pub struct Recognition {
    pub segments: Vec<RecognizedSegment>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecognizedSegment {
    /// seconds from the start of the audio
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Recognition {
    /// Joins segment texts in timeline order with single spaces
    pub fn into_text(self) -> String {
        self.segments
            .into_iter()
            .sorted_by(|a, b| a.start.total_cmp(&b.start))
            .map(|s| s.text.trim().to_string())
            .filter(|t| !t.is_empty())
            .join(" ")
    }
}

/// Transcriber that loads its model on first use and reuses it afterwards.
///
/// Concurrent first callers wait on the same initialization, so the loader
/// runs at most once per successful load. A failed load leaves the cell empty
/// and the next call tries again.
pub struct LazyTranscriber<L: ModelLoader> {
    loader: L,
    model: OnceCell<Arc<L::Model>>,
}

impl<L: ModelLoader> LazyTranscriber<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            model: OnceCell::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    async fn model(&self) -> Result<&Arc<L::Model>, TranscriptionError> {
        self.model
            .get_or_try_init(|| async {
                tracing::info!(model = self.loader.model_name(), "Loading speech model");
                let model = self
                    .loader
                    .load()
                    .await
                    .inspect_err(|e| tracing::error!(error = %e, "Failed to load speech model"))?;
                tracing::info!(model = self.loader.model_name(), "Speech model loaded");
                Ok(Arc::new(model))
            })
            .await
    }
}

impl<L: ModelLoader> Transcriber for LazyTranscriber<L> {
    #[tracing::instrument(skip(self))]
    async fn transcribe(&self, audio_path: &Path) -> Result<String, TranscriptionError> {
        let model = self.model().await?;

        let recognition = model
            .recognize(audio_path)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to transcribe audio"))?;

        if let Some(language) = &recognition.language {
            tracing::info!(%language, segments = recognition.segments.len(), "Detected language");
        }

        Ok(recognition.into_text())
    }
}
