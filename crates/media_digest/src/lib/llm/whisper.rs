//! Local speech recognition with whisper.cpp through `whisper-rs`.
//!
//! Requires the `whisper` feature (and cmake at build time).

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::{
    error::TranscriptionError,
    llm::transcriber::{ModelLoader, Recognition, RecognizedSegment, SpeechModel},
};

const SAMPLE_RATE: u32 = 16_000;
const BEAM_SIZE: i32 = 5;

#[derive(Debug, Clone)]
pub struct WhisperConfig {
    /// Path to a ggml model file
    pub model_path: PathBuf,
    /// Language code, `None` lets whisper detect it
    pub language: Option<String>,
    pub threads: Option<usize>,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/ggml-base.bin"),
            language: None,
            threads: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WhisperLoader {
    config: WhisperConfig,
    model_name: String,
}

impl WhisperLoader {
    pub fn new(config: WhisperConfig) -> Self {
        let model_name = config
            .model_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("whisper")
            .to_string();
        Self { config, model_name }
    }
}

pub struct WhisperModel {
    // whisper state creation is not reentrant across threads
    context: Arc<Mutex<WhisperContext>>,
    config: WhisperConfig,
}

impl ModelLoader for WhisperLoader {
    type Model = WhisperModel;

    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn load(&self) -> Result<WhisperModel, TranscriptionError> {
        let config = self.config.clone();
        if !config.model_path.exists() {
            tracing::error!(path = ?config.model_path, "Whisper model file not found");
            return Err(TranscriptionError::ModelLoad("model file not found".into()));
        }

        tokio::task::spawn_blocking(move || {
            let path = config
                .model_path
                .to_str()
                .ok_or_else(|| TranscriptionError::ModelLoad("invalid UTF-8 in model path".into()))?;
            let context = WhisperContext::new_with_params(path, WhisperContextParameters::default())
                .map_err(|e| TranscriptionError::ModelLoad(e.to_string()))?;

            Ok(WhisperModel {
                context: Arc::new(Mutex::new(context)),
                config,
            })
        })
        .await?
    }
}

/// Reads 16 kHz mono WAV into samples normalised to [-1.0, 1.0]
fn read_samples(path: &Path) -> Result<Vec<f32>, TranscriptionError> {
    let reader = hound::WavReader::open(path).map_err(|e| TranscriptionError::Audio(e.to_string()))?;
    let spec = reader.spec();

    if spec.sample_rate != SAMPLE_RATE || spec.channels != 1 {
        return Err(TranscriptionError::Audio(format!(
            "expected {SAMPLE_RATE} Hz mono audio, got {} Hz with {} channels",
            spec.sample_rate, spec.channels
        )));
    }

    let samples = match spec.sample_format {
        hound::SampleFormat::Int => reader
            .into_samples::<i16>()
            .map(|s| s.map(|s| s as f32 / 32768.0))
            .collect::<Result<Vec<_>, _>>(),
        hound::SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<Vec<_>, _>>(),
    };

    samples.map_err(|e| TranscriptionError::Audio(e.to_string()))
}

impl WhisperModel {
    fn recognize_blocking(&self, audio_path: &Path) -> Result<Recognition, TranscriptionError> {
        let samples = read_samples(audio_path)?;

        let context = self
            .context
            .lock()
            .map_err(|e| TranscriptionError::Inference(format!("context lock poisoned: {e}")))?;
        let mut state = context
            .create_state()
            .map_err(|e| TranscriptionError::Inference(e.to_string()))?;

        let mut params = FullParams::new(SamplingStrategy::BeamSearch {
            beam_size: BEAM_SIZE,
            patience: -1.0,
        });
        params.set_language(self.config.language.as_deref());
        if let Some(threads) = self.config.threads {
            params.set_n_threads(threads as i32);
        }
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state
            .full(params, &samples)
            .map_err(|e| TranscriptionError::Inference(e.to_string()))?;

        let language = whisper_rs::get_lang_str(state.full_lang_id_from_state()).map(str::to_string);

        // timestamps are in centiseconds
        let segments = state
            .as_iter()
            .map(|segment| RecognizedSegment {
                start: segment.start_timestamp() as f64 / 100.0,
                end: segment.end_timestamp() as f64 / 100.0,
                text: segment.to_string(),
            })
            .collect();

        Ok(Recognition { segments, language })
    }
}

impl SpeechModel for WhisperModel {
    async fn recognize(&self, audio_path: &Path) -> Result<Recognition, TranscriptionError> {
        let model = WhisperModel {
            context: self.context.clone(),
            config: self.config.clone(),
        };
        let audio_path = audio_path.to_path_buf();

        tokio::task::spawn_blocking(move || model.recognize_blocking(&audio_path)).await?
    }
}
