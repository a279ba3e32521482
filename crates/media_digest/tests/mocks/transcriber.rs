use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use media_digest::{
    ModelLoader, Recognition, RecognizedSegment, SpeechModel, Transcriber, TranscriptionError,
};

#[derive(Clone)]
pub struct MockTranscriber {
    pub response_text: String,
    /// audio path and whether it existed when the call was made
    pub calls: Arc<Mutex<Vec<(PathBuf, bool)>>>,
    pub fail_with: Option<String>,
    pub panics: bool,
}

impl MockTranscriber {
    pub fn new(response_text: &str) -> Self {
        Self {
            response_text: response_text.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
            panics: false,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Self::new("")
        }
    }

    pub fn panicking() -> Self {
        Self {
            panics: true,
            ..Self::new("")
        }
    }
}

impl Transcriber for MockTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<String, TranscriptionError> {
        self.calls
            .lock()
            .unwrap()
            .push((audio_path.to_path_buf(), audio_path.exists()));
        if self.panics {
            panic!("speech engine crashed");
        }
        if let Some(ref msg) = self.fail_with {
            return Err(TranscriptionError::Audio(msg.clone()));
        }
        Ok(self.response_text.clone())
    }
}

/// Speech model that "recognizes" a fixed phrase, emitting its segments
/// in reverse order the way a parallel decoder might
pub struct PhraseModel {
    pub phrase: String,
}

impl SpeechModel for PhraseModel {
    async fn recognize(&self, audio_path: &Path) -> Result<Recognition, TranscriptionError> {
        if !audio_path.exists() {
            return Err(TranscriptionError::Audio("audio file missing".into()));
        }
        let segments = self
            .phrase
            .split_whitespace()
            .collect::<Vec<_>>()
            .into_iter()
            .enumerate()
            .map(|(i, word)| RecognizedSegment {
                start: i as f64 * 0.5,
                end: i as f64 * 0.5 + 0.5,
                text: format!(" {word}"),
            })
            .rev()
            .collect();
        Ok(Recognition {
            segments,
            language: Some("en".into()),
        })
    }
}

#[derive(Clone)]
pub struct CountingLoader {
    pub phrase: String,
    pub loads: Arc<AtomicUsize>,
}

impl CountingLoader {
    pub fn new(phrase: &str) -> Self {
        Self {
            phrase: phrase.to_string(),
            loads: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl ModelLoader for CountingLoader {
    type Model = PhraseModel;

    fn model_name(&self) -> &str {
        "phrase"
    }

    async fn load(&self) -> Result<PhraseModel, TranscriptionError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(PhraseModel {
            phrase: self.phrase.clone(),
        })
    }
}
