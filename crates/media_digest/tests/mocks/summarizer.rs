use std::sync::{Arc, Mutex};

use media_digest::{openai::OpenAIError, SummarizationError, Summarizer, Summary};

#[derive(Clone)]
pub struct MockSummarizer {
    pub summary: String,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
}

impl MockSummarizer {
    pub fn new(summary: &str) -> Self {
        Self {
            summary: summary.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    /// Echoes the transcript back, prefixed
    pub fn echo() -> Self {
        Self::new("")
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            summary: String::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(msg.to_string()),
        }
    }
}

impl Summarizer for MockSummarizer {
    const CONTEXT_WINDOW_LIMIT: usize = 128_000;
    const SUMMARIZER_MODEL: &'static str = "mock-llm";

    async fn summarize(&self, transcript: &str) -> Result<Summary, SummarizationError> {
        self.calls.lock().unwrap().push(transcript.to_string());
        if let Some(ref msg) = self.fail_with {
            return Err(SummarizationError::Engine(OpenAIError::Api {
                status: 503,
                message: msg.clone(),
            }));
        }
        let text = if self.summary.is_empty() {
            format!("Summary: {transcript}")
        } else {
            self.summary.clone()
        };
        Ok(Summary { text })
    }
}
