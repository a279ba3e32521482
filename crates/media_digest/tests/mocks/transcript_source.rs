use std::sync::{Arc, Mutex};

use media_digest::{yt::TranscriptSource, Transcript, TranscriptError, TranscriptSegment, VideoReference};

#[derive(Clone)]
pub struct MockTranscriptSource {
    pub segments: Vec<TranscriptSegment>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<fn(&str) -> TranscriptError>,
}

impl Default for MockTranscriptSource {
    fn default() -> Self {
        Self::new(&[(0.0, "hello from the video")])
    }
}

impl MockTranscriptSource {
    pub fn new(segments: &[(f64, &str)]) -> Self {
        Self {
            segments: segments
                .iter()
                .map(|(start, text)| TranscriptSegment {
                    start: *start,
                    duration: 1.0,
                    text: text.to_string(),
                })
                .collect(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    pub fn failing(fail_with: fn(&str) -> TranscriptError) -> Self {
        Self {
            fail_with: Some(fail_with),
            ..Default::default()
        }
    }
}

impl TranscriptSource for MockTranscriptSource {
    const BASE_URL: &'static str = "https://youtube.com/mock";

    async fn fetch(&self, video: &VideoReference) -> Result<Transcript, TranscriptError> {
        self.calls.lock().unwrap().push(video.to_string());
        if let Some(fail_with) = self.fail_with {
            return Err(fail_with(video.as_str()));
        }
        Ok(Transcript::new(self.segments.clone()))
    }
}
