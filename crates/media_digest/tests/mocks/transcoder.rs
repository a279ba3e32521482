use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use media_digest::{artifact::TempArtifact, media::MediaTranscoder, ConversionError};

#[derive(Clone, Default)]
pub struct MockTranscoder {
    /// input path and whether it existed when the call was made
    pub calls: Arc<Mutex<Vec<(PathBuf, bool)>>>,
    pub fail_with: Option<String>,
}

impl MockTranscoder {
    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

impl MediaTranscoder for MockTranscoder {
    const OUTPUT_SUFFIX: &'static str = ".wav";

    async fn convert(&self, input: &Path, temp_dir: &Path) -> Result<TempArtifact, ConversionError> {
        self.calls
            .lock()
            .unwrap()
            .push((input.to_path_buf(), input.exists()));

        let output = TempArtifact::reserve(temp_dir, Self::OUTPUT_SUFFIX);
        // written before failing so cleanup of partial output is exercised
        std::fs::write(output.path(), b"RIFF-mock").unwrap();

        if let Some(ref msg) = self.fail_with {
            return Err(ConversionError::Failed {
                status: Some(1),
                diagnostic: msg.clone(),
            });
        }
        Ok(output)
    }
}
