use std::{
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use tokio::process::Command;

use crate::{artifact::TempArtifact, error::ConversionError, media::MediaTranscoder};

/// Transcodes media by shelling out to `ffmpeg`.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: PathBuf,
    timeout: Duration,
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            timeout: Duration::from_secs(600),
        }
    }
}

impl FfmpegTranscoder {
    pub const SAMPLE_RATE: u32 = 16_000;

    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn args(input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-nostdin".into(),
            "-y".into(),
            "-i".into(),
            input.display().to_string(),
            "-vn".into(),
            "-ac".into(),
            "1".into(),
            "-ar".into(),
            Self::SAMPLE_RATE.to_string(),
            "-c:a".into(),
            "pcm_s16le".into(),
            output.display().to_string(),
        ]
    }
}

/// Keeps the tail of ffmpeg's stderr with our temp paths swapped for labels
fn diagnostic(stderr: &[u8], input: &Path, output: &Path) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text
        .replace(&input.display().to_string(), "<input>")
        .replace(&output.display().to_string(), "<output>");

    let lines = text.lines().filter(|l| !l.trim().is_empty()).collect::<Vec<_>>();
    let tail = &lines[lines.len().saturating_sub(5)..];
    tail.join("; ")
}

impl MediaTranscoder for FfmpegTranscoder {
    const OUTPUT_SUFFIX: &'static str = ".wav";

    #[tracing::instrument(skip(self))]
    async fn convert(&self, input: &Path, temp_dir: &Path) -> Result<TempArtifact, ConversionError> {
        // owned before ffmpeg runs so partial output is removed on any error
        let output = TempArtifact::reserve(temp_dir, Self::OUTPUT_SUFFIX);

        let child = Command::new(&self.program)
            .args(Self::args(input, output.path()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(ConversionError::Spawn)
            .inspect_err(|e| tracing::error!(error = %e, program = ?self.program, "Failed to start ffmpeg"))?;

        let result = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ConversionError::TimedOut(self.timeout))?
            .map_err(ConversionError::Spawn)?;

        if !result.status.success() {
            let diagnostic = diagnostic(&result.stderr, input, output.path());
            tracing::error!(status = ?result.status, %diagnostic, "ffmpeg conversion failed");
            return Err(ConversionError::Failed {
                status: result.status.code(),
                diagnostic,
            });
        }

        if !output.path().exists() {
            return Err(ConversionError::MissingOutput);
        }

        tracing::debug!(output = ?output.path(), "Converted media to audio");
        Ok(output)
    }
}
