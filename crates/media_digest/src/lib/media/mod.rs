pub mod ffmpeg;

use std::{future::Future, path::Path};

use crate::{artifact::TempArtifact, error::ConversionError};

pub use ffmpeg::FfmpegTranscoder;

/// Converts arbitrary input media into normalized mono audio.
pub trait MediaTranscoder {
    /// File extension of the produced audio, including the dot
    const OUTPUT_SUFFIX: &'static str;

    /// Writes exactly one new file inside `temp_dir` and hands ownership of it
    /// to the caller. The input is left untouched.
    fn convert(
        &self,
        input: &Path,
        temp_dir: &Path,
    ) -> impl Future<Output = Result<TempArtifact, ConversionError>> + Send;
}
