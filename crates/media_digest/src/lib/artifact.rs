//! # Temporary artifacts
//!
//! Files created by a pipeline run (the staged upload and the converted audio)
//! live in a shared temporary directory under generated unique names. Each one
//! is wrapped in a [`TempArtifact`] that deletes the file when dropped, so a run
//! never leaves files behind whichever stage it stops at.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use uuid::Uuid;

use crate::types::UploadedMedia;

/// A uniquely named file owned by exactly one pipeline run.
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
}

impl TempArtifact {
    /// Takes ownership of `path`; the file is deleted when the artifact drops.
    pub fn adopt(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reserves a fresh `<uuid><suffix>` path inside `dir` without creating it
    pub fn reserve(dir: &Path, suffix: &str) -> Self {
        Self::adopt(dir.join(format!("{}{suffix}", Uuid::new_v4())))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        // blocking call; a lone unlink does not stall the runtime
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = ?self.path, "Removed temporary artifact"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(error = ?e, path = ?self.path, "Failed to clean up temporary artifact")
            }
        }
    }
}

/// Writes an upload to `<dir>/<uuid>_<sanitized name>`.
///
/// The returned artifact owns the file from the moment it is created, so a
/// failed write still removes whatever was partially written.
#[tracing::instrument(skip_all, fields(file_name = %media.file_name, size = media.data.len()))]
pub async fn stage_upload(media: &UploadedMedia, dir: &Path) -> std::io::Result<TempArtifact> {
    let name = format!("{}_{}", Uuid::new_v4(), sanitize_file_name(&media.file_name));
    let artifact = TempArtifact::adopt(dir.join(name));

    tokio::fs::write(artifact.path(), &media.data).await?;

    Ok(artifact)
}

/// Reduces a client supplied file name to a safe single path component.
pub fn sanitize_file_name(name: &str) -> String {
    // browsers on windows may send the full client path
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.').trim_matches('_');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
