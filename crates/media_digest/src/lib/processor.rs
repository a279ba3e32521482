use std::path::PathBuf;

use uuid::Uuid;

use crate::{
    artifact::stage_upload,
    error::PipelineError,
    media::MediaTranscoder,
    types::{RunState, UploadedMedia},
    yt::TranscriptSource,
    Summarizer, Summary, Transcriber, VideoReference,
};

pub mod builder;

// Turns a video reference or an uploaded media file into a summary
#[derive(Debug)]
pub struct MediaDigestProcessor<Y, M, T, S>
where
    Y: TranscriptSource + Send + Sync + 'static,
    M: MediaTranscoder + Send + Sync + 'static,
    T: Transcriber + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    pub(crate) temp_dir: PathBuf,
    pub(crate) transcript_source: Y,
    pub(crate) transcoder: M,
    pub(crate) transcriber: T,
    pub(crate) summarizer: S,
}

fn transition(run_id: &Uuid, state: RunState) {
    tracing::debug!(%run_id, %state, "Pipeline run state changed");
}

impl<Y, M, T, S> MediaDigestProcessor<Y, M, T, S>
where
    Y: TranscriptSource + Send + Sync + 'static,
    M: MediaTranscoder + Send + Sync + 'static,
    T: Transcriber + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    /// Summarizes a remote video from its caption transcript
    #[tracing::instrument(skip(self))]
    pub async fn remote_summary(&self, video_id: &str) -> Result<Summary, PipelineError> {
        let video = VideoReference::parse(video_id)?;

        let transcript = self
            .transcript_source
            .fetch(&video)
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Failed to fetch transcript"))?;

        let summary = self
            .summarizer
            .summarize(&transcript.text())
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Failed to summarize transcript"))?;

        tracing::info!("Generated summary");
        Ok(summary)
    }

    /// Summarizes an uploaded media file.
    ///
    /// Every temporary file created along the way is removed before this
    /// returns, whether the run succeeds or fails.
    #[tracing::instrument(skip_all, fields(run_id = tracing::field::Empty))]
    pub async fn local_media_summary(
        &self,
        media: Option<UploadedMedia>,
    ) -> Result<Summary, PipelineError> {
        let run_id = Uuid::new_v4();
        tracing::Span::current().record("run_id", tracing::field::display(&run_id));
        transition(&run_id, RunState::Received);

        let media = media.ok_or(PipelineError::InvalidRequest(PipelineError::NO_FILE_PART))?;
        if media.file_name.is_empty() {
            return Err(PipelineError::InvalidRequest(PipelineError::NO_FILE_SELECTED));
        }

        let result = self.process_media(&run_id, &media).await;

        match &result {
            Ok(_) => transition(&run_id, RunState::Completed),
            Err(e) => {
                tracing::error!(error = ?e, "Failed to process uploaded media");
                transition(&run_id, RunState::Failed);
            }
        }
        result
    }

    async fn process_media(
        &self,
        run_id: &Uuid,
        media: &UploadedMedia,
    ) -> Result<Summary, PipelineError> {
        // artifacts delete their files when dropped, on every exit path
        let input = stage_upload(media, &self.temp_dir).await?;
        transition(run_id, RunState::InputStaged);

        let audio = self.transcoder.convert(input.path(), &self.temp_dir).await?;
        transition(run_id, RunState::Converted);

        let transcript = self.transcriber.transcribe(audio.path()).await?;
        transition(run_id, RunState::Transcribed);
        tracing::info!(chars = transcript.len(), "Generated transcript");

        let summary = self.summarizer.summarize(&transcript).await?;
        transition(run_id, RunState::Summarized);

        Ok(summary)
    }
}
