use std::path::PathBuf;

use crate::{
    media::MediaTranscoder, yt::TranscriptSource, MediaDigestProcessor, Summarizer, Transcriber,
};

pub struct MediaDigestProcessorBuilder<Y = (), M = (), T = (), S = ()> {
    temp_dir: PathBuf,
    transcript_source: Y,
    transcoder: M,
    transcriber: T,
    summarizer: S,
}

impl MediaDigestProcessorBuilder {
    /// Starts a builder writing temporary artifacts to the system temp dir
    pub fn new() -> Self {
        Self {
            temp_dir: std::env::temp_dir(),
            transcript_source: (),
            transcoder: (),
            transcriber: (),
            summarizer: (),
        }
    }
}

impl Default for MediaDigestProcessorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<Y, M, T, S> MediaDigestProcessorBuilder<Y, M, T, S> {
    pub fn temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    pub fn transcript_source<Y2: TranscriptSource + Send + Sync + 'static>(
        self,
        transcript_source: Y2,
    ) -> MediaDigestProcessorBuilder<Y2, M, T, S> {
        MediaDigestProcessorBuilder {
            temp_dir: self.temp_dir,
            transcript_source,
            transcoder: self.transcoder,
            transcriber: self.transcriber,
            summarizer: self.summarizer,
        }
    }

    pub fn transcoder<M2: MediaTranscoder + Send + Sync + 'static>(
        self,
        transcoder: M2,
    ) -> MediaDigestProcessorBuilder<Y, M2, T, S> {
        MediaDigestProcessorBuilder {
            temp_dir: self.temp_dir,
            transcript_source: self.transcript_source,
            transcoder,
            transcriber: self.transcriber,
            summarizer: self.summarizer,
        }
    }

    pub fn transcriber<T2: Transcriber + Send + Sync + 'static>(
        self,
        transcriber: T2,
    ) -> MediaDigestProcessorBuilder<Y, M, T2, S> {
        MediaDigestProcessorBuilder {
            temp_dir: self.temp_dir,
            transcript_source: self.transcript_source,
            transcoder: self.transcoder,
            transcriber,
            summarizer: self.summarizer,
        }
    }

    pub fn summarizer<S2: Summarizer + Send + Sync + 'static>(
        self,
        summarizer: S2,
    ) -> MediaDigestProcessorBuilder<Y, M, T, S2> {
        MediaDigestProcessorBuilder {
            temp_dir: self.temp_dir,
            transcript_source: self.transcript_source,
            transcoder: self.transcoder,
            transcriber: self.transcriber,
            summarizer,
        }
    }
}

impl<Y, M, T, S> MediaDigestProcessorBuilder<Y, M, T, S>
where
    Y: TranscriptSource + Send + Sync + 'static,
    M: MediaTranscoder + Send + Sync + 'static,
    T: Transcriber + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    pub fn build(self) -> MediaDigestProcessor<Y, M, T, S> {
        MediaDigestProcessor {
            temp_dir: self.temp_dir,
            transcript_source: self.transcript_source,
            transcoder: self.transcoder,
            transcriber: self.transcriber,
            summarizer: self.summarizer,
        }
    }
}
