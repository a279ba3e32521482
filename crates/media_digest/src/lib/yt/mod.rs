pub mod transcript;

use std::future::Future;

use crate::{error::TranscriptError, Transcript, VideoReference};

pub use transcript::YtTranscriptClient;

/// Fetches the caption transcript of a remotely hosted video.
pub trait TranscriptSource {
    const BASE_URL: &str;

    fn fetch(
        &self,
        video: &VideoReference,
    ) -> impl Future<Output = Result<Transcript, TranscriptError>> + Send;
}
