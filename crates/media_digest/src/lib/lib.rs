pub mod artifact;
mod error;
mod llm;
pub mod media;
pub mod parser;
mod processor;
pub mod server;
pub mod tracing;
pub mod types;
pub mod yt;

pub use error::{
    ConversionError, PipelineError, SummarizationError, TranscriptError, TranscriptionError,
};
pub use llm::openai;
#[cfg(feature = "whisper")]
pub use llm::whisper;
pub use llm::{
    summarizer::{build_prompt, Summarizer, SUMMARY_PROMPT},
    transcriber::{
        LazyTranscriber, ModelLoader, Recognition, RecognizedSegment, SpeechModel, Transcriber,
    },
};
pub use processor::{builder::MediaDigestProcessorBuilder, MediaDigestProcessor};
pub use types::{Summary, Transcript, TranscriptSegment, UploadedMedia, VideoReference};
