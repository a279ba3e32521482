pub mod openai;
pub mod summarizer;
pub mod transcriber;
#[cfg(feature = "whisper")]
pub mod whisper;
