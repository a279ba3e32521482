#![allow(dead_code)]

pub mod summarizer;
pub mod transcoder;
pub mod transcriber;
pub mod transcript_source;
