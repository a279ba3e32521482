use std::{borrow::Cow, future::Future, sync::LazyLock};

use another_tiktoken_rs::{cl100k_base, CoreBPE};

use crate::{error::SummarizationError, types::Summary};

/// Instruction placed in front of every transcript
pub const SUMMARY_PROMPT: &str = include_str!("./prompts/summary.txt");

static TOKENIZER: LazyLock<Option<CoreBPE>> = LazyLock::new(|| {
    cl100k_base()
        .inspect_err(|e| tracing::error!(error = %e, "Failed to initialise tokenizer"))
        .ok()
});

pub trait Summarizer {
    /// Transcript budget in tokens; longer transcripts are cut to fit
    const CONTEXT_WINDOW_LIMIT: usize = 128_000 - 18_000;
    const SUMMARIZER_MODEL: &str;

    fn summarize(
        &self,
        transcript: &str,
    ) -> impl Future<Output = Result<Summary, SummarizationError>> + Send;
}

/// Builds the single user turn sent to the text generation engine.
pub fn build_prompt(transcript: &str, token_limit: usize) -> Result<String, SummarizationError> {
    let transcript = truncate_to_tokens(transcript, token_limit)?;
    Ok(format!("{}\n\n{}", SUMMARY_PROMPT.trim_end(), transcript))
}

/// Keeps at most `limit` cl100k tokens from the start of `text`.
pub fn truncate_to_tokens(text: &str, limit: usize) -> Result<Cow<'_, str>, SummarizationError> {
    // a token always spans at least one byte
    if text.len() <= limit {
        return Ok(Cow::Borrowed(text));
    }

    let bpe = TOKENIZER
        .as_ref()
        .ok_or_else(|| SummarizationError::Tokenizer("cl100k_base unavailable".into()))?;

    let tokens = bpe.encode_with_special_tokens(text);
    if tokens.len() <= limit {
        return Ok(Cow::Borrowed(text));
    }

    // a cut may land inside a multi-byte character; back off until it decodes
    let kept = (0..4)
        .filter_map(|back| limit.checked_sub(back))
        .find_map(|n| bpe.decode(tokens[..n].to_vec()).ok())
        .ok_or_else(|| SummarizationError::Tokenizer("failed to decode truncated transcript".into()))?;

    tracing::warn!(
        tokens = tokens.len(),
        limit,
        "Transcript exceeds context window, truncating"
    );

    Ok(Cow::Owned(kept))
}
