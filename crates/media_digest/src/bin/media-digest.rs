use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use media_digest::{
    media::FfmpegTranscoder, openai::OpenAIClient, server::router, tracing::init_tracing_subscriber,
    yt::YtTranscriptClient, LazyTranscriber, MediaDigestProcessorBuilder, Transcriber,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SpeechBackend {
    /// OpenAI compatible `/audio/transcriptions` endpoint
    Remote,
    /// Local whisper.cpp model (needs the `whisper` feature)
    Whisper,
}

#[derive(Parser)]
#[command(name = "media-digest", about = "Summarizes YouTube videos and uploaded media")]
struct Cli {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    #[arg(long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Base URL of the OpenAI compatible API (Ollama by default)
    #[arg(long, env = "OPENAI_BASE_URL", default_value = OpenAIClient::DEFAULT_BASE_URL)]
    openai_base_url: String,

    /// API key, not needed for a local Ollama
    #[arg(long, env = "OPENAI_API_KEY", default_value = "")]
    openai_key: String,

    /// Text generation model used for summaries
    #[arg(long, env = "SUMMARY_MODEL")]
    summary_model: Option<String>,

    /// Maximum transcript length passed to the summary model, in tokens
    #[arg(long, env = "SUMMARY_TOKEN_LIMIT")]
    summary_token_limit: Option<usize>,

    #[arg(long, env = "SPEECH_BACKEND", value_enum, default_value = "remote")]
    speech_backend: SpeechBackend,

    /// Model name for the remote speech backend
    #[arg(long, env = "SPEECH_MODEL")]
    speech_model: Option<String>,

    /// ggml model file for the whisper speech backend
    #[arg(long, env = "WHISPER_MODEL_PATH", default_value = "models/ggml-base.bin")]
    whisper_model_path: PathBuf,

    /// Spoken language for whisper, detected when unset
    #[arg(long, env = "WHISPER_LANGUAGE")]
    whisper_language: Option<String>,

    /// Preferred caption languages, in order
    #[arg(long, env = "CAPTION_LANGUAGES", value_delimiter = ',', default_value = "en")]
    caption_languages: Vec<String>,

    /// Directory for temporary media files, the system temp dir when unset
    #[arg(long, env = "MEDIA_TMP_DIR")]
    tmp_dir: Option<PathBuf>,

    #[arg(long, env = "FFMPEG_PATH", default_value = "ffmpeg")]
    ffmpeg_path: PathBuf,

    #[arg(long, env = "FFMPEG_TIMEOUT_SECS", default_value = "600")]
    ffmpeg_timeout_secs: u64,

    /// Timeout for every outbound HTTP request
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "300")]
    request_timeout_secs: u64,

    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value = "536870912")]
    max_upload_bytes: usize,
}

impl Cli {
    fn openai_client(&self) -> anyhow::Result<OpenAIClient> {
        let mut client = OpenAIClient::new(
            &self.openai_base_url,
            Duration::from_secs(self.request_timeout_secs),
        )?
        .with_api_key(&self.openai_key);

        if let Some(model) = &self.summary_model {
            client = client.with_summary_model(model);
        }
        if let Some(model) = &self.speech_model {
            client = client.with_transcription_model(model);
        }
        if let Some(limit) = self.summary_token_limit {
            client = client.with_context_window_limit(limit);
        }
        Ok(client)
    }
}

async fn serve<T>(cli: &Cli, transcriber: T) -> anyhow::Result<()>
where
    T: Transcriber + Send + Sync + 'static,
{
    let tmp_dir = cli.tmp_dir.clone().unwrap_or_else(std::env::temp_dir);
    tokio::fs::create_dir_all(&tmp_dir)
        .await
        .with_context(|| format!("Failed to create temp dir {}", tmp_dir.display()))?;

    let transcript_source = YtTranscriptClient::new(Duration::from_secs(cli.request_timeout_secs))?
        .with_languages(cli.caption_languages.clone());
    let transcoder = FfmpegTranscoder::new(&cli.ffmpeg_path)
        .with_timeout(Duration::from_secs(cli.ffmpeg_timeout_secs));

    let processor = MediaDigestProcessorBuilder::new()
        .temp_dir(&tmp_dir)
        .transcript_source(transcript_source)
        .transcoder(transcoder)
        .transcriber(transcriber)
        .summarizer(cli.openai_client()?)
        .build();

    let app = router(Arc::new(processor), cli.max_upload_bytes);

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .context("Invalid listen address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(%addr, tmp_dir = %tmp_dir.display(), "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some("production".into()),
            ..Default::default()
        },
    ));

    let cli = Cli::parse();
    init_tracing_subscriber()?;

    match cli.speech_backend {
        SpeechBackend::Remote => {
            let transcriber = LazyTranscriber::new(cli.openai_client()?);
            serve(&cli, transcriber).await
        }
        #[cfg(feature = "whisper")]
        SpeechBackend::Whisper => {
            use media_digest::whisper::{WhisperConfig, WhisperLoader};

            let transcriber = LazyTranscriber::new(WhisperLoader::new(WhisperConfig {
                model_path: cli.whisper_model_path.clone(),
                language: cli.whisper_language.clone(),
                threads: None,
            }));
            serve(&cli, transcriber).await
        }
        #[cfg(not(feature = "whisper"))]
        SpeechBackend::Whisper => {
            anyhow::bail!(
                "whisper backend requested but this binary was built without the `whisper` feature \
                 (model {}, language {:?})",
                cli.whisper_model_path.display(),
                cli.whisper_language
            )
        }
    }
}
