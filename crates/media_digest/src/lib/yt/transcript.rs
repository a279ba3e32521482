use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::{
    error::TranscriptError,
    parser::{parse_caption_tracks, parse_json3, select_track, YtHtmlDocument},
    yt::TranscriptSource,
    Transcript, VideoReference,
};

/// Reads YouTube captions through the innertube `player` endpoint.
#[derive(Debug, Clone)]
pub struct YtTranscriptClient {
    client: Client,
    languages: Vec<String>,
}

impl YtTranscriptClient {
    const PLAYER_URL: &'static str = "https://www.youtube.com/youtubei/v1/player";
    const ANDROID_CLIENT_VERSION: &'static str = "20.10.38";

    pub fn new(timeout: Duration) -> Result<Self, TranscriptError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            languages: vec!["en".to_string()],
        })
    }

    /// Caption languages in order of preference
    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        if !languages.is_empty() {
            self.languages = languages;
        }
        self
    }

    fn check_rate_limit(resp: &reqwest::Response) -> Result<(), TranscriptError> {
        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(TranscriptError::RateLimited);
        }
        Ok(())
    }

    /// Loads the watch page, which carries the innertube api key
    async fn fetch_watch_page(&self, video: &VideoReference) -> Result<YtHtmlDocument, TranscriptError> {
        let resp = self
            .client
            .get(<Self as TranscriptSource>::BASE_URL)
            .query(&[("v", video.as_str())])
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;
        Self::check_rate_limit(&resp)?;

        let doc = YtHtmlDocument::from(resp.error_for_status()?.text().await?);
        if doc.is_captcha() {
            return Err(TranscriptError::RateLimited);
        }
        Ok(doc)
    }

    async fn fetch_player(&self, video: &VideoReference, api_key: &str) -> Result<Value, TranscriptError> {
        let body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": "ANDROID",
                    "clientVersion": Self::ANDROID_CLIENT_VERSION
                }
            },
            "videoId": video.as_str()
        });

        let resp = self
            .client
            .post(Self::PLAYER_URL)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;
        Self::check_rate_limit(&resp)?;

        Ok(resp.error_for_status()?.json::<Value>().await?)
    }
}

impl TranscriptSource for YtTranscriptClient {
    const BASE_URL: &'static str = "https://www.youtube.com/watch";

    #[tracing::instrument(skip_all, fields(video_id = %video))]
    async fn fetch(&self, video: &VideoReference) -> Result<Transcript, TranscriptError> {
        let doc = self.fetch_watch_page(video).await?;
        let api_key = doc.innertube_api_key()?;

        let player = self.fetch_player(video, &api_key).await?;
        let tracks = parse_caption_tracks(&player, video)?;

        let track = select_track(&tracks, &self.languages)
            .ok_or_else(|| TranscriptError::NoCaptions(video.to_string()))?;
        tracing::debug!(language = %track.language_code, generated = track.is_generated(), "Selected caption track");

        let resp = self
            .client
            .get(track.json3_url())
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;
        Self::check_rate_limit(&resp)?;
        let body = resp.error_for_status()?.text().await?;

        let segments = parse_json3(&body)?;
        if segments.is_empty() {
            return Err(TranscriptError::NoCaptions(video.to_string()));
        }

        tracing::info!(segments = segments.len(), "Fetched transcript");
        Ok(Transcript::new(segments))
    }
}
