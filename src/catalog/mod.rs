//! Upstream internal-catalog API client.
//!
//! The default service's player metadata, search, and signature-timestamp
//! calls live behind [`CatalogApi`] so the resolvers never touch wire
//! details (and so tests can substitute the whole upstream).

pub mod wire;

use anyhow::{anyhow, Context as _, Result};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use tracing::debug;

use crate::persona::ClientPersona;
use crate::settings::ResolverSettings;

const PLAYER_URL: &str = "https://music.youtube.com/youtubei/v1/player?prettyPrint=false";
const SEARCH_URL: &str = "https://music.youtube.com/youtubei/v1/search?prettyPrint=false";
const EMBED_URL_BASE: &str = "https://www.youtube.com/embed/";

/// Search filter narrowing results to songs.
const SEARCH_SONGS_PARAMS: &str = "EgWKAQIIAWoKEAkQBRAKEAMQBA%3D%3D";

/// Persona identity used for search calls; search is not persona-sensitive
/// the way playback is, so the web music client always asks.
const SEARCH_CLIENT: (&str, &str) = ("WEB_REMIX", "1.20250310.01.00");

lazy_static! {
    static ref STS_RE: Regex = Regex::new(r#""sts"\s*:\s*(\d+)"#).unwrap();
    static ref SIGNATURE_TIMESTAMP_RE: Regex =
        Regex::new(r"signatureTimestamp[:=](\d+)").unwrap();
    static ref PLAYER_JS_RE: Regex = Regex::new(r#""jsUrl"\s*:\s*"([^"]+)""#).unwrap();
}

/// One audio-capable entry from the upstream format list. Ephemeral: lives
/// only through the scoring step of a single resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFormat {
    pub itag: Option<i64>,
    /// Bits per second.
    pub bitrate: u64,
    /// Container plus optional codec string, e.g. `audio/webm; codecs="opus"`.
    pub mime_type: String,
    /// Direct or token-augmentable url. Absence makes the candidate unusable.
    pub url: Option<String>,
    pub content_length: Option<u64>,
    pub sample_rate: Option<u32>,
}

/// Player metadata for one content id as seen through one persona.
#[derive(Debug, Clone)]
pub struct PlayerMetadata {
    pub playability_status: String,
    pub playability_reason: Option<String>,
    pub audio_formats: Vec<AudioFormat>,
}

impl PlayerMetadata {
    pub fn is_playable(&self) -> bool {
        self.playability_status == "OK"
    }
}

/// Contract over the upstream internal catalog API.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch player metadata for `content_id`, impersonating `persona`.
    async fn player_metadata(
        &self,
        persona: &ClientPersona,
        content_id: &str,
        signature_timestamp: Option<u64>,
        metadata_token: Option<&str>,
    ) -> Result<PlayerMetadata>;

    /// Current player signature timestamp, scoped to `content_id`.
    async fn signature_timestamp(&self, content_id: &str) -> Result<u64>;

    /// First search result id for `query`; used for metadata rescue.
    async fn search_first_id(&self, query: &str) -> Result<Option<String>>;
}

/// HTTP-backed catalog client.
///
/// One `reqwest::Client` with explicit connect and request timeouts; a
/// stalled upstream call fails the current persona instead of hanging the
/// media pipeline.
pub struct HttpCatalogClient {
    client: Client,
}

impl HttpCatalogClient {
    pub fn new(settings: &ResolverSettings) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .context("failed to build catalog http client")?;
        Ok(Self { client })
    }

    fn context_for<'a>(client_name: &'a str, client_version: &'a str) -> wire::Context<'a> {
        wire::Context {
            client: wire::ClientContext {
                client_name,
                client_version,
                hl: "en",
                gl: "US",
            },
        }
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    async fn player_metadata(
        &self,
        persona: &ClientPersona,
        content_id: &str,
        signature_timestamp: Option<u64>,
        metadata_token: Option<&str>,
    ) -> Result<PlayerMetadata> {
        let request = wire::PlayerRequest {
            context: Self::context_for(persona.client_name, persona.client_version),
            video_id: content_id,
            playback_context: signature_timestamp.map(|ts| wire::PlaybackContext {
                content_playback_context: wire::ContentPlaybackContext {
                    signature_timestamp: ts,
                },
            }),
            service_integrity_dimensions: metadata_token
                .map(|token| wire::ServiceIntegrityDimensions { po_token: token }),
        };

        debug!(
            persona = persona.name,
            content_id,
            has_timestamp = signature_timestamp.is_some(),
            has_token = metadata_token.is_some(),
            "requesting player metadata"
        );

        let response = self
            .client
            .post(PLAYER_URL)
            .header("User-Agent", persona.user_agent)
            .json(&request)
            .send()
            .await
            .context("player metadata request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("player metadata endpoint returned {status}"));
        }

        let parsed: wire::PlayerResponse = response
            .json()
            .await
            .context("failed to parse player metadata response")?;

        let (playability_status, playability_reason) = parsed
            .playability_status
            .map(|p| (p.status.unwrap_or_else(|| "UNKNOWN".to_string()), p.reason))
            .unwrap_or_else(|| ("UNKNOWN".to_string(), None));

        let audio_formats = parsed
            .streaming_data
            .map(|data| {
                data.adaptive_formats
                    .into_iter()
                    .filter_map(wire::RawFormat::into_audio_format)
                    .collect()
            })
            .unwrap_or_default();

        Ok(PlayerMetadata {
            playability_status,
            playability_reason,
            audio_formats,
        })
    }

    async fn signature_timestamp(&self, content_id: &str) -> Result<u64> {
        let embed_url = format!("{EMBED_URL_BASE}{content_id}");
        let page = self
            .client
            .get(&embed_url)
            .send()
            .await
            .context("embed page request failed")?
            .text()
            .await
            .context("failed to read embed page")?;

        if let Some(ts) = find_timestamp(&page) {
            return Ok(ts);
        }

        // The embed page usually inlines the value; otherwise it lives in
        // the referenced player javascript.
        let js_path = PLAYER_JS_RE
            .captures(&page)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().replace("\\/", "/"))
            .ok_or_else(|| anyhow!("no player js reference in embed page"))?;

        let js_url = format!("https://www.youtube.com{js_path}");
        let player_js = self
            .client
            .get(&js_url)
            .send()
            .await
            .context("player js request failed")?
            .text()
            .await
            .context("failed to read player js")?;

        find_timestamp(&player_js)
            .ok_or_else(|| anyhow!("no signature timestamp in player js"))
    }

    async fn search_first_id(&self, query: &str) -> Result<Option<String>> {
        let request = wire::SearchRequest {
            context: Self::context_for(SEARCH_CLIENT.0, SEARCH_CLIENT.1),
            query,
            params: SEARCH_SONGS_PARAMS,
        };

        let response = self
            .client
            .post(SEARCH_URL)
            .json(&request)
            .send()
            .await
            .context("search request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("search endpoint returned {status}"));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .context("failed to parse search response")?;

        Ok(wire::first_video_id(&body))
    }
}

fn find_timestamp(text: &str) -> Option<u64> {
    STS_RE
        .captures(text)
        .or_else(|| SIGNATURE_TIMESTAMP_RE.captures(text))
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
