//! Wire types for the upstream internal catalog API.
//!
//! The upstream schema is reverse-engineered and unstable; every field name
//! the crate knows about lives in this module and nowhere else.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::AudioFormat;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRequest<'a> {
    pub context: Context<'a>,
    pub video_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback_context: Option<PlaybackContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_integrity_dimensions: Option<ServiceIntegrityDimensions<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Context<'a> {
    pub client: ClientContext<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientContext<'a> {
    pub client_name: &'a str,
    pub client_version: &'a str,
    pub hl: &'a str,
    pub gl: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackContext {
    pub content_playback_context: ContentPlaybackContext,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPlaybackContext {
    pub signature_timestamp: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceIntegrityDimensions<'a> {
    pub po_token: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub context: Context<'a>,
    pub query: &'a str,
    pub params: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    #[serde(default)]
    pub playability_status: Option<PlayabilityStatus>,
    #[serde(default)]
    pub streaming_data: Option<StreamingData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayabilityStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingData {
    #[serde(default)]
    pub adaptive_formats: Vec<RawFormat>,
}

/// One format entry as the upstream serializes it. Numeric-looking fields
/// arrive as strings; conversion happens in [`RawFormat::into_audio_format`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFormat {
    #[serde(default)]
    pub itag: Option<i64>,
    #[serde(default)]
    pub bitrate: Option<u64>,
    #[serde(default)]
    pub average_bitrate: Option<u64>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content_length: Option<String>,
    #[serde(default)]
    pub audio_sample_rate: Option<String>,
}

impl RawFormat {
    /// Convert into the crate's format candidate; `None` for entries that
    /// are not audio or carry no bitrate.
    pub fn into_audio_format(self) -> Option<AudioFormat> {
        let mime_type = self.mime_type?;
        if !mime_type.starts_with("audio/") {
            return None;
        }
        let bitrate = self.bitrate.or(self.average_bitrate)?;
        Some(AudioFormat {
            itag: self.itag,
            bitrate,
            mime_type,
            url: self.url,
            content_length: self.content_length.and_then(|s| s.parse().ok()),
            sample_rate: self.audio_sample_rate.and_then(|s| s.parse().ok()),
        })
    }
}

/// Depth-first scan for the first `videoId` string in a search response.
///
/// Search result markup is deeply nested and reshuffled often; scanning for
/// the id is far more robust than modelling the renderer tree.
pub fn first_video_id(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(id)) = map.get("videoId") {
                return Some(id.clone());
            }
            map.values().find_map(first_video_id)
        }
        Value::Array(items) => items.iter().find_map(first_video_id),
        _ => None,
    }
}
