//! Static in-process resolver settings.
//!
//! There is deliberately no CLI or environment surface here: which personas
//! exist and which services are enabled is compiled-in data, and the
//! consumer constructs a [`ResolverSettings`] value at startup.

use std::time::Duration;

/// Fixed bonus added to an audio format's bitrate score when its MIME type
/// indicates an Opus/WebM container. Large enough to dominate any realistic
/// bitrate difference, so Opus always outranks other codecs.
pub const OPUS_SCORE_BONUS: u64 = 10_000_000;

/// Desktop browser identity used for page-extraction paths, which have no
/// persona-specific user agent.
pub const DESKTOP_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0.0.0 Safari/537.36";

/// Settings for the stream-resolution core.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    /// TCP connect timeout for every upstream HTTP call.
    pub connect_timeout: Duration,
    /// Whole-request timeout for every upstream HTTP call. A stalled persona
    /// must never hang the calling media pipeline indefinitely.
    pub request_timeout: Duration,
    /// Upper bound on one attestation-token acquisition. The token routine
    /// drives an embedded web engine and is the component most likely to
    /// hang against a changing upstream.
    pub token_timeout: Duration,
    /// Bitrate bonus applied to Opus/WebM formats during scoring.
    pub opus_bonus: u64,
    /// User agent for fallback and alternate-service extraction results.
    pub extraction_user_agent: String,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(20),
            token_timeout: Duration::from_secs(8),
            opus_bonus: OPUS_SCORE_BONUS,
            extraction_user_agent: DESKTOP_USER_AGENT.to_string(),
        }
    }
}
