//! Page-scraping extraction boundary.
//!
//! The fallback and alternate-service paths do not call the internal
//! catalog API at all; they hand a public watch/stream page to a generic
//! extraction library and work with whatever streams it surfaces. The
//! library is consumed as a black box behind [`PageExtractor`].

use anyhow::Result;
use async_trait::async_trait;

/// Source services the extraction library is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamingService {
    /// The default service, also reachable through the internal catalog API.
    Youtube,
    /// Secondary streaming host; page extraction is the only path.
    Rumble,
    /// Audio-hosting platform; page extraction is the only path.
    Soundcloud,
}

impl StreamingService {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::Rumble => "rumble",
            Self::Soundcloud => "soundcloud",
        }
    }
}

impl std::fmt::Display for StreamingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How a stream's bytes are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Single addressable file; preferred, opens fastest.
    Progressive,
    /// Chunked manifest (HLS/DASH).
    Manifest,
}

/// One stream surfaced by the extraction library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedStream {
    pub url: String,
    /// Average bitrate in bits per second.
    pub average_bitrate: u64,
    /// Short format name as reported by the extractor, e.g. "opus", "mp3".
    pub format: Option<String>,
    pub delivery: Delivery,
}

/// Everything the extractor found on one page, split by stream kind.
#[derive(Debug, Clone, Default)]
pub struct ExtractedStreams {
    /// Audio-only streams.
    pub audio: Vec<ExtractedStream>,
    /// Muxed audio+video streams.
    pub video: Vec<ExtractedStream>,
    /// Video-only streams.
    pub video_only: Vec<ExtractedStream>,
}

/// Black-box contract over the extraction library.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageExtractor: Send + Sync {
    /// Extract the streams of the page at `url`, using the extractor's
    /// registration for `service`.
    async fn fetch_streams(&self, service: StreamingService, url: &str)
        -> Result<ExtractedStreams>;
}
