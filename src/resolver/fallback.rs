//! Page-scraping fallback for the default service.
//!
//! Used only after every persona has failed. This path has no
//! codec-preference logic: it simply takes the audio stream with the
//! highest average bitrate off the public watch page.

use std::sync::Arc;

use tracing::info;

use crate::error::ResolutionError;
use crate::extractor::{ExtractedStream, PageExtractor, StreamingService};

use super::StreamResult;

pub struct FallbackResolver {
    extractor: Arc<dyn PageExtractor>,
    user_agent: String,
}

impl FallbackResolver {
    pub fn new(extractor: Arc<dyn PageExtractor>, user_agent: String) -> Self {
        Self {
            extractor,
            user_agent,
        }
    }

    /// Resolve via page extraction of the canonical watch url.
    pub async fn resolve(&self, watch_url: &str) -> Result<StreamResult, ResolutionError> {
        info!(watch_url, "attempting page-extraction fallback");

        let streams = self
            .extractor
            .fetch_streams(StreamingService::Youtube, watch_url)
            .await
            .map_err(|e| ResolutionError::ExtractionFailed(e.to_string()))?;

        let best = best_by_bitrate(&streams.audio).ok_or_else(|| {
            ResolutionError::ExtractionFailed(format!(
                "extractor returned no audio streams for {watch_url}"
            ))
        })?;

        let format = best.format.as_deref().unwrap_or("Audio");
        let kbps = best.average_bitrate / 1000;

        Ok(StreamResult {
            url: best.url.clone(),
            user_agent: self.user_agent.clone(),
            quality_label: format!("{format} {kbps}kbps (Fallback)"),
        })
    }
}

/// Simple maximum by average bitrate; ties keep the earlier entry.
pub(super) fn best_by_bitrate(streams: &[ExtractedStream]) -> Option<&ExtractedStream> {
    let mut best: Option<&ExtractedStream> = None;
    for stream in streams {
        if best.is_none_or(|b| stream.average_bitrate > b.average_bitrate) {
            best = Some(stream);
        }
    }
    best
}
