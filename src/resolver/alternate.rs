//! Alternate-service resolvers.
//!
//! The secondary streaming host and the audio-hosting platform have no
//! internal-API path at all; page extraction is their only resolution
//! strategy, so their failures are terminal (no further fallback exists).

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::ResolutionError;
use crate::extractor::{Delivery, ExtractedStream, PageExtractor, StreamingService};

use super::fallback::best_by_bitrate;
use super::StreamResult;

/// Resolver for one alternate service, shared in structure between the two.
pub struct AlternateResolver {
    service: StreamingService,
    extractor: Arc<dyn PageExtractor>,
    user_agent: String,
}

impl AlternateResolver {
    pub fn new(
        service: StreamingService,
        extractor: Arc<dyn PageExtractor>,
        user_agent: String,
    ) -> Self {
        Self {
            service,
            extractor,
            user_agent,
        }
    }

    pub fn service(&self) -> StreamingService {
        self.service
    }

    /// Resolve the given service url. Preference ladder: progressive audio,
    /// then any audio, then (as a last resort) the best video payload.
    pub async fn resolve(&self, url: &str) -> Result<StreamResult, ResolutionError> {
        info!(service = %self.service, url, "resolving alternate-service url");

        let streams = self
            .extractor
            .fetch_streams(self.service, url)
            .await
            .map_err(|e| ResolutionError::NoStreamsFound(format!("{}: {e}", self.service)))?;

        let progressive: Vec<ExtractedStream> = streams
            .audio
            .iter()
            .filter(|s| s.delivery == Delivery::Progressive)
            .cloned()
            .collect();
        let audio_pool = if progressive.is_empty() {
            &streams.audio
        } else {
            &progressive
        };

        if let Some(stream) = best_by_bitrate(audio_pool) {
            return Ok(self.result_for(stream, false));
        }

        // Last resort: hand the player a video payload rather than nothing.
        let video_pool: Vec<ExtractedStream> = streams
            .video
            .iter()
            .chain(streams.video_only.iter())
            .cloned()
            .collect();
        if let Some(stream) = best_by_bitrate(&video_pool) {
            warn!(
                service = %self.service,
                url, "no audio streams, falling back to a video stream"
            );
            return Ok(self.result_for(stream, true));
        }

        Err(ResolutionError::NoStreamsFound(format!(
            "{} returned no streams for {url}",
            self.service
        )))
    }

    fn result_for(&self, stream: &ExtractedStream, video_payload: bool) -> StreamResult {
        let format = stream.format.as_deref().unwrap_or("Audio");
        let kbps = stream.average_bitrate / 1000;
        let quality_label = if video_payload {
            format!("{format} {kbps}kbps (Video)")
        } else {
            format!("{format} {kbps}kbps")
        };
        StreamResult {
            url: stream.url.clone(),
            user_agent: self.user_agent.clone(),
            quality_label,
        }
    }
}
