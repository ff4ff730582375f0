//! Primary resolver: the persona loop over the internal catalog API.
//!
//! Personas are tried strictly in registry order, one at a time. Any
//! failure inside one attempt (transport, playability, empty format list,
//! missing url) is captured, logged, and answered by advancing to the next
//! persona; the first persona to produce a playable format wins outright.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::{AudioFormat, CatalogApi};
use crate::error::{PersonaFailure, ResolutionError};
use crate::persona::ClientPersona;
use crate::settings::ResolverSettings;
use crate::store::{FormatRecordStore, PersistedFormatRecord};
use crate::token::{self, SessionSource, TokenProvider};

use super::StreamResult;

pub struct PrimaryResolver {
    catalog: Arc<dyn CatalogApi>,
    token_provider: Arc<dyn TokenProvider>,
    session: Arc<dyn SessionSource>,
    record_store: Arc<dyn FormatRecordStore>,
    personas: &'static [ClientPersona],
    settings: ResolverSettings,
}

impl PrimaryResolver {
    pub fn new(
        catalog: Arc<dyn CatalogApi>,
        token_provider: Arc<dyn TokenProvider>,
        session: Arc<dyn SessionSource>,
        record_store: Arc<dyn FormatRecordStore>,
        personas: &'static [ClientPersona],
        settings: ResolverSettings,
    ) -> Self {
        Self {
            catalog,
            token_provider,
            session,
            record_store,
            personas,
            settings,
        }
    }

    /// Resolve `content_id` through the persona loop.
    pub async fn resolve(&self, content_id: &str) -> Result<StreamResult, ResolutionError> {
        let mut last_failure = None;

        for persona in self.personas {
            match self.attempt(persona, content_id).await {
                Ok(result) => {
                    info!(
                        persona = persona.name,
                        content_id,
                        quality = %result.quality_label,
                        "resolved stream"
                    );
                    return Ok(result);
                }
                Err(failure) => {
                    warn!(
                        persona = persona.name,
                        content_id,
                        "persona attempt failed: {failure}"
                    );
                    last_failure = Some(failure);
                }
            }
        }

        Err(ResolutionError::AllPersonasFailed {
            last: last_failure
                .unwrap_or_else(|| PersonaFailure::Transport("no personas configured".to_string())),
        })
    }

    async fn attempt(
        &self,
        persona: &ClientPersona,
        content_id: &str,
    ) -> Result<StreamResult, PersonaFailure> {
        let signature_timestamp = if persona.requires_signature_timestamp {
            match self.catalog.signature_timestamp(content_id).await {
                Ok(ts) => Some(ts),
                Err(e) => {
                    // Best-effort: some personas tolerate a missing timestamp.
                    warn!(
                        persona = persona.name,
                        content_id, "signature timestamp fetch failed: {e}"
                    );
                    None
                }
            }
        } else {
            None
        };

        let attestation = if persona.requires_attestation_token {
            match self.session.session_id() {
                Some(session_id) => {
                    token::fetch_bounded(
                        self.token_provider.as_ref(),
                        self.settings.token_timeout,
                        content_id,
                        &session_id,
                    )
                    .await
                }
                None => {
                    debug!(
                        persona = persona.name,
                        "no session identity, attempting without attestation token"
                    );
                    None
                }
            }
        } else {
            None
        };

        let metadata = self
            .catalog
            .player_metadata(
                persona,
                content_id,
                signature_timestamp,
                attestation.as_ref().map(|t| t.metadata_token.as_str()),
            )
            .await
            .map_err(|e| PersonaFailure::Transport(e.to_string()))?;

        if !metadata.is_playable() {
            return Err(PersonaFailure::NotPlayable {
                status: metadata.playability_status,
                reason: metadata
                    .playability_reason
                    .unwrap_or_else(|| "unknown".to_string()),
            });
        }
        if metadata.audio_formats.is_empty() {
            return Err(PersonaFailure::EmptyFormatList);
        }

        let best = select_best_format(&metadata.audio_formats, self.settings.opus_bonus);
        let Some(base_url) = best.url.clone() else {
            return Err(PersonaFailure::MissingUrl);
        };

        let url = match &attestation {
            Some(t) if !t.streaming_token.is_empty() => {
                append_query_param(&base_url, "pot", &t.streaming_token)
            }
            _ => base_url,
        };

        self.persist_record(content_id, best);

        Ok(StreamResult {
            url,
            user_agent: persona.user_agent.to_string(),
            quality_label: quality_label(best),
        })
    }

    /// Best-effort bookkeeping; a failing store never fails resolution.
    fn persist_record(&self, content_id: &str, format: &AudioFormat) {
        let record = PersistedFormatRecord::from_format(content_id, format);
        if let Err(e) = self.record_store.upsert_format_record(&record) {
            warn!(content_id, "failed to persist format record: {e}");
        }
    }
}

/// Deterministic selection: `score = bitrate`, plus a fixed bonus for
/// Opus/WebM containers that dominates any bitrate difference. Ties break
/// by list order, first wins.
fn select_best_format(formats: &[AudioFormat], opus_bonus: u64) -> &AudioFormat {
    let mut best = &formats[0];
    let mut best_score = score(best, opus_bonus);
    for format in &formats[1..] {
        let candidate = score(format, opus_bonus);
        if candidate > best_score {
            best = format;
            best_score = candidate;
        }
    }
    best
}

fn score(format: &AudioFormat, opus_bonus: u64) -> u64 {
    if is_opus(&format.mime_type) {
        format.bitrate + opus_bonus
    } else {
        format.bitrate
    }
}

fn is_opus(mime_type: &str) -> bool {
    let mime = mime_type.to_ascii_lowercase();
    mime.contains("webm") || mime.contains("opus")
}

fn is_mp4(mime_type: &str) -> bool {
    let mime = mime_type.to_ascii_lowercase();
    mime.contains("mp4") || mime.contains("m4a")
}

fn quality_label(format: &AudioFormat) -> String {
    let kbps = format.bitrate / 1000;
    if is_opus(&format.mime_type) {
        format!("Opus {kbps}kbps")
    } else if is_mp4(&format.mime_type) {
        format!("M4A {kbps}kbps")
    } else {
        format!("YouTube {kbps}kbps")
    }
}

fn append_query_param(url: &str, key: &str, value: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{key}={}", urlencoding::encode(value))
}
