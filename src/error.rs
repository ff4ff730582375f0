//! Resolution error taxonomy.
//!
//! Only the variants of [`ResolutionError`] ever leave the crate. Everything
//! else (per-persona failures, token/timestamp acquisition problems) is
//! caught, logged, and converted into "try the next strategy".

use thiserror::Error;

/// Terminal errors surfaced by [`crate::StreamResolver`].
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// Input could not be normalized to a content id or a supported
    /// alternate-service url, and no metadata-based rescue succeeded.
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// Every client persona in the registry failed. The facade retries via
    /// page extraction before this reaches the caller.
    #[error("all client personas failed, last: {last}")]
    AllPersonasFailed { last: PersonaFailure },

    /// Page-scraping extraction for the default service failed too.
    #[error("page extraction failed: {0}")]
    ExtractionFailed(String),

    /// An alternate-service resolver found no usable stream. There is no
    /// further fallback for alternate services.
    #[error("no usable streams found: {0}")]
    NoStreamsFound(String),

    /// The caller's overall deadline elapsed before any path finished.
    #[error("resolution abandoned after {0:?}")]
    DeadlineExceeded(std::time::Duration),
}

/// Failure of a single persona attempt.
///
/// Never surfaced individually: the persona loop records it and advances to
/// the next persona. The last one is carried inside
/// [`ResolutionError::AllPersonasFailed`] for diagnostics.
#[derive(Debug, Clone, Error)]
pub enum PersonaFailure {
    #[error("transport or parse error: {0}")]
    Transport(String),

    #[error("playability status {status}: {reason}")]
    NotPlayable { status: String, reason: String },

    #[error("upstream returned no audio formats")]
    EmptyFormatList,

    #[error("selected format carries no url")]
    MissingUrl,
}
