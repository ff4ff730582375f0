//! Stream resolution: facade, persona loop, and extraction fallbacks.

mod alternate;
mod facade;
mod fallback;
mod primary;

pub use alternate::AlternateResolver;
pub use facade::StreamResolver;
pub use fallback::FallbackResolver;
pub use primary::PrimaryResolver;

/// Final output of a resolution: everything the playback pipeline needs to
/// open the byte stream. Always a fresh, call-local value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamResult {
    /// Fully addressable media url; no further transformation needed.
    pub url: String,
    /// `User-Agent` header the consumer must send when opening `url`.
    pub user_agent: String,
    /// Human-readable quality, e.g. "Opus 160kbps".
    pub quality_label: String,
}
