//! Chosen-format bookkeeping handed to the persistence collaborator.
//!
//! After a primary-resolver success the core emits one record describing
//! the format it picked, for later display and diagnostics. The record's
//! lifecycle is owned by the external store; from here the write is
//! best-effort and its failure never surfaces as a resolution error.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::catalog::AudioFormat;

/// Durable record of the format chosen for one content id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedFormatRecord {
    pub content_id: String,
    /// Container part of the MIME type, codec suffix stripped.
    pub container: String,
    /// Codec string from the MIME `codecs` parameter, when present.
    pub codec: Option<String>,
    /// Bitrate in bits per second.
    pub bitrate: u64,
    pub sample_rate: Option<u32>,
    pub content_length: Option<u64>,
    pub resolved_at: DateTime<Utc>,
}

impl PersistedFormatRecord {
    /// Build the record for a selected format.
    pub fn from_format(content_id: &str, format: &AudioFormat) -> Self {
        let (container, codec) = split_mime(&format.mime_type);
        Self {
            content_id: content_id.to_string(),
            container,
            codec,
            bitrate: format.bitrate,
            sample_rate: format.sample_rate,
            content_length: format.content_length,
            resolved_at: Utc::now(),
        }
    }
}

/// Split a MIME type into its container and optional codec string, e.g.
/// `audio/webm; codecs="opus"` into `("audio/webm", Some("opus"))`.
fn split_mime(mime_type: &str) -> (String, Option<String>) {
    let mut parts = mime_type.splitn(2, ';');
    let container = parts.next().unwrap_or_default().trim().to_string();
    let codec = parts.next().and_then(|rest| {
        let rest = rest.trim();
        rest.strip_prefix("codecs=")
            .map(|c| c.trim_matches('"').to_string())
            .filter(|c| !c.is_empty())
    });
    (container, codec)
}

/// Trait for format-record storage backends.
#[cfg_attr(test, mockall::automock)]
pub trait FormatRecordStore: Send + Sync {
    /// Insert or replace the record for its content id.
    fn upsert_format_record(&self, record: &PersistedFormatRecord) -> Result<()>;
}

/// Store that drops every record, for consumers without persistence.
#[derive(Debug, Default)]
pub struct NoopFormatRecordStore;

impl FormatRecordStore for NoopFormatRecordStore {
    fn upsert_format_record(&self, _record: &PersistedFormatRecord) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opus_format() -> AudioFormat {
        AudioFormat {
            itag: Some(251),
            bitrate: 160_000,
            mime_type: "audio/webm; codecs=\"opus\"".to_string(),
            url: Some("https://example.com/stream".to_string()),
            content_length: Some(3_500_000),
            sample_rate: Some(48_000),
        }
    }

    #[test]
    fn test_record_strips_codec_suffix_from_container() {
        let record = PersistedFormatRecord::from_format("dQw4w9WgXcQ", &opus_format());
        assert_eq!(record.container, "audio/webm");
        assert_eq!(record.codec.as_deref(), Some("opus"));
        assert_eq!(record.bitrate, 160_000);
        assert_eq!(record.sample_rate, Some(48_000));
        assert_eq!(record.content_length, Some(3_500_000));
    }

    #[test]
    fn test_split_mime_without_codec() {
        assert_eq!(split_mime("audio/mp4"), ("audio/mp4".to_string(), None));
    }

    #[test]
    fn test_split_mime_with_unquoted_codec() {
        assert_eq!(
            split_mime("audio/mp4; codecs=mp4a.40.2"),
            ("audio/mp4".to_string(), Some("mp4a.40.2".to_string()))
        );
    }
}
