//! Content-reference normalization and service detection.
//!
//! The facade accepts an opaque string: a bare content id, a watch url of
//! the default service, or a url of one of the alternate services.
//! Normalization reduces it to exactly one of: a content id, an
//! alternate-service url taken as-is, or an unresolved url that may still
//! be rescued through a metadata search.

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::extractor::StreamingService;

lazy_static! {
    static ref VIDEO_ID_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap();
}

/// Hosts of the default service whose urls embed a content id.
const DEFAULT_SERVICE_HOSTS: &[&str] = &[
    "youtube.com",
    "youtube-nocookie.com",
    "youtu.be",
];

/// Ordered detection table for the alternate services. Evaluated in
/// sequence; the first matching host wins.
const ALTERNATE_SERVICES: &[(&str, StreamingService)] = &[
    ("rumble.com", StreamingService::Rumble),
    ("soundcloud.com", StreamingService::Soundcloud),
];

/// Path segments that prefix a content id on the default service.
const ID_PATH_PREFIXES: &[&str] = &["watch", "embed", "shorts", "v", "live"];

/// Outcome of normalizing one input reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedReference {
    /// A content id of the default service, ready for the persona loop.
    VideoId(String),
    /// A url of an alternate service, dispatched to that service's resolver
    /// without further transformation.
    AlternateUrl(StreamingService, String),
    /// A url from which no content id could be extracted. Only a
    /// metadata-based rescue search can still save this input.
    UnresolvedUrl(String),
}

/// Normalize an input reference.
///
/// A bare id passes through unchanged, so normalization is idempotent:
/// re-normalizing the extracted id of a watch url yields the same id.
pub fn normalize(reference: &str) -> NormalizedReference {
    let reference = reference.trim();

    let Some(url) = parse_url(reference) else {
        return NormalizedReference::VideoId(reference.to_string());
    };

    // Carries the parsed form so scheme-less input still reaches the
    // extractor as an addressable url.
    if let Some(service) = detect_alternate_service(&url) {
        return NormalizedReference::AlternateUrl(service, url.to_string());
    }

    if is_default_service(&url) {
        if let Some(id) = extract_video_id(&url) {
            return NormalizedReference::VideoId(id);
        }
    }

    NormalizedReference::UnresolvedUrl(reference.to_string())
}

/// Which alternate service, if any, the url belongs to.
pub fn detect_alternate_service(url: &Url) -> Option<StreamingService> {
    let host = url.host_str()?;
    ALTERNATE_SERVICES
        .iter()
        .find(|(domain, _)| host_matches(host, domain))
        .map(|(_, service)| *service)
}

/// Canonical watch url for a content id, used by the fallback extractor.
pub fn canonical_watch_url(content_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={content_id}")
}

fn parse_url(reference: &str) -> Option<Url> {
    if reference.contains("://") {
        return Url::parse(reference)
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https"));
    }

    // Scheme-less paste artifacts like "youtube.com/watch?v=...". Assume
    // https, but only for hosts of a known service; anything else keeps
    // its bare-id treatment.
    if !reference.contains('/') {
        return None;
    }
    Url::parse(&format!("https://{reference}"))
        .ok()
        .filter(|u| is_default_service(u) || detect_alternate_service(u).is_some())
}

fn is_default_service(url: &Url) -> bool {
    url.host_str()
        .map(|host| {
            DEFAULT_SERVICE_HOSTS
                .iter()
                .any(|domain| host_matches(host, domain))
        })
        .unwrap_or(false)
}

fn host_matches(host: &str, domain: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == domain || host.ends_with(&format!(".{domain}"))
}

/// Extract the content id from a default-service url. Host-specific rules,
/// tried in order: the `v` query parameter, a known path-segment prefix,
/// then the short-link path.
fn extract_video_id(url: &Url) -> Option<String> {
    if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "v") {
        if VIDEO_ID_RE.is_match(&v) {
            return Some(v.into_owned());
        }
    }

    if let Some(mut segments) = url.path_segments() {
        while let Some(segment) = segments.next() {
            if ID_PATH_PREFIXES.contains(&segment) {
                if let Some(id) = segments.next() {
                    if VIDEO_ID_RE.is_match(id) {
                        return Some(id.to_string());
                    }
                }
                break;
            }
        }
    }

    if url
        .host_str()
        .is_some_and(|h| host_matches(h, "youtu.be"))
    {
        if let Some(id) = url.path_segments().and_then(|mut s| s.next()) {
            if VIDEO_ID_RE.is_match(id) {
                return Some(id.to_string());
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_url_yields_embedded_id() {
        let normalized = normalize("https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(
            normalized,
            NormalizedReference::VideoId("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_bare_id_passes_through_unchanged() {
        // Idempotence: re-normalizing an already extracted id is a no-op.
        let normalized = normalize("dQw4w9WgXcQ");
        assert_eq!(
            normalized,
            NormalizedReference::VideoId("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_query_parameter_tried_before_path_segment() {
        let normalized = normalize("https://www.youtube.com/embed/AAAAAAAAAAA?v=dQw4w9WgXcQ");
        assert_eq!(
            normalized,
            NormalizedReference::VideoId("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_path_segment_extraction() {
        for path in ["watch", "embed", "shorts", "v", "live"] {
            let normalized = normalize(&format!("https://www.youtube.com/{path}/dQw4w9WgXcQ"));
            assert_eq!(
                normalized,
                NormalizedReference::VideoId("dQw4w9WgXcQ".to_string()),
                "path prefix {path}"
            );
        }
    }

    #[test]
    fn test_watch_path_segment_extraction() {
        let normalized = normalize("https://www.youtube.com/watch/dQw4w9WgXcQ");
        assert_eq!(
            normalized,
            NormalizedReference::VideoId("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_scheme_less_watch_url_yields_embedded_id() {
        let normalized = normalize("youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(
            normalized,
            NormalizedReference::VideoId("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_scheme_less_alternate_url_routes_to_its_service() {
        let normalized = normalize("soundcloud.com/artist/track");
        assert_eq!(
            normalized,
            NormalizedReference::AlternateUrl(
                StreamingService::Soundcloud,
                "https://soundcloud.com/artist/track".to_string()
            )
        );
    }

    #[test]
    fn test_scheme_less_unknown_host_keeps_bare_id_treatment() {
        let normalized = normalize("example.com/some/page");
        assert_eq!(
            normalized,
            NormalizedReference::VideoId("example.com/some/page".to_string())
        );
    }

    #[test]
    fn test_short_link_extraction() {
        let normalized = normalize("https://youtu.be/dQw4w9WgXcQ?t=10");
        assert_eq!(
            normalized,
            NormalizedReference::VideoId("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_music_subdomain_is_default_service() {
        let normalized = normalize("https://music.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(
            normalized,
            NormalizedReference::VideoId("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_watch_url_without_id_stays_unresolved() {
        let normalized = normalize("https://www.youtube.com/watch");
        assert_eq!(
            normalized,
            NormalizedReference::UnresolvedUrl("https://www.youtube.com/watch".to_string())
        );
    }

    #[test]
    fn test_soundcloud_url_routes_to_alternate_service() {
        let normalized = normalize("https://soundcloud.com/artist/track");
        assert_eq!(
            normalized,
            NormalizedReference::AlternateUrl(
                StreamingService::Soundcloud,
                "https://soundcloud.com/artist/track".to_string()
            )
        );
    }

    #[test]
    fn test_rumble_url_routes_to_alternate_service() {
        let normalized = normalize("https://rumble.com/v12345-some-title.html");
        assert!(matches!(
            normalized,
            NormalizedReference::AlternateUrl(StreamingService::Rumble, _)
        ));
    }

    #[test]
    fn test_alternate_detection_matches_subdomains() {
        let url = Url::parse("https://on.soundcloud.com/xyz").unwrap();
        assert_eq!(
            detect_alternate_service(&url),
            Some(StreamingService::Soundcloud)
        );
    }

    #[test]
    fn test_lookalike_host_is_not_an_alternate_service() {
        let url = Url::parse("https://notsoundcloud.com/artist/track").unwrap();
        assert_eq!(detect_alternate_service(&url), None);
    }

    #[test]
    fn test_unknown_url_stays_unresolved() {
        let normalized = normalize("https://example.com/some/page");
        assert_eq!(
            normalized,
            NormalizedReference::UnresolvedUrl("https://example.com/some/page".to_string())
        );
    }

    #[test]
    fn test_canonical_watch_url() {
        assert_eq!(
            canonical_watch_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }
}
