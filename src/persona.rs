//! Upstream client personas.
//!
//! The internal catalog API reveals different stream URLs depending on which
//! official client it believes is asking. Each persona describes one such
//! client identity; the registry is tried strictly in list order and the
//! first persona to yield a playable format wins.

/// Immutable descriptor of one upstream client identity.
///
/// Created once as static configuration and never mutated; safe to share
/// across concurrent resolutions without locking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientPersona {
    /// Short identity tag used in logs.
    pub name: &'static str,
    /// `clientName` value sent in the request context.
    pub client_name: &'static str,
    /// `clientVersion` value sent in the request context.
    pub client_version: &'static str,
    /// User agent for both the metadata call and the final media request.
    pub user_agent: &'static str,
    /// Whether this persona only reveals streams with an attestation token.
    pub requires_attestation_token: bool,
    /// Whether the metadata call needs a player signature timestamp.
    pub requires_signature_timestamp: bool,
}

/// Built-in persona registry, most trusted first.
///
/// The mobile music clients return direct URLs without signature ciphering,
/// so they lead. The embedded TV player tolerates a missing signature
/// timestamp for some content. The web music client is last: it demands
/// both the timestamp and an attestation token, but survives upstream
/// changes that block the mobile identities.
pub const DEFAULT_PERSONAS: &[ClientPersona] = &[
    ClientPersona {
        name: "android-music",
        client_name: "ANDROID_MUSIC",
        client_version: "7.27.52",
        user_agent: "com.google.android.apps.youtube.music/7.27.52 (Linux; U; Android 11) gzip",
        requires_attestation_token: false,
        requires_signature_timestamp: false,
    },
    ClientPersona {
        name: "ios-music",
        client_name: "IOS_MUSIC",
        client_version: "7.31.4",
        user_agent:
            "com.google.ios.youtubemusic/7.31.4 (iPhone16,2; U; CPU iOS 18_3_2 like Mac OS X;)",
        requires_attestation_token: false,
        requires_signature_timestamp: false,
    },
    ClientPersona {
        name: "tv-embedded",
        client_name: "TVHTML5_SIMPLY_EMBEDDED_PLAYER",
        client_version: "2.0",
        user_agent: "Mozilla/5.0 (PlayStation; PlayStation 4/12.00) AppleWebKit/605.1.15 \
                     (KHTML, like Gecko) Version/13.0 Safari/605.1.15",
        requires_attestation_token: false,
        requires_signature_timestamp: true,
    },
    ClientPersona {
        name: "web-remix",
        client_name: "WEB_REMIX",
        client_version: "1.20250310.01.00",
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
        requires_attestation_token: true,
        requires_signature_timestamp: true,
    },
];
