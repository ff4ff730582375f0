//! Anti-bot attestation tokens.
//!
//! Certain personas only reveal stream URLs when the request carries an
//! attestation token produced by an embedded web-engine proof-of-work
//! routine. That routine is a black box behind [`TokenProvider`]; the core
//! only enforces its contract: callable from a background task, stateless
//! across calls, bounded in time, and always optional — every failure path
//! degrades to "proceed without a token".

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

/// Short-lived pair of opaque token strings, scoped to a single
/// `(content_id, session_id)` request. Never cached, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationToken {
    /// Sent alongside the player metadata request.
    pub metadata_token: String,
    /// Appended to the final media url as the `pot` query parameter.
    pub streaming_token: String,
}

/// Source of the session identity that scopes token requests.
///
/// The account sync id is preferred when the user is authenticated; the
/// anonymous visitor id is the fallback. "Logged in but no sync id yet" and
/// "never logged in" are deliberately indistinguishable: both degrade to
/// the visitor id, or to a tokenless attempt when neither is set.
pub trait SessionSource: Send + Sync {
    /// Sync id of the authenticated account, when available.
    fn account_sync_id(&self) -> Option<String>;

    /// Anonymous visitor id, when available.
    fn visitor_id(&self) -> Option<String>;

    /// The identifier token requests are scoped to.
    fn session_id(&self) -> Option<String> {
        self.account_sync_id().or_else(|| self.visitor_id())
    }
}

/// Fixed session identity, for consumers without an auth collaborator.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    pub account_sync_id: Option<String>,
    pub visitor_id: Option<String>,
}

impl SessionSource for StaticSession {
    fn account_sync_id(&self) -> Option<String> {
        self.account_sync_id.clone()
    }

    fn visitor_id(&self) -> Option<String> {
        self.visitor_id.clone()
    }
}

/// Attestation token provider.
///
/// Implementations wrap the embedded attestation routine. Callers must
/// tolerate any error and proceed without a token; the persona loop never
/// turns a token failure into a resolution failure.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Produce a token pair for `content_id`, scoped to `session_id`.
    async fn fetch(&self, content_id: &str, session_id: &str) -> Result<AttestationToken>;
}

/// Run one provider call under the configured time bound, degrading every
/// failure to `None`.
pub(crate) async fn fetch_bounded(
    provider: &dyn TokenProvider,
    timeout: Duration,
    content_id: &str,
    session_id: &str,
) -> Option<AttestationToken> {
    match tokio::time::timeout(timeout, provider.fetch(content_id, session_id)).await {
        Ok(Ok(token)) => {
            debug!(content_id, "acquired attestation token");
            Some(token)
        }
        Ok(Err(e)) => {
            warn!(content_id, "attestation token acquisition failed: {e}");
            None
        }
        Err(_) => {
            warn!(
                content_id,
                "attestation token acquisition timed out after {timeout:?}"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct HangingProvider;

    #[async_trait]
    impl TokenProvider for HangingProvider {
        async fn fetch(&self, _content_id: &str, _session_id: &str) -> Result<AttestationToken> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!("provider must be abandoned at the timeout");
        }
    }

    #[test]
    fn test_session_id_prefers_account_sync_id() {
        let session = StaticSession {
            account_sync_id: Some("sync-1".to_string()),
            visitor_id: Some("visitor-1".to_string()),
        };
        assert_eq!(session.session_id().as_deref(), Some("sync-1"));
    }

    #[test]
    fn test_session_id_falls_back_to_visitor_id() {
        let session = StaticSession {
            account_sync_id: None,
            visitor_id: Some("visitor-1".to_string()),
        };
        assert_eq!(session.session_id().as_deref(), Some("visitor-1"));
    }

    #[test]
    fn test_session_id_none_when_anonymous_without_visitor() {
        assert_eq!(StaticSession::default().session_id(), None);
    }

    #[tokio::test]
    async fn test_fetch_bounded_returns_token() {
        let mut provider = MockTokenProvider::new();
        provider.expect_fetch().returning(|_, _| {
            Ok(AttestationToken {
                metadata_token: "meta".to_string(),
                streaming_token: "stream".to_string(),
            })
        });

        let token =
            fetch_bounded(&provider, Duration::from_secs(1), "abc123XYZ90", "visitor-1").await;
        assert_eq!(token.unwrap().streaming_token, "stream");
    }

    #[tokio::test]
    async fn test_fetch_bounded_swallows_provider_errors() {
        let mut provider = MockTokenProvider::new();
        provider
            .expect_fetch()
            .returning(|_, _| Err(anyhow::anyhow!("web engine crashed")));

        let token =
            fetch_bounded(&provider, Duration::from_secs(1), "abc123XYZ90", "visitor-1").await;
        assert!(token.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_bounded_abandons_hanging_provider() {
        let token = fetch_bounded(
            &HangingProvider,
            Duration::from_secs(8),
            "abc123XYZ90",
            "visitor-1",
        )
        .await;
        assert!(token.is_none());
    }
}
