//! Stream resolution facade.
//!
//! The single entry point the rest of the app calls: normalizes the input
//! reference, detects which service it belongs to, and drives the
//! appropriate resolver chain. For the default service that chain is
//! persona loop first, page extraction second; alternate services get a
//! single extraction attempt whose failure propagates as-is.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::catalog::CatalogApi;
use crate::error::ResolutionError;
use crate::extractor::{PageExtractor, StreamingService};
use crate::persona::ClientPersona;
use crate::reference::{self, NormalizedReference};
use crate::settings::ResolverSettings;
use crate::store::FormatRecordStore;
use crate::token::{SessionSource, TokenProvider};

use super::alternate::AlternateResolver;
use super::fallback::FallbackResolver;
use super::primary::PrimaryResolver;
use super::StreamResult;

pub struct StreamResolver {
    primary: PrimaryResolver,
    fallback: FallbackResolver,
    alternates: Vec<AlternateResolver>,
    catalog: Arc<dyn CatalogApi>,
    quality_tx: watch::Sender<Option<String>>,
}

impl StreamResolver {
    pub fn new(
        catalog: Arc<dyn CatalogApi>,
        token_provider: Arc<dyn TokenProvider>,
        session: Arc<dyn SessionSource>,
        extractor: Arc<dyn PageExtractor>,
        record_store: Arc<dyn FormatRecordStore>,
        personas: &'static [ClientPersona],
        settings: ResolverSettings,
    ) -> Self {
        let primary = PrimaryResolver::new(
            Arc::clone(&catalog),
            token_provider,
            session,
            record_store,
            personas,
            settings.clone(),
        );
        let fallback = FallbackResolver::new(
            Arc::clone(&extractor),
            settings.extraction_user_agent.clone(),
        );
        let alternates = vec![
            AlternateResolver::new(
                StreamingService::Rumble,
                Arc::clone(&extractor),
                settings.extraction_user_agent.clone(),
            ),
            AlternateResolver::new(
                StreamingService::Soundcloud,
                Arc::clone(&extractor),
                settings.extraction_user_agent.clone(),
            ),
        ];

        Self {
            primary,
            fallback,
            alternates,
            catalog,
            quality_tx: watch::channel(None).0,
        }
    }

    /// Resolve a reference into a playable stream.
    ///
    /// `title` and `artist` are only consulted for the metadata rescue of a
    /// default-service url that carries no extractable content id.
    pub async fn resolve(
        &self,
        reference: &str,
        title: Option<&str>,
        artist: Option<&str>,
    ) -> Result<StreamResult, ResolutionError> {
        let result = match reference::normalize(reference) {
            NormalizedReference::AlternateUrl(service, url) => {
                self.alternate(service).resolve(&url).await
            }
            NormalizedReference::VideoId(content_id) => self.resolve_default(&content_id).await,
            NormalizedReference::UnresolvedUrl(url) => {
                let content_id = self.rescue_by_metadata(&url, title, artist).await?;
                self.resolve_default(&content_id).await
            }
        };

        if let Ok(result) = &result {
            // Best-effort ui state; never blocks or fails resolution.
            self.quality_tx
                .send_replace(Some(result.quality_label.clone()));
        }
        result
    }

    /// Observable quality label of the most recently resolved stream.
    ///
    /// Concurrent resolutions race on this value and the last writer wins;
    /// it only drives a ui label.
    pub fn quality_label(&self) -> watch::Receiver<Option<String>> {
        self.quality_tx.subscribe()
    }

    async fn resolve_default(&self, content_id: &str) -> Result<StreamResult, ResolutionError> {
        match self.primary.resolve(content_id).await {
            Ok(result) => Ok(result),
            Err(error @ ResolutionError::AllPersonasFailed { .. }) => {
                warn!(content_id, "persona loop exhausted: {error}");
                self.fallback
                    .resolve(&reference::canonical_watch_url(content_id))
                    .await
            }
            Err(error) => Err(error),
        }
    }

    fn alternate(&self, service: StreamingService) -> &AlternateResolver {
        self.alternates
            .iter()
            .find(|r| r.service() == service)
            .expect("every detectable service has a registered resolver")
    }

    /// Search the catalog with `"{title} {artist}"` and adopt the first
    /// result's id. The last chance for a url with no extractable id.
    async fn rescue_by_metadata(
        &self,
        url: &str,
        title: Option<&str>,
        artist: Option<&str>,
    ) -> Result<String, ResolutionError> {
        let title = title.unwrap_or("").trim();
        if title.is_empty() {
            return Err(ResolutionError::InvalidReference(format!(
                "no content id in url and no title to search for: {url}"
            )));
        }

        let artist = artist.unwrap_or("").trim();
        let query = if artist.is_empty() {
            title.to_string()
        } else {
            format!("{title} {artist}")
        };

        info!(url, query, "rescuing unresolvable url via catalog search");
        match self.catalog.search_first_id(&query).await {
            Ok(Some(content_id)) => {
                info!(content_id, "metadata rescue found a candidate");
                Ok(content_id)
            }
            Ok(None) => Err(ResolutionError::InvalidReference(format!(
                "no content id in url and search \"{query}\" returned nothing"
            ))),
            Err(e) => Err(ResolutionError::InvalidReference(format!(
                "no content id in url and rescue search failed: {e}"
            ))),
        }
    }
}
