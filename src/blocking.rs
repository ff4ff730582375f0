//! Synchronous consumer shim.
//!
//! The media pipeline resolves from a blocking data-source callback on its
//! own i/o thread: it needs a direct answer, never a pending future. This
//! adapter drives the async facade to completion on a runtime the consumer
//! already owns.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

use crate::error::ResolutionError;
use crate::resolver::{StreamResolver, StreamResult};

/// Blocking adapter over [`StreamResolver`].
///
/// Must be called from a thread outside the runtime's workers (the media
/// pipeline's loading thread qualifies); blocking a worker thread on its
/// own runtime deadlocks.
pub struct BlockingResolver {
    inner: Arc<StreamResolver>,
    handle: Handle,
}

impl BlockingResolver {
    pub fn new(inner: Arc<StreamResolver>, handle: Handle) -> Self {
        Self { inner, handle }
    }

    /// Resolve, blocking the calling thread until a result or a terminal
    /// failure is available.
    pub fn resolve(
        &self,
        reference: &str,
        title: Option<&str>,
        artist: Option<&str>,
    ) -> Result<StreamResult, ResolutionError> {
        self.handle
            .block_on(self.inner.resolve(reference, title, artist))
    }

    /// Resolve with an overall deadline across the whole attempt chain.
    ///
    /// The deadline abandons the entire call, not individual sub-steps;
    /// per-request timeouts inside the chain stay in force either way.
    pub fn resolve_with_deadline(
        &self,
        reference: &str,
        title: Option<&str>,
        artist: Option<&str>,
        deadline: Duration,
    ) -> Result<StreamResult, ResolutionError> {
        self.handle.block_on(async {
            match tokio::time::timeout(deadline, self.inner.resolve(reference, title, artist))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(ResolutionError::DeadlineExceeded(deadline)),
            }
        })
    }
}
