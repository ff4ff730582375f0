//! tunepipe — stream-resolution core for a music-streaming client.
//!
//! Turns an opaque content reference (a bare video id, a watch url, or a
//! Rumble/SoundCloud url) into a playable, time-limited media url plus the
//! `User-Agent` header required to open it. The hard part is the upstream:
//! an adversarial, frequently-changing internal catalog API that reveals
//! different streams to different client personas, some of which demand an
//! anti-bot attestation token. The resolver copes by trying personas in
//! trust order, degrading gracefully around token failures, and falling
//! back to page extraction when every persona is refused.
//!
//! External collaborators (playback service, persistence, auth, the
//! extraction library) sit behind narrow traits: [`CatalogApi`],
//! [`TokenProvider`], [`SessionSource`], [`PageExtractor`], and
//! [`FormatRecordStore`]. All of them are injected into [`StreamResolver`]
//! at construction time; nothing in this crate is process-global.

pub mod blocking;
pub mod catalog;
pub mod error;
pub mod extractor;
pub mod persona;
pub mod reference;
pub mod resolver;
pub mod settings;
pub mod store;
pub mod token;

pub use blocking::BlockingResolver;
pub use catalog::{AudioFormat, CatalogApi, HttpCatalogClient, PlayerMetadata};
pub use error::{PersonaFailure, ResolutionError};
pub use extractor::{
    Delivery, ExtractedStream, ExtractedStreams, PageExtractor, StreamingService,
};
pub use persona::{ClientPersona, DEFAULT_PERSONAS};
pub use reference::{canonical_watch_url, normalize, NormalizedReference};
pub use resolver::{StreamResolver, StreamResult};
pub use settings::ResolverSettings;
pub use store::{FormatRecordStore, NoopFormatRecordStore, PersistedFormatRecord};
pub use token::{AttestationToken, SessionSource, StaticSession, TokenProvider};
