// Media metadata and the provider contract used to resolve it

use crate::segment::Segment;
use serde::{Deserialize, Serialize};

/// Metadata describing a playable media
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMetadata {
    pub identifier: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Duration in milliseconds, if known
    pub duration: Option<i64>,
    #[serde(default)]
    pub is_live: bool,
    #[serde(default)]
    pub segments: Vec<Segment>,
}

impl MediaMetadata {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Default::default()
        }
    }
}

/// Outcome of an asynchronous metadata request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataOutcome {
    Loaded(MediaMetadata),
    NotAvailable,
}

/// One-shot completion handle for a metadata request.
///
/// Resolving consumes the handle, so at most one outcome is delivered.
/// A handle dropped without being resolved reports `NotAvailable`.
pub struct MetadataCallback {
    media_identifier: String,
    on_complete: Option<Box<dyn FnOnce(MetadataOutcome) + Send>>,
}

impl MetadataCallback {
    pub fn new<F>(media_identifier: impl Into<String>, on_complete: F) -> Self
    where
        F: FnOnce(MetadataOutcome) + Send + 'static,
    {
        Self {
            media_identifier: media_identifier.into(),
            on_complete: Some(Box::new(on_complete)),
        }
    }

    pub fn media_identifier(&self) -> &str {
        &self.media_identifier
    }

    pub fn loaded(mut self, metadata: MediaMetadata) {
        self.complete(MetadataOutcome::Loaded(metadata));
    }

    pub fn not_available(mut self) {
        self.complete(MetadataOutcome::NotAvailable);
    }

    fn complete(&mut self, outcome: MetadataOutcome) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(outcome);
        }
    }
}

impl Drop for MetadataCallback {
    fn drop(&mut self) {
        if self.on_complete.is_some() {
            log::warn!(
                "Metadata request for {} dropped without an outcome",
                self.media_identifier
            );
            self.complete(MetadataOutcome::NotAvailable);
        }
    }
}

impl std::fmt::Debug for MetadataCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataCallback")
            .field("media_identifier", &self.media_identifier)
            .field("resolved", &self.on_complete.is_none())
            .finish()
    }
}

/// Source of media metadata
pub trait MetadataProvider: Send + Sync {
    /// Resolve metadata synchronously; `None` when not available
    fn media_metadata(&self, media_identifier: &str) -> Option<MediaMetadata>;

    /// Resolve metadata and report through `callback`.
    /// Providers backed by a remote service should override this.
    fn request_media_metadata(&self, media_identifier: &str, callback: MetadataCallback) {
        match self.media_metadata(media_identifier) {
            Some(metadata) => callback.loaded(metadata),
            None => callback.not_available(),
        }
    }
}
