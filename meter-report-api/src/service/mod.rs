//! Contracts of the external collaborators the lifecycle engine consumes.

use async_trait::async_trait;
use std::error::Error;

use crate::domain::AttachmentSlot;

/// Re-encodes oversized photos. Invoked only above the configured size threshold.
#[async_trait]
pub trait ImageProcessor: Send + Sync {
    async fn compress(&self, bytes: Vec<u8>) -> Result<Vec<u8>, Box<dyn Error + Send + Sync>>;
}

/// Durable storage for report photos.
///
/// Paths handed out by [`BlobStore::save`] are relative to the store root and
/// are what the report rows persist.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persists `bytes` under the slot's directory and returns the relative path.
    async fn save(
        &self,
        bytes: Vec<u8>,
        slot: AttachmentSlot,
        original_name: &str,
    ) -> Result<String, Box<dyn Error + Send + Sync>>;

    /// Removes a stored file.
    ///
    /// Succeeds even if the file doesn't exist (idempotent).
    async fn delete(&self, relative_path: &str) -> Result<(), Box<dyn Error + Send + Sync>>;
}
