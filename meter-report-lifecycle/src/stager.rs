use futures::future::join_all;
use meter_report_api::{AttachmentSlot, BlobStore, ImageProcessor, ReportError, ReportResult, SlottedAttachment};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::BoxError;

/// A photo persisted ahead of the transaction that references it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedArtifact {
    pub slot: AttachmentSlot,
    pub path: String,
}

/// Every photo staged for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedArtifacts {
    artifacts: Vec<StagedArtifact>,
}

impl StagedArtifacts {
    /// Stored path of `slot`.
    pub fn path(&self, slot: AttachmentSlot) -> ReportResult<&str> {
        self.artifacts
            .iter()
            .find(|a| a.slot == slot)
            .map(|a| a.path.as_str())
            .ok_or_else(|| ReportError::Internal(format!("No staged file for the {slot}")))
    }

    pub fn paths(&self) -> Vec<String> {
        self.artifacts.iter().map(|a| a.path.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

/// Puts uploads into the blob store before their rows are written, and takes
/// them out again when those rows never materialise.
pub struct ArtifactStager {
    blob_store: Arc<dyn BlobStore>,
    image_processor: Arc<dyn ImageProcessor>,
    compression_threshold_bytes: usize,
}

impl ArtifactStager {
    pub fn new(
        blob_store: Arc<dyn BlobStore>,
        image_processor: Arc<dyn ImageProcessor>,
        compression_threshold_bytes: usize,
    ) -> Self {
        Self {
            blob_store,
            image_processor,
            compression_threshold_bytes,
        }
    }

    /// Saves one upload, compressing it first when it exceeds the threshold.
    pub async fn stage(&self, attachment: SlottedAttachment) -> ReportResult<StagedArtifact> {
        let SlottedAttachment { slot, upload } = attachment;
        let mut bytes = upload.bytes;
        if bytes.len() > self.compression_threshold_bytes {
            let original_size = bytes.len();
            bytes = self
                .image_processor
                .compress(bytes)
                .await
                .map_err(|e| ReportError::Internal(format!("Failed to compress the {slot}: {e}")))?;
            debug!(%slot, original_size, compressed_size = bytes.len(), "compressed attachment");
        }

        let path = self
            .blob_store
            .save(bytes, slot, &upload.original_name)
            .await
            .map_err(|e| ReportError::Internal(format!("Failed to store the {slot}: {e}")))?;
        Ok(StagedArtifact { slot, path })
    }

    /// Removes a staged file. Missing files count as removed.
    pub async fn unstage(&self, path: &str) -> Result<(), BoxError> {
        self.blob_store.delete(path).await
    }

    /// Stages every attachment concurrently.
    ///
    /// All or nothing: if any upload fails, the ones that were stored are
    /// unstaged again and the first failure is returned.
    pub async fn stage_all(&self, attachments: Vec<SlottedAttachment>) -> ReportResult<StagedArtifacts> {
        let results = join_all(attachments.into_iter().map(|a| self.stage(a))).await;

        let mut artifacts = Vec::with_capacity(results.len());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(artifact) => artifacts.push(artifact),
                Err(err) => {
                    warn!(error = %err, "staging attachment failed");
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            None => Ok(StagedArtifacts { artifacts }),
            Some(err) => {
                let paths: Vec<String> = artifacts.into_iter().map(|a| a.path).collect();
                self.unstage_all(&paths).await;
                Err(err)
            }
        }
    }

    /// Best-effort removal of `paths`; each failure is logged and skipped.
    ///
    /// Returns the number of files that could not be removed.
    pub async fn unstage_all(&self, paths: &[String]) -> usize {
        let results = join_all(paths.iter().map(|path| async move { (path, self.unstage(path).await) })).await;

        let mut failures = 0;
        for (path, result) in results {
            if let Err(err) = result {
                failures += 1;
                warn!(path = %path, error = %err, "failed to remove attachment");
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::PassthroughImageProcessor;
    use crate::memory::MemoryBlobStore;
    use crate::test_utils::{connection_attachments, jpeg};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct HalvingProcessor {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ImageProcessor for HalvingProcessor {
        async fn compress(&self, bytes: Vec<u8>) -> Result<Vec<u8>, BoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(bytes[..bytes.len() / 2].to_vec())
        }
    }

    #[tokio::test]
    async fn test_compresses_only_above_threshold() {
        let blobs = Arc::new(MemoryBlobStore::new());
        let processor = Arc::new(HalvingProcessor::default());
        let stager = ArtifactStager::new(blobs.clone(), processor.clone(), 4);

        let small = stager
            .stage(SlottedAttachment { slot: AttachmentSlot::HousePhoto, upload: jpeg("small.jpg", 4) })
            .await
            .unwrap();
        let large = stager
            .stage(SlottedAttachment { slot: AttachmentSlot::HousePhoto, upload: jpeg("large.jpg", 10) })
            .await
            .unwrap();

        assert_eq!(processor.calls.load(Ordering::SeqCst), 1);
        assert_eq!(blobs.read(&small.path).map(|b| b.len()), Some(4));
        assert_eq!(blobs.read(&large.path).map(|b| b.len()), Some(5));
    }

    #[tokio::test]
    async fn test_stage_all_is_all_or_nothing() {
        let blobs = Arc::new(MemoryBlobStore::new());
        blobs.fail_saves_after(2);
        let stager = ArtifactStager::new(blobs.clone(), Arc::new(PassthroughImageProcessor), usize::MAX);

        let attachments = connection_attachments().into_validated().unwrap();
        let err = stager.stage_all(attachments).await.unwrap_err();

        assert!(matches!(err, ReportError::Internal(_)));
        assert!(blobs.is_empty(), "partially staged files must be removed: {:?}", blobs.paths());
    }

    #[tokio::test]
    async fn test_stage_all_keeps_one_directory_per_slot() {
        let blobs = Arc::new(MemoryBlobStore::new());
        let stager = ArtifactStager::new(blobs.clone(), Arc::new(PassthroughImageProcessor), usize::MAX);

        let staged = stager
            .stage_all(connection_attachments().into_validated().unwrap())
            .await
            .unwrap();

        assert_eq!(staged.len(), 4);
        assert!(staged.path(AttachmentSlot::InstalledMeterPhoto).unwrap().starts_with("connection-meter-photos/"));
        assert!(staged.path(AttachmentSlot::HousePhoto).is_err());
    }

    #[tokio::test]
    async fn test_unstage_all_counts_failures() {
        let blobs = Arc::new(MemoryBlobStore::new());
        let stager = ArtifactStager::new(blobs.clone(), Arc::new(PassthroughImageProcessor), usize::MAX);
        let staged = stager
            .stage_all(connection_attachments().into_validated().unwrap())
            .await
            .unwrap();

        blobs.fail_delete.store(true, Ordering::SeqCst);
        assert_eq!(stager.unstage_all(&staged.paths()).await, 4);

        blobs.fail_delete.store(false, Ordering::SeqCst);
        assert_eq!(stager.unstage_all(&staged.paths()).await, 0);
        assert_eq!(stager.unstage_all(&staged.paths()).await, 0);
        assert!(blobs.is_empty());
    }
}
