use async_trait::async_trait;
use meter_report_api::{AttachmentSlot, BlobStore};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use crate::error::BoxError;

/// Lower-cased extension of `original_name` including the dot, or an empty string.
pub(crate) fn extension_of(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Stores photos below a root directory as `<slot dir>/<uuid><ext>`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a stored relative path, refusing anything that escapes the root.
    fn resolve(&self, relative_path: &str) -> Result<PathBuf, BoxError> {
        let relative = Path::new(relative_path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if relative_path.is_empty() || escapes {
            return Err(format!("Refusing blob path outside the store: {relative_path}").into());
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn save(&self, bytes: Vec<u8>, slot: AttachmentSlot, original_name: &str) -> Result<String, BoxError> {
        let relative = format!("{}/{}{}", slot.directory(), Uuid::new_v4(), extension_of(original_name));
        let target = self.resolve(&relative)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, bytes).await?;
        Ok(relative)
    }

    async fn delete(&self, relative_path: &str) -> Result<(), BoxError> {
        let target = self.resolve(relative_path)?;
        match fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("meter.JPEG"), ".jpeg");
        assert_eq!(extension_of("scan.final.png"), ".png");
        assert_eq!(extension_of("noext"), "");
    }

    #[tokio::test]
    async fn test_save_writes_below_slot_directory() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path());

        let path = store.save(b"jpeg".to_vec(), AttachmentSlot::IncidentReportPhoto, "ba.jpg").await.unwrap();
        assert!(path.starts_with("documents/"));
        assert!(path.ends_with(".jpg"));
        assert_eq!(std::fs::read(dir.path().join(&path)).unwrap(), b"jpeg");
    }

    #[tokio::test]
    async fn test_delete_tolerates_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path());

        let path = store.save(vec![1], AttachmentSlot::HousePhoto, "h.png").await.unwrap();
        store.delete(&path).await.unwrap();
        assert!(!dir.path().join(&path).exists());
        store.delete(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_rejects_escaping_paths() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path().join("uploads"));

        assert!(store.delete("../secret.txt").await.is_err());
        assert!(store.delete("/etc/passwd").await.is_err());
    }
}
