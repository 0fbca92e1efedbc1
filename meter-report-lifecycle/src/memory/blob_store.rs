use async_trait::async_trait;
use meter_report_api::{AttachmentSlot, BlobStore};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use uuid::Uuid;

use crate::blob_store::extension_of;
use crate::error::BoxError;

/// Blob store keeping files in a map, with switches to fail saves or deletes.
#[derive(Debug)]
pub struct MemoryBlobStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
    /// Fail every save after this many succeeded; `usize::MAX` disables.
    fail_save_after: AtomicUsize,
    saves: AtomicUsize,
    pub fail_delete: AtomicBool,
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            fail_save_after: AtomicUsize::new(usize::MAX),
            saves: AtomicUsize::new(0),
            fail_delete: AtomicBool::new(false),
        }
    }
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `successful` more saves through, then fail the rest.
    pub fn fail_saves_after(&self, successful: usize) {
        self.saves.store(0, Ordering::SeqCst);
        self.fail_save_after.store(successful, Ordering::SeqCst);
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.lock().contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.lock().is_empty()
    }

    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.files.lock().keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn read(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().get(path).cloned()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn save(&self, bytes: Vec<u8>, slot: AttachmentSlot, original_name: &str) -> Result<String, BoxError> {
        let done = self.saves.fetch_add(1, Ordering::SeqCst);
        if done >= self.fail_save_after.load(Ordering::SeqCst) {
            return Err(format!("injected failure: save {original_name}").into());
        }
        let path = format!("{}/{}{}", slot.directory(), Uuid::new_v4(), extension_of(original_name));
        self.files.lock().insert(path.clone(), bytes);
        Ok(path)
    }

    async fn delete(&self, relative_path: &str) -> Result<(), BoxError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(format!("injected failure: delete {relative_path}").into());
        }
        self.files.lock().remove(relative_path);
        Ok(())
    }
}
