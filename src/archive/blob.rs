use std::cell::RefCell;
use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

/// Keeps generated archives available under revocable reference URLs.
pub trait BlobStore {
    fn create_object_url(&self, bytes: Vec<u8>) -> String;

    /// Drops the blob behind `url`. Returns whether it existed.
    fn revoke_object_url(&self, url: &str) -> bool;
}

#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RefCell<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    const SCHEME: &'static str = "blob:treesync/";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<Vec<u8>> {
        self.blobs.borrow().get(url).cloned()
    }

    pub fn len(&self) -> usize {
        self.blobs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.borrow().is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    fn create_object_url(&self, bytes: Vec<u8>) -> String {
        let url = format!("{}{}", Self::SCHEME, Uuid::new_v4());
        debug!("Registered {} bytes at {}", bytes.len(), url);
        self.blobs.borrow_mut().insert(url.clone(), bytes);
        url
    }

    fn revoke_object_url(&self, url: &str) -> bool {
        self.blobs.borrow_mut().remove(url).is_some()
    }
}
