//! In-memory photo storage for finalization tests.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::dispatch::{
    domain::{PhotoData, PhotoUrl},
    ports::{PhotoStorage, PhotoStorageError, PhotoStorageResult},
};

/// Thread-safe in-memory photo storage.
///
/// Photos are content-addressed by SHA-256, so storing the same bytes twice
/// yields the same `memory://photos/<hex>` location.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPhotoStorage {
    state: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryPhotoStorage {
    /// Creates an empty in-memory photo store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored bytes behind a location, if present.
    #[must_use]
    pub fn stored_bytes(&self, url: &PhotoUrl) -> Option<Vec<u8>> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.get(url.as_str()).cloned())
    }
}

#[async_trait]
impl PhotoStorage for InMemoryPhotoStorage {
    async fn store(&self, photo: &PhotoData) -> PhotoStorageResult<PhotoUrl> {
        let digest = Sha256::digest(photo.as_bytes());
        let url = format!("memory://photos/{digest:x}");

        let mut state = self.state.write().map_err(|err| {
            PhotoStorageError::upload_failed(std::io::Error::other(err.to_string()))
        })?;
        state.insert(url.clone(), photo.as_bytes().to_vec());

        PhotoUrl::new(url).map_err(PhotoStorageError::upload_failed)
    }
}
