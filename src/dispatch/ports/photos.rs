//! Storage port for completion photo evidence.

use crate::dispatch::domain::{PhotoData, PhotoUrl};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for photo storage operations.
pub type PhotoStorageResult<T> = Result<T, PhotoStorageError>;

/// Durable storage contract for completion photos.
#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Stores one photo and returns its durable location.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoStorageError::UploadFailed`] when the photo could not
    /// be stored. A failed upload never yields a location.
    async fn store(&self, photo: &PhotoData) -> PhotoStorageResult<PhotoUrl>;
}

/// Errors returned by photo storage implementations.
#[derive(Debug, Clone, Error)]
pub enum PhotoStorageError {
    /// The photo could not be stored.
    #[error("photo upload failed: {0}")]
    UploadFailed(Arc<dyn std::error::Error + Send + Sync>),
}

impl PhotoStorageError {
    /// Wraps an upload failure.
    pub fn upload_failed(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::UploadFailed(Arc::new(err))
    }
}
