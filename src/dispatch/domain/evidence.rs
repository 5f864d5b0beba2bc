//! Completion evidence attached to tasks at finalization.

use serde::{Deserialize, Serialize};

use super::TaskDomainError;

/// Raw photo bytes captured by the courier application.
///
/// Rejects empty payloads so the storage port never receives a photo that
/// could not have come from a camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoData(Vec<u8>);

impl PhotoData {
    /// Wraps captured photo bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyPhoto`] if `bytes` is empty.
    pub fn new(bytes: Vec<u8>) -> Result<Self, TaskDomainError> {
        if bytes.is_empty() {
            return Err(TaskDomainError::EmptyPhoto);
        }
        Ok(Self(bytes))
    }

    /// Returns the photo bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the photo, returning its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for PhotoData {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Durable location of an uploaded photo, as reported by the storage port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoUrl(String);

impl PhotoUrl {
    /// Wraps a storage location returned by the photo store.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyPhotoUrl`] if `url` is empty or
    /// whitespace.
    pub fn new(url: impl Into<String>) -> Result<Self, TaskDomainError> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(TaskDomainError::EmptyPhotoUrl);
        }
        Ok(Self(url))
    }

    /// Returns the location as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PhotoUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhotoUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Photos submitted alongside a finalization request.
///
/// The receipt slot is distinguished from supplementary shots because tasks
/// flagged as requiring photo evidence refuse to complete without a receipt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalizationEvidence {
    receipt_photo: Option<PhotoData>,
    additional_photos: Vec<PhotoData>,
}

impl FinalizationEvidence {
    /// Creates an empty evidence bundle.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            receipt_photo: None,
            additional_photos: Vec::new(),
        }
    }

    /// Attaches the receipt photo.
    #[must_use]
    pub fn with_receipt(mut self, photo: PhotoData) -> Self {
        self.receipt_photo = Some(photo);
        self
    }

    /// Appends a supplementary photo.
    #[must_use]
    pub fn with_additional_photo(mut self, photo: PhotoData) -> Self {
        self.additional_photos.push(photo);
        self
    }

    /// Returns the receipt photo, if one was submitted.
    #[must_use]
    pub const fn receipt_photo(&self) -> Option<&PhotoData> {
        self.receipt_photo.as_ref()
    }

    /// Returns the supplementary photos.
    #[must_use]
    pub fn additional_photos(&self) -> &[PhotoData] {
        &self.additional_photos
    }

    /// Returns whether a receipt photo is present.
    #[must_use]
    pub const fn has_receipt(&self) -> bool {
        self.receipt_photo.is_some()
    }

    /// Decomposes the bundle into its receipt and supplementary photos.
    #[must_use]
    pub fn into_parts(self) -> (Option<PhotoData>, Vec<PhotoData>) {
        (self.receipt_photo, self.additional_photos)
    }
}

/// Durable photo locations recorded on a completed task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvidence {
    receipt_url: Option<PhotoUrl>,
    additional_urls: Vec<PhotoUrl>,
}

impl StoredEvidence {
    /// Records uploaded photo locations.
    #[must_use]
    pub const fn new(receipt_url: Option<PhotoUrl>, additional_urls: Vec<PhotoUrl>) -> Self {
        Self {
            receipt_url,
            additional_urls,
        }
    }

    /// Returns the receipt photo location, if one was recorded.
    #[must_use]
    pub const fn receipt_url(&self) -> Option<&PhotoUrl> {
        self.receipt_url.as_ref()
    }

    /// Returns the supplementary photo locations.
    #[must_use]
    pub fn additional_urls(&self) -> &[PhotoUrl] {
        &self.additional_urls
    }

    /// Returns whether any photo location was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receipt_url.is_none() && self.additional_urls.is_empty()
    }

    /// Decomposes the record into its receipt and supplementary locations.
    #[must_use]
    pub fn into_parts(self) -> (Option<PhotoUrl>, Vec<PhotoUrl>) {
        (self.receipt_url, self.additional_urls)
    }
}
