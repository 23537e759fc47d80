//! Boundaries to the systems around the filter engine.
//!
//! The engine itself only transforms images. Storing finished artwork,
//! fetching candidate photos and asking the user for a caption belong to
//! other components; this module fixes the contracts they must meet:
//!
//! - [`ArtworkStore`]: persist, list and remove finished artwork.
//! - [`CandidateImageSource`]: fetch the photos a user can pick from.
//!   The JSON listing format is parsed here ([`parse_image_listing`]).
//! - [`CaptureDialog`]: ask for a caption and rating, or learn the user cancelled.
//!
//! [`commit_capture`] ties them together for the "apply filter, confirm, save"
//! flow.

use crate::filters::FilterKind;
use crate::imaging::{FilterBackend, PixelImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("Storage failed: {0}")]
    Storage(String),
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Fetch failed: {0}")]
    Fetch(String),
    #[error("Malformed image listing: {0}")]
    Listing(#[from] serde_json::Error),
}

/// Star rating, clamped to `0..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Self {
        Self(value.min(Self::MAX))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl From<u8> for Rating {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

/// A finished, captioned artwork as handed to storage.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtworkRecord {
    /// Content digest of the image, unique per distinct result.
    pub id: String,
    pub caption: String,
    /// Seconds since the Unix epoch.
    pub created: u64,
    pub rating: Rating,
    /// Identifier of the filter that produced the image.
    pub filter: String,
    pub image: PixelImage,
}

/// Persistent record store for finished artwork.
pub trait ArtworkStore {
    /// Insert, or overwrite a record with the same id.
    fn save(&mut self, record: &ArtworkRecord) -> Result<(), CollaboratorError>;

    /// All records, newest first when `order_by_timestamp` is set,
    /// otherwise in store order.
    fn list_all(&self, order_by_timestamp: bool) -> Result<Vec<ArtworkRecord>, CollaboratorError>;

    fn remove(&mut self, id: &str) -> Result<(), CollaboratorError>;
}

/// One photo offered by the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateImage {
    pub id: u64,
    #[serde(rename = "thumb_url")]
    pub thumbnail_url: String,
    #[serde(rename = "url")]
    pub full_url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(rename = "updated")]
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
struct ImageListing {
    images: Vec<CandidateImage>,
}

/// Parse a `{"images": [...]}` listing response.
pub fn parse_image_listing(bytes: &[u8]) -> Result<Vec<CandidateImage>, CollaboratorError> {
    let listing: ImageListing = serde_json::from_slice(bytes)?;
    Ok(listing.images)
}

/// Source of candidate photos (typically an HTTP endpoint).
pub trait CandidateImageSource {
    fn fetch_candidate_images(&self) -> Result<Vec<CandidateImage>, CollaboratorError>;
}

/// What the user entered when confirming a capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub caption: String,
    pub rating: Rating,
}

/// Interactive confirmation step. `None` means the user cancelled.
pub trait CaptureDialog {
    fn present(&mut self, preview: &PixelImage) -> Option<Capture>;
}

/// Result of [`commit_capture`].
#[derive(Debug, PartialEq)]
pub enum CaptureOutcome {
    /// The artwork was stored under this id.
    Saved(String),
    Cancelled,
    /// The filter produced no image; the dialog was never shown.
    FilterFailed,
}

/// Apply `filter`, ask the user to confirm, and store the result.
pub fn commit_capture(
    filter: &FilterKind,
    image: &PixelImage,
    backend: &impl FilterBackend,
    dialog: &mut impl CaptureDialog,
    store: &mut impl ArtworkStore,
    now: u64,
) -> Result<CaptureOutcome, CollaboratorError> {
    let Some(result) = filter.apply_with(backend, image) else {
        return Ok(CaptureOutcome::FilterFailed);
    };
    let Some(capture) = dialog.present(&result) else {
        info!(filter = %filter, "capture cancelled");
        return Ok(CaptureOutcome::Cancelled);
    };

    let record = ArtworkRecord {
        id: result.digest(),
        caption: capture.caption,
        created: now,
        rating: capture.rating,
        filter: filter.id(),
        image: result,
    };
    store.save(&record).inspect_err(|e| {
        warn!(id = %record.id, error = %e, "failed to store artwork");
    })?;
    Ok(CaptureOutcome::Saved(record.id))
}
