//! Run reporting module
//!
//! Observers for search, resolution and download events. A [`Reporter`] is
//! created per run and passed explicitly to the components that emit events.

use crate::error::ArchiveError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use tracing::{debug, info, warn};

/// Receives pipeline events
pub trait Reporter: Send + Sync {
    /// A keyword search finished
    fn keyword_searched(&self, _keyword: &str, _hits: usize) {}

    /// Candidates were sampled from all keyword lists
    fn candidates_sampled(&self, _candidates: usize, _limit: usize) {}

    /// An item resolved to images
    fn item_resolved(&self, _identifier: &str, _images: usize) {}

    /// An item could not be fetched and contributes no images
    fn item_unavailable(&self, _identifier: &str, _error: &ArchiveError) {}

    /// A file was saved to disk
    fn file_downloaded(&self, _identifier: &str, _filename: &str, _bytes: usize) {}

    /// A file could not be fetched or verified
    fn download_failed(&self, _identifier: &str, _filename: &str, _reason: &str) {}
}

/// Counts run events and logs them through `tracing`
#[derive(Debug, Default)]
pub struct SearchMetrics {
    keywords_searched: AtomicU64,
    items_resolved: AtomicU64,
    images_found: AtomicU64,
    files_downloaded: AtomicU64,
    bytes_downloaded: AtomicU64,
    unavailable_items: RwLock<Vec<String>>,
    failed_downloads: RwLock<Vec<String>>,
}

/// Point-in-time copy of [`SearchMetrics`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub keywords_searched: u64,
    pub items_resolved: u64,
    pub images_found: u64,
    pub files_downloaded: u64,
    pub bytes_downloaded: u64,
    pub unavailable_items: Vec<String>,
    pub failed_downloads: Vec<String>,
}

impl SearchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            keywords_searched: self.keywords_searched.load(Ordering::Relaxed),
            items_resolved: self.items_resolved.load(Ordering::Relaxed),
            images_found: self.images_found.load(Ordering::Relaxed),
            files_downloaded: self.files_downloaded.load(Ordering::Relaxed),
            bytes_downloaded: self.bytes_downloaded.load(Ordering::Relaxed),
            unavailable_items: self
                .unavailable_items
                .read()
                .map(|items| items.clone())
                .unwrap_or_default(),
            failed_downloads: self
                .failed_downloads
                .read()
                .map(|files| files.clone())
                .unwrap_or_default(),
        }
    }
}

impl Reporter for SearchMetrics {
    fn keyword_searched(&self, keyword: &str, hits: usize) {
        self.keywords_searched.fetch_add(1, Ordering::Relaxed);
        debug!("Keyword '{}' returned {} candidates", keyword, hits);
    }

    fn candidates_sampled(&self, candidates: usize, limit: usize) {
        info!("Sampled {} of up to {} items", candidates, limit);
    }

    fn item_resolved(&self, identifier: &str, images: usize) {
        self.items_resolved.fetch_add(1, Ordering::Relaxed);
        self.images_found.fetch_add(images as u64, Ordering::Relaxed);
        debug!("Item {} has {} images", identifier, images);
    }

    fn item_unavailable(&self, identifier: &str, error: &ArchiveError) {
        warn!("Failed to get item {}: {}", identifier, error);
        if let Ok(mut items) = self.unavailable_items.write() {
            items.push(identifier.to_string());
        }
    }

    fn file_downloaded(&self, identifier: &str, filename: &str, bytes: usize) {
        self.files_downloaded.fetch_add(1, Ordering::Relaxed);
        self.bytes_downloaded.fetch_add(bytes as u64, Ordering::Relaxed);
        debug!("Saved {} from {} ({} bytes)", filename, identifier, bytes);
    }

    fn download_failed(&self, identifier: &str, filename: &str, reason: &str) {
        warn!("Failed to download {} from {}: {}", filename, identifier, reason);
        if let Ok(mut files) = self.failed_downloads.write() {
            files.push(format!("{}/{}", identifier, filename));
        }
    }
}
