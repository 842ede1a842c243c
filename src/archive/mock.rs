//! In-memory archive backend for tests

use super::traits::*;
use crate::error::ArchiveError;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// A recorded call to [`ArchiveBackend::search`]
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCall {
    pub keywords: Vec<String>,
    pub max_results: usize,
    pub query: ArchiveQuery,
}

/// Canned search hits and items keyed by keyword and identifier
#[derive(Default)]
pub struct MockArchive {
    hits: HashMap<String, Vec<SearchHit>>,
    items: HashMap<String, ArchiveItem>,
    failing_keywords: HashSet<String>,
    search_delays: HashMap<String, Duration>,
    search_calls: Mutex<Vec<SearchCall>>,
    item_calls: Mutex<Vec<String>>,
}

impl MockArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hits returned for a single-keyword search
    pub fn with_hits(mut self, keyword: &str, identifiers: &[&str]) -> Self {
        let hits = identifiers
            .iter()
            .map(|id| SearchHit::new(*id, format!("Title {}", id)).with_mediatype("image"))
            .collect();
        self.hits.insert(keyword.to_string(), hits);
        self
    }

    pub fn with_item(mut self, identifier: &str, item: ArchiveItem) -> Self {
        self.items.insert(identifier.to_string(), item);
        self
    }

    /// An item with one JPEG file named `<identifier>.jpg`
    pub fn with_image_item(self, identifier: &str) -> Self {
        let file = ArchiveFile::new(format!("{}.jpg", identifier), "JPEG")
            .with_size("1024")
            .with_md5("abc123");
        self.with_item(identifier, image_item(identifier, vec![file]))
    }

    pub fn with_failing_keyword(mut self, keyword: &str) -> Self {
        self.failing_keywords.insert(keyword.to_string());
        self
    }

    pub fn with_search_delay(mut self, keyword: &str, delay: Duration) -> Self {
        self.search_delays.insert(keyword.to_string(), delay);
        self
    }

    pub fn search_calls(&self) -> Vec<SearchCall> {
        self.search_calls.lock().unwrap().clone()
    }

    pub fn item_calls(&self) -> Vec<String> {
        self.item_calls.lock().unwrap().clone()
    }
}

/// An item whose metadata carries identifier and title only
pub fn image_item(identifier: &str, files: Vec<ArchiveFile>) -> ArchiveItem {
    let mut metadata = serde_json::Map::new();
    metadata.insert("identifier".to_string(), identifier.into());
    metadata.insert("title".to_string(), format!("Title {}", identifier).into());
    ArchiveItem { metadata, files }
}

#[async_trait]
impl ArchiveBackend for MockArchive {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(
        &self,
        query: &ArchiveQuery,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, ArchiveError> {
        let keyword = query.keywords.join(" ");
        self.search_calls.lock().unwrap().push(SearchCall {
            keywords: query.keywords.clone(),
            max_results,
            query: query.clone(),
        });

        if let Some(delay) = self.search_delays.get(&keyword) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_keywords.contains(&keyword) {
            return Err(ArchiveError::Network(format!("search failed for {}", keyword)));
        }

        Ok(self
            .hits
            .get(&keyword)
            .map(|hits| hits.iter().take(max_results).cloned().collect())
            .unwrap_or_default())
    }

    async fn get_item(&self, identifier: &str) -> Result<ArchiveItem, ArchiveError> {
        self.item_calls.lock().unwrap().push(identifier.to_string());
        self.items
            .get(identifier)
            .cloned()
            .ok_or_else(|| ArchiveError::NotFound(identifier.to_string()))
    }
}
