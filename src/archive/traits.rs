//! Archive backend trait and record types

use super::query::{Operator, SearchFilters};
use crate::error::ArchiveError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A search hit identifying one archive item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Item identifier (unique key)
    pub identifier: String,
    /// Item title
    pub title: String,
    /// Item description
    pub description: Option<String>,
    /// Media type reported by the archive
    pub mediatype: Option<String>,
}

impl SearchHit {
    /// Create a hit with no description or media type
    pub fn new(identifier: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            description: None,
            mediatype: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the media type
    pub fn with_mediatype(mut self, mediatype: impl Into<String>) -> Self {
        self.mediatype = Some(mediatype.into());
        self
    }
}

/// One file entry of an item's file listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveFile {
    /// Stored file name, relative to the item
    pub name: String,
    /// Archive format tag (e.g. "JPEG")
    pub format: Option<String>,
    /// Size in bytes; the archive reports it as a string
    pub size: Option<serde_json::Value>,
    /// MD5 checksum
    pub md5: Option<String>,
}

impl ArchiveFile {
    /// Create a file entry with a format and no size or checksum
    pub fn new(name: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            format: Some(format.into()),
            size: None,
            md5: None,
        }
    }

    pub fn with_size(mut self, size: impl Into<serde_json::Value>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_md5(mut self, md5: impl Into<String>) -> Self {
        self.md5 = Some(md5.into());
        self
    }
}

/// Metadata record and file listing of one archive item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchiveItem {
    /// Raw metadata fields
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// File listing
    #[serde(default)]
    pub files: Vec<ArchiveFile>,
}

/// A search request sent to the backend
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveQuery {
    /// Terms to search for
    pub keywords: Vec<String>,
    /// Operator joining the terms
    pub operator: Operator,
    /// Restrictions applied to the search
    pub filters: SearchFilters,
}

impl ArchiveQuery {
    /// Create a query joining `keywords` with the default operator
    pub fn new(keywords: Vec<String>) -> Self {
        Self {
            keywords,
            operator: Operator::default(),
            filters: SearchFilters::default(),
        }
    }

    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.operator = operator;
        self
    }

    /// Set the search restrictions
    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }
}

/// Boundary to the archive: search for items, fetch one item
#[async_trait]
pub trait ArchiveBackend: Send + Sync {
    /// Backend name, for logging
    fn name(&self) -> &str;

    /// Base URL that download paths are built from
    fn download_base(&self) -> &str {
        super::DEFAULT_ARCHIVE_URL
    }

    /// Search for items, consuming at most `max_results` hits
    async fn search(
        &self,
        query: &ArchiveQuery,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, ArchiveError>;

    /// Fetch an item's metadata and file listing
    async fn get_item(&self, identifier: &str) -> Result<ArchiveItem, ArchiveError>;
}
