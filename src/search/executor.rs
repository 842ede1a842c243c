//! Search execution and orchestration

use super::keywords::extract_keywords;
use super::resolver::{ItemImageResolver, ItemImages};
use super::sampler::round_robin_sample;
use crate::archive::{ArchiveBackend, ArchiveQuery, SearchFilters, SearchHit};
use crate::config::Settings;
use crate::error::{ArchiveError, Result};
use crate::metrics::{Reporter, SearchMetrics};
use crate::results::{ImageResult, LlomaxResult};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Upper bound on concurrent archive requests per stage
pub const MAX_WORKERS: usize = 8;

/// Candidates requested per keyword, as a multiple of the item limit
pub const OVERFETCH_FACTOR: usize = 2;

/// Prompt search coordinator: keyword searches, sampling, image resolution
pub struct Llomax {
    /// Archive the searches run against
    backend: Arc<dyn ArchiveBackend>,
    /// Resolved run settings
    settings: Settings,
    /// Event sink shared with the resolver
    reporter: Arc<dyn Reporter>,
    resolver: ItemImageResolver,
}

impl Llomax {
    /// Create a coordinator reporting to a fresh [`SearchMetrics`]
    pub fn new(backend: Arc<dyn ArchiveBackend>, settings: Settings) -> Self {
        let reporter: Arc<dyn Reporter> = Arc::new(SearchMetrics::new());
        let resolver = ItemImageResolver::new(backend.clone(), reporter.clone());
        Self {
            backend,
            settings,
            reporter,
            resolver,
        }
    }

    /// Set the event reporter
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.resolver = ItemImageResolver::new(self.backend.clone(), reporter.clone());
        self.reporter = reporter;
        self
    }

    /// Settings the coordinator was built with
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Shared handle to the event reporter
    pub fn reporter(&self) -> Arc<dyn Reporter> {
        self.reporter.clone()
    }

    /// Search the archive for images matching `prompt`.
    ///
    /// Up to `max_results` items (the configured default when `None`) are
    /// sampled round-robin across the keywords, and every image file of
    /// those items is returned in sampled order.
    pub async fn search(&self, prompt: &str, max_results: Option<usize>) -> Result<LlomaxResult> {
        let keywords = extract_keywords(prompt)?;
        let limit = max_results.unwrap_or(self.settings.max_results);

        if keywords.is_empty() || limit == 0 {
            debug!("Nothing to search for '{}'", prompt);
            return Ok(LlomaxResult::new(prompt, keywords, Vec::new()));
        }

        info!(
            "Searching {} on {} keywords, up to {} items",
            self.backend.name(),
            keywords.len(),
            limit
        );

        let per_keyword = limit.saturating_mul(OVERFETCH_FACTOR);
        let candidates = self.search_keywords(&keywords, per_keyword).await?;

        let selected = round_robin_sample(candidates, limit);
        self.reporter.candidates_sampled(selected.len(), limit);

        let images = self.fetch_images(&selected).await;
        info!(
            "Found {} images across {} sampled items",
            images.len(),
            selected.len()
        );

        Ok(LlomaxResult::new(prompt, keywords, images))
    }

    /// One search per keyword, results in keyword order
    async fn search_keywords(
        &self,
        keywords: &[String],
        per_keyword: usize,
    ) -> std::result::Result<Vec<Vec<SearchHit>>, ArchiveError> {
        let filters = SearchFilters::from_settings(&self.settings);

        stream::iter(keywords)
            .map(|keyword| {
                let query = ArchiveQuery::new(vec![keyword.clone()]).with_filters(filters.clone());
                async move {
                    let hits = self
                        .backend
                        .search(&query, per_keyword)
                        .await
                        .map_err(|e| {
                            warn!("Search failed for keyword '{}': {}", keyword, e);
                            e
                        })?;
                    self.reporter.keyword_searched(keyword, hits.len());
                    Ok::<_, ArchiveError>(hits)
                }
            })
            .buffered(workers(keywords.len()))
            .try_collect()
            .await
    }

    /// Resolve sampled items to images, preserving sample order
    async fn fetch_images(&self, selected: &[SearchHit]) -> Vec<ImageResult> {
        let outcomes: Vec<ItemImages> = stream::iter(selected)
            .map(|hit| self.resolver.resolve(&hit.identifier))
            .buffered(workers(selected.len()))
            .collect()
            .await;

        outcomes
            .into_iter()
            .flat_map(ItemImages::into_images)
            .collect()
    }
}

fn workers(tasks: usize) -> usize {
    tasks.clamp(1, MAX_WORKERS)
}
