//! Image download module
//!
//! Saves the image files of a search result under
//! `<output_dir>/<identifier>/`, verifying MD5 checksums and writing a
//! `metadata.json` per item.

use crate::error::DownloadError;
use crate::metrics::{Reporter, SearchMetrics};
use crate::network::HttpClient;
use crate::results::{ImageResult, LlomaxResult};
use crate::search::MAX_WORKERS;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Name of the per-item metadata file
pub const METADATA_FILE: &str = "metadata.json";

/// Entry of the `files` list in `metadata.json`
#[derive(Debug, Serialize)]
struct SavedFile<'a> {
    name: &'a str,
    url: &'a str,
    format: &'a str,
    size: u64,
    md5: &'a str,
}

impl<'a> From<&'a ImageResult> for SavedFile<'a> {
    fn from(image: &'a ImageResult) -> Self {
        Self {
            name: &image.filename,
            url: &image.download_url,
            format: &image.format,
            size: image.size,
            md5: &image.checksum,
        }
    }
}

/// Fetches image files and writes them to disk
pub struct Downloader {
    client: HttpClient,
    reporter: Arc<dyn Reporter>,
    max_workers: usize,
}

impl Downloader {
    /// Create a downloader reporting to a fresh [`SearchMetrics`]
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            reporter: Arc::new(SearchMetrics::new()),
            max_workers: MAX_WORKERS,
        }
    }

    /// Set the event reporter
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Set the number of concurrent fetches per item
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Download every image of `result` into `output_dir`.
    ///
    /// Files that fail to fetch, fail verification, or would land outside
    /// their item directory are skipped. Returns the saved file paths.
    pub async fn download_images(
        &self,
        result: &LlomaxResult,
        output_dir: &str,
    ) -> Result<Vec<PathBuf>, DownloadError> {
        let root = expand_home(output_dir);
        let mut saved = Vec::new();

        for (identifier, images) in result.images_by_item() {
            let Some(dir_name) = item_dir_name(identifier) else {
                for image in &images {
                    self.fail(image, "identifier escapes the output directory");
                }
                continue;
            };
            let item_dir = root.join(dir_name);
            saved.extend(self.download_item(&item_dir, &images).await?);
        }

        info!("Saved {} files to {}", saved.len(), root.display());
        Ok(saved)
    }

    async fn download_item(
        &self,
        item_dir: &Path,
        images: &[&ImageResult],
    ) -> Result<Vec<PathBuf>, DownloadError> {
        let outcomes: Vec<Option<(PathBuf, SavedFile)>> = stream::iter(images.iter().copied())
            .map(|image| self.save_file(item_dir, image))
            .buffered(images.len().clamp(1, self.max_workers))
            .try_collect()
            .await?;

        let (paths, saved_files): (Vec<PathBuf>, Vec<SavedFile>) =
            outcomes.into_iter().flatten().unzip();

        if let Some(first) = images.first().filter(|_| !saved_files.is_empty()) {
            let mut record = first.metadata.to_json_map();
            record.insert("files".to_string(), serde_json::to_value(&saved_files)?);
            let json = serde_json::to_vec_pretty(&record)?;
            write(&item_dir.join(METADATA_FILE), &json).await?;
        }

        Ok(paths)
    }

    /// Fetch one file and write it straight to disk; `None` when skipped
    async fn save_file<'a>(
        &self,
        item_dir: &Path,
        image: &'a ImageResult,
    ) -> Result<Option<(PathBuf, SavedFile<'a>)>, DownloadError> {
        let Some(relative) = contained_path(&image.filename) else {
            self.fail(image, "file name escapes the item directory");
            return Ok(None);
        };
        let Some(body) = self.fetch(image).await else {
            return Ok(None);
        };

        let path = item_dir.join(relative);
        if let Some(parent) = path.parent() {
            create_dir_all(parent).await?;
        }
        write(&path, &body).await?;

        self.reporter
            .file_downloaded(&image.identifier, &image.filename, body.len());
        Ok(Some((path, SavedFile::from(image))))
    }

    /// Fetch and verify one file; failures are reported and yield `None`
    async fn fetch(&self, image: &ImageResult) -> Option<Vec<u8>> {
        debug!("Downloading {}", image.download_url);

        let response = match self.client.download(&image.download_url).await {
            Ok(response) => response,
            Err(e) => {
                self.fail(image, &e.to_string());
                return None;
            }
        };
        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(e) => {
                self.fail(image, &e.to_string());
                return None;
            }
        };

        if !image.checksum.is_empty() {
            let digest = format!("{:x}", md5::compute(&response.body));
            if !digest.eq_ignore_ascii_case(&image.checksum) {
                warn!(
                    "Checksum mismatch for {}: expected {}, got {}",
                    image.download_url, image.checksum, digest
                );
                self.fail(image, "checksum mismatch");
                return None;
            }
        }

        Some(response.body)
    }

    fn fail(&self, image: &ImageResult, reason: &str) {
        self.reporter
            .download_failed(&image.identifier, &image.filename, reason);
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix('~'), dirs::home_dir()) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) if rest.starts_with('/') => home.join(&rest[1..]),
        _ => PathBuf::from(path),
    }
}

/// An identifier usable as a single directory name
fn item_dir_name(identifier: &str) -> Option<&Path> {
    let path = Path::new(identifier);
    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(path),
        _ => None,
    }
}

/// `name` as a relative path that stays inside its parent directory
fn contained_path(name: &str) -> Option<&Path> {
    let path = Path::new(name);
    let mut has_file = false;
    for component in path.components() {
        match component {
            Component::Normal(_) => has_file = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    has_file.then_some(path)
}

async fn create_dir_all(path: &Path) -> Result<(), DownloadError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| DownloadError::Io {
            path: path.to_path_buf(),
            source,
        })
}

async fn write(path: &Path, contents: &[u8]) -> Result<(), DownloadError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| DownloadError::Io {
            path: path.to_path_buf(),
            source,
        })
}
