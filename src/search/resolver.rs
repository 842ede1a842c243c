//! Item to image resolution

use crate::archive::{ArchiveBackend, ArchiveFile, ArchiveItem};
use crate::error::ArchiveError;
use crate::metrics::Reporter;
use crate::results::{ImageResult, ItemMetadata};
use serde_json::Value;
use std::sync::Arc;

/// Archive format tags treated as images; matched exactly
pub const IMAGE_FORMATS: [&str; 6] = ["JPEG", "PNG", "GIF", "TIFF", "JPEG 2000", "Animated GIF"];

/// Whether an archive format tag is one of [`IMAGE_FORMATS`]
pub fn is_image_format(format: &str) -> bool {
    IMAGE_FORMATS.contains(&format)
}

/// Outcome of resolving one item
#[derive(Debug)]
pub enum ItemImages {
    /// The item was fetched; may hold zero images
    Resolved(Vec<ImageResult>),
    /// The item could not be fetched
    Unavailable {
        identifier: String,
        error: ArchiveError,
    },
}

impl ItemImages {
    /// Images of the item, empty when unavailable
    pub fn into_images(self) -> Vec<ImageResult> {
        match self {
            Self::Resolved(images) => images,
            Self::Unavailable { .. } => Vec::new(),
        }
    }

    /// Whether the item could not be fetched
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Fetches items and turns their image files into [`ImageResult`]s
#[derive(Clone)]
pub struct ItemImageResolver {
    backend: Arc<dyn ArchiveBackend>,
    reporter: Arc<dyn Reporter>,
}

impl ItemImageResolver {
    /// Create a resolver over `backend`, reporting to `reporter`
    pub fn new(backend: Arc<dyn ArchiveBackend>, reporter: Arc<dyn Reporter>) -> Self {
        Self { backend, reporter }
    }

    /// Resolve one item. Fetch failures are reported and absorbed.
    pub async fn resolve(&self, identifier: &str) -> ItemImages {
        match self.backend.get_item(identifier).await {
            Ok(item) => {
                let images = images_from_item(identifier, &item, self.backend.download_base());
                self.reporter.item_resolved(identifier, images.len());
                ItemImages::Resolved(images)
            }
            Err(error) => {
                self.reporter.item_unavailable(identifier, &error);
                ItemImages::Unavailable {
                    identifier: identifier.to_string(),
                    error,
                }
            }
        }
    }
}

/// Image files of an item, in listing order
pub fn images_from_item(
    identifier: &str,
    item: &ArchiveItem,
    download_base: &str,
) -> Vec<ImageResult> {
    let metadata = ItemMetadata::from_record(&item.metadata);

    item.files
        .iter()
        .filter_map(|file| {
            let format = file.format.as_deref().filter(|f| is_image_format(f))?;
            Some(image_result(identifier, file, format, download_base, &metadata))
        })
        .collect()
}

fn image_result(
    identifier: &str,
    file: &ArchiveFile,
    format: &str,
    download_base: &str,
    metadata: &ItemMetadata,
) -> ImageResult {
    ImageResult {
        identifier: identifier.to_string(),
        filename: file.name.clone(),
        download_url: download_url(download_base, identifier, &file.name),
        format: format.to_string(),
        size: coerce_size(file.size.as_ref()),
        checksum: file.md5.clone().unwrap_or_default(),
        metadata: metadata.clone(),
    }
}

/// `<base>/download/<identifier>/<filename>`, components inserted verbatim
pub fn download_url(base: &str, identifier: &str, filename: &str) -> String {
    format!(
        "{}/download/{}/{}",
        base.trim_end_matches('/'),
        identifier,
        filename
    )
}

/// Sizes arrive as strings or numbers; anything unparseable is 0
fn coerce_size(size: Option<&Value>) -> u64 {
    match size {
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::mock::{image_item, MockArchive};
    use crate::metrics::SearchMetrics;
    use crate::results::MetadataValue;
    use serde_json::json;

    fn resolver(archive: MockArchive) -> (ItemImageResolver, Arc<SearchMetrics>) {
        let metrics = Arc::new(SearchMetrics::new());
        (
            ItemImageResolver::new(Arc::new(archive), metrics.clone()),
            metrics,
        )
    }

    fn files(formats: &[&str]) -> Vec<ArchiveFile> {
        formats
            .iter()
            .enumerate()
            .map(|(i, format)| ArchiveFile::new(format!("file{}", i), *format).with_size("10"))
            .collect()
    }

    #[tokio::test]
    async fn test_filters_image_formats() {
        let item = image_item(
            "mixed",
            files(&[
                "JPEG",
                "PNG",
                "GIF",
                "TIFF",
                "JPEG 2000",
                "Animated GIF",
                "Metadata",
                "ZIP",
            ]),
        );
        let (resolver, metrics) = resolver(MockArchive::new().with_item("mixed", item));

        let images = resolver.resolve("mixed").await.into_images();

        assert_eq!(images.len(), 6);
        let formats: Vec<&str> = images.iter().map(|img| img.format.as_str()).collect();
        assert_eq!(formats, IMAGE_FORMATS.to_vec());
        assert_eq!(metrics.snapshot().images_found, 6);
    }

    #[test]
    fn test_format_match_is_exact() {
        assert!(is_image_format("JPEG"));
        assert!(!is_image_format("jpeg"));
        assert!(!is_image_format("JPEG Thumb"));
        assert!(!is_image_format(""));
    }

    #[tokio::test]
    async fn test_builds_download_url_and_fields() {
        let file = ArchiveFile::new("photo one.jpg", "JPEG")
            .with_size("2048")
            .with_md5("d41d8cd9");
        let item = image_item("jazz-item", vec![file]);
        let (resolver, _) = resolver(MockArchive::new().with_item("jazz-item", item));

        let images = resolver.resolve("jazz-item").await.into_images();
        let image = &images[0];

        assert_eq!(image.identifier, "jazz-item");
        assert_eq!(image.filename, "photo one.jpg");
        assert_eq!(
            image.download_url,
            "https://archive.org/download/jazz-item/photo one.jpg"
        );
        assert_eq!(image.size, 2048);
        assert_eq!(image.checksum, "d41d8cd9");
        assert_eq!(image.metadata.title, Some(MetadataValue::from("Title jazz-item")));
    }

    #[tokio::test]
    async fn test_absent_metadata_fields_are_null() {
        let item = ArchiveItem {
            metadata: serde_json::Map::new(),
            files: files(&["PNG"]),
        };
        let (resolver, _) = resolver(MockArchive::new().with_item("bare", item));

        let images = resolver.resolve("bare").await.into_images();
        let metadata = serde_json::to_value(&images[0].metadata).unwrap();

        for field in ItemMetadata::FIELDS {
            assert_eq!(metadata[field], Value::Null, "{}", field);
        }
    }

    #[tokio::test]
    async fn test_unavailable_item_yields_no_images() {
        let (resolver, metrics) = resolver(MockArchive::new());

        let outcome = resolver.resolve("missing").await;

        assert!(outcome.is_unavailable());
        match &outcome {
            ItemImages::Unavailable { identifier, error } => {
                assert_eq!(identifier, "missing");
                assert!(error.is_not_found());
            }
            ItemImages::Resolved(_) => panic!("expected unavailable"),
        }
        assert!(outcome.into_images().is_empty());
        assert_eq!(metrics.snapshot().unavailable_items, vec!["missing".to_string()]);
    }

    #[tokio::test]
    async fn test_item_without_images() {
        let item = image_item("texts", files(&["Text", "DjVuTXT"]));
        let (resolver, _) = resolver(MockArchive::new().with_item("texts", item));

        let outcome = resolver.resolve("texts").await;
        assert!(!outcome.is_unavailable());
        assert!(outcome.into_images().is_empty());
    }

    #[test]
    fn test_size_and_checksum_defaults() {
        let item = image_item(
            "sizes",
            vec![
                ArchiveFile::new("a.jpg", "JPEG"),
                ArchiveFile::new("b.jpg", "JPEG").with_size("not a number"),
                ArchiveFile::new("c.jpg", "JPEG").with_size(512),
                ArchiveFile::new("d.jpg", "JPEG").with_size(json!(null)),
            ],
        );

        let images = images_from_item("sizes", &item, "https://archive.org");
        let sizes: Vec<u64> = images.iter().map(|img| img.size).collect();

        assert_eq!(sizes, vec![0, 0, 512, 0]);
        assert!(images.iter().all(|img| img.checksum.is_empty()));
    }

    #[test]
    fn test_file_without_format_is_skipped() {
        let item = image_item("nofmt", vec![ArchiveFile::default()]);
        assert!(images_from_item("nofmt", &item, "https://archive.org").is_empty());
    }

    #[test]
    fn test_download_url_trims_base() {
        assert_eq!(
            download_url("http://localhost:8080/", "id", "f.png"),
            "http://localhost:8080/download/id/f.png"
        );
    }
}
