//! Aggregate result of one search

use super::types::ImageResult;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;

/// Complete result of a prompt search.
///
/// Serializes with the derived `total_items` and `total_images` counts;
/// those are recomputed, not read, when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LlomaxResult {
    /// The original prompt
    pub prompt: String,
    /// Keywords extracted from the prompt
    pub keywords: Vec<String>,
    /// Image files found
    #[serde(default)]
    pub images: Vec<ImageResult>,
}

impl LlomaxResult {
    pub fn new(prompt: impl Into<String>, keywords: Vec<String>, images: Vec<ImageResult>) -> Self {
        Self {
            prompt: prompt.into(),
            keywords,
            images,
        }
    }

    /// Total number of image files
    pub fn total_images(&self) -> usize {
        self.images.len()
    }

    /// Number of distinct items with images
    pub fn total_items(&self) -> usize {
        self.images
            .iter()
            .map(|img| img.identifier.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Images grouped by item, in first-seen order
    pub fn images_by_item(&self) -> Vec<(&str, Vec<&ImageResult>)> {
        let mut groups: Vec<(&str, Vec<&ImageResult>)> = Vec::new();
        for image in &self.images {
            match groups.iter_mut().find(|(id, _)| *id == image.identifier) {
                Some((_, images)) => images.push(image),
                None => groups.push((image.identifier.as_str(), vec![image])),
            }
        }
        groups
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl Serialize for LlomaxResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("LlomaxResult", 5)?;
        state.serialize_field("prompt", &self.prompt)?;
        state.serialize_field("keywords", &self.keywords)?;
        state.serialize_field("total_items", &self.total_items())?;
        state.serialize_field("total_images", &self.total_images())?;
        state.serialize_field("images", &self.images)?;
        state.end()
    }
}
