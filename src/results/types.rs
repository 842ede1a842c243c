//! Image result type definitions

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A metadata value: a string or a list of strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    List(Vec<String>),
}

impl MetadataValue {
    /// Convert a raw archive value; `null` is treated as absent
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Array(items) => Some(Self::List(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            )),
            other => Some(Self::Text(other.to_string())),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::List(_) => None,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Item-level metadata attached to every image of an item.
///
/// Every field is always serialized; an absent source field becomes `null`,
/// so "absent" and "present but empty" stay distinguishable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemMetadata {
    pub identifier: Option<MetadataValue>,
    pub title: Option<MetadataValue>,
    pub description: Option<MetadataValue>,
    pub creator: Option<MetadataValue>,
    pub date: Option<MetadataValue>,
    pub year: Option<MetadataValue>,
    pub subject: Option<MetadataValue>,
    pub collection: Option<MetadataValue>,
    pub licenseurl: Option<MetadataValue>,
    pub rights: Option<MetadataValue>,
    pub publisher: Option<MetadataValue>,
}

impl ItemMetadata {
    /// Projected field names, in serialization order
    pub const FIELDS: [&'static str; 11] = [
        "identifier",
        "title",
        "description",
        "creator",
        "date",
        "year",
        "subject",
        "collection",
        "licenseurl",
        "rights",
        "publisher",
    ];

    /// Project the known fields out of a raw metadata record
    pub fn from_record(record: &serde_json::Map<String, Value>) -> Self {
        let field = |name: &str| record.get(name).and_then(MetadataValue::from_json);
        Self {
            identifier: field("identifier"),
            title: field("title"),
            description: field("description"),
            creator: field("creator"),
            date: field("date"),
            year: field("year"),
            subject: field("subject"),
            collection: field("collection"),
            licenseurl: field("licenseurl"),
            rights: field("rights"),
            publisher: field("publisher"),
        }
    }

    /// Look up a field; `None` for absent fields and unknown names
    pub fn get(&self, name: &str) -> Option<&MetadataValue> {
        match name {
            "identifier" => self.identifier.as_ref(),
            "title" => self.title.as_ref(),
            "description" => self.description.as_ref(),
            "creator" => self.creator.as_ref(),
            "date" => self.date.as_ref(),
            "year" => self.year.as_ref(),
            "subject" => self.subject.as_ref(),
            "collection" => self.collection.as_ref(),
            "licenseurl" => self.licenseurl.as_ref(),
            "rights" => self.rights.as_ref(),
            "publisher" => self.publisher.as_ref(),
            _ => None,
        }
    }

    /// Metadata as a JSON object with every projected key present
    pub fn to_json_map(&self) -> serde_json::Map<String, Value> {
        Self::FIELDS
            .iter()
            .map(|name| {
                let value = self
                    .get(name)
                    .map(|v| serde_json::to_value(v).unwrap_or(Value::Null))
                    .unwrap_or(Value::Null);
                (name.to_string(), value)
            })
            .collect()
    }
}

/// A downloadable image file with its item's metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResult {
    /// Owning item identifier
    pub identifier: String,
    /// Stored file name
    pub filename: String,
    /// Full download URL
    pub download_url: String,
    /// Archive format tag (e.g. "JPEG")
    pub format: String,
    /// File size in bytes
    pub size: u64,
    /// MD5 checksum, empty when unknown
    #[serde(rename = "md5")]
    pub checksum: String,
    /// Item-level metadata
    pub metadata: ItemMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_record_projects_known_fields() {
        let record = json!({
            "identifier": "meta-test",
            "title": "Jazz Photo",
            "subject": ["jazz", "photography"],
            "year": 1955,
            "uploader": "someone@example.com"
        });
        let meta = ItemMetadata::from_record(record.as_object().unwrap());

        assert_eq!(meta.title, Some("Jazz Photo".into()));
        assert_eq!(
            meta.subject,
            Some(MetadataValue::List(vec![
                "jazz".to_string(),
                "photography".to_string()
            ]))
        );
        assert_eq!(meta.year, Some("1955".into()));
        assert!(meta.creator.is_none());
        assert!(meta.get("uploader").is_none());
    }

    #[test]
    fn test_absent_fields_serialize_as_null() {
        let record = json!({ "identifier": "sparse", "description": "" });
        let meta = ItemMetadata::from_record(record.as_object().unwrap());
        let value = serde_json::to_value(&meta).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), ItemMetadata::FIELDS.len());
        for field in ItemMetadata::FIELDS {
            assert!(object.contains_key(field), "missing {}", field);
        }
        assert_eq!(object["creator"], Value::Null);
        assert_eq!(object["description"], json!(""));
    }

    #[test]
    fn test_to_json_map_matches_serialization() {
        let meta = ItemMetadata {
            title: Some("T".into()),
            ..Default::default()
        };
        let map = meta.to_json_map();
        assert_eq!(Value::Object(map), serde_json::to_value(&meta).unwrap());
    }

    #[test]
    fn test_image_result_serializes_checksum_as_md5() {
        let image = ImageResult {
            identifier: "id".to_string(),
            filename: "a.jpg".to_string(),
            download_url: "https://archive.org/download/id/a.jpg".to_string(),
            format: "JPEG".to_string(),
            size: 10,
            checksum: "abc".to_string(),
            metadata: ItemMetadata::default(),
        };
        let value = serde_json::to_value(&image).unwrap();
        assert_eq!(value["md5"], "abc");
        assert!(value.get("checksum").is_none());
    }
}
