//! Well-known archive collections

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Main image collections on the Internet Archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MainCollection {
    Nasa,
    PrelingerArchives,
    Smithsonian,
    MetropolitanMuseum,
    FlickrCommons,
    LibraryOfCongress,
}

impl MainCollection {
    pub const ALL: [MainCollection; 6] = [
        Self::Nasa,
        Self::PrelingerArchives,
        Self::Smithsonian,
        Self::MetropolitanMuseum,
        Self::FlickrCommons,
        Self::LibraryOfCongress,
    ];

    /// Collection identifier on the archive
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nasa => "nasa",
            Self::PrelingerArchives => "prelinger",
            Self::Smithsonian => "smithsonian",
            Self::MetropolitanMuseum => "metropolitanmuseumofart-gallery",
            Self::FlickrCommons => "flickrcommons",
            Self::LibraryOfCongress => "library_of_congress",
        }
    }

    /// Names accepted for this collection, after normalization
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Nasa => &["nasa"],
            Self::PrelingerArchives => &["prelinger", "prelingerarchives"],
            Self::Smithsonian => &["smithsonian"],
            Self::MetropolitanMuseum => &[
                "metropolitanmuseum",
                "metropolitanmuseumofartgallery",
            ],
            Self::FlickrCommons => &["flickrcommons"],
            Self::LibraryOfCongress => &["libraryofcongress"],
        }
    }

    /// Look up a collection by name, ignoring case and separators
    pub fn lookup(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        Self::ALL
            .into_iter()
            .find(|c| c.aliases().contains(&normalized.as_str()))
    }
}

impl fmt::Display for MainCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A collection restriction: well-known, or any valid archive identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Collection {
    Main(MainCollection),
    Custom(String),
}

impl Collection {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Main(main) => main.as_str(),
            Self::Custom(name) => name,
        }
    }
}

impl From<MainCollection> for Collection {
    fn from(main: MainCollection) -> Self {
        Self::Main(main)
    }
}

impl FromStr for Collection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if let Some(main) = MainCollection::lookup(name) {
            return Ok(Self::Main(main));
        }

        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if valid {
            Ok(Self::Custom(name.to_string()))
        } else {
            Err(ConfigError::InvalidCollection(s.to_string()))
        }
    }
}

impl TryFrom<String> for Collection {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Collection> for String {
    fn from(collection: Collection) -> Self {
        collection.as_str().to_string()
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
