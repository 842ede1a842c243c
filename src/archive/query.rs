//! Search query construction
//!
//! Translates keywords and structured filter intent into the archive's
//! Lucene-style query syntax.

use super::collection::Collection;
use super::traits::ArchiveQuery;
use crate::config::Settings;
use crate::error::ConfigError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// License URLs that permit commercial use
pub const COMMERCIAL_USE_LICENSES: [&str; 8] = [
    "http://creativecommons.org/publicdomain/zero/1.0/",
    "https://creativecommons.org/publicdomain/zero/1.0/",
    "http://creativecommons.org/publicdomain/mark/1.0/",
    "https://creativecommons.org/publicdomain/mark/1.0/",
    "http://creativecommons.org/licenses/by/4.0/",
    "https://creativecommons.org/licenses/by/4.0/",
    "http://creativecommons.org/licenses/by-sa/4.0/",
    "https://creativecommons.org/licenses/by-sa/4.0/",
];

/// Logical operator joining keywords
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Operator {
    And,
    #[default]
    Or,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl FromStr for Operator {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            other => Err(ConfigError::UnsupportedOperator(other.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of a field filter: one value or any of several.
///
/// Numbers and booleans are accepted when deserializing and kept in their
/// textual form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl From<Scalar> for String {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Text(text) => text,
            Scalar::Bool(flag) => flag.to_string(),
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFilterValue {
    One(Scalar),
    Many(Vec<Scalar>),
}

impl<'de> Deserialize<'de> for FilterValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawFilterValue::deserialize(deserializer)? {
            RawFilterValue::One(value) => Self::One(value.into()),
            RawFilterValue::Many(values) => {
                Self::Many(values.into_iter().map(String::from).collect())
            }
        })
    }
}

impl FilterValue {
    /// Add another accepted value, promoting a single value to a list
    pub fn push(&mut self, value: impl Into<String>) {
        let value = value.into();
        match self {
            Self::One(existing) => {
                *self = Self::Many(vec![std::mem::take(existing), value]);
            }
            Self::Many(values) => values.push(value),
        }
    }

    fn clause(&self, field: &str) -> String {
        match self {
            Self::One(value) => format!("{}:{}", field, value),
            Self::Many(values) => format!("{}:({})", field, values.join(" OR ")),
        }
    }
}

/// Structured restrictions passed across the backend boundary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    /// Restrict to any of these collections
    pub collections: Vec<Collection>,
    /// Restrict to commercial-use licenses
    pub commercial_use: bool,
    /// Arbitrary field filters
    pub fields: BTreeMap<String, FilterValue>,
}

impl SearchFilters {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            collections: settings.collections.clone().unwrap_or_default(),
            commercial_use: settings.commercial_use,
            fields: settings.filters.clone().unwrap_or_default(),
        }
    }

    /// Query clauses: collection, license, then field filters.
    ///
    /// The collection and commercial-use shortcuts replace generic
    /// `collection` and `licenseurl` field filters.
    pub fn clauses(&self) -> Vec<String> {
        let mut clauses = Vec::new();

        if !self.collections.is_empty() {
            let names: Vec<&str> = self.collections.iter().map(Collection::as_str).collect();
            clauses.push(format!("collection:({})", names.join(" OR ")));
        }

        if self.commercial_use {
            let urls: Vec<String> = COMMERCIAL_USE_LICENSES
                .iter()
                .map(|url| format!("\"{}\"", url))
                .collect();
            clauses.push(format!("licenseurl:({})", urls.join(" OR ")));
        }

        for (field, value) in &self.fields {
            if field == "collection" && !self.collections.is_empty() {
                continue;
            }
            if field == "licenseurl" && self.commercial_use {
                continue;
            }
            clauses.push(value.clause(field));
        }

        clauses
    }
}

/// Builds query strings for a fixed media type
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    mediatype: String,
}

impl QueryBuilder {
    pub fn new(mediatype: impl Into<String>) -> Self {
        Self {
            mediatype: mediatype.into(),
        }
    }

    /// Build the full query string
    pub fn build(&self, query: &ArchiveQuery) -> Result<String, ConfigError> {
        if query.keywords.is_empty() {
            return Err(ConfigError::EmptyKeywords);
        }

        let separator = format!(" {} ", query.operator);
        let joined = query.keywords.join(separator.as_str());
        let mut parts = vec![format!("({}) AND mediatype:{}", joined, self.mediatype)];
        parts.extend(query.filters.clauses());

        Ok(parts.join(" AND "))
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new("image")
    }
}
