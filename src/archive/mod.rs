//! Archive backend module
//!
//! Defines the [`ArchiveBackend`] boundary, query construction, well-known
//! collections, and the Internet Archive implementation.

mod collection;
mod internet_archive;
mod query;
mod traits;

#[cfg(test)]
pub(crate) mod mock;

pub use collection::{Collection, MainCollection};
pub use internet_archive::InternetArchive;
pub use query::{FilterValue, Operator, QueryBuilder, SearchFilters, COMMERCIAL_USE_LICENSES};
pub use traits::*;

/// Public Internet Archive endpoint
pub const DEFAULT_ARCHIVE_URL: &str = "https://archive.org";
