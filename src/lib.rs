//! Llomax: image retrieval from the Internet Archive
//!
//! A prompt of comma-separated keywords is searched keyword by keyword,
//! candidates are sampled round-robin across keywords, and the image files
//! of the sampled items are returned with their item metadata.

pub mod archive;
pub mod config;
pub mod download;
pub mod error;
pub mod metrics;
pub mod network;
pub mod results;
pub mod search;

pub use archive::{ArchiveBackend, InternetArchive};
pub use config::Settings;
pub use download::Downloader;
pub use error::{LlomaxError, Result};
pub use results::{ImageResult, LlomaxResult};
pub use search::Llomax;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
