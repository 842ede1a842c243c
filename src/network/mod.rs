//! HTTP networking module
//!
//! Provides HTTP client functionality for the archive backend and downloader.

mod client;
mod user_agent;

pub use client::{HttpClient, HttpResponse};
pub use user_agent::default_user_agent;
