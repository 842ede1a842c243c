//! Llomax command-line entry point

use anyhow::{bail, Context, Result};
use clap::Parser;
use llomax::{
    archive::FilterValue,
    config::{self, Settings, SettingsLayer},
    metrics::SearchMetrics,
    network::HttpClient,
    Downloader, InternetArchive, Llomax, LlomaxResult,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "llomax")]
#[command(about = "Search and download images from the Internet Archive")]
#[command(version)]
struct Cli {
    /// Comma-separated keywords to search for
    prompt: String,

    /// Directory to save downloaded images
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Maximum number of items to download
    #[arg(short = 'n', long)]
    max_results: Option<usize>,

    /// Path to config file (default: llomax.toml)
    #[arg(short, long, env = "LLOMAX_CONFIG")]
    config: Option<PathBuf>,

    /// Restrict to a collection; repeatable
    #[arg(long = "collection", value_name = "NAME")]
    collections: Vec<String>,

    /// Restrict to commercial-use licenses
    #[arg(long, overrides_with = "no_commercial_use")]
    commercial_use: bool,

    /// Allow any license
    #[arg(long, overrides_with = "commercial_use")]
    no_commercial_use: bool,

    /// Archive field filter; repeating a key matches any of its values
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    filters: Vec<String>,

    /// Print the result as JSON instead of downloading
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn commercial_use(&self) -> Option<bool> {
        match (self.commercial_use, self.no_commercial_use) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    /// Overrides taken from the command line
    fn settings_layer(&self) -> Result<SettingsLayer> {
        Ok(SettingsLayer {
            output_dir: self.output_dir.clone(),
            max_results: self.max_results,
            collections: (!self.collections.is_empty()).then(|| self.collections.clone()),
            commercial_use: self.commercial_use(),
            filters: parse_filters(&self.filters)?,
            outgoing: None,
        })
    }
}

/// Parse `KEY=VALUE` pairs; a repeated key collects its values into a list
fn parse_filters(raw: &[String]) -> Result<Option<BTreeMap<String, FilterValue>>> {
    if raw.is_empty() {
        return Ok(None);
    }

    let mut filters: BTreeMap<String, FilterValue> = BTreeMap::new();
    for entry in raw {
        let Some((key, value)) = entry.split_once('=') else {
            bail!("invalid filter {:?}: expected KEY=VALUE", entry);
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() {
            bail!("invalid filter {:?}: empty key", entry);
        }
        match filters.get_mut(key) {
            Some(existing) => existing.push(value),
            None => {
                filters.insert(key.to_string(), FilterValue::One(value.to_string()));
            }
        }
    }
    Ok(Some(filters))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let config_path = config::config_path(cli.config.clone());
    let settings = Settings::load(&config_path, cli.settings_layer()?)
        .with_context(|| format!("failed to load settings from {}", config_path.display()))?;
    info!("Starting Llomax v{}", llomax::VERSION);

    let metrics = Arc::new(SearchMetrics::new());
    let archive = InternetArchive::from_settings(&settings.outgoing)
        .context("failed to create archive client")?;
    let llomax = Llomax::new(Arc::new(archive), settings.clone()).with_reporter(metrics.clone());

    let result = llomax.search(&cli.prompt, None).await?;

    let report = Report::new(&result, cli.json)?;
    for line in &report.stderr {
        eprintln!("{}", line);
    }
    for line in &report.stdout {
        println!("{}", line);
    }
    if !report.download {
        return Ok(());
    }

    let client = HttpClient::with_settings(&settings.outgoing)?;
    let saved = Downloader::new(client)
        .with_reporter(metrics.clone())
        .download_images(&result, &settings.output_dir)
        .await?;
    println!("Downloaded {} file(s) to {}/", saved.len(), settings.output_dir);

    let snapshot = metrics.snapshot();
    if !snapshot.failed_downloads.is_empty() {
        info!("Skipped {} file(s)", snapshot.failed_downloads.len());
    }

    Ok(())
}

/// What the CLI prints for a search result, and whether it downloads
#[derive(Debug, PartialEq)]
struct Report {
    stdout: Vec<String>,
    stderr: Vec<String>,
    download: bool,
}

impl Report {
    /// In JSON mode stdout carries only the aggregate, even when empty.
    fn new(result: &LlomaxResult, json: bool) -> Result<Self> {
        let message = if result.is_empty() {
            "No images found.".to_string()
        } else {
            format!(
                "Found {} image(s) across {} item(s).",
                result.total_images(),
                result.total_items()
            )
        };

        if json {
            return Ok(Self {
                stdout: vec![serde_json::to_string_pretty(result)?],
                stderr: vec![message],
                download: false,
            });
        }
        Ok(Self {
            stdout: vec![message],
            stderr: Vec::new(),
            download: !result.is_empty(),
        })
    }
}
