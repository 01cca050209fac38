//! Ingest zoning data for every spec'd jurisdiction into one canonical
//! geospatial layer.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use zonespace_config::IngestConfig;

mod ingest;

use ingest::Ingester;

#[derive(Parser, Debug)]
#[command(name = "zonespace", version, about = "Ingest zoning data into one canonical layer")]
struct Args {
    /// Output file
    outfile: PathBuf,

    /// Configuration file (TOML); defaults to zonespace.toml when present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding <slug>.geojson spatial layers
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory holding <slug>.csv ruleset definitions
    #[arg(long)]
    specs_dir: Option<PathBuf>,

    /// Jurisdiction(s) to ingest, default all
    #[arg(long, num_args = 1..)]
    include: Vec<String>,

    /// Jurisdiction(s) to omit
    #[arg(long, num_args = 1..)]
    exclude: Vec<String>,

    /// Overlay sliver area threshold (square meters)
    #[arg(long)]
    min_area: Option<f64>,

    /// Overlay sliver buffer epsilon (meters)
    #[arg(long)]
    sliver_buffer: Option<f64>,
}

impl Args {
    fn into_config(self) -> Result<(IngestConfig, PathBuf)> {
        let mut config = match &self.config {
            Some(path) => IngestConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => IngestConfig::load("zonespace.toml").unwrap_or_default(),
        };

        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if let Some(dir) = self.specs_dir {
            config.specs_dir = dir;
        }
        if !self.include.is_empty() {
            config.include = self.include;
        }
        if !self.exclude.is_empty() {
            config.exclude = self.exclude;
        }
        if let Some(min_area) = self.min_area {
            config.overlay.min_area_sq_meters = min_area;
        }
        if let Some(buffer) = self.sliver_buffer {
            config.overlay.sliver_buffer_meters = buffer;
        }
        Ok((config, self.outfile))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let (config, outfile) = Args::parse().into_config()?;
    Ingester::new(config).run(&outfile)
}
