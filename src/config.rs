use std::path::PathBuf;

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment};
use serde::Deserialize;

use crate::cache::CacheStore;

pub const BASE_URL: &str = "https://www.cambridgefilmfestival.org.uk";
pub const LISTING_URL: &str = "https://www.cambridgefilmfestival.org.uk/whats-on";
pub const DEFAULT_OUTPUT: &str = "cff.ics";
pub const FESTIVAL_YEAR: i64 = 2023;

/// Run settings: built-in defaults, overridden by `CFF_*` environment
/// variables, overridden again by CLI flags in `main`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub base_url: String,
    pub listing_url: String,
    pub output: PathBuf,
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// Year assumed when a showtime string leaves it out
    pub festival_year: i32,
    pub timeout_secs: u64,
    pub strict: bool,
}

impl Settings {
    pub fn load() -> Result<Self> {
        let built = defaults()?
            .add_source(Environment::with_prefix("CFF"))
            .build()
            .context("Failed to read CFF_* environment settings")?;
        built
            .try_deserialize()
            .context("Failed to parse settings")
    }

    /// Cache directory to use, falling back to the platform cache location.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => CacheStore::default_dir().context("Could not determine cache directory"),
        }
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>> {
    Ok(Config::builder()
        .set_default("base_url", BASE_URL)?
        .set_default("listing_url", LISTING_URL)?
        .set_default("output", DEFAULT_OUTPUT)?
        .set_default("festival_year", FESTIVAL_YEAR)?
        .set_default("timeout_secs", 30_i64)?
        .set_default("strict", false)?)
}

#[cfg(test)]
pub fn test_settings() -> Settings {
    Settings {
        base_url: BASE_URL.to_string(),
        listing_url: LISTING_URL.to_string(),
        output: PathBuf::from(DEFAULT_OUTPUT),
        cache_dir: None,
        festival_year: FESTIVAL_YEAR as i32,
        timeout_secs: 30,
        strict: false,
    }
}
