// src/config.rs

//! Configuration loading utilities.
//!
//! Combines the TOML file, environment overrides and validation into the
//! single entry point used by the CLI.

use std::path::Path;

use crate::error::Result;
use crate::models::Config;

/// Load configuration from a TOML file, apply `SHARE_RESOLVER_*` environment
/// overrides, and validate the result.
///
/// A missing or unreadable file falls back to defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// [`load_config`] with an explicit override source.
pub fn load_config_with<F>(path: &Path, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = Config::load_or_default(path);
    config.apply_overrides(lookup);
    config.validate()?;

    log::debug!(
        "Config: {} strategies enabled, listen {}",
        enabled_strategy_count(&config),
        config.server.addr()
    );
    Ok(config)
}

fn enabled_strategy_count(config: &Config) -> usize {
    let resolver = &config.resolver;
    usize::from(resolver.share_page)
        + usize::from(resolver.item_api)
        + resolver.providers.iter().filter(|p| p.enabled).count()
}
