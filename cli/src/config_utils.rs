//! Configuration loading utilities for the CLI

use anyhow::{Context, Result};
use ethcali_lib::{ChainDescriptor, ChainRegistry, Config, EthcaliError};
use std::path::{Path, PathBuf};

/// Load configuration from CLI arguments or default location.
///
/// A missing file yields the defaults.
pub fn load_config(config_path: Option<impl AsRef<Path>>) -> Result<Config> {
    Config::load_or_default(config_path).context("Failed to load configuration")
}

/// Path the CLI reads its config from
pub fn config_path(config_path: Option<&String>) -> Result<PathBuf> {
    match config_path {
        Some(path) => Ok(PathBuf::from(path)),
        None => Ok(Config::default_config_path()?),
    }
}

pub fn load_registry(config: &Config) -> Result<ChainRegistry> {
    Ok(ChainRegistry::from_config(config)?)
}

/// Chain named on the command line, or the default chain when none is given.
///
/// Unlike wallet-reported chains, an explicit name must be supported.
pub fn select_chain<'r>(registry: &'r ChainRegistry, name: Option<&str>) -> Result<&'r ChainDescriptor> {
    match name {
        None => Ok(registry.default_descriptor()),
        Some(name) => registry.lookup(name).ok_or_else(|| {
            let id = name.rsplit(':').next().and_then(|id| id.parse::<u64>().ok());
            match id {
                Some(id) => EthcaliError::UnsupportedChain(id).into(),
                None => anyhow::anyhow!(
                    "Unknown chain: '{name}'. Use 'ethcali chains list' to see available chains."
                ),
            }
        }),
    }
}
