//! Configuration management for ethcali.

use crate::constants::{
    ADMIN_STATUS_EVICT_AFTER, ADMIN_STATUS_STALE_AFTER, ALLOWANCE_RECHECK_DELAY,
    CONFIRMATION_POLL_INTERVAL, CONFIRMATION_TIMEOUT, DEFAULT_CHAIN_ENV, DEFAULT_CHAIN_ID,
    DEFAULT_IPFS_GATEWAY, METADATA_BACKOFF_BASE, METADATA_BACKOFF_CAP, METADATA_MAX_RETRIES,
    METADATA_TIMEOUT,
};
use crate::error::{EthcaliError, Result};
use crate::network::{ChainRegistry, ContractKind, Stablecoin};
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Chain used when the wallet reports nothing usable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_chain_id: Option<u64>,
    /// RPC URL overrides keyed by chain label
    #[serde(default)]
    pub rpc: HashMap<String, String>,
    /// Additional chain definitions
    #[serde(default)]
    pub chains: Vec<CustomChain>,
    /// Per-chain contract deployments
    #[serde(default)]
    pub deployments: Vec<Deployment>,
    /// Stablecoin address overrides
    #[serde(default)]
    pub tokens: Vec<CustomToken>,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub admin_cache: AdminCacheConfig,
    #[serde(default)]
    pub purchase: PurchaseConfig,
}

/// Custom chain definition for extending built-in chains
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomChain {
    /// Numeric chain id
    pub id: u64,
    /// Short label (e.g., "local")
    pub label: String,
    /// Human-readable display name
    pub name: String,
    /// RPC endpoint URL
    pub rpc_url: String,
    /// Block explorer base URL
    #[serde(default)]
    pub explorer_url: String,
    /// Register with the wallet before switching
    #[serde(default)]
    pub preregister: bool,
}

/// Contract addresses deployed on one chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Deployment {
    pub chain_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faucet_manager: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_registry: Option<Address>,
}

impl Deployment {
    pub fn get(&self, kind: ContractKind) -> Option<Address> {
        match kind {
            ContractKind::Store => self.store,
            ContractKind::FaucetManager => self.faucet_manager,
            ContractKind::IdentityRegistry => self.identity_registry,
        }
    }
}

/// Stablecoin address override for one chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomToken {
    pub chain_id: u64,
    pub symbol: Stablecoin,
    pub address: Address,
}

/// Metadata gateway settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetadataConfig {
    /// HTTP gateway used for `ipfs://` and bare CID URIs
    pub gateway: String,
    /// Per-attempt deadline in seconds
    pub timeout_secs: u64,
    /// Retries after the first failed attempt
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub backoff_cap_ms: u64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            gateway: DEFAULT_IPFS_GATEWAY.to_string(),
            timeout_secs: METADATA_TIMEOUT.as_secs(),
            max_retries: METADATA_MAX_RETRIES,
            backoff_base_ms: METADATA_BACKOFF_BASE.as_millis() as u64,
            backoff_cap_ms: METADATA_BACKOFF_CAP.as_millis() as u64,
        }
    }
}

impl MetadataConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn backoff_cap(&self) -> Duration {
        Duration::from_millis(self.backoff_cap_ms)
    }
}

/// Admin status cache windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdminCacheConfig {
    /// Seconds a cached status is served without re-reading
    pub stale_secs: u64,
    /// Seconds after which a cached status is dropped
    pub evict_secs: u64,
}

impl Default for AdminCacheConfig {
    fn default() -> Self {
        Self {
            stale_secs: ADMIN_STATUS_STALE_AFTER.as_secs(),
            evict_secs: ADMIN_STATUS_EVICT_AFTER.as_secs(),
        }
    }
}

impl AdminCacheConfig {
    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_secs)
    }

    pub fn evict_after(&self) -> Duration {
        Duration::from_secs(self.evict_secs)
    }
}

/// Purchase flow timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PurchaseConfig {
    /// Delay before re-reading the allowance when no approval hash is returned
    pub allowance_recheck_delay_ms: u64,
    /// Interval between receipt polls
    pub confirmation_poll_interval_ms: u64,
    /// Give up waiting for an approval receipt after this many seconds
    pub confirmation_timeout_secs: u64,
}

impl Default for PurchaseConfig {
    fn default() -> Self {
        Self {
            allowance_recheck_delay_ms: ALLOWANCE_RECHECK_DELAY.as_millis() as u64,
            confirmation_poll_interval_ms: CONFIRMATION_POLL_INTERVAL.as_millis() as u64,
            confirmation_timeout_secs: CONFIRMATION_TIMEOUT.as_secs(),
        }
    }
}

impl PurchaseConfig {
    pub fn allowance_recheck_delay(&self) -> Duration {
        Duration::from_millis(self.allowance_recheck_delay_ms)
    }

    pub fn confirmation_poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirmation_poll_interval_ms)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }
}

/// Builder for creating Config instances
///
/// # Examples
///
/// ```
/// use alloy::primitives::address;
/// use ethcali_lib::config::{Config, Deployment};
///
/// let config = Config::builder()
///     .with_default_chain_id(8453)
///     .with_rpc_override("base", "http://localhost:8545")
///     .with_deployment(Deployment {
///         chain_id: 8453,
///         store: Some(address!("0x1111111111111111111111111111111111111111")),
///         faucet_manager: None,
///         identity_registry: None,
///     })
///     .build()
///     .unwrap();
/// assert_eq!(config.default_chain_id, Some(8453));
/// ```
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new config builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_chain_id(mut self, chain_id: u64) -> Self {
        self.config.default_chain_id = Some(chain_id);
        self
    }

    /// Add an RPC URL override for a chain
    pub fn with_rpc_override(mut self, chain: impl Into<String>, rpc_url: impl Into<String>) -> Self {
        self.config.rpc.insert(chain.into(), rpc_url.into());
        self
    }

    /// Add a custom chain
    pub fn with_chain(mut self, chain: CustomChain) -> Self {
        self.config.chains.push(chain);
        self
    }

    pub fn with_deployment(mut self, deployment: Deployment) -> Self {
        self.config.deployments.push(deployment);
        self
    }

    /// Add a stablecoin override
    pub fn with_token(mut self, token: CustomToken) -> Self {
        self.config.tokens.push(token);
        self
    }

    pub fn with_metadata(mut self, metadata: MetadataConfig) -> Self {
        self.config.metadata = metadata;
        self
    }

    pub fn with_admin_cache(mut self, admin_cache: AdminCacheConfig) -> Self {
        self.config.admin_cache = admin_cache;
        self
    }

    pub fn with_purchase(mut self, purchase: PurchaseConfig) -> Self {
        self.config.purchase = purchase;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }

    /// Build without validation
    pub fn build_unchecked(self) -> Config {
        self.config
    }
}

impl Config {
    /// Create a new config builder
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Load and validate config from the specified path or default location.
    ///
    /// Unlike [`Config::load_or_default`], a missing file is an error.
    pub fn load_from(config_path: Option<impl AsRef<Path>>) -> Result<Self> {
        let config_path = Self::resolve_path(config_path)?;

        if !config_path.exists() {
            return Err(EthcaliError::config_missing(format!(
                "Config file not found at {}. Run 'ethcali config init' to create one.",
                config_path.display()
            )));
        }

        let config = Self::read(&config_path)?;
        config.validate().map_err(|e| {
            EthcaliError::InvalidConfig(format!(
                "Invalid configuration in {}: {}",
                config_path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    /// Load config, returning defaults if the file doesn't exist.
    ///
    /// Errors from an existing but unreadable or invalid file are propagated.
    pub fn load_or_default(config_path: Option<impl AsRef<Path>>) -> Result<Self> {
        let config_path = Self::resolve_path(config_path)?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let config = Self::read(&config_path)?;
        config.validate().map_err(|e| {
            EthcaliError::InvalidConfig(format!(
                "Invalid configuration in {}: {}",
                config_path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    fn resolve_path(config_path: Option<impl AsRef<Path>>) -> Result<PathBuf> {
        match config_path {
            Some(path) => Ok(PathBuf::from(path.as_ref())),
            None => Self::default_config_path(),
        }
    }

    fn read(config_path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(config_path).map_err(|e| {
            EthcaliError::InvalidConfig(format!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            EthcaliError::InvalidConfig(format!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            ))
        })
    }

    /// Get the default config file path (~/.ethcali/config.toml)
    pub fn default_config_path() -> Result<PathBuf> {
        crate::constants::default_config_path().ok_or(EthcaliError::NoConfigDir)
    }

    /// Validate and write the config to `path`, creating parent directories
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        self.validate()?;

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default chain id after applying the `ETHCALI_DEFAULT_CHAIN_ID` override.
    ///
    /// An override that does not parse as an integer is ignored.
    pub fn effective_default_chain_id(&self) -> u64 {
        std::env::var(DEFAULT_CHAIN_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .or(self.default_chain_id)
            .unwrap_or(DEFAULT_CHAIN_ID)
    }

    /// Validate the configuration.
    ///
    /// Checks cache and timing windows, duplicate deployments, and that the
    /// registry built from this config has the default chain.
    pub fn validate(&self) -> Result<()> {
        if self.admin_cache.stale_secs == 0 || self.admin_cache.evict_secs == 0 {
            return Err(EthcaliError::InvalidConfig(
                "admin_cache windows must be greater than zero".to_string(),
            ));
        }
        if self.admin_cache.stale_secs > self.admin_cache.evict_secs {
            return Err(EthcaliError::InvalidConfig(format!(
                "admin_cache.stale_secs ({}) must not exceed admin_cache.evict_secs ({})",
                self.admin_cache.stale_secs, self.admin_cache.evict_secs
            )));
        }
        if self.metadata.timeout_secs == 0 {
            return Err(EthcaliError::InvalidConfig(
                "metadata.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.metadata.gateway.trim().is_empty() {
            return Err(EthcaliError::InvalidConfig(
                "metadata.gateway must not be empty".to_string(),
            ));
        }
        if self.purchase.confirmation_poll_interval_ms == 0
            || self.purchase.confirmation_timeout_secs == 0
        {
            return Err(EthcaliError::InvalidConfig(
                "purchase confirmation windows must be greater than zero".to_string(),
            ));
        }
        for (i, deployment) in self.deployments.iter().enumerate() {
            if self.deployments[..i]
                .iter()
                .any(|d| d.chain_id == deployment.chain_id)
            {
                return Err(EthcaliError::InvalidConfig(format!(
                    "Chain {} has more than one [[deployments]] entry",
                    deployment.chain_id
                )));
            }
        }

        ChainRegistry::from_config(self).map(|_| ())
    }
}
