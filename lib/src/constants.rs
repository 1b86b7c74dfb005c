//! Constants used throughout the ethcali library

use std::path::PathBuf;
use std::time::Duration;

/// Application name for the home directory
pub const APP_NAME: &str = "ethcali";

/// Config file name
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable that points at an explicit config file
pub const CONFIG_ENV: &str = "ETHCALI_CONFIG";

/// Environment variable that overrides the fallback chain id
pub const DEFAULT_CHAIN_ENV: &str = "ETHCALI_DEFAULT_CHAIN_ID";

/// Chain used when the wallet reports nothing usable (Base mainnet)
pub const DEFAULT_CHAIN_ID: u64 = 8453;

/// Decimal precision of the store's payment stablecoin
pub const STABLECOIN_DECIMALS: u8 = 6;

/// Admin status is served from cache for this long before it is re-read
pub const ADMIN_STATUS_STALE_AFTER: Duration = Duration::from_secs(2 * 60);

/// Cached admin status is dropped entirely after this long
pub const ADMIN_STATUS_EVICT_AFTER: Duration = Duration::from_secs(5 * 60);

/// Wait before re-reading the allowance when the wallet returns no transaction hash
pub const ALLOWANCE_RECHECK_DELAY: Duration = Duration::from_secs(3);

/// Interval between receipt polls while waiting for a confirmation
pub const CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Upper bound on how long a purchase waits for its approval to be mined
pub const CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Default IPFS HTTP gateway for metadata
pub const DEFAULT_IPFS_GATEWAY: &str = "https://gateway.pinata.cloud";

/// Per-attempt deadline for metadata fetches
pub const METADATA_TIMEOUT: Duration = Duration::from_secs(10);

/// Retries after the first failed metadata fetch
pub const METADATA_MAX_RETRIES: u32 = 2;

/// First backoff step for metadata retries
pub const METADATA_BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Ceiling for metadata retry backoff
pub const METADATA_BACKOFF_CAP: Duration = Duration::from_secs(10);

/// Get the ethcali home directory (`~/.ethcali/`)
///
/// # Examples
///
/// ```
/// use ethcali_lib::constants::ethcali_home_dir;
///
/// if let Some(path) = ethcali_home_dir() {
///     println!("ethcali home dir: {}", path.display());
/// }
/// ```
pub fn ethcali_home_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(format!(".{APP_NAME}")))
}

/// Get the default config file path.
///
/// `ETHCALI_CONFIG` wins over `~/.ethcali/config.toml` when set.
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    ethcali_home_dir().map(|p| p.join(CONFIG_FILE))
}
