//! Active-chain resolution from a wallet's self-reported chain tag.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Chain identifier as reported by a connected wallet.
///
/// Wallets report either a bare integer or a namespaced string such as
/// `"eip155:8453"`. Read fresh on every orchestration call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WalletChainTag {
    Number(u64),
    Text(String),
}

impl WalletChainTag {
    /// Parse the numeric chain id, if the tag carries one.
    ///
    /// Strings are split on `:` and the last segment is parsed as an integer,
    /// either decimal or `0x`-prefixed hex.
    pub fn chain_id(&self) -> Option<u64> {
        match self {
            WalletChainTag::Number(id) => Some(*id),
            WalletChainTag::Text(text) => {
                let last = text.rsplit(':').next()?.trim();
                match last.strip_prefix("0x").or_else(|| last.strip_prefix("0X")) {
                    Some(hex) => u64::from_str_radix(hex, 16).ok(),
                    None => last.parse::<u64>().ok(),
                }
            }
        }
    }
}

impl From<u64> for WalletChainTag {
    fn from(id: u64) -> Self {
        WalletChainTag::Number(id)
    }
}

impl From<&str> for WalletChainTag {
    fn from(text: &str) -> Self {
        WalletChainTag::Text(text.to_string())
    }
}

impl FromStr for WalletChainTag {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<u64>() {
            Ok(id) => WalletChainTag::Number(id),
            Err(_) => WalletChainTag::Text(s.to_string()),
        })
    }
}

impl fmt::Display for WalletChainTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletChainTag::Number(id) => write!(f, "{id}"),
            WalletChainTag::Text(text) => write!(f, "{text}"),
        }
    }
}

/// Derives the active chain id from a wallet chain tag.
///
/// # Examples
///
/// ```
/// use ethcali_lib::resolver::{ChainResolver, WalletChainTag};
///
/// let resolver = ChainResolver::new(8453);
/// assert_eq!(resolver.resolve(Some(&WalletChainTag::from("eip155:10"))), 10);
/// assert_eq!(resolver.resolve(None), 8453);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainResolver {
    fallback: u64,
}

impl ChainResolver {
    pub const fn new(fallback: u64) -> Self {
        Self { fallback }
    }

    pub const fn fallback(&self) -> u64 {
        self.fallback
    }

    /// Resolve a tag to a chain id.
    ///
    /// Absent tags, unparseable tags and the reserved id `0` resolve to the
    /// fallback. The result is not checked against any registry; pair with
    /// [`ChainRegistry::descriptor_for`](crate::network::ChainRegistry::descriptor_for)
    /// for the default-chain policy.
    pub fn resolve(&self, tag: Option<&WalletChainTag>) -> u64 {
        tag.and_then(WalletChainTag::chain_id)
            .filter(|id| *id != 0)
            .unwrap_or(self.fallback)
    }
}
