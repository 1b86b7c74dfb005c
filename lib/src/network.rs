//! Chain registry: static network metadata plus per-chain contract deployments.

use crate::config::Config;
use crate::currency::{currencies, Currency};
use crate::error::{EthcaliError, Result};
use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Chain label constants for use in configuration and matching
pub mod chains {
    pub const BASE: &str = "base";
    pub const ETHEREUM: &str = "ethereum";
    pub const UNICHAIN: &str = "unichain";
    pub const OPTIMISM: &str = "optimism";
}

/// Logical contracts the dashboard talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractKind {
    /// Merch store (ERC-1155 swag contract)
    Store,
    /// Faucet manager
    FaucetManager,
    /// Identity registry (passport NFT)
    IdentityRegistry,
}

impl ContractKind {
    pub const fn all() -> [ContractKind; 3] {
        [
            ContractKind::Store,
            ContractKind::FaucetManager,
            ContractKind::IdentityRegistry,
        ]
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            ContractKind::Store => "store",
            ContractKind::FaucetManager => "faucet manager",
            ContractKind::IdentityRegistry => "identity registry",
        }
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stablecoins tracked per chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Stablecoin {
    Usdc,
    Usdt,
    Eurc,
}

impl Stablecoin {
    pub const fn all() -> [Stablecoin; 3] {
        [Stablecoin::Usdc, Stablecoin::Usdt, Stablecoin::Eurc]
    }

    pub const fn currency(&self) -> Currency {
        match self {
            Stablecoin::Usdc => currencies::USDC,
            Stablecoin::Usdt => currencies::USDT,
            Stablecoin::Eurc => currencies::EURC,
        }
    }

    pub const fn symbol(&self) -> &'static str {
        self.currency().symbol
    }
}

impl FromStr for Stablecoin {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USDC" => Ok(Stablecoin::Usdc),
            "USDT" => Ok(Stablecoin::Usdt),
            "EURC" => Ok(Stablecoin::Eurc),
            _ => Err(format!("Unknown stablecoin: {s}")),
        }
    }
}

impl fmt::Display for Stablecoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Deployed contract addresses on a single chain.
///
/// `None` means the contract is not deployed there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractAddresses {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faucet_manager: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_registry: Option<Address>,
}

impl ContractAddresses {
    pub fn get(&self, kind: ContractKind) -> Option<Address> {
        match kind {
            ContractKind::Store => self.store,
            ContractKind::FaucetManager => self.faucet_manager,
            ContractKind::IdentityRegistry => self.identity_registry,
        }
    }

    fn set(&mut self, kind: ContractKind, address: Option<Address>) {
        match kind {
            ContractKind::Store => self.store = address,
            ContractKind::FaucetManager => self.faucet_manager = address,
            ContractKind::IdentityRegistry => self.identity_registry = address,
        }
    }
}

/// Built-in chain definition (compile-time constant)
struct BuiltinChain {
    id: u64,
    label: &'static str,
    name: &'static str,
    rpc_url: &'static str,
    explorer_url: &'static str,
    usdc: Option<Address>,
    usdt: Option<Address>,
    eurc: Option<Address>,
    /// Wallets rarely know this chain, so it is registered before switching
    preregister: bool,
}

/// Default built-in chains, in display order
const BUILTIN_CHAINS: &[BuiltinChain] = &[
    BuiltinChain {
        id: 8453,
        label: chains::BASE,
        name: "Base",
        rpc_url: "https://mainnet.base.org",
        explorer_url: "https://basescan.org",
        usdc: Some(address!("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913")),
        usdt: Some(address!("0xfde4C96c8593536E31F229EA8f37b2ADa2699bb2")),
        eurc: Some(address!("0x60a3E35Cc302bFA44Cb288Bc5a4F316Fdb1adb42")),
        preregister: false,
    },
    BuiltinChain {
        id: 1,
        label: chains::ETHEREUM,
        name: "Ethereum",
        rpc_url: "https://eth.llamarpc.com",
        explorer_url: "https://etherscan.io",
        usdc: Some(address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48")),
        usdt: Some(address!("0xdAC17F958D2ee523a2206206994597C13D831ec7")),
        eurc: Some(address!("0x1aBaEA1f7C830bD89Acc67eC4af516284b1bC33c")),
        preregister: false,
    },
    BuiltinChain {
        id: 130,
        label: chains::UNICHAIN,
        name: "Unichain",
        rpc_url: "https://mainnet.unichain.org",
        explorer_url: "https://unichain.blockscout.com",
        usdc: Some(address!("0x078D782b760474a361dDA0AF3839290b0EF57AD6")),
        usdt: None,
        eurc: None,
        preregister: true,
    },
    BuiltinChain {
        id: 10,
        label: chains::OPTIMISM,
        name: "Optimism",
        rpc_url: "https://mainnet.optimism.io",
        explorer_url: "https://optimistic.etherscan.io",
        usdc: Some(address!("0x7F5c764cBc14f9669B88837ca1490cCa17c31607")),
        usdt: Some(address!("0x94b008aA00579c1307B0EF2c499aD98a8ce58e58")),
        eurc: None,
        preregister: false,
    },
];

impl BuiltinChain {
    fn descriptor(&self) -> ChainDescriptor {
        let stablecoins = [
            (Stablecoin::Usdc, self.usdc),
            (Stablecoin::Usdt, self.usdt),
            (Stablecoin::Eurc, self.eurc),
        ]
        .into_iter()
        .filter_map(|(coin, addr)| addr.map(|a| (coin, a)))
        .collect();

        ChainDescriptor {
            id: self.id,
            label: self.label.to_string(),
            name: self.name.to_string(),
            explorer_url: self.explorer_url.to_string(),
            rpc_url: self.rpc_url.to_string(),
            contracts: ContractAddresses::default(),
            stablecoins,
            preregister: self.preregister,
        }
    }
}

/// Immutable description of one supported chain.
///
/// # Examples
///
/// ```
/// use ethcali_lib::network::ChainRegistry;
///
/// let registry = ChainRegistry::builtin();
/// let base = registry.descriptor_for(8453);
/// assert_eq!(base.name, "Base");
/// assert_eq!(base.hex_chain_id(), "0x2105");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainDescriptor {
    /// Numeric EVM chain id
    pub id: u64,
    /// Short lowercase label (e.g., "base")
    pub label: String,
    /// Human-readable display name
    pub name: String,
    /// Base URL for the block explorer
    pub explorer_url: String,
    /// RPC endpoint used for reads and advertised when adding the chain to a wallet
    pub rpc_url: String,
    /// Deployed dashboard contracts
    pub contracts: ContractAddresses,
    /// Stablecoin token addresses available on this chain
    pub stablecoins: BTreeMap<Stablecoin, Address>,
    /// Register the chain with the wallet before the first switch attempt
    pub preregister: bool,
}

impl ChainDescriptor {
    pub fn contract(&self, kind: ContractKind) -> Option<Address> {
        self.contracts.get(kind)
    }

    /// Address of a contract that the caller cannot proceed without
    pub fn require_contract(&self, kind: ContractKind) -> Result<Address> {
        self.contract(kind)
            .ok_or_else(|| EthcaliError::missing_contract(kind, &self.label))
    }

    pub fn stablecoin(&self, coin: Stablecoin) -> Option<Address> {
        self.stablecoins.get(&coin).copied()
    }

    pub fn require_stablecoin(&self, coin: Stablecoin) -> Result<Address> {
        self.stablecoin(coin).ok_or_else(|| EthcaliError::MissingToken {
            token: coin.symbol().to_string(),
            chain: self.label.clone(),
        })
    }

    /// Chain id as the `0x`-prefixed hex quantity wallets expect
    pub fn hex_chain_id(&self) -> String {
        format!("{:#x}", self.id)
    }

    /// Get the explorer URL for a transaction hash
    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), tx_hash)
    }

    /// Get the explorer URL for an address
    pub fn address_url(&self, address: &str) -> String {
        format!(
            "{}/address/{}",
            self.explorer_url.trim_end_matches('/'),
            address
        )
    }

    /// Parameters for a `wallet_addEthereumChain` request (EIP-3085)
    pub fn add_chain_params(&self) -> Value {
        let mut params = json!({
            "chainId": self.hex_chain_id(),
            "chainName": self.name,
            "nativeCurrency": {
                "name": currencies::ETH.symbol,
                "symbol": currencies::ETH.symbol,
                "decimals": currencies::ETH.decimals,
            },
            "rpcUrls": [self.rpc_url],
        });
        if !self.explorer_url.is_empty() {
            params["blockExplorerUrls"] = json!([self.explorer_url]);
        }
        params
    }
}

/// Registry of supported chains.
///
/// Constructed once from built-in defaults and configuration, then shared
/// read-only. Holds at most one descriptor per chain id.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: Vec<ChainDescriptor>,
    default_index: usize,
}

impl ChainRegistry {
    /// Build a registry from explicit descriptors.
    ///
    /// Fails on duplicate chain ids or when `default_chain_id` is not among them.
    pub fn new(chains: Vec<ChainDescriptor>, default_chain_id: u64) -> Result<Self> {
        for (i, chain) in chains.iter().enumerate() {
            if chains[..i].iter().any(|c| c.id == chain.id) {
                return Err(EthcaliError::InvalidConfig(format!(
                    "Chain id {} is defined more than once",
                    chain.id
                )));
            }
        }

        let default_index = chains
            .iter()
            .position(|c| c.id == default_chain_id)
            .ok_or_else(|| {
                EthcaliError::InvalidConfig(format!(
                    "Default chain {default_chain_id} is not a supported chain"
                ))
            })?;

        Ok(Self {
            chains,
            default_index,
        })
    }

    /// Registry with the built-in chains, no deployments, and Base as default
    pub fn builtin() -> Self {
        let chains: Vec<ChainDescriptor> = BUILTIN_CHAINS.iter().map(|c| c.descriptor()).collect();
        let default_index = chains
            .iter()
            .position(|c| c.id == crate::constants::DEFAULT_CHAIN_ID)
            .unwrap_or(0);
        Self {
            chains,
            default_index,
        }
    }

    /// Load the registry from built-in defaults and config overrides.
    ///
    /// The loading order is:
    /// 1. Start with built-in chain definitions (defined in code)
    /// 2. Merge custom chains from `[[chains]]` (same id replaces)
    /// 3. Apply RPC URL overrides from `[rpc]`, keyed by label or chain id
    /// 4. Apply contract addresses from `[[deployments]]`
    /// 5. Apply stablecoin overrides from `[[tokens]]`
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut chains: Vec<ChainDescriptor> =
            BUILTIN_CHAINS.iter().map(|c| c.descriptor()).collect();

        for custom in &config.chains {
            let descriptor = ChainDescriptor {
                id: custom.id,
                label: custom.label.to_lowercase(),
                name: custom.name.clone(),
                explorer_url: custom.explorer_url.clone(),
                rpc_url: custom.rpc_url.clone(),
                contracts: ContractAddresses::default(),
                stablecoins: BTreeMap::new(),
                preregister: custom.preregister,
            };
            match chains.iter_mut().find(|c| c.id == custom.id) {
                Some(existing) => *existing = descriptor,
                None => chains.push(descriptor),
            }
        }

        for (key, rpc_url) in &config.rpc {
            let chain = chains
                .iter_mut()
                .find(|c| c.label == key.to_lowercase() || c.id.to_string() == *key)
                .ok_or_else(|| {
                    EthcaliError::InvalidConfig(format!(
                        "RPC override for unknown chain '{key}'"
                    ))
                })?;
            chain.rpc_url = rpc_url.clone();
        }

        for deployment in &config.deployments {
            let chain = chains
                .iter_mut()
                .find(|c| c.id == deployment.chain_id)
                .ok_or(EthcaliError::UnsupportedChain(deployment.chain_id))?;
            for kind in ContractKind::all() {
                if let Some(addr) = deployment.get(kind) {
                    chain.contracts.set(kind, Some(addr));
                }
            }
        }

        for token in &config.tokens {
            let chain = chains
                .iter_mut()
                .find(|c| c.id == token.chain_id)
                .ok_or(EthcaliError::UnsupportedChain(token.chain_id))?;
            chain.stablecoins.insert(token.symbol, token.address);
        }

        Self::new(chains, config.effective_default_chain_id())
    }

    /// Descriptor for `chain_id`, or the default descriptor when unsupported.
    ///
    /// Callers that need a specific contract must still check that its
    /// address is present on the returned chain.
    pub fn descriptor_for(&self, chain_id: u64) -> &ChainDescriptor {
        self.get(chain_id).unwrap_or_else(|| self.default_descriptor())
    }

    /// Strict lookup by chain id
    pub fn get(&self, chain_id: u64) -> Option<&ChainDescriptor> {
        self.chains.iter().find(|c| c.id == chain_id)
    }

    /// Look up a chain by label, decimal id, or CAIP-2 id (`eip155:8453`)
    pub fn lookup(&self, name: &str) -> Option<&ChainDescriptor> {
        let name = name.trim();
        if let Some(chain) = self
            .chains
            .iter()
            .find(|c| c.label.eq_ignore_ascii_case(name))
        {
            return Some(chain);
        }
        let id = name.rsplit(':').next()?.parse::<u64>().ok()?;
        self.get(id)
    }

    pub fn default_descriptor(&self) -> &ChainDescriptor {
        &self.chains[self.default_index]
    }

    pub fn default_chain_id(&self) -> u64 {
        self.default_descriptor().id
    }

    /// All descriptors in display order
    pub fn all_descriptors(&self) -> &[ChainDescriptor] {
        &self.chains
    }

    pub fn is_supported(&self, chain_id: u64) -> bool {
        self.get(chain_id).is_some()
    }

    /// Stablecoin addresses for a chain, falling back to the default chain
    pub fn token_addresses(&self, chain_id: u64) -> &BTreeMap<Stablecoin, Address> {
        &self.descriptor_for(chain_id).stablecoins
    }

    /// Explorer base URL for a chain, falling back to the default chain
    pub fn explorer_url(&self, chain_id: u64) -> &str {
        &self.descriptor_for(chain_id).explorer_url
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CustomChain, Deployment};
    use serial_test::serial;

    #[test]
    fn test_builtin_lookup() {
        let registry = ChainRegistry::builtin();
        let base = registry.get(8453).expect("base should exist");
        assert_eq!(base.label, "base");
        assert_eq!(base.name, "Base");
        assert_eq!(
            base.stablecoin(Stablecoin::Usdc),
            Some(address!("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"))
        );

        let unichain = registry.get(130).expect("unichain should exist");
        assert!(unichain.preregister);
        assert_eq!(unichain.stablecoin(Stablecoin::Usdt), None);
    }

    #[test]
    fn test_descriptor_for_supported_chains() {
        let registry = ChainRegistry::builtin();
        for descriptor in registry.all_descriptors() {
            assert_eq!(registry.descriptor_for(descriptor.id).id, descriptor.id);
        }
    }

    #[test]
    fn test_descriptor_for_unsupported_falls_back() {
        let registry = ChainRegistry::builtin();
        for id in [0, 5, 137, 42161, 999_999] {
            assert_eq!(registry.descriptor_for(id), registry.default_descriptor());
        }
        assert_eq!(registry.default_chain_id(), 8453);
    }

    #[test]
    fn test_all_descriptors_order() {
        let registry = ChainRegistry::builtin();
        let ids: Vec<u64> = registry.all_descriptors().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![8453, 1, 130, 10]);
    }

    #[test]
    fn test_new_rejects_duplicates() {
        let base = ChainRegistry::builtin().get(8453).cloned().unwrap();
        let result = ChainRegistry::new(vec![base.clone(), base], 8453);
        assert!(matches!(result, Err(EthcaliError::InvalidConfig(_))));
    }

    #[test]
    fn test_new_rejects_missing_default() {
        let base = ChainRegistry::builtin().get(8453).cloned().unwrap();
        let result = ChainRegistry::new(vec![base], 1);
        assert!(matches!(result, Err(EthcaliError::InvalidConfig(_))));
    }

    #[test]
    fn test_lookup_forms() {
        let registry = ChainRegistry::builtin();
        assert_eq!(registry.lookup("base").map(|c| c.id), Some(8453));
        assert_eq!(registry.lookup("Ethereum").map(|c| c.id), Some(1));
        assert_eq!(registry.lookup("130").map(|c| c.id), Some(130));
        assert_eq!(registry.lookup("eip155:10").map(|c| c.id), Some(10));
        assert!(registry.lookup("polygon").is_none());
        assert!(registry.lookup("eip155:137").is_none());
    }

    #[test]
    fn test_add_chain_params() {
        let registry = ChainRegistry::builtin();
        let params = registry.descriptor_for(130).add_chain_params();
        assert_eq!(params["chainId"], "0x82");
        assert_eq!(params["chainName"], "Unichain");
        assert_eq!(params["nativeCurrency"]["decimals"], 18);
        assert_eq!(params["rpcUrls"][0], "https://mainnet.unichain.org");
        assert_eq!(params["blockExplorerUrls"][0], "https://unichain.blockscout.com");
    }

    #[test]
    fn test_explorer_urls() {
        let registry = ChainRegistry::builtin();
        let base = registry.descriptor_for(8453);
        assert_eq!(base.tx_url("0xabc"), "https://basescan.org/tx/0xabc");
        assert_eq!(
            base.address_url("0xdef"),
            "https://basescan.org/address/0xdef"
        );
        assert_eq!(registry.explorer_url(424242), "https://basescan.org");
    }

    #[test]
    #[serial]
    fn test_from_config_applies_overrides() {
        let store = address!("0x1111111111111111111111111111111111111111");
        let faucet = address!("0x2222222222222222222222222222222222222222");
        let config = Config::builder()
            .with_default_chain_id(1)
            .with_rpc_override("base", "http://localhost:8545")
            .with_deployment(Deployment {
                chain_id: 8453,
                store: Some(store),
                faucet_manager: Some(faucet),
                identity_registry: None,
            })
            .build_unchecked();

        let registry = ChainRegistry::from_config(&config).expect("valid config");
        assert_eq!(registry.default_chain_id(), 1);

        let base = registry.descriptor_for(8453);
        assert_eq!(base.rpc_url, "http://localhost:8545");
        assert_eq!(base.contract(ContractKind::Store), Some(store));
        assert_eq!(base.contract(ContractKind::FaucetManager), Some(faucet));
        assert_eq!(base.contract(ContractKind::IdentityRegistry), None);
        assert!(matches!(
            base.require_contract(ContractKind::IdentityRegistry),
            Err(EthcaliError::MissingContract { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_from_config_custom_chain() {
        let config = Config::builder()
            .with_chain(CustomChain {
                id: 31337,
                label: "Local".to_string(),
                name: "Local Dev".to_string(),
                rpc_url: "http://127.0.0.1:8545".to_string(),
                explorer_url: String::new(),
                preregister: true,
            })
            .build_unchecked();

        let registry = ChainRegistry::from_config(&config).expect("valid config");
        assert_eq!(registry.len(), 5);
        let local = registry.lookup("local").expect("custom chain registered");
        assert_eq!(local.id, 31337);
        assert!(local.add_chain_params().get("blockExplorerUrls").is_none());
    }

    #[test]
    #[serial]
    fn test_from_config_rejects_unknown_rpc_key() {
        let config = Config::builder()
            .with_rpc_override("polygon", "https://polygon-rpc.com")
            .build_unchecked();
        assert!(ChainRegistry::from_config(&config).is_err());
    }
}
