//! ethcali-lib - Chain resolution and wallet-action orchestration for the
//! ETH Cali wallet dashboard
//!
//! This library resolves the wallet's active chain against a registry of
//! supported chains, aggregates admin roles across the deployed contracts,
//! drives chain switching, and sequences the approve-then-buy purchase flow.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod admin;
pub mod config;
pub mod constants;
pub mod contracts;
pub mod currency;
pub mod error;
pub mod http;
pub mod metadata;
pub mod network;
pub mod product;
pub mod purchase;
pub mod reader;
pub mod resolver;
pub mod store;
pub mod switch;
pub mod utils;
pub mod wallet;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use error::{EthcaliError, Result};

pub use admin::{AdminStatus, AdminStatusAggregator};
pub use config::{
    AdminCacheConfig, ConfigBuilder, CustomChain, CustomToken, Deployment, MetadataConfig,
    PurchaseConfig,
};
pub use currency::{currencies, Currency};
pub use http::{HttpClient, HttpClientBuilder, HttpResponse};
pub use metadata::{IpfsMetadataClient, MetadataPinner, MetadataStore};
pub use network::{chains, ChainDescriptor, ChainRegistry, ContractAddresses, ContractKind, Stablecoin};
pub use product::{ProductDraft, ProductMetadata, SizeOption};
pub use purchase::{PurchaseOptions, PurchaseOrchestrator, PurchaseReceipt};
pub use reader::{ContractReader, ReadError, RpcReader};
pub use resolver::{ChainResolver, WalletChainTag};
pub use store::{StoreAdmin, StoreReader};
pub use switch::{ChainSwitchOrchestrator, SwitchOutcome, SwitchState};
pub use wallet::{JsonRpcWallet, ProviderError, SubmittedTx, TransactionIntent, WalletHandle, WalletProvider};
