//! Error types for the ethcali library.

use crate::network::ContractKind;
use crate::reader::ReadError;
use crate::wallet::ProviderError;
use thiserror::Error;

/// Result type alias for ethcali operations.
pub type Result<T> = std::result::Result<T, EthcaliError>;

#[derive(Error, Debug)]
pub enum EthcaliError {
    #[error("No {contract} contract is deployed on {chain}. Run `ethcali chains info {chain}` to see configured addresses.")]
    MissingContract { contract: ContractKind, chain: String },

    #[error("{token} is not available on {chain}.")]
    MissingToken { token: String, chain: String },

    #[error("Chain {0} is not supported. Run `ethcali chains list` to see available chains.")]
    UnsupportedChain(u64),

    #[error("Connect your wallet to continue.")]
    WalletNotConnected,

    #[error("Wallet request failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Failed to switch to {chain}: {message}")]
    ChainSwitch { chain: String, message: String },

    #[error("Token allowance of {allowance} base units does not cover the required {required}. Approve the spend and try again.")]
    InsufficientAllowance { required: u128, allowance: u128 },

    #[error("Approval transaction {0} reverted.")]
    ApprovalReverted(String),

    #[error("Timed out waiting for transaction {0} to be confirmed.")]
    ConfirmationTimeout(String),

    #[error("Contract read failed: {0}")]
    Read(#[from] ReadError),

    #[error("Invalid amount '{0}'. Expected a non-negative, finite value.")]
    InvalidAmount(String),

    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    #[error("Token id {0} is out of range.")]
    InvalidTokenId(String),

    #[error("{0}")]
    RedemptionState(String),

    #[error("Could not load metadata: {0}")]
    Metadata(String),

    #[error("{0}")]
    InvalidAddress(String),

    #[error("{0}")]
    ConfigMissing(String),

    #[error("{0}")]
    InvalidConfig(String),

    #[error("Could not find config directory. Set the ETHCALI_CONFIG environment variable or ensure your home directory is accessible.")]
    NoConfigDir,

    #[error("{0}")]
    Http(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config file format: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Invalid base64 encoding: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    // ==================== External Library Errors ====================
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network request failed: {0}")]
    Curl(#[from] curl::Error),
}

impl EthcaliError {
    /// Create a missing contract error for the given chain name
    pub fn missing_contract(contract: ContractKind, chain: impl Into<String>) -> Self {
        Self::MissingContract {
            contract,
            chain: chain.into(),
        }
    }

    /// Create an invalid address error
    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::InvalidAddress(msg.into())
    }

    /// Create a config missing error
    pub fn config_missing(msg: impl Into<String>) -> Self {
        Self::ConfigMissing(msg.into())
    }

    /// Create a metadata error
    pub fn metadata(msg: impl Into<String>) -> Self {
        Self::Metadata(msg.into())
    }
}
