//! Wallet provider abstraction (EIP-1193) and a JSON-RPC backed implementation.

use crate::error::{EthcaliError, Result};
use crate::http::HttpClient;
use crate::network::{ChainDescriptor, ChainRegistry};
use crate::resolver::{ChainResolver, WalletChainTag};
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// User rejected the request
pub const USER_REJECTED: i64 = 4001;
/// Provider is disconnected from all chains
pub const DISCONNECTED: i64 = 4900;
/// Chain has not been added to the wallet
pub const UNRECOGNIZED_CHAIN: i64 = 4902;
/// JSON-RPC internal error
pub const INTERNAL_ERROR: i64 = -32603;

/// Error returned by a wallet provider request.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message} (code {code})")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn user_rejected() -> Self {
        Self::new(USER_REJECTED, "User rejected the request.")
    }

    /// The provider could not be reached at all
    pub fn disconnected(message: impl Into<String>) -> Self {
        Self::new(DISCONNECTED, message)
    }
}

/// Minimal EIP-1193 surface the orchestrators need.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Forward a JSON-RPC style request to the wallet
    async fn request(&self, method: &str, params: Value) -> std::result::Result<Value, ProviderError>;

    /// Connected account, if any
    fn address(&self) -> Option<Address>;

    /// Chain the wallet currently reports. Queried live on every call.
    async fn chain_tag(&self) -> std::result::Result<Option<WalletChainTag>, ProviderError> {
        let value = self.request("eth_chainId", json!([])).await?;
        Ok(serde_json::from_value(value).ok())
    }
}

/// A transaction to hand to the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionIntent {
    pub to: Address,
    pub data: Bytes,
    pub chain_id: u64,
    pub value: Option<U256>,
    /// Ask the wallet to have gas paid by a sponsor. Wallets without
    /// sponsorship ignore this.
    pub sponsored: bool,
}

impl TransactionIntent {
    /// Intent that calls `call` on `to`
    pub fn call<C: SolCall>(to: Address, chain_id: u64, call: &C) -> Self {
        Self {
            to,
            data: Bytes::from(call.abi_encode()),
            chain_id,
            value: None,
            sponsored: false,
        }
    }

    pub fn sponsored(mut self, sponsored: bool) -> Self {
        self.sponsored = sponsored;
        self
    }
}

/// Result of handing a transaction to the wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubmittedTx {
    pub chain_id: u64,
    /// Absent when the wallet did not return a hash
    pub hash: Option<B256>,
}

/// Shared handle to one connected wallet.
///
/// All requests go through the same provider; the wallet itself serializes them.
#[derive(Clone)]
pub struct WalletHandle {
    provider: Arc<dyn WalletProvider>,
}

impl std::fmt::Debug for WalletHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletHandle")
            .field("address", &self.provider.address())
            .finish()
    }
}

impl WalletHandle {
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        Self { provider }
    }

    pub fn from_provider<P: WalletProvider + 'static>(provider: P) -> Self {
        Self::new(Arc::new(provider))
    }

    pub fn address(&self) -> Option<Address> {
        self.provider.address()
    }

    pub fn require_address(&self) -> Result<Address> {
        self.address().ok_or(EthcaliError::WalletNotConnected)
    }

    pub async fn chain_tag(&self) -> std::result::Result<Option<WalletChainTag>, ProviderError> {
        self.provider.chain_tag().await
    }

    /// Resolve the chain the wallet is on right now, for transactions.
    ///
    /// A missing or unparseable tag falls back to the default chain. A chain id
    /// the wallet does report must be in the registry.
    pub async fn active_descriptor<'r>(
        &self,
        registry: &'r ChainRegistry,
    ) -> Result<&'r ChainDescriptor> {
        let tag = self.chain_tag().await?;
        let chain_id = ChainResolver::new(registry.default_chain_id()).resolve(tag.as_ref());
        registry
            .get(chain_id)
            .ok_or(EthcaliError::UnsupportedChain(chain_id))
    }

    /// `wallet_switchEthereumChain`
    pub async fn switch_chain(
        &self,
        chain: &ChainDescriptor,
    ) -> std::result::Result<(), ProviderError> {
        self.provider
            .request(
                "wallet_switchEthereumChain",
                json!([{ "chainId": chain.hex_chain_id() }]),
            )
            .await
            .map(|_| ())
    }

    /// `wallet_addEthereumChain` with the descriptor's network definition
    pub async fn add_chain(&self, chain: &ChainDescriptor) -> std::result::Result<(), ProviderError> {
        self.provider
            .request("wallet_addEthereumChain", json!([chain.add_chain_params()]))
            .await
            .map(|_| ())
    }

    /// `eth_sendTransaction`
    pub async fn send_transaction(&self, intent: &TransactionIntent) -> Result<SubmittedTx> {
        let from = self.require_address()?;
        let mut tx = json!({
            "from": from,
            "to": intent.to,
            "data": intent.data,
            "chainId": format!("{:#x}", intent.chain_id),
        });
        if let Some(value) = intent.value {
            tx["value"] = json!(format!("{value:#x}"));
        }

        let result = self
            .provider
            .request("eth_sendTransaction", json!([tx]))
            .await?;
        let hash = serde_json::from_value::<B256>(result).ok();

        tracing::info!(
            chain_id = intent.chain_id,
            to = %intent.to,
            sponsored = intent.sponsored,
            hash = ?hash,
            "transaction submitted"
        );
        Ok(SubmittedTx {
            chain_id: intent.chain_id,
            hash,
        })
    }
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ProviderError>,
}

fn parse_rpc_response(body: &[u8]) -> std::result::Result<Value, ProviderError> {
    let response: JsonRpcResponse = serde_json::from_slice(body)
        .map_err(|e| ProviderError::new(INTERNAL_ERROR, format!("Malformed JSON-RPC response: {e}")))?;
    match response.error {
        Some(error) => Err(error),
        None => Ok(response.result.unwrap_or(Value::Null)),
    }
}

/// Wallet that forwards requests to an HTTP JSON-RPC endpoint, such as a
/// local dev node holding unlocked accounts.
pub struct JsonRpcWallet {
    endpoint: String,
    address: Option<Address>,
    timeout: Duration,
    next_id: AtomicU64,
}

impl JsonRpcWallet {
    pub fn new(endpoint: impl Into<String>, address: Option<Address>) -> Self {
        Self {
            endpoint: endpoint.into(),
            address,
            timeout: Duration::from_secs(30),
            next_id: AtomicU64::new(1),
        }
    }

    /// Fill in the account from `eth_accounts` when none was given
    pub async fn connect(mut self) -> Result<Self> {
        if self.address.is_none() {
            let accounts = self.request("eth_accounts", json!([])).await?;
            let accounts: Vec<Address> = serde_json::from_value(accounts)?;
            self.address = accounts.first().copied();
        }
        Ok(self)
    }
}

#[async_trait]
impl WalletProvider for JsonRpcWallet {
    async fn request(&self, method: &str, params: Value) -> std::result::Result<Value, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        tracing::debug!(method, id, endpoint = %self.endpoint, "wallet request");

        let endpoint = self.endpoint.clone();
        let timeout = self.timeout;
        let response = tokio::task::spawn_blocking(move || -> Result<_> {
            let mut client = HttpClient::builder()
                .timeout(timeout)
                .header("Content-Type", "application/json")
                .build()?;
            client.post(&endpoint, Some(&serde_json::to_vec(&body)?))
        })
        .await
        .map_err(|e| ProviderError::disconnected(e.to_string()))?
        .map_err(|e| ProviderError::disconnected(e.to_string()))?;

        parse_rpc_response(&response.body)
    }

    fn address(&self) -> Option<Address> {
        self.address
    }
}
