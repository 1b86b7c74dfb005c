//! Read-only contract access.
//!
//! [`ContractReader`] is the seam between orchestration logic and the RPC
//! transport. [`RpcReader`] is the alloy-backed implementation; tests swap in
//! recording fakes.

use crate::network::ChainRegistry;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, B256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use alloy::transports::{RpcError, TransportErrorKind};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Failure of a single read-only call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    #[error("RPC request failed: {0}")]
    Transport(String),

    #[error("RPC returned an error: {0}")]
    ErrorResponse(String),

    #[error("could not decode {function} result: {message}")]
    Decode {
        function: &'static str,
        message: String,
    },

    #[error("no RPC endpoint configured for chain {0}")]
    UnknownChain(u64),
}

impl From<RpcError<TransportErrorKind>> for ReadError {
    fn from(err: RpcError<TransportErrorKind>) -> Self {
        match err.as_error_resp() {
            Some(payload) => ReadError::ErrorResponse(payload.message.to_string()),
            None => ReadError::Transport(err.to_string()),
        }
    }
}

/// Read-only view of chain state, safe to call concurrently.
#[async_trait]
pub trait ContractReader: Send + Sync {
    /// `eth_call` against `to` with raw calldata
    async fn call(&self, chain_id: u64, to: Address, input: Bytes) -> Result<Bytes, ReadError>;

    /// Receipt status of a transaction: `None` while pending, `Some(success)` once mined
    async fn transaction_status(&self, chain_id: u64, tx_hash: B256)
        -> Result<Option<bool>, ReadError>;
}

/// Encode `call`, execute it, and decode the typed return value.
pub async fn read<C: SolCall>(
    reader: &dyn ContractReader,
    chain_id: u64,
    to: Address,
    call: &C,
) -> Result<C::Return, ReadError> {
    let output = reader
        .call(chain_id, to, Bytes::from(call.abi_encode()))
        .await?;
    C::abi_decode_returns(&output).map_err(|e| ReadError::Decode {
        function: C::SIGNATURE,
        message: e.to_string(),
    })
}

/// alloy HTTP reader with one provider per chain, created on first use.
pub struct RpcReader {
    registry: Arc<ChainRegistry>,
    providers: Mutex<HashMap<u64, DynProvider>>,
}

impl RpcReader {
    pub fn new(registry: Arc<ChainRegistry>) -> Self {
        Self {
            registry,
            providers: Mutex::new(HashMap::new()),
        }
    }

    fn provider(&self, chain_id: u64) -> Result<DynProvider, ReadError> {
        let mut providers = self.providers.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(provider) = providers.get(&chain_id) {
            return Ok(provider.clone());
        }

        let descriptor = self
            .registry
            .get(chain_id)
            .ok_or(ReadError::UnknownChain(chain_id))?;
        let url = descriptor.rpc_url.parse().map_err(|_| {
            ReadError::Transport(format!(
                "Invalid RPC URL for {}: {}",
                descriptor.label, descriptor.rpc_url
            ))
        })?;

        tracing::debug!(chain_id, rpc_url = %descriptor.rpc_url, "creating RPC provider");
        let provider = ProviderBuilder::new().connect_http(url).erased();
        providers.insert(chain_id, provider.clone());
        Ok(provider)
    }
}

#[async_trait]
impl ContractReader for RpcReader {
    async fn call(&self, chain_id: u64, to: Address, input: Bytes) -> Result<Bytes, ReadError> {
        let provider = self.provider(chain_id)?;
        let tx = TransactionRequest::default().with_to(to).with_input(input);
        Ok(provider.call(tx).await?)
    }

    async fn transaction_status(
        &self,
        chain_id: u64,
        tx_hash: B256,
    ) -> Result<Option<bool>, ReadError> {
        let provider = self.provider(chain_id)?;
        let receipt = provider.get_transaction_receipt(tx_hash).await?;
        Ok(receipt.map(|r| r.status()))
    }
}
