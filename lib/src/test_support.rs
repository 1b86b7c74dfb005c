//! Recording fakes shared by unit tests.

use crate::metadata::MetadataPinner;
use crate::error::Result;
use crate::product::ProductMetadata;
use crate::reader::{ContractReader, ReadError};
use crate::wallet::{ProviderError, WalletProvider};
use alloy::primitives::{address, Address, Bytes, B256};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

pub const ACCOUNT: Address = address!("0x00000000000000000000000000000000000000aa");

type ReadKey = (Address, [u8; 4]);

/// Contract reader answering from a table keyed by (contract, selector).
///
/// Each key holds a queue; the last entry repeats once the queue drains.
/// Unknown keys fail with a transport error.
#[derive(Default)]
pub struct FakeReader {
    responses: Mutex<HashMap<ReadKey, VecDeque<std::result::Result<Bytes, ReadError>>>>,
    receipts: Mutex<HashMap<B256, VecDeque<Option<bool>>>>,
    calls: Mutex<Vec<(u64, Address, Bytes)>>,
    delay: Option<Duration>,
}

impl FakeReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn respond(&self, to: Address, selector: [u8; 4], response: std::result::Result<Bytes, ReadError>) {
        self.responses
            .lock()
            .unwrap()
            .entry((to, selector))
            .or_default()
            .push_back(response);
    }

    pub fn receipt(&self, hash: B256, status: Option<bool>) {
        self.receipts
            .lock()
            .unwrap()
            .entry(hash)
            .or_default()
            .push_back(status);
    }

    pub fn calls(&self) -> Vec<(u64, Address, Bytes)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, to: Address, selector: [u8; 4]) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, addr, input)| *addr == to && input.starts_with(&selector))
            .count()
    }

    fn next<K: std::hash::Hash + Eq, V: Clone>(
        table: &Mutex<HashMap<K, VecDeque<V>>>,
        key: &K,
    ) -> Option<V> {
        let mut table = table.lock().unwrap();
        let queue = table.get_mut(key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl ContractReader for FakeReader {
    async fn call(&self, chain_id: u64, to: Address, input: Bytes) -> std::result::Result<Bytes, ReadError> {
        self.calls.lock().unwrap().push((chain_id, to, input.clone()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&input[..4]);
        Self::next(&self.responses, &(to, selector))
            .unwrap_or_else(|| Err(ReadError::Transport(format!("no response for {to}"))))
    }

    async fn transaction_status(
        &self,
        _chain_id: u64,
        tx_hash: B256,
    ) -> std::result::Result<Option<bool>, ReadError> {
        Ok(Self::next(&self.receipts, &tx_hash).unwrap_or(Some(true)))
    }
}

/// Wallet that records every request and answers from scripted queues.
///
/// `eth_chainId` reports the configured chain, `eth_sendTransaction` returns a
/// fresh hash unless scripted otherwise, and everything else succeeds with
/// `null` unless a response is queued for the method.
pub struct FakeWallet {
    chain_id: Mutex<u64>,
    address: Option<Address>,
    scripted: Mutex<HashMap<String, VecDeque<std::result::Result<Value, ProviderError>>>>,
    stalled: Mutex<Vec<String>>,
    log: Mutex<Vec<(String, Value)>>,
}

impl FakeWallet {
    pub fn on_chain(chain_id: u64) -> Self {
        Self {
            chain_id: Mutex::new(chain_id),
            address: Some(ACCOUNT),
            scripted: Mutex::new(HashMap::new()),
            stalled: Mutex::new(Vec::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn disconnected() -> Self {
        Self {
            address: None,
            ..Self::on_chain(8453)
        }
    }

    /// Queue a one-shot response for `method`
    pub fn script(&self, method: &str, response: std::result::Result<Value, ProviderError>) {
        self.scripted
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(response);
    }

    /// Never answer the next request for `method`
    pub fn stall(&self, method: &str) {
        self.stalled.lock().unwrap().push(method.to_string());
    }

    pub fn set_chain(&self, chain_id: u64) {
        *self.chain_id.lock().unwrap() = chain_id;
    }

    /// Methods in the order they were requested
    pub fn methods(&self) -> Vec<String> {
        self.log.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
    }

    pub fn sent_transactions(&self) -> Vec<Value> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == "eth_sendTransaction")
            .map(|(_, params)| params[0].clone())
            .collect()
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    async fn request(&self, method: &str, params: Value) -> std::result::Result<Value, ProviderError> {
        let count = {
            let mut log = self.log.lock().unwrap();
            log.push((method.to_string(), params));
            log.len()
        };

        let stall = {
            let mut stalled = self.stalled.lock().unwrap();
            match stalled.iter().position(|m| m == method) {
                Some(i) => {
                    stalled.remove(i);
                    true
                }
                None => false,
            }
        };
        if stall {
            return std::future::pending().await;
        }

        let scripted = self
            .scripted
            .lock()
            .unwrap()
            .get_mut(method)
            .and_then(VecDeque::pop_front);
        if let Some(response) = scripted {
            return response;
        }

        match method {
            "eth_chainId" => Ok(json!(format!("{:#x}", *self.chain_id.lock().unwrap()))),
            "eth_sendTransaction" => Ok(json!(B256::with_last_byte(count as u8))),
            _ => Ok(Value::Null),
        }
    }

    fn address(&self) -> Option<Address> {
        self.address
    }
}

/// Pinner that hands out sequential `ipfs://` URIs and keeps what it pinned
#[derive(Default)]
pub struct FakePinner {
    pinned: Mutex<Vec<ProductMetadata>>,
}

impl FakePinner {
    pub fn pinned(&self) -> Vec<ProductMetadata> {
        self.pinned.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataPinner for FakePinner {
    async fn pin(&self, metadata: &ProductMetadata) -> Result<String> {
        let mut pinned = self.pinned.lock().unwrap();
        pinned.push(metadata.clone());
        Ok(format!("ipfs://QmFake{}", pinned.len()))
    }
}
