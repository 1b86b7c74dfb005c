//! A small simulated chain and wallet for orchestration tests.
//!
//! The wallet applies `approve` and `buy` transactions to a shared ledger and
//! the reader answers `eth_call`s from the same ledger, so an approval made
//! through the wallet is visible to the next allowance read.

#![allow(dead_code)]

use alloy::primitives::{address, Address, Bytes, B256, U256};
use alloy::sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use ethcali_lib::contracts::{IFaucetManager, ISwag1155, IERC20};
use ethcali_lib::wallet::UNRECOGNIZED_CHAIN;
use ethcali_lib::{
    ChainDescriptor, ChainRegistry, ContractAddresses, ContractReader, ProviderError, ReadError,
    Stablecoin, WalletProvider,
};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub const BUYER: Address = address!("0x00000000000000000000000000000000000000b0");
pub const BASE_STORE: Address = address!("0x1111111111111111111111111111111111111111");
pub const BASE_FAUCET: Address = address!("0x2222222222222222222222222222222222222222");
pub const OP_STORE: Address = address!("0x3333333333333333333333333333333333333333");

/// Base and Optimism with stores deployed, Unichain without, Base as default
pub fn registry() -> Arc<ChainRegistry> {
    let builtin = ChainRegistry::builtin();
    let with_contracts = |id: u64, contracts: ContractAddresses| ChainDescriptor {
        contracts,
        ..builtin.descriptor_for(id).clone()
    };
    let chains = vec![
        with_contracts(
            8453,
            ContractAddresses {
                store: Some(BASE_STORE),
                faucet_manager: Some(BASE_FAUCET),
                identity_registry: None,
            },
        ),
        with_contracts(
            10,
            ContractAddresses {
                store: Some(OP_STORE),
                ..Default::default()
            },
        ),
        builtin.descriptor_for(130).clone(),
    ];
    Arc::new(ChainRegistry::new(chains, 8453).unwrap())
}

pub fn usdc(registry: &ChainRegistry, chain_id: u64) -> Address {
    registry
        .descriptor_for(chain_id)
        .stablecoin(Stablecoin::Usdc)
        .unwrap()
}

/// On-chain state shared by the wallet and the reader
#[derive(Default)]
pub struct Ledger {
    /// (chain, token, owner, spender) -> allowance
    allowances: Mutex<HashMap<(u64, Address, Address, Address), U256>>,
    /// (chain, contract, account) holding an admin role
    admins: Mutex<HashSet<(u64, Address, Address)>>,
    /// (chain, store, token id, quantity)
    purchases: Mutex<Vec<(u64, Address, U256, U256)>>,
}

impl Ledger {
    pub fn grant_admin(&self, chain_id: u64, contract: Address, account: Address) {
        self.admins.lock().unwrap().insert((chain_id, contract, account));
    }

    pub fn allowance(&self, chain_id: u64, token: Address, owner: Address, spender: Address) -> U256 {
        self.allowances
            .lock()
            .unwrap()
            .get(&(chain_id, token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn purchases(&self) -> Vec<(u64, Address, U256, U256)> {
        self.purchases.lock().unwrap().clone()
    }
}

fn selector(data: &[u8]) -> [u8; 4] {
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&data[..4]);
    selector
}

fn parse_hex_u64(value: &Value) -> u64 {
    let hex = value.as_str().unwrap().trim_start_matches("0x");
    u64::from_str_radix(hex, 16).unwrap()
}

/// EIP-1193 wallet that only knows the chains it has been told about
pub struct SimWallet {
    ledger: Arc<Ledger>,
    chain_id: Mutex<u64>,
    known_chains: Mutex<HashSet<u64>>,
    requests: Mutex<Vec<String>>,
    reject_switches: Mutex<bool>,
}

impl SimWallet {
    pub fn new(ledger: Arc<Ledger>, chain_id: u64, known: &[u64]) -> Self {
        Self {
            ledger,
            chain_id: Mutex::new(chain_id),
            known_chains: Mutex::new(known.iter().copied().collect()),
            requests: Mutex::new(Vec::new()),
            reject_switches: Mutex::new(false),
        }
    }

    pub fn reject_switches(&self, reject: bool) {
        *self.reject_switches.lock().unwrap() = reject;
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn current_chain(&self) -> u64 {
        *self.chain_id.lock().unwrap()
    }

    fn apply(&self, tx: &Value) -> Result<Value, ProviderError> {
        let chain_id = parse_hex_u64(&tx["chainId"]);
        let to: Address = serde_json::from_value(tx["to"].clone()).unwrap();
        let data: Bytes = serde_json::from_value(tx["data"].clone()).unwrap();

        let selector = selector(&data);
        if selector == IERC20::approveCall::SELECTOR {
            let call = IERC20::approveCall::abi_decode(&data).unwrap();
            self.ledger
                .allowances
                .lock()
                .unwrap()
                .insert((chain_id, to, BUYER, call.spender), call.amount);
        } else if selector == ISwag1155::buyCall::SELECTOR {
            let call = ISwag1155::buyCall::abi_decode(&data).unwrap();
            self.ledger
                .purchases
                .lock()
                .unwrap()
                .push((chain_id, to, call.tokenId, call.quantity));
        }

        let n = self.requests.lock().unwrap().len();
        Ok(json!(B256::with_last_byte(n as u8)))
    }
}

#[async_trait]
impl WalletProvider for SimWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.requests.lock().unwrap().push(method.to_string());

        match method {
            "eth_chainId" => Ok(json!(format!("{:#x}", self.current_chain()))),
            "wallet_switchEthereumChain" => {
                if *self.reject_switches.lock().unwrap() {
                    return Err(ProviderError::user_rejected());
                }
                let target = parse_hex_u64(&params[0]["chainId"]);
                if !self.known_chains.lock().unwrap().contains(&target) {
                    return Err(ProviderError::new(
                        UNRECOGNIZED_CHAIN,
                        format!("Unrecognized chain ID {target:#x}. Try adding the chain first."),
                    ));
                }
                *self.chain_id.lock().unwrap() = target;
                Ok(Value::Null)
            }
            "wallet_addEthereumChain" => {
                let added = parse_hex_u64(&params[0]["chainId"]);
                self.known_chains.lock().unwrap().insert(added);
                Ok(Value::Null)
            }
            "eth_sendTransaction" => self.apply(&params[0]),
            other => Err(ProviderError::new(-32601, format!("Method {other} not supported"))),
        }
    }

    fn address(&self) -> Option<Address> {
        Some(BUYER)
    }
}

/// Reader answering allowance and role queries from the ledger
pub struct SimReader {
    ledger: Arc<Ledger>,
    calls: Mutex<usize>,
}

impl SimReader {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self {
            ledger,
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ContractReader for SimReader {
    async fn call(&self, chain_id: u64, to: Address, input: Bytes) -> Result<Bytes, ReadError> {
        *self.calls.lock().unwrap() += 1;

        let selector = selector(&input);
        let output = if selector == IERC20::allowanceCall::SELECTOR {
            let call = IERC20::allowanceCall::abi_decode(&input).unwrap();
            self.ledger
                .allowance(chain_id, to, call.owner, call.spender)
                .abi_encode()
        } else if selector == IFaucetManager::isAdminCall::SELECTOR {
            // Same selector as the store's isAdmin; roles are keyed by contract
            let call = IFaucetManager::isAdminCall::abi_decode(&input).unwrap();
            self.ledger
                .admins
                .lock()
                .unwrap()
                .contains(&(chain_id, to, call.account))
                .abi_encode()
        } else if selector == IFaucetManager::isSuperAdminCall::SELECTOR {
            false.abi_encode()
        } else {
            return Err(ReadError::ErrorResponse("execution reverted".to_string()));
        };
        Ok(output.into())
    }

    async fn transaction_status(&self, _chain_id: u64, _tx_hash: B256) -> Result<Option<bool>, ReadError> {
        Ok(Some(true))
    }
}
