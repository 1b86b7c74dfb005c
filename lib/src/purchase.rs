//! Store purchases: allowance check, approval, confirmation, then `buy`.

use crate::config::PurchaseConfig;
use crate::contracts::{ISwag1155, IERC20};
use crate::currency::total_base_units;
use crate::error::{EthcaliError, Result};
use crate::network::{ChainRegistry, ContractKind, Stablecoin};
use crate::reader::{read, ContractReader};
use crate::wallet::{SubmittedTx, TransactionIntent, WalletHandle};
use alloy::primitives::{Address, B256, U256};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// State of one purchase while it is being orchestrated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingPurchase {
    pub token_id: U256,
    pub quantity: u64,
    /// Unit price in display units
    pub unit_price: f64,
    /// `round(unit_price * quantity * 10^6)` in stablecoin base units
    pub required: u128,
}

impl PendingPurchase {
    pub fn new(token_id: U256, quantity: u64, unit_price: f64) -> Result<Self> {
        if quantity == 0 {
            return Err(EthcaliError::InvalidAmount(
                "quantity must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            token_id,
            quantity,
            unit_price,
            required: total_base_units(unit_price, quantity)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseOptions {
    pub allowance_recheck_delay: Duration,
    pub confirmation_poll_interval: Duration,
    pub confirmation_timeout: Duration,
    /// Request gas sponsorship for the approval and purchase
    pub sponsored: bool,
}

impl Default for PurchaseOptions {
    fn default() -> Self {
        Self::from(&PurchaseConfig::default())
    }
}

impl From<&PurchaseConfig> for PurchaseOptions {
    fn from(config: &PurchaseConfig) -> Self {
        Self {
            allowance_recheck_delay: config.allowance_recheck_delay(),
            confirmation_poll_interval: config.confirmation_poll_interval(),
            confirmation_timeout: config.confirmation_timeout(),
            sponsored: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseReceipt {
    pub chain_id: u64,
    pub purchase: PendingPurchase,
    /// Allowance before any approval
    pub allowance: u128,
    /// Present when an approval had to be submitted
    pub approval: Option<SubmittedTx>,
    pub buy: SubmittedTx,
}

pub struct PurchaseOrchestrator {
    wallet: WalletHandle,
    registry: Arc<ChainRegistry>,
    reader: Arc<dyn ContractReader>,
    options: PurchaseOptions,
}

impl PurchaseOrchestrator {
    pub fn new(
        wallet: WalletHandle,
        registry: Arc<ChainRegistry>,
        reader: Arc<dyn ContractReader>,
    ) -> Self {
        Self {
            wallet,
            registry,
            reader,
            options: PurchaseOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PurchaseOptions) -> Self {
        self.options = options;
        self
    }

    /// Buy `quantity` of `token_id` at `unit_price`.
    ///
    /// The chain is read from the wallet at call time. The purchase is only
    /// submitted once the allowance covers the full spend.
    pub async fn purchase(
        &self,
        token_id: U256,
        quantity: u64,
        unit_price: f64,
    ) -> Result<PurchaseReceipt> {
        let buyer = self.wallet.require_address()?;
        let chain = self.wallet.active_descriptor(&self.registry).await?;
        let store = chain.require_contract(ContractKind::Store)?;
        let token = chain.require_stablecoin(Stablecoin::Usdc)?;
        let pending = PendingPurchase::new(token_id, quantity, unit_price)?;

        tracing::debug!(
            chain_id = chain.id,
            %token_id,
            quantity,
            required = pending.required,
            "starting purchase"
        );

        let allowance = self.allowance(chain.id, token, buyer, store).await?;
        let approval = if allowance < pending.required {
            Some(
                self.approve(chain.id, token, store, pending.required, buyer)
                    .await?,
            )
        } else {
            None
        };

        let buy = TransactionIntent::call(
            store,
            chain.id,
            &ISwag1155::buyCall {
                tokenId: token_id,
                quantity: U256::from(quantity),
            },
        )
        .sponsored(self.options.sponsored);
        let buy = self.wallet.send_transaction(&buy).await?;

        Ok(PurchaseReceipt {
            chain_id: chain.id,
            purchase: pending,
            allowance,
            approval,
            buy,
        })
    }

    async fn allowance(
        &self,
        chain_id: u64,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<u128> {
        let allowance = read(
            self.reader.as_ref(),
            chain_id,
            token,
            &IERC20::allowanceCall { owner, spender },
        )
        .await?;
        // Anything past u128 covers every spend we can compute
        Ok(u128::try_from(allowance).unwrap_or(u128::MAX))
    }

    /// Approve exactly `required` and wait until the allowance is usable
    async fn approve(
        &self,
        chain_id: u64,
        token: Address,
        store: Address,
        required: u128,
        buyer: Address,
    ) -> Result<SubmittedTx> {
        let intent = TransactionIntent::call(
            token,
            chain_id,
            &IERC20::approveCall {
                spender: store,
                amount: U256::from(required),
            },
        )
        .sponsored(self.options.sponsored);
        let submitted = self.wallet.send_transaction(&intent).await?;

        match submitted.hash {
            Some(hash) => self.wait_for_confirmation(chain_id, hash).await?,
            None => {
                tracing::debug!(
                    delay = ?self.options.allowance_recheck_delay,
                    "approval returned no hash, re-reading allowance after delay"
                );
                tokio::time::sleep(self.options.allowance_recheck_delay).await;
                let allowance = self.allowance(chain_id, token, buyer, store).await?;
                if allowance < required {
                    return Err(EthcaliError::InsufficientAllowance {
                        required,
                        allowance,
                    });
                }
            }
        }
        Ok(submitted)
    }

    /// Poll for a receipt until the transaction is mined (one confirmation)
    async fn wait_for_confirmation(&self, chain_id: u64, hash: B256) -> Result<()> {
        let deadline = Instant::now() + self.options.confirmation_timeout;
        loop {
            match self.reader.transaction_status(chain_id, hash).await? {
                Some(true) => return Ok(()),
                Some(false) => return Err(EthcaliError::ApprovalReverted(hash.to_string())),
                None if Instant::now() >= deadline => {
                    return Err(EthcaliError::ConfirmationTimeout(hash.to_string()))
                }
                None => tokio::time::sleep(self.options.confirmation_poll_interval).await,
            }
        }
    }
}
