//! Merch store reads and admin writes.

use crate::contracts::ISwag1155;
use crate::currency::{base_units_to_price, price_to_base_units};
use crate::error::{EthcaliError, Result};
use crate::metadata::{MetadataPinner, MetadataStore};
use crate::network::{ChainDescriptor, ChainRegistry, ContractKind};
use crate::product::{generate_metadata, generate_token_id, supply_per_size, ProductDraft, ProductMetadata};
use crate::reader::{read, ContractReader};
use crate::wallet::{SubmittedTx, TransactionIntent, WalletHandle};
use alloy::primitives::{Address, U256};
use futures::future::join_all;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// On-chain state of one variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VariantState {
    pub token_id: U256,
    /// Price in stablecoin base units
    pub price: U256,
    pub max_supply: U256,
    pub minted: U256,
    pub active: bool,
}

impl VariantState {
    pub fn available(&self) -> U256 {
        self.max_supply.saturating_sub(self.minted)
    }

    pub fn is_sold_out(&self) -> bool {
        self.available().is_zero()
    }

    /// Price in display units
    pub fn display_price(&self) -> f64 {
        base_units_to_price(u128::try_from(self.price).unwrap_or(u128::MAX))
    }
}

/// Variant with its URI and metadata, when they could be loaded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantListing {
    pub state: VariantState,
    pub uri: Option<String>,
    pub metadata: Option<ProductMetadata>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreSettings {
    pub payment_token: Address,
    pub treasury: Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedemptionStatus {
    NotRedeemed,
    PendingFulfillment,
    Fulfilled,
}

impl RedemptionStatus {
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(RedemptionStatus::NotRedeemed),
            1 => Ok(RedemptionStatus::PendingFulfillment),
            2 => Ok(RedemptionStatus::Fulfilled),
            other => Err(EthcaliError::RedemptionState(format!(
                "Unknown redemption status {other}"
            ))),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            RedemptionStatus::NotRedeemed => "not yet redeemed",
            RedemptionStatus::PendingFulfillment => "pending fulfillment",
            RedemptionStatus::Fulfilled => "already fulfilled",
        }
    }
}

impl fmt::Display for RedemptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RedemptionStatus::NotRedeemed => "NotRedeemed",
            RedemptionStatus::PendingFulfillment => "PendingFulfillment",
            RedemptionStatus::Fulfilled => "Fulfilled",
        };
        write!(f, "{s}")
    }
}

/// Read-only store queries for an explicit chain
pub struct StoreReader {
    registry: Arc<ChainRegistry>,
    reader: Arc<dyn ContractReader>,
    metadata: Option<Arc<dyn MetadataStore>>,
}

impl StoreReader {
    pub fn new(registry: Arc<ChainRegistry>, reader: Arc<dyn ContractReader>) -> Self {
        Self {
            registry,
            reader,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Arc<dyn MetadataStore>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    fn store(&self, chain_id: u64) -> Result<(&ChainDescriptor, Address)> {
        let chain = self.registry.descriptor_for(chain_id);
        Ok((chain, chain.require_contract(ContractKind::Store)?))
    }

    pub async fn token_ids(&self, chain_id: u64) -> Result<Vec<U256>> {
        let (chain, store) = self.store(chain_id)?;
        Ok(read(self.reader.as_ref(), chain.id, store, &ISwag1155::listTokenIdsCall {}).await?)
    }

    pub async fn variant(&self, chain_id: u64, token_id: U256) -> Result<VariantState> {
        let (chain, store) = self.store(chain_id)?;
        let variant = read(
            self.reader.as_ref(),
            chain.id,
            store,
            &ISwag1155::getVariantCall { tokenId: token_id },
        )
        .await?;
        Ok(VariantState {
            token_id,
            price: variant.price,
            max_supply: variant.maxSupply,
            minted: variant.minted,
            active: variant.active,
        })
    }

    pub async fn variant_uri(&self, chain_id: u64, token_id: U256) -> Result<String> {
        let (chain, store) = self.store(chain_id)?;
        Ok(read(
            self.reader.as_ref(),
            chain.id,
            store,
            &ISwag1155::uriCall { tokenId: token_id },
        )
        .await?)
    }

    /// Variant state plus URI and metadata. URI and metadata failures leave
    /// those fields empty instead of failing the listing.
    pub async fn listing(&self, chain_id: u64, token_id: U256) -> Result<VariantListing> {
        let state = self.variant(chain_id, token_id).await?;
        let uri = match self.variant_uri(chain_id, token_id).await {
            Ok(uri) if !uri.is_empty() => Some(uri),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(%token_id, error = %e, "could not read variant uri");
                None
            }
        };

        let metadata = match (&self.metadata, &uri) {
            (Some(store), Some(uri)) => match store.fetch(uri).await {
                Ok(metadata) => Some(metadata),
                Err(e) => {
                    tracing::warn!(%token_id, %uri, error = %e, "could not load variant metadata");
                    None
                }
            },
            _ => None,
        };

        Ok(VariantListing {
            state,
            uri,
            metadata,
        })
    }

    /// Every listed variant, loaded concurrently
    pub async fn all_variants(&self, chain_id: u64) -> Result<Vec<VariantListing>> {
        let ids = self.token_ids(chain_id).await?;
        join_all(ids.into_iter().map(|id| self.listing(chain_id, id)))
            .await
            .into_iter()
            .collect()
    }

    pub async fn settings(&self, chain_id: u64) -> Result<StoreSettings> {
        let (chain, store) = self.store(chain_id)?;
        let reader = self.reader.as_ref();
        let (usdc_call, treasury_call) = (ISwag1155::usdcCall {}, ISwag1155::treasuryCall {});
        let (payment_token, treasury) = tokio::join!(
            read(reader, chain.id, store, &usdc_call),
            read(reader, chain.id, store, &treasury_call),
        );
        Ok(StoreSettings {
            payment_token: payment_token?,
            treasury: treasury?,
        })
    }

    pub async fn redemption_status(
        &self,
        chain_id: u64,
        token_id: U256,
        owner: Address,
    ) -> Result<RedemptionStatus> {
        let (chain, store) = self.store(chain_id)?;
        let code = read(
            self.reader.as_ref(),
            chain.id,
            store,
            &ISwag1155::getRedemptionStatusCall {
                tokenId: token_id,
                owner,
            },
        )
        .await?;
        RedemptionStatus::from_code(code)
    }
}

/// Result of creating a product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedProduct {
    pub base_id: u64,
    pub variants: Vec<CreatedVariant>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedVariant {
    pub token_id: U256,
    pub uri: String,
    pub tx: SubmittedTx,
}

/// Store admin writes.
///
/// Each call resolves the chain from the wallet at call time.
pub struct StoreAdmin {
    wallet: WalletHandle,
    registry: Arc<ChainRegistry>,
    reader: Arc<dyn ContractReader>,
    pinner: Option<Arc<dyn MetadataPinner>>,
    sponsored: bool,
}

impl StoreAdmin {
    pub fn new(
        wallet: WalletHandle,
        registry: Arc<ChainRegistry>,
        reader: Arc<dyn ContractReader>,
    ) -> Self {
        Self {
            wallet,
            registry,
            reader,
            pinner: None,
            sponsored: true,
        }
    }

    pub fn with_pinner(mut self, pinner: Arc<dyn MetadataPinner>) -> Self {
        self.pinner = Some(pinner);
        self
    }

    pub fn sponsored(mut self, sponsored: bool) -> Self {
        self.sponsored = sponsored;
        self
    }

    async fn store(&self) -> Result<(u64, Address)> {
        self.wallet.require_address()?;
        let chain = self.wallet.active_descriptor(&self.registry).await?;
        Ok((chain.id, chain.require_contract(ContractKind::Store)?))
    }

    async fn send<C: alloy::sol_types::SolCall>(
        &self,
        chain_id: u64,
        store: Address,
        call: &C,
    ) -> Result<SubmittedTx> {
        let intent = TransactionIntent::call(store, chain_id, call).sponsored(self.sponsored);
        self.wallet.send_transaction(&intent).await
    }

    pub async fn update_variant(
        &self,
        token_id: U256,
        price: f64,
        max_supply: u64,
        active: bool,
    ) -> Result<SubmittedTx> {
        let (chain_id, store) = self.store().await?;
        let call = ISwag1155::setVariantCall {
            tokenId: token_id,
            price: U256::from(price_to_base_units(price)?),
            maxSupply: U256::from(max_supply),
            active,
        };
        self.send(chain_id, store, &call).await
    }

    /// Pin one metadata document per size and register each variant.
    ///
    /// Stops at the first failure; variants registered before it stay on chain.
    pub async fn create_product(&self, product: &ProductDraft, base_id: u64) -> Result<CreatedProduct> {
        let pinner = self.pinner.as_ref().ok_or_else(|| {
            EthcaliError::config_missing("No metadata pinner configured for product creation")
        })?;
        if product.sizes.is_empty() {
            return Err(EthcaliError::InvalidProduct(
                "Select at least one size".to_string(),
            ));
        }
        let supply = supply_per_size(product.total_supply, product.sizes.len());
        if supply == 0 {
            return Err(EthcaliError::InvalidProduct(
                "Total supply must cover at least one item per size".to_string(),
            ));
        }
        let price = U256::from(price_to_base_units(product.price)?);
        let (chain_id, store) = self.store().await?;

        let mut variants = Vec::with_capacity(product.sizes.len());
        for &size in &product.sizes {
            let token_id = generate_token_id(base_id, size);
            let uri = pinner.pin(&generate_metadata(product, size)).await?;
            let call = ISwag1155::setVariantWithURICall {
                tokenId: token_id,
                price,
                maxSupply: U256::from(supply),
                active: true,
                uri: uri.clone(),
            };
            let tx = self.send(chain_id, store, &call).await?;
            tracing::info!(%token_id, %size, %uri, "variant created");
            variants.push(CreatedVariant { token_id, uri, tx });
        }

        Ok(CreatedProduct { base_id, variants })
    }

    pub async fn redeem(&self, token_id: U256) -> Result<SubmittedTx> {
        let (chain_id, store) = self.store().await?;
        self.send(chain_id, store, &ISwag1155::redeemCall { tokenId: token_id })
            .await
    }

    /// Mark a redemption fulfilled.
    ///
    /// Refuses when the on-chain status is not `PendingFulfillment`. If the
    /// status cannot be read the transaction is sent anyway and the contract
    /// enforces the state.
    pub async fn mark_fulfilled(&self, token_id: U256, owner: Address) -> Result<SubmittedTx> {
        let (chain_id, store) = self.store().await?;
        let status = read(
            self.reader.as_ref(),
            chain_id,
            store,
            &ISwag1155::getRedemptionStatusCall {
                tokenId: token_id,
                owner,
            },
        )
        .await;

        match status.map_err(EthcaliError::from).and_then(RedemptionStatus::from_code) {
            Ok(RedemptionStatus::PendingFulfillment) => {}
            Ok(other) => {
                return Err(EthcaliError::RedemptionState(format!(
                    "This redemption is {}. Current status: {other}",
                    other.describe()
                )))
            }
            Err(e) => {
                tracing::warn!(%token_id, %owner, error = %e, "could not check redemption status before fulfillment");
            }
        }

        self.send(
            chain_id,
            store,
            &ISwag1155::markFulfilledCall {
                tokenId: token_id,
                owner,
            },
        )
        .await
    }

    pub async fn set_payment_token(&self, token: Address) -> Result<SubmittedTx> {
        let (chain_id, store) = self.store().await?;
        self.send(chain_id, store, &ISwag1155::setUSDCCall { usdc: token })
            .await
    }

    pub async fn set_treasury(&self, treasury: Address) -> Result<SubmittedTx> {
        let (chain_id, store) = self.store().await?;
        self.send(chain_id, store, &ISwag1155::setTreasuryCall { treasury })
            .await
    }
}
