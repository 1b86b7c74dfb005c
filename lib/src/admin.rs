//! Admin role aggregation across the store, faucet manager, and identity
//! registry contracts.

use crate::config::AdminCacheConfig;
use crate::contracts::{IFaucetManager, ISwag1155, IZKPassportNFT};
use crate::network::{ChainDescriptor, ChainRegistry, ContractAddresses};
use crate::reader::{read, ContractReader, ReadError};
use alloy::primitives::Address;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Admin roles held by one address on one chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AdminStatus {
    store_admin: bool,
    faucet_admin: bool,
    faucet_super_admin: bool,
    identity_owner: bool,
    has_any_admin: bool,
}

impl AdminStatus {
    pub fn new(
        store_admin: bool,
        faucet_admin: bool,
        faucet_super_admin: bool,
        identity_owner: bool,
    ) -> Self {
        Self {
            store_admin,
            faucet_admin,
            faucet_super_admin,
            identity_owner,
            has_any_admin: store_admin || faucet_admin || faucet_super_admin || identity_owner,
        }
    }

    pub fn store_admin(&self) -> bool {
        self.store_admin
    }

    pub fn faucet_admin(&self) -> bool {
        self.faucet_admin
    }

    pub fn faucet_super_admin(&self) -> bool {
        self.faucet_super_admin
    }

    pub fn identity_owner(&self) -> bool {
        self.identity_owner
    }

    pub fn has_any_admin(&self) -> bool {
        self.has_any_admin
    }
}

/// Raw per-role read results before folding.
///
/// `None` means the contract is not deployed on the chain, so no call was made.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleReadings {
    pub store_admin: Option<Result<bool, ReadError>>,
    pub faucet_admin: Option<Result<bool, ReadError>>,
    pub faucet_super_admin: Option<Result<bool, ReadError>>,
    pub identity_owner: Option<Result<bool, ReadError>>,
}

impl RoleReadings {
    /// Collapse readings into a status. Failed reads count as "role absent".
    pub fn fold(&self) -> AdminStatus {
        fn flag(role: &str, reading: &Option<Result<bool, ReadError>>) -> bool {
            match reading {
                Some(Ok(value)) => *value,
                Some(Err(e)) => {
                    tracing::debug!(role, error = %e, "role check failed, treating as absent");
                    false
                }
                None => false,
            }
        }

        AdminStatus::new(
            flag("store_admin", &self.store_admin),
            flag("faucet_admin", &self.faucet_admin),
            flag("faucet_super_admin", &self.faucet_super_admin),
            flag("identity_owner", &self.identity_owner),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    chain_id: u64,
    address: Address,
    contracts: ContractAddresses,
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    status: AdminStatus,
    fetched_at: Instant,
}

async fn when_deployed<F>(contract: Option<Address>, read: impl FnOnce(Address) -> F) -> Option<F::Output>
where
    F: Future,
{
    match contract {
        Some(addr) => Some(read(addr).await),
        None => None,
    }
}

/// Concurrent admin-role checks with a short-lived memo.
pub struct AdminStatusAggregator {
    registry: Arc<ChainRegistry>,
    reader: Arc<dyn ContractReader>,
    cache: Mutex<HashMap<CacheKey, CacheEntry>>,
    stale_after: Duration,
    evict_after: Duration,
}

impl AdminStatusAggregator {
    pub fn new(registry: Arc<ChainRegistry>, reader: Arc<dyn ContractReader>) -> Self {
        Self::with_cache_config(registry, reader, AdminCacheConfig::default())
    }

    pub fn with_cache_config(
        registry: Arc<ChainRegistry>,
        reader: Arc<dyn ContractReader>,
        cache: AdminCacheConfig,
    ) -> Self {
        Self {
            registry,
            reader,
            cache: Mutex::new(HashMap::new()),
            stale_after: cache.stale_after(),
            evict_after: cache.evict_after(),
        }
    }

    /// Admin status of `address` on `chain_id`.
    ///
    /// Unsupported chains use the default chain's contracts. Never fails:
    /// unreadable roles are reported as absent.
    pub async fn check(&self, address: Address, chain_id: u64) -> AdminStatus {
        let descriptor = self.registry.descriptor_for(chain_id);
        let key = CacheKey {
            chain_id: descriptor.id,
            address,
            contracts: descriptor.contracts,
        };

        if let Some(status) = self.cached(&key) {
            tracing::debug!(chain_id = descriptor.id, %address, "admin status cache hit");
            return status;
        }

        let status = self.read_roles(descriptor, address).await.fold();
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).insert(
            key,
            CacheEntry {
                status,
                fetched_at: Instant::now(),
            },
        );
        status
    }

    fn cached(&self, key: &CacheKey) -> Option<AdminStatus> {
        let now = Instant::now();
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.retain(|_, entry| now.duration_since(entry.fetched_at) < self.evict_after);
        cache
            .get(key)
            .filter(|entry| now.duration_since(entry.fetched_at) < self.stale_after)
            .map(|entry| entry.status)
    }

    /// Issue every role check for `descriptor` concurrently, without caching.
    pub async fn read_roles(&self, descriptor: &ChainDescriptor, address: Address) -> RoleReadings {
        let reader = self.reader.as_ref();
        let chain_id = descriptor.id;
        let contracts = descriptor.contracts;

        let (store_admin, faucet_admin, faucet_super_admin, identity_owner) = tokio::join!(
            when_deployed(contracts.store, |store| {
                store_admin_role(reader, chain_id, store, address)
            }),
            when_deployed(contracts.faucet_manager, |faucet| async move {
                read(reader, chain_id, faucet, &IFaucetManager::isAdminCall { account: address })
                    .await
            }),
            when_deployed(contracts.faucet_manager, |faucet| async move {
                read(
                    reader,
                    chain_id,
                    faucet,
                    &IFaucetManager::isSuperAdminCall { account: address },
                )
                .await
            }),
            when_deployed(contracts.identity_registry, |registry| async move {
                // Address equality is byte-wise, i.e. case-insensitive on the hex form
                read(reader, chain_id, registry, &IZKPassportNFT::ownerCall {})
                    .await
                    .map(|owner| owner == address)
            }),
        );

        RoleReadings {
            store_admin,
            faucet_admin,
            faucet_super_admin,
            identity_owner,
        }
    }

    /// Drop cached entries for one address, e.g. after a wallet change
    pub fn invalidate_address(&self, address: Address) {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|key, _| key.address != address);
    }

    /// Drop cached entries for one chain, e.g. after a chain switch
    pub fn invalidate_chain(&self, chain_id: u64) {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|key, _| key.chain_id != chain_id);
    }

    pub fn invalidate_all(&self) {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

/// `isAdmin` on the store, falling back to comparing `owner()` when that read fails.
async fn store_admin_role(
    reader: &dyn ContractReader,
    chain_id: u64,
    store: Address,
    address: Address,
) -> Result<bool, ReadError> {
    match read(reader, chain_id, store, &ISwag1155::isAdminCall { account: address }).await {
        Ok(is_admin) => Ok(is_admin),
        Err(admin_err) => {
            tracing::debug!(%store, error = %admin_err, "isAdmin failed, trying owner()");
            read(reader, chain_id, store, &ISwag1155::ownerCall {})
                .await
                .map(|owner| owner == address)
                .map_err(|_| admin_err)
        }
    }
}
