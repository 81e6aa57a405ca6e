//! Vault Service - pipeline orchestration and result caching
//!
//! One pipeline run: index fetch → filter/normalize → lookup maps → call
//! plan → main + helper batches (concurrently) → mapping and validation.
//! Results are memoized per allow-list; concurrent callers for the same key
//! share a single in-flight run.

use alloy_primitives::Address;
use moka::future::Cache;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::mapper::map_vault_data;
use super::types::{parse_vault_address, Vault};
use crate::catalog::{filter_and_normalize, AllowList, CatalogIndex, HttpIndexClient, IndexSource};
use crate::config::Config;
use crate::error::VaultError;
use crate::multicall::{build_call_plan, BatchCallExecutor, CallResults, Multicall3Executor};

// ============================================
// CACHE
// ============================================

fn build_cache<K, V>(ttl: Option<Duration>) -> Cache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let builder = Cache::builder();
    match ttl {
        Some(ttl) => builder.time_to_live(ttl).build(),
        None => builder.build(),
    }
}

/// Memoized pipeline results.
///
/// Unbounded, no eviction: entries live for the process lifetime unless a
/// TTL is configured. `invalidate` is the explicit refresh hook.
pub struct VaultCache {
    all: Cache<AllowList, Arc<Vec<Vault>>>,
    single: Cache<Address, Vault>,
}

impl VaultCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            all: build_cache(ttl),
            single: build_cache(ttl),
        }
    }

    pub fn invalidate(&self) {
        self.all.invalidate_all();
        self.single.invalidate_all();
    }
}

impl Default for VaultCache {
    fn default() -> Self {
        Self::new(None)
    }
}

// ============================================
// SERVICE
// ============================================

pub struct VaultService<I, E> {
    index: I,
    executor: E,
    strategies_helper: Address,
    cache: VaultCache,
}

impl VaultService<HttpIndexClient, Multicall3Executor> {
    /// Wire the live index client and Multicall3 executor from configuration
    pub fn from_config(config: &Config) -> eyre::Result<Self> {
        config.validate()?;

        let index = HttpIndexClient::new(config.index_api_url.clone(), config.request_timeout())?;
        let executor = Multicall3Executor::new(
            config.rpc_url.clone(),
            config.multicall()?,
            config.max_calls_per_batch,
        );

        Ok(Self::new(
            index,
            executor,
            config.strategies_helper()?,
            VaultCache::new(config.cache_ttl()),
        ))
    }
}

impl<I: IndexSource, E: BatchCallExecutor> VaultService<I, E> {
    pub fn new(index: I, executor: E, strategies_helper: Address, cache: VaultCache) -> Self {
        Self {
            index,
            executor,
            strategies_helper,
            cache,
        }
    }

    /// All vaults passing the catalog filter, plus allow-listed extras.
    ///
    /// Memoized per allow-list (order and case of the entries do not
    /// matter). Failures are not cached, the next call retries.
    pub async fn fetch_all_vaults<S: AsRef<str>>(
        &self,
        allow_list: &[S],
    ) -> Result<Arc<Vec<Vault>>, VaultError> {
        self.vaults_for(AllowList::new(allow_list)).await
    }

    /// One vault by address, case-insensitive.
    ///
    /// The address is validated before any network access. Lookup runs
    /// against the default (empty) allow-list.
    pub async fn fetch_vault_by_address(&self, address: &str) -> Result<Vault, VaultError> {
        let target = parse_vault_address(address)?;

        self.cache
            .single
            .try_get_with(target, async {
                let vaults = self.vaults_for(AllowList::default()).await?;
                vaults
                    .iter()
                    .find(|v| v.address == target)
                    .cloned()
                    .ok_or_else(|| VaultError::NotFound(target.to_checksum(None)))
            })
            .await
            .map_err(|e| (*e).clone())
    }

    /// Drop every memoized result; the next request re-runs the pipeline
    pub fn invalidate(&self) {
        info!("🧹 Vault cache invalidated");
        self.cache.invalidate();
    }

    async fn vaults_for(&self, allow_list: AllowList) -> Result<Arc<Vec<Vault>>, VaultError> {
        self.cache
            .all
            .try_get_with(allow_list.clone(), async {
                self.build(&allow_list).await.map(Arc::new)
            })
            .await
            .map_err(|e| (*e).clone())
    }

    async fn build(&self, allow_list: &AllowList) -> Result<Vec<Vault>, VaultError> {
        let start = Instant::now();

        let raw = self.index.fetch_catalog().await?;
        let records = filter_and_normalize(&raw, allow_list);
        debug!(
            "Catalog: {} of {} records kept (allow-list: {})",
            records.len(),
            raw.len(),
            allow_list.len()
        );

        let index = CatalogIndex::build(records);
        let plan = build_call_plan(&index, self.strategies_helper);

        let (main, helper) = tokio::join!(
            self.executor.execute(&plan.main),
            self.executor.execute(&plan.helper)
        );
        let main = main?;
        let helper = helper.unwrap_or_else(|e| {
            warn!("Strategy queue lookup failed, strategies left unqueued: {}", e);
            CallResults::default()
        });

        let vaults = map_vault_data(&main, &helper, &index);
        info!(
            "🏦 Pipeline: {} vaults, {} strategies, {} calls in {:?}",
            vaults.len(),
            index.strategy_count(),
            plan.main_call_count() + plan.helper_call_count(),
            start.elapsed()
        );
        Ok(vaults)
    }
}

// ============================================
// TESTS
// ============================================
