//! Result Mapper
//!
//! Reassembles raw multicall results into `Vault` / `Strategy` entities.
//! Every field is read as an optional value; a missing, reverted or
//! undecodable call falls back to the field's default and the field name is
//! recorded in `defaulted_fields`.

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace, warn};

use super::checks::vault_checks;
use super::types::{to_human_date_text, QueuePosition, Strategy, StrategyParams, Vault, MAX_BPS};
use crate::catalog::{CatalogIndex, NormalizedVaultRecord, StrategyRef};
use crate::multicall::{
    group_reference, strategy_params_reference, CallResults, CallReturn, IStrategiesHelper,
    IStrategy, IVault032, STRATEGIES_HELPER_GROUP, STRATEGY_PARAMS_CALL,
};

// ============================================
// FIELD READER
// ============================================

/// Reads one result group, tracking every default substitution
struct FieldReader<'a> {
    results: &'a CallResults,
    group: String,
    defaulted: Vec<String>,
}

impl<'a> FieldReader<'a> {
    fn new(results: &'a CallResults, group: String) -> Self {
        Self {
            results,
            group,
            defaulted: Vec::new(),
        }
    }

    fn read<C: SolCall>(&mut self, reference: &str) -> Option<C::Return> {
        match self.results.get(&self.group, reference) {
            Some(CallReturn::Success(data)) => match C::abi_decode_returns(data) {
                Ok(value) => Some(value),
                Err(e) => {
                    debug!("{}.{}: decode failed ({}), using default", self.group, reference, e);
                    self.mark(reference);
                    None
                }
            },
            Some(CallReturn::Failed) => {
                debug!("{}.{}: call reverted, using default", self.group, reference);
                self.mark(reference);
                None
            }
            None => {
                trace!("{}.{}: no result, using default", self.group, reference);
                self.mark(reference);
                None
            }
        }
    }

    fn read_or_default<C: SolCall>(&mut self, reference: &str) -> C::Return
    where
        C::Return: Default,
    {
        self.read::<C>(reference).unwrap_or_default()
    }

    /// Integer coercion for fee/timestamp fields (bps, seconds)
    fn read_u64<C: SolCall<Return = U256>>(&mut self, reference: &str) -> u64 {
        match self.read::<C>(reference) {
            Some(value) => self.coerce_u64(reference, value),
            None => 0,
        }
    }

    /// 0 when the decoded value does not fit, recorded as defaulted
    fn coerce_u64(&mut self, reference: &str, value: U256) -> u64 {
        u64_or_default(value).unwrap_or_else(|| {
            debug!("{}.{}: {} does not fit u64, using 0", self.group, reference, value);
            self.mark(reference);
            0
        })
    }

    fn mark(&mut self, reference: &str) {
        self.defaulted.push(reference.to_string());
    }

    fn into_defaulted(self) -> Vec<String> {
        self.defaulted
    }
}

fn u64_or_default(value: U256) -> Option<u64> {
    u64::try_from(value).ok()
}

// ============================================
// QUEUE POSITIONS
// ============================================

/// Strategy address → queue index for one vault, from the helper batch.
/// Empty when the helper call failed or is missing.
fn strategy_queue_indexes(vault: &Address, helper_results: &CallResults) -> HashMap<Address, usize> {
    let reference = group_reference(vault);
    let queue = match helper_results.get(STRATEGIES_HELPER_GROUP, &reference) {
        Some(CallReturn::Success(data)) => {
            match IStrategiesHelper::assetStrategiesAddressesCall::abi_decode_returns(data) {
                Ok(queue) => queue,
                Err(e) => {
                    debug!("Queue for {}: decode failed ({})", vault, e);
                    return HashMap::new();
                }
            }
        }
        _ => {
            debug!("Queue for {}: unavailable, strategies left unqueued", vault);
            return HashMap::new();
        }
    };

    let mut indexes = HashMap::with_capacity(queue.len());
    for (i, strategy) in queue.into_iter().enumerate() {
        indexes.entry(strategy).or_insert(i);
    }
    indexes
}

// ============================================
// STRATEGIES
// ============================================

fn map_strategy(
    strategy_ref: &StrategyRef,
    owner: Address,
    queue_indexes: &HashMap<Address, usize>,
    results: &CallResults,
    index: &CatalogIndex,
) -> Strategy {
    let address = strategy_ref.address;
    let shared_with: Vec<Address> = index
        .listing_vaults(&address)
        .iter()
        .filter(|&&v| v != owner)
        .copied()
        .collect();

    let mut views = FieldReader::new(results, group_reference(&address));
    let name = views
        .read::<IStrategy::nameCall>("name")
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| strategy_ref.name.clone());
    let api_version = views.read_or_default::<IStrategy::apiVersionCall>("apiVersion");
    let strategist = views.read_or_default::<IStrategy::strategistCall>("strategist");
    let keeper = views.read_or_default::<IStrategy::keeperCall>("keeper");
    let rewards = views.read_or_default::<IStrategy::rewardsCall>("rewards");
    let reported_vault = views.read_or_default::<IStrategy::vaultCall>("vault");
    let emergency_exit = views.read_or_default::<IStrategy::emergencyExitCall>("emergencyExit");
    let is_active = views.read_or_default::<IStrategy::isActiveCall>("isActive");
    let estimated_total_assets =
        views.read_or_default::<IStrategy::estimatedTotalAssetsCall>("estimatedTotalAssets");
    let mut defaulted_fields = views.into_defaulted();

    let mut params_reader =
        FieldReader::new(results, strategy_params_reference(&owner, &address));
    let params = params_reader
        .read::<IVault032::strategiesCall>(STRATEGY_PARAMS_CALL)
        .map(|p| StrategyParams {
            performance_fee: params_reader.coerce_u64("strategies.performanceFee", p.performanceFee),
            activation: params_reader.coerce_u64("strategies.activation", p.activation),
            debt_ratio: p.debtRatio,
            min_debt_per_harvest: p.minDebtPerHarvest,
            max_debt_per_harvest: p.maxDebtPerHarvest,
            last_report: params_reader.coerce_u64("strategies.lastReport", p.lastReport),
            total_debt: p.totalDebt,
            total_gain: p.totalGain,
            total_loss: p.totalLoss,
        })
        .unwrap_or_default();
    defaulted_fields.extend(params_reader.into_defaulted());

    let debt_usage_bps = u64_or_default(params.debt_ratio)
        .unwrap_or(MAX_BPS)
        .min(MAX_BPS);
    let queue_position = queue_indexes
        .get(&address)
        .map(|&i| QueuePosition::Queued(i))
        .unwrap_or(QueuePosition::NotQueued);

    Strategy {
        address,
        vault: owner,
        shared_with,
        queue_position,
        name,
        api_version,
        strategist,
        keeper,
        rewards,
        reported_vault,
        emergency_exit,
        is_active,
        estimated_total_assets,
        last_report_text: to_human_date_text(params.last_report),
        params,
        debt_usage_bps,
        defaulted_fields,
    }
}

/// Map a vault's strategies in catalog order, then order them by queue
/// position (stable, so unqueued strategies keep catalog order at the end).
pub(crate) fn map_strategies(
    record: &NormalizedVaultRecord,
    results: &CallResults,
    helper_results: &CallResults,
    index: &CatalogIndex,
) -> Vec<Strategy> {
    let queue_indexes = strategy_queue_indexes(&record.address, helper_results);

    let mut strategies: Vec<Strategy> = record
        .strategies
        .iter()
        .map(|s| map_strategy(s, record.address, &queue_indexes, results, index))
        .collect();
    strategies.sort_by_key(|s| s.queue_position);
    strategies
}

/// Aggregate debt usage: integer sum of strategy debt ratios (bps)
pub fn total_debt_usage(strategies: &[Strategy]) -> U256 {
    strategies
        .iter()
        .fold(U256::ZERO, |sum, s| sum.saturating_add(s.params.debt_ratio))
}

// ============================================
// VAULTS
// ============================================

fn map_vault(
    record: &NormalizedVaultRecord,
    results: &CallResults,
    helper_results: &CallResults,
    index: &CatalogIndex,
) -> Vault {
    let strategies = map_strategies(record, results, helper_results, index);
    let debt_usage = total_debt_usage(&strategies);

    let mut views = FieldReader::new(results, group_reference(&record.address));
    let management = views.read_or_default::<IVault032::managementCall>("management");
    let management_fee = views.read_u64::<IVault032::managementFeeCall>("managementFee");
    let performance_fee = views.read_u64::<IVault032::performanceFeeCall>("performanceFee");
    let governance = views.read_or_default::<IVault032::governanceCall>("governance");
    let guardian = views.read_or_default::<IVault032::guardianCall>("guardian");
    let deposit_limit = views.read_or_default::<IVault032::depositLimitCall>("depositLimit");
    let total_assets = views.read_or_default::<IVault032::totalAssetsCall>("totalAssets");
    let debt_ratio = views.read_or_default::<IVault032::debtRatioCall>("debtRatio");
    let total_debt = views.read_or_default::<IVault032::totalDebtCall>("totalDebt");
    let last_report = views.read_u64::<IVault032::lastReportCall>("lastReport");
    let rewards = views.read_or_default::<IVault032::rewardsCall>("rewards");

    let mut defaulted_fields = record.defaulted_fields.clone();
    defaulted_fields.extend(views.into_defaulted());

    Vault {
        address: record.address,
        api_version: record.api_version.clone(),
        symbol: record.symbol.clone(),
        name: record.name.clone(),
        token: record.token.clone(),
        icon: record.icon.clone(),
        emergency_shutdown: record.emergency_shutdown,
        tvl: record.tvl,
        management,
        management_fee,
        performance_fee,
        governance,
        guardian,
        rewards,
        deposit_limit,
        total_assets,
        debt_ratio,
        total_debt,
        last_report,
        last_report_text: to_human_date_text(last_report),
        strategies,
        debt_usage,
        config_ok: true,
        config_warnings: Vec::new(),
        defaulted_fields,
    }
}

/// Produce one validated vault per catalog entry, in catalog order.
///
/// A vault that fails validation is skipped and logged; the rest of the
/// catalog is still returned.
pub fn map_vault_data(
    results: &CallResults,
    helper_results: &CallResults,
    index: &CatalogIndex,
) -> Vec<Vault> {
    let mut vaults = Vec::with_capacity(index.vault_count());
    let mut skipped = HashSet::new();

    for record in index.vaults() {
        let candidate = map_vault(record, results, helper_results, index);
        if !candidate.defaulted_fields.is_empty() {
            debug!(
                "Vault {} defaulted {} field(s): {:?}",
                record.address,
                candidate.defaulted_fields.len(),
                candidate.defaulted_fields
            );
        }
        match vault_checks(candidate) {
            Ok(vault) => vaults.push(vault),
            Err(e) => {
                warn!("Skipping vault {}: {}", record.address, e);
                skipped.insert(record.address);
            }
        }
    }

    if !skipped.is_empty() {
        warn!("{} vault(s) failed validation and were skipped", skipped.len());
    }
    vaults
}

// ============================================
// TESTS
// ============================================
