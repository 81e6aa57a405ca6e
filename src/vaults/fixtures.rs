//! Shared test fixtures: a catalog with one vault and two strategies, the
//! matching on-chain results, and counting fakes for both data sources.

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolValue;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::{CatalogIndex, IndexSource, NormalizedVaultRecord, StrategyRef, Token};
use crate::error::VaultError;
use crate::multicall::{
    group_reference, strategy_params_reference, BatchCallExecutor, CallGroup, CallResults,
    CallReturn, STRATEGIES_HELPER_GROUP, STRATEGY_PARAMS_CALL,
};

pub const VAULT_A: &str = "0x19D3364A399d251E894aC732651be8B0E4e85001";

pub fn vault_a() -> Address {
    VAULT_A.parse().unwrap()
}

pub fn vault_b() -> Address {
    Address::repeat_byte(0xbb)
}

pub fn strategy_1() -> Address {
    Address::repeat_byte(0x51)
}

pub fn strategy_2() -> Address {
    Address::repeat_byte(0x52)
}

const ORDINALS: [&str; 3] = ["One", "Two", "Three"];

fn catalog_strategy_name(i: usize) -> String {
    format!("Catalog Strategy {}", ORDINALS.get(i).copied().unwrap_or("N"))
}

// ============================================
// CATALOG
// ============================================

pub fn record(address: Address, strategies: &[Address]) -> NormalizedVaultRecord {
    NormalizedVaultRecord {
        address,
        api_version: "0.4.2".to_string(),
        symbol: "yvDAI".to_string(),
        name: "DAI yVault".to_string(),
        token: Token::default(),
        icon: None,
        emergency_shutdown: false,
        tvl: U256::from(1_000_000_000_000_000_000u64),
        strategies: strategies
            .iter()
            .enumerate()
            .map(|(i, &address)| StrategyRef {
                address,
                name: catalog_strategy_name(i),
            })
            .collect(),
        defaulted_fields: vec![],
    }
}

pub fn index_with(records: Vec<NormalizedVaultRecord>) -> CatalogIndex {
    CatalogIndex::build(records)
}

/// Raw `/vaults/all` record as the index service returns it
pub fn catalog_json(address: Address, endorsed: bool, strategies: &[Address]) -> Value {
    json!({
        "address": address.to_checksum(None),
        "type": "v2",
        "version": "0.4.2",
        "endorsed": endorsed,
        "emergency_shutdown": false,
        "display_name": "DAI yVault",
        "symbol": "yvDAI",
        "token": {
            "address": "0x6B175474E89094C44Da98b954EedcdeCB5BE3830",
            "name": "Dai Stablecoin",
            "symbol": "DAI",
            "decimals": 18
        },
        "tvl": { "total_assets": "1000000000000000000" },
        "strategies": strategies
            .iter()
            .enumerate()
            .map(|(i, s)| json!({ "address": s.to_checksum(None), "name": catalog_strategy_name(i) }))
            .collect::<Vec<_>>()
    })
}

// ============================================
// ON-CHAIN RESULTS
// ============================================

/// Values returned by a vault's view methods
#[derive(Debug, Clone)]
pub struct ChainVault {
    pub address: Address,
    pub management: Address,
    pub management_fee: U256,
    pub performance_fee: U256,
    pub governance: Address,
    pub guardian: Address,
    pub deposit_limit: U256,
    pub total_assets: U256,
    pub debt_ratio: U256,
    pub total_debt: U256,
    pub last_report: U256,
    pub rewards: Address,
}

impl ChainVault {
    pub fn healthy(address: Address) -> Self {
        Self {
            address,
            management: Address::repeat_byte(0x0a),
            management_fee: U256::from(200u64),
            performance_fee: U256::from(2000u64),
            governance: Address::repeat_byte(0x0b),
            guardian: Address::repeat_byte(0x0c),
            deposit_limit: U256::from(u128::MAX),
            total_assets: U256::from(1_000_000_000_000_000_000u64),
            debt_ratio: U256::from(10_000u64),
            total_debt: U256::from(900_000_000_000_000_000u64),
            last_report: U256::from(1_600_000_000u64),
            rewards: Address::repeat_byte(0x0d),
        }
    }
}

/// Values returned by a strategy's view methods and its vault params
#[derive(Debug, Clone)]
pub struct ChainStrategy {
    pub address: Address,
    pub vault: Address,
    pub name: String,
    pub debt_ratio: U256,
}

fn ok<T: SolValue>(value: T) -> CallReturn {
    CallReturn::Success(value.abi_encode().into())
}

pub fn insert_vault_views(results: &mut CallResults, chain: &ChainVault) {
    let group = group_reference(&chain.address);
    let views = [
        ("management", ok(chain.management)),
        ("managementFee", ok(chain.management_fee)),
        ("performanceFee", ok(chain.performance_fee)),
        ("governance", ok(chain.governance)),
        ("guardian", ok(chain.guardian)),
        ("depositLimit", ok(chain.deposit_limit)),
        ("totalAssets", ok(chain.total_assets)),
        ("debtRatio", ok(chain.debt_ratio)),
        ("totalDebt", ok(chain.total_debt)),
        ("lastReport", ok(chain.last_report)),
        ("rewards", ok(chain.rewards)),
    ];
    for (call, outcome) in views {
        results.insert(&group, call, outcome);
    }
}

pub fn insert_strategy(results: &mut CallResults, chain: &ChainStrategy) {
    let group = group_reference(&chain.address);
    let views = [
        ("name", ok(chain.name.clone())),
        ("apiVersion", ok("0.4.3".to_string())),
        ("strategist", ok(Address::repeat_byte(0x5a))),
        ("keeper", ok(Address::repeat_byte(0x5b))),
        ("rewards", ok(Address::repeat_byte(0x5c))),
        ("vault", ok(chain.vault)),
        ("emergencyExit", ok(false)),
        ("isActive", ok(true)),
        ("estimatedTotalAssets", ok(U256::from(500u64))),
    ];
    for (call, outcome) in views {
        results.insert(&group, call, outcome);
    }

    insert_strategy_params(
        results,
        chain.vault,
        chain.address,
        U256::from(1000u64),
        chain.debt_ratio,
    );
}

/// `strategies(address)` result of one listing vault
pub fn insert_strategy_params(
    results: &mut CallResults,
    vault: Address,
    strategy: Address,
    performance_fee: U256,
    debt_ratio: U256,
) {
    let params = (
        performance_fee,
        U256::from(1_590_000_000u64),
        debt_ratio,
        U256::ZERO,
        U256::MAX,
        U256::from(1_600_000_000u64),
        U256::from(100u64),
        U256::from(10u64),
        U256::ZERO,
    );
    results.insert(
        &strategy_params_reference(&vault, &strategy),
        STRATEGY_PARAMS_CALL,
        CallReturn::Success(params.abi_encode_params().into()),
    );
}

pub fn helper_results(queues: &[(Address, Vec<Address>)]) -> CallResults {
    let mut results = CallResults::default();
    for (vault, queue) in queues {
        results.insert(STRATEGIES_HELPER_GROUP, &group_reference(vault), ok(queue.clone()));
    }
    results
}

pub struct Fixture {
    pub results: CallResults,
    pub helper_results: CallResults,
    pub index: CatalogIndex,
}

/// Vault A with S1 (6000 bps) and S2 (4000 bps), queued in that order
pub fn two_strategy_fixture() -> Fixture {
    let mut results = CallResults::default();
    insert_vault_views(&mut results, &ChainVault::healthy(vault_a()));
    for (address, name, debt_ratio) in [
        (strategy_1(), "StrategyOne", 6_000u64),
        (strategy_2(), "StrategyTwo", 4_000u64),
    ] {
        insert_strategy(
            &mut results,
            &ChainStrategy {
                address,
                vault: vault_a(),
                name: name.to_string(),
                debt_ratio: U256::from(debt_ratio),
            },
        );
    }

    Fixture {
        results,
        helper_results: helper_results(&[(vault_a(), vec![strategy_1(), strategy_2()])]),
        index: index_with(vec![record(vault_a(), &[strategy_1(), strategy_2()])]),
    }
}

// ============================================
// COUNTING FAKES
// ============================================

#[derive(Clone)]
pub struct FakeIndex {
    pub records: Arc<Vec<Value>>,
    pub calls: Arc<AtomicUsize>,
    pub fail: bool,
}

impl FakeIndex {
    pub fn new(records: Vec<Value>) -> Self {
        Self {
            records: Arc::new(records),
            calls: Arc::new(AtomicUsize::new(0)),
            fail: false,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IndexSource for FakeIndex {
    async fn fetch_catalog(&self) -> Result<Vec<Value>, VaultError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Suspend like a real request so concurrent callers overlap
        tokio::time::sleep(Duration::from_millis(20)).await;
        if self.fail {
            return Err(VaultError::Index("index unavailable".to_string()));
        }
        Ok(self.records.as_ref().clone())
    }
}

/// Answers main-batch groups from `main`, helper-batch groups from `helper`
#[derive(Clone)]
pub struct FakeExecutor {
    pub main: Arc<CallResults>,
    pub helper: Arc<CallResults>,
    pub calls: Arc<AtomicUsize>,
    pub fail_helper: bool,
}

impl FakeExecutor {
    pub fn new(main: CallResults, helper: CallResults) -> Self {
        Self {
            main: Arc::new(main),
            helper: Arc::new(helper),
            calls: Arc::new(AtomicUsize::new(0)),
            fail_helper: false,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl BatchCallExecutor for FakeExecutor {
    async fn execute(&self, groups: &[CallGroup]) -> Result<CallResults, VaultError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        let is_helper = groups
            .first()
            .is_some_and(|g| g.reference == STRATEGIES_HELPER_GROUP);

        if is_helper {
            if self.fail_helper {
                return Err(VaultError::Multicall("helper reverted".to_string()));
            }
            return Ok(self.helper.as_ref().clone());
        }
        Ok(self.main.as_ref().clone())
    }
}
