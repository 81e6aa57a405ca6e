//! Call Plan Builder
//!
//! Turns the catalog into call groups:
//! - main batch: one vault group per vault, one view group per strategy and
//!   one `strategies(address)` params group per (vault, strategy) listing
//! - helper batch: one `assetStrategiesAddresses(vault)` call per vault

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolCall;
use tracing::debug;

use super::abi::{
    encode_strategy_view, encode_vault_view, ContractAbi, IStrategiesHelper, IVault032,
    STRATEGY_VIEW_METHODS, VAULT_VIEW_METHODS,
};
use crate::catalog::CatalogIndex;

// ============================================
// REFERENCES
// ============================================

/// Group reference of the queue-helper batch
pub const STRATEGIES_HELPER_GROUP: &str = "strategiesHelper";

/// Call reference of the `strategies(address)` params call
pub const STRATEGY_PARAMS_CALL: &str = "strategies";

/// Result bucket for a contract: its lower-cased hex address
pub fn group_reference(address: &Address) -> String {
    address.to_string().to_lowercase()
}

/// Result bucket for a strategy's params as reported by one listing vault
pub fn strategy_params_reference(vault: &Address, strategy: &Address) -> String {
    format!("{}_{}_params", group_reference(vault), group_reference(strategy))
}

// ============================================
// CALL GROUPS
// ============================================

/// One method invocation inside a group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSpec {
    pub reference: String,
    pub method_name: &'static str,
    pub call_data: Bytes,
}

/// Calls against a single contract, keyed by a caller-chosen reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallGroup {
    pub reference: String,
    pub contract_address: Address,
    pub abi: ContractAbi,
    pub calls: Vec<CallSpec>,
}

impl CallGroup {
    fn views(
        address: Address,
        abi: ContractAbi,
        methods: &[&'static str],
        encode: fn(&str) -> Option<Bytes>,
    ) -> Self {
        let calls = methods
            .iter()
            .filter_map(|&method| {
                encode(method).map(|call_data| CallSpec {
                    reference: method.to_string(),
                    method_name: method,
                    call_data,
                })
            })
            .collect();

        Self {
            reference: group_reference(&address),
            contract_address: address,
            abi,
            calls,
        }
    }
}

/// Everything one pipeline run will ask the chain
#[derive(Debug, Clone, Default)]
pub struct CallPlan {
    /// Vault and strategy reads, executed as one request set
    pub main: Vec<CallGroup>,
    /// Withdrawal-queue reads against the helper contract
    pub helper: Vec<CallGroup>,
}

impl CallPlan {
    pub fn main_call_count(&self) -> usize {
        self.main.iter().map(|g| g.calls.len()).sum()
    }

    pub fn helper_call_count(&self) -> usize {
        self.helper.iter().map(|g| g.calls.len()).sum()
    }
}

/// Build the batched reads for every vault and strategy in the catalog.
pub fn build_call_plan(index: &CatalogIndex, strategies_helper: Address) -> CallPlan {
    let mut main = Vec::new();
    let mut helper_calls = Vec::new();

    for vault in index.vaults() {
        main.push(CallGroup::views(
            vault.address,
            ContractAbi::Vault032,
            &VAULT_VIEW_METHODS,
            encode_vault_view,
        ));

        helper_calls.push(CallSpec {
            reference: group_reference(&vault.address),
            method_name: "assetStrategiesAddresses",
            call_data: IStrategiesHelper::assetStrategiesAddressesCall {
                assetAddress: vault.address,
            }
            .abi_encode()
            .into(),
        });
    }

    // Strategy views are read once; params are read from every listing vault
    let mut seen = std::collections::HashSet::new();
    for vault in index.vaults() {
        for strategy in &vault.strategies {
            if seen.insert(strategy.address) {
                main.push(CallGroup::views(
                    strategy.address,
                    ContractAbi::Strategy,
                    &STRATEGY_VIEW_METHODS,
                    encode_strategy_view,
                ));
            }

            main.push(CallGroup {
                reference: strategy_params_reference(&vault.address, &strategy.address),
                contract_address: vault.address,
                abi: ContractAbi::Vault032,
                calls: vec![CallSpec {
                    reference: STRATEGY_PARAMS_CALL.to_string(),
                    method_name: STRATEGY_PARAMS_CALL,
                    call_data: IVault032::strategiesCall {
                        strategy: strategy.address,
                    }
                    .abi_encode()
                    .into(),
                }],
            });
        }
    }

    let helper = if helper_calls.is_empty() {
        Vec::new()
    } else {
        vec![CallGroup {
            reference: STRATEGIES_HELPER_GROUP.to_string(),
            contract_address: strategies_helper,
            abi: ContractAbi::StrategiesHelper,
            calls: helper_calls,
        }]
    };

    let plan = CallPlan { main, helper };
    debug!(
        "Call plan: {} groups / {} calls (main), {} calls (helper)",
        plan.main.len(),
        plan.main_call_count(),
        plan.helper_call_count()
    );
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{NormalizedVaultRecord, StrategyRef, Token};
    use alloy_primitives::U256;

    fn record(address: Address, strategies: &[Address]) -> NormalizedVaultRecord {
        NormalizedVaultRecord {
            address,
            api_version: "0.4.2".to_string(),
            symbol: "yvTEST".to_string(),
            name: "Test Vault".to_string(),
            token: Token::default(),
            icon: None,
            emergency_shutdown: false,
            tvl: U256::ZERO,
            strategies: strategies
                .iter()
                .map(|&address| StrategyRef {
                    address,
                    name: String::new(),
                })
                .collect(),
            defaulted_fields: vec![],
        }
    }

    #[test]
    fn test_plan_shape() {
        let helper = Address::repeat_byte(0xee);
        let (a, b) = (Address::repeat_byte(0xaa), Address::repeat_byte(0xbb));
        let (s1, s2) = (Address::repeat_byte(0x01), Address::repeat_byte(0x02));
        let index = CatalogIndex::build(vec![record(a, &[s1, s2]), record(b, &[])]);

        let plan = build_call_plan(&index, helper);

        // 2 vault groups + 2 × (strategy views + params)
        assert_eq!(plan.main.len(), 6);
        assert_eq!(plan.main_call_count(), 2 * 11 + 2 * (9 + 1));

        let vault_group = &plan.main[0];
        assert_eq!(vault_group.reference, group_reference(&a));
        assert_eq!(vault_group.abi, ContractAbi::Vault032);

        let params = plan
            .main
            .iter()
            .find(|g| g.reference == strategy_params_reference(&a, &s2))
            .unwrap();
        assert_eq!(params.contract_address, a);
        assert_eq!(params.calls[0].method_name, "strategies");

        assert_eq!(plan.helper.len(), 1);
        assert_eq!(plan.helper[0].contract_address, helper);
        assert_eq!(plan.helper_call_count(), 2);
        assert_eq!(plan.helper[0].calls[1].reference, group_reference(&b));
    }

    #[test]
    fn test_shared_strategy_params_read_per_vault() {
        let (a, b) = (Address::repeat_byte(0xaa), Address::repeat_byte(0xbb));
        let s = Address::repeat_byte(0x01);
        let index = CatalogIndex::build(vec![record(a, &[s]), record(b, &[s])]);

        let plan = build_call_plan(&index, Address::ZERO);

        // 2 vault groups + 1 strategy view group + 2 params groups
        assert_eq!(plan.main.len(), 5);
        let view_groups = plan
            .main
            .iter()
            .filter(|g| g.abi == ContractAbi::Strategy)
            .count();
        assert_eq!(view_groups, 1);

        for vault in [a, b] {
            let params = plan
                .main
                .iter()
                .find(|g| g.reference == strategy_params_reference(&vault, &s))
                .unwrap();
            assert_eq!(params.contract_address, vault);
        }
    }

    #[test]
    fn test_empty_catalog() {
        let plan = build_call_plan(&CatalogIndex::default(), Address::ZERO);
        assert!(plan.main.is_empty());
        assert!(plan.helper.is_empty());
    }

    #[test]
    fn test_references_are_lowercase() {
        let addr: Address = "0x19D3364A399d251E894aC732651be8B0E4e85001".parse().unwrap();
        let strategy = Address::repeat_byte(0xab);
        assert_eq!(
            group_reference(&addr),
            "0x19d3364a399d251e894ac732651be8b0e4e85001"
        );
        assert_eq!(
            strategy_params_reference(&addr, &strategy),
            format!(
                "0x19d3364a399d251e894ac732651be8b0e4e85001_0x{}_params",
                "ab".repeat(20)
            )
        );
    }
}
