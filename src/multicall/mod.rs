//! Batched on-chain reads: call plans, ABI encoding and Multicall3 execution

pub mod abi;
mod executor;
mod plan;

pub use abi::{ContractAbi, IMulticall3, IStrategiesHelper, IStrategy, IVault032};
pub use executor::{BatchCallExecutor, CallResults, CallReturn, Multicall3Executor};
pub use plan::{
    build_call_plan, group_reference, strategy_params_reference, CallGroup, CallPlan, CallSpec,
    STRATEGIES_HELPER_GROUP, STRATEGY_PARAMS_CALL,
};
