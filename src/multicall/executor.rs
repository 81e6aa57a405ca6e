//! Batch Call Executor - MULTICALL3 Edition
//!
//! Flattens call groups into `aggregate3` with `allowFailure = true`, so a
//! reverting call only marks its own slot as failed. Large plans are split
//! into chunks that run concurrently.

use alloy_primitives::{Address, Bytes};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::SolCall;
use futures::future::join_all;
use std::collections::HashMap;
use std::future::Future;
use std::time::Instant;
use tracing::{debug, info};

use super::abi::IMulticall3;
use super::plan::CallGroup;
use crate::error::VaultError;

// ============================================
// RESULTS
// ============================================

/// Raw outcome of one call: revert/failure marker or undecoded return data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallReturn {
    Success(Bytes),
    Failed,
}

/// Raw results keyed by group reference, then call reference
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallResults {
    groups: HashMap<String, HashMap<String, CallReturn>>,
}

impl CallResults {
    pub fn insert(&mut self, group: &str, call: &str, outcome: CallReturn) {
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(call.to_string(), outcome);
    }

    pub fn group(&self, group: &str) -> Option<&HashMap<String, CallReturn>> {
        self.groups.get(group)
    }

    pub fn get(&self, group: &str, call: &str) -> Option<&CallReturn> {
        self.groups.get(group).and_then(|calls| calls.get(call))
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of calls that came back as failures
    pub fn failed_count(&self) -> usize {
        self.groups
            .values()
            .flat_map(|calls| calls.values())
            .filter(|outcome| matches!(outcome, CallReturn::Failed))
            .count()
    }
}

// ============================================
// EXECUTOR
// ============================================

/// Executes call groups in as few round-trips as possible.
pub trait BatchCallExecutor: Send + Sync {
    fn execute(
        &self,
        groups: &[CallGroup],
    ) -> impl Future<Output = Result<CallResults, VaultError>> + Send;
}

pub struct Multicall3Executor {
    rpc_url: String,
    multicall: Address,
    max_calls_per_batch: usize,
}

impl Multicall3Executor {
    pub fn new(rpc_url: String, multicall: Address, max_calls_per_batch: usize) -> Self {
        Self {
            rpc_url,
            multicall,
            max_calls_per_batch: max_calls_per_batch.max(1),
        }
    }

    /// Execute one aggregate3 round-trip
    async fn aggregate<P: Provider>(
        &self,
        provider: &P,
        calls: Vec<IMulticall3::Call3>,
    ) -> Result<Vec<IMulticall3::Result>, VaultError> {
        let calldata = IMulticall3::aggregate3Call { calls }.abi_encode();

        let tx = TransactionRequest::default()
            .to(self.multicall)
            .input(calldata.into());

        let result = provider.call(tx).await?;

        IMulticall3::aggregate3Call::abi_decode_returns(&result)
            .map_err(|e| VaultError::Multicall(format!("Failed to decode multicall result: {}", e)))
    }
}

impl BatchCallExecutor for Multicall3Executor {
    async fn execute(&self, groups: &[CallGroup]) -> Result<CallResults, VaultError> {
        let mut keys: Vec<(&str, &str)> = Vec::new();
        let mut calls: Vec<IMulticall3::Call3> = Vec::new();

        for group in groups {
            for call in &group.calls {
                keys.push((group.reference.as_str(), call.reference.as_str()));
                calls.push(IMulticall3::Call3 {
                    target: group.contract_address,
                    allowFailure: true,
                    callData: call.call_data.clone(),
                });
            }
        }

        if calls.is_empty() {
            return Ok(CallResults::default());
        }

        let start = Instant::now();
        let url: reqwest::Url = self
            .rpc_url
            .parse()
            .map_err(|e| VaultError::Multicall(format!("Invalid RPC url {}: {}", self.rpc_url, e)))?;
        let provider = ProviderBuilder::new().connect_http(url);

        let batches = calls
            .chunks(self.max_calls_per_batch)
            .map(|chunk| self.aggregate(&provider, chunk.to_vec()));
        let outcomes = join_all(batches).await;
        let batch_count = outcomes.len();

        let mut results = CallResults::default();
        for (chunk_keys, outcome) in keys.chunks(self.max_calls_per_batch).zip(outcomes) {
            let returns = outcome?;
            if returns.len() != chunk_keys.len() {
                return Err(VaultError::Multicall(format!(
                    "expected {} results, got {}",
                    chunk_keys.len(),
                    returns.len()
                )));
            }
            for ((group, call), ret) in chunk_keys.iter().zip(returns) {
                let outcome = if ret.success {
                    CallReturn::Success(ret.returnData)
                } else {
                    CallReturn::Failed
                };
                results.insert(group, call, outcome);
            }
        }

        let failed = results.failed_count();
        if failed > 0 {
            debug!("{} of {} calls reverted", failed, keys.len());
        }
        info!(
            "⚡ Multicall3: {} calls in {} batch(es), {:?}",
            keys.len(),
            batch_count,
            start.elapsed()
        );

        Ok(results)
    }
}
