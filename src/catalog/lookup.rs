//! Per-run lookup indices over the normalized catalog
//!
//! Built once per pipeline run, handed to the plan builder and the result
//! mapper, then dropped. Never shared between runs.

use alloy_primitives::Address;
use std::collections::HashMap;

use super::types::NormalizedVaultRecord;

/// Address→vault map (catalog insertion order) plus strategy→vaults map.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    vaults: Vec<NormalizedVaultRecord>,
    positions: HashMap<Address, usize>,
    strategy_vaults: HashMap<Address, Vec<Address>>,
}

impl CatalogIndex {
    /// A repeated vault address replaces the earlier record but keeps its
    /// original position. A strategy may be listed by several vaults.
    pub fn build(records: Vec<NormalizedVaultRecord>) -> Self {
        let mut index = Self::default();

        for record in records {
            match index.positions.get(&record.address) {
                Some(&pos) => index.vaults[pos] = record,
                None => {
                    index.positions.insert(record.address, index.vaults.len());
                    index.vaults.push(record);
                }
            }
        }

        for record in &index.vaults {
            for strategy in &record.strategies {
                let listed_by = index.strategy_vaults.entry(strategy.address).or_default();
                if !listed_by.contains(&record.address) {
                    listed_by.push(record.address);
                }
            }
        }

        index
    }

    /// Vaults in catalog order
    pub fn vaults(&self) -> &[NormalizedVaultRecord] {
        &self.vaults
    }

    pub fn vault(&self, address: &Address) -> Option<&NormalizedVaultRecord> {
        self.positions.get(address).map(|&pos| &self.vaults[pos])
    }

    /// Vaults whose catalog entries list this strategy, in catalog order
    pub fn listing_vaults(&self, strategy: &Address) -> &[Address] {
        self.strategy_vaults
            .get(strategy)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn vault_count(&self) -> usize {
        self.vaults.len()
    }

    pub fn strategy_count(&self) -> usize {
        self.strategy_vaults.len()
    }
}
