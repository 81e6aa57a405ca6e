//! Vault domain: entities, result mapping, validation and the cached service

mod checks;
mod mapper;
mod service;
mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use checks::{check_invariants, config_warnings, vault_checks, MAX_MANAGEMENT_FEE_BPS, MAX_PERFORMANCE_FEE_BPS};
pub use mapper::{map_vault_data, total_debt_usage};
pub use service::{VaultCache, VaultService};
pub use types::{
    bps_to_percent_text, parse_vault_address, to_human_date_text, QueuePosition, Strategy,
    StrategyParams, Vault, MAX_BPS,
};
