//! Validation layer
//!
//! Structural violations reject the vault (`VaultError::Invariant`).
//! Configuration smells are attached as warnings and never reject.

use alloy_primitives::{Address, U256};
use std::collections::HashSet;

use super::mapper::total_debt_usage;
use super::types::{Vault, MAX_BPS};
use crate::error::VaultError;

/// Management fee ceiling before a warning, in bps
pub const MAX_MANAGEMENT_FEE_BPS: u64 = 200;

/// Performance fee ceiling before a warning, in bps
pub const MAX_PERFORMANCE_FEE_BPS: u64 = 2_000;

fn invariant(vault: &Vault, reason: String) -> VaultError {
    VaultError::Invariant {
        address: vault.address.to_checksum(None),
        reason,
    }
}

/// Structural checks: any failure makes the vault unusable
pub fn check_invariants(vault: &Vault) -> Result<(), VaultError> {
    if vault.address == Address::ZERO {
        return Err(invariant(vault, "vault address is zero".to_string()));
    }

    let mut seen = HashSet::with_capacity(vault.strategies.len());
    for strategy in &vault.strategies {
        if strategy.address == Address::ZERO {
            return Err(invariant(vault, "strategy address is zero".to_string()));
        }
        if strategy.address == vault.address {
            return Err(invariant(vault, "vault lists itself as a strategy".to_string()));
        }
        if !seen.insert(strategy.address) {
            return Err(invariant(
                vault,
                format!("strategy {} listed more than once", strategy.address),
            ));
        }
        if strategy.vault != vault.address {
            return Err(invariant(
                vault,
                format!(
                    "strategy {} belongs to vault {}",
                    strategy.address, strategy.vault
                ),
            ));
        }
    }

    Ok(())
}

/// Non-fatal configuration review
pub fn config_warnings(vault: &Vault) -> Vec<String> {
    let mut warnings = Vec::new();

    for (role, address) in [
        ("governance", vault.governance),
        ("management", vault.management),
        ("guardian", vault.guardian),
        ("rewards", vault.rewards),
    ] {
        if address == Address::ZERO {
            warnings.push(format!("{} address is not set", role));
        }
    }

    if vault.management_fee > MAX_MANAGEMENT_FEE_BPS {
        warnings.push(format!(
            "management fee {} bps exceeds {} bps",
            vault.management_fee, MAX_MANAGEMENT_FEE_BPS
        ));
    }
    if vault.performance_fee > MAX_PERFORMANCE_FEE_BPS {
        warnings.push(format!(
            "performance fee {} bps exceeds {} bps",
            vault.performance_fee, MAX_PERFORMANCE_FEE_BPS
        ));
    }

    let allocated = total_debt_usage(&vault.strategies);
    if allocated > vault.debt_ratio {
        warnings.push(format!(
            "strategies allocate {} bps, vault debt ratio is {} bps",
            allocated, vault.debt_ratio
        ));
    }
    if allocated > U256::from(MAX_BPS) {
        warnings.push(format!("strategies allocate {} bps, above 100%", allocated));
    }

    for strategy in &vault.strategies {
        if !strategy.queue_position.is_queued() {
            warnings.push(format!(
                "strategy {} is not in the withdrawal queue",
                strategy.address
            ));
        }
        if !strategy.shared_with.is_empty() {
            let others: Vec<String> = strategy.shared_with.iter().map(|v| v.to_string()).collect();
            warnings.push(format!(
                "strategy {} is also listed by vault {}",
                strategy.address,
                others.join(", ")
            ));
        }
        if strategy.reported_vault != vault.address {
            warnings.push(format!(
                "strategy {} reports vault {}",
                strategy.address, strategy.reported_vault
            ));
        }
    }

    if vault.emergency_shutdown {
        warnings.push("emergency shutdown is active".to_string());
    }

    warnings
}

/// Validate an assembled vault and attach its configuration review.
pub fn vault_checks(mut vault: Vault) -> Result<Vault, VaultError> {
    check_invariants(&vault)?;

    let warnings = config_warnings(&vault);
    vault.config_ok = warnings.is_empty();
    vault.config_warnings = warnings;
    Ok(vault)
}
