//! Vault and strategy domain entities
//!
//! All on-chain amounts are fixed-point integers (`U256`) and serialize as
//! decimal strings; nothing here is ever converted to floating point.

use alloy_primitives::{Address, U256};
use chrono::DateTime;
use serde::Serialize;

use crate::catalog::Token;
use crate::error::VaultError;

/// Basis-point denominator (100%)
pub const MAX_BPS: u64 = 10_000;

// ============================================
// QUEUE POSITION
// ============================================

/// Position in the vault's withdrawal queue.
/// `NotQueued` orders after every queued position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum QueuePosition {
    Queued(usize),
    NotQueued,
}

impl QueuePosition {
    pub fn is_queued(&self) -> bool {
        matches!(self, QueuePosition::Queued(_))
    }
}

impl std::fmt::Display for QueuePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueuePosition::Queued(i) => write!(f, "#{}", i),
            QueuePosition::NotQueued => write!(f, "-"),
        }
    }
}

// ============================================
// STRATEGY
// ============================================

/// `strategies(address)` as reported by the owning vault
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StrategyParams {
    pub performance_fee: u64,
    pub activation: u64,
    #[serde(serialize_with = "u256_decimal")]
    pub debt_ratio: U256,
    #[serde(serialize_with = "u256_decimal")]
    pub min_debt_per_harvest: U256,
    #[serde(serialize_with = "u256_decimal")]
    pub max_debt_per_harvest: U256,
    pub last_report: u64,
    #[serde(serialize_with = "u256_decimal")]
    pub total_debt: U256,
    #[serde(serialize_with = "u256_decimal")]
    pub total_gain: U256,
    #[serde(serialize_with = "u256_decimal")]
    pub total_loss: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub address: Address,
    /// Owning vault: the vault whose strategy list this entry came from
    pub vault: Address,
    /// Other catalog vaults that list the same strategy
    pub shared_with: Vec<Address>,
    pub queue_position: QueuePosition,
    pub name: String,
    pub api_version: String,
    pub strategist: Address,
    pub keeper: Address,
    pub rewards: Address,
    /// `vault()` as reported by the strategy contract itself
    pub reported_vault: Address,
    pub emergency_exit: bool,
    pub is_active: bool,
    #[serde(serialize_with = "u256_decimal")]
    pub estimated_total_assets: U256,
    pub params: StrategyParams,
    /// Share of the vault's capacity allocated to this strategy, in bps
    pub debt_usage_bps: u64,
    pub last_report_text: String,
    /// Fields substituted with defaults after a failed or missing call
    pub defaulted_fields: Vec<String>,
}

// ============================================
// VAULT
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vault {
    pub address: Address,
    pub api_version: String,
    pub symbol: String,
    pub name: String,
    pub token: Token,
    pub icon: Option<String>,
    pub emergency_shutdown: bool,
    /// Catalog TVL (`tvl.total_assets`) in token base units
    #[serde(serialize_with = "u256_decimal")]
    pub tvl: U256,

    // ========== On-chain views ==========
    pub management: Address,
    pub management_fee: u64,
    pub performance_fee: u64,
    pub governance: Address,
    pub guardian: Address,
    pub rewards: Address,
    #[serde(serialize_with = "u256_decimal")]
    pub deposit_limit: U256,
    #[serde(serialize_with = "u256_decimal")]
    pub total_assets: U256,
    #[serde(serialize_with = "u256_decimal")]
    pub debt_ratio: U256,
    #[serde(serialize_with = "u256_decimal")]
    pub total_debt: U256,
    pub last_report: u64,
    pub last_report_text: String,

    // ========== Strategies & derived ==========
    /// Ordered by queue position; unqueued strategies last
    pub strategies: Vec<Strategy>,
    /// Sum of strategy debt ratios, in bps
    #[serde(serialize_with = "u256_decimal")]
    pub debt_usage: U256,
    pub config_ok: bool,
    pub config_warnings: Vec<String>,
    pub defaulted_fields: Vec<String>,
}

impl Vault {
    pub fn strategy(&self, address: &Address) -> Option<&Strategy> {
        self.strategies.iter().find(|s| s.address == *address)
    }

    pub fn debt_usage_percent_text(&self) -> String {
        bps_to_percent_text(self.debt_usage)
    }
}

// ============================================
// HELPERS
// ============================================

/// Parse a caller-supplied vault address.
///
/// Requires a `0x` prefix and 40 hex digits; mixed-case input must carry a
/// valid EIP-55 checksum, all-lower and all-upper input is accepted as is.
pub fn parse_vault_address(raw: &str) -> Result<Address, VaultError> {
    let invalid = || VaultError::InvalidAddress(raw.to_string());

    let hex = raw.strip_prefix("0x").ok_or_else(invalid)?;
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(raw, None).map_err(|_| invalid())
    } else {
        raw.parse::<Address>().map_err(|_| invalid())
    }
}

/// Human-readable UTC date for a unix timestamp (seconds)
pub fn to_human_date_text(timestamp: u64) -> String {
    if timestamp == 0 {
        return "never".to_string();
    }
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
        .unwrap_or_else(|| "invalid date".to_string())
}

/// Render basis points as a percentage with two decimals, integer math only
pub fn bps_to_percent_text(bps: U256) -> String {
    let hundred = U256::from(100u64);
    let whole = bps / hundred;
    let frac = bps % hundred;
    format!("{}.{:02}%", whole, frac.to::<u64>())
}

fn u256_decimal<S: serde::Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const YVDAI: &str = "0x19D3364A399d251E894aC732651be8B0E4e85001";

    #[test]
    fn test_queue_position_order() {
        let mut positions = vec![
            QueuePosition::NotQueued,
            QueuePosition::Queued(2),
            QueuePosition::Queued(0),
        ];
        positions.sort();
        assert_eq!(
            positions,
            vec![
                QueuePosition::Queued(0),
                QueuePosition::Queued(2),
                QueuePosition::NotQueued
            ]
        );
    }

    #[test]
    fn test_parse_vault_address() {
        let addr = parse_vault_address(&YVDAI.to_lowercase()).unwrap();
        let checksummed = addr.to_checksum(None);

        assert_eq!(parse_vault_address(&checksummed).unwrap(), addr);
        assert_eq!(parse_vault_address(&YVDAI.to_uppercase().replacen("0X", "0x", 1)).unwrap(), addr);

        for bad in ["not-an-address", "", "0x1234", "19d3364a399d251e894ac732651be8b0e4e85001"] {
            assert!(matches!(parse_vault_address(bad), Err(VaultError::InvalidAddress(_))), "{}", bad);
        }
    }

    #[test]
    fn test_parse_rejects_bad_checksum() {
        let addr = parse_vault_address(&YVDAI.to_lowercase()).unwrap();
        let checksummed = addr.to_checksum(None);
        // Flip the case of the first letter digit to break the checksum
        let pos = checksummed[2..]
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap()
            + 2;
        let mut broken: Vec<char> = checksummed.chars().collect();
        broken[pos] = if broken[pos].is_ascii_uppercase() {
            broken[pos].to_ascii_lowercase()
        } else {
            broken[pos].to_ascii_uppercase()
        };
        let broken: String = broken.into_iter().collect();

        assert!(parse_vault_address(&broken).is_err());
    }

    #[test]
    fn test_human_date_text() {
        assert_eq!(to_human_date_text(0), "never");
        assert_eq!(to_human_date_text(1_600_000_000), "Sun, 13 Sep 2020 12:26:40 GMT");
        assert_eq!(to_human_date_text(u64::MAX), "invalid date");
    }

    #[test]
    fn test_bps_text() {
        assert_eq!(bps_to_percent_text(U256::from(10_000u64)), "100.00%");
        assert_eq!(bps_to_percent_text(U256::from(6_005u64)), "60.05%");
        assert_eq!(bps_to_percent_text(U256::ZERO), "0.00%");
    }
}
