//! Catalog Filter/Normalizer
//!
//! Keeps endorsed V2 vaults on a supported API version, plus anything the
//! caller explicitly allow-lists, and reshapes them into `NormalizedVaultRecord`.

use alloy_primitives::{Address, U256};
use bigdecimal::BigDecimal;
use lazy_static::lazy_static;
use serde_json::Value;
use std::collections::HashSet;
use std::str::FromStr;
use tracing::{debug, warn};

use super::types::{
    CatalogToken, NormalizedVaultRecord, StrategyRef, Token, VaultCatalogEntry,
};

// ============================================
// FILTER CONSTANTS
// ============================================

/// Only V2 vaults expose the view methods the pipeline reads
pub const SUPPORTED_VAULT_TYPE: &str = "v2";

/// API versions below 0.3 predate the 0.3.2 view interface
const DEPRECATED_VERSION_PREFIX: &str = "0.2";

/// Decimal digits of U256::MAX
const MAX_U256_DIGITS: i64 = 78;

/// Vaults excluded while debugging data-loading issues.
/// Nothing bypasses this list, not even the allow-list.
const DEBUG_EXCLUDED: [&str; 0] = [];

lazy_static! {
    static ref DEBUG_EXCLUDED_VAULTS: HashSet<Address> = DEBUG_EXCLUDED
        .iter()
        .filter_map(|addr| Address::from_str(addr).ok())
        .collect();
}

// ============================================
// ALLOW-LIST
// ============================================

/// Normalized allow-list: parsed, sorted and de-duplicated.
///
/// Doubles as the cache key for full pipeline runs, so two lists naming the
/// same addresses in any order or case share one result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AllowList(Vec<Address>);

impl AllowList {
    pub fn new<S: AsRef<str>>(entries: &[S]) -> Self {
        let mut addresses: Vec<Address> = entries
            .iter()
            .filter_map(|raw| {
                let raw = raw.as_ref().trim();
                match Address::from_str(raw) {
                    Ok(addr) => Some(addr),
                    Err(e) => {
                        warn!("Ignoring allow-list entry {:?}: {}", raw, e);
                        None
                    }
                }
            })
            .collect();
        addresses.sort();
        addresses.dedup();
        Self(addresses)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.0.binary_search(address).is_ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================
// FILTERING
// ============================================

/// A version "fails validity" when either version field starts with 0.2
pub fn has_valid_version(entry: &VaultCatalogEntry) -> bool {
    let deprecated = |v: &Option<String>| {
        v.as_deref()
            .is_some_and(|v| v.starts_with(DEPRECATED_VERSION_PREFIX))
    };
    !deprecated(&entry.api_version) && !deprecated(&entry.version)
}

/// Filter and normalize the raw `/vaults/all` payload.
pub fn filter_and_normalize(raw: &[Value], allow_list: &AllowList) -> Vec<NormalizedVaultRecord> {
    filter_with_exclusions(raw, allow_list, &DEBUG_EXCLUDED_VAULTS)
}

pub(crate) fn filter_with_exclusions(
    raw: &[Value],
    allow_list: &AllowList,
    excluded: &HashSet<Address>,
) -> Vec<NormalizedVaultRecord> {
    raw.iter()
        .filter_map(|record| {
            let entry: VaultCatalogEntry = match serde_json::from_value(record.clone()) {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping malformed catalog record: {}", e);
                    return None;
                }
            };
            let address = match Address::from_str(entry.address.trim()) {
                Ok(addr) => addr,
                Err(_) => {
                    debug!("Skipping catalog record with bad address {:?}", entry.address);
                    return None;
                }
            };

            if excluded.contains(&address) {
                debug!("Vault {} is debug-excluded", address);
                return None;
            }

            let supported = entry.endorsed
                && entry.kind.eq_ignore_ascii_case(SUPPORTED_VAULT_TYPE)
                && has_valid_version(&entry);

            if supported || allow_list.contains(&address) {
                Some(normalize(entry, address))
            } else {
                None
            }
        })
        .collect()
}

fn normalize(entry: VaultCatalogEntry, address: Address) -> NormalizedVaultRecord {
    let mut defaulted_fields = Vec::new();

    let raw_tvl = entry.tvl.and_then(|tvl| tvl.total_assets);
    let tvl = match raw_tvl.as_ref().and_then(parse_total_assets) {
        Some(tvl) => tvl,
        None => {
            debug!("Vault {} has unusable tvl.total_assets {:?}", address, raw_tvl);
            defaulted_fields.push("tvl".to_string());
            U256::ZERO
        }
    };

    // First listing wins when the index repeats a strategy
    let mut seen = HashSet::new();
    let strategies = entry
        .strategies
        .into_iter()
        .filter_map(|strategy| match Address::from_str(strategy.address.trim()) {
            Ok(addr) if !seen.insert(addr) => {
                debug!("Vault {} lists strategy {} more than once", address, addr);
                None
            }
            Ok(addr) => Some(StrategyRef {
                address: addr,
                name: strategy.name,
            }),
            Err(_) => {
                debug!("Vault {} lists bad strategy address {:?}", address, strategy.address);
                None
            }
        })
        .collect();

    let name = if entry.display_name.is_empty() {
        entry.name
    } else {
        entry.display_name
    };

    NormalizedVaultRecord {
        address,
        api_version: entry.version.or(entry.api_version).unwrap_or_default(),
        symbol: entry.symbol,
        name,
        token: normalize_token(entry.token.unwrap_or_default()),
        icon: entry.icon,
        emergency_shutdown: entry.emergency_shutdown,
        tvl,
        strategies,
        defaulted_fields,
    }
}

fn normalize_token(token: CatalogToken) -> Token {
    Token {
        address: Address::from_str(token.address.trim()).unwrap_or(Address::ZERO),
        name: token.name,
        symbol: token.symbol,
        decimals: token.decimals,
        icon: token.icon,
    }
}

/// Parse a decimal TVL (string or number, possibly exponent notation),
/// truncated to zero fractional digits. Never routes through f64.
pub fn parse_total_assets(value: &Value) -> Option<U256> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    let decimal = BigDecimal::from_str(&text).ok()?;

    // value = mantissa × 10^-scale; size it before any rescaling so a huge
    // exponent cannot force a huge allocation
    let (mantissa, scale) = decimal.as_bigint_and_exponent();
    let digits = mantissa.to_string();
    if digits.starts_with('-') {
        return None;
    }
    let integer_digits = i64::try_from(digits.len()).ok()?.checked_sub(scale)?;
    if integer_digits > MAX_U256_DIGITS {
        return None;
    }
    if integer_digits <= 0 {
        return Some(U256::ZERO);
    }

    let integer = if scale <= 0 {
        format!("{}{}", digits, "0".repeat(scale.unsigned_abs() as usize))
    } else {
        digits[..integer_digits as usize].to_string()
    };
    U256::from_str_radix(&integer, 10).ok()
}

// ============================================
// TESTS
// ============================================
