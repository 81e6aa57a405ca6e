//! Index-service records and their normalized shape

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Raw record from `GET /vaults/all`.
///
/// Every field except the address is optional upstream; missing values
/// deserialize to defaults so one sparse record never fails the batch.
#[derive(Debug, Clone, Deserialize)]
pub struct VaultCatalogEntry {
    pub address: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub endorsed: bool,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(rename = "apiVersion", default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub emergency_shutdown: bool,
    #[serde(default)]
    pub token: Option<CatalogToken>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub tvl: Option<CatalogTvl>,
    #[serde(default)]
    pub strategies: Vec<CatalogStrategy>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogToken {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub decimals: u8,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogTvl {
    /// Decimal string in base units; some payloads send a bare JSON number
    #[serde(default)]
    pub total_assets: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogStrategy {
    pub address: String,
    #[serde(default)]
    pub name: String,
}

/// Underlying token reference carried onto the vault
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Token {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub icon: Option<String>,
}

/// Strategy reference as listed by the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyRef {
    pub address: Address,
    pub name: String,
}

/// Catalog entry reshaped into internal field names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedVaultRecord {
    pub address: Address,
    pub api_version: String,
    pub symbol: String,
    pub name: String,
    pub token: Token,
    pub icon: Option<String>,
    pub emergency_shutdown: bool,
    /// `tvl.total_assets` truncated to base units
    pub tvl: U256,
    pub strategies: Vec<StrategyRef>,
    /// Catalog fields that could not be parsed and were defaulted
    pub defaulted_fields: Vec<String>,
}
