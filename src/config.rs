//! Runtime configuration for the vault pipeline
//!
//! Loaded from environment variables (and `.env`) or from a TOML file.
//! Every field has a mainnet default so a bare environment still works.

use alloy_primitives::Address;
use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

// ============================================
// DEFAULTS
// ============================================

const DEFAULT_RPC_URL: &str = "https://eth.llamarpc.com";

const DEFAULT_INDEX_API_URL: &str = "https://api.yearn.finance/v1/chains/1";

/// Multicall3 (same address on all EVM chains)
const DEFAULT_MULTICALL_ADDRESS: &str = "0xcA11bde05977b3631167028862bE2a173976CA11";

/// Yearn strategies helper (mainnet)
const DEFAULT_STRATEGIES_HELPER_ADDRESS: &str = "0xae813841436fe29b95a14AC701AFb1502C4CB789";

const DEFAULT_MAX_CALLS_PER_BATCH: usize = 100;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

// ============================================
// MAIN CONFIGURATION
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // ========== Network Settings ==========
    /// RPC endpoint used for the batched eth_calls
    pub rpc_url: String,

    /// Chain ID (1 = Ethereum Mainnet)
    pub chain_id: u64,

    // ========== Contracts ==========
    /// Multicall3 deployment used to aggregate view calls
    pub multicall_address: String,

    /// Helper contract exposing `assetStrategiesAddresses(vault)`
    pub strategies_helper_address: String,

    // ========== Index Service ==========
    /// Base URL of the vault index API (`/vaults/all` is appended)
    pub index_api_url: String,

    /// HTTP timeout for the index request
    pub request_timeout_secs: u64,

    // ========== Batching ==========
    /// Maximum calls per aggregate3 round-trip (gas limit guard)
    pub max_calls_per_batch: usize,

    // ========== Catalog ==========
    /// Experimental vaults to include even when not endorsed
    pub allow_list: Vec<String>,

    // ========== Cache ==========
    /// Optional TTL for cached pipeline results; `None` keeps them for the process lifetime
    pub cache_ttl_secs: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Ok(Self {
            rpc_url: env::var("RPC_URL").unwrap_or(defaults.rpc_url),
            chain_id: env::var("CHAIN_ID")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.chain_id),
            multicall_address: env::var("MULTICALL_ADDRESS")
                .unwrap_or(defaults.multicall_address),
            strategies_helper_address: env::var("STRATEGIES_HELPER_ADDRESS")
                .unwrap_or(defaults.strategies_helper_address),
            index_api_url: env::var("INDEX_API_URL").unwrap_or(defaults.index_api_url),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
            max_calls_per_batch: env::var("MAX_CALLS_PER_BATCH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_calls_per_batch),
            allow_list: env::var("ALLOW_LIST")
                .map(|s| Self::split_list(&s))
                .unwrap_or_default(),
            cache_ttl_secs: env::var("CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok()),
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    fn split_list(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    /// Validate configuration before building the pipeline
    pub fn validate(&self) -> Result<()> {
        if self.rpc_url.is_empty() || self.rpc_url.contains("YOUR_API_KEY") {
            return Err(eyre!("Invalid RPC_URL - please set a valid Alchemy/Infura URL"));
        }
        if self.index_api_url.is_empty() {
            return Err(eyre!("INDEX_API_URL must not be empty"));
        }
        if self.max_calls_per_batch == 0 {
            return Err(eyre!("MAX_CALLS_PER_BATCH must be at least 1"));
        }
        if self.request_timeout_secs == 0 {
            return Err(eyre!("REQUEST_TIMEOUT_SECS must be at least 1"));
        }

        self.multicall()?;
        self.strategies_helper()?;

        Ok(())
    }

    /// Multicall3 address as `Address`
    pub fn multicall(&self) -> Result<Address> {
        Address::from_str(&self.multicall_address)
            .map_err(|e| eyre!("Invalid MULTICALL_ADDRESS {}: {}", self.multicall_address, e))
    }

    /// Strategies helper address as `Address`
    pub fn strategies_helper(&self) -> Result<Address> {
        Address::from_str(&self.strategies_helper_address).map_err(|e| {
            eyre!(
                "Invalid STRATEGIES_HELPER_ADDRESS {}: {}",
                self.strategies_helper_address,
                e
            )
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        let rpc_display = truncate_display(&self.rpc_url, 40);
        let ttl_display = match self.cache_ttl_secs {
            Some(secs) => format!("{}s", secs),
            None => "process lifetime".to_string(),
        };

        println!("╔════════════════════════════════════════════════════════════╗");
        println!("║              YVWATCH - CONFIGURATION                       ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ RPC:               {:<40} ║", rpc_display);
        println!("║ Chain ID:          {:<40} ║", self.chain_id);
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ CONTRACTS                                                  ║");
        println!("║ • Multicall3:      {:<40} ║", &self.multicall_address);
        println!("║ • Helper:          {:<40} ║", &self.strategies_helper_address);
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ INDEX & BATCHING                                           ║");
        println!("║ • Index API:       {:<40} ║", &self.index_api_url);
        println!("║ • Timeout:         {:<40} ║", format!("{}s", self.request_timeout_secs));
        println!("║ • Calls/batch:     {:<40} ║", self.max_calls_per_batch);
        println!("║ • Allow-list:      {:<40} ║", self.allow_list.len());
        println!("║ • Cache TTL:       {:<40} ║", ttl_display);
        println!("╚════════════════════════════════════════════════════════════╝");
    }
}

/// Shorten for the summary box, on char boundaries
fn truncate_display(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            chain_id: 1,
            multicall_address: DEFAULT_MULTICALL_ADDRESS.to_string(),
            strategies_helper_address: DEFAULT_STRATEGIES_HELPER_ADDRESS.to_string(),
            index_api_url: DEFAULT_INDEX_API_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_calls_per_batch: DEFAULT_MAX_CALLS_PER_BATCH,
            allow_list: vec![],
            cache_ttl_secs: None,
        }
    }
}

// ============================================
// TESTS
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.chain_id, 1);
        assert_eq!(config.max_calls_per_batch, 100);
        assert!(config.cache_ttl().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.max_calls_per_batch = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.multicall_address = "0x1234".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.rpc_url = "https://eth-mainnet.g.alchemy.com/v2/YOUR_API_KEY".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_truncate_display_non_ascii() {
        let url = format!("https://rpc.example/{}", "é".repeat(40));
        let shown = truncate_display(&url, 40);
        assert_eq!(shown.chars().count(), 40);
        assert!(shown.ends_with("..."));
        assert_eq!(truncate_display("http://localhost:8545", 40), "http://localhost:8545");

        let config = Config {
            rpc_url: url,
            ..Config::default()
        };
        config.print_summary();
    }

    #[test]
    fn test_split_list() {
        let list = Config::split_list(" 0xabc, ,0xdef ,");
        assert_eq!(list, vec!["0xabc".to_string(), "0xdef".to_string()]);
    }

    #[test]
    fn test_toml_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            rpc_url = "http://localhost:8545"
            cache_ttl_secs = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.rpc_url, "http://localhost:8545");
        assert_eq!(config.cache_ttl(), Some(Duration::from_secs(60)));
        assert_eq!(config.index_api_url, DEFAULT_INDEX_API_URL);
    }
}
