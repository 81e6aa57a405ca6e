//! yvwatch - Yearn V2 vault data aggregation
//!
//! Combines the off-chain vault index with batched on-chain reads into
//! validated `Vault` entities, cached per allow-list.

pub mod catalog;
pub mod config;
pub mod error;
pub mod multicall;
pub mod vaults;

pub use config::Config;
pub use error::VaultError;
pub use vaults::{Strategy, Vault, VaultService};
