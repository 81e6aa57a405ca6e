//! Vault catalog: index fetch, filtering and per-run lookup maps

mod filter;
mod index;
mod lookup;
mod types;

pub use filter::{filter_and_normalize, has_valid_version, parse_total_assets, AllowList, SUPPORTED_VAULT_TYPE};
pub use index::{HttpIndexClient, IndexSource, VAULTS_ALL_PATH};
pub use lookup::CatalogIndex;
pub use types::{
    CatalogStrategy, CatalogToken, CatalogTvl, NormalizedVaultRecord, StrategyRef, Token,
    VaultCatalogEntry,
};
