//! Index Fetcher - vault catalog from the off-chain index API

use reqwest::Client;
use serde_json::Value;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::error::VaultError;

/// Path of the full catalog below the index base URL
pub const VAULTS_ALL_PATH: &str = "/vaults/all";

/// Source of raw catalog records.
pub trait IndexSource: Send + Sync {
    /// Fetch every catalog record, loosely typed.
    fn fetch_catalog(&self) -> impl Future<Output = Result<Vec<Value>, VaultError>> + Send;
}

// ============================================
// HTTP INDEX CLIENT
// ============================================

pub struct HttpIndexClient {
    http_client: Client,
    base_url: String,
}

impl HttpIndexClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, VaultError> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    pub fn catalog_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), VAULTS_ALL_PATH)
    }
}

impl IndexSource for HttpIndexClient {
    async fn fetch_catalog(&self) -> Result<Vec<Value>, VaultError> {
        let url = self.catalog_url();
        let start = Instant::now();
        debug!("GET {}", url);

        let body: Value = self
            .http_client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let records = into_records(body)?;
        info!(
            "📚 Index returned {} catalog records in {:?}",
            records.len(),
            start.elapsed()
        );
        Ok(records)
    }
}

/// The catalog endpoint must return a JSON array.
fn into_records(body: Value) -> Result<Vec<Value>, VaultError> {
    match body {
        Value::Array(records) => Ok(records),
        other => Err(VaultError::Index(format!(
            "expected a JSON array of vaults, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
