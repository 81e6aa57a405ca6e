//! Diagnostic tool - Check configuration and upstream reachability
//!
//! Run with: cargo run --bin diagnose

use alloy_provider::{Provider, ProviderBuilder};
use color_eyre::eyre::Result;
use console::style;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yvwatch::catalog::{filter_and_normalize, AllowList, HttpIndexClient, IndexSource};
use yvwatch::Config;

fn section(title: &str) {
    println!("\n═══════════════════════════════════════════════════");
    println!("  {}", title);
    println!("═══════════════════════════════════════════════════\n");
}

fn ok(label: &str, detail: String) {
    println!("  {} {:<14} {}", style("✅").green(), label, detail);
}

fn fail(label: &str, detail: String) {
    println!("  {} {:<14} {}", style("❌").red(), label, detail);
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("yvwatch=warn".parse()?),
        )
        .init();

    println!("🔍 YVWATCH DIAGNOSTIC CHECK");

    let config = Config::from_env()?;

    section("CONFIGURATION");
    config.print_summary();
    match config.validate() {
        Ok(()) => ok("Config", "valid".to_string()),
        Err(e) => {
            fail("Config", e.to_string());
            return Ok(());
        }
    }

    section("INDEX SERVICE");
    let client = HttpIndexClient::new(config.index_api_url.clone(), config.request_timeout())?;
    let start = Instant::now();
    match client.fetch_catalog().await {
        Ok(records) => {
            let kept = filter_and_normalize(&records, &AllowList::new(&config.allow_list));
            ok(
                "Catalog",
                format!(
                    "{} records, {} pass the filter ({:?})",
                    records.len(),
                    kept.len(),
                    start.elapsed()
                ),
            );
        }
        Err(e) => fail("Catalog", format!("{} ({})", e, client.catalog_url())),
    }

    section("RPC");
    let start = Instant::now();
    let url: reqwest::Url = config.rpc_url.parse()?;
    let provider = ProviderBuilder::new().connect_http(url);
    match provider.get_block_number().await {
        Ok(block) => ok("Block", format!("{} ({:?})", block, start.elapsed())),
        Err(e) => fail("Block", e.to_string()),
    }
    match provider.get_code_at(config.multicall()?).await {
        Ok(code) if !code.is_empty() => ok("Multicall3", format!("{} bytes of code", code.len())),
        Ok(_) => fail("Multicall3", "no code at configured address".to_string()),
        Err(e) => fail("Multicall3", e.to_string()),
    }
    match provider.get_code_at(config.strategies_helper()?).await {
        Ok(code) if !code.is_empty() => ok("Helper", format!("{} bytes of code", code.len())),
        Ok(_) => fail("Helper", "no code at configured address".to_string()),
        Err(e) => fail("Helper", e.to_string()),
    }

    println!("\n✅ Diagnostic complete!\n");
    Ok(())
}
