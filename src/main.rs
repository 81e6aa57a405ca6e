//! yvwatch - Yearn V2 vault monitor
//!
//! Run with: cargo run -- list
//!           cargo run -- vault 0x19D3364A399d251E894aC732651be8B0E4e85001

use alloy_primitives::U256;
use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use console::style;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yvwatch::vaults::{bps_to_percent_text, Vault};
use yvwatch::{Config, VaultService};

#[derive(Parser)]
#[command(name = "yvwatch")]
#[command(about = "Aggregate Yearn V2 vault data from the index API and chain")]
struct Cli {
    /// TOML config file (defaults to environment / .env)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of the table view
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every endorsed vault, plus allow-listed extras
    List {
        /// Extra vault address to include (repeatable)
        #[arg(long = "allow")]
        allow: Vec<String>,
    },
    /// Show one vault by address
    Vault { address: String },
}

fn print_banner() {
    println!();
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!("{}", style(" 🏦 YVWATCH - Yearn V2 Vault Monitor").cyan().bold());
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!();
}

fn print_vault_row(vault: &Vault) {
    let status = if vault.config_ok {
        style("✓").green()
    } else {
        style("⚠").yellow()
    };
    println!(
        "{} {:<12} {:<8} {}  tvl={}  debt={}  strategies={}",
        status,
        vault.symbol,
        vault.api_version,
        vault.address,
        vault.tvl,
        vault.debt_usage_percent_text(),
        vault.strategies.len()
    );
}

fn print_vault_detail(vault: &Vault) {
    println!("{}", style(format!("{} ({})", vault.name, vault.symbol)).bold());
    println!("  Address:          {}", vault.address);
    println!("  API version:      {}", vault.api_version);
    println!("  Token:            {} {}", vault.token.symbol, vault.token.address);
    println!("  TVL:              {}", vault.tvl);
    println!("  Total assets:     {}", vault.total_assets);
    println!("  Total debt:       {}", vault.total_debt);
    println!("  Deposit limit:    {}", vault.deposit_limit);
    println!(
        "  Fees:             mgmt {} / perf {}",
        bps_to_percent_text(U256::from(vault.management_fee)),
        bps_to_percent_text(U256::from(vault.performance_fee))
    );
    println!("  Governance:       {}", vault.governance);
    println!("  Management:       {}", vault.management);
    println!("  Guardian:         {}", vault.guardian);
    println!("  Last report:      {}", vault.last_report_text);
    println!("  Debt usage:       {}", vault.debt_usage_percent_text());
    println!();

    println!("  {}", style("Strategies").blue().bold());
    for strategy in &vault.strategies {
        println!(
            "    {:>3} {} {:<40} {}  last report {}",
            strategy.queue_position.to_string(),
            strategy.address,
            strategy.name,
            bps_to_percent_text(strategy.params.debt_ratio),
            strategy.last_report_text
        );
    }

    if !vault.config_warnings.is_empty() {
        println!();
        println!("  {}", style("Warnings").yellow().bold());
        for warning in &vault.config_warnings {
            println!("    ⚠ {}", warning);
        }
    }
    if !vault.defaulted_fields.is_empty() {
        println!();
        println!(
            "  {} {}",
            style("Defaulted:").dim(),
            vault.defaulted_fields.join(", ")
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("yvwatch=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        return Err(e);
    }

    if !cli.json {
        print_banner();
        config.print_summary();
        println!();
    }

    let service = VaultService::from_config(&config)?;
    let start = Instant::now();

    match cli.command {
        Commands::List { allow } => {
            let mut allow_list = config.allow_list.clone();
            allow_list.extend(allow);

            let vaults = service.fetch_all_vaults(&allow_list).await?;
            info!("Fetched {} vaults in {:?}", vaults.len(), start.elapsed());

            if cli.json {
                println!("{}", serde_json::to_string_pretty(vaults.as_ref())?);
            } else {
                for vault in vaults.iter() {
                    print_vault_row(vault);
                }
                let flagged = vaults.iter().filter(|v| !v.config_ok).count();
                println!();
                println!(
                    "{} {} vaults, {} with warnings",
                    style("✓").green(),
                    vaults.len(),
                    flagged
                );
            }
        }
        Commands::Vault { address } => {
            let vault = service.fetch_vault_by_address(&address).await?;
            info!("Fetched vault {} in {:?}", vault.address, start.elapsed());

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&vault)?);
            } else {
                print_vault_detail(&vault);
            }
        }
    }

    Ok(())
}
