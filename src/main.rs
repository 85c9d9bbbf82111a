use allocator::AllocationBot;
use anyhow::Context;
use chrono::SecondsFormat;
use clap::{Parser, Subcommand};
use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL};
use configuration::{LogFormat, Settings, init_tracing, load_config};
use core_types::{Address, bps_of};
use performance::{InMemoryPerformanceLedger, PerformanceLedger, PerformanceReport};
use std::path::PathBuf;
use std::sync::Arc;
use token::TokenLedger;
use vault::{Vault, build_vault};

/// The account the `simulate` command deposits from and withdraws to.
const DEMO_DEPOSITOR: u64 = 0xD0;

/// The main entry point for the Strata vault tooling.
fn main() {
    // A missing .env file is fine; it only carries STRATA__* overrides.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Operator tooling for a multi-strategy yield vault.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Overrides the configured log level (e.g. "debug", "vault=trace").
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Overrides the configured log format.
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the vault from a config file and print its allocation table.
    Inspect(InspectArgs),
    /// Run a deposit / rebalance / yield / withdraw cycle against a fresh vault.
    Simulate(SimulateArgs),
}

#[derive(Parser)]
struct InspectArgs {
    /// Path to the vault configuration file.
    #[arg(long, default_value = "vault.toml")]
    config: PathBuf,
}

#[derive(Parser)]
struct SimulateArgs {
    /// Path to the vault configuration file.
    #[arg(long, default_value = "vault.toml")]
    config: PathBuf,

    /// Amount of the underlying asset to deposit.
    #[arg(long)]
    deposit: u64,

    /// Yield accrued by every strategy after the rebalance, in basis points.
    #[arg(long, default_value_t = 0)]
    yield_bps: u16,

    /// Amount of the underlying asset to withdraw at the end (capped at the maximum).
    #[arg(long, default_value_t = 0)]
    withdraw: u64,

    /// Also print the final strategy views as JSON and the event log as JSON lines.
    #[arg(long)]
    json: bool,
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = match &cli.command {
        Commands::Inspect(args) => &args.config,
        Commands::Simulate(args) => &args.config,
    };
    let mut settings = load_config(config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    if let Some(level) = &cli.log_level {
        settings.logging.level = level.clone();
    }
    if let Some(format) = cli.log_format {
        settings.logging.format = format;
    }
    // Held until exit so buffered file logs are flushed.
    let _guard = init_tracing(&settings.logging)?;
    tracing::info!(config = %config_path.display(), "Configuration loaded.");

    match &cli.command {
        Commands::Inspect(_) => handle_inspect(&settings),
        Commands::Simulate(args) => handle_simulate(&settings, args),
    }
}

// ==============================================================================
// Inspect Command Logic
// ==============================================================================

fn handle_inspect(settings: &Settings) -> anyhow::Result<()> {
    let vault = build_vault(settings)?;
    let assets = TokenLedger::new(vault.asset());

    println!("Vault {} over asset {}", vault.address(), vault.asset());
    println!(
        "Owner: {}  Allocation bot: {}  Strategy manager: {}",
        vault.roles().owner,
        display_optional(vault.roles().allocation_bot),
        display_optional(vault.roles().strategy_manager),
    );
    println!(
        "Multi-strategy mode: {}  Paused: {}",
        vault.multi_strategy_enabled(),
        vault.is_paused()
    );
    println!("{}", allocation_table(&vault, &assets)?);
    Ok(())
}

// ==============================================================================
// Simulate Command Logic
// ==============================================================================

fn handle_simulate(settings: &Settings, args: &SimulateArgs) -> anyhow::Result<()> {
    let mut vault = build_vault(settings)?;
    let mut assets = TokenLedger::new(vault.asset());
    let owner = settings.vault.owner;

    let ledger = Arc::new(InMemoryPerformanceLedger::new());
    let sink: Arc<dyn PerformanceLedger> = ledger.clone();
    vault.set_performance_ledger(owner, Some(sink))?;

    // --- 1. Deposit ---
    let depositor = Address::from_low_u64(DEMO_DEPOSITOR);
    let amount = u128::from(args.deposit);
    assets.mint(&depositor, amount)?;
    let shares = vault.deposit(&mut assets, depositor, amount, depositor)?;
    println!("Deposited {} assets for {} shares.", amount, shares);

    // --- 2. Rebalance ---
    let bot_address = settings.vault.allocation_bot.unwrap_or(owner);
    let bot = AllocationBot::new(bot_address, settings.allocator.clone())?;
    match bot.run(&mut vault, &mut assets)? {
        Some(_) => println!("Allocation bot rebalanced the vault."),
        None => println!("Allocation bot had nothing to do."),
    }

    // --- 3. Accrue yield and sync ---
    if args.yield_bps > 0 {
        for view in vault.strategy_views(&assets)? {
            let accrued = bps_of(view.live_balance, args.yield_bps)?;
            if accrued > 0 {
                assets.mint(&view.strategy, accrued)?;
            }
        }
        let reconciliations = vault.sync_strategy_balances(&assets)?;
        let gained: u128 = reconciliations.iter().map(|r| r.gain()).sum();
        println!("Strategies earned {} assets of yield.", gained);
    }

    // --- 4. Withdraw ---
    let requested = u128::from(args.withdraw).min(vault.max_withdraw(&assets, &depositor)?);
    if requested > 0 {
        let burned = vault
            .withdraw(&mut assets, depositor, requested, depositor, depositor)
            .context("withdrawal failed")?;
        println!("Withdrew {} assets for {} shares.", requested, burned);
    }

    // --- 5. Report ---
    println!(
        "Total assets: {}  Idle: {}  Supply: {}  Share price: {}",
        vault.total_assets(&assets)?,
        vault.idle_balance(&assets),
        vault.total_supply(),
        vault.share_price(&assets)?.round_dp(6),
    );
    println!("{}", allocation_table(&vault, &assets)?);
    println!("{}", performance_table(&ledger)?);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&vault.strategy_views(&assets)?)?);
        print!("{}", vault.events().to_json_lines()?);
    }
    Ok(())
}

// ==============================================================================
// Rendering
// ==============================================================================

fn allocation_table(vault: &Vault, assets: &TokenLedger) -> anyhow::Result<Table> {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Strategy", "Weight (bps)", "Tracked", "Live", "Last synced"]);

    let views = vault.strategy_views(assets)?;
    for (view, entry) in views.iter().zip(vault.strategies()) {
        let last_synced = entry
            .last_synced_at
            .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_else(|| "never".to_string());
        table.add_row(vec![
            Cell::new(view.strategy),
            Cell::new(view.target_weight_bps),
            Cell::new(view.tracked_balance),
            Cell::new(view.live_balance),
            Cell::new(last_synced),
        ]);
    }
    if let Some(legacy) = vault.legacy_strategy() {
        table.add_row(vec![
            Cell::new(format!("{} (single)", legacy.address())),
            Cell::new(legacy.target_weight_bps),
            Cell::new(legacy.tracked_balance),
            Cell::new(legacy.strategy.total_assets(assets)?),
            Cell::new("-"),
        ]);
    }
    Ok(table)
}

fn performance_table(ledger: &InMemoryPerformanceLedger) -> anyhow::Result<Table> {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Strategy", "Deposited", "Withdrawn", "Net yield", "Yield %"]);

    for (strategy, record) in ledger.records() {
        let report = PerformanceReport::from_record(strategy, &record)?;
        let yield_pct = report
            .yield_pct
            .map(|pct| pct.round_dp(4).to_string())
            .unwrap_or_else(|| "n/a".to_string());
        table.add_row(vec![
            Cell::new(report.strategy),
            Cell::new(report.total_deposited),
            Cell::new(report.total_withdrawn),
            Cell::new(report.net_yield),
            Cell::new(yield_pct),
        ]);
    }
    Ok(table)
}

fn display_optional(address: Option<Address>) -> String {
    address.map_or_else(|| "-".to_string(), |a| a.to_string())
}
