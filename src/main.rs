use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

mod cli;

use cli::Cli;
use cli::commands::Commands;
use loathing::coinmaster::{CoinmasterProtocol, CoinmasterRegistry};
use loathing::config::Config;
use loathing::executor::Action;
use loathing::parser::parse_block;

fn setup_logging(log_level: Option<&str>) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("loathing")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("loathing.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // Configured level first so RUST_LOG directives override it
    let mut builder = env_logger::Builder::new();
    if let Some(level) = log_level {
        builder.parse_filters(level);
    }
    builder
        .parse_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Parse { file, json } => handle_parse_command(file, *json),
        Commands::Merchants => handle_merchants_command(config),
        Commands::Quote {
            merchant,
            item_id,
            quantity,
            balance,
        } => handle_quote_command(config, merchant, *item_id, *quantity, balance.as_deref()),
        Commands::Config => handle_config_command(config),
    }
}

fn load_registry(config: &Config) -> Result<CoinmasterRegistry> {
    CoinmasterRegistry::load(config.data.coinmasters.as_deref()).context("Failed to load merchant table")
}

fn handle_parse_command(file: &Path, json: bool) -> Result<()> {
    info!("Parsing response file: {}", file.display());
    let text = fs::read_to_string(file).context(format!("Failed to read {}", file.display()))?;
    let parse = parse_block(&text);

    if json {
        println!("{}", serde_json::to_string_pretty(&parse).context("Failed to serialize parse")?);
        return Ok(());
    }

    if parse.results.is_empty() {
        println!("{}", "No results parsed".yellow());
    }
    for result in &parse.results {
        let line = result.to_string();
        if result.count() < 0 {
            println!("  {}", line.red());
        } else {
            println!("  {}", line.green());
        }
    }
    println!("{} {}", "Had results:".cyan(), parse.had_results);
    if parse.familiar_gained {
        println!("{}", "Familiar gained a pound".cyan());
    }
    Ok(())
}

fn handle_merchants_command(config: &Config) -> Result<()> {
    let registry = load_registry(config)?;
    info!("Listing {} merchants", registry.len());

    for merchant in registry.merchants() {
        println!("{} ({})", merchant.name.bold(), merchant.path);
        let protocol = CoinmasterProtocol::new(merchant.clone());
        for item in &merchant.items {
            let costs = protocol
                .item_costs(item.id)
                .unwrap_or_default()
                .iter()
                .map(|cost| cost.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            println!("  {:>5}  {}  {}", item.id, item.name, costs.dimmed());
        }
    }
    Ok(())
}

fn handle_quote_command(
    config: &Config,
    merchant: &str,
    item_id: u32,
    quantity: i64,
    balance_file: Option<&Path>,
) -> Result<()> {
    let registry = load_registry(config)?;
    let merchant_config = registry
        .get(merchant)
        .ok_or_else(|| eyre!("Unknown merchant: {}", merchant))?;
    let protocol = CoinmasterProtocol::new(merchant_config);
    let purchase = protocol.build_purchase(item_id, quantity)?;

    println!("{} {}", "Purchase:".green(), purchase.describe());
    println!("{} {}", "Request:".cyan(), purchase.request().to_url());
    for delta in purchase.post_condition() {
        println!("  {}", delta);
    }

    if let Some(path) = balance_file {
        let page = fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
        let token = &protocol.config().token;
        match protocol.parse_balance(&page) {
            Some(balance) => {
                println!("{} {} {}", "Balance:".cyan(), balance, token);
                let needed: i64 = purchase
                    .costs()
                    .iter()
                    .filter(|cost| &cost.name == token)
                    .map(|cost| cost.count())
                    .sum();
                if needed > balance {
                    println!("{}", format!("Not enough {} ({} needed)", token, needed).red());
                }
            }
            None => println!("{}", format!("No {} balance found on page", token).yellow()),
        }
    }
    Ok(())
}

fn handle_config_command(config: &Config) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("Failed to serialize config")?;
    print!("{}", yaml);
    Ok(())
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration; it carries the log level
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(config.log_level.as_deref()).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).context("Application failed")?;

    Ok(())
}
