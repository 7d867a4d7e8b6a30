//! Binary entrypoint for the Shopkeep CLI.
//!
//! Commands:
//! - `init` - write a starter `config.toml` and create the data directory
//! - `status [--json]` - open the ledger and print account count and money supply
//! - `accounts` - list every ledger account with its balance
//!
//! The economy and sign shop logic lives in the library crate: `shopkeep::`.
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;

use shopkeep::config::Config;
use shopkeep::economy::{format_money, AccountRecord, SledRecordStore, BALANCE_FIELD};

#[derive(Parser)]
#[command(name = "shopkeep")]
#[command(about = "Player economy ledger and sign shops for game servers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Show ledger statistics
    Status {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// List ledger accounts and balances
    Accounts,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            init_logging(&None, cli.verbose);
            info!("Initializing new Shopkeep configuration");
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
            let config = Config::load(&cli.config).await?;
            tokio::fs::create_dir_all(&config.storage.data_dir).await?;
            info!("Data directory ready at {}", config.storage.data_dir);
        }
        Commands::Status { json } => {
            let config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            let ledger = SledRecordStore::open(config.storage.ledger_path())?;
            let accounts = ledger.list_accounts()?;
            let supply: i128 = accounts.iter().map(|a| i128::from(balance_of(a))).sum();
            if json {
                let payload = serde_json::json!({
                    "ledger": config.storage.ledger_path().display().to_string(),
                    "economy_enabled": config.economy.enabled,
                    "accounts": accounts.len(),
                    "money_supply": supply.to_string(),
                    "starting_balance": config.economy.starting_balance,
                });
                println!("{}", payload);
            } else {
                println!("Shopkeep v{}", env!("CARGO_PKG_VERSION"));
                println!("Ledger: {}", config.storage.ledger_path().display());
                println!(
                    "Economy: {}",
                    if config.economy.enabled { "enabled" } else { "disabled" }
                );
                println!("Accounts: {}", accounts.len());
                println!("Money supply: {}{}", config.economy.currency_symbol, supply);
            }
        }
        Commands::Accounts => {
            let config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            let ledger = SledRecordStore::open(config.storage.ledger_path())?;
            let mut accounts = ledger.list_accounts()?;
            accounts.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
            for account in &accounts {
                println!(
                    "{:<20} {} {}",
                    account.name,
                    account.id,
                    format_money(balance_of(account), &config.economy.currency_symbol)
                );
            }
            if accounts.is_empty() {
                println!("No accounts yet.");
            }
        }
    }

    Ok(())
}

fn balance_of(account: &AccountRecord) -> i64 {
    account.fields.get(BALANCE_FIELD).copied().unwrap_or_default()
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let configured = config
        .as_ref()
        .and_then(|cfg| cfg.logging.level.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info);
    let base_level = match verbosity {
        0 => configured,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let Some(cfg) = config else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
        let _ = builder.try_init();
        return;
    };

    let log_file = cfg.logging.file.as_ref().and_then(|file| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(file)
            .ok()
    });
    let audit_file = cfg.logging.audit_file.as_ref().and_then(|file| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(file)
            .ok()
    });
    let log_file = log_file.map(|f| std::sync::Arc::new(std::sync::Mutex::new(f)));
    let audit_file = audit_file.map(|f| std::sync::Arc::new(std::sync::Mutex::new(f)));

    // Mirror to the console only when attached to a terminal or not logging to a file
    let to_console = log_file.is_none() || atty::is(atty::Stream::Stderr);

    builder.format(move |fmt, record| {
        let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
        let line = format!("{} [{}] {}", ts, record.level(), record.args());

        if let Some(file) = &log_file {
            if let Ok(mut guard) = file.lock() {
                let _ = writeln!(guard, "{}", line);
            }
        }

        // Ledger movements also go to the audit file
        if record.target() == "audit" {
            if let Some(file) = &audit_file {
                if let Ok(mut guard) = file.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
            }
        }

        if to_console {
            writeln!(fmt, "{}", line)
        } else {
            Ok(())
        }
    });
    let _ = builder.try_init();
}
