//! Tally CLI
//!
//! Command-line tools for Tally ledger snapshots.
//!
//! # Commands
//!
//! - `inspect` - Display units, accounts and totals
//! - `verify` - Check a snapshot file for malformed lines
//! - `credit`, `debit`, `set`, `transfer` - Commit one transaction and save
//! - `clear` - Remove every account of a unit and save

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tally_core::{Balance, UnitId};
use tracing_subscriber::EnvFilter;

/// Tally command-line ledger tools.
#[derive(Parser)]
#[command(name = "tally")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the snapshot file
    #[arg(global = true, short, long)]
    snapshot: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display units, accounts and totals
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Check a snapshot file for malformed lines
    Verify,

    /// Add to an account balance
    #[command(allow_negative_numbers = true)]
    Credit {
        /// Unit id
        unit: UnitId,
        /// Account key
        key: String,
        /// Amount to add
        amount: Balance,
    },

    /// Subtract from an account balance
    #[command(allow_negative_numbers = true)]
    Debit {
        /// Unit id
        unit: UnitId,
        /// Account key
        key: String,
        /// Amount to subtract
        amount: Balance,
    },

    /// Set an account balance
    #[command(allow_negative_numbers = true)]
    Set {
        /// Unit id
        unit: UnitId,
        /// Account key
        key: String,
        /// New balance
        balance: Balance,
    },

    /// Move an amount between two accounts
    #[command(allow_negative_numbers = true)]
    Transfer {
        /// Source unit id
        from_unit: UnitId,
        /// Source account key
        from_key: String,
        /// Destination unit id
        to_unit: UnitId,
        /// Destination account key
        to_key: String,
        /// Amount to move
        amount: Balance,
    },

    /// Remove every account of a unit
    #[command(allow_negative_numbers = true)]
    Clear {
        /// Unit id
        unit: UnitId,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Inspect { format } => {
            let path = cli.snapshot.ok_or("Snapshot path required for inspect")?;
            commands::inspect::run(&path, &format)?;
        }
        Commands::Verify => {
            let path = cli.snapshot.ok_or("Snapshot path required for verify")?;
            commands::verify::run(&path)?;
        }
        Commands::Credit { unit, key, amount } => {
            let path = cli.snapshot.ok_or("Snapshot path required for credit")?;
            commands::mutate::credit(&path, unit, &key, amount)?;
        }
        Commands::Debit { unit, key, amount } => {
            let path = cli.snapshot.ok_or("Snapshot path required for debit")?;
            commands::mutate::debit(&path, unit, &key, amount)?;
        }
        Commands::Set { unit, key, balance } => {
            let path = cli.snapshot.ok_or("Snapshot path required for set")?;
            commands::mutate::set(&path, unit, &key, balance)?;
        }
        Commands::Transfer {
            from_unit,
            from_key,
            to_unit,
            to_key,
            amount,
        } => {
            let path = cli.snapshot.ok_or("Snapshot path required for transfer")?;
            commands::mutate::transfer(&path, (from_unit, &from_key), (to_unit, &to_key), amount)?;
        }
        Commands::Clear { unit } => {
            let path = cli.snapshot.ok_or("Snapshot path required for clear")?;
            commands::mutate::clear(&path, unit)?;
        }
        Commands::Version => {
            println!("Tally CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Tally Core v{}", tally_core::VERSION);
        }
    }

    Ok(())
}
