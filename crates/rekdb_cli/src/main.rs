//! rekdb CLI
//!
//! Command-line tools for a file-backed rekdb database.
//!
//! # Commands
//!
//! - `inspect` - Display collections and storage size
//! - `export` / `import` - Move the export document in and out
//! - `backup` - Create, list, restore and download snapshots
//! - `seed` - Add clients from a JSON file with sequential keys
//! - `collect` - Record a cash collection from a machine
//! - `autobackup` - Run the snapshot schedule until interrupted

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// rekdb command-line database tools.
#[derive(Parser)]
#[command(name = "rekdb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the database file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display collections and storage size
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Write the export document
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace collections from an export document
    Import {
        /// Export document to read
        input: PathBuf,
    },

    /// Manage snapshots
    Backup {
        #[command(subcommand)]
        action: BackupAction,
    },

    /// Add clients from a JSON array with sequential keys
    Seed {
        /// JSON file holding an array of clients
        clients: PathBuf,
    },

    /// Record a cash collection from a machine
    Collect {
        /// Machine key
        machine: String,

        /// Amount collected
        #[arg(short, long)]
        amount: f64,

        /// Counter reading at collection time
        #[arg(short, long)]
        counter: u64,

        /// Technician who collected
        #[arg(short, long)]
        technician: Option<String>,

        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Take snapshots periodically until interrupted
    Autobackup {
        /// Seconds between snapshots
        #[arg(short, long, default_value = "3600")]
        interval: u64,

        /// Snapshots to retain
        #[arg(short, long, default_value = "5")]
        max_backups: usize,

        /// Skip the snapshot taken at startup
        #[arg(long)]
        no_initial: bool,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum BackupAction {
    /// Take a snapshot now
    Create,

    /// List snapshots, newest first
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Restore collections from a snapshot
    Restore {
        /// Snapshot id
        id: String,
    },

    /// Write a snapshot to a file
    Download {
        /// Snapshot id
        id: String,

        /// Directory to write into
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
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
            let path = cli.path.ok_or("Database path required for inspect")?;
            commands::inspect::run(&path, &format)?;
        }
        Commands::Export { output } => {
            let path = cli.path.ok_or("Database path required for export")?;
            commands::transfer::export(&path, output.as_deref())?;
        }
        Commands::Import { input } => {
            let path = cli.path.ok_or("Database path required for import")?;
            commands::transfer::import(&path, &input)?;
        }
        Commands::Backup { action } => {
            let path = cli.path.ok_or("Database path required for backup")?;
            match action {
                BackupAction::Create => commands::backup::create(&path)?,
                BackupAction::List { format } => commands::backup::list(&path, &format)?,
                BackupAction::Restore { id } => commands::backup::restore(&path, &id)?,
                BackupAction::Download { id, dir } => {
                    commands::backup::download(&path, &id, &dir)?;
                }
            }
        }
        Commands::Seed { clients } => {
            let path = cli.path.ok_or("Database path required for seed")?;
            commands::seed::run(&path, &clients)?;
        }
        Commands::Collect {
            machine,
            amount,
            counter,
            technician,
            notes,
        } => {
            let path = cli.path.ok_or("Database path required for collect")?;
            commands::collect::run(&path, &machine, amount, counter, technician, notes)?;
        }
        Commands::Autobackup {
            interval,
            max_backups,
            no_initial,
        } => {
            let path = cli.path.ok_or("Database path required for autobackup")?;
            commands::autobackup::run(&path, interval, max_backups, !no_initial)?;
        }
        Commands::Version => {
            println!("rekdb CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("rekdb Core v{}", rekdb_core::VERSION);
            println!("Export format v{}", rekdb_codec::FORMAT_VERSION);
        }
    }

    Ok(())
}
