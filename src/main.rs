//! Orchard - grow plants, unlock variants.
//!
//! CLI entry point with global panic handler.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use orchard::cli::{
    CollectionCommand, CollectionOptions, PlantsCommand, PlantsOptions, PlayCommand, PlayOptions,
    ResetCommand, ResetOptions,
};
use orchard::config::{orchard_home, Config};
use orchard::core::{ActionType, ScoringPolicy};
use orchard::error::exit_codes;
use orchard::storage::FileLedgerStore;

// =============================================================================
// CLI Definition
// =============================================================================

/// Orchard - grow plants, unlock variants
#[derive(Parser)]
#[command(name = "orchard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: <data dir>/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grow a plant with four actions
    Play {
        /// Plant id (see `orchard plants`)
        plant: String,
        /// Actions in order: water, fertilizer, sun, special-light, prune, wait
        #[arg(required = true, num_args = 1..)]
        actions: Vec<ActionType>,
        /// Scoring policy (correct_only, partial_credit)
        #[arg(long)]
        policy: Option<ScoringPolicy>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show unlocked variants
    Collection {
        /// Only this plant
        plant: Option<String>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
    },

    /// List the plant catalog
    Plants {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
    },

    /// Delete all saved progress
    Reset {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
    },
}

// =============================================================================
// Main
// =============================================================================

fn main() -> ExitCode {
    setup_panic_handler();
    init_tracing();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("orchard error: {}", e);
            ExitCode::from(exit_codes::FAILURE as u8)
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Set up the global panic handler.
///
/// On panic, appends to `<data dir>/crash.log` and exits with code 3.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("orchard panic: {}", info);

        if let Some(home) = orchard_home() {
            let _ = std::fs::create_dir_all(&home);
            let crash_log = home.join("crash.log");
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        std::process::exit(exit_codes::CRASH);
    }));
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Play {
            plant,
            actions,
            policy,
            json,
            quiet,
        } => run_play(config, &plant, &actions, policy, json, quiet),
        Commands::Collection { plant, json } => run_collection(config, plant.as_deref(), json),
        Commands::Plants { json } => run_plants(config, json),
        Commands::Reset { yes, json } => run_reset(config, yes, json),
    }
}

fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::SUCCESS as u8)
    } else {
        ExitCode::from(exit_codes::FAILURE as u8)
    }
}

fn print_formatted(formatted: &str) {
    if !formatted.is_empty() {
        print!("{}", formatted);
        if !formatted.ends_with('\n') {
            println!();
        }
    }
}

fn run_play(
    config: Config,
    plant: &str,
    actions: &[ActionType],
    policy: Option<ScoringPolicy>,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let store = FileLedgerStore::new(&config)?;
    let cmd = PlayCommand::new(store, config);
    let options = PlayOptions {
        json,
        quiet,
        policy,
    };

    let output = cmd.run(plant, actions, &options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_collection(
    config: Config,
    plant: Option<&str>,
    json: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let store = FileLedgerStore::new(&config)?;
    let cmd = CollectionCommand::new(store, config);
    let options = CollectionOptions { json, quiet: false };

    let output = cmd.run(plant, &options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_plants(config: Config, json: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cmd = PlantsCommand::new(config);
    let options = PlantsOptions { json, quiet: false };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_reset(
    config: Config,
    yes: bool,
    json: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let store = FileLedgerStore::new(&config)?;
    let cmd = ResetCommand::new(store);
    let options = ResetOptions {
        json,
        quiet: false,
        yes,
    };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}
