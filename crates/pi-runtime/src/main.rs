//! # Pi-Blocks CLI
//!
//! ```text
//! pi-runtime create  <STORE> <DIGITS> [--block-digits 16]
//! pi-runtime status  <STORE> [--json]
//! pi-runtime migrate <STORE> <DIGITS>
//! pi-runtime compute <STORE> [--limit N]
//! pi-runtime verify  <STORE> [--limit N]
//! pi-runtime dump    <STORE> [--from OFFSET] [--count N] [--decimal]
//! ```
//!
//! Exit status is 0 on success, the store's per-kind code for store errors,
//! 2 when a pass saw failures or mismatches, and 1 otherwise.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use pi_01_digit_engine::{Formula, Precision};
use pi_02_block_store::{BlockStore, StoreConfig};
use pi_runtime::{read_digits, Orchestrator, PassReport, RuntimeConfig, RuntimeError, Schedule};

/// Exit status when a pass completes with failed or mismatched blocks.
const UNCLEAN_PASS_EXIT_CODE: i32 = 2;

/// Pi-Blocks: resumable hexadecimal digit extraction for π
#[derive(Parser, Debug)]
#[command(name = "pi-runtime", version)]
#[command(about = "Compute, verify and inspect blocks of π's hexadecimal expansion")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Worker threads (default: PI_WORKERS or CPU count)
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Work scheduling: static or dynamic
    #[arg(long, global = true)]
    schedule: Option<Schedule>,

    /// Formula used to compute; verification uses the other
    #[arg(long, global = true)]
    formula: Option<Formula>,

    /// Series arithmetic: fixed128 or double
    #[arg(long, global = true)]
    precision: Option<Precision>,

    /// Log level filter
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit JSON logs
    #[arg(long, global = true)]
    json_logs: bool,

    /// Skip fsync after each transition
    #[arg(long, global = true)]
    no_sync: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new store sized for DIGITS hex digits
    Create {
        store: PathBuf,
        digits: u64,
        #[arg(long, default_value_t = shared_types::DEFAULT_BLOCK_DIGITS)]
        block_digits: u32,
    },
    /// Show store progress
    Status {
        store: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Resize a store to hold DIGITS hex digits
    Migrate { store: PathBuf, digits: u64 },
    /// Compute uncomputed blocks
    Compute {
        store: PathBuf,
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Verify computed blocks with the other formula
    Verify {
        store: PathBuf,
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Print stored digits
    Dump {
        store: PathBuf,
        /// First hex offset (0 is the first digit after the point)
        #[arg(long, default_value_t = 0)]
        from: u64,
        #[arg(long, default_value_t = 64)]
        count: u64,
        /// Convert to decimal (requires --from 0)
        #[arg(long)]
        decimal: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let code = match load_config(&cli.global) {
        Ok(config) => {
            if let Err(e) = pi_telemetry::init_telemetry(&config.telemetry) {
                eprintln!("Warning: {}", e);
            }
            match run(cli.command, &config) {
                Ok(code) => code,
                Err(e) => {
                    tracing::error!("{:#}", e);
                    eprintln!("Error: {:#}", e);
                    exit_code(&e)
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code(&e)
        }
    };

    std::process::exit(code);
}

fn load_config(args: &GlobalArgs) -> Result<RuntimeConfig> {
    apply_overrides(RuntimeConfig::from_env()?, args)
}

/// CLI flags over environment and defaults.
fn apply_overrides(mut config: RuntimeConfig, args: &GlobalArgs) -> Result<RuntimeConfig> {
    if let Some(workers) = args.workers {
        if workers == 0 {
            return Err(RuntimeError::Config("--workers must be positive".to_string()).into());
        }
        config.workers = workers;
    }
    if let Some(schedule) = args.schedule {
        config.schedule = schedule;
    }
    if let Some(formula) = args.formula {
        config.formula = formula;
    }
    if let Some(precision) = args.precision {
        config.precision = precision;
    }
    if let Some(level) = &args.log_level {
        config.telemetry.log_level = level.clone();
    }
    if args.json_logs {
        config.telemetry.json_logs = true;
    }
    if args.no_sync {
        config.sync_writes = false;
    }
    Ok(config)
}

fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<RuntimeError>() {
        return e.exit_code();
    }
    if let Some(e) = err.downcast_ref::<pi_02_block_store::StoreError>() {
        return e.kind().exit_code();
    }
    pi_runtime::errors::GENERIC_EXIT_CODE
}

fn open(path: &Path, config: &RuntimeConfig) -> Result<BlockStore> {
    BlockStore::open_with(path, config.store_config())
        .map_err(RuntimeError::from)
        .with_context(|| format!("opening {}", path.display()))
}

fn run(command: Command, config: &RuntimeConfig) -> Result<i32> {
    match command {
        Command::Create {
            store,
            digits,
            block_digits,
        } => {
            let store_config = StoreConfig {
                block_digits,
                ..config.store_config()
            };
            let handle = BlockStore::create_with(&store, digits, store_config)
                .map_err(RuntimeError::from)
                .with_context(|| format!("creating {}", store.display()))?;
            println!(
                "created {} with {} blocks of {} digits",
                store.display(),
                handle.capacity(),
                handle.block_digits()
            );
            handle.close().map_err(RuntimeError::from)?;
        }

        Command::Status { store, json } => {
            let handle = open(&store, config)?;
            let stats = handle.stats();
            if json {
                let value = serde_json::json!({
                    "path": store.display().to_string(),
                    "stats": stats,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("store:      {}", store.display());
                println!("blocks:     {} x {} digits", stats.capacity, stats.block_digits);
                println!("uncomputed: {}", stats.uncomputed());
                println!("computed:   {}", stats.computed);
                println!("checked:    {}", stats.checked);
                println!("digits:     {}", stats.digits_computed());
            }
            handle.close().map_err(RuntimeError::from)?;
        }

        Command::Migrate { store, digits } => {
            let handle = open(&store, config)?;
            let before = handle.capacity();
            handle.migrate(digits).map_err(RuntimeError::from)?;
            println!(
                "migrated {} from {} to {} blocks",
                store.display(),
                before,
                handle.capacity()
            );
            handle.close().map_err(RuntimeError::from)?;
        }

        Command::Compute { store, limit } => {
            let orchestrator = Orchestrator::new(Arc::new(open(&store, config)?), config)?;
            let report = orchestrator.compute_pass(limit);
            print_report("compute", &report);
            return Ok(pass_exit_code(&report));
        }

        Command::Verify { store, limit } => {
            let orchestrator = Orchestrator::new(Arc::new(open(&store, config)?), config)?;
            let report = orchestrator.verify_pass(limit);
            print_report("verify", &report);
            return Ok(pass_exit_code(&report));
        }

        Command::Dump {
            store,
            from,
            count,
            decimal,
        } => {
            if decimal && from != 0 {
                return Err(RuntimeError::Config(
                    "decimal output needs the digits from offset 0".to_string(),
                )
                .into());
            }
            let handle = open(&store, config)?;
            let digits = read_digits(&handle, from, count)?;
            let text = if decimal {
                pi_03_converter::render_decimal(&digits).map_err(RuntimeError::from)?
            } else if from == 0 {
                pi_03_converter::render_hex(&digits).map_err(RuntimeError::from)?
            } else {
                shared_types::to_hex_string(&digits)
            };
            println!("{}", text);
            info!(from, count, decimal, "[pi-runtime] Dumped digits");
            handle.close().map_err(RuntimeError::from)?;
        }
    }
    Ok(0)
}

fn print_report(pass: &str, report: &PassReport) {
    println!(
        "{}: attempted {}, succeeded {}, duplicates {}, mismatches {}, failed {}",
        pass,
        report.attempted,
        report.succeeded,
        report.duplicates,
        report.mismatches,
        report.failed
    );
}

fn pass_exit_code(report: &PassReport) -> i32 {
    if report.is_clean() {
        0
    } else {
        UNCLEAN_PASS_EXIT_CODE
    }
}
