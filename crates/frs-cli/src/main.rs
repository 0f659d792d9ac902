use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "frs")]
#[command(about = "Futures roll selector", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> desk -> overrides...)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Pick a front contract from one chain snapshot with fresh state
    Select {
        /// Chain CSV (ts,underlying,symbol,expiry)
        #[arg(long)]
        chain: String,

        /// Decision time, UTC epoch seconds. Uses the latest snapshot at or before it.
        #[arg(long)]
        at: i64,

        /// Layered config paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<String>,

        /// Underlying to read from the chain file (overrides roll.underlying)
        #[arg(long)]
        underlying: Option<String>,

        /// Fail instead of warning on config keys this command does not read
        #[arg(long, default_value_t = false)]
        strict_config: bool,
    },

    /// Replay every chain snapshot through the rollover driver
    Replay {
        /// Chain CSV (ts,underlying,symbol,expiry)
        #[arg(long)]
        chain: String,

        /// Layered config paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<String>,

        /// Underlying to read from the chain file (overrides roll.underlying)
        #[arg(long)]
        underlying: Option<String>,

        /// Override roll.threshold_days
        #[arg(long)]
        threshold_days: Option<i64>,

        /// Emit one JSON object per step instead of key=value lines
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Fail instead of warning on config keys this command does not read
        #[arg(long, default_value_t = false)]
        strict_config: bool,
    },
}

fn main() -> Result<()> {
    // Load .env.local if present (dev convenience, e.g. RUST_LOG).
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = frs_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Select {
            chain,
            at,
            config_paths,
            underlying,
            strict_config,
        } => {
            commands::select::run_select(commands::select::SelectArgs {
                chain,
                at,
                config_paths,
                underlying,
                strict_config,
            })?;
        }

        Commands::Replay {
            chain,
            config_paths,
            underlying,
            threshold_days,
            json,
            strict_config,
        } => {
            commands::replay::run_replay(commands::replay::ReplayArgs {
                chain,
                config_paths,
                underlying,
                threshold_days,
                json,
                strict_config,
            })?;
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
