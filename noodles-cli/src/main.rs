//! Noodles CLI - run demo operator graphs through the engine.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use noodles_executor::observability::{LogFormat, TracingConfig, TracingGuard, init_tracing};

/// Noodles - operator graph execution engine.
#[derive(Parser)]
#[command(name = "noodles")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a demo graph through the frame loop and print metrics
    Run {
        /// Number of frames to execute
        #[arg(short, long, default_value = "10")]
        frames: u64,

        /// Target frames per second
        #[arg(long, default_value = "60")]
        fps: u32,

        /// Pull roots one after another instead of concurrently
        #[arg(long)]
        sequential: bool,

        /// Print Prometheus metrics after the run
        #[arg(long)]
        metrics: bool,
    },

    /// Run a running-sum for-loop over a list of numbers
    Fold {
        /// Comma-separated values (e.g. 1,2,3)
        #[arg(long, value_delimiter = ',', required = true)]
        values: Vec<f64>,

        /// Initial accumulator value
        #[arg(long, default_value = "0")]
        initial: f64,
    },

    /// Show version information
    Version,
}

fn setup_logging(verbosity: u8) -> Result<TracingGuard> {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let log_format = std::env::var("NOODLES_LOG_FORMAT")
        .ok()
        .and_then(|s| s.parse::<LogFormat>().ok())
        .unwrap_or_else(|| {
            if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
                LogFormat::Pretty
            } else {
                LogFormat::Compact
            }
        });

    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| filter.to_string());

    let config = TracingConfig::builder()
        .log_format(log_format)
        .log_filter(log_filter)
        .build();

    init_tracing(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _tracing_guard = setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Run {
            frames,
            fps,
            sequential,
            metrics,
        } => commands::run::run(frames, fps, sequential, metrics).await,
        Commands::Fold { values, initial } => commands::fold::run(&values, initial).await,
        Commands::Version => commands::version::run(),
    }
}
