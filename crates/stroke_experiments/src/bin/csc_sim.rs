//! `csc-sim`: run the stroke-network ensemble or a transfer-rate sweep.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use stroke_experiments::{
    default_transfer_rates, export_ensemble_to_csv, export_ensemble_to_json, export_sweep_to_csv,
    export_sweep_to_json, run_ensemble, sweep_transfer_rates, DEFAULT_SWEEP_STEPS,
};
use stroke_sim::scenario::{load_network_config, NetworkConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "csc-sim",
    about = "Simulate CSC blocking probability in a PSC/CSC stroke network"
)]
struct Cli {
    /// Two-section hospital configuration CSV.
    #[arg(long, global = true, env = "CSC_SIM_CONFIG", default_value = "configs/hospitals.csv")]
    config: PathBuf,

    /// Base seed; replication i uses seed + i.
    #[arg(long, global = true, default_value_t = 42)]
    seed: u64,

    /// Override the configured number of replications.
    #[arg(long, global = true)]
    replications: Option<usize>,

    /// Worker threads (defaults to rayon's choice).
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[arg(long, global = true)]
    no_progress: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one ensemble and print the averaged results.
    Run {
        #[arg(long)]
        json: Option<PathBuf>,
        /// Per-facility summary CSV.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Sweep every PSC's transfer rate over [0, 1].
    Sweep {
        #[arg(long, default_value_t = DEFAULT_SWEEP_STEPS)]
        steps: usize,
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<NetworkConfig, Box<dyn std::error::Error>> {
    let mut config = load_network_config(&cli.config)?;
    if let Some(replications) = cli.replications {
        config.params = config.params.clone().with_replications(replications);
        config.validate()?;
    }
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    info!(
        config = %cli.config.display(),
        cscs = config.cscs.len(),
        pscs = config.pscs.len(),
        replications = config.params.replications,
        "configuration loaded"
    );

    match &cli.command {
        Command::Run { json, csv } => {
            let report = run_ensemble(&config, cli.seed, cli.threads, !cli.no_progress)?;
            println!("{report}");
            if let Some(path) = json {
                export_ensemble_to_json(&report, path)?;
                info!(path = %path.display(), "wrote ensemble JSON");
            }
            if let Some(path) = csv {
                export_ensemble_to_csv(&report, path)?;
                info!(path = %path.display(), "wrote ensemble CSV");
            }
        }
        Command::Sweep { steps, csv, json } => {
            let rates = default_transfer_rates(*steps);
            let points = sweep_transfer_rates(&config, &rates, cli.seed, cli.threads)?;
            println!("transfer_rate  blocking  ± std_err  analytic");
            for point in &points {
                let analytic = point
                    .analytic_blocking_probability
                    .map_or_else(|| "-".to_string(), |p| format!("{p:.4}"));
                println!(
                    "{:>13.2}  {:>8.4}  {:>9.4}  {:>8}",
                    point.transfer_rate,
                    point.blocking_probability,
                    point.blocking_std_error,
                    analytic
                );
            }
            if let Some(path) = csv {
                export_sweep_to_csv(&points, path)?;
                info!(path = %path.display(), "wrote sweep CSV");
            }
            if let Some(path) = json {
                export_sweep_to_json(&points, path)?;
                info!(path = %path.display(), "wrote sweep JSON");
            }
        }
    }

    Ok(())
}
