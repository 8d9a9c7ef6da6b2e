use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the stroke network simulation workspace",
    long_about = "A unified CLI for running ensembles, transfer-rate sweeps, benchmarks,\n\
                  and CI checks in the stroke network simulation workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reference ensemble from configs/hospitals.csv
    Run {
        #[arg(long, default_value = "configs/hospitals.csv")]
        config: String,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Sweep the PSC transfer rate and write the points to CSV
    Sweep {
        #[arg(long, default_value_t = 100)]
        steps: usize,
        #[arg(long, default_value = "transfer_sweep.csv")]
        output: String,
    },
    /// Run Criterion benchmarks
    Bench,
    /// Compare benchmarks: stash changes, create baseline, restore, compare
    BenchCompare,
    /// Run CI checks (fmt, clippy, tests, smoke run, benchmarks)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Short ensemble and sweep through the csc-sim binary
    Smoke,
    /// Run benchmarks
    Bench,
    /// Run check + smoke + bench
    All,
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn spawn(program: &str, args: &[&str]) -> ExitStatus {
    eprintln!("+ {program} {}", args.join(" "));
    Command::new(program)
        .args(args)
        .status()
        .unwrap_or_else(|err| {
            eprintln!("failed to execute {program}: {err}");
            exit(1);
        })
}

fn run_checked(program: &str, args: &[&str]) {
    let status = spawn(program, args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn run_cargo(args: &[&str]) {
    run_checked("cargo", args);
}

fn run_git(args: &[&str]) {
    run_checked("git", args);
}

fn run_csc_sim(args: &[&str]) {
    let mut cargo_args = vec![
        "run",
        "-p",
        "stroke_experiments",
        "--bin",
        "csc-sim",
        "--release",
        "--",
    ];
    cargo_args.extend_from_slice(args);
    run_cargo(&cargo_args);
}

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test stroke_sim");
    run_cargo(&["test", "-p", "stroke_sim"]);

    step("Test stroke_experiments");
    run_cargo(&["test", "-p", "stroke_experiments"]);
}

fn ci_smoke() {
    step("Run a short reference ensemble");
    run_csc_sim(&["--replications", "2", "--no-progress", "run"]);

    step("Run a coarse transfer-rate sweep");
    run_csc_sim(&["--replications", "2", "--no-progress", "sweep", "--steps", "4"]);
}

fn ci_bench() {
    step("Run benchmarks");
    run_cargo(&["bench", "--package", "stroke_sim", "--bench", "performance"]);
    run_cargo(&["bench", "--package", "stroke_experiments", "--bench", "ensemble"]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, seed } => {
            let seed = seed.to_string();
            run_csc_sim(&["--config", &config, "--seed", &seed, "run"]);
        }
        Commands::Sweep { steps, output } => {
            let steps = steps.to_string();
            run_csc_sim(&["sweep", "--steps", &steps, "--csv", &output]);
        }
        Commands::Bench => {
            run_cargo(&["bench", "--package", "stroke_sim", "--bench", "performance"]);
        }
        Commands::BenchCompare => {
            let baseline_dir = Path::new("target/criterion");
            if baseline_dir.exists() {
                step("Removing existing benchmark data");
                if let Err(err) = std::fs::remove_dir_all(baseline_dir) {
                    eprintln!("failed to remove target/criterion: {err}");
                    exit(1);
                }
            }

            step("Stashing current changes");
            run_git(&[
                "stash",
                "push",
                "-m",
                "Temporary stash for benchmark comparison",
            ]);

            step("Running benchmark to create baseline");
            run_cargo(&[
                "bench",
                "--package",
                "stroke_sim",
                "--bench",
                "performance",
                "--",
                "--save-baseline",
                "main",
            ]);

            step("Reapplying changes");
            run_git(&["stash", "pop"]);

            step("Running benchmark comparing against baseline");
            run_cargo(&[
                "bench",
                "--package",
                "stroke_sim",
                "--bench",
                "performance",
                "--",
                "--baseline",
                "main",
            ]);

            eprintln!("\nDone! Check the output above to see performance comparison.");
        }
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Smoke => ci_smoke(),
                CiJob::Bench => ci_bench(),
                CiJob::All => {
                    ci_check();
                    ci_smoke();
                    ci_bench();
                }
            }
            eprintln!("\nCI job passed.");
        }
    }
}
