//! Parallel replication execution using rayon.
//!
//! Every replication builds its own facility registry from the shared,
//! immutable [`NetworkConfig`] and draws from its own generator seeded with
//! `base_seed + index`, so results are independent of the thread count and
//! come back in replication order.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use stroke_sim::runner::{ReplicationReport, Simulation};
use stroke_sim::scenario::NetworkConfig;
use tracing::{debug, info};

use crate::error::ExperimentError;
use crate::metrics::EnsembleReport;

/// Seed of replication `index` in an ensemble started from `base_seed`.
pub fn replication_seed(base_seed: u64, index: usize) -> u64 {
    base_seed.wrapping_add(index as u64)
}

/// Run one replication of `config` with the given seed.
pub fn run_single_replication(
    config: &NetworkConfig,
    index: usize,
    seed: u64,
) -> Result<ReplicationReport, ExperimentError> {
    let simulation = Simulation::new(config, seed)?;
    let report = simulation
        .run()
        .map_err(|source| ExperimentError::Replication {
            index,
            seed,
            source,
        })?;
    debug!(
        index,
        seed,
        events = report.events_processed,
        blocking = report.blocking_probability(),
        "replication complete"
    );
    Ok(report)
}

/// Run every configured replication in parallel.
///
/// * `threads` - Optional number of threads to use. If None, uses rayon's default.
/// * `show_progress` - Whether to display a progress bar
pub fn run_replications(
    config: &NetworkConfig,
    base_seed: u64,
    threads: Option<usize>,
    show_progress: bool,
) -> Result<Vec<ReplicationReport>, ExperimentError> {
    config.validate()?;
    let total = config.params.replications;
    let pb = progress_bar(total, show_progress);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.unwrap_or(0))
        .build()?;

    let pb_clone = pb.clone();
    let reports = pool.install(|| {
        (0..total)
            .into_par_iter()
            .map(|index| {
                let report =
                    run_single_replication(config, index, replication_seed(base_seed, index));
                if let Some(ref progress_bar) = pb_clone {
                    progress_bar.inc(1);
                }
                report
            })
            .collect::<Result<Vec<_>, _>>()
    });

    if let Some(ref progress_bar) = pb {
        progress_bar.finish_with_message("Completed");
    }

    reports
}

/// Run the ensemble and aggregate it into an [`EnsembleReport`].
pub fn run_ensemble(
    config: &NetworkConfig,
    base_seed: u64,
    threads: Option<usize>,
    show_progress: bool,
) -> Result<EnsembleReport, ExperimentError> {
    let reports = run_replications(config, base_seed, threads, show_progress)?;
    let ensemble = EnsembleReport::from_replications(&reports, base_seed)?;
    info!(
        replications = ensemble.replications,
        base_seed,
        blocking = ensemble.overall_blocking_probability,
        "ensemble complete"
    );
    Ok(ensemble)
}

fn progress_bar(total: usize, show_progress: bool) -> Option<ProgressBar> {
    if !show_progress || total == 0 {
        return None;
    }
    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("#>-");
    bar.set_style(style);
    Some(bar)
}
