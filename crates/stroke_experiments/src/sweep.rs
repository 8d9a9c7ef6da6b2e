//! Transfer-rate sweep: one full ensemble per PSC transfer rate.
//!
//! Every point reuses the same base seed, so neighbouring points share their
//! random streams and differ only through the routing decisions.

use serde::Serialize;
use stroke_sim::scenario::NetworkConfig;
use tracing::info;

use crate::analytic::analytic_blocking_probability;
use crate::error::ExperimentError;
use crate::runner::run_ensemble;

/// Number of steps in the default 0.00..=1.00 sweep.
pub const DEFAULT_SWEEP_STEPS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint {
    pub transfer_rate: f64,
    pub blocking_probability: f64,
    pub blocking_std_error: f64,
    /// Mean hub occupancy across replications.
    pub average_occupancy: f64,
    /// Mean hub rejections per replication.
    pub average_rejections: f64,
    /// Erlang B prediction for the same offered load.
    pub analytic_blocking_probability: Option<f64>,
}

/// `steps + 1` evenly spaced rates covering [0, 1].
pub fn default_transfer_rates(steps: usize) -> Vec<f64> {
    if steps == 0 {
        return vec![0.0];
    }
    (0..=steps)
        .map(|step| step as f64 / steps as f64)
        .collect()
}

/// Run a full ensemble for every rate, with every PSC set to that rate.
pub fn sweep_transfer_rates(
    config: &NetworkConfig,
    rates: &[f64],
    base_seed: u64,
    threads: Option<usize>,
) -> Result<Vec<SweepPoint>, ExperimentError> {
    rates
        .iter()
        .map(|&transfer_rate| {
            let point_config = config.with_uniform_transfer_rate(transfer_rate);
            let ensemble = run_ensemble(&point_config, base_seed, threads, false)?;
            let hub = ensemble.hub();
            let point = SweepPoint {
                transfer_rate,
                blocking_probability: ensemble.overall_blocking_probability,
                blocking_std_error: hub.map_or(0.0, |hub| hub.blocking_probability.std_error),
                average_occupancy: hub.map_or(0.0, |hub| hub.average_occupancy.mean),
                average_rejections: hub.map_or(0.0, |hub| hub.rejections),
                analytic_blocking_probability: analytic_blocking_probability(&point_config),
            };
            info!(
                transfer_rate,
                blocking = point.blocking_probability,
                analytic = ?point.analytic_blocking_probability,
                "sweep point complete"
            );
            Ok(point)
        })
        .collect()
}
