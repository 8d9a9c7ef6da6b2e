//! Ensemble experiments for the stroke-network simulator.
//!
//! This crate runs many independent replications of a [`NetworkConfig`] in
//! parallel, averages their per-facility statistics, sweeps the PSC transfer
//! rate, and cross-checks simulated blocking against Erlang B.
//!
//! # Quick Start
//!
//! ```no_run
//! use stroke_experiments::{run_ensemble, sweep_transfer_rates, default_transfer_rates};
//! use stroke_sim::scenario::NetworkConfig;
//!
//! let config = NetworkConfig::reference();
//! let report = run_ensemble(&config, 42, None, true)?;
//! println!("{report}");
//!
//! let points = sweep_transfer_rates(&config, &default_transfer_rates(10), 42, None)?;
//! # Ok::<(), stroke_experiments::ExperimentError>(())
//! ```
//!
//! # Architecture
//!
//! - [`runner`]: Parallel replication execution using rayon
//! - [`metrics`]: Ensemble aggregation and the "Averaged Results" rendering
//! - [`sweep`]: Transfer-rate sweeps
//! - [`analytic`]: Erlang B and offered-load cross-checks
//! - [`export`]: Result export to CSV/JSON
//!
//! [`NetworkConfig`]: stroke_sim::scenario::NetworkConfig

pub mod analytic;
pub mod error;
pub mod export;
pub mod metrics;
pub mod runner;
pub mod sweep;

pub use analytic::{analytic_blocking_probability, erlang_b, offered_load};
pub use error::ExperimentError;
pub use export::{
    export_ensemble_to_csv, export_ensemble_to_json, export_sweep_to_csv, export_sweep_to_json,
};
pub use metrics::{EnsembleReport, FacilitySummary, Summary};
pub use runner::{run_ensemble, run_replications};
pub use sweep::{default_transfer_rates, sweep_transfer_rates, SweepPoint, DEFAULT_SWEEP_STEPS};
