//! Discrete-event simulation of a capacity-constrained comprehensive stroke
//! center (CSC) fed by a network of primary stroke centers (PSCs).
//!
//! One replication is built with [`runner::Simulation::new`] from an immutable
//! [`scenario::NetworkConfig`] and a seed, and run to its configured duration:
//!
//! ```no_run
//! use stroke_sim::runner::Simulation;
//! use stroke_sim::scenario::NetworkConfig;
//!
//! let config = NetworkConfig::reference();
//! let report = Simulation::new(&config, 42)?.run()?;
//! println!("blocking probability: {:.4}", report.blocking_probability());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod clock;
pub mod distributions;
pub mod error;
pub mod facility;
pub mod patient;
pub mod runner;
pub mod scenario;
pub mod spawner;
pub mod telemetry;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
