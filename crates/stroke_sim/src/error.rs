use thiserror::Error;

use crate::clock::{FacilityId, SimTime};

/// Failures raised while driving a replication. All of them abort the run.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("event queue is empty")]
    EmptyQueue,

    #[error("simulated clock moved backwards from {previous} to {next}")]
    ClockWentBackwards { previous: SimTime, next: SimTime },

    #[error("event targets unknown facility {0}")]
    UnknownFacility(FacilityId),
}

/// Failures raised while loading or validating a network configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode configuration CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration is missing the `{0}` section marker")]
    MissingSection(&'static str),

    #[error("row {row}: expected {expected} in column {column}, found {found:?}")]
    InvalidField {
        row: usize,
        column: usize,
        expected: &'static str,
        found: String,
    },

    #[error("row {row}: missing value for {field}")]
    MissingField { row: usize, field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("{0} PSC(s) configured but no CSC to route transfers to")]
    NoCsc(usize),
}

/// Either stage of building and running a replication failing.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),
}
