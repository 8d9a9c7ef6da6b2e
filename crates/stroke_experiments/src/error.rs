use stroke_sim::error::{ConfigError, SimulationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("replication {index} (seed {seed}) failed: {source}")]
    Replication {
        index: usize,
        seed: u64,
        #[source]
        source: SimulationError,
    },

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("ensemble has no replications to aggregate")]
    EmptyEnsemble,
}
