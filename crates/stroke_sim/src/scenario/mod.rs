//! Scenario setup: immutable network configuration and its CSV loader.
//!
//! A [`NetworkConfig`] is never mutated by a run; each replication builds its
//! own facility registry from it.

mod loader;
mod params;

pub use loader::{
    load_network_config, parse_network_config, CSC_MARKER, PARAMETERS_MARKER, PSC_MARKER,
};
pub use params::{
    AdmissionBoundary, CscConfig, NetworkConfig, NonStrokeRouting, PscConfig, SimulationParams,
    DEFAULT_HEMORRHAGIC_PROBABILITY, MAX_CAPACITY,
};
