use stroke_sim::scenario::{
    AdmissionBoundary, CscConfig, NetworkConfig, PscConfig, SimulationParams,
};

/// Path to the reference hospital CSV shipped with the workspace.
pub fn reference_csv() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../configs/hospitals.csv")
}

/// Reference network shortened to `duration` days.
pub fn reference_for(duration: f64) -> NetworkConfig {
    let config = NetworkConfig::reference();
    let params = config.params.clone().with_duration(duration);
    config.with_params(params)
}

/// A small, heavily loaded hub so blocking actually happens in short runs.
pub fn congested_network(capacity: u32, boundary: AdmissionBoundary) -> NetworkConfig {
    NetworkConfig::new(
        SimulationParams::default()
            .with_duration(120.0)
            .with_replications(1)
            .with_admission_boundary(boundary),
        vec![CscConfig::new("Small Hub", capacity, 1.5, 1.0)],
        vec![
            PscConfig::new("PSC A", 0.8, 0.8, 0.5),
            PscConfig::new("PSC B", 0.4, 0.8, 0.5),
        ],
    )
}

/// Network whose only traffic enters through PSCs.
pub fn psc_fed_network(capacity: u32, transfer_rate: f64, duration: f64) -> NetworkConfig {
    NetworkConfig::new(
        SimulationParams::default()
            .with_duration(duration)
            .with_replications(1),
        vec![CscConfig::new("Hub", capacity, 0.0, 0.0)],
        vec![
            PscConfig::new("PSC A", transfer_rate, 1.0, 0.5),
            PscConfig::new("PSC B", transfer_rate, 1.0, 0.5),
        ],
    )
}
