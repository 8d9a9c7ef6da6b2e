mod support;

use std::io::Write;

use stroke_sim::error::ConfigError;
use stroke_sim::runner::run_replication;
use stroke_sim::scenario::{load_network_config, parse_network_config, NetworkConfig};
use support::networks::reference_csv;

#[test]
fn shipped_csv_describes_the_reference_network() {
    let config = load_network_config(reference_csv()).expect("shipped config loads");
    assert_eq!(config, NetworkConfig::reference());
}

#[test]
fn loaded_config_runs_a_replication() {
    let mut config = load_network_config(reference_csv()).expect("shipped config loads");
    config.params.duration = 30.0;
    let report = run_replication(&config, 1).expect("run");
    assert_eq!(report.facilities.len(), 4);
    assert_eq!(report.facilities[0].name, "Hub CSC");
}

#[test]
fn missing_file_is_an_io_error() {
    let result = load_network_config("does/not/exist.csv");
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn psc_without_csc_is_rejected() {
    let mut csv = Vec::new();
    writeln!(
        csv,
        "Parameters\nA,4\nB,7\nC,3.3\nD,0.25\nE,365\nF,10\nCSC Configuration:\nPSC Configuration:\n1,Lonely PSC,0.5,0.6,0.4"
    )
    .expect("write to buffer");
    assert!(matches!(
        parse_network_config(csv.as_slice()),
        Err(ConfigError::NoCsc(1))
    ));
}
