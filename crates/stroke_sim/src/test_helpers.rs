//! Test helpers for common test setup and utilities.
//!
//! Shared patient and network builders so unit and integration tests do not
//! repeat the same constructors.

use crate::patient::{Origin, PatientId, PatientRecord, StrokeType};
use crate::scenario::{CscConfig, NetworkConfig, PscConfig, SimulationParams};

pub fn ischemic(
    id: u64,
    origin: Origin,
    spawn_time: f64,
    duration: f64,
    transfer_needed: bool,
) -> PatientRecord {
    PatientRecord::stroke(
        PatientId(id),
        origin,
        spawn_time,
        duration,
        StrokeType::Ischemic,
        transfer_needed,
    )
}

pub fn hemorrhagic(id: u64, origin: Origin, spawn_time: f64, duration: f64) -> PatientRecord {
    PatientRecord::stroke(
        PatientId(id),
        origin,
        spawn_time,
        duration,
        StrokeType::Hemorrhagic,
        true,
    )
}

pub fn non_stroke(id: u64, origin: Origin, spawn_time: f64, duration: f64) -> PatientRecord {
    PatientRecord::non_stroke(PatientId(id), origin, spawn_time, duration)
}

/// One CSC with `capacity` beds fed only by its own direct arrivals.
pub fn single_csc_network(
    capacity: u32,
    stroke_rate: f64,
    non_stroke_rate: f64,
    duration: f64,
) -> NetworkConfig {
    NetworkConfig::new(
        SimulationParams::default()
            .with_duration(duration)
            .with_replications(1),
        vec![CscConfig::new("CSC", capacity, stroke_rate, non_stroke_rate)],
        Vec::new(),
    )
}

/// Hub CSC plus one PSC, for routing scenarios.
pub fn hub_and_psc_network(
    capacity: u32,
    transfer_rate: f64,
    psc_stroke_rate: f64,
    psc_non_stroke_rate: f64,
    duration: f64,
) -> NetworkConfig {
    NetworkConfig::new(
        SimulationParams::default()
            .with_duration(duration)
            .with_replications(1),
        vec![CscConfig::new("CSC", capacity, 0.0, 0.0)],
        vec![PscConfig::new(
            "PSC",
            transfer_rate,
            psc_stroke_rate,
            psc_non_stroke_rate,
        )],
    )
}
