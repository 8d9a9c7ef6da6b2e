//! Entity generator: builds every facility's arrival streams before the run.
//!
//! Each facility owns two independent renewal streams (stroke and non-stroke).
//! Streams are generated up to twice the simulation duration so the event
//! queue cannot starve before the horizon is reached.

use rand::Rng;
use tracing::debug;

use crate::clock::{Event, FacilityId, SimTime};
use crate::distributions::{bernoulli, sample_exponential, ExponentialInterArrival};
use crate::facility::{Facility, FacilityKind};
use crate::patient::{Origin, PatientId, PatientRecord, StrokeType};
use crate::scenario::SimulationParams;

/// Arrival streams run this many durations past time zero.
pub const GENERATION_HORIZON_FACTOR: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stroke,
    NonStroke,
}

/// Draws patients with fresh identities and service requirements.
#[derive(Debug)]
pub struct PatientSpawner<'a> {
    params: &'a SimulationParams,
    next_id: u64,
}

impl<'a> PatientSpawner<'a> {
    pub fn new(params: &'a SimulationParams) -> Self {
        Self { params, next_id: 0 }
    }

    /// Number of patients drawn so far.
    pub fn spawned(&self) -> u64 {
        self.next_id
    }

    fn next_id(&mut self) -> PatientId {
        let id = PatientId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Subtype first, then service duration, then (ischemic only) transfer need.
    pub fn spawn_stroke<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        origin: Origin,
        spawn_time: SimTime,
    ) -> PatientRecord {
        let id = self.next_id();
        if bernoulli(rng, self.params.hemorrhagic_probability) {
            let duration = sample_exponential(rng, self.params.hemorrhagic_mean_duration);
            PatientRecord::stroke(id, origin, spawn_time, duration, StrokeType::Hemorrhagic, true)
        } else {
            let duration = sample_exponential(rng, self.params.ischemic_mean_duration);
            let transfer_needed = bernoulli(rng, self.params.transfer_needed_probability);
            PatientRecord::stroke(
                id,
                origin,
                spawn_time,
                duration,
                StrokeType::Ischemic,
                transfer_needed,
            )
        }
    }

    pub fn spawn_non_stroke<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        origin: Origin,
        spawn_time: SimTime,
    ) -> PatientRecord {
        let id = self.next_id();
        let duration = sample_exponential(rng, self.params.non_stroke_mean_duration);
        PatientRecord::non_stroke(id, origin, spawn_time, duration)
    }

    fn spawn<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        kind: StreamKind,
        origin: Origin,
        spawn_time: SimTime,
    ) -> PatientRecord {
        match kind {
            StreamKind::Stroke => self.spawn_stroke(rng, origin, spawn_time),
            StreamKind::NonStroke => self.spawn_non_stroke(rng, origin, spawn_time),
        }
    }

    /// Arrival events for one renewal stream at `facility`, in spawn order.
    /// The first arrival lands one inter-arrival draw after time zero.
    pub fn stream<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        facility: FacilityId,
        origin: Origin,
        kind: StreamKind,
        rate: f64,
        horizon: SimTime,
    ) -> Vec<Event> {
        let inter_arrival = ExponentialInterArrival::new(rate);
        let mut events = Vec::new();
        let mut clock = inter_arrival.sample(rng);
        while clock <= horizon {
            let patient = self.spawn(rng, kind, origin, clock);
            events.push(Event::arrival(clock, facility, patient));
            clock += inter_arrival.sample(rng);
        }
        events
    }
}

/// Pool every facility's stroke and non-stroke arrivals into one collection.
pub fn generate_arrivals<R: Rng + ?Sized>(
    facilities: &[Facility],
    params: &SimulationParams,
    rng: &mut R,
) -> Vec<Event> {
    let horizon = params.duration * GENERATION_HORIZON_FACTOR;
    let mut spawner = PatientSpawner::new(params);
    let mut events = Vec::new();

    for facility in facilities {
        let origin = match facility.kind {
            FacilityKind::Psc { .. } => Origin::Psc(facility.id),
            FacilityKind::Csc { .. } => Origin::Direct,
        };
        let stroke = spawner.stream(
            rng,
            facility.id,
            origin,
            StreamKind::Stroke,
            facility.stroke_rate,
            horizon,
        );
        let non_stroke = spawner.stream(
            rng,
            facility.id,
            origin,
            StreamKind::NonStroke,
            facility.non_stroke_rate,
            horizon,
        );
        debug!(
            facility = %facility.name,
            stroke = stroke.len(),
            non_stroke = non_stroke.len(),
            "generated arrival streams"
        );
        events.extend(stroke);
        events.extend(non_stroke);
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::EventKind;
    use crate::scenario::{CscConfig, NetworkConfig, PscConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn network() -> NetworkConfig {
        NetworkConfig::new(
            SimulationParams::default().with_duration(100.0),
            vec![CscConfig::new("CSC", 10, 1.0, 0.5)],
            vec![PscConfig::new("PSC", 0.5, 2.0, 0.0)],
        )
    }

    #[test]
    fn arrivals_cover_twice_the_duration_and_no_further() {
        let config = network();
        let facilities = crate::facility::build_registry(&config);
        let mut rng = StdRng::seed_from_u64(11);
        let events = generate_arrivals(&facilities, &config.params, &mut rng);

        assert!(events.iter().all(|e| e.kind == EventKind::Arrival));
        assert!(events.iter().all(|e| e.timestamp > 0.0 && e.timestamp <= 200.0));
        let latest = events
            .iter()
            .map(|e| e.timestamp)
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(latest > 190.0, "latest arrival {latest}");
    }

    #[test]
    fn arrival_counts_track_configured_rates() {
        let config = network();
        let facilities = crate::facility::build_registry(&config);
        let mut rng = StdRng::seed_from_u64(5);
        let events = generate_arrivals(&facilities, &config.params, &mut rng);

        let psc = FacilityId(1);
        let psc_non_stroke = events
            .iter()
            .filter(|e| e.facility == psc && !e.patient.is_stroke())
            .count();
        assert_eq!(psc_non_stroke, 0, "zero-rate stream produces nothing");

        // 2.0/day over 200 days: 400 expected, sd 20.
        let psc_stroke = events
            .iter()
            .filter(|e| e.facility == psc && e.patient.is_stroke())
            .count();
        assert!((300..=500).contains(&psc_stroke), "psc stroke arrivals {psc_stroke}");
        assert!(events
            .iter()
            .filter(|e| e.facility == psc)
            .all(|e| e.patient.origin == Origin::Psc(psc)));
    }

    #[test]
    fn patient_ids_are_unique() {
        let config = network();
        let facilities = crate::facility::build_registry(&config);
        let mut rng = StdRng::seed_from_u64(9);
        let events = generate_arrivals(&facilities, &config.params, &mut rng);
        let mut ids: Vec<u64> = events.iter().map(|e| e.patient.id.0).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), events.len());
    }

    #[test]
    fn hemorrhagic_share_follows_probability() {
        let params = SimulationParams::default().with_hemorrhagic_probability(0.13);
        let mut spawner = PatientSpawner::new(&params);
        let mut rng = StdRng::seed_from_u64(21);
        let n = 20_000;
        let hemorrhagic = (0..n)
            .map(|_| spawner.spawn_stroke(&mut rng, Origin::Direct, 0.0))
            .filter(|p| p.stroke_type() == Some(StrokeType::Hemorrhagic))
            .count();
        let share = hemorrhagic as f64 / n as f64;
        assert!((share - 0.13).abs() < 0.015, "share {share}");
        assert_eq!(spawner.spawned(), n as u64);
    }
}
