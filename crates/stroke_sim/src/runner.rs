//! Simulation driver: owns the event queue and facility registry for one replication.
//!
//! Each step peeks the next event; the run ends when that event would land at
//! or after the configured duration, or when the queue is empty and the
//! network is idle until the horizon. Otherwise the event is popped, its
//! timestamp checked against the clock, dispatched to the target facility, and
//! any follow-up event is pushed back.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, trace};

use crate::clock::{Event, EventKind, EventQueue, FacilityId, SimTime};
use crate::error::{ConfigError, RunError, SimulationError};
use crate::facility::{build_registry, Facility, FacilityReport, RoutingPolicy};
use crate::scenario::{NetworkConfig, SimulationParams};
use crate::spawner::generate_arrivals;

pub struct Simulation {
    params: SimulationParams,
    policy: RoutingPolicy,
    facilities: Vec<Facility>,
    queue: EventQueue,
    clock: SimTime,
    rng: StdRng,
    seed: u64,
    processed: u64,
}

impl Simulation {
    /// Build a replication with a fresh registry and a generator seeded from `seed`.
    pub fn new(config: &NetworkConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let facilities = build_registry(config);
        let arrivals = generate_arrivals(&facilities, &config.params, &mut rng);
        debug!(
            seed,
            facilities = facilities.len(),
            arrivals = arrivals.len(),
            "replication initialized"
        );

        Ok(Self {
            params: config.params.clone(),
            policy: RoutingPolicy::from_config(config),
            facilities,
            queue: EventQueue::from_events(arrivals),
            clock: 0.0,
            rng,
            seed,
            processed: 0,
        })
    }

    pub fn now(&self) -> SimTime {
        self.clock
    }

    pub fn duration(&self) -> SimTime {
        self.params.duration
    }

    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    pub fn facility(&self, id: FacilityId) -> Option<&Facility> {
        self.facilities.get(id.0)
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    pub fn processed_events(&self) -> u64 {
        self.processed
    }

    /// Schedule an extra event, e.g. to seed a hand-built scenario in tests.
    pub fn schedule(&mut self, event: Event) {
        self.queue.push(event);
    }

    /// Process the next event if it falls before the duration.
    /// Returns the processed event, or `None` once the run is over.
    pub fn step(&mut self) -> Result<Option<Event>, SimulationError> {
        match self.queue.next_event_time() {
            Some(next) if next < self.params.duration => {}
            _ => return Ok(None),
        }

        let event = self.queue.pop_min()?;
        if event.timestamp < self.clock {
            return Err(SimulationError::ClockWentBackwards {
                previous: self.clock,
                next: event.timestamp,
            });
        }

        let facility = self
            .facilities
            .get_mut(event.facility.0)
            .ok_or(SimulationError::UnknownFacility(event.facility))?;
        trace!(
            time = event.timestamp,
            kind = ?event.kind,
            facility = %event.facility,
            patient = event.patient.id.0,
            "processing event"
        );
        let follow_up = match event.kind {
            EventKind::Arrival => facility.process_arrival(&event, &self.policy, &mut self.rng),
            EventKind::Departure => facility.process_departure(&event),
        };
        if let Some(next) = follow_up {
            self.queue.push(next);
        }

        self.clock = event.timestamp;
        self.processed += 1;
        Ok(Some(event))
    }

    /// Run to the configured duration and reduce the recorded series.
    pub fn run(self) -> Result<ReplicationReport, SimulationError> {
        self.run_with_hook(|_, _| {})
    }

    /// Run to the configured duration, invoking `hook` after every processed event.
    pub fn run_with_hook<F>(mut self, mut hook: F) -> Result<ReplicationReport, SimulationError>
    where
        F: FnMut(&[Facility], &Event),
    {
        while let Some(event) = self.step()? {
            hook(&self.facilities, &event);
        }
        Ok(self.finish())
    }

    /// Close every series at the duration and build the replication report.
    pub fn finish(mut self) -> ReplicationReport {
        let duration = self.params.duration;
        for facility in &mut self.facilities {
            facility.close(duration);
        }
        let boundary = self.params.admission_boundary;
        let facilities = self
            .facilities
            .iter()
            .map(|facility| facility.report(duration, boundary))
            .collect();
        debug!(
            seed = self.seed,
            processed = self.processed,
            unused = self.queue.len(),
            "replication finished"
        );

        ReplicationReport {
            seed: self.seed,
            duration,
            events_processed: self.processed,
            hub: self.policy.hub,
            facilities,
        }
    }
}

/// Everything extracted from one finished replication.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplicationReport {
    pub seed: u64,
    pub duration: SimTime,
    pub events_processed: u64,
    /// CSC receiving PSC transfers, when the network has one.
    pub hub: Option<FacilityId>,
    pub facilities: Vec<FacilityReport>,
}

impl ReplicationReport {
    pub fn facility(&self, id: FacilityId) -> Option<&FacilityReport> {
        self.facilities.get(id.0)
    }

    pub fn hub_report(&self) -> Option<&FacilityReport> {
        self.hub.and_then(|id| self.facility(id))
    }

    /// Hub CSC blocking probability; 0 when the network has no CSC.
    pub fn blocking_probability(&self) -> f64 {
        self.hub_report()
            .map_or(0.0, |report| report.blocking_probability)
    }

    pub fn cscs(&self) -> impl Iterator<Item = &FacilityReport> {
        self.facilities.iter().filter(|report| report.capacity.is_some())
    }
}

/// Convenience wrapper: build, run, and report one replication.
pub fn run_replication(config: &NetworkConfig, seed: u64) -> Result<ReplicationReport, RunError> {
    let simulation = Simulation::new(config, seed)?;
    Ok(simulation.run()?)
}
