//! Facility state machine shared by PSCs and CSCs.
//!
//! A PSC never blocks: it triages each arrival and either forwards the patient
//! to the hub CSC with zero delay or absorbs them locally. A CSC admits while
//! its admission boundary allows, schedules a departure at the patient's
//! completion time, and otherwise counts a rejection.

use rand::Rng;
use serde::Serialize;
use tracing::trace;

use crate::clock::{Event, FacilityId, SimTime};
use crate::distributions::bernoulli;
use crate::patient::{PatientRecord, StrokeType};
use crate::scenario::{AdmissionBoundary, NetworkConfig, NonStrokeRouting};
use crate::telemetry::{occupancy_histogram, Category, OccupancyTelemetry};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum FacilityKind {
    /// Uncapacitated feeder; `transfer_rate` is the chance an ischemic patient is forwarded.
    Psc { transfer_rate: f64 },
    Csc { capacity: u32 },
}

impl FacilityKind {
    pub fn label(&self) -> &'static str {
        match self {
            FacilityKind::Psc { .. } => "PSC",
            FacilityKind::Csc { .. } => "CSC",
        }
    }
}

/// Network-wide routing and admission rules consulted by every handler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutingPolicy {
    /// CSC that PSC transfers are sent to.
    pub hub: Option<FacilityId>,
    pub admission_boundary: AdmissionBoundary,
    pub non_stroke_routing: NonStrokeRouting,
}

impl RoutingPolicy {
    pub fn from_config(config: &NetworkConfig) -> Self {
        Self {
            hub: (!config.cscs.is_empty()).then_some(FacilityId(0)),
            admission_boundary: config.params.admission_boundary,
            non_stroke_routing: config.params.non_stroke_routing,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RejectionCounts {
    pub total: u64,
    /// Rejected stroke patients that needed CSC-level care.
    pub transfer_needed: u64,
    /// Rejected stroke patients that did not.
    pub transfer_not_needed: u64,
}

impl RejectionCounts {
    /// Share of rejected stroke patients that needed a transfer; `None` when
    /// no stroke patient was rejected.
    pub fn transfer_needed_share(&self) -> Option<f64> {
        let stroke = self.transfer_needed + self.transfer_not_needed;
        (stroke > 0).then(|| self.transfer_needed as f64 / stroke as f64)
    }
}

/// What a PSC did with its arrivals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoutingCounts {
    pub hemorrhagic_transferred: u64,
    pub ischemic_transferred: u64,
    pub non_stroke_transferred: u64,
    pub absorbed: u64,
}

impl RoutingCounts {
    pub fn transferred(&self) -> u64 {
        self.hemorrhagic_transferred + self.ischemic_transferred + self.non_stroke_transferred
    }
}

#[derive(Debug, Clone)]
pub struct Facility {
    pub id: FacilityId,
    pub name: String,
    pub kind: FacilityKind,
    pub stroke_rate: f64,
    pub non_stroke_rate: f64,
    occupancy: u32,
    arrivals: u64,
    admissions: u64,
    departures: u64,
    rejections: RejectionCounts,
    routing: RoutingCounts,
    telemetry: OccupancyTelemetry,
}

impl Facility {
    pub fn new(
        id: FacilityId,
        name: impl Into<String>,
        kind: FacilityKind,
        stroke_rate: f64,
        non_stroke_rate: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            stroke_rate,
            non_stroke_rate,
            occupancy: 0,
            arrivals: 0,
            admissions: 0,
            departures: 0,
            rejections: RejectionCounts::default(),
            routing: RoutingCounts::default(),
            telemetry: OccupancyTelemetry::default(),
        }
    }

    pub fn occupancy(&self) -> u32 {
        self.occupancy
    }

    pub fn arrivals(&self) -> u64 {
        self.arrivals
    }

    pub fn admissions(&self) -> u64 {
        self.admissions
    }

    pub fn departures(&self) -> u64 {
        self.departures
    }

    pub fn rejections(&self) -> RejectionCounts {
        self.rejections
    }

    pub fn routing(&self) -> RoutingCounts {
        self.routing
    }

    pub fn telemetry(&self) -> &OccupancyTelemetry {
        &self.telemetry
    }

    pub fn capacity(&self) -> Option<u32> {
        match self.kind {
            FacilityKind::Csc { capacity } => Some(capacity),
            FacilityKind::Psc { .. } => None,
        }
    }

    /// Handle an arrival; returns the follow-up event, if any.
    pub fn process_arrival<R: Rng + ?Sized>(
        &mut self,
        event: &Event,
        policy: &RoutingPolicy,
        rng: &mut R,
    ) -> Option<Event> {
        self.arrivals += 1;
        match self.kind {
            FacilityKind::Psc { transfer_rate } => {
                self.triage(event, transfer_rate, policy, rng)
            }
            FacilityKind::Csc { capacity } => {
                self.admit_or_reject(event, capacity, policy.admission_boundary)
            }
        }
    }

    fn triage<R: Rng + ?Sized>(
        &mut self,
        event: &Event,
        transfer_rate: f64,
        policy: &RoutingPolicy,
        rng: &mut R,
    ) -> Option<Event> {
        let patient = &event.patient;
        let forward = match patient.stroke_type() {
            Some(StrokeType::Hemorrhagic) => true,
            Some(StrokeType::Ischemic) => bernoulli(rng, transfer_rate),
            None => match policy.non_stroke_routing {
                NonStrokeRouting::TransferAll => true,
                NonStrokeRouting::Local => false,
                NonStrokeRouting::FollowTransferRate => bernoulli(rng, transfer_rate),
            },
        };

        let Some(hub) = policy.hub.filter(|_| forward) else {
            self.routing.absorbed += 1;
            trace!(patient = patient.id.0, psc = %self.id, "absorbed locally");
            return None;
        };

        match patient.stroke_type() {
            Some(StrokeType::Hemorrhagic) => self.routing.hemorrhagic_transferred += 1,
            Some(StrokeType::Ischemic) => self.routing.ischemic_transferred += 1,
            None => self.routing.non_stroke_transferred += 1,
        }
        trace!(patient = patient.id.0, psc = %self.id, csc = %hub, "transferred");
        Some(Event::arrival(event.timestamp, hub, *patient))
    }

    fn admit_or_reject(
        &mut self,
        event: &Event,
        capacity: u32,
        boundary: AdmissionBoundary,
    ) -> Option<Event> {
        let patient = &event.patient;
        if boundary.admits(self.occupancy, capacity) {
            self.occupancy += 1;
            self.admissions += 1;
            self.telemetry.admit(patient, event.timestamp);
            return Some(Event::departure(patient.completion_time(), self.id, *patient));
        }

        self.rejections.total += 1;
        match patient.transfer_needed() {
            Some(true) => self.rejections.transfer_needed += 1,
            Some(false) => self.rejections.transfer_not_needed += 1,
            None => {}
        }
        trace!(patient = patient.id.0, csc = %self.id, occupancy = self.occupancy, "rejected");
        None
    }

    /// Discharge the patient. Departures are terminal and never schedule anything.
    pub fn process_departure(&mut self, event: &Event) -> Option<Event> {
        debug_assert!(self.occupancy > 0, "departure from an empty facility");
        self.occupancy = self.occupancy.saturating_sub(1);
        self.departures += 1;
        self.telemetry.discharge(&event.patient, event.timestamp);
        None
    }

    /// Close every occupancy series at the end of the run.
    pub fn close(&mut self, end: SimTime) {
        self.telemetry.close(end);
    }

    /// Highest occupancy this facility can reach under `boundary`.
    pub fn max_occupancy(&self, boundary: AdmissionBoundary) -> u32 {
        match self.kind {
            FacilityKind::Csc { capacity } => boundary.max_occupancy(capacity),
            FacilityKind::Psc { .. } => self
                .telemetry
                .series(Category::All)
                .samples()
                .iter()
                .map(|&(value, _)| value)
                .max()
                .unwrap_or(0),
        }
    }

    /// Reduce this facility's counters and closed series into a report.
    pub fn report(&self, duration: SimTime, boundary: AdmissionBoundary) -> FacilityReport {
        let max_occupancy = self.max_occupancy(boundary);
        let histogram = occupancy_histogram(
            self.telemetry.series(Category::All).samples(),
            max_occupancy as usize + 1,
            duration,
        );
        let blocking_probability = match self.kind {
            FacilityKind::Csc { .. } => histogram
                .get(max_occupancy as usize)
                .copied()
                .unwrap_or(0.0),
            FacilityKind::Psc { .. } => 0.0,
        };
        let average = |category| self.telemetry.average(category, duration);

        FacilityReport {
            facility: self.id,
            name: self.name.clone(),
            kind: self.kind.label(),
            capacity: self.capacity(),
            arrivals: self.arrivals,
            admissions: self.admissions,
            departures: self.departures,
            rejections: self.rejections,
            routing: self.routing,
            average_occupancy: average(Category::All),
            average_stroke: average(Category::Stroke),
            average_should_be_at_csc: average(Category::ShouldBeAtCsc),
            average_should_not_be_at_csc: average(Category::ShouldNotBeAtCsc),
            average_from_psc: average(Category::FromPsc),
            average_direct: average(Category::Direct),
            histogram,
            blocking_probability,
        }
    }
}

/// Per-facility output of one replication.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacilityReport {
    pub facility: FacilityId,
    pub name: String,
    pub kind: &'static str,
    pub capacity: Option<u32>,
    pub arrivals: u64,
    pub admissions: u64,
    pub departures: u64,
    pub rejections: RejectionCounts,
    pub routing: RoutingCounts,
    pub average_occupancy: f64,
    pub average_stroke: f64,
    pub average_should_be_at_csc: f64,
    pub average_should_not_be_at_csc: f64,
    pub average_from_psc: f64,
    pub average_direct: f64,
    /// Fraction of the horizon spent at each occupancy level.
    pub histogram: Vec<f64>,
    /// Histogram mass at the highest reachable occupancy (always 0 for a PSC).
    pub blocking_probability: f64,
}

impl FacilityReport {
    pub fn transfer_needed_rejection_share(&self) -> Option<f64> {
        self.rejections.transfer_needed_share()
    }
}

/// Fresh facility registry for one replication: CSCs first, then PSCs, with
/// each facility's id equal to its index.
pub fn build_registry(config: &NetworkConfig) -> Vec<Facility> {
    let cscs = config.cscs.iter().map(|csc| {
        (
            csc.name.as_str(),
            FacilityKind::Csc {
                capacity: csc.capacity,
            },
            csc.stroke_rate,
            csc.non_stroke_rate,
        )
    });
    let pscs = config.pscs.iter().map(|psc| {
        (
            psc.name.as_str(),
            FacilityKind::Psc {
                transfer_rate: psc.transfer_rate,
            },
            psc.stroke_rate,
            psc.non_stroke_rate,
        )
    });

    cscs.chain(pscs)
        .enumerate()
        .map(|(index, (name, kind, stroke_rate, non_stroke_rate))| {
            Facility::new(FacilityId(index), name, kind, stroke_rate, non_stroke_rate)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::EventKind;
    use crate::patient::{Origin, PatientId};
    use crate::test_helpers::{hemorrhagic, ischemic, non_stroke};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn csc(capacity: u32) -> Facility {
        Facility::new(FacilityId(0), "CSC", FacilityKind::Csc { capacity }, 0.0, 0.0)
    }

    fn psc(transfer_rate: f64) -> Facility {
        Facility::new(FacilityId(1), "PSC", FacilityKind::Psc { transfer_rate }, 0.0, 0.0)
    }

    fn policy(routing: NonStrokeRouting) -> RoutingPolicy {
        RoutingPolicy {
            hub: Some(FacilityId(0)),
            admission_boundary: AdmissionBoundary::Strict,
            non_stroke_routing: routing,
        }
    }

    fn arrival(patient: PatientRecord, facility: FacilityId) -> Event {
        Event::arrival(patient.spawn_time, facility, patient)
    }

    #[test]
    fn csc_admits_until_full_then_rejects() {
        let mut facility = csc(2);
        let mut rng = StdRng::seed_from_u64(0);
        let policy = policy(NonStrokeRouting::TransferAll);

        let first = facility.process_arrival(
            &arrival(ischemic(1, Origin::Direct, 0.0, 5.0, true), FacilityId(0)),
            &policy,
            &mut rng,
        );
        let departure = first.expect("admitted");
        assert_eq!(departure.kind, EventKind::Departure);
        assert_eq!(departure.timestamp, 5.0);
        assert_eq!(departure.facility, FacilityId(0));

        assert!(facility
            .process_arrival(
                &arrival(non_stroke(2, Origin::Direct, 1.0, 1.0), FacilityId(0)),
                &policy,
                &mut rng,
            )
            .is_some());
        assert_eq!(facility.occupancy(), 2);

        let rejected = facility.process_arrival(
            &arrival(ischemic(3, Origin::Direct, 1.5, 2.0, false), FacilityId(0)),
            &policy,
            &mut rng,
        );
        assert!(rejected.is_none());
        assert_eq!(facility.occupancy(), 2);
        assert_eq!(
            facility.rejections(),
            RejectionCounts {
                total: 1,
                transfer_needed: 0,
                transfer_not_needed: 1,
            }
        );
    }

    #[test]
    fn inclusive_boundary_admits_one_extra_patient() {
        let mut facility = csc(1);
        let mut rng = StdRng::seed_from_u64(0);
        let policy = RoutingPolicy {
            admission_boundary: AdmissionBoundary::Inclusive,
            ..policy(NonStrokeRouting::TransferAll)
        };
        for id in 0..3 {
            facility.process_arrival(
                &arrival(non_stroke(id, Origin::Direct, 0.0, 10.0), FacilityId(0)),
                &policy,
                &mut rng,
            );
        }
        assert_eq!(facility.occupancy(), 2);
        assert_eq!(facility.rejections().total, 1);
    }

    #[test]
    fn zero_capacity_csc_rejects_everything() {
        let mut facility = csc(0);
        let mut rng = StdRng::seed_from_u64(0);
        let policy = policy(NonStrokeRouting::TransferAll);
        let outcome = facility.process_arrival(
            &arrival(hemorrhagic(1, Origin::Direct, 0.0, 3.0), FacilityId(0)),
            &policy,
            &mut rng,
        );
        assert!(outcome.is_none());
        assert_eq!(facility.rejections().transfer_needed, 1);
        assert_eq!(facility.rejections().transfer_needed_share(), Some(1.0));
    }

    #[test]
    fn departure_frees_a_bed_and_is_terminal() {
        let mut facility = csc(1);
        let mut rng = StdRng::seed_from_u64(0);
        let policy = policy(NonStrokeRouting::TransferAll);
        let departure = facility
            .process_arrival(
                &arrival(non_stroke(1, Origin::Direct, 0.0, 2.0), FacilityId(0)),
                &policy,
                &mut rng,
            )
            .expect("admitted");

        assert!(facility.process_departure(&departure).is_none());
        assert_eq!(facility.occupancy(), 0);
        assert_eq!(facility.admissions() - facility.departures(), 0);
    }

    #[test]
    fn psc_forwards_hemorrhagic_with_zero_delay() {
        let mut facility = psc(0.0);
        let mut rng = StdRng::seed_from_u64(0);
        let patient = hemorrhagic(7, Origin::Psc(FacilityId(1)), 3.25, 4.0);
        let forwarded = facility
            .process_arrival(
                &arrival(patient, FacilityId(1)),
                &policy(NonStrokeRouting::Local),
                &mut rng,
            )
            .expect("hemorrhagic is always forwarded");

        assert_eq!(forwarded.kind, EventKind::Arrival);
        assert_eq!(forwarded.facility, FacilityId(0));
        assert_eq!(forwarded.timestamp, 3.25);
        assert_eq!(forwarded.patient.id, PatientId(7));
        assert_eq!(facility.routing().hemorrhagic_transferred, 1);
        assert_eq!(facility.occupancy(), 0);
    }

    #[test]
    fn psc_with_zero_transfer_rate_absorbs_ischemic() {
        let mut facility = psc(0.0);
        let mut rng = StdRng::seed_from_u64(0);
        let policy = policy(NonStrokeRouting::TransferAll);
        for id in 0..50 {
            let patient = ischemic(id, Origin::Psc(FacilityId(1)), 1.0, 1.0, true);
            assert!(facility
                .process_arrival(&arrival(patient, FacilityId(1)), &policy, &mut rng)
                .is_none());
        }
        assert_eq!(facility.routing().absorbed, 50);
        assert_eq!(facility.routing().transferred(), 0);
    }

    #[test]
    fn psc_non_stroke_routing_follows_policy() {
        let mut rng = StdRng::seed_from_u64(0);
        let patient = non_stroke(1, Origin::Psc(FacilityId(1)), 0.0, 1.0);

        let mut transfer_all = psc(0.0);
        assert!(transfer_all
            .process_arrival(
                &arrival(patient, FacilityId(1)),
                &policy(NonStrokeRouting::TransferAll),
                &mut rng,
            )
            .is_some());

        let mut local = psc(1.0);
        assert!(local
            .process_arrival(
                &arrival(patient, FacilityId(1)),
                &policy(NonStrokeRouting::Local),
                &mut rng,
            )
            .is_none());

        let mut follow = psc(1.0);
        assert!(follow
            .process_arrival(
                &arrival(patient, FacilityId(1)),
                &policy(NonStrokeRouting::FollowTransferRate),
                &mut rng,
            )
            .is_some());
        assert_eq!(follow.routing().non_stroke_transferred, 1);
    }

    #[test]
    fn report_histogram_and_blocking_probability() {
        let mut facility = csc(1);
        let mut rng = StdRng::seed_from_u64(0);
        let policy = policy(NonStrokeRouting::TransferAll);
        let departure = facility
            .process_arrival(
                &arrival(non_stroke(1, Origin::Direct, 2.0, 6.0), FacilityId(0)),
                &policy,
                &mut rng,
            )
            .expect("admitted");
        facility.process_departure(&departure);
        facility.close(10.0);

        let report = facility.report(10.0, AdmissionBoundary::Strict);
        assert_eq!(report.histogram.len(), 2);
        assert!((report.histogram[0] - 0.4).abs() < 1e-12);
        assert!((report.blocking_probability - 0.6).abs() < 1e-12);
        assert!((report.average_occupancy - 0.6).abs() < 1e-12);
        assert!((report.average_direct - 0.6).abs() < 1e-12);
        assert_eq!(report.average_stroke, 0.0);
        assert_eq!(report.transfer_needed_rejection_share(), None);
    }

    #[test]
    fn registry_lists_cscs_before_pscs() {
        let registry = build_registry(&NetworkConfig::reference());
        assert_eq!(registry.len(), 4);
        assert!(matches!(registry[0].kind, FacilityKind::Csc { capacity: 28 }));
        assert!(registry[1..]
            .iter()
            .all(|f| matches!(f.kind, FacilityKind::Psc { .. })));
        assert!(registry.iter().enumerate().all(|(i, f)| f.id == FacilityId(i)));
    }
}
