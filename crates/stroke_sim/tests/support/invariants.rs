use stroke_sim::clock::{Event, SimTime};
use stroke_sim::facility::{Facility, FacilityKind};
use stroke_sim::scenario::AdmissionBoundary;

/// Run hook that records every invariant violation seen after each event.
#[derive(Debug)]
pub struct InvariantChecker {
    boundary: AdmissionBoundary,
    duration: SimTime,
    last_time: SimTime,
    pub events: u64,
    pub violations: Vec<String>,
}

impl InvariantChecker {
    pub fn new(boundary: AdmissionBoundary, duration: SimTime) -> Self {
        Self {
            boundary,
            duration,
            last_time: 0.0,
            events: 0,
            violations: Vec::new(),
        }
    }

    pub fn observe(&mut self, facilities: &[Facility], event: &Event) {
        self.events += 1;
        if event.timestamp < self.last_time {
            self.violations.push(format!(
                "clock went from {} to {}",
                self.last_time, event.timestamp
            ));
        }
        if event.timestamp >= self.duration {
            self.violations
                .push(format!("processed event at {} past the horizon", event.timestamp));
        }
        self.last_time = event.timestamp;

        for facility in facilities {
            let in_house = facility.admissions() - facility.departures();
            if in_house != u64::from(facility.occupancy()) {
                self.violations.push(format!(
                    "{} holds {} but admitted {} and discharged {}",
                    facility.name,
                    facility.occupancy(),
                    facility.admissions(),
                    facility.departures()
                ));
            }
            match facility.kind {
                FacilityKind::Csc { capacity } => {
                    if facility.occupancy() > self.boundary.max_occupancy(capacity) {
                        self.violations.push(format!(
                            "{} over capacity: {} > {}",
                            facility.name,
                            facility.occupancy(),
                            capacity
                        ));
                    }
                    if facility.arrivals() != facility.admissions() + facility.rejections().total {
                        self.violations
                            .push(format!("{} lost track of an arrival", facility.name));
                    }
                }
                FacilityKind::Psc { .. } => {
                    if facility.occupancy() != 0 {
                        self.violations.push(format!("{} holds patients", facility.name));
                    }
                    let routed =
                        facility.routing().transferred() + facility.routing().absorbed;
                    if facility.arrivals() != routed {
                        self.violations
                            .push(format!("{} lost track of an arrival", facility.name));
                    }
                }
            }
        }
    }

    pub fn assert_clean(&self) {
        assert!(
            self.violations.is_empty(),
            "invariant violations: {:#?}",
            self.violations
        );
    }
}
