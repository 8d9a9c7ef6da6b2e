//! Simulated time, events, and the min-priority event queue.
//!
//! Time is a continuous `f64` (days in the reference configuration). The queue
//! orders events by timestamp and breaks ties by insertion sequence, so events
//! scheduled for the same instant pop in the order they were pushed.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::SimulationError;
use crate::patient::PatientRecord;

/// Simulated time.
pub type SimTime = f64;

/// Index of a facility in the simulation registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct FacilityId(pub usize);

impl std::fmt::Display for FacilityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum EventKind {
    Arrival,
    Departure,
}

/// A timestamped unit of work for one patient at one facility.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub timestamp: SimTime,
    pub kind: EventKind,
    pub facility: FacilityId,
    pub patient: PatientRecord,
}

impl Event {
    pub fn arrival(timestamp: SimTime, facility: FacilityId, patient: PatientRecord) -> Self {
        Self {
            timestamp,
            kind: EventKind::Arrival,
            facility,
            patient,
        }
    }

    pub fn departure(timestamp: SimTime, facility: FacilityId, patient: PatientRecord) -> Self {
        Self {
            timestamp,
            kind: EventKind::Departure,
            facility,
            patient,
        }
    }
}

/// Heap entry: the event plus the insertion sequence used for tie-breaking.
#[derive(Debug)]
struct QueuedEvent {
    seq: u64,
    event: Event,
}

impl PartialEq for QueuedEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedEvent {}

impl Ord for QueuedEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by (timestamp, seq).
        other
            .event
            .timestamp
            .total_cmp(&self.event.timestamp)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueuedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
pub struct EventQueue {
    next_seq: u64,
    events: BinaryHeap<QueuedEvent>,
}

impl EventQueue {
    /// Build a queue from an initial event collection in one heapify pass.
    /// Sequence numbers follow the iteration order of `events`.
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Self {
        let mut next_seq = 0;
        let heap = events
            .into_iter()
            .map(|event| {
                let seq = next_seq;
                next_seq += 1;
                QueuedEvent { seq, event }
            })
            .collect::<Vec<_>>();
        Self {
            next_seq,
            events: BinaryHeap::from(heap),
        }
    }

    pub fn push(&mut self, event: Event) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(QueuedEvent { seq, event });
    }

    /// Remove and return the earliest event.
    pub fn pop_min(&mut self) -> Result<Event, SimulationError> {
        self.events
            .pop()
            .map(|queued| queued.event)
            .ok_or(SimulationError::EmptyQueue)
    }

    pub fn next_event_time(&self) -> Option<SimTime> {
        self.events.peek().map(|queued| queued.event.timestamp)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::{Origin, PatientId, PatientRecord};

    fn event_at(timestamp: SimTime, id: u64) -> Event {
        Event::arrival(
            timestamp,
            FacilityId(0),
            PatientRecord::non_stroke(PatientId(id), Origin::Direct, timestamp, 1.0),
        )
    }

    #[test]
    fn queue_pops_events_in_time_order() {
        let mut queue = EventQueue::default();
        queue.push(event_at(10.0, 1));
        queue.push(event_at(5.0, 2));
        queue.push(event_at(20.0, 3));

        assert_eq!(queue.pop_min().expect("first").timestamp, 5.0);
        assert_eq!(queue.pop_min().expect("second").timestamp, 10.0);
        assert_eq!(queue.pop_min().expect("third").timestamp, 20.0);
        assert!(queue.is_empty());
    }

    #[test]
    fn equal_timestamps_pop_in_insertion_order() {
        let mut queue = EventQueue::from_events(vec![event_at(3.0, 7), event_at(1.0, 8)]);
        queue.push(event_at(3.0, 9));
        queue.push(event_at(3.0, 10));

        let ids: Vec<u64> = std::iter::from_fn(|| queue.pop_min().ok())
            .map(|event| event.patient.id.0)
            .collect();
        assert_eq!(ids, vec![8, 7, 9, 10]);
    }

    #[test]
    fn pop_on_empty_queue_is_an_error() {
        let mut queue = EventQueue::default();
        assert_eq!(queue.next_event_time(), None);
        assert!(matches!(queue.pop_min(), Err(SimulationError::EmptyQueue)));
    }
}
