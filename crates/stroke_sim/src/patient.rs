use serde::Serialize;

use crate::clock::{FacilityId, SimTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PatientId(pub u64);

/// Where the patient first presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Origin {
    /// Presented directly at a CSC.
    Direct,
    /// Presented at the given PSC.
    Psc(FacilityId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StrokeType {
    Ischemic,
    Hemorrhagic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Condition {
    Stroke {
        stroke_type: StrokeType,
        /// Always true for hemorrhagic strokes.
        transfer_needed: bool,
    },
    NonStroke,
}

/// One patient as carried by events. Service duration is drawn once at spawn
/// so the completion time is fixed no matter which facility admits them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PatientRecord {
    pub id: PatientId,
    pub origin: Origin,
    pub spawn_time: SimTime,
    pub service_duration: SimTime,
    pub condition: Condition,
}

impl PatientRecord {
    pub fn stroke(
        id: PatientId,
        origin: Origin,
        spawn_time: SimTime,
        service_duration: SimTime,
        stroke_type: StrokeType,
        transfer_needed: bool,
    ) -> Self {
        Self {
            id,
            origin,
            spawn_time,
            service_duration,
            condition: Condition::Stroke {
                stroke_type,
                transfer_needed: transfer_needed || stroke_type == StrokeType::Hemorrhagic,
            },
        }
    }

    pub fn non_stroke(
        id: PatientId,
        origin: Origin,
        spawn_time: SimTime,
        service_duration: SimTime,
    ) -> Self {
        Self {
            id,
            origin,
            spawn_time,
            service_duration,
            condition: Condition::NonStroke,
        }
    }

    pub fn completion_time(&self) -> SimTime {
        self.spawn_time + self.service_duration
    }

    pub fn is_stroke(&self) -> bool {
        matches!(self.condition, Condition::Stroke { .. })
    }

    pub fn stroke_type(&self) -> Option<StrokeType> {
        match self.condition {
            Condition::Stroke { stroke_type, .. } => Some(stroke_type),
            Condition::NonStroke => None,
        }
    }

    /// `None` for non-stroke patients, who carry no transfer flag.
    pub fn transfer_needed(&self) -> Option<bool> {
        match self.condition {
            Condition::Stroke {
                transfer_needed, ..
            } => Some(transfer_needed),
            Condition::NonStroke => None,
        }
    }

    pub fn from_psc(&self) -> bool {
        matches!(self.origin, Origin::Psc(_))
    }
}
