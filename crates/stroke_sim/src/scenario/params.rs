use serde::Serialize;

use crate::clock::SimTime;
use crate::error::ConfigError;

/// Share of stroke patients with a hemorrhagic subtype in the reference configuration.
pub const DEFAULT_HEMORRHAGIC_PROBABILITY: f64 = 0.13;

/// Reference mean service durations (days).
const DEFAULT_ISCHEMIC_MEAN_DAYS: f64 = 4.0;
const DEFAULT_HEMORRHAGIC_MEAN_DAYS: f64 = 7.0;
const DEFAULT_NON_STROKE_MEAN_DAYS: f64 = 3.3;

/// Reference horizon: one year of simulated days.
const DEFAULT_DURATION_DAYS: f64 = 365.0;

/// Largest CSC bed count a configuration may declare.
pub const MAX_CAPACITY: u32 = 10_000;

/// CSC admission rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum AdmissionBoundary {
    /// Admit while occupancy < capacity.
    #[default]
    Strict,
    /// Admit while occupancy <= capacity, allowing one patient over nominal capacity.
    Inclusive,
}

impl AdmissionBoundary {
    pub fn admits(self, occupancy: u32, capacity: u32) -> bool {
        match self {
            Self::Strict => occupancy < capacity,
            Self::Inclusive => occupancy <= capacity,
        }
    }

    /// Highest occupancy a CSC of this capacity can reach.
    pub fn max_occupancy(self, capacity: u32) -> u32 {
        match self {
            Self::Strict => capacity,
            Self::Inclusive => capacity.saturating_add(1),
        }
    }
}

/// What a PSC does with non-stroke patients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum NonStrokeRouting {
    /// Every non-stroke patient is sent on to the CSC.
    #[default]
    TransferAll,
    /// Non-stroke patients stay at the PSC.
    Local,
    /// Non-stroke patients are sent on with the PSC's transfer probability.
    FollowTransferRate,
}

/// Network-wide parameters shared by every facility.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationParams {
    pub ischemic_mean_duration: SimTime,
    pub hemorrhagic_mean_duration: SimTime,
    pub non_stroke_mean_duration: SimTime,
    /// Probability (0.0–1.0) that an ischemic stroke patient needs CSC-level care.
    pub transfer_needed_probability: f64,
    /// Probability (0.0–1.0) that a stroke is hemorrhagic.
    pub hemorrhagic_probability: f64,
    pub duration: SimTime,
    pub replications: usize,
    pub admission_boundary: AdmissionBoundary,
    pub non_stroke_routing: NonStrokeRouting,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            ischemic_mean_duration: DEFAULT_ISCHEMIC_MEAN_DAYS,
            hemorrhagic_mean_duration: DEFAULT_HEMORRHAGIC_MEAN_DAYS,
            non_stroke_mean_duration: DEFAULT_NON_STROKE_MEAN_DAYS,
            transfer_needed_probability: 0.25,
            hemorrhagic_probability: DEFAULT_HEMORRHAGIC_PROBABILITY,
            duration: DEFAULT_DURATION_DAYS,
            replications: 10,
            admission_boundary: AdmissionBoundary::default(),
            non_stroke_routing: NonStrokeRouting::default(),
        }
    }
}

impl SimulationParams {
    pub fn with_duration(mut self, duration: SimTime) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_replications(mut self, replications: usize) -> Self {
        self.replications = replications;
        self
    }

    pub fn with_hemorrhagic_probability(mut self, probability: f64) -> Self {
        self.hemorrhagic_probability = probability;
        self
    }

    pub fn with_transfer_needed_probability(mut self, probability: f64) -> Self {
        self.transfer_needed_probability = probability;
        self
    }

    pub fn with_admission_boundary(mut self, boundary: AdmissionBoundary) -> Self {
        self.admission_boundary = boundary;
        self
    }

    pub fn with_non_stroke_routing(mut self, routing: NonStrokeRouting) -> Self {
        self.non_stroke_routing = routing;
        self
    }

    /// Set all three mean service durations at once.
    pub fn with_mean_durations(
        mut self,
        ischemic: SimTime,
        hemorrhagic: SimTime,
        non_stroke: SimTime,
    ) -> Self {
        self.ischemic_mean_duration = ischemic;
        self.hemorrhagic_mean_duration = hemorrhagic;
        self.non_stroke_mean_duration = non_stroke;
        self
    }

    /// Expected service duration of a stroke patient, mixing both subtypes.
    pub fn mean_stroke_duration(&self) -> SimTime {
        self.hemorrhagic_probability * self.hemorrhagic_mean_duration
            + (1.0 - self.hemorrhagic_probability) * self.ischemic_mean_duration
    }

    fn validate(&self) -> Result<(), ConfigError> {
        positive("ischemic mean duration", self.ischemic_mean_duration)?;
        positive("hemorrhagic mean duration", self.hemorrhagic_mean_duration)?;
        positive("non-stroke mean duration", self.non_stroke_mean_duration)?;
        positive("simulation duration", self.duration)?;
        probability("transfer-needed probability", self.transfer_needed_probability)?;
        probability("hemorrhagic probability", self.hemorrhagic_probability)?;
        if self.replications == 0 {
            return Err(ConfigError::InvalidValue {
                field: "number of replications".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// One comprehensive stroke center.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CscConfig {
    pub name: String,
    pub capacity: u32,
    pub stroke_rate: f64,
    pub non_stroke_rate: f64,
}

impl CscConfig {
    pub fn new(
        name: impl Into<String>,
        capacity: u32,
        stroke_rate: f64,
        non_stroke_rate: f64,
    ) -> Self {
        Self {
            name: name.into(),
            capacity,
            stroke_rate,
            non_stroke_rate,
        }
    }
}

/// One primary stroke center feeding the hub CSC.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PscConfig {
    pub name: String,
    /// Probability that an ischemic stroke patient is routed to the CSC.
    pub transfer_rate: f64,
    pub stroke_rate: f64,
    pub non_stroke_rate: f64,
}

impl PscConfig {
    pub fn new(
        name: impl Into<String>,
        transfer_rate: f64,
        stroke_rate: f64,
        non_stroke_rate: f64,
    ) -> Self {
        Self {
            name: name.into(),
            transfer_rate,
            stroke_rate,
            non_stroke_rate,
        }
    }
}

/// Immutable description of a whole two-tier network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkConfig {
    pub params: SimulationParams,
    pub cscs: Vec<CscConfig>,
    pub pscs: Vec<PscConfig>,
}

impl NetworkConfig {
    pub fn new(params: SimulationParams, cscs: Vec<CscConfig>, pscs: Vec<PscConfig>) -> Self {
        Self { params, cscs, pscs }
    }

    /// Large-CSC reference network: a 28-bed hub fed by three PSCs.
    pub fn reference() -> Self {
        Self {
            params: SimulationParams::default(),
            cscs: vec![CscConfig::new("Hub CSC", 28, 1.2, 1.0)],
            pscs: vec![
                PscConfig::new("PSC North", 0.667, 0.6, 0.45),
                PscConfig::new("PSC East", 0.667, 0.6, 0.45),
                PscConfig::new("PSC South", 0.667, 0.6, 0.45),
            ],
        }
    }

    pub fn with_params(mut self, params: SimulationParams) -> Self {
        self.params = params;
        self
    }

    /// Copy of this network with every PSC's transfer rate replaced.
    pub fn with_uniform_transfer_rate(&self, transfer_rate: f64) -> Self {
        let mut config = self.clone();
        for psc in &mut config.pscs {
            psc.transfer_rate = transfer_rate;
        }
        config
    }

    pub fn facility_count(&self) -> usize {
        self.cscs.len() + self.pscs.len()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params.validate()?;
        if self.cscs.is_empty() && !self.pscs.is_empty() {
            return Err(ConfigError::NoCsc(self.pscs.len()));
        }
        for csc in &self.cscs {
            if csc.capacity > MAX_CAPACITY {
                return Err(ConfigError::InvalidValue {
                    field: format!("{} bed count", csc.name),
                    reason: format!("expected at most {MAX_CAPACITY} beds, got {}", csc.capacity),
                });
            }
            rate(&csc.name, "stroke arrival rate", csc.stroke_rate)?;
            rate(&csc.name, "non-stroke arrival rate", csc.non_stroke_rate)?;
        }
        for psc in &self.pscs {
            probability(&format!("{} transfer rate", psc.name), psc.transfer_rate)?;
            rate(&psc.name, "stroke arrival rate", psc.stroke_rate)?;
            rate(&psc.name, "non-stroke arrival rate", psc.non_stroke_rate)?;
        }
        Ok(())
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::reference()
    }
}

fn positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected a positive number, got {value}"),
        })
    }
}

fn probability(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected a probability in [0, 1], got {value}"),
        })
    }
}

fn rate(facility: &str, field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field: format!("{facility} {field}"),
            reason: format!("expected a non-negative rate, got {value}"),
        })
    }
}
