//! Occupancy telemetry: per-category step series and their time-weighted reductions.
//!
//! A series is a list of `(value, time)` samples where each value holds from its
//! time until the next sample's time. Every series starts at `(0, 0.0)` and is
//! closed at the simulation duration, so the step function covers exactly
//! `[0, duration]`.

use serde::Serialize;

use crate::clock::SimTime;
use crate::patient::PatientRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    /// Every admitted patient.
    All,
    Stroke,
    /// Stroke patients that need CSC-level care.
    ShouldBeAtCsc,
    /// Stroke patients that could have been treated at a PSC.
    ShouldNotBeAtCsc,
    FromPsc,
    Direct,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::All,
        Category::Stroke,
        Category::ShouldBeAtCsc,
        Category::ShouldNotBeAtCsc,
        Category::FromPsc,
        Category::Direct,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Whether `patient` is counted in this category.
    pub fn includes(self, patient: &PatientRecord) -> bool {
        match self {
            Category::All => true,
            Category::Stroke => patient.is_stroke(),
            Category::ShouldBeAtCsc => patient.transfer_needed() == Some(true),
            Category::ShouldNotBeAtCsc => patient.transfer_needed() == Some(false),
            Category::FromPsc => patient.from_psc(),
            Category::Direct => !patient.from_psc(),
        }
    }
}

/// Time-ordered `(value, time)` samples of one counter.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancySeries {
    samples: Vec<(u32, SimTime)>,
}

impl Default for OccupancySeries {
    fn default() -> Self {
        Self {
            samples: vec![(0, 0.0)],
        }
    }
}

impl OccupancySeries {
    pub fn record(&mut self, value: u32, time: SimTime) {
        debug_assert!(
            self.samples.last().map_or(true, |&(_, last)| time >= last),
            "series samples must be time ordered"
        );
        self.samples.push((value, time));
    }

    pub fn samples(&self) -> &[(u32, SimTime)] {
        &self.samples
    }

    pub fn last_value(&self) -> u32 {
        self.samples.last().map_or(0, |&(value, _)| value)
    }

    /// Append the terminal sample at `end` carrying the current value.
    pub fn close(&mut self, end: SimTime) {
        let value = self.last_value();
        self.record(value, end);
    }

    pub fn time_weighted_average(&self, duration: SimTime) -> f64 {
        time_weighted_average(&self.samples, duration)
    }
}

/// `Σ vᵢ · (tᵢ₊₁ − tᵢ) / duration` over consecutive samples.
pub fn time_weighted_average(samples: &[(u32, SimTime)], duration: SimTime) -> f64 {
    if duration <= 0.0 {
        return 0.0;
    }
    samples
        .windows(2)
        .map(|pair| f64::from(pair[0].0) * (pair[1].1 - pair[0].1))
        .sum::<f64>()
        / duration
}

/// Fraction of `duration` spent at each integer level. The histogram has at
/// least `buckets` entries and grows if the series visits a higher level.
pub fn occupancy_histogram(
    samples: &[(u32, SimTime)],
    buckets: usize,
    duration: SimTime,
) -> Vec<f64> {
    let mut histogram = vec![0.0; buckets];
    if duration <= 0.0 {
        return histogram;
    }
    for pair in samples.windows(2) {
        let level = pair[0].0 as usize;
        if level >= histogram.len() {
            histogram.resize(level + 1, 0.0);
        }
        histogram[level] += (pair[1].1 - pair[0].1) / duration;
    }
    histogram
}

/// Live per-category counters plus the series they feed.
#[derive(Debug, Clone, Default)]
pub struct OccupancyTelemetry {
    counts: [u32; 6],
    series: [OccupancySeries; 6],
}

impl OccupancyTelemetry {
    pub fn count(&self, category: Category) -> u32 {
        self.counts[category.index()]
    }

    pub fn series(&self, category: Category) -> &OccupancySeries {
        &self.series[category.index()]
    }

    pub fn admit(&mut self, patient: &PatientRecord, time: SimTime) {
        for category in Category::ALL {
            if category.includes(patient) {
                self.counts[category.index()] += 1;
            }
        }
        self.record_all(time);
    }

    pub fn discharge(&mut self, patient: &PatientRecord, time: SimTime) {
        for category in Category::ALL {
            if category.includes(patient) {
                let count = &mut self.counts[category.index()];
                debug_assert!(*count > 0, "discharge without admission in {category:?}");
                *count = count.saturating_sub(1);
            }
        }
        self.record_all(time);
    }

    fn record_all(&mut self, time: SimTime) {
        for (series, &count) in self.series.iter_mut().zip(self.counts.iter()) {
            series.record(count, time);
        }
    }

    pub fn close(&mut self, end: SimTime) {
        for series in &mut self.series {
            series.close(end);
        }
    }

    pub fn average(&self, category: Category, duration: SimTime) -> f64 {
        self.series(category).time_weighted_average(duration)
    }
}
