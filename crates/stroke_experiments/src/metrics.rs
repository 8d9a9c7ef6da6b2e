//! Ensemble aggregation: arithmetic means across replications.
//!
//! Every scalar and every histogram bucket is averaged across replications.
//! The overall blocking probability is the averaged hub histogram's mass at
//! its highest occupancy level.

use std::fmt;

use serde::Serialize;
use stroke_sim::clock::FacilityId;
use stroke_sim::facility::FacilityReport;
use stroke_sim::runner::ReplicationReport;

use crate::error::ExperimentError;

/// Sample statistics of one metric across replications.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator); 0 for fewer than two samples.
    pub std_dev: f64,
    /// Standard error of the mean.
    pub std_error: f64,
    pub n: usize,
}

impl Summary {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self {
                mean: 0.0,
                std_dev: 0.0,
                std_error: 0.0,
                n,
            };
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let std_dev = if n > 1 {
            let variance = samples
                .iter()
                .map(|sample| (sample - mean).powi(2))
                .sum::<f64>()
                / (n - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };
        Self {
            mean,
            std_dev,
            std_error: std_dev / (n as f64).sqrt(),
            n,
        }
    }
}

/// One facility's statistics averaged over every replication.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacilitySummary {
    pub facility: FacilityId,
    pub name: String,
    pub kind: &'static str,
    pub capacity: Option<u32>,
    pub arrivals: f64,
    pub admissions: f64,
    pub rejections: f64,
    pub rejections_transfer_needed: f64,
    pub rejections_transfer_not_needed: f64,
    pub hemorrhagic_transferred: f64,
    pub ischemic_transferred: f64,
    pub non_stroke_transferred: f64,
    pub absorbed: f64,
    pub average_occupancy: Summary,
    pub average_stroke: f64,
    pub average_should_be_at_csc: f64,
    pub average_should_not_be_at_csc: f64,
    pub average_from_psc: f64,
    pub average_direct: f64,
    pub histogram: Vec<f64>,
    pub blocking_probability: Summary,
}

impl FacilitySummary {
    fn from_reports(reports: &[&FacilityReport]) -> Option<Self> {
        let first = reports.first()?;
        let mean = |metric: &dyn Fn(&FacilityReport) -> f64| {
            reports.iter().map(|report| metric(report)).sum::<f64>() / reports.len() as f64
        };
        let summary = |metric: &dyn Fn(&FacilityReport) -> f64| {
            let samples: Vec<f64> = reports.iter().map(|report| metric(report)).collect();
            Summary::from_samples(&samples)
        };

        Some(Self {
            facility: first.facility,
            name: first.name.clone(),
            kind: first.kind,
            capacity: first.capacity,
            arrivals: mean(&|r| r.arrivals as f64),
            admissions: mean(&|r| r.admissions as f64),
            rejections: mean(&|r| r.rejections.total as f64),
            rejections_transfer_needed: mean(&|r| r.rejections.transfer_needed as f64),
            rejections_transfer_not_needed: mean(&|r| r.rejections.transfer_not_needed as f64),
            hemorrhagic_transferred: mean(&|r| r.routing.hemorrhagic_transferred as f64),
            ischemic_transferred: mean(&|r| r.routing.ischemic_transferred as f64),
            non_stroke_transferred: mean(&|r| r.routing.non_stroke_transferred as f64),
            absorbed: mean(&|r| r.routing.absorbed as f64),
            average_occupancy: summary(&|r| r.average_occupancy),
            average_stroke: mean(&|r| r.average_stroke),
            average_should_be_at_csc: mean(&|r| r.average_should_be_at_csc),
            average_should_not_be_at_csc: mean(&|r| r.average_should_not_be_at_csc),
            average_from_psc: mean(&|r| r.average_from_psc),
            average_direct: mean(&|r| r.average_direct),
            histogram: average_histograms(reports.iter().map(|report| report.histogram.as_slice())),
            blocking_probability: summary(&|r| r.blocking_probability),
        })
    }

    /// Share of rejected stroke patients that needed a transfer; `None` when
    /// no stroke patient was rejected in any replication.
    pub fn transfer_needed_rejection_share(&self) -> Option<f64> {
        let stroke = self.rejections_transfer_needed + self.rejections_transfer_not_needed;
        (stroke > 0.0).then(|| self.rejections_transfer_needed / stroke)
    }

    pub fn transferred(&self) -> f64 {
        self.hemorrhagic_transferred + self.ischemic_transferred + self.non_stroke_transferred
    }
}

/// Bucket-wise mean of histograms; shorter histograms count as zero beyond their end.
pub fn average_histograms<'a>(histograms: impl Iterator<Item = &'a [f64]>) -> Vec<f64> {
    let mut total: Vec<f64> = Vec::new();
    let mut count = 0usize;
    for histogram in histograms {
        if histogram.len() > total.len() {
            total.resize(histogram.len(), 0.0);
        }
        for (bucket, share) in total.iter_mut().zip(histogram) {
            *bucket += share;
        }
        count += 1;
    }
    if count > 0 {
        for bucket in &mut total {
            *bucket /= count as f64;
        }
    }
    total
}

/// Averaged output of a whole ensemble.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnsembleReport {
    pub base_seed: u64,
    pub replications: usize,
    pub duration: f64,
    pub hub: Option<FacilityId>,
    pub facilities: Vec<FacilitySummary>,
    /// Averaged hub histogram mass at full occupancy.
    pub overall_blocking_probability: f64,
}

impl EnsembleReport {
    pub fn from_replications(
        reports: &[ReplicationReport],
        base_seed: u64,
    ) -> Result<Self, ExperimentError> {
        let first = reports.first().ok_or(ExperimentError::EmptyEnsemble)?;
        let facilities: Vec<FacilitySummary> = (0..first.facilities.len())
            .filter_map(|index| {
                let per_replication: Vec<&FacilityReport> = reports
                    .iter()
                    .filter_map(|report| report.facilities.get(index))
                    .collect();
                FacilitySummary::from_reports(&per_replication)
            })
            .collect();

        let overall_blocking_probability = first
            .hub
            .and_then(|hub| facilities.get(hub.0))
            .and_then(|hub| hub.histogram.last().copied())
            .unwrap_or(0.0);

        Ok(Self {
            base_seed,
            replications: reports.len(),
            duration: first.duration,
            hub: first.hub,
            facilities,
            overall_blocking_probability,
        })
    }

    pub fn hub(&self) -> Option<&FacilitySummary> {
        self.hub.and_then(|id| self.facilities.get(id.0))
    }
}

impl fmt::Display for EnsembleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Averaged Results ({} replications, {} days, base seed {})",
            self.replications, self.duration, self.base_seed
        )?;
        for facility in &self.facilities {
            writeln!(f)?;
            match facility.capacity {
                Some(capacity) => writeln!(
                    f,
                    "{} {} ({}, {} beds)",
                    facility.kind, facility.facility, facility.name, capacity
                )?,
                None => writeln!(f, "{} {} ({})", facility.kind, facility.facility, facility.name)?,
            }
            writeln!(f, "  Arrivals:                    {:.2}", facility.arrivals)?;
            if facility.capacity.is_none() {
                writeln!(
                    f,
                    "  Transferred:                 {:.2} (hemorrhagic {:.2}, ischemic {:.2}, non-stroke {:.2})",
                    facility.transferred(),
                    facility.hemorrhagic_transferred,
                    facility.ischemic_transferred,
                    facility.non_stroke_transferred
                )?;
                writeln!(f, "  Treated locally:             {:.2}", facility.absorbed)?;
                continue;
            }
            writeln!(f, "  Rejections:                  {:.2}", facility.rejections)?;
            writeln!(
                f,
                "  Rejections needing transfer: {:.2}",
                facility.rejections_transfer_needed
            )?;
            writeln!(
                f,
                "  Rejections not needing it:   {:.2}",
                facility.rejections_transfer_not_needed
            )?;
            match facility.transfer_needed_rejection_share() {
                Some(share) => writeln!(f, "  Rejected needing transfer:   {:.2}%", share * 100.0)?,
                None => writeln!(f, "  Rejected needing transfer:   undefined")?,
            }
            writeln!(
                f,
                "  Average occupancy:           {:.3} ± {:.3}",
                facility.average_occupancy.mean, facility.average_occupancy.std_error
            )?;
            writeln!(f, "  Average stroke patients:     {:.3}", facility.average_stroke)?;
            writeln!(
                f,
                "  Should be at CSC:            {:.3}",
                facility.average_should_be_at_csc
            )?;
            writeln!(
                f,
                "  Should not be at CSC:        {:.3}",
                facility.average_should_not_be_at_csc
            )?;
            writeln!(f, "  From PSC:                    {:.3}", facility.average_from_psc)?;
            writeln!(f, "  Direct:                      {:.3}", facility.average_direct)?;
            writeln!(
                f,
                "  Blocking probability:        {:.4} ± {:.4}",
                facility.blocking_probability.mean, facility.blocking_probability.std_error
            )?;
        }
        writeln!(f)?;
        write!(
            f,
            "Overall Blocking Probability: {:.4}",
            self.overall_blocking_probability
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stroke_sim::facility::{RejectionCounts, RoutingCounts};

    fn csc_report(rejections: RejectionCounts, histogram: Vec<f64>) -> FacilityReport {
        let blocking_probability = histogram.last().copied().unwrap_or(0.0);
        let average_occupancy = histogram
            .iter()
            .enumerate()
            .map(|(level, share)| level as f64 * share)
            .sum();
        FacilityReport {
            facility: FacilityId(0),
            name: "Hub".to_string(),
            kind: "CSC",
            capacity: Some(histogram.len() as u32 - 1),
            arrivals: 10,
            admissions: 10 - rejections.total,
            departures: 10 - rejections.total,
            rejections,
            routing: RoutingCounts::default(),
            average_occupancy,
            average_stroke: 0.0,
            average_should_be_at_csc: 0.0,
            average_should_not_be_at_csc: 0.0,
            average_from_psc: 0.0,
            average_direct: average_occupancy,
            histogram,
            blocking_probability,
        }
    }

    fn replication(seed: u64, facility: FacilityReport) -> ReplicationReport {
        ReplicationReport {
            seed,
            duration: 100.0,
            events_processed: 0,
            hub: Some(FacilityId(0)),
            facilities: vec![facility],
        }
    }

    #[test]
    fn summary_of_known_samples() {
        let summary = Summary::from_samples(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(summary.n, 8);
        assert!((summary.mean - 5.0).abs() < 1e-12);
        assert!((summary.std_dev - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert!((summary.std_error - summary.std_dev / 8f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn summary_of_one_sample_has_no_spread() {
        let summary = Summary::from_samples(&[0.3]);
        assert_eq!(summary.mean, 0.3);
        assert_eq!(summary.std_dev, 0.0);
        assert_eq!(summary.std_error, 0.0);
    }

    #[test]
    fn histograms_average_bucket_by_bucket() {
        let histograms = [vec![0.5, 0.5], vec![1.0, 0.0, 0.0], vec![0.0, 0.25, 0.75]];
        let averaged = average_histograms(histograms.iter().map(Vec::as_slice));
        assert_eq!(averaged.len(), 3);
        assert!((averaged[0] - 0.5).abs() < 1e-12);
        assert!((averaged[1] - 0.25).abs() < 1e-12);
        assert!((averaged[2] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn overall_blocking_is_mass_at_full_occupancy() {
        let reports = vec![
            replication(1, csc_report(RejectionCounts::default(), vec![0.6, 0.3, 0.1])),
            replication(2, csc_report(RejectionCounts::default(), vec![0.4, 0.3, 0.3])),
        ];
        let ensemble = EnsembleReport::from_replications(&reports, 1).expect("non-empty");
        assert_eq!(ensemble.replications, 2);
        assert!((ensemble.overall_blocking_probability - 0.2).abs() < 1e-12);
        let hub = ensemble.hub().expect("hub");
        assert!((hub.blocking_probability.mean - 0.2).abs() < 1e-12);
        assert_eq!(hub.blocking_probability.n, 2);
    }

    #[test]
    fn rejection_share_is_undefined_without_stroke_rejections() {
        let reports = vec![replication(
            1,
            csc_report(
                RejectionCounts {
                    total: 3,
                    transfer_needed: 0,
                    transfer_not_needed: 0,
                },
                vec![0.5, 0.5],
            ),
        )];
        let ensemble = EnsembleReport::from_replications(&reports, 1).expect("non-empty");
        let hub = ensemble.hub().expect("hub");
        assert_eq!(hub.transfer_needed_rejection_share(), None);
        assert!(ensemble
            .to_string()
            .contains("Rejected needing transfer:   undefined"));
    }

    #[test]
    fn rejection_share_averages_sub_counters() {
        let reports = vec![
            replication(
                1,
                csc_report(
                    RejectionCounts {
                        total: 4,
                        transfer_needed: 1,
                        transfer_not_needed: 3,
                    },
                    vec![0.5, 0.5],
                ),
            ),
            replication(
                2,
                csc_report(
                    RejectionCounts {
                        total: 2,
                        transfer_needed: 1,
                        transfer_not_needed: 1,
                    },
                    vec![0.5, 0.5],
                ),
            ),
        ];
        let ensemble = EnsembleReport::from_replications(&reports, 1).expect("non-empty");
        let share = ensemble
            .hub()
            .and_then(FacilitySummary::transfer_needed_rejection_share)
            .expect("stroke patients rejected");
        assert!((share - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn empty_ensemble_is_an_error() {
        assert!(matches!(
            EnsembleReport::from_replications(&[], 0),
            Err(ExperimentError::EmptyEnsemble)
        ));
    }

    #[test]
    fn display_renders_the_averaged_results_block() {
        let reports = vec![replication(
            7,
            csc_report(RejectionCounts::default(), vec![0.75, 0.25]),
        )];
        let rendered = EnsembleReport::from_replications(&reports, 7)
            .expect("non-empty")
            .to_string();
        assert!(rendered.starts_with("Averaged Results (1 replications"));
        assert!(rendered.contains("CSC #0 (Hub, 1 beds)"));
        assert!(rendered.ends_with("Overall Blocking Probability: 0.2500"));
    }
}
