use crate::metrics::EnsembleReport;
use crate::sweep::SweepPoint;

pub(crate) fn export_sweep_impl(
    points: &[SweepPoint],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(file);
    for point in points {
        wtr.serialize(point)?;
    }
    wtr.flush()?;
    Ok(())
}

pub(crate) fn export_facilities_impl(
    report: &EnsembleReport,
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "facility",
        "name",
        "kind",
        "capacity",
        "arrivals",
        "admissions",
        "rejections",
        "rejections_transfer_needed",
        "rejections_transfer_not_needed",
        "transfer_needed_rejection_share",
        "hemorrhagic_transferred",
        "ischemic_transferred",
        "non_stroke_transferred",
        "absorbed",
        "average_occupancy",
        "average_occupancy_std_error",
        "average_stroke",
        "average_should_be_at_csc",
        "average_should_not_be_at_csc",
        "average_from_psc",
        "average_direct",
        "blocking_probability",
        "blocking_probability_std_error",
        "histogram",
    ])?;

    for facility in &report.facilities {
        let histogram = facility
            .histogram
            .iter()
            .map(|share| share.to_string())
            .collect::<Vec<_>>()
            .join(";");

        wtr.write_record([
            &facility.facility.0.to_string(),
            &facility.name,
            &facility.kind.to_string(),
            &facility
                .capacity
                .map(|capacity| capacity.to_string())
                .unwrap_or_default(),
            &facility.arrivals.to_string(),
            &facility.admissions.to_string(),
            &facility.rejections.to_string(),
            &facility.rejections_transfer_needed.to_string(),
            &facility.rejections_transfer_not_needed.to_string(),
            &facility
                .transfer_needed_rejection_share()
                .map(|share| share.to_string())
                .unwrap_or_else(|| "undefined".to_string()),
            &facility.hemorrhagic_transferred.to_string(),
            &facility.ischemic_transferred.to_string(),
            &facility.non_stroke_transferred.to_string(),
            &facility.absorbed.to_string(),
            &facility.average_occupancy.mean.to_string(),
            &facility.average_occupancy.std_error.to_string(),
            &facility.average_stroke.to_string(),
            &facility.average_should_be_at_csc.to_string(),
            &facility.average_should_not_be_at_csc.to_string(),
            &facility.average_from_psc.to_string(),
            &facility.average_direct.to_string(),
            &facility.blocking_probability.mean.to_string(),
            &facility.blocking_probability.std_error.to_string(),
            &histogram,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
