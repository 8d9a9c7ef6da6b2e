//! Run one replication of the reference network and print per-facility results.
//!
//! Run with: cargo run -p stroke_sim --example scenario_run

use stroke_sim::runner::Simulation;
use stroke_sim::scenario::NetworkConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    const SEED: u64 = 123;

    let config = NetworkConfig::reference();
    let report = Simulation::new(&config, SEED)?.run()?;

    println!(
        "--- Reference network ({} days, seed {}) ---",
        report.duration, report.seed
    );
    println!("Events processed: {}", report.events_processed);

    for facility in &report.facilities {
        match facility.capacity {
            Some(capacity) => {
                println!(
                    "\n{} {} ({}, {} beds)",
                    facility.kind, facility.facility, facility.name, capacity
                );
                println!(
                    "  arrivals={} admissions={} rejections={}",
                    facility.arrivals, facility.admissions, facility.rejections.total
                );
                println!("  average occupancy: {:.3}", facility.average_occupancy);
                println!("  blocking probability: {:.4}", facility.blocking_probability);
                let share = facility.transfer_needed_rejection_share().map_or_else(
                    || "undefined".to_string(),
                    |share| format!("{:.2}%", share * 100.0),
                );
                println!("  rejected patients needing transfer: {share}");
            }
            None => {
                println!("\n{} {} ({})", facility.kind, facility.facility, facility.name);
                println!(
                    "  arrivals={} transferred={} treated locally={}",
                    facility.arrivals,
                    facility.routing.transferred(),
                    facility.routing.absorbed
                );
            }
        }
    }

    println!("\nHub blocking probability: {:.4}", report.blocking_probability());
    Ok(())
}
