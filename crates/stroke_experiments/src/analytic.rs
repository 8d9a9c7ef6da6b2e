//! Closed-form loss-system results used to cross-check the simulator.
//!
//! With Poisson arrivals and no waiting room the hub CSC is an M/G/c/c
//! system. Its stationary occupancy distribution is the truncated Poisson
//! distribution and depends on the service times only through their mean.

use stroke_sim::scenario::{NetworkConfig, NonStrokeRouting};

/// Stationary occupancy distribution of an M/G/c/c system with offered load
/// `load` (Erlangs) and `servers` beds; entry `k` is P(occupancy = k).
pub fn stationary_distribution(load: f64, servers: u32) -> Vec<f64> {
    let mut terms = Vec::with_capacity(servers as usize + 1);
    let mut term = 1.0;
    terms.push(term);
    for k in 1..=servers {
        term *= load / f64::from(k);
        terms.push(term);
    }
    let total: f64 = terms.iter().sum();
    terms.iter().map(|term| term / total).collect()
}

/// Erlang B blocking probability via the recurrence
/// `B(0) = 1`, `B(k) = a·B(k-1) / (k + a·B(k-1))`.
pub fn erlang_b(load: f64, servers: u32) -> f64 {
    if load <= 0.0 {
        return if servers == 0 { 1.0 } else { 0.0 };
    }
    (1..=servers).fold(1.0, |blocking, k| {
        let carried = load * blocking;
        carried / (f64::from(k) + carried)
    })
}

/// Offered load (arrival rate × mean stay) at the hub CSC: its own direct
/// arrivals plus whatever every PSC forwards.
pub fn offered_load(config: &NetworkConfig) -> Option<f64> {
    let hub = config.cscs.first()?;
    let params = &config.params;
    let hemorrhagic = params.hemorrhagic_probability;

    let direct = hub.stroke_rate * params.mean_stroke_duration()
        + hub.non_stroke_rate * params.non_stroke_mean_duration;

    let forwarded: f64 = config
        .pscs
        .iter()
        .map(|psc| {
            let stroke = psc.stroke_rate
                * (hemorrhagic * params.hemorrhagic_mean_duration
                    + (1.0 - hemorrhagic) * psc.transfer_rate * params.ischemic_mean_duration);
            let non_stroke_share = match params.non_stroke_routing {
                NonStrokeRouting::TransferAll => 1.0,
                NonStrokeRouting::Local => 0.0,
                NonStrokeRouting::FollowTransferRate => psc.transfer_rate,
            };
            stroke + psc.non_stroke_rate * non_stroke_share * params.non_stroke_mean_duration
        })
        .sum();

    Some(direct + forwarded)
}

/// Erlang B blocking at the hub for `config`, counting every bed the
/// configured admission boundary lets the hub fill.
pub fn analytic_blocking_probability(config: &NetworkConfig) -> Option<f64> {
    let hub = config.cscs.first()?;
    let load = offered_load(config)?;
    let beds = config.params.admission_boundary.max_occupancy(hub.capacity);
    Some(erlang_b(load, beds))
}
