//! Random draws used by the generator and by facility routing decisions.
//!
//! Every sampler takes the replication's RNG by reference; nothing here owns
//! randomness of its own.

use rand::Rng;

/// Smallest uniform draw fed to `ln`, to avoid `ln(0)`.
const MIN_UNIFORM: f64 = 1e-12;

/// Exponential inter-arrival times for a Poisson process with a constant rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialInterArrival {
    /// Expected number of arrivals per unit of simulated time.
    pub rate: f64,
}

impl ExponentialInterArrival {
    pub fn new(rate: f64) -> Self {
        Self {
            rate: rate.max(0.0),
        }
    }

    /// Time until the next arrival; infinite when the rate is zero.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.rate <= 0.0 {
            return f64::INFINITY;
        }
        sample_exponential(rng, 1.0 / self.rate)
    }
}

/// Exponential draw with the given mean: `-ln(U) * mean`.
pub fn sample_exponential<R: Rng + ?Sized>(rng: &mut R, mean: f64) -> f64 {
    let u: f64 = rng.gen();
    -u.max(MIN_UNIFORM).ln() * mean
}

/// Bernoulli trial with success probability `p` (clamped to [0, 1]).
pub fn bernoulli<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    if p <= 0.0 {
        return false;
    }
    if p >= 1.0 {
        return true;
    }
    rng.gen::<f64>() < p
}
