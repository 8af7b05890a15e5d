//! Numerical distributions layered on top of anything implementing
//! [`rand::Rng`] — in practice, a [`super::RandomProxy`] (§4.5).

use rand::Rng;

/// Draws a uniform integer in `[lo, hi]` (inclusive on both ends).
pub fn uniform_int_inclusive<R: Rng + ?Sized>(rng: &mut R, lo: i32, hi: i32) -> i32 {
    rng.random_range(lo..=hi)
}

/// Draws a uniform real in `[lo, hi)`.
pub fn uniform_real<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if lo >= hi {
        return lo;
    }
    rng.random_range(lo..hi)
}

/// Standard-normal draw via the Box-Muller transform.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = rng.random_range(f64::MIN_POSITIVE..1.0);
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Normal draw with the given mean and standard deviation.
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    mean + std_dev * standard_normal(rng)
}

/// A Bernoulli(`p`) draw.
pub fn bernoulli<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    rng.random_bool(p.clamp(0.0, 1.0))
}

/// Returns `1.0` or `-1.0` with equal probability — the "bi-Gaussian sign"
/// pattern used by adaptors to perturb their own state symmetrically (§4.2).
pub fn random_sign<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    if rng.random_bool(0.5) { 1.0 } else { -1.0 }
}

/// Immutable construction-time parameters for a bi-normal (two-hump)
/// distribution: a 50/50 mixture of `N(mu - d/2, sigma1)` and
/// `N(mu + d/2, sigma2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiNormalParams {
    mu: f64,
    sigma1: f64,
    sigma2: f64,
    d: f64,
}

impl BiNormalParams {
    pub fn new(mu: f64, sigma1: f64, sigma2: f64, d: f64) -> Self {
        Self {
            mu,
            sigma1,
            sigma2,
            d,
        }
    }

    pub fn mu(&self) -> f64 {
        self.mu
    }

    pub fn sigma1(&self) -> f64 {
        self.sigma1
    }

    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    pub fn d(&self) -> f64 {
        self.d
    }

    /// Draws from the mixture.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if rng.random_bool(0.5) {
            gaussian(rng, self.mu - self.d / 2.0, self.sigma1)
        } else {
            gaussian(rng, self.mu + self.d / 2.0, self.sigma2)
        }
    }
}

/// A working copy of [`BiNormalParams`] that can drift away from its
/// construction-time values and be restored with [`BiNormalWorkingSet::reset`].
#[derive(Debug, Clone)]
pub struct BiNormalWorkingSet {
    original: BiNormalParams,
    current: BiNormalParams,
}

impl BiNormalWorkingSet {
    pub fn new(params: BiNormalParams) -> Self {
        Self {
            original: params,
            current: params,
        }
    }

    pub fn current(&self) -> &BiNormalParams {
        &self.current
    }

    pub fn set_current(&mut self, params: BiNormalParams) {
        self.current = params;
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.current.sample(rng)
    }

    /// Restores the construction-time parameters.
    pub fn reset(&mut self) {
        self.current = self.original;
    }
}
