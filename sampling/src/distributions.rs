use crate::source::Source;
use rand_distr::{Distribution as _, Normal, NormalError};

/// Standard deviation of the error distribution.
pub const SIGMA: f64 = 3.2;

/// Samples are rejected beyond SIGMA_BOUND.
pub const SIGMA_BOUND: f64 = 6.0 * SIGMA;

/// Small-coefficient distributions over the integers.
#[derive(Clone, Copy, Debug)]
pub enum Distribution {
    /// Uniform over {-1, 0, 1}.
    Ternary,
    /// Discrete Gaussian, rounded from a normal and clipped at the bound.
    Gaussian(Normal<f64>, f64),
}

impl Distribution {
    /// Returns the rounded Gaussian of standard deviation sigma clipped at
    /// bound, or BadVariance unless both are positive and finite.
    pub fn gaussian(sigma: f64, bound: f64) -> Result<Self, NormalError> {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(NormalError::BadVariance);
        }
        if !(bound.is_finite() && bound > 0.0) {
            return Err(NormalError::BadVariance);
        }
        Ok(Distribution::Gaussian(Normal::new(0.0, sigma)?, bound))
    }

    pub fn sample(&self, source: &mut Source) -> i64 {
        match self {
            Distribution::Ternary => source.next_u64n(3, 3) as i64 - 1,
            Distribution::Gaussian(normal, bound) => loop {
                let x: f64 = normal.sample(source);
                if x.abs() <= *bound {
                    return x.round() as i64;
                }
            },
        }
    }

    pub fn fill(&self, source: &mut Source, a: &mut [i64]) {
        a.iter_mut().for_each(|x| *x = self.sample(source));
    }
}
