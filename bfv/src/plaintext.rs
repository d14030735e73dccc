use crate::context::{Context, ContextData};
use crate::error::{Error, Result};
use itertools::izip;
use math::poly::PolyRNS;
use std::fmt;
use std::str::FromStr;

/// A polynomial of degree < N with coefficients modulo the plaintext modulus.
/// Plaintexts are not tied to a level of the chain.
#[derive(Clone, Debug, Default)]
pub struct Plaintext {
    coeffs: Vec<u64>,
}

impl Plaintext {
    pub fn new(coeffs: Vec<u64>) -> Self {
        Self { coeffs }
    }

    /// Returns the constant polynomial value.
    pub fn from_value(value: u64) -> Self {
        Self { coeffs: vec![value] }
    }

    pub fn zero(n: usize) -> Self {
        Self { coeffs: vec![0; n] }
    }

    pub fn coeffs(&self) -> &[u64] {
        &self.coeffs
    }

    pub fn coeffs_mut(&mut self) -> &mut Vec<u64> {
        &mut self.coeffs
    }

    pub fn coeff_count(&self) -> usize {
        self.coeffs.len()
    }

    /// Number of coefficients up to the last non-zero one.
    pub fn significant_coeff_count(&self) -> usize {
        self.coeffs
            .iter()
            .rposition(|&c| c != 0)
            .map_or(0, |i| i + 1)
    }

    pub fn is_zero(&self) -> bool {
        self.significant_coeff_count() == 0
    }

    /// Fails with InvalidArgument unless the plaintext has at most N
    /// coefficients, all smaller than t.
    pub fn validate(&self, context: &Context) -> Result<()> {
        let n: usize = context.n();
        let t: u64 = context.plain_modulus();
        if self.significant_coeff_count() > n {
            return Err(Error::InvalidArgument(format!(
                "plaintext has {} coefficients, degree is {}",
                self.significant_coeff_count(),
                n
            )));
        }
        if let Some(c) = self.coeffs.iter().find(|&&c| c >= t) {
            return Err(Error::InvalidArgument(format!(
                "plaintext coefficient {} is not reduced modulo {}",
                c, t
            )));
        }
        Ok(())
    }
}

impl PartialEq for Plaintext {
    fn eq(&self, other: &Self) -> bool {
        let len: usize = self.significant_coeff_count();
        len == other.significant_coeff_count() && self.coeffs[..len] == other.coeffs[..len]
    }
}

impl Eq for Plaintext {}

/// Hexadecimal polynomial, highest degree first: `7FFx^3 + 1x^1 + 3`.
impl fmt::Display for Plaintext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<String> = self
            .coeffs
            .iter()
            .enumerate()
            .rev()
            .filter(|&(_, &c)| c != 0)
            .map(|(i, c)| {
                if i == 0 {
                    format!("{:X}", c)
                } else {
                    format!("{:X}x^{}", c, i)
                }
            })
            .collect();
        if terms.is_empty() {
            write!(f, "0")
        } else {
            write!(f, "{}", terms.join(" + "))
        }
    }
}

impl FromStr for Plaintext {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |term: &str| Error::InvalidArgument(format!("invalid plaintext term '{}'", term));
        let mut coeffs: Vec<u64> = Vec::new();
        let mut last_degree: Option<usize> = None;
        for term in s.split('+').map(str::trim) {
            let (coeff, degree) = match term.split_once("x^") {
                Some((coeff, degree)) => (coeff, degree.parse::<usize>().map_err(|_| invalid(term))?),
                None => (term, 0),
            };
            if coeff.is_empty() || !coeff.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(invalid(term));
            }
            let coeff: u64 = u64::from_str_radix(coeff, 16).map_err(|_| invalid(term))?;
            if last_degree.is_some_and(|d| degree >= d) {
                return Err(Error::InvalidArgument(format!(
                    "plaintext terms must have strictly decreasing degrees: '{}'",
                    s
                )));
            }
            last_degree = Some(degree);
            if coeffs.len() <= degree {
                coeffs.resize(degree + 1, 0);
            }
            coeffs[degree] = coeff;
        }
        Ok(Self { coeffs })
    }
}

/// Adds (or subtracts) round(Q/t * pt) to dst, dst being in coefficient form
/// at the level of data. The rounding follows
/// round(m*Q/t) = m*floor(Q/t) + round(m*(Q mod t)/t).
pub(crate) fn add_scaled_plain(data: &ContextData, pt: &Plaintext, dst: &mut PolyRNS<u64>, subtract: bool) {
    let t: u128 = data.parms().plain_modulus() as u128;
    let q_mod_t: u128 = data.coeff_modulus_mod_plain_modulus() as u128;
    let half_t: u128 = data.plain_upper_half_threshold() as u128;
    let n: usize = data.n();
    for (i, &m) in pt.coeffs().iter().enumerate().take(n) {
        if m == 0 {
            continue;
        }
        let fix: u128 = (m as u128 * q_mod_t + half_t) / t;
        izip!(
            data.ring().rings.iter(),
            data.coeff_div_plain_modulus().iter(),
            dst.0.iter_mut()
        )
        .for_each(|(r, &delta, d)| {
            let q: u64 = r.q();
            let scaled: u64 = r.modulus.barrett.reduce_u128(m as u128 * delta as u128 + fix);
            let x: &mut u64 = &mut d.0[i];
            *x = if subtract {
                if *x >= scaled {
                    *x - scaled
                } else {
                    *x + q - scaled
                }
            } else {
                let sum: u64 = *x + scaled;
                if sum >= q {
                    sum - q
                } else {
                    sum
                }
            };
        });
    }
}

/// Lifts pt to the primes of data: coefficients at or above (t+1)/2 are read
/// as negative, m - t.
pub(crate) fn lift_centered(data: &ContextData, pt: &Plaintext, dst: &mut PolyRNS<u64>) {
    let threshold: u64 = data.plain_upper_half_threshold();
    let n: usize = data.n();
    izip!(
        data.ring().rings.iter(),
        data.plain_upper_half_increment().iter(),
        dst.0.iter_mut()
    )
    .for_each(|(r, &increment, d)| {
        d.zero();
        izip!(d.0.iter_mut(), pt.coeffs().iter().take(n)).for_each(|(x, &m)| {
            *x = if m >= threshold {
                r.modulus.barrett.reduce_u128(m as u128 + increment as u128)
            } else {
                r.modulus.barrett.reduce_u128(m as u128)
            };
        });
    });
}
