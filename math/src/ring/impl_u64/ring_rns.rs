use crate::modulus::REDUCEMOD;
use crate::poly::PolyRNS;
use crate::ring::{CrtPrecomp, Ring, RingRNS};
use itertools::izip;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::One;
use std::sync::Arc;

impl RingRNS<u64> {
    /// Returns the RNS ring over the given residue rings.
    /// The primes must be distinct and share the same degree.
    pub fn new(rings: Vec<Arc<Ring<u64>>>) -> Self {
        assert!(!rings.is_empty(), "rings cannot be empty");
        debug_assert!(rings.iter().all(|r| r.n() == rings[0].n()));
        let crt: CrtPrecomp = CrtPrecomp::new(&rings);
        Self { rings, crt }
    }

    /// Returns the RNS ring over the first level+1 primes.
    pub fn at_level(&self, level: usize) -> RingRNS<u64> {
        assert!(level <= self.level());
        RingRNS::new(self.rings[..level + 1].to_vec())
    }

    pub fn moduli(&self) -> Vec<u64> {
        self.rings.iter().map(|r| r.modulus.q).collect()
    }
}

impl CrtPrecomp {
    fn new(rings: &[Arc<Ring<u64>>]) -> Self {
        let modulus: BigUint = rings
            .iter()
            .fold(BigUint::one(), |acc, r| acc * r.modulus.q);
        let half: BigUint = &modulus >> 1;
        let coeffs: Vec<BigUint> = rings
            .iter()
            .map(|r| {
                let q_hat: BigUint = &modulus / r.modulus.q;
                let q_hat_mod_q: u64 = low_u64(&(&q_hat % r.modulus.q));
                q_hat * r.modulus.inv(q_hat_mod_q)
            })
            .collect();
        Self {
            modulus,
            half,
            coeffs,
        }
    }
}

#[inline(always)]
pub(crate) fn low_u64(x: &BigUint) -> u64 {
    x.iter_u64_digits().next().unwrap_or(0)
}

impl RingRNS<u64> {
    /// Reconstructs the coefficients of a in [0, Q).
    pub fn to_biguint_inplace(&self, a: &PolyRNS<u64>, coeffs: &mut [BigUint]) {
        debug_assert!(a.level() >= self.level());
        debug_assert!(coeffs.len() <= a.n());
        coeffs.iter_mut().enumerate().for_each(|(j, c)| {
            let mut acc: BigUint = &self.crt.coeffs[0] * a.at(0).0[j];
            (1..self.level() + 1).for_each(|i| {
                acc += &self.crt.coeffs[i] * a.at(i).0[j];
            });
            *c = acc % &self.crt.modulus;
        });
    }

    /// Reconstructs the coefficients of a in [-Q/2, Q/2).
    pub fn to_bigint_inplace(&self, a: &PolyRNS<u64>, coeffs: &mut [BigInt]) {
        let mut unsigned: Vec<BigUint> = vec![BigUint::default(); coeffs.len()];
        self.to_biguint_inplace(a, &mut unsigned);
        izip!(coeffs.iter_mut(), unsigned.into_iter()).for_each(|(c, u)| {
            *c = if u > self.crt.half {
                BigInt::from_biguint(Sign::Plus, u) - BigInt::from_biguint(Sign::Plus, self.crt.modulus.clone())
            } else {
                BigInt::from_biguint(Sign::Plus, u)
            };
        });
    }

    pub fn from_bigint_inplace(&self, coeffs: &[BigInt], a: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level());
        izip!(self.rings.iter(), a.0.iter_mut()).for_each(|(r, a)| r.from_bigint(coeffs, a));
    }

    pub fn from_signed(&self, coeffs: &[i64], a: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level());
        izip!(self.rings.iter(), a.0.iter_mut()).for_each(|(r, a)| r.from_signed(coeffs, a));
    }
}

impl RingRNS<u64> {
    pub fn ntt_inplace<const LAZY: bool>(&self, a: &mut PolyRNS<u64>) {
        izip!(self.rings.iter(), a.0.iter_mut()).for_each(|(r, a)| r.ntt_inplace::<LAZY>(a));
    }

    pub fn intt_inplace<const LAZY: bool>(&self, a: &mut PolyRNS<u64>) {
        izip!(self.rings.iter(), a.0.iter_mut()).for_each(|(r, a)| r.intt_inplace::<LAZY>(a));
    }

    pub fn ntt<const LAZY: bool>(&self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        izip!(self.rings.iter(), a.0.iter(), b.0.iter_mut())
            .for_each(|(r, a, b)| r.ntt::<LAZY>(a, b));
    }

    pub fn intt<const LAZY: bool>(&self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        izip!(self.rings.iter(), a.0.iter(), b.0.iter_mut())
            .for_each(|(r, a, b)| r.intt::<LAZY>(a, b));
    }
}

impl RingRNS<u64> {
    /// Assigns a + b to b.
    #[inline(always)]
    pub fn add_inplace<const REDUCE: REDUCEMOD>(&self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        izip!(self.rings.iter(), a.0.iter(), b.0.iter_mut())
            .for_each(|(r, a, b)| r.add_inplace::<REDUCE>(a, b));
    }

    /// Assigns a + b to c.
    #[inline(always)]
    pub fn add<const REDUCE: REDUCEMOD>(&self, a: &PolyRNS<u64>, b: &PolyRNS<u64>, c: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        debug_assert!(c.level() >= self.level(), "c.level()={} < self.level()={}", c.level(), self.level());
        izip!(self.rings.iter(), a.0.iter(), b.0.iter(), c.0.iter_mut())
            .for_each(|(r, a, b, c)| r.add::<REDUCE>(a, b, c));
    }

    /// Assigns b - a to b.
    #[inline(always)]
    pub fn sub_inplace<const REDUCE: REDUCEMOD>(&self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        izip!(self.rings.iter(), a.0.iter(), b.0.iter_mut())
            .for_each(|(r, a, b)| r.sub_inplace::<REDUCE>(a, b));
    }

    /// Assigns a - b to c.
    #[inline(always)]
    pub fn sub<const REDUCE: REDUCEMOD>(&self, a: &PolyRNS<u64>, b: &PolyRNS<u64>, c: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        debug_assert!(c.level() >= self.level(), "c.level()={} < self.level()={}", c.level(), self.level());
        izip!(self.rings.iter(), a.0.iter(), b.0.iter(), c.0.iter_mut())
            .for_each(|(r, a, b, c)| r.sub::<REDUCE>(a, b, c));
    }

    #[inline(always)]
    pub fn neg_inplace<const REDUCE: REDUCEMOD>(&self, a: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        izip!(self.rings.iter(), a.0.iter_mut()).for_each(|(r, a)| r.neg_inplace::<REDUCE>(a));
    }

    /// Assigns a * b to b, coefficient-wise.
    #[inline(always)]
    pub fn mul_inplace(&self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        izip!(self.rings.iter(), a.0.iter(), b.0.iter_mut()).for_each(|(r, a, b)| r.mul_inplace(a, b));
    }

    /// Assigns a * b to c, coefficient-wise.
    #[inline(always)]
    pub fn mul(&self, a: &PolyRNS<u64>, b: &PolyRNS<u64>, c: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        debug_assert!(c.level() >= self.level(), "c.level()={} < self.level()={}", c.level(), self.level());
        izip!(self.rings.iter(), a.0.iter(), b.0.iter(), c.0.iter_mut())
            .for_each(|(r, a, b, c)| r.mul(a, b, c));
    }

    /// Assigns c + a * b to c, coefficient-wise.
    #[inline(always)]
    pub fn mul_add_inplace(&self, a: &PolyRNS<u64>, b: &PolyRNS<u64>, c: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        debug_assert!(c.level() >= self.level(), "c.level()={} < self.level()={}", c.level(), self.level());
        izip!(self.rings.iter(), a.0.iter(), b.0.iter(), c.0.iter_mut())
            .for_each(|(r, a, b, c)| r.mul_add_inplace(a, b, c));
    }

    /// Assigns a * b to a for a scalar b.
    #[inline(always)]
    pub fn mul_scalar_inplace<const REDUCE: REDUCEMOD>(&self, b: u64, a: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        izip!(self.rings.iter(), a.0.iter_mut()).for_each(|(r, a)| r.mul_scalar_inplace::<REDUCE>(b, a));
    }
}
