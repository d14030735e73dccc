use crate::dft::ntt::Table;
use crate::error::{Error, Result};
use crate::modulus::barrett::Barrett;
use crate::modulus::prime::Prime;
use crate::modulus::{ScalarOperations, VectorOperations};
use crate::modulus::{BARRETT, REDUCEMOD};
use crate::poly::Poly;
use crate::ring::Ring;
use crate::CHUNK;
use itertools::izip;
use num_bigint::BigInt;
use num_integer::Integer;

impl Ring<u64> {
    /// Returns the ring Z_q[X]/(X^n+1).
    /// Fails if q is not a prime congruent to 1 mod 2n.
    pub fn new(n: usize, q: u64) -> Result<Self> {
        debug_assert!(n >= 2 && n & (n - 1) == 0, "invalid n={}", n);
        let prime: Prime<u64> = Prime::<u64>::new(q)?;
        if q % (2 * n as u64) != 1 {
            return Err(Error::InvalidModulus {
                q,
                reason: "q != 1 mod 2n",
            });
        }
        Ok(Self {
            n,
            modulus: prime,
            dft: Box::new(Table::<u64>::new(prime, (2 * n) as u64)?),
        })
    }

    #[inline(always)]
    pub fn q(&self) -> u64 {
        self.modulus.q
    }

    /// Assigns [coeffs] mod q to a, reading the coefficients as signed integers.
    pub fn from_bigint(&self, coeffs: &[BigInt], a: &mut Poly<u64>) {
        debug_assert!(coeffs.len() <= a.n());
        let q_big: BigInt = BigInt::from(self.modulus.q);
        izip!(a.0.iter_mut(), coeffs.iter()).for_each(|(a, c)| {
            *a = c
                .mod_floor(&q_big)
                .magnitude()
                .iter_u64_digits()
                .next()
                .unwrap_or(0)
        });
    }

    /// Assigns [coeffs] mod q to a.
    pub fn from_signed(&self, coeffs: &[i64], a: &mut Poly<u64>) {
        debug_assert!(coeffs.len() <= a.n());
        let q: u64 = self.modulus.q;
        izip!(a.0.iter_mut(), coeffs.iter()).for_each(|(a, c)| {
            let r: u64 = self
                .modulus
                .barrett
                .reduce::<BARRETT>(&c.unsigned_abs());
            *a = if *c < 0 && r != 0 { q - r } else { r };
        });
    }

    /// Assigns a mod q to b, with a reduced modulo another modulus.
    #[inline(always)]
    pub fn reduce_from(&self, a: &[u64], b: &mut Poly<u64>) {
        debug_assert!(a.len() == b.n(), "a.len()={} != b.n()={}", a.len(), b.n());
        izip!(a.iter(), b.0.iter_mut())
            .for_each(|(a, b)| *b = self.modulus.barrett.reduce::<BARRETT>(a));
    }

    #[inline(always)]
    pub fn reduce_inplace<const REDUCE: REDUCEMOD>(&self, a: &mut Poly<u64>) {
        self.modulus.va_reduce_into_va::<CHUNK, REDUCE>(&mut a.0);
    }
}

impl Ring<u64> {
    pub fn ntt_inplace<const LAZY: bool>(&self, poly: &mut Poly<u64>) {
        match LAZY {
            true => self.dft.forward_inplace_lazy(&mut poly.0),
            false => self.dft.forward_inplace(&mut poly.0),
        }
    }

    pub fn intt_inplace<const LAZY: bool>(&self, poly: &mut Poly<u64>) {
        match LAZY {
            true => self.dft.backward_inplace_lazy(&mut poly.0),
            false => self.dft.backward_inplace(&mut poly.0),
        }
    }

    pub fn ntt<const LAZY: bool>(&self, poly_in: &Poly<u64>, poly_out: &mut Poly<u64>) {
        poly_out.0.copy_from_slice(&poly_in.0);
        self.ntt_inplace::<LAZY>(poly_out);
    }

    pub fn intt<const LAZY: bool>(&self, poly_in: &Poly<u64>, poly_out: &mut Poly<u64>) {
        poly_out.0.copy_from_slice(&poly_in.0);
        self.intt_inplace::<LAZY>(poly_out);
    }
}

impl Ring<u64> {
    /// Assigns a + b to b.
    #[inline(always)]
    pub fn add_inplace<const REDUCE: REDUCEMOD>(&self, a: &Poly<u64>, b: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus
            .va_add_vb_into_vb::<CHUNK, REDUCE>(&a.0, &mut b.0);
    }

    /// Assigns a + b to c.
    #[inline(always)]
    pub fn add<const REDUCE: REDUCEMOD>(&self, a: &Poly<u64>, b: &Poly<u64>, c: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus
            .va_add_vb_into_vc::<CHUNK, REDUCE>(&a.0, &b.0, &mut c.0);
    }

    /// Assigns a + b to a for a scalar b.
    #[inline(always)]
    pub fn add_scalar_inplace<const REDUCE: REDUCEMOD>(&self, b: &u64, a: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        self.modulus.sa_add_vb_into_vb::<CHUNK, REDUCE>(b, &mut a.0);
    }

    /// Assigns a - b to a for a scalar b.
    #[inline(always)]
    pub fn sub_scalar_inplace<const REDUCE: REDUCEMOD>(&self, b: &u64, a: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        self.modulus.vb_sub_sa_into_vb::<CHUNK, REDUCE>(b, &mut a.0);
    }

    /// Assigns b - a to b.
    #[inline(always)]
    pub fn sub_inplace<const REDUCE: REDUCEMOD>(&self, a: &Poly<u64>, b: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus
            .va_sub_vb_into_va::<CHUNK, REDUCE>(&a.0, &mut b.0);
    }

    /// Assigns a - b to c.
    #[inline(always)]
    pub fn sub<const REDUCE: REDUCEMOD>(&self, a: &Poly<u64>, b: &Poly<u64>, c: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus
            .va_sub_vb_into_vc::<CHUNK, REDUCE>(&a.0, &b.0, &mut c.0);
    }

    #[inline(always)]
    pub fn neg_inplace<const REDUCE: REDUCEMOD>(&self, a: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        self.modulus.va_neg_into_va::<CHUNK, REDUCE>(&mut a.0);
    }

    /// Assigns -a to b.
    #[inline(always)]
    pub fn neg<const REDUCE: REDUCEMOD>(&self, a: &Poly<u64>, b: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus.va_neg_into_vb::<CHUNK, REDUCE>(&a.0, &mut b.0);
    }

    /// Assigns a * b to b, coefficient-wise.
    #[inline(always)]
    pub fn mul_inplace(&self, a: &Poly<u64>, b: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus.va_mul_vb_into_vb::<CHUNK>(&a.0, &mut b.0);
    }

    /// Assigns a * b to c, coefficient-wise.
    #[inline(always)]
    pub fn mul(&self, a: &Poly<u64>, b: &Poly<u64>, c: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus
            .va_mul_vb_into_vc::<CHUNK>(&a.0, &b.0, &mut c.0);
    }

    /// Assigns c + a * b to c, coefficient-wise.
    #[inline(always)]
    pub fn mul_add_inplace(&self, a: &Poly<u64>, b: &Poly<u64>, c: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus
            .va_mul_vb_add_vc_into_vc::<CHUNK>(&a.0, &b.0, &mut c.0);
    }

    /// Assigns a * b to a for a prepared scalar b.
    #[inline(always)]
    pub fn mul_scalar_barrett_inplace<const REDUCE: REDUCEMOD>(
        &self,
        b: &Barrett<u64>,
        a: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        self.modulus
            .sa_barrett_mul_vb_into_vb::<CHUNK, REDUCE>(b, &mut a.0);
    }

    /// Assigns a * b to c for a prepared scalar b.
    #[inline(always)]
    pub fn mul_scalar_barrett<const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<u64>,
        b: &Barrett<u64>,
        c: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus
            .sa_barrett_mul_vb_into_vc::<CHUNK, REDUCE>(b, &a.0, &mut c.0);
    }

    /// Assigns a * b to a for any scalar b.
    pub fn mul_scalar_inplace<const REDUCE: REDUCEMOD>(&self, b: u64, a: &mut Poly<u64>) {
        let mut b_reduced: u64 = b;
        self.modulus.sa_reduce_into_sa::<BARRETT>(&mut b_reduced);
        let b_prep: Barrett<u64> = self.modulus.barrett.prepare(b_reduced);
        self.mul_scalar_barrett_inplace::<REDUCE>(&b_prep, a);
    }

    /// Assigns (b - a) * c to b.
    #[inline(always)]
    pub fn sub_mul_scalar_barrett_inplace<const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<u64>,
        c: &Barrett<u64>,
        b: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus
            .va_sub_vb_mul_sc_into_va::<CHUNK, REDUCE>(&a.0, c, &mut b.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modulus::ONCE;

    #[test]
    fn signed_coefficients() {
        let ring: Ring<u64> = Ring::new(8, 12289).unwrap();
        let mut a: Poly<u64> = ring.new_poly();
        ring.from_signed(&[-1, 0, 1, -12289, 12290, -5, 3, 2], &mut a);
        assert_eq!(a.0, vec![12288, 0, 1, 0, 1, 12284, 3, 2]);

        let coeffs: Vec<BigInt> = [-1i64, 0, 1, -12289, 12290, -5, 3, 2]
            .iter()
            .map(|c| BigInt::from(*c))
            .collect();
        let mut b: Poly<u64> = ring.new_poly();
        ring.from_bigint(&coeffs, &mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_non_ntt_friendly() {
        assert!(Ring::new(8, 12289).is_ok());
        // 12289 != 1 mod 2^14
        assert!(Ring::new(1 << 13, 12289).is_err());
        assert!(Ring::new(8, 12291).is_err());
    }

    #[test]
    fn sub_and_neg() {
        let ring: Ring<u64> = Ring::new(8, 12289).unwrap();
        let a: Poly<u64> = Poly((0..8).collect());
        let mut b: Poly<u64> = Poly(vec![5; 8]);
        ring.sub_inplace::<ONCE>(&a, &mut b);
        assert_eq!(b.0, vec![5, 4, 3, 2, 1, 0, 12288, 12287]);
        let mut c: Poly<u64> = ring.new_poly();
        ring.neg::<ONCE>(&b, &mut c);
        ring.add_inplace::<ONCE>(&b, &mut c);
        assert!(c.0.iter().all(|x| *x == 0));
    }
}
