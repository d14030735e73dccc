use crate::modulus::barrett::BarrettPrecomp;
use crate::modulus::montgomery::{Montgomery, MontgomeryPrecomp};
use crate::modulus::ReduceOnce;
use crate::modulus::{BARRETT, BARRETTLAZY, FOURTIMES, NONE, ONCE, REDUCEMOD, TWICE};

/// Montgomery arithmetic over u64 values, with radix 2^64.
impl MontgomeryPrecomp<u64> {
    /// Returns a new instance of MontgomeryPrecomp<u64>.
    /// q must be odd.
    pub fn new(q: u64) -> MontgomeryPrecomp<u64> {
        debug_assert!(q & 1 != 0, "invalid argument: gcd(q={}, 2^64) != 1", q);
        let mut q_inv: u64 = 1;
        let mut q_pow: u64 = q;
        for _i in 0..63 {
            q_inv = q_inv.wrapping_mul(q_pow);
            q_pow = q_pow.wrapping_mul(q_pow);
        }
        let mut precomp = Self {
            q,
            two_q: q << 1,
            four_q: q << 2,
            barrett: BarrettPrecomp::new(q),
            q_inv,
            one: 0,
            minus_one: 0,
        };

        precomp.one = precomp.prepare::<ONCE>(1);
        precomp.minus_one = q - precomp.one;

        precomp
    }

    /// Returns 2^64 mod q.
    #[inline(always)]
    pub fn one(&self) -> Montgomery<u64> {
        self.one
    }

    /// Returns (q-1) * 2^64 mod q.
    #[inline(always)]
    pub fn minus_one(&self) -> Montgomery<u64> {
        self.minus_one
    }

    #[inline(always)]
    pub fn reduce_assign<const REDUCE: REDUCEMOD>(&self, x: &mut u64) {
        match REDUCE {
            NONE => {}
            ONCE => x.reduce_once_assign(self.q),
            TWICE => x.reduce_once_assign(self.two_q),
            FOURTIMES => x.reduce_once_assign(self.four_q),
            BARRETT => self.barrett.reduce_assign::<BARRETT>(x),
            BARRETTLAZY => self.barrett.reduce_assign::<BARRETTLAZY>(x),
            _ => unreachable!("invalid REDUCE argument"),
        }
    }

    /// Returns lhs * 2^64 mod q.
    #[inline(always)]
    pub fn prepare<const REDUCE: REDUCEMOD>(&self, lhs: u64) -> Montgomery<u64> {
        let mut r: u64 = self.barrett.reduce_u128((lhs as u128) << 64);
        self.reduce_assign::<REDUCE>(&mut r);
        r
    }

    /// Returns lhs * (2^64)^-1 mod q.
    #[inline(always)]
    pub fn unprepare<const REDUCE: REDUCEMOD>(&self, lhs: Montgomery<u64>) -> u64 {
        let r: u64 = ((self.q as u128 * lhs.wrapping_mul(self.q_inv) as u128) >> 64) as u64;
        let mut x: u64 = self.q.wrapping_sub(r);
        x.reduce_once_assign(self.q);
        self.reduce_assign::<REDUCE>(&mut x);
        x
    }

    /// Returns lhs * rhs * (2^64)^-1 mod q.
    #[inline(always)]
    pub fn mul_external<const REDUCE: REDUCEMOD>(&self, lhs: Montgomery<u64>, rhs: u64) -> u64 {
        let mut r: u64 = rhs;
        self.mul_external_assign::<REDUCE>(lhs, &mut r);
        r
    }

    /// Assigns lhs * rhs * (2^64)^-1 mod q to rhs, in [0, 2q) before REDUCE.
    #[inline(always)]
    pub fn mul_external_assign<const REDUCE: REDUCEMOD>(&self, lhs: Montgomery<u64>, rhs: &mut u64) {
        let m: u128 = lhs as u128 * *rhs as u128;
        let (mlo, mhi) = (m as u64, (m >> 64) as u64);
        let hhi: u64 = ((self.q as u128 * mlo.wrapping_mul(self.q_inv) as u128) >> 64) as u64;
        *rhs = mhi.wrapping_sub(hhi).wrapping_add(self.q);
        self.reduce_assign::<REDUCE>(rhs);
    }

    /// Returns x^exponent in the Montgomery domain.
    #[inline(always)]
    pub fn pow(&self, x: Montgomery<u64>, exponent: u64) -> Montgomery<u64> {
        let mut y: Montgomery<u64> = self.one();
        let mut x_mut: Montgomery<u64> = x;
        let mut i: u64 = exponent;
        while i > 0 {
            if i & 1 == 1 {
                self.mul_external_assign::<ONCE>(x_mut, &mut y);
            }
            let x_sq: u64 = x_mut;
            self.mul_external_assign::<ONCE>(x_sq, &mut x_mut);
            i >>= 1;
        }
        y
    }
}
