use crate::modulus::barrett::{Barrett, BarrettPrecomp};
use crate::modulus::ReduceOnce;
use crate::modulus::{BARRETT, BARRETTLAZY, FOURTIMES, NONE, ONCE, REDUCEMOD, TWICE};

impl BarrettPrecomp<u64> {
    pub fn new(q: u64) -> BarrettPrecomp<u64> {
        // floor((2^128 - 1) / q) == floor(2^128 / q) for odd q > 1.
        let big_r: u128 = u128::MAX / q as u128;
        let mut precomp: BarrettPrecomp<u64> = Self {
            q,
            two_q: q << 1,
            four_q: q << 2,
            lo: big_r as u64,
            hi: (big_r >> 64) as u64,
            one: Barrett(0, 0),
        };
        precomp.one = precomp.prepare(1);
        precomp
    }

    #[inline(always)]
    pub fn one(&self) -> Barrett<u64> {
        self.one
    }

    #[inline(always)]
    pub fn reduce_assign<const REDUCE: REDUCEMOD>(&self, x: &mut u64) {
        match REDUCE {
            NONE => {}
            ONCE => x.reduce_once_assign(self.q),
            TWICE => x.reduce_once_assign(self.two_q),
            FOURTIMES => x.reduce_once_assign(self.four_q),
            BARRETT => {
                let mhi: u64 = ((*x as u128 * self.hi as u128) >> 64) as u64;
                *x = x.wrapping_sub(mhi.wrapping_mul(self.q));
                x.reduce_once_assign(self.q);
            }
            BARRETTLAZY => {
                let mhi: u64 = ((*x as u128 * self.hi as u128) >> 64) as u64;
                *x = x.wrapping_sub(mhi.wrapping_mul(self.q));
            }
            _ => unreachable!("invalid REDUCE argument"),
        }
    }

    #[inline(always)]
    pub fn reduce<const REDUCE: REDUCEMOD>(&self, x: &u64) -> u64 {
        let mut r = *x;
        self.reduce_assign::<REDUCE>(&mut r);
        r
    }

    /// Returns x mod q for a double word x.
    #[inline(always)]
    pub fn reduce_u128(&self, x: u128) -> u64 {
        let (x_lo, x_hi) = (x as u64 as u128, x >> 64);
        let (lo, hi) = (self.lo as u128, self.hi as u128);
        // floor(x * floor(2^128/q) / 2^128), up to a few units.
        let lo_lo: u128 = (x_lo * lo) >> 64;
        let (mid, c0) = (x_lo * hi).overflowing_add(x_hi * lo);
        let (mid, c1) = mid.overflowing_add(lo_lo);
        let carry: u128 = ((c0 as u128) + (c1 as u128)) << 64;
        let quotient: u128 = (x_hi * hi) + (mid >> 64) + carry;
        let q: u128 = self.q as u128;
        let mut r: u128 = x.wrapping_sub(quotient.wrapping_mul(q));
        while r >= q {
            r -= q;
        }
        r as u64
    }

    /// Returns (v, floor(v * 2^64 / q)).
    #[inline(always)]
    pub fn prepare(&self, v: u64) -> Barrett<u64> {
        debug_assert!(v < self.q);
        let quotient: u64 = (((v as u128) << 64) / self.q as u128) as _;
        Barrett(v, quotient)
    }

    #[inline(always)]
    pub fn mul_external<const REDUCE: REDUCEMOD>(&self, lhs: &Barrett<u64>, rhs: &u64) -> u64 {
        let mut r: u64 = *rhs;
        self.mul_external_assign::<REDUCE>(lhs, &mut r);
        r
    }

    /// Assigns lhs * rhs mod q to rhs, in [0, 2q) before REDUCE.
    #[inline(always)]
    pub fn mul_external_assign<const REDUCE: REDUCEMOD>(&self, lhs: &Barrett<u64>, rhs: &mut u64) {
        let t: u64 = ((*lhs.quotient() as u128 * *rhs as u128) >> 64) as _;
        *rhs = (rhs.wrapping_mul(*lhs.value())).wrapping_sub(self.q.wrapping_mul(t));
        self.reduce_assign::<REDUCE>(rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduce_u128_matches_remainder() {
        let q: u64 = 0x1fffffffffe00001;
        let precomp: BarrettPrecomp<u64> = BarrettPrecomp::new(q);
        let xs: [u128; 5] = [
            0,
            q as u128 - 1,
            (q as u128) * (q as u128) - 1,
            u128::MAX,
            0x5f876e514845cc8b_ad726f98f24a761a,
        ];
        for x in xs {
            assert_eq!(precomp.reduce_u128(x), (x % q as u128) as u64);
        }
    }

    #[test]
    fn shoup_mul() {
        let q: u64 = 0x1fffffffffe00001;
        let precomp: BarrettPrecomp<u64> = BarrettPrecomp::new(q);
        let x: u64 = 0x5f876e514845cc8b;
        let y: u64 = 0xad726f98f24a761a % q;
        let y_prep: Barrett<u64> = precomp.prepare(y);
        assert_eq!(
            precomp.mul_external::<ONCE>(&y_prep, &x),
            (x as u128 * y as u128 % q as u128) as u64
        );
        assert_eq!(precomp.reduce::<BARRETT>(&x), x % q);
    }
}
