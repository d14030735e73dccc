use crate::error::{Error, Result};
use crate::modulus::barrett::BarrettPrecomp;
use crate::modulus::montgomery::{Montgomery, MontgomeryPrecomp};
use crate::modulus::prime::{is_prime, Prime};
use crate::modulus::ONCE;

impl Prime<u64> {
    /// Returns a new instance of Prime<u64>.
    /// Fails if q is not an odd prime of at most 61 bits.
    pub fn new(q: u64) -> Result<Self> {
        if q <= 2 || !is_prime(q) {
            return Err(Error::InvalidModulus {
                q,
                reason: "not an odd prime",
            });
        }
        Self::new_unchecked(q)
    }

    /// Returns a new instance of Prime<u64>.
    /// Does not check if q is a prime > 2.
    pub fn new_unchecked(q: u64) -> Result<Self> {
        if q >> 61 != 0 {
            return Err(Error::InvalidModulus {
                q,
                reason: "more than 61 bits",
            });
        }

        Ok(Self {
            q,
            two_q: q << 1,
            four_q: q << 2,
            montgomery: MontgomeryPrecomp::new(q),
            barrett: BarrettPrecomp::new(q),
            phi: q - 1,
        })
    }

    #[inline(always)]
    pub fn q(&self) -> u64 {
        self.q
    }

    /// Returns x^exponent mod q.
    #[inline(always)]
    pub fn pow(&self, x: u64, exponent: u64) -> u64 {
        let x_mont: Montgomery<u64> = self.montgomery.prepare::<ONCE>(x);
        let y_mont: Montgomery<u64> = self.montgomery.pow(x_mont, exponent);
        self.montgomery.unprepare::<ONCE>(y_mont)
    }

    /// Returns x^-1 mod q.
    /// User must ensure that x is not divisible by q.
    #[inline(always)]
    pub fn inv(&self, x: u64) -> u64 {
        self.pow(x, self.phi - 1)
    }

    /// Returns a primitive nth_root-th root of unity mod q.
    /// nth_root must be a power of two dividing q-1.
    pub fn primitive_nth_root(&self, nth_root: u64) -> Result<u64> {
        if nth_root < 2 || nth_root & (nth_root - 1) != 0 || self.phi % nth_root != 0 {
            return Err(Error::InvalidModulus {
                q: self.q,
                reason: "q != 1 mod nth_root",
            });
        }

        let exponent: u64 = self.phi / nth_root;
        let minus_one: u64 = self.q - 1;

        // psi = x^((q-1)/nth_root) is primitive iff psi^(nth_root/2) = -1.
        for candidate in 2..self.q {
            let psi: u64 = self.pow(candidate, exponent);
            if self.pow(psi, nth_root >> 1) == minus_one {
                return Ok(self.minimal_primitive_root(psi, nth_root));
            }
        }

        Err(Error::InvalidModulus {
            q: self.q,
            reason: "no primitive root of unity",
        })
    }

    /// Returns the smallest primitive nth_root-th root among the odd powers of psi.
    fn minimal_primitive_root(&self, psi: u64, nth_root: u64) -> u64 {
        let psi_mont: Montgomery<u64> = self.montgomery.prepare::<ONCE>(psi);
        let psi_sq: Montgomery<u64> = self.montgomery.pow(psi_mont, 2);
        let mut current: Montgomery<u64> = psi_mont;
        let mut min: u64 = psi;
        for _ in 0..(nth_root >> 1) {
            let value: u64 = self.montgomery.unprepare::<ONCE>(current);
            min = min.min(value);
            self.montgomery.mul_external_assign::<ONCE>(psi_sq, &mut current);
        }
        min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pow_inv() {
        let prime: Prime<u64> = Prime::new(0x1fffffffffe00001).unwrap();
        let x: u64 = 0x0f876e514845cc8b;
        assert_eq!(prime.pow(x, 0), 1);
        assert_eq!(prime.pow(x, 1), x);
        assert_eq!(prime.pow(x, 2), (x as u128 * x as u128 % prime.q as u128) as u64);
        let x_inv: u64 = prime.inv(x);
        assert_eq!((x as u128 * x_inv as u128 % prime.q as u128) as u64, 1);
    }

    #[test]
    fn rejects_composites() {
        assert!(Prime::new(0x1fffffffffe00003 * 3).is_err());
        assert!(Prime::new(2).is_err());
        assert!(Prime::new(1u64 << 62 | 1).is_err());
    }

    #[test]
    fn primitive_root() {
        // 12289 = 3 * 2^12 + 1
        let prime: Prime<u64> = Prime::new(12289).unwrap();
        let psi: u64 = prime.primitive_nth_root(2048).unwrap();
        assert_eq!(prime.pow(psi, 2048), 1);
        assert_eq!(prime.pow(psi, 1024), 12288);
        assert!(prime.primitive_nth_root(3 * 2048).is_err());
    }
}
