use crate::error::{Error, Result};
use crate::modulus::prime::is_prime;

/// Enumerates primes congruent to 1 mod nth_root with exactly bit_size bits,
/// from the largest one downwards or from the smallest one upwards.
pub struct NTTFriendlyPrimesGenerator {
    bit_size: usize,
    nth_root: u64,
    lower_bound: u64,
    upper_bound: u64,
    prev_prime: u64,
    next_prime: u64,
    exhausted_down: bool,
    exhausted_up: bool,
}

impl NTTFriendlyPrimesGenerator {
    pub fn new(bit_size: usize, nth_root: u64) -> Self {
        debug_assert!(nth_root & (nth_root - 1) == 0, "nth_root must be a power of two");
        let valid: bool = (2..=62).contains(&bit_size) && nth_root <= (1u64 << (bit_size - 1));
        let (upper, lower) = if valid {
            (1u64 << bit_size, 1u64 << (bit_size - 1))
        } else {
            (0, 0)
        };
        Self {
            bit_size,
            nth_root,
            lower_bound: lower,
            upper_bound: upper,
            // Both starting points are out of range candidates.
            prev_prime: upper.wrapping_add(1),
            next_prime: lower.wrapping_add(1).wrapping_sub(nth_root),
            exhausted_down: !valid,
            exhausted_up: !valid,
        }
    }

    pub fn next_downstream_primes(&mut self, k: usize) -> Result<Vec<u64>> {
        (0..k).map(|_| self.next_downstream_prime()).collect()
    }

    pub fn next_downstream_prime(&mut self) -> Result<u64> {
        while !self.exhausted_down {
            if self.prev_prime < self.lower_bound + self.nth_root {
                self.exhausted_down = true;
                break;
            }
            self.prev_prime -= self.nth_root;
            if is_prime(self.prev_prime) {
                return Ok(self.prev_prime);
            }
        }
        Err(Error::PrimeSearchExhausted {
            bit_size: self.bit_size,
            nth_root: self.nth_root,
        })
    }
}

impl NTTFriendlyPrimesGenerator {
    pub fn next_upstream_primes(&mut self, k: usize) -> Result<Vec<u64>> {
        (0..k).map(|_| self.next_upstream_prime()).collect()
    }

    pub fn next_upstream_prime(&mut self) -> Result<u64> {
        while !self.exhausted_up {
            if self.next_prime.wrapping_add(self.nth_root) >= self.upper_bound {
                self.exhausted_up = true;
                break;
            }
            self.next_prime = self.next_prime.wrapping_add(self.nth_root);
            if is_prime(self.next_prime) {
                return Ok(self.next_prime);
            }
        }
        Err(Error::PrimeSearchExhausted {
            bit_size: self.bit_size,
            nth_root: self.nth_root,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downstream_primes() {
        let nth_root: u64 = 1 << 12;
        let mut generator = NTTFriendlyPrimesGenerator::new(30, nth_root);
        let primes: Vec<u64> = generator.next_downstream_primes(4).unwrap();
        primes.windows(2).for_each(|w| assert!(w[0] > w[1]));
        primes.iter().for_each(|&q| {
            assert!(is_prime(q));
            assert_eq!(q % nth_root, 1);
            assert_eq!(64 - q.leading_zeros(), 30);
        });
    }

    #[test]
    fn upstream_primes() {
        let nth_root: u64 = 1 << 12;
        let mut generator = NTTFriendlyPrimesGenerator::new(40, nth_root);
        let primes: Vec<u64> = generator.next_upstream_primes(4).unwrap();
        primes.windows(2).for_each(|w| assert!(w[0] < w[1]));
        primes.iter().for_each(|&q| {
            assert!(is_prime(q));
            assert_eq!(q % nth_root, 1);
            assert_eq!(64 - q.leading_zeros(), 40);
        });
    }

    #[test]
    fn exhausted() {
        let mut generator = NTTFriendlyPrimesGenerator::new(5, 1 << 4);
        // 17 is the only 5-bit prime congruent to 1 mod 16.
        assert_eq!(generator.next_downstream_prime(), Ok(17));
        assert!(generator.next_downstream_prime().is_err());
        let mut generator = NTTFriendlyPrimesGenerator::new(5, 1 << 4);
        assert_eq!(generator.next_upstream_prime(), Ok(17));
        assert!(generator.next_upstream_prime().is_err());
    }
}
