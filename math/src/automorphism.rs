//! Galois automorphisms `X -> X^g` of `Z_q[X]/(X^N+1)`, with g odd in [1, 2N).
//!
//! The Galois group is generated by 3 (order N/2) and 2N-1 (order 2). Under
//! the batching isomorphism, 3^k rotates both rows of slots by k positions
//! and 2N-1 swaps the two rows.

use crate::modulus::WordOps;

/// Generator of the row rotations.
pub const GALOIS_GENERATOR: usize = 3;

/// Coefficient-domain permutation of the automorphism of index gal_el:
/// entry i holds the destination of X^i with the sign in its most significant bit.
pub struct AutoPerm {
    pub gal_el: usize,
    pub permutation: Vec<usize>,
}

impl AutoPerm {
    /// Returns the lookup table of X^i -> X^{i * gal_el mod 2n}.
    /// Panics if n is not a power of two or gal_el is even.
    pub fn new(n: usize, gal_el: usize) -> Self {
        assert!(n & (n - 1) == 0, "invalid n={}: not a power-of-two", n);
        assert!(gal_el & 1 == 1, "invalid gal_el={}: not coprime with 2n={}", gal_el, 2 * n);

        let log_n: usize = n.log2();
        let mask: usize = n - 1;
        let permutation: Vec<usize> = (0..n)
            .map(|i| {
                let gal_el_i: usize = i * gal_el;
                let sign: usize = (gal_el_i >> log_n) & 1;
                (gal_el_i & mask) | (sign << (usize::BITS - 1))
            })
            .collect();

        Self {
            gal_el,
            permutation,
        }
    }
}

/// Returns true if gal_el is a valid Galois element for degree n.
pub fn is_valid_galois_element(n: usize, gal_el: usize) -> bool {
    gal_el & 1 == 1 && gal_el < 2 * n
}

/// Returns 3^k mod 2n.
pub fn galois_element_pow(n: usize, k: usize) -> usize {
    let mask: usize = 2 * n - 1;
    let mut gal_el: usize = 1;
    (0..k).for_each(|_| gal_el = (gal_el * GALOIS_GENERATOR) & mask);
    gal_el
}

/// Returns 2n-1, the element swapping the two rows.
pub fn galois_element_conjugate(n: usize) -> usize {
    2 * n - 1
}

/// Returns the Galois element rotating the rows by step positions
/// (left for positive steps), or 2n-1 for step 0.
/// Returns None if |step| >= n/2.
pub fn galois_element_from_step(n: usize, step: i64) -> Option<usize> {
    let row_size: usize = n >> 1;
    if step == 0 {
        return Some(galois_element_conjugate(n));
    }
    let abs: usize = step.unsigned_abs() as usize;
    if abs >= row_size {
        return None;
    }
    if step > 0 {
        Some(galois_element_pow(n, abs))
    } else {
        Some(galois_element_pow(n, row_size - abs))
    }
}

/// Returns the distinct Galois elements of the rotations by ±2^k,
/// k < log2(n/2), followed by the row swap.
pub fn default_galois_elements(n: usize) -> Vec<usize> {
    let row_size: usize = n >> 1;
    let mut elts: Vec<usize> = Vec::new();
    let mut pow: usize = 1;
    while pow < row_size {
        elts.push(galois_element_pow(n, pow));
        // Rotating by row_size/2 is its own inverse.
        if pow != row_size - pow {
            elts.push(galois_element_pow(n, row_size - pow));
        }
        pow <<= 1;
    }
    elts.push(galois_element_conjugate(n));
    elts
}

/// Non-adjacent form of value: signed powers of two summing to value,
/// no two of them adjacent.
pub fn naf(value: i64) -> Vec<i64> {
    let mut res: Vec<i64> = Vec::new();
    let sign: bool = value < 0;
    let mut value: i64 = value.abs();
    let mut i: u32 = 0;
    while value != 0 {
        let zi: i64 = if value & 1 == 1 { 2 - (value & 3) } else { 0 };
        value = (value - zi) >> 1;
        if zi != 0 {
            res.push((if sign { -zi } else { zi }) * (1 << i));
        }
        i += 1;
    }
    res
}
