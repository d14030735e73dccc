use crate::modulus::barrett::BarrettPrecomp;
use crate::modulus::montgomery::MontgomeryPrecomp;

/// A word-sized prime with its reduction precomputations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Prime<O> {
    pub q: O,
    pub two_q: O,
    pub four_q: O,
    pub montgomery: MontgomeryPrecomp<O>,
    pub barrett: BarrettPrecomp<O>,
    pub phi: O,
}

/// Deterministic primality test on a word.
pub fn is_prime(q: u64) -> bool {
    primality_test::is_prime(q)
}
