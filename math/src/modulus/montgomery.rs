use crate::modulus::barrett::BarrettPrecomp;

/// An element in the Montgomery domain.
pub type Montgomery<O> = O;

/// Precomputations for Montgomery arithmetic modulo `q`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MontgomeryPrecomp<O> {
    pub q: O,
    pub two_q: O,
    pub four_q: O,
    pub barrett: BarrettPrecomp<O>,
    pub q_inv: O,
    pub one: Montgomery<O>,
    pub minus_one: Montgomery<O>,
}
