use crate::automorphism::AutoPerm;
use crate::poly::{Poly, PolyRNS};
use crate::ring::{Ring, RingRNS};
use itertools::izip;

impl Ring<u64> {
    /// Assigns a(X^gal_el) to b. Expects a in the coefficient domain.
    pub fn automorphism(&self, a: &Poly<u64>, perm: &AutoPerm, b: &mut Poly<u64>) {
        debug_assert!(
            a.n() == b.n(),
            "invalid inputs: a.n() = {} != b.n() = {}",
            a.n(),
            b.n()
        );
        debug_assert!(perm.permutation.len() == a.n());

        let mask: usize = a.n() - 1;
        let q: u64 = self.modulus.q;
        izip!(a.0.iter(), perm.permutation.iter()).for_each(|(ai, idx)| {
            let negate: bool = (idx >> (usize::BITS - 1)) == 1;
            b.0[idx & mask] = if negate && *ai != 0 { q - ai } else { *ai };
        });
    }
}

impl RingRNS<u64> {
    pub fn automorphism(&self, a: &PolyRNS<u64>, perm: &AutoPerm, b: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level());
        debug_assert!(b.level() >= self.level());
        izip!(self.rings.iter(), a.0.iter(), b.0.iter_mut())
            .for_each(|(r, a, b)| r.automorphism(a, perm, b));
    }
}
