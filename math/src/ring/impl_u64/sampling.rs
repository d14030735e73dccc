use crate::modulus::WordOps;
use crate::poly::{Poly, PolyRNS};
use crate::ring::{Ring, RingRNS};
use itertools::izip;
use sampling::distributions::Distribution;
use sampling::source::Source;

impl Ring<u64> {
    pub fn fill_uniform(&self, source: &mut Source, a: &mut Poly<u64>) {
        let max: u64 = self.modulus.q;
        let mask: u64 = max.mask();
        a.0.iter_mut()
            .for_each(|a| *a = source.next_u64n(max, mask));
    }
}

impl RingRNS<u64> {
    /// Samples a uniform element of Z_Q[X]/(X^n+1), valid in either domain.
    pub fn fill_uniform(&self, source: &mut Source, a: &mut PolyRNS<u64>) {
        izip!(self.rings.iter(), a.0.iter_mut()).for_each(|(r, a)| r.fill_uniform(source, a));
    }

    /// Samples small integer coefficients from dist and lifts them to every prime.
    /// Output is in the coefficient domain.
    pub fn fill_distribution(&self, dist: &Distribution, source: &mut Source, a: &mut PolyRNS<u64>) {
        let mut coeffs: Vec<i64> = vec![0; self.n()];
        dist.fill(source, &mut coeffs);
        self.from_signed(&coeffs, a);
        coeffs
            .iter_mut()
            .for_each(|x| unsafe { std::ptr::write_volatile(x, 0) });
    }
}
