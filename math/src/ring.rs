pub mod impl_u64;

use crate::dft::DFT;
use crate::modulus::prime::Prime;
use crate::modulus::WordOps;
use crate::poly::{Poly, PolyRNS};
use num_bigint::BigUint;
use std::sync::Arc;

/// The ring `Z_q[X]/(X^n+1)` for a single NTT-friendly prime q.
pub struct Ring<O> {
    pub n: usize,
    pub modulus: Prime<O>,
    pub dft: Box<dyn DFT<O> + Send + Sync>,
}

impl<O> Ring<O> {
    pub fn log_n(&self) -> usize {
        self.n().log2()
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn cyclotomic_order(&self) -> usize {
        self.n << 1
    }

    pub fn new_poly(&self) -> Poly<u64> {
        Poly::<u64>::new(self.n())
    }
}

/// CRT reconstruction constants of an RNS basis.
#[derive(Clone, Debug)]
pub struct CrtPrecomp {
    /// Product of the primes.
    pub modulus: BigUint,
    /// floor(modulus / 2).
    pub half: BigUint,
    /// (Q/q_i) * ((Q/q_i)^-1 mod q_i).
    pub coeffs: Vec<BigUint>,
}

/// The ring `Z_Q[X]/(X^n+1)` with Q a product of distinct primes,
/// each residue ring shared with the other bases built on it.
pub struct RingRNS<O> {
    pub rings: Vec<Arc<Ring<O>>>,
    pub crt: CrtPrecomp,
}

impl<O> RingRNS<O> {
    pub fn log_n(&self) -> usize {
        self.n().log2()
    }

    pub fn n(&self) -> usize {
        self.rings[0].n()
    }

    pub fn new_polyrns(&self) -> PolyRNS<u64> {
        PolyRNS::<u64>::new(self.n(), self.level())
    }

    pub fn new_poly(&self) -> Poly<u64> {
        Poly::<u64>::new(self.n())
    }

    pub fn level(&self) -> usize {
        self.rings.len() - 1
    }

    pub fn modulus(&self) -> &BigUint {
        &self.crt.modulus
    }

    pub fn ring(&self, i: usize) -> &Arc<Ring<O>> {
        &self.rings[i]
    }
}
