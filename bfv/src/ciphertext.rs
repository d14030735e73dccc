use crate::context::ContextData;
use crate::parameters::ParmsId;
use math::poly::PolyRNS;

/// A BFV ciphertext: size >= 2 polynomials in coefficient form, each with one
/// residue per prime of the level identified by parms_id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ciphertext {
    pub(crate) polys: Vec<PolyRNS<u64>>,
    pub(crate) parms_id: ParmsId,
    pub(crate) n: usize,
    pub(crate) coeff_modulus_count: usize,
    pub(crate) correction_factor: u64,
}

impl Ciphertext {
    /// Returns the zero ciphertext of the given size at the level of data.
    pub fn new(data: &ContextData, size: usize) -> Self {
        debug_assert!(size >= 2, "invalid size={}", size);
        Self {
            polys: (0..size).map(|_| data.ring().new_polyrns()).collect(),
            parms_id: *data.parms_id(),
            n: data.n(),
            coeff_modulus_count: data.coeff_modulus_count(),
            correction_factor: 1,
        }
    }

    pub fn size(&self) -> usize {
        self.polys.len()
    }

    pub fn parms_id(&self) -> &ParmsId {
        &self.parms_id
    }

    pub fn poly_modulus_degree(&self) -> usize {
        self.n
    }

    pub fn coeff_modulus_count(&self) -> usize {
        self.coeff_modulus_count
    }

    /// Always 1 for BFV.
    pub fn correction_factor(&self) -> u64 {
        self.correction_factor
    }

    pub fn poly(&self, i: usize) -> &PolyRNS<u64> {
        &self.polys[i]
    }

    pub fn poly_mut(&mut self, i: usize) -> &mut PolyRNS<u64> {
        &mut self.polys[i]
    }

    /// Grows with zero polynomials or shrinks to size polynomials.
    pub fn resize(&mut self, data: &ContextData, size: usize) {
        self.polys.resize_with(size, || data.ring().new_polyrns());
    }

    /// A ciphertext is transparent when every polynomial but the first is zero:
    /// its content is readable without the secret key.
    pub fn is_transparent(&self) -> bool {
        self.polys[1..]
            .iter()
            .all(|p| p.0.iter().all(|r| r.0.iter().all(|&x| x == 0)))
    }

    /// Moves the ciphertext to another level, with the residues of that level.
    pub(crate) fn set_level(&mut self, data: &ContextData) {
        self.parms_id = *data.parms_id();
        self.coeff_modulus_count = data.coeff_modulus_count();
    }
}
