use crate::parameters::ParmsId;
use math::poly::PolyRNS;
use std::fmt;
use std::ops::{Deref, DerefMut};
use utils::map::Map;

/// Secret-derived RNS polynomial, erased when dropped.
pub(crate) struct SecretPoly(pub(crate) PolyRNS<u64>);

impl Deref for SecretPoly {
    type Target = PolyRNS<u64>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for SecretPoly {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Drop for SecretPoly {
    fn drop(&mut self) {
        self.0.erase()
    }
}

/// Ternary secret s at the key level, stored in NTT form.
/// It cannot be cloned and its memory is zeroed on drop.
pub struct SecretKey {
    pub(crate) poly: SecretPoly,
    pub(crate) parms_id: ParmsId,
}

impl SecretKey {
    pub fn parms_id(&self) -> &ParmsId {
        &self.parms_id
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("parms_id", &self.parms_id)
            .finish_non_exhaustive()
    }
}

/// Encryption of zero (-a*s + e, a) at the key level, in NTT form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    pub(crate) polys: [PolyRNS<u64>; 2],
    pub(crate) parms_id: ParmsId,
}

impl PublicKey {
    pub fn parms_id(&self) -> &ParmsId {
        &self.parms_id
    }
}

/// Key switching key from a secret s' to the secret s: for each data prime
/// q_j, the pair (-a_j*s + e_j + (p mod q_j)*s' [at q_j only], a_j) at the key
/// level in NTT form, p being the special prime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KSwitchKey {
    pub(crate) keys: Vec<[PolyRNS<u64>; 2]>,
    pub(crate) parms_id: ParmsId,
}

impl KSwitchKey {
    pub fn parms_id(&self) -> &ParmsId {
        &self.parms_id
    }

    /// Number of decomposition components, one per data prime.
    pub fn decomposition_count(&self) -> usize {
        self.keys.len()
    }
}

/// Key switching key from s^2 to s.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelinKeys(pub(crate) KSwitchKey);

impl RelinKeys {
    pub fn parms_id(&self) -> &ParmsId {
        self.0.parms_id()
    }

    pub fn key(&self) -> &KSwitchKey {
        &self.0
    }
}

/// Key switching keys from s(X^g) to s, indexed by Galois element g.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GaloisKeys {
    pub(crate) keys: Map<usize, KSwitchKey>,
    pub(crate) parms_id: ParmsId,
}

impl GaloisKeys {
    pub fn parms_id(&self) -> &ParmsId {
        &self.parms_id
    }

    pub fn has_key(&self, gal_el: usize) -> bool {
        self.keys.contains_key(&gal_el)
    }

    pub fn key(&self, gal_el: usize) -> Option<&KSwitchKey> {
        self.keys.get(&gal_el)
    }

    /// Galois elements with a key, in increasing order.
    pub fn galois_elts(&self) -> Vec<usize> {
        let mut elts: Vec<usize> = self.keys.keys().copied().collect();
        elts.sort_unstable();
        elts
    }
}
