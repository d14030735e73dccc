use crate::context::{Context, ContextData};
use crate::error::{check_parms_id, Error, Result};
use crate::keys::{GaloisKeys, KSwitchKey, PublicKey, RelinKeys, SecretKey, SecretPoly};
use crate::parameters::ParmsId;
use math::automorphism::{default_galois_elements, galois_element_from_step, is_valid_galois_element, AutoPerm};
use math::modulus::barrett::Barrett;
use math::modulus::{BARRETT, ONCE};
use math::poly::PolyRNS;
use math::ring::RingRNS;
use sampling::distributions::{Distribution, SIGMA, SIGMA_BOUND};
use sampling::source::Source;
use std::sync::Arc;
use tracing::debug;
use utils::map::Map;

/// Rounded Gaussian of the encryption and key noise.
pub(crate) fn noise_distribution() -> Result<Distribution> {
    Distribution::gaussian(SIGMA, SIGMA_BOUND).map_err(|e| Error::Parameter(e.to_string()))
}

/// Holds a secret key and derives public, relinearization and Galois keys
/// from it, each call with fresh randomness.
pub struct KeyGenerator {
    context: Arc<Context>,
    secret_key: SecretKey,
    source_xa: Source,
    source_xe: Source,
    dist_xe: Distribution,
}

impl KeyGenerator {
    /// Samples a ternary secret key, seeding the randomness from the operating system.
    pub fn new(context: &Arc<Context>) -> Result<Self> {
        Self::with_source(context, Source::from_entropy())
    }

    /// Samples a ternary secret key from source.
    pub fn with_source(context: &Arc<Context>, mut source: Source) -> Result<Self> {
        let data: &ContextData = context.key_context_data();
        let ring: &RingRNS<u64> = data.ring();
        let mut s: SecretPoly = SecretPoly(ring.new_polyrns());
        ring.fill_distribution(&Distribution::Ternary, &mut source, &mut s);
        ring.ntt_inplace::<false>(&mut s);
        debug!(parms_id = %data.parms_id(), "secret key generated");
        Ok(Self {
            context: context.clone(),
            secret_key: SecretKey {
                poly: s,
                parms_id: *data.parms_id(),
            },
            source_xa: source.branch(),
            source_xe: source.branch(),
            dist_xe: noise_distribution()?,
        })
    }

    /// Re-attaches a secret key previously generated for the same parameters.
    pub fn from_secret_key(context: &Arc<Context>, secret_key: SecretKey) -> Result<Self> {
        check_parms_id(secret_key.parms_id(), context.key_parms_id())?;
        let mut source: Source = Source::from_entropy();
        Ok(Self {
            context: context.clone(),
            secret_key,
            source_xa: source.branch(),
            source_xe: source.branch(),
            dist_xe: noise_distribution()?,
        })
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    pub fn create_public_key(&mut self) -> PublicKey {
        let context: Arc<Context> = self.context.clone();
        let data: &ContextData = context.key_context_data();
        let [b, a] = self.encrypt_zero(data.ring());
        debug!(parms_id = %data.parms_id(), "public key generated");
        PublicKey {
            polys: [b, a],
            parms_id: *data.parms_id(),
        }
    }

    /// Returns the key switching key from s^2 to s.
    pub fn create_relin_keys(&mut self) -> Result<RelinKeys> {
        self.check_keyswitching()?;
        let context: Arc<Context> = self.context.clone();
        let ring: &RingRNS<u64> = context.key_context_data().ring();
        let mut s2: SecretPoly = SecretPoly(ring.new_polyrns());
        ring.mul(&self.secret_key.poly, &self.secret_key.poly, &mut s2);
        let key: KSwitchKey = self.create_kswitch_key(&s2);
        debug!(parms_id = %key.parms_id(), "relinearization keys generated");
        Ok(RelinKeys(key))
    }

    /// Returns the Galois keys of the rotations by ±2^k and of the row swap.
    pub fn create_galois_keys(&mut self) -> Result<GaloisKeys> {
        let elts: Vec<usize> = default_galois_elements(self.context.n());
        self.create_galois_keys_from_elts(&elts)
    }

    /// Returns the Galois keys of the given row rotation steps, 0 standing
    /// for the row swap.
    pub fn create_galois_keys_from_steps(&mut self, steps: &[i32]) -> Result<GaloisKeys> {
        let n: usize = self.context.n();
        let elts: Vec<usize> = steps
            .iter()
            .map(|&step| {
                galois_element_from_step(n, step as i64)
                    .ok_or_else(|| Error::InvalidArgument(format!("rotation step {} out of range", step)))
            })
            .collect::<Result<Vec<usize>>>()?;
        self.create_galois_keys_from_elts(&elts)
    }

    pub fn create_galois_keys_from_elts(&mut self, elts: &[usize]) -> Result<GaloisKeys> {
        self.check_keyswitching()?;
        let context: Arc<Context> = self.context.clone();
        let data: &ContextData = context.key_context_data();
        let ring: &RingRNS<u64> = data.ring();
        let n: usize = ring.n();

        if let Some(elt) = elts.iter().find(|&&elt| !is_valid_galois_element(n, elt)) {
            return Err(Error::InvalidArgument(format!(
                "invalid Galois element {} for degree {}",
                elt, n
            )));
        }

        let mut s_coeff: SecretPoly = SecretPoly(ring.new_polyrns());
        ring.intt::<false>(&self.secret_key.poly, &mut s_coeff);

        let mut keys: Map<usize, KSwitchKey> = Map::new();
        let mut s_gal: SecretPoly = SecretPoly(ring.new_polyrns());
        for &elt in elts {
            if keys.contains_key(&elt) {
                continue;
            }
            ring.automorphism(&s_coeff, &AutoPerm::new(n, elt), &mut s_gal);
            ring.ntt_inplace::<false>(&mut s_gal);
            keys.insert(elt, self.create_kswitch_key(&s_gal));
        }
        debug!(parms_id = %data.parms_id(), count = keys.len(), "Galois keys generated");

        Ok(GaloisKeys {
            keys,
            parms_id: *data.parms_id(),
        })
    }

    fn check_keyswitching(&self) -> Result<()> {
        if !self.context.using_keyswitching() {
            return Err(Error::UnsupportedOperation(
                "key switching requires at least two levels".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns (-a*s + e, a) in NTT form, for a uniform and e Gaussian.
    fn encrypt_zero(&mut self, ring: &RingRNS<u64>) -> [PolyRNS<u64>; 2] {
        let mut a: PolyRNS<u64> = ring.new_polyrns();
        ring.fill_uniform(&mut self.source_xa, &mut a);
        let mut b: PolyRNS<u64> = ring.new_polyrns();
        ring.fill_distribution(&self.dist_xe, &mut self.source_xe, &mut b);
        ring.ntt_inplace::<false>(&mut b);
        let mut a_s: SecretPoly = SecretPoly(ring.new_polyrns());
        ring.mul(&a, &self.secret_key.poly, &mut a_s);
        ring.sub_inplace::<ONCE>(&a_s, &mut b);
        [b, a]
    }

    /// Key switching key from target (NTT form at the key level) to s.
    fn create_kswitch_key(&mut self, target: &PolyRNS<u64>) -> KSwitchKey {
        let context: Arc<Context> = self.context.clone();
        let data: &ContextData = context.key_context_data();
        let ring: &RingRNS<u64> = data.ring();
        let special: usize = ring.level();
        let p: u64 = ring.ring(special).q();

        let mut scaled: SecretPoly = SecretPoly(PolyRNS::new(ring.n(), 0));
        let keys: Vec<[PolyRNS<u64>; 2]> = (0..special)
            .map(|j| {
                let [mut b, a] = self.encrypt_zero(ring);
                let r = ring.ring(j);
                let p_mod_qj: Barrett<u64> = r.modulus.barrett.prepare(r.modulus.barrett.reduce::<BARRETT>(&p));
                r.mul_scalar_barrett::<ONCE>(target.at(j), &p_mod_qj, scaled.at_mut(0));
                r.add_inplace::<ONCE>(scaled.at(0), b.at_mut(j));
                [b, a]
            })
            .collect();

        KSwitchKey {
            keys,
            parms_id: *data.parms_id(),
        }
    }
}

impl KeyGenerator {
    pub fn parms_id(&self) -> &ParmsId {
        self.secret_key.parms_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::{CoeffModulus, ParameterSet, SchemeType, SecurityLevel};
    use math::modulus::WordOps;
    use num_bigint::BigInt;
    use num_traits::{Signed, ToPrimitive};

    fn context(bit_sizes: &[usize]) -> Arc<Context> {
        let n: usize = 64;
        let parms: ParameterSet = ParameterSet::new(SchemeType::Bfv)
            .with_poly_modulus_degree(n)
            .with_coeff_modulus(CoeffModulus::create(n, bit_sizes).unwrap())
            .with_plain_modulus(257);
        Context::create(parms, true, SecurityLevel::None).unwrap()
    }

    #[test]
    fn public_key_is_small_under_secret() {
        let context: Arc<Context> = context(&[40, 40, 50]);
        let mut keygen: KeyGenerator = KeyGenerator::with_source(&context, Source::new([1u8; 32])).unwrap();
        let pk: PublicKey = keygen.create_public_key();
        let ring: &RingRNS<u64> = context.key_context_data().ring();

        // b + a*s = e
        let mut e: PolyRNS<u64> = ring.new_polyrns();
        ring.mul(&pk.polys[1], &keygen.secret_key().poly, &mut e);
        ring.add_inplace::<ONCE>(&pk.polys[0], &mut e);
        ring.intt_inplace::<false>(&mut e);
        let mut coeffs: Vec<BigInt> = vec![BigInt::default(); ring.n()];
        ring.to_bigint_inplace(&e, &mut coeffs);
        assert!(coeffs
            .iter()
            .all(|c| c.abs().to_f64().unwrap() <= SIGMA_BOUND.round()));

        assert_ne!(keygen.create_public_key(), pk);
    }

    #[test]
    fn key_shapes() {
        let context: Arc<Context> = context(&[40, 40, 50]);
        let mut keygen: KeyGenerator = KeyGenerator::with_source(&context, Source::new([2u8; 32])).unwrap();
        let rlk: RelinKeys = keygen.create_relin_keys().unwrap();
        assert_eq!(rlk.key().decomposition_count(), 2);
        assert_eq!(rlk.parms_id(), context.key_parms_id());

        let gk: GaloisKeys = keygen.create_galois_keys().unwrap();
        // ±1, ±2, ±4, ±8, 16 = -16 and the row swap for n = 64.
        assert_eq!(gk.galois_elts().len(), 10);
        assert!(gk.has_key(3) && gk.has_key(127));

        let gk: GaloisKeys = keygen.create_galois_keys_from_steps(&[1, -1, 0]).unwrap();
        assert_eq!(gk.galois_elts().len(), 3);
        assert!(matches!(
            keygen.create_galois_keys_from_steps(&[32]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            keygen.create_galois_keys_from_elts(&[4]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn keyswitching_required() {
        let context: Arc<Context> = context(&[50]);
        let mut keygen: KeyGenerator = KeyGenerator::new(&context).unwrap();
        assert!(matches!(
            keygen.create_relin_keys(),
            Err(Error::UnsupportedOperation(_))
        ));
        assert!(matches!(
            keygen.create_galois_keys(),
            Err(Error::UnsupportedOperation(_))
        ));
    }
}
