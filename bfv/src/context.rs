use crate::error::{Error, Result};
use crate::parameters::{CoeffModulus, ParameterSet, ParmsId, SchemeType, SecurityLevel};
use math::modulus::prime::is_prime;
use math::modulus::prime_generation::NTTFriendlyPrimesGenerator;
use math::modulus::WordOps;
use math::ring::{Ring, RingRNS};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::ToPrimitive;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};
use utils::map::Map;

/// Largest supported ring degree.
pub const MAX_POLY_MODULUS_DEGREE: usize = 1 << 17;
/// Largest number of primes in the coefficient modulus.
pub const MAX_COEFF_MODULUS_COUNT: usize = 64;
/// Largest bit size of a coefficient modulus prime.
pub const MAX_COEFF_MODULUS_BIT_COUNT: usize = 61;
/// Largest bit size of the plaintext modulus.
pub const MAX_PLAIN_MODULUS_BIT_COUNT: usize = 60;
/// Bit size of the auxiliary primes used by ciphertext multiplication.
pub(crate) const AUX_PRIME_BIT_COUNT: usize = 61;
/// Largest operand size, in polynomials, accepted by ciphertext multiplication.
pub(crate) const MAX_MULTIPLY_OPERAND_SIZE: usize = 512;

/// Precomputed data of one level of the modulus switching chain.
pub struct ContextData {
    parms: ParameterSet,
    parms_id: ParmsId,
    chain_index: usize,
    ring: RingRNS<u64>,
    total_coeff_modulus_bit_count: usize,
    coeff_div_plain_modulus: Vec<u64>,
    coeff_modulus_mod_plain_modulus: u64,
    plain_upper_half_threshold: u64,
    plain_upper_half_increment: Vec<u64>,
    keyswitch_ring: Option<RingRNS<u64>>,
    aux_ring: RingRNS<u64>,
}

impl ContextData {
    pub fn parms(&self) -> &ParameterSet {
        &self.parms
    }

    pub fn parms_id(&self) -> &ParmsId {
        &self.parms_id
    }

    pub fn chain_index(&self) -> usize {
        self.chain_index
    }

    /// RNS ring over the primes of this level.
    pub fn ring(&self) -> &RingRNS<u64> {
        &self.ring
    }

    pub fn n(&self) -> usize {
        self.ring.n()
    }

    /// Number of primes at this level.
    pub fn coeff_modulus_count(&self) -> usize {
        self.ring.level() + 1
    }

    pub fn total_coeff_modulus(&self) -> &BigUint {
        self.ring.modulus()
    }

    pub fn total_coeff_modulus_bit_count(&self) -> usize {
        self.total_coeff_modulus_bit_count
    }

    /// floor(Q/t) mod q_i.
    pub fn coeff_div_plain_modulus(&self) -> &[u64] {
        &self.coeff_div_plain_modulus
    }

    /// Q mod t.
    pub fn coeff_modulus_mod_plain_modulus(&self) -> u64 {
        self.coeff_modulus_mod_plain_modulus
    }

    /// (t+1)/2: plaintext coefficients at or above it are negative.
    pub fn plain_upper_half_threshold(&self) -> u64 {
        self.plain_upper_half_threshold
    }

    /// (q_i - t) mod q_i, lifting a negative plaintext coefficient to q_i.
    pub fn plain_upper_half_increment(&self) -> &[u64] {
        &self.plain_upper_half_increment
    }

    /// RNS ring over the primes of this level followed by the special prime,
    /// if key switching is available at this level.
    pub fn keyswitch_ring(&self) -> Option<&RingRNS<u64>> {
        self.keyswitch_ring.as_ref()
    }

    /// RNS ring wide enough to hold the exact tensor product of two
    /// ciphertexts of this level.
    pub fn aux_ring(&self) -> &RingRNS<u64> {
        &self.aux_ring
    }

    /// Chain index of the next level down, if any.
    pub fn next_chain_index(&self) -> Option<usize> {
        self.chain_index.checked_sub(1)
    }
}

/// Validated parameters together with the chain of levels obtained by
/// successively dropping the last prime of the coefficient modulus.
///
/// The key level holds every prime. When it has more than one, the last
/// prime is the special prime used by key switching and the first data
/// level drops it. Levels are stored by chain index, the last level being 0.
pub struct Context {
    security_level: SecurityLevel,
    data: Vec<ContextData>,
    index: Map<ParmsId, usize>,
    first_index: usize,
    using_keyswitching: bool,
    plain_ring: Option<Arc<Ring<u64>>>,
}

impl Context {
    /// Validates parms and builds the chain, either every level down to a
    /// single prime (expand_chain) or only the key and first data levels.
    pub fn create(parms: ParameterSet, expand_chain: bool, security_level: SecurityLevel) -> Result<Arc<Context>> {
        validate(&parms, security_level)?;

        let n: usize = parms.poly_modulus_degree();
        let t: u64 = parms.plain_modulus();

        let mut levels: Vec<ParameterSet> = vec![parms.clone()];
        let first: ParameterSet = parms.drop_last_prime();
        let using_keyswitching: bool = parms.coeff_modulus().len() > 1 && is_valid_level(&first);
        if using_keyswitching {
            levels.push(first);
            if expand_chain {
                loop {
                    let last: &ParameterSet = &levels[levels.len() - 1];
                    if last.coeff_modulus().len() == 1 {
                        break;
                    }
                    let next: ParameterSet = last.drop_last_prime();
                    if !is_valid_level(&next) {
                        break;
                    }
                    levels.push(next);
                }
            }
        }

        let rings: Vec<Arc<Ring<u64>>> = parms
            .coeff_modulus()
            .par_iter()
            .map(|&q| Ring::new(n, q).map(Arc::new))
            .collect::<std::result::Result<Vec<_>, math::Error>>()?;

        let key_modulus: BigUint = parms
            .coeff_modulus()
            .iter()
            .fold(BigUint::from(1u64), |acc, &q| acc * q);
        let aux_count: usize = aux_prime_count(n, key_modulus.bits() as usize);
        let aux_primes: Vec<u64> =
            NTTFriendlyPrimesGenerator::new(AUX_PRIME_BIT_COUNT, 2 * n as u64).next_upstream_primes(aux_count)?;
        let aux_rings: Vec<Arc<Ring<u64>>> = aux_primes
            .par_iter()
            .map(|&q| Ring::new(n, q).map(Arc::new))
            .collect::<std::result::Result<Vec<_>, math::Error>>()?;

        let special: Option<Arc<Ring<u64>>> = if using_keyswitching {
            rings.last().cloned()
        } else {
            None
        };

        let chain_len: usize = levels.len();
        let mut data: Vec<ContextData> = levels
            .into_par_iter()
            .enumerate()
            .map(|(i, level_parms)| {
                ContextData::new(
                    level_parms,
                    chain_len - 1 - i,
                    &rings,
                    &aux_rings,
                    if i == 0 { None } else { special.clone() },
                )
            })
            .collect();
        data.reverse();

        let mut index: Map<ParmsId, usize> = Map::new();
        data.iter().for_each(|d| {
            index.insert(d.parms_id, d.chain_index);
            debug!(
                chain_index = d.chain_index,
                primes = d.coeff_modulus_count(),
                bits = d.total_coeff_modulus_bit_count,
                parms_id = %d.parms_id,
                "chain level"
            );
        });

        let plain_ring: Option<Arc<Ring<u64>>> = if is_prime(t) && t % (2 * n as u64) == 1 {
            Some(Arc::new(Ring::new(n, t)?))
        } else {
            None
        };

        let first_index: usize = if using_keyswitching { chain_len - 2 } else { chain_len - 1 };

        info!(
            degree = n,
            chain_length = chain_len,
            keyswitching = using_keyswitching,
            batching = plain_ring.is_some(),
            "context created"
        );

        Ok(Arc::new(Self {
            security_level,
            data,
            index,
            first_index,
            using_keyswitching,
            plain_ring,
        }))
    }

    pub fn get_context_data(&self, parms_id: &ParmsId) -> Option<&ContextData> {
        self.index.get(parms_id).map(|&i| &self.data[i])
    }

    pub fn context_data(&self, chain_index: usize) -> Option<&ContextData> {
        self.data.get(chain_index)
    }

    /// Level below data, one prime fewer.
    pub fn next_context_data(&self, data: &ContextData) -> Option<&ContextData> {
        data.next_chain_index().and_then(|i| self.context_data(i))
    }

    /// Level above data, one prime more.
    pub fn prev_context_data(&self, data: &ContextData) -> Option<&ContextData> {
        self.context_data(data.chain_index() + 1)
    }

    /// Returns the level data of parms_id, or ParmsMismatch if this context does not know it.
    pub(crate) fn context_data_or_err(&self, parms_id: &ParmsId) -> Result<&ContextData> {
        self.get_context_data(parms_id)
            .ok_or_else(|| Error::ParmsMismatch(format!("unknown parms_id {}", parms_id)))
    }

    pub fn key_context_data(&self) -> &ContextData {
        &self.data[self.data.len() - 1]
    }

    pub fn first_context_data(&self) -> &ContextData {
        &self.data[self.first_index]
    }

    pub fn last_context_data(&self) -> &ContextData {
        &self.data[0]
    }

    pub fn key_parms_id(&self) -> &ParmsId {
        self.key_context_data().parms_id()
    }

    pub fn first_parms_id(&self) -> &ParmsId {
        self.first_context_data().parms_id()
    }

    pub fn last_parms_id(&self) -> &ParmsId {
        self.last_context_data().parms_id()
    }

    /// Number of levels, key level included.
    pub fn chain_len(&self) -> usize {
        self.data.len()
    }

    pub fn using_keyswitching(&self) -> bool {
        self.using_keyswitching
    }

    pub fn using_batching(&self) -> bool {
        self.plain_ring.is_some()
    }

    pub fn security_level(&self) -> SecurityLevel {
        self.security_level
    }

    /// The ring Z_t[X]/(X^N+1), when t is a prime congruent to 1 mod 2N.
    pub fn plain_ring(&self) -> Option<&Arc<Ring<u64>>> {
        self.plain_ring.as_ref()
    }

    pub fn n(&self) -> usize {
        self.key_context_data().n()
    }

    pub fn plain_modulus(&self) -> u64 {
        self.key_context_data().parms().plain_modulus()
    }

    /// Returns a human readable summary of the parameters of the key level.
    pub fn parameters_report(&self) -> String {
        let parms: &ParameterSet = self.key_context_data().parms();
        let sizes: Vec<String> = parms
            .coeff_modulus()
            .iter()
            .map(|q| format!("{}", 64 - q.leading_zeros()))
            .collect();
        let scheme: &str = match parms.scheme() {
            SchemeType::Bfv => "BFV",
            SchemeType::None => "none",
        };
        [
            "/".to_string(),
            "| Encryption parameters :".to_string(),
            format!("|   scheme: {}", scheme),
            format!("|   poly_modulus_degree: {}", parms.poly_modulus_degree()),
            format!(
                "|   coeff_modulus size: {} ({}) bits",
                self.key_context_data().total_coeff_modulus_bit_count(),
                sizes.join(" + ")
            ),
            format!("|   plain_modulus: {}", parms.plain_modulus()),
            "\\".to_string(),
        ]
        .join("\n")
    }
}

impl ContextData {
    fn new(
        parms: ParameterSet,
        chain_index: usize,
        rings: &[Arc<Ring<u64>>],
        aux_rings: &[Arc<Ring<u64>>],
        special: Option<Arc<Ring<u64>>>,
    ) -> Self {
        let count: usize = parms.coeff_modulus().len();
        let ring: RingRNS<u64> = RingRNS::new(rings[..count].to_vec());
        let modulus: &BigUint = ring.modulus();
        let total_coeff_modulus_bit_count: usize = modulus.bits() as usize;

        let t: u64 = parms.plain_modulus();
        let (coeff_div_plain, coeff_mod_plain) = modulus.div_rem(&BigUint::from(t));
        let coeff_div_plain_modulus: Vec<u64> = parms
            .coeff_modulus()
            .iter()
            .map(|&q| (&coeff_div_plain % q).to_u64().unwrap_or(0))
            .collect();
        let plain_upper_half_increment: Vec<u64> = parms
            .coeff_modulus()
            .iter()
            .map(|&q| (q - t % q) % q)
            .collect();

        let keyswitch_ring: Option<RingRNS<u64>> = special.map(|special| {
            let mut ks_rings: Vec<Arc<Ring<u64>>> = rings[..count].to_vec();
            ks_rings.push(special);
            RingRNS::new(ks_rings)
        });

        let aux_count: usize = aux_prime_count(ring.n(), total_coeff_modulus_bit_count).min(aux_rings.len());
        let aux_ring: RingRNS<u64> = RingRNS::new(aux_rings[..aux_count].to_vec());

        Self {
            parms_id: parms.parms_id(),
            parms,
            chain_index,
            total_coeff_modulus_bit_count,
            coeff_div_plain_modulus,
            coeff_modulus_mod_plain_modulus: coeff_mod_plain.to_u64().unwrap_or(0),
            plain_upper_half_threshold: (t + 1) >> 1,
            plain_upper_half_increment,
            keyswitch_ring,
            aux_ring,
            ring,
        }
    }
}

/// Number of auxiliary primes, each above 2^60, such that their product
/// exceeds twice the largest tensor coefficient of two operands modulo
/// a modulus of q_bits bits.
fn aux_prime_count(n: usize, q_bits: usize) -> usize {
    let bits: usize = 2 * q_bits + n.log2() + MAX_MULTIPLY_OPERAND_SIZE.log2() + 2;
    bits.div_ceil(AUX_PRIME_BIT_COUNT - 1)
}

fn product(primes: &[u64]) -> BigUint {
    primes.iter().fold(BigUint::from(1u64), |acc, &q| acc * q)
}

/// A lower level stays valid as long as t < Q.
fn is_valid_level(parms: &ParameterSet) -> bool {
    !parms.coeff_modulus().is_empty() && product(parms.coeff_modulus()) > BigUint::from(parms.plain_modulus())
}

fn validate(parms: &ParameterSet, security_level: SecurityLevel) -> Result<()> {
    if parms.scheme() != SchemeType::Bfv {
        return Err(Error::Parameter("scheme is not set".to_string()));
    }

    let n: usize = parms.poly_modulus_degree();
    if !(2..=MAX_POLY_MODULUS_DEGREE).contains(&n) || n & (n - 1) != 0 {
        return Err(Error::Parameter(format!(
            "poly_modulus_degree {} is not a power of two in [2, {}]",
            n, MAX_POLY_MODULUS_DEGREE
        )));
    }

    let primes: &[u64] = parms.coeff_modulus();
    if primes.is_empty() || primes.len() > MAX_COEFF_MODULUS_COUNT {
        return Err(Error::Parameter(format!(
            "coeff_modulus has {} primes, expected 1 to {}",
            primes.len(),
            MAX_COEFF_MODULUS_COUNT
        )));
    }

    for (i, &q) in primes.iter().enumerate() {
        let bits: usize = (64 - q.leading_zeros()) as usize;
        if !(2..=MAX_COEFF_MODULUS_BIT_COUNT).contains(&bits) {
            return Err(Error::Parameter(format!("coeff_modulus[{}]={} has {} bits", i, q, bits)));
        }
        if !is_prime(q) {
            return Err(Error::Parameter(format!("coeff_modulus[{}]={} is not prime", i, q)));
        }
        if q % (2 * n as u64) != 1 {
            return Err(Error::Parameter(format!(
                "coeff_modulus[{}]={} is not congruent to 1 mod {}",
                i,
                q,
                2 * n
            )));
        }
        if primes[..i].contains(&q) {
            return Err(Error::Parameter(format!("coeff_modulus[{}]={} is repeated", i, q)));
        }
    }

    let t: u64 = parms.plain_modulus();
    let t_bits: usize = (64 - t.leading_zeros()) as usize;
    if !(2..=MAX_PLAIN_MODULUS_BIT_COUNT).contains(&t_bits) {
        return Err(Error::Parameter(format!("plain_modulus {} has {} bits", t, t_bits)));
    }
    if let Some(q) = primes.iter().find(|&&q| t.gcd(&q) != 1) {
        return Err(Error::Parameter(format!(
            "plain_modulus {} is not coprime to {}",
            t, q
        )));
    }

    let total_bits: usize = product(primes).bits() as usize;
    let max_bits: usize = CoeffModulus::max_bit_count(n, security_level);
    if total_bits > max_bits {
        return Err(Error::Parameter(format!(
            "coeff_modulus of {} bits exceeds {} bits allowed for degree {} at {:?}",
            total_bits, max_bits, n, security_level
        )));
    }

    if !is_valid_level(parms) {
        return Err(Error::Parameter(format!(
            "plain_modulus {} is not smaller than the coefficient modulus",
            t
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parms(n: usize, bit_sizes: &[usize], t: u64) -> ParameterSet {
        ParameterSet::new(SchemeType::Bfv)
            .with_poly_modulus_degree(n)
            .with_coeff_modulus(CoeffModulus::create(n, bit_sizes).unwrap())
            .with_plain_modulus(t)
    }

    #[test]
    fn chain_shape() {
        let context: Arc<Context> =
            Context::create(parms(64, &[40, 40, 40, 50], 257), true, SecurityLevel::None).unwrap();
        assert!(context.using_keyswitching());
        assert_eq!(context.chain_len(), 4);
        assert_eq!(context.key_context_data().chain_index(), 3);
        assert_eq!(context.first_context_data().chain_index(), 2);
        assert_eq!(context.last_context_data().chain_index(), 0);
        assert_eq!(context.first_context_data().coeff_modulus_count(), 3);
        assert!(context.key_context_data().keyswitch_ring().is_none());
        let ks: &RingRNS<u64> = context.last_context_data().keyswitch_ring().unwrap();
        assert_eq!(ks.moduli()[1], context.key_context_data().parms().coeff_modulus()[3]);
        let first: &ContextData = context.get_context_data(context.first_parms_id()).unwrap();
        assert_eq!(first.chain_index(), 2);
        assert_eq!(context.prev_context_data(first).unwrap().chain_index(), 3);
        assert_eq!(context.next_context_data(first).unwrap().chain_index(), 1);
        assert!(context.prev_context_data(context.key_context_data()).is_none());
        assert!(context.next_context_data(context.last_context_data()).is_none());
        assert!(context.using_batching());
    }

    #[test]
    fn chain_without_expansion() {
        let context: Arc<Context> =
            Context::create(parms(64, &[40, 40, 40, 50], 256), false, SecurityLevel::None).unwrap();
        assert_eq!(context.chain_len(), 2);
        assert_eq!(context.last_parms_id(), context.first_parms_id());
        assert!(!context.using_batching());
    }

    #[test]
    fn single_prime_disables_keyswitching() {
        let context: Arc<Context> = Context::create(parms(64, &[50], 256), true, SecurityLevel::None).unwrap();
        assert!(!context.using_keyswitching());
        assert_eq!(context.chain_len(), 1);
        assert_eq!(context.key_parms_id(), context.first_parms_id());
    }

    #[test]
    fn rejects_invalid_parameters() {
        let valid: ParameterSet = parms(64, &[40, 40], 256);
        let check = |p: ParameterSet, level: SecurityLevel| {
            assert!(matches!(Context::create(p, true, level), Err(Error::Parameter(_))));
        };
        check(ParameterSet::new(SchemeType::None), SecurityLevel::None);
        check(valid.clone().with_poly_modulus_degree(48), SecurityLevel::None);
        check(valid.clone().with_coeff_modulus(vec![]), SecurityLevel::None);
        check(valid.clone().with_coeff_modulus(vec![12289, 12289]), SecurityLevel::None);
        check(valid.clone().with_coeff_modulus(vec![65537 * 3]), SecurityLevel::None);
        check(valid.clone().with_plain_modulus(1), SecurityLevel::None);
        check(valid.clone().with_plain_modulus(1 << 61), SecurityLevel::None);
        check(valid.clone(), SecurityLevel::Tc128);
        let p: u64 = valid.coeff_modulus()[0];
        check(valid.clone().with_plain_modulus(p), SecurityLevel::None);
    }

    #[test]
    fn security_bound() {
        let n: usize = 1024;
        let ok: ParameterSet = parms(n, &[27], 256);
        assert!(Context::create(ok, true, SecurityLevel::Tc128).is_ok());
        let too_large: ParameterSet = parms(n, &[28], 256);
        assert!(Context::create(too_large.clone(), true, SecurityLevel::Tc128).is_err());
        assert!(Context::create(too_large, true, SecurityLevel::None).is_ok());
    }

    #[test]
    fn constants() {
        let context: Arc<Context> =
            Context::create(parms(64, &[40, 40, 50], 1000), true, SecurityLevel::None).unwrap();
        let data: &ContextData = context.first_context_data();
        let q: &BigUint = data.total_coeff_modulus();
        let t: BigUint = BigUint::from(1000u64);
        let delta: BigUint = q / &t;
        data.parms()
            .coeff_modulus()
            .iter()
            .zip(data.coeff_div_plain_modulus())
            .for_each(|(&qi, &d)| assert_eq!((&delta % qi).to_u64().unwrap(), d));
        assert_eq!((q % &t).to_u64().unwrap(), data.coeff_modulus_mod_plain_modulus());
        assert_eq!(data.plain_upper_half_threshold(), 500);
        assert!(data.aux_ring().modulus().bits() as usize > 2 * data.total_coeff_modulus_bit_count() + 6 + 9);
        assert!(context.parameters_report().contains("40 + 40 + 50"));
    }
}
