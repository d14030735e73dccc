use crate::error::{Error, Result};
use math::modulus::prime_generation::NTTFriendlyPrimesGenerator;
use sha2::{Digest, Sha256};
use std::fmt;
use utils::map::Map;

/// Homomorphic encryption scheme of a parameter set.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SchemeType {
    #[default]
    None = 0,
    Bfv = 1,
}

impl SchemeType {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(SchemeType::None),
            1 => Some(SchemeType::Bfv),
            _ => None,
        }
    }
}

/// Classical security level enforced on the total coefficient modulus size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SecurityLevel {
    /// No bound, for tests and toy examples only.
    None,
    #[default]
    Tc128,
    Tc192,
    Tc256,
}

/// SHA-256 fingerprint of the canonical encoding of a parameter set.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ParmsId(pub [u8; 32]);

impl ParmsId {
    pub const ZERO: ParmsId = ParmsId([0u8; 32]);
}

impl fmt::Display for ParmsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|b| write!(f, "{:02x}", b))
    }
}

impl fmt::Debug for ParmsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParmsId({})", self)
    }
}

/// Encryption parameters: ring degree N, RNS coefficient modulus and
/// plaintext modulus t.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterSet {
    scheme: SchemeType,
    poly_modulus_degree: usize,
    coeff_modulus: Vec<u64>,
    plain_modulus: u64,
}

impl ParameterSet {
    pub fn new(scheme: SchemeType) -> Self {
        Self {
            scheme,
            poly_modulus_degree: 0,
            coeff_modulus: Vec::new(),
            plain_modulus: 0,
        }
    }

    pub fn with_poly_modulus_degree(mut self, n: usize) -> Self {
        self.poly_modulus_degree = n;
        self
    }

    pub fn with_coeff_modulus(mut self, coeff_modulus: Vec<u64>) -> Self {
        self.coeff_modulus = coeff_modulus;
        self
    }

    pub fn with_plain_modulus(mut self, t: u64) -> Self {
        self.plain_modulus = t;
        self
    }

    pub fn scheme(&self) -> SchemeType {
        self.scheme
    }

    pub fn poly_modulus_degree(&self) -> usize {
        self.poly_modulus_degree
    }

    pub fn coeff_modulus(&self) -> &[u64] {
        &self.coeff_modulus
    }

    pub fn plain_modulus(&self) -> u64 {
        self.plain_modulus
    }

    /// Returns the same parameters with the last prime removed.
    pub(crate) fn drop_last_prime(&self) -> Self {
        let mut parms: ParameterSet = self.clone();
        parms.coeff_modulus.pop();
        parms
    }

    /// Returns the fingerprint of (scheme, N, number of primes, primes, t),
    /// every field encoded as a little-endian u64.
    pub fn parms_id(&self) -> ParmsId {
        let mut hasher: Sha256 = Sha256::new();
        hasher.update((self.scheme as u64).to_le_bytes());
        hasher.update((self.poly_modulus_degree as u64).to_le_bytes());
        hasher.update((self.coeff_modulus.len() as u64).to_le_bytes());
        self.coeff_modulus
            .iter()
            .for_each(|q| hasher.update(q.to_le_bytes()));
        hasher.update(self.plain_modulus.to_le_bytes());
        let mut id: [u8; 32] = [0u8; 32];
        id.copy_from_slice(&hasher.finalize());
        ParmsId(id)
    }
}

const DEGREES: [usize; 6] = [1024, 2048, 4096, 8192, 16384, 32768];

const MAX_BIT_COUNT_TC128: [usize; 6] = [27, 54, 109, 218, 438, 881];
const MAX_BIT_COUNT_TC192: [usize; 6] = [19, 37, 75, 152, 305, 611];
const MAX_BIT_COUNT_TC256: [usize; 6] = [14, 29, 58, 118, 237, 476];

/// Helpers to pick the coefficient modulus.
pub struct CoeffModulus;

impl CoeffModulus {
    /// Largest total bit count of the coefficient modulus for degree n at the
    /// given security level, or 0 if n is not tabulated.
    /// SecurityLevel::None returns usize::MAX.
    pub fn max_bit_count(n: usize, level: SecurityLevel) -> usize {
        let table: &[usize; 6] = match level {
            SecurityLevel::None => return usize::MAX,
            SecurityLevel::Tc128 => &MAX_BIT_COUNT_TC128,
            SecurityLevel::Tc192 => &MAX_BIT_COUNT_TC192,
            SecurityLevel::Tc256 => &MAX_BIT_COUNT_TC256,
        };
        DEGREES
            .iter()
            .position(|&d| d == n)
            .map_or(0, |i| table[i])
    }

    /// Returns distinct primes congruent to 1 mod 2n with the requested bit sizes,
    /// in the order of bit_sizes. Primes of equal size are taken from the largest down.
    pub fn create(n: usize, bit_sizes: &[usize]) -> Result<Vec<u64>> {
        if n < 2 || n & (n - 1) != 0 {
            return Err(Error::Parameter(format!("degree {} is not a power of two", n)));
        }
        if let Some(bits) = bit_sizes.iter().find(|&&b| !(2..=61).contains(&b)) {
            return Err(Error::Parameter(format!("invalid prime size {} bits", bits)));
        }
        let mut generators: Map<usize, NTTFriendlyPrimesGenerator> = Map::new();
        bit_sizes
            .iter()
            .map(|&bits| {
                if !generators.contains_key(&bits) {
                    generators.insert(bits, NTTFriendlyPrimesGenerator::new(bits, 2 * n as u64));
                }
                match generators.get_mut(&bits) {
                    Some(generator) => Ok(generator.next_downstream_prime()?),
                    None => Err(Error::Parameter(format!("no generator for {} bits", bits))),
                }
            })
            .collect()
    }

    /// Returns the default coefficient modulus of degree n at the given level.
    pub fn bfv_default(n: usize, level: SecurityLevel) -> Result<Vec<u64>> {
        let bit_sizes: Vec<usize> = match (level, n) {
            (SecurityLevel::Tc128, 1024) => vec![27],
            (SecurityLevel::Tc128, 2048) => vec![54],
            (SecurityLevel::Tc128, 4096) => vec![36, 36, 37],
            (SecurityLevel::Tc128, 8192) => vec![43, 43, 44, 44, 44],
            (SecurityLevel::Tc128, 16384) => [vec![48; 3], vec![49; 6]].concat(),
            (SecurityLevel::Tc128, 32768) => [vec![55; 15], vec![56]].concat(),
            (SecurityLevel::Tc192, 1024) => vec![19],
            (SecurityLevel::Tc192, 2048) => vec![37],
            (SecurityLevel::Tc192, 4096) => vec![25, 25, 25],
            (SecurityLevel::Tc192, 8192) => vec![38; 4],
            (SecurityLevel::Tc192, 16384) => [vec![43; 3], vec![44; 4]].concat(),
            (SecurityLevel::Tc192, 32768) => vec![47; 13],
            (SecurityLevel::Tc256, 1024) => vec![14],
            (SecurityLevel::Tc256, 2048) => vec![29],
            (SecurityLevel::Tc256, 4096) => vec![29, 29],
            (SecurityLevel::Tc256, 8192) => vec![39, 39, 40],
            (SecurityLevel::Tc256, 16384) => [vec![47; 3], vec![48; 2]].concat(),
            (SecurityLevel::Tc256, 32768) => [vec![53; 8], vec![52]].concat(),
            _ => {
                return Err(Error::Parameter(format!(
                    "no default coefficient modulus for degree {} at {:?}",
                    n, level
                )))
            }
        };
        Self::create(n, &bit_sizes)
    }
}

/// Helpers to pick the plaintext modulus.
pub struct PlainModulus;

impl PlainModulus {
    /// Returns the largest prime of bit_size bits congruent to 1 mod 2n,
    /// which enables batching.
    pub fn batching(n: usize, bit_size: usize) -> Result<u64> {
        if !(2..=60).contains(&bit_size) {
            return Err(Error::Parameter(format!(
                "invalid plain modulus size {} bits",
                bit_size
            )));
        }
        Ok(NTTFriendlyPrimesGenerator::new(bit_size, 2 * n as u64).next_downstream_prime()?)
    }
}
