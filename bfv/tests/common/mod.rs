#![allow(dead_code)]

use bfv::{
    CoeffModulus, Context, Decryptor, Encryptor, Evaluator, KeyGenerator, ParameterSet, PublicKey, SchemeType,
    SecurityLevel,
};
use sampling::source::Source;
use std::sync::Arc;

pub const N: usize = 64;

/// 257 is a prime congruent to 1 mod 2*64.
pub const T: u64 = 257;

pub fn sub_test<F: FnOnce()>(name: &str, f: F) {
    println!("Running {}", name);
    f();
}

pub fn parms(bit_sizes: &[usize], t: u64) -> ParameterSet {
    ParameterSet::new(SchemeType::Bfv)
        .with_poly_modulus_degree(N)
        .with_coeff_modulus(CoeffModulus::create(N, bit_sizes).unwrap())
        .with_plain_modulus(t)
}

/// Insecure degree 64 context with three 50-bit data primes and a 60-bit
/// special prime, expanded down to a single prime.
pub fn toy_context() -> Arc<Context> {
    Context::create(parms(&[50, 50, 50, 60], T), true, SecurityLevel::None).unwrap()
}

pub struct Setup {
    pub context: Arc<Context>,
    pub keygen: KeyGenerator,
    pub public_key: PublicKey,
    pub encryptor: Encryptor,
    pub decryptor: Decryptor,
    pub evaluator: Evaluator,
}

impl Setup {
    pub fn new(context: Arc<Context>, seed: u8) -> Self {
        let mut keygen: KeyGenerator = KeyGenerator::with_source(&context, Source::new([seed; 32])).unwrap();
        let public_key: PublicKey = keygen.create_public_key();
        let encryptor: Encryptor = Encryptor::with_public_key(&context, &public_key)
            .unwrap()
            .with_source(Source::new([seed.wrapping_add(1); 32]));
        let decryptor: Decryptor = Decryptor::new(&context, keygen.secret_key()).unwrap();
        let evaluator: Evaluator = Evaluator::new(&context);
        Self {
            context,
            keygen,
            public_key,
            encryptor,
            decryptor,
            evaluator,
        }
    }
}

/// Product of a and b in Z_t[X]/(X^n+1).
pub fn negacyclic_mul(a: &[u64], b: &[u64], n: usize, t: u64) -> Vec<u64> {
    let mut c: Vec<u64> = vec![0; n];
    a.iter().enumerate().for_each(|(i, &ai)| {
        b.iter().enumerate().for_each(|(j, &bj)| {
            let prod: u64 = ((ai as u128 * bj as u128) % t as u128) as u64;
            let k: usize = i + j;
            if k < n {
                c[k] = (c[k] + prod) % t;
            } else {
                c[k - n] = (c[k - n] + t - prod) % t;
            }
        })
    });
    c
}

/// Deterministic coefficients in [0, t).
pub fn coeffs(seed: u64, n: usize, t: u64) -> Vec<u64> {
    (0..n as u64)
        .map(|i| (i.wrapping_mul(0x9e3779b97f4a7c15) ^ seed.wrapping_mul(0x2545f4914f6cdd1d)) % t)
        .collect()
}
