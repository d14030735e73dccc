use crate::ciphertext::Ciphertext;
use crate::context::{Context, ContextData};
use crate::error::{check_parms_id, Error, Result};
use crate::keys::{SecretKey, SecretPoly};
use crate::plaintext::Plaintext;
use math::modulus::ONCE;
use math::poly::PolyRNS;
use math::ring::RingRNS;
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use std::sync::Arc;
use tracing::warn;

/// Decrypts ciphertexts of any level and measures their remaining noise budget.
pub struct Decryptor {
    context: Arc<Context>,
    secret_key: SecretPoly,
}

impl Decryptor {
    pub fn new(context: &Arc<Context>, secret_key: &SecretKey) -> Result<Self> {
        check_parms_id(secret_key.parms_id(), context.key_parms_id())?;
        Ok(Self {
            context: context.clone(),
            secret_key: SecretPoly(secret_key.poly.0.clone()),
        })
    }

    /// Returns round(t/Q * [c_0 + c_1*s + ... + c_k*s^k]_Q) mod t.
    /// Logs a warning if the noise budget is exhausted, in which case the
    /// result is likely wrong.
    pub fn decrypt(&self, ct: &Ciphertext) -> Result<Plaintext> {
        let (pt, budget) = self.decrypt_with_budget(ct)?;
        if budget == 0 {
            warn!(parms_id = %ct.parms_id(), "decrypting a ciphertext with an exhausted noise budget");
        }
        Ok(pt)
    }

    /// Same as decrypt, but fails with NoiseExhausted instead of returning
    /// an unreliable plaintext.
    pub fn decrypt_checked(&self, ct: &Ciphertext) -> Result<Plaintext> {
        let (pt, budget) = self.decrypt_with_budget(ct)?;
        if budget == 0 {
            return Err(Error::NoiseExhausted);
        }
        Ok(pt)
    }

    /// Returns max(0, log2(Q) - log2(||[t * phase]_Q||) - 1), in bits.
    pub fn invariant_noise_budget(&self, ct: &Ciphertext) -> Result<u32> {
        let data: &ContextData = self.context_data(ct)?;
        let phase: Vec<BigUint> = self.phase(data, ct);
        Ok(noise_budget(data, &phase))
    }

    fn decrypt_with_budget(&self, ct: &Ciphertext) -> Result<(Plaintext, u32)> {
        let data: &ContextData = self.context_data(ct)?;
        let phase: Vec<BigUint> = self.phase(data, ct);

        let q: &BigUint = data.total_coeff_modulus();
        let half_q: &BigUint = &data.ring().crt.half;
        let t: u64 = data.parms().plain_modulus();
        let coeffs: Vec<u64> = phase
            .iter()
            .map(|x| {
                let m: BigUint = ((x * t + half_q) / q) % t;
                m.to_u64().unwrap_or(0)
            })
            .collect();

        Ok((Plaintext::new(coeffs), noise_budget(data, &phase)))
    }

    fn context_data(&self, ct: &Ciphertext) -> Result<&ContextData> {
        let data: &ContextData = self.context.context_data_or_err(ct.parms_id())?;
        if ct.size() < 2 || ct.coeff_modulus_count() != data.coeff_modulus_count() {
            return Err(Error::InvalidArgument(format!(
                "malformed ciphertext: size {}, {} primes",
                ct.size(),
                ct.coeff_modulus_count()
            )));
        }
        Ok(data)
    }

    /// Returns the coefficients of [c_0 + c_1*s + ... + c_k*s^k]_Q in [0, Q),
    /// evaluated by Horner's rule in the NTT domain.
    fn phase(&self, data: &ContextData, ct: &Ciphertext) -> Vec<BigUint> {
        let ring: &RingRNS<u64> = data.ring();
        let size: usize = ct.size();

        let mut acc: SecretPoly = SecretPoly(ring.new_polyrns());
        ring.ntt::<false>(ct.poly(size - 1), &mut acc);
        let mut tmp: PolyRNS<u64> = ring.new_polyrns();
        for j in (0..size - 1).rev() {
            ring.mul_inplace(&self.secret_key, &mut acc);
            ring.ntt::<false>(ct.poly(j), &mut tmp);
            ring.add_inplace::<ONCE>(&tmp, &mut acc);
        }
        ring.intt_inplace::<false>(&mut acc);

        let mut coeffs: Vec<BigUint> = vec![BigUint::zero(); ring.n()];
        ring.to_biguint_inplace(&acc, &mut coeffs);
        coeffs
    }
}

fn noise_budget(data: &ContextData, phase: &[BigUint]) -> u32 {
    let q: &BigUint = data.total_coeff_modulus();
    let t: u64 = data.parms().plain_modulus();
    let max_noise: BigUint = phase
        .iter()
        .map(|x| {
            let v: BigUint = (x * t) % q;
            let w: BigUint = q - &v;
            if v < w {
                v
            } else {
                w
            }
        })
        .max()
        .unwrap_or_default();
    let budget: i64 = data.total_coeff_modulus_bit_count() as i64 - max_noise.bits() as i64 - 1;
    budget.max(0) as u32
}
