use crate::ciphertext::Ciphertext;
use crate::context::ContextData;
use crate::error::{check_parms_id, Error, Result};
use crate::evaluator::Evaluator;
use crate::keys::{KSwitchKey, RelinKeys};
use math::modulus::ONCE;
use math::poly::{Poly, PolyRNS};
use math::ring::RingRNS;
use tracing::instrument;

impl Evaluator {
    pub fn relinearize(&self, ct: &Ciphertext, relin_keys: &RelinKeys) -> Result<Ciphertext> {
        let mut res: Ciphertext = ct.clone();
        self.relinearize_inplace(&mut res, relin_keys)?;
        Ok(res)
    }

    /// Brings a size 3 ciphertext back to size 2, switching its s^2 component
    /// to s.
    #[instrument(skip_all)]
    pub fn relinearize_inplace(&self, ct: &mut Ciphertext, relin_keys: &RelinKeys) -> Result<()> {
        let data: &ContextData = self.context_data(ct)?;
        if ct.size() != 3 {
            return Err(Error::InvalidArgument(format!(
                "relinearization expects a ciphertext of size 3, got {}",
                ct.size()
            )));
        }
        check_parms_id(relin_keys.parms_id(), self.context.key_parms_id())?;
        let c2: PolyRNS<u64> = ct.polys[2].clone();
        self.switch_key_inplace(data, &c2, relin_keys.key(), ct)?;
        ct.polys.truncate(2);
        Ok(())
    }

    /// Adds to (c_0, c_1) the switching of target from the key's source secret to s:
    /// round((sum_j [target]_{q_j} * key_j) / p) over the primes of data.
    /// target is in coefficient form.
    pub(crate) fn switch_key_inplace(
        &self,
        data: &ContextData,
        target: &PolyRNS<u64>,
        key: &KSwitchKey,
        ct: &mut Ciphertext,
    ) -> Result<()> {
        let ks_ring: &RingRNS<u64> = data.keyswitch_ring().ok_or_else(|| {
            Error::UnsupportedOperation("key switching is not available for these parameters".to_string())
        })?;
        let count: usize = data.coeff_modulus_count();
        if key.decomposition_count() < count {
            return Err(Error::InvalidArgument(format!(
                "key has {} components, level has {} primes",
                key.decomposition_count(),
                count
            )));
        }
        // Residue of the special prime in the key, which lives at the key level.
        let special: usize = key.keys[0][0].level();
        let key_residue = |w: usize| if w < count { w } else { special };

        let mut acc: [PolyRNS<u64>; 2] = [ks_ring.new_polyrns(), ks_ring.new_polyrns()];
        let mut buf: Poly<u64> = ks_ring.new_poly();
        for (j, key_j) in key.keys.iter().take(count).enumerate() {
            let target_j: &Poly<u64> = target.at(j);
            ks_ring.rings.iter().enumerate().for_each(|(w, r)| {
                r.reduce_from(&target_j.0, &mut buf);
                r.ntt_inplace::<false>(&mut buf);
                acc.iter_mut().zip(key_j.iter()).for_each(|(acc, k)| {
                    r.mul_add_inplace(&buf, k.at(key_residue(w)), acc.at_mut(w));
                });
            });
        }

        acc.iter_mut().zip(ct.polys.iter_mut()).for_each(|(acc, c)| {
            ks_ring.intt_inplace::<false>(acc);
            ks_ring.div_round_by_last_modulus_inplace(acc);
            data.ring().add_inplace::<ONCE>(acc, c);
        });
        Ok(())
    }
}
