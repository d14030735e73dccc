use crate::ciphertext::Ciphertext;
use crate::context::ContextData;
use crate::error::{check_parms_id, Error, Result};
use crate::evaluator::Evaluator;
use crate::keys::{GaloisKeys, KSwitchKey};
use math::automorphism::{galois_element_conjugate, galois_element_from_step, is_valid_galois_element, naf, AutoPerm};
use math::poly::PolyRNS;
use math::ring::RingRNS;
use tracing::instrument;

impl Evaluator {
    pub fn apply_galois(&self, ct: &Ciphertext, gal_el: usize, galois_keys: &GaloisKeys) -> Result<Ciphertext> {
        let mut res: Ciphertext = ct.clone();
        self.apply_galois_inplace(&mut res, gal_el, galois_keys)?;
        Ok(res)
    }

    /// Applies X -> X^gal_el to ct and switches the result back to s.
    #[instrument(skip_all, fields(gal_el = gal_el))]
    pub fn apply_galois_inplace(&self, ct: &mut Ciphertext, gal_el: usize, galois_keys: &GaloisKeys) -> Result<()> {
        let data: &ContextData = self.check_galois_operand(ct, galois_keys)?;
        let n: usize = data.n();
        if !is_valid_galois_element(n, gal_el) {
            return Err(Error::InvalidArgument(format!(
                "invalid Galois element {} for degree {}",
                gal_el, n
            )));
        }
        let key: &KSwitchKey = galois_keys
            .key(gal_el)
            .ok_or(Error::MissingGaloisElement(gal_el))?;

        let ring: &RingRNS<u64> = data.ring();
        let perm: AutoPerm = AutoPerm::new(n, gal_el);
        let mut buf: PolyRNS<u64> = ring.new_polyrns();

        ring.automorphism(&ct.polys[0], &perm, &mut buf);
        std::mem::swap(&mut ct.polys[0], &mut buf);

        ring.automorphism(&ct.polys[1], &perm, &mut buf);
        ct.polys[1].zero();
        self.switch_key_inplace(data, &buf, key, ct)
    }

    pub fn rotate_rows(&self, ct: &Ciphertext, steps: i32, galois_keys: &GaloisKeys) -> Result<Ciphertext> {
        let mut res: Ciphertext = ct.clone();
        self.rotate_rows_inplace(&mut res, steps, galois_keys)?;
        Ok(res)
    }

    /// Rotates both rows of the slot matrix cyclically, to the left for
    /// positive steps. Without a key for steps itself, the rotation is
    /// composed from the power-of-two steps of its non-adjacent form.
    /// On error ct is left unchanged.
    pub fn rotate_rows_inplace(&self, ct: &mut Ciphertext, steps: i32, galois_keys: &GaloisKeys) -> Result<()> {
        let data: &ContextData = self.check_galois_operand(ct, galois_keys)?;
        if steps == 0 {
            return Ok(());
        }
        let n: usize = data.n();
        let gal_el: usize = galois_element_from_step(n, steps as i64)
            .ok_or_else(|| Error::InvalidArgument(format!("rotation step {} out of range", steps)))?;
        if galois_keys.has_key(gal_el) {
            return self.apply_galois_inplace(ct, gal_el, galois_keys);
        }

        let terms: Vec<i64> = naf(steps as i64);
        if terms.len() == 1 {
            return Err(Error::MissingGaloisElement(gal_el));
        }
        // Rotating by row_size is the identity.
        let row_size: i64 = (n >> 1) as i64;
        let elts: Vec<usize> = terms
            .into_iter()
            .filter(|term| term.abs() != row_size)
            .map(|term| {
                let elt: usize = galois_element_from_step(n, term)
                    .ok_or_else(|| Error::InvalidArgument(format!("rotation step {} out of range", term)))?;
                if galois_keys.has_key(elt) {
                    Ok(elt)
                } else {
                    Err(Error::MissingGaloisElement(elt))
                }
            })
            .collect::<Result<Vec<usize>>>()?;
        elts.into_iter()
            .try_for_each(|elt| self.apply_galois_inplace(ct, elt, galois_keys))
    }

    pub fn rotate_columns(&self, ct: &Ciphertext, galois_keys: &GaloisKeys) -> Result<Ciphertext> {
        let mut res: Ciphertext = ct.clone();
        self.rotate_columns_inplace(&mut res, galois_keys)?;
        Ok(res)
    }

    /// Swaps the two rows of the slot matrix.
    pub fn rotate_columns_inplace(&self, ct: &mut Ciphertext, galois_keys: &GaloisKeys) -> Result<()> {
        let n: usize = self.check_galois_operand(ct, galois_keys)?.n();
        self.apply_galois_inplace(ct, galois_element_conjugate(n), galois_keys)
    }

    fn check_galois_operand(&self, ct: &Ciphertext, galois_keys: &GaloisKeys) -> Result<&ContextData> {
        if !self.context.using_batching() {
            return Err(Error::UnsupportedOperation(
                "rotations require a batching plaintext modulus".to_string(),
            ));
        }
        let data: &ContextData = self.context_data(ct)?;
        if ct.size() != 2 {
            return Err(Error::InvalidArgument(format!(
                "rotations expect a ciphertext of size 2, got {}",
                ct.size()
            )));
        }
        check_parms_id(galois_keys.parms_id(), self.context.key_parms_id())?;
        Ok(data)
    }
}
