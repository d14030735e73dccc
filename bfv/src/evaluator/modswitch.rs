use crate::ciphertext::Ciphertext;
use crate::context::ContextData;
use crate::error::{Error, Result};
use crate::evaluator::Evaluator;
use crate::parameters::ParmsId;
use math::ring::RingRNS;
use tracing::debug;

impl Evaluator {
    pub fn mod_switch_to_next(&self, ct: &Ciphertext) -> Result<Ciphertext> {
        let mut res: Ciphertext = ct.clone();
        self.mod_switch_to_next_inplace(&mut res)?;
        Ok(res)
    }

    /// Divides ct by the last prime of its level with rounding, moving it one
    /// level down the chain. The plaintext is unchanged.
    pub fn mod_switch_to_next_inplace(&self, ct: &mut Ciphertext) -> Result<()> {
        let data: &ContextData = self.context_data(ct)?;
        let next: usize = data.next_chain_index().ok_or_else(|| {
            Error::InvalidLevel(format!("{} is the last level of the chain", data.parms_id()))
        })?;
        let next_data: &ContextData = self
            .context
            .context_data(next)
            .ok_or_else(|| Error::InvalidLevel(format!("no level at chain index {}", next)))?;

        let ring: &RingRNS<u64> = data.ring();
        ct.polys
            .iter_mut()
            .for_each(|p| ring.div_round_by_last_modulus_inplace(p));
        ct.set_level(next_data);
        debug!(chain_index = next, "ciphertext switched to the next level");
        Ok(())
    }

    pub fn mod_switch_to(&self, ct: &Ciphertext, parms_id: &ParmsId) -> Result<Ciphertext> {
        let mut res: Ciphertext = ct.clone();
        self.mod_switch_to_inplace(&mut res, parms_id)?;
        Ok(res)
    }

    /// Switches ct down to the level identified by parms_id.
    pub fn mod_switch_to_inplace(&self, ct: &mut Ciphertext, parms_id: &ParmsId) -> Result<()> {
        let current: usize = self.context_data(ct)?.chain_index();
        let target: usize = self.context.context_data_or_err(parms_id)?.chain_index();
        if target > current {
            return Err(Error::InvalidLevel(format!(
                "cannot switch up from chain index {} to {}",
                current, target
            )));
        }
        (target..current).try_for_each(|_| self.mod_switch_to_next_inplace(ct))
    }
}
