//! Homomorphic operations on ciphertexts.
//!
//! Every operation has an in-place form working on its first operand and an
//! out-of-place form returning a new ciphertext. Binary operations require
//! both operands at the same level; bring them together with
//! [Evaluator::mod_switch_to] first.

mod arithmetic;
mod galois;
mod keyswitch;
mod modswitch;
mod multiply;

use crate::ciphertext::Ciphertext;
use crate::context::{Context, ContextData};
use crate::error::{check_parms_id, Error, Result};
use std::sync::Arc;

pub struct Evaluator {
    context: Arc<Context>,
}

impl Evaluator {
    pub fn new(context: &Arc<Context>) -> Self {
        Self {
            context: context.clone(),
        }
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    /// Returns the level of ct, checking that ct is consistent with it.
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

    /// Returns the common level of a and b.
    fn context_data_pair(&self, a: &Ciphertext, b: &Ciphertext) -> Result<&ContextData> {
        check_parms_id(a.parms_id(), b.parms_id())?;
        self.context_data(b)?;
        self.context_data(a)
    }
}
