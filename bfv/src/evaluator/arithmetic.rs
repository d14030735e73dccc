use crate::ciphertext::Ciphertext;
use crate::context::ContextData;
use crate::error::{Error, Result};
use crate::evaluator::Evaluator;
use crate::plaintext::{add_scaled_plain, lift_centered, Plaintext};
use math::modulus::ONCE;
use math::poly::PolyRNS;
use math::ring::RingRNS;

impl Evaluator {
    pub fn negate(&self, ct: &Ciphertext) -> Result<Ciphertext> {
        let mut res: Ciphertext = ct.clone();
        self.negate_inplace(&mut res)?;
        Ok(res)
    }

    pub fn negate_inplace(&self, ct: &mut Ciphertext) -> Result<()> {
        let ring: &RingRNS<u64> = self.context_data(ct)?.ring();
        ct.polys
            .iter_mut()
            .for_each(|p| ring.neg_inplace::<ONCE>(p));
        Ok(())
    }

    pub fn add(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        let mut res: Ciphertext = a.clone();
        self.add_inplace(&mut res, b)?;
        Ok(res)
    }

    /// Assigns a + b to a. The result has the size of the larger operand.
    pub fn add_inplace(&self, a: &mut Ciphertext, b: &Ciphertext) -> Result<()> {
        let ring: &RingRNS<u64> = self.context_data_pair(a, b)?.ring();
        a.polys
            .iter_mut()
            .zip(b.polys.iter())
            .for_each(|(a, b)| ring.add_inplace::<ONCE>(b, a));
        if b.size() > a.size() {
            let start: usize = a.size();
            a.polys.extend_from_slice(&b.polys[start..]);
        }
        Ok(())
    }

    /// Returns the sum of cts, all at the same level.
    pub fn add_many(&self, cts: &[Ciphertext]) -> Result<Ciphertext> {
        let (first, rest) = cts
            .split_first()
            .ok_or_else(|| Error::InvalidArgument("no ciphertext to add".to_string()))?;
        let mut res: Ciphertext = first.clone();
        rest.iter().try_for_each(|ct| self.add_inplace(&mut res, ct))?;
        Ok(res)
    }

    pub fn sub(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        let mut res: Ciphertext = a.clone();
        self.sub_inplace(&mut res, b)?;
        Ok(res)
    }

    /// Assigns a - b to a. The result has the size of the larger operand.
    pub fn sub_inplace(&self, a: &mut Ciphertext, b: &Ciphertext) -> Result<()> {
        let ring: &RingRNS<u64> = self.context_data_pair(a, b)?.ring();
        a.polys
            .iter_mut()
            .zip(b.polys.iter())
            .for_each(|(a, b)| ring.sub_inplace::<ONCE>(b, a));
        if b.size() > a.size() {
            let start: usize = a.size();
            b.polys[start..].iter().for_each(|b| {
                let mut neg: PolyRNS<u64> = b.clone();
                ring.neg_inplace::<ONCE>(&mut neg);
                a.polys.push(neg);
            });
        }
        Ok(())
    }

    pub fn add_plain(&self, ct: &Ciphertext, pt: &Plaintext) -> Result<Ciphertext> {
        let mut res: Ciphertext = ct.clone();
        self.add_plain_inplace(&mut res, pt)?;
        Ok(res)
    }

    /// Adds the encoding round(Q/t * pt) of pt to ct.
    pub fn add_plain_inplace(&self, ct: &mut Ciphertext, pt: &Plaintext) -> Result<()> {
        pt.validate(&self.context)?;
        let data: &ContextData = self.context_data(ct)?;
        add_scaled_plain(data, pt, &mut ct.polys[0], false);
        Ok(())
    }

    pub fn sub_plain(&self, ct: &Ciphertext, pt: &Plaintext) -> Result<Ciphertext> {
        let mut res: Ciphertext = ct.clone();
        self.sub_plain_inplace(&mut res, pt)?;
        Ok(res)
    }

    pub fn sub_plain_inplace(&self, ct: &mut Ciphertext, pt: &Plaintext) -> Result<()> {
        pt.validate(&self.context)?;
        let data: &ContextData = self.context_data(ct)?;
        add_scaled_plain(data, pt, &mut ct.polys[0], true);
        Ok(())
    }

    pub fn multiply_plain(&self, ct: &Ciphertext, pt: &Plaintext) -> Result<Ciphertext> {
        let mut res: Ciphertext = ct.clone();
        self.multiply_plain_inplace(&mut res, pt)?;
        Ok(res)
    }

    /// Multiplies every polynomial of ct by the centered lift of pt.
    /// A zero plaintext fails with TransparentCiphertext.
    pub fn multiply_plain_inplace(&self, ct: &mut Ciphertext, pt: &Plaintext) -> Result<()> {
        pt.validate(&self.context)?;
        if pt.is_zero() {
            return Err(Error::TransparentCiphertext);
        }
        let data: &ContextData = self.context_data(ct)?;
        let ring: &RingRNS<u64> = data.ring();

        let mut m: PolyRNS<u64> = ring.new_polyrns();
        lift_centered(data, pt, &mut m);
        ring.ntt_inplace::<false>(&mut m);

        ct.polys.iter_mut().for_each(|p| {
            ring.ntt_inplace::<false>(p);
            ring.mul_inplace(&m, p);
            ring.intt_inplace::<false>(p);
        });
        Ok(())
    }
}
