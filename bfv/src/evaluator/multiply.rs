use crate::ciphertext::Ciphertext;
use crate::context::{ContextData, MAX_MULTIPLY_OPERAND_SIZE};
use crate::error::{Error, Result};
use crate::evaluator::Evaluator;
use crate::keys::RelinKeys;
use itertools::izip;
use math::modulus::ONCE;
use math::num_bigint::Div;
use math::poly::PolyRNS;
use math::ring::RingRNS;
use num_bigint::BigInt;
use tracing::instrument;

impl Evaluator {
    pub fn multiply(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        let mut res: Ciphertext = a.clone();
        self.multiply_inplace(&mut res, b)?;
        Ok(res)
    }

    /// Assigns a * b to a. A product of sizes M and N has size M+N-1.
    #[instrument(skip_all)]
    pub fn multiply_inplace(&self, a: &mut Ciphertext, b: &Ciphertext) -> Result<()> {
        let data: &ContextData = self.context_data_pair(a, b)?;
        check_operand_size(a.size().min(b.size()))?;
        a.polys = tensor(data, &a.polys, Some(b.polys.as_slice()));
        Ok(())
    }

    pub fn square(&self, ct: &Ciphertext) -> Result<Ciphertext> {
        let mut res: Ciphertext = ct.clone();
        self.square_inplace(&mut res)?;
        Ok(res)
    }

    #[instrument(skip_all)]
    pub fn square_inplace(&self, ct: &mut Ciphertext) -> Result<()> {
        let data: &ContextData = self.context_data(ct)?;
        check_operand_size(ct.size())?;
        ct.polys = tensor(data, &ct.polys, None);
        Ok(())
    }

    /// Returns the product of cts, multiplied as a balanced tree and
    /// relinearized after every product. Inputs must have size 2.
    pub fn multiply_many(&self, cts: &[Ciphertext], relin_keys: &RelinKeys) -> Result<Ciphertext> {
        if cts.is_empty() {
            return Err(Error::InvalidArgument("no ciphertext to multiply".to_string()));
        }
        let mut layer: Vec<Ciphertext> = cts.to_vec();
        while layer.len() > 1 {
            let mut next: Vec<Ciphertext> = Vec::with_capacity(layer.len().div_ceil(2));
            let mut iter = layer.into_iter();
            while let Some(mut a) = iter.next() {
                if let Some(b) = iter.next() {
                    if a == b {
                        self.square_inplace(&mut a)?;
                    } else {
                        self.multiply_inplace(&mut a, &b)?;
                    }
                    self.relinearize_inplace(&mut a, relin_keys)?;
                }
                next.push(a);
            }
            layer = next;
        }
        layer
            .pop()
            .ok_or_else(|| Error::InvalidArgument("no ciphertext to multiply".to_string()))
    }

    /// Returns ct^exponent by square-and-multiply, relinearizing after every
    /// product. ct must have size 2.
    pub fn exponentiate(&self, ct: &Ciphertext, exponent: u64, relin_keys: &RelinKeys) -> Result<Ciphertext> {
        if exponent == 0 {
            return Err(Error::InvalidArgument("exponent cannot be 0".to_string()));
        }
        self.context_data(ct)?;
        let mut base: Ciphertext = ct.clone();
        let mut acc: Option<Ciphertext> = None;
        let mut e: u64 = exponent;
        loop {
            if e & 1 == 1 {
                acc = Some(match acc {
                    None => base.clone(),
                    Some(mut acc) => {
                        self.multiply_inplace(&mut acc, &base)?;
                        self.relinearize_inplace(&mut acc, relin_keys)?;
                        acc
                    }
                });
            }
            e >>= 1;
            if e == 0 {
                break;
            }
            self.square_inplace(&mut base)?;
            self.relinearize_inplace(&mut base, relin_keys)?;
        }
        acc.ok_or_else(|| Error::InvalidArgument("exponent cannot be 0".to_string()))
    }
}

fn check_operand_size(size: usize) -> Result<()> {
    if size > MAX_MULTIPLY_OPERAND_SIZE {
        return Err(Error::UnsupportedOperation(format!(
            "operand size {} exceeds {}",
            size, MAX_MULTIPLY_OPERAND_SIZE
        )));
    }
    Ok(())
}

/// Returns round(t/Q * (a ⊗ b)) mod Q, b = a when None.
///
/// The operands are lifted to [-Q/2, Q/2) and multiplied exactly in the
/// auxiliary basis, whose modulus exceeds twice any tensor coefficient.
fn tensor(data: &ContextData, a: &[PolyRNS<u64>], b: Option<&[PolyRNS<u64>]>) -> Vec<PolyRNS<u64>> {
    let ring: &RingRNS<u64> = data.ring();
    let aux: &RingRNS<u64> = data.aux_ring();
    let n: usize = ring.n();

    let mut coeffs: Vec<BigInt> = vec![BigInt::default(); n];
    let mut lift = |polys: &[PolyRNS<u64>]| -> Vec<PolyRNS<u64>> {
        polys
            .iter()
            .map(|p| {
                ring.to_bigint_inplace(p, &mut coeffs);
                let mut lifted: PolyRNS<u64> = aux.new_polyrns();
                aux.from_bigint_inplace(&coeffs, &mut lifted);
                aux.ntt_inplace::<false>(&mut lifted);
                lifted
            })
            .collect()
    };

    let a_aux: Vec<PolyRNS<u64>> = lift(a);
    let b_aux: Option<Vec<PolyRNS<u64>>> = b.map(&mut lift);

    let size: usize = a.len() + b.map_or(a.len(), |b| b.len()) - 1;
    let mut prod: Vec<PolyRNS<u64>> = (0..size).map(|_| aux.new_polyrns()).collect();

    match &b_aux {
        Some(b_aux) => {
            a_aux.iter().enumerate().for_each(|(i, a_i)| {
                b_aux
                    .iter()
                    .enumerate()
                    .for_each(|(j, b_j)| aux.mul_add_inplace(a_i, b_j, &mut prod[i + j]))
            });
        }
        None => {
            let mut cross: PolyRNS<u64> = aux.new_polyrns();
            a_aux.iter().enumerate().for_each(|(i, a_i)| {
                aux.mul_add_inplace(a_i, a_i, &mut prod[2 * i]);
                a_aux[i + 1..].iter().enumerate().for_each(|(k, a_j)| {
                    aux.mul(a_i, a_j, &mut cross);
                    aux.add_inplace::<ONCE>(&cross, &mut prod[2 * i + 1 + k]);
                    aux.add_inplace::<ONCE>(&cross, &mut prod[2 * i + 1 + k]);
                });
            });
        }
    }

    let q: BigInt = BigInt::from(data.total_coeff_modulus().clone());
    let t: u64 = data.parms().plain_modulus();
    let mut scaled: Vec<BigInt> = vec![BigInt::default(); n];
    prod.iter_mut()
        .map(|p| {
            aux.intt_inplace::<false>(p);
            aux.to_bigint_inplace(p, &mut coeffs);
            izip!(scaled.iter_mut(), coeffs.iter()).for_each(|(z, y)| *z = Div::div_round(&(y * t), &q));
            let mut res: PolyRNS<u64> = ring.new_polyrns();
            ring.from_bigint_inplace(&scaled, &mut res);
            res
        })
        .collect()
}
