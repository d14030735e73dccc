use crate::context::Context;
use crate::error::{Error, Result};
use crate::plaintext::Plaintext;
use math::modulus::WordOps;
use math::poly::Poly;
use math::ring::Ring;
use std::sync::Arc;

/// Packs N integers modulo t into the slots of a plaintext, viewed as a
/// 2 x N/2 matrix. Slot i of the first row holds the evaluation at psi^(3^i),
/// slot i of the second row the evaluation at psi^(-3^i), so that the Galois
/// element 3^k rotates both rows by k and 2N-1 swaps them.
pub struct BatchEncoder {
    context: Arc<Context>,
    ring: Arc<Ring<u64>>,
    index_map: Vec<usize>,
}

impl BatchEncoder {
    /// Fails with UnsupportedOperation unless t is a prime congruent to 1 mod 2N.
    pub fn new(context: &Arc<Context>) -> Result<Self> {
        let ring: Arc<Ring<u64>> = context
            .plain_ring()
            .cloned()
            .ok_or_else(|| {
                Error::UnsupportedOperation(format!(
                    "plain modulus {} does not support batching",
                    context.plain_modulus()
                ))
            })?;
        Ok(Self {
            context: context.clone(),
            index_map: index_map(ring.n()),
            ring,
        })
    }

    pub fn slot_count(&self) -> usize {
        self.ring.n()
    }

    pub fn row_size(&self) -> usize {
        self.ring.n() >> 1
    }

    /// Encodes up to N values, all smaller than t. Missing slots are zero.
    pub fn encode(&self, values: &[u64]) -> Result<Plaintext> {
        self.check_len(values.len())?;
        let t: u64 = self.ring.q();
        if let Some(v) = values.iter().find(|&&v| v >= t) {
            return Err(Error::InvalidArgument(format!(
                "value {} is not reduced modulo {}",
                v, t
            )));
        }
        let mut poly: Poly<u64> = self.ring.new_poly();
        values
            .iter()
            .zip(self.index_map.iter())
            .for_each(|(&v, &idx)| poly.0[idx] = v);
        self.ring.intt_inplace::<false>(&mut poly);
        Ok(Plaintext::new(poly.0))
    }

    /// Encodes up to N values in (-t/2, t/2], negative values as v + t.
    pub fn encode_signed(&self, values: &[i64]) -> Result<Plaintext> {
        let t: u64 = self.ring.q();
        let half: i128 = (t >> 1) as i128;
        let unsigned: Vec<u64> = values
            .iter()
            .map(|&v| {
                let v: i128 = v as i128;
                if v > half || v < -half {
                    return Err(Error::InvalidArgument(format!(
                        "value {} does not fit modulo {}",
                        v, t
                    )));
                }
                Ok(if v < 0 { (v + t as i128) as u64 } else { v as u64 })
            })
            .collect::<Result<Vec<u64>>>()?;
        self.encode(&unsigned)
    }

    /// Returns the N slot values of pt.
    pub fn decode(&self, pt: &Plaintext) -> Result<Vec<u64>> {
        pt.validate(&self.context)?;
        let mut poly: Poly<u64> = self.ring.new_poly();
        poly.0
            .iter_mut()
            .zip(pt.coeffs().iter())
            .for_each(|(x, &c)| *x = c);
        self.ring.ntt_inplace::<false>(&mut poly);
        Ok(self.index_map.iter().map(|&idx| poly.0[idx]).collect())
    }

    /// Returns the N slot values of pt, values at or above (t+1)/2 read as v - t.
    pub fn decode_signed(&self, pt: &Plaintext) -> Result<Vec<i64>> {
        let t: u64 = self.ring.q();
        let threshold: u64 = (t + 1) >> 1;
        Ok(self
            .decode(pt)?
            .into_iter()
            .map(|v| {
                if v >= threshold {
                    v as i64 - t as i64
                } else {
                    v as i64
                }
            })
            .collect())
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len > self.slot_count() {
            return Err(Error::InvalidArgument(format!(
                "{} values exceed the {} slots",
                len,
                self.slot_count()
            )));
        }
        Ok(())
    }
}

/// Position in the bit-reversed NTT output of every slot.
fn index_map(n: usize) -> Vec<usize> {
    let log_n: u32 = n.log2() as u32;
    let row_size: usize = n >> 1;
    let m: usize = n << 1;
    let mut map: Vec<usize> = vec![0; n];
    let mut pos: usize = 1;
    for i in 0..row_size {
        map[i] = ((pos - 1) >> 1).reverse_bits_msb(log_n);
        map[row_size + i] = ((m - pos - 1) >> 1).reverse_bits_msb(log_n);
        pos = (pos * 3) & (m - 1);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_map_is_a_permutation() {
        let n: usize = 64;
        let mut map: Vec<usize> = index_map(n);
        assert_eq!(map[0], 0);
        map.sort_unstable();
        assert_eq!(map, (0..n).collect::<Vec<usize>>());
    }
}
