use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

pub trait Div {
    fn div_floor(&self, other: &Self) -> Self;
    /// Rounds to the nearest integer, ties away from zero.
    fn div_round(&self, other: &Self) -> Self;
}

impl Div for BigInt {
    fn div_floor(&self, other: &Self) -> Self {
        Integer::div_floor(self, other)
    }

    fn div_round(&self, other: &Self) -> Self {
        let (quo, rem) = self.div_rem(other);
        let rem_twice: BigInt = rem.abs() << 1;
        if !rem.is_zero() && rem_twice >= other.abs() {
            if self.sign() == other.sign() {
                return quo + BigInt::one();
            } else {
                return quo - BigInt::one();
            }
        }
        quo
    }
}
