use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid modulus {q}: {reason}")]
    InvalidModulus { q: u64, reason: &'static str },
    #[error("no {bit_size}-bit prime congruent to 1 mod {nth_root} left")]
    PrimeSearchExhausted { bit_size: usize, nth_root: u64 },
}

pub type Result<T> = std::result::Result<T, Error>;
