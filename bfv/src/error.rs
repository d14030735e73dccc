use crate::parameters::{ParmsId, SchemeType};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid parameters: {0}")]
    Parameter(String),
    #[error("fingerprint mismatch: {left} != {right}")]
    FingerprintMismatch { left: ParmsId, right: ParmsId },
    #[error("invalid level: {0}")]
    InvalidLevel(String),
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
    #[error("missing Galois key for element {0}")]
    MissingGaloisElement(usize),
    #[error("noise budget exhausted")]
    NoiseExhausted,
    #[error("scheme mismatch: expected {expected:?}, found tag {found}")]
    SchemeMismatch { expected: SchemeType, found: u8 },
    #[error("parameters mismatch: {0}")]
    ParmsMismatch(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("result ciphertext is transparent")]
    TransparentCiphertext,
    #[error(transparent)]
    Math(#[from] math::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Fails with FingerprintMismatch unless both ids are equal.
pub(crate) fn check_parms_id(left: &ParmsId, right: &ParmsId) -> Result<()> {
    if left != right {
        return Err(Error::FingerprintMismatch {
            left: *left,
            right: *right,
        });
    }
    Ok(())
}
