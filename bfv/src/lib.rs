//! Leveled BFV homomorphic encryption over RNS polynomial rings.
//!
//! | module          | content                                                  |
//! |-----------------|----------------------------------------------------------|
//! | [parameters]    | parameter sets, fingerprints, default moduli             |
//! | [context]       | validated modulus-switching chain and its precomputation |
//! | [keygen]        | secret, public, relinearization and Galois keys          |
//! | [encryptor]     | public and secret key encryption                         |
//! | [decryptor]     | decryption and noise budget                              |
//! | [evaluator]     | homomorphic arithmetic, key switching, rotations         |
//! | [encoder]       | batching of integer vectors into plaintext slots         |
//! | [serialization] | binary encoding of every public object                   |
//!
//! A typical flow builds a [ParameterSet], turns it into a [Context], derives
//! keys with a [KeyGenerator] and then works on [Ciphertext]s through the
//! [Encryptor], [Evaluator] and [Decryptor].

pub mod ciphertext;
pub mod context;
pub mod decryptor;
pub mod encoder;
pub mod encryptor;
pub mod error;
pub mod evaluator;
pub mod keygen;
pub mod keys;
pub mod parameters;
pub mod plaintext;
pub mod serialization;

pub use ciphertext::Ciphertext;
pub use context::{Context, ContextData};
pub use decryptor::Decryptor;
pub use encoder::BatchEncoder;
pub use encryptor::Encryptor;
pub use error::{Error, Result};
pub use evaluator::Evaluator;
pub use keygen::KeyGenerator;
pub use keys::{GaloisKeys, KSwitchKey, PublicKey, RelinKeys, SecretKey};
pub use parameters::{CoeffModulus, ParameterSet, ParmsId, PlainModulus, SchemeType, SecurityLevel};
pub use plaintext::Plaintext;
pub use serialization::{ReaderFrom, WriterTo};
