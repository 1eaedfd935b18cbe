//! Collection of utilities for cryptography related components.
pub mod encryptor;
pub mod signer;

pub use {encryptor::CryptoAlgorithm, signer::SignatureAlgorithm};

pub use crate::Error;

/// Boxed closure signature for symmetric AEAD methods.
/// Arguments sequence: nonce, key, message, aad.
pub type SymmetricCypherMethod = Box<dyn Fn(&[u8], &[u8], &[u8], &[u8]) -> Result<Vec<u8>, Error>>;

/// Boxed closure signature for signature signing methods.
/// .0 == `key: &[u8]`; .1 == `message`;
pub type SigningMethod = Box<dyn Fn(&[u8], &[u8]) -> Result<Vec<u8>, Error>>;

/// Boxed closure signature for signature validating methods.
/// .0 == `key: &[u8]`; .1 == `message`; .2 == `signature`;
pub type ValidationMethod = Box<dyn Fn(&[u8], &[u8], &[u8]) -> Result<bool, Error>>;

/// Trait must be implemented for pluggable content encryption.
/// Implemented by [`CryptoAlgorithm`].
pub trait Cypher {
    fn encryptor(&self) -> SymmetricCypherMethod;
    fn decryptor(&self) -> SymmetricCypherMethod;
}

/// Trait must be implemented for pluggable signatures.
/// Implemented by [`SignatureAlgorithm`].
pub trait Signer {
    fn signer(&self) -> SigningMethod;
    fn validator(&self) -> ValidationMethod;
}
