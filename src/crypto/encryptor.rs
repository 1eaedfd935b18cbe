use std::convert::TryFrom;

use super::*;

/// Plugable closure generator enum, which creates instance of crypto function
///     based on selected algorythm types.
/// # Attention:
/// Immutable by design and should be instance per invocation to make sure no
///     sensitive data is been stored in memory longer than necessary.
/// Underlying algorithms are implemented by Rust-crypto crate family.
///
/// Allowed (and implemented) content encryption algorithms (JWA `enc`).
/// According to (spec)[https://identity.foundation/didcomm-messaging/spec/#curves-and-content-encryption-algorithms]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CryptoAlgorithm {
    XC20P,
    A256GCM,
}

impl CryptoAlgorithm {
    /// JWA `enc` name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CryptoAlgorithm::XC20P => "XC20P",
            CryptoAlgorithm::A256GCM => "A256GCM",
        }
    }

    /// JWA `alg` name of the key wrap, for the authenticated (ECDH-1PU)
    /// or anonymous (ECDH-ES) key agreement family.
    pub fn key_wrap_alg(&self, authenticated: bool) -> &'static str {
        match (self, authenticated) {
            (CryptoAlgorithm::XC20P, true) => "ECDH-1PU+XC20PKW",
            (CryptoAlgorithm::XC20P, false) => "ECDH-ES+XC20PKW",
            (CryptoAlgorithm::A256GCM, true) => "ECDH-1PU+A256KW",
            (CryptoAlgorithm::A256GCM, false) => "ECDH-ES+A256KW",
        }
    }

    /// Splits a JWA key wrap `alg` back into the wrapping algorithm and
    /// whether the wrap authenticates the sender.
    pub fn from_key_wrap_alg(alg: &str) -> Result<(Self, bool), Error> {
        match alg {
            "ECDH-1PU+XC20PKW" => Ok((Self::XC20P, true)),
            "ECDH-ES+XC20PKW" => Ok((Self::XC20P, false)),
            "ECDH-1PU+A256KW" => Ok((Self::A256GCM, true)),
            "ECDH-ES+A256KW" => Ok((Self::A256GCM, false)),
            other => Err(Error::UnsupportedAlgorithm(other.to_string())),
        }
    }

    pub(crate) fn nonce_length(&self) -> usize {
        match self {
            CryptoAlgorithm::XC20P => 24,
            CryptoAlgorithm::A256GCM => 12,
        }
    }
}

impl Cypher for CryptoAlgorithm {
    /// Generates + invokes crypto of `SymmetricCypherMethod` which perfoms encryption.
    /// Algorithm selected is based on struct's `CryptoAlgorithm` property.
    fn encryptor(&self) -> SymmetricCypherMethod {
        match self {
            CryptoAlgorithm::XC20P => Box::new(
                |nonce: &[u8], key: &[u8], message: &[u8], aad: &[u8]| -> Result<Vec<u8>, Error> {
                    check_nonce(nonce, 24).map_err(Error::IllegalArgument)?;
                    check_key(key, 32).map_err(Error::IllegalArgument)?;
                    use chacha20poly1305::{
                        aead::{Aead, NewAead, Payload},
                        XChaCha20Poly1305, XNonce,
                    };
                    let nonce = XNonce::from_slice(&nonce[..24]);
                    let aead = XChaCha20Poly1305::new(key.into());
                    aead.encrypt(nonce, Payload { msg: message, aad })
                        .map_err(|e| Error::IllegalArgument(e.to_string()))
                },
            ),
            CryptoAlgorithm::A256GCM => Box::new(
                |nonce: &[u8], key: &[u8], message: &[u8], aad: &[u8]| -> Result<Vec<u8>, Error> {
                    check_nonce(nonce, 12).map_err(Error::IllegalArgument)?;
                    check_key(key, 32).map_err(Error::IllegalArgument)?;
                    use aes_gcm::{
                        aead::{generic_array::GenericArray, Aead, NewAead, Payload},
                        Aes256Gcm,
                    };
                    let nonce = GenericArray::from_slice(&nonce[..12]);
                    let aead = Aes256Gcm::new(GenericArray::from_slice(key));
                    aead.encrypt(nonce, Payload { msg: message, aad })
                        .map_err(|e| Error::IllegalArgument(e.to_string()))
                },
            ),
        }
    }

    /// Generates + invokes crypto of `SymmetricCypherMethod` which perfoms decryption.
    /// Algorithm selected is based on struct's `CryptoAlgorithm` property.
    fn decryptor(&self) -> SymmetricCypherMethod {
        match self {
            CryptoAlgorithm::XC20P => Box::new(
                |nonce: &[u8], key: &[u8], message: &[u8], aad: &[u8]| -> Result<Vec<u8>, Error> {
                    check_nonce(nonce, 24).map_err(Error::MalformedMessage)?;
                    check_key(key, 32).map_err(Error::MalformedMessage)?;
                    use chacha20poly1305::{
                        aead::{Aead, NewAead, Payload},
                        XChaCha20Poly1305, XNonce,
                    };
                    let aead = XChaCha20Poly1305::new(key.into());
                    let nonce = XNonce::from_slice(&nonce[..24]);
                    aead.decrypt(nonce, Payload { msg: message, aad })
                        .map_err(|e| Error::MalformedMessage(e.to_string()))
                },
            ),
            CryptoAlgorithm::A256GCM => Box::new(
                |nonce: &[u8], key: &[u8], message: &[u8], aad: &[u8]| -> Result<Vec<u8>, Error> {
                    check_nonce(nonce, 12).map_err(Error::MalformedMessage)?;
                    check_key(key, 32).map_err(Error::MalformedMessage)?;
                    use aes_gcm::{
                        aead::{generic_array::GenericArray, Aead, NewAead, Payload},
                        Aes256Gcm,
                    };
                    let nonce = GenericArray::from_slice(&nonce[..12]);
                    let aead = Aes256Gcm::new(GenericArray::from_slice(key));
                    aead.decrypt(nonce, Payload { msg: message, aad })
                        .map_err(|e| Error::MalformedMessage(e.to_string()))
                },
            ),
        }
    }
}

impl TryFrom<&str> for CryptoAlgorithm {
    type Error = Error;
    fn try_from(incoming: &str) -> Result<Self, Error> {
        match incoming {
            "XC20P" => Ok(Self::XC20P),
            "A256GCM" => Ok(Self::A256GCM),
            other => Err(Error::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

// inner helper function
fn check_nonce(nonce: &[u8], expected_len: usize) -> Result<(), String> {
    if nonce.len() < expected_len {
        return Err(format!(
            "nonce of {} bytes where {} are required",
            nonce.len(),
            expected_len
        ));
    }
    Ok(())
}

// the underlying ciphers panic on any other key length
fn check_key(key: &[u8], expected_len: usize) -> Result<(), String> {
    if key.len() != expected_len {
        return Err(format!(
            "key of {} bytes where {} are required",
            key.len(),
            expected_len
        ));
    }
    Ok(())
}

#[cfg(test)]
mod batteries_tests {
    use rand::Rng;

    use super::*;

    #[test]
    fn xc20p_round_trip() -> Result<(), Error> {
        // Arrange
        let key = b"super duper key 32 bytes long!!!";
        let nonce = rand::thread_rng().gen::<[u8; 24]>();
        let payload = br#"{"test":"message's body - can be anything..."}"#;
        let aad = b"protected-segment";
        // Act
        let sealed = CryptoAlgorithm::XC20P.encryptor()(&nonce, key, payload, aad)?;
        let opened = CryptoAlgorithm::XC20P.decryptor()(&nonce, key, &sealed, aad)?;
        // Assert
        assert_ne!(sealed, payload.to_vec());
        assert_eq!(opened, payload.to_vec());
        Ok(())
    }

    #[test]
    fn a256gcm_round_trip() -> Result<(), Error> {
        // Arrange
        let key = b"super duper key 32 bytes long!!!";
        let nonce = rand::thread_rng().gen::<[u8; 12]>();
        let payload = br#"{"example":"message's body - can be anything..."}"#;
        let aad = b"protected-segment";
        // Act
        let sealed = CryptoAlgorithm::A256GCM.encryptor()(&nonce, key, payload, aad)?;
        let opened = CryptoAlgorithm::A256GCM.decryptor()(&nonce, key, &sealed, aad)?;
        // Assert
        assert_eq!(opened, payload.to_vec());
        Ok(())
    }

    #[test]
    fn tampered_aad_fails_decryption() {
        // Arrange
        let key = b"super duper key 32 bytes long!!!";
        let nonce = [7u8; 24];
        let sealed =
            CryptoAlgorithm::XC20P.encryptor()(&nonce, key, b"payload", b"honest-aad").unwrap();
        // Act
        let opened = CryptoAlgorithm::XC20P.decryptor()(&nonce, key, &sealed, b"forged-aad");
        // Assert
        assert!(matches!(opened, Err(Error::MalformedMessage(_))));
    }

    #[test]
    fn short_nonce_is_rejected_before_any_crypto() {
        // Act
        let result = CryptoAlgorithm::A256GCM.encryptor()(
            &[0u8; 4],
            b"super duper key 32 bytes long!!!",
            b"payload",
            b"",
        );
        // Assert
        assert!(matches!(result, Err(Error::IllegalArgument(_))));
    }

    #[test]
    fn wrong_size_key_is_rejected_before_any_crypto() {
        // Act
        let sealed = CryptoAlgorithm::XC20P.encryptor()(&[0u8; 24], &[0u8; 16], b"payload", b"");
        let opened = CryptoAlgorithm::A256GCM.decryptor()(&[0u8; 12], &[0u8; 16], b"payload", b"");
        // Assert
        assert!(matches!(sealed, Err(Error::IllegalArgument(_))));
        assert!(matches!(opened, Err(Error::MalformedMessage(_))));
    }

    #[test]
    fn key_wrap_alg_names_round_trip() -> Result<(), Error> {
        // Act / Assert
        for alg in &[CryptoAlgorithm::XC20P, CryptoAlgorithm::A256GCM] {
            for authenticated in &[true, false] {
                let name = alg.key_wrap_alg(*authenticated);
                assert_eq!(
                    CryptoAlgorithm::from_key_wrap_alg(name)?,
                    (*alg, *authenticated)
                );
            }
        }
        assert!(CryptoAlgorithm::from_key_wrap_alg("RSA-OAEP").is_err());
        Ok(())
    }
}
