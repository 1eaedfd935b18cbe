use core::convert::TryFrom;

use super::*;
use crate::Curve;

/// Signature related batteries for DIDComm.
/// Implementation of all algorithms required by (spec)[https://identity.foundation/didcomm-messaging/spec/#algorithms]
///
/// Key byte conventions match the key extraction layer: Ed25519 signing
/// material is the 64 byte seed-then-public keypair form, EC signing
/// material is the raw scalar; validation material is the raw 32 bytes
/// (OKP) or a SEC1 point (EC).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    EdDsa,
    Es256,
    /// `ECDSA/secp256k1` signatures.
    Es256k,
}

impl SignatureAlgorithm {
    /// JWA `alg` name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureAlgorithm::EdDsa => "EdDSA",
            SignatureAlgorithm::Es256 => "ES256",
            SignatureAlgorithm::Es256k => "ES256K",
        }
    }

    /// The signature algorithm implied by a key's curve.
    pub fn for_curve(curve: Curve) -> Result<Self, Error> {
        match curve {
            Curve::Ed25519 => Ok(SignatureAlgorithm::EdDsa),
            Curve::P256 => Ok(SignatureAlgorithm::Es256),
            Curve::Secp256k1 => Ok(SignatureAlgorithm::Es256k),
            other => Err(Error::UnsupportedAlgorithm(format!(
                "no JWS algorithm for curve {}",
                other
            ))),
        }
    }
}

impl Signer for SignatureAlgorithm {
    /// Builds signer closure, which performs signing.
    fn signer(&self) -> SigningMethod {
        match self {
            SignatureAlgorithm::EdDsa => {
                Box::new(|key: &[u8], message: &[u8]| -> Result<Vec<u8>, Error> {
                    if key.len() != ed25519_dalek::KEYPAIR_LENGTH {
                        return Err(Error::IllegalArgument(format!(
                            "Ed25519 signing takes the {} byte keypair form",
                            ed25519_dalek::KEYPAIR_LENGTH
                        )));
                    }
                    let secret =
                        ed25519_dalek::SecretKey::from_bytes(&key[..ed25519_dalek::SECRET_KEY_LENGTH])
                            .map_err(|e| Error::IllegalArgument(e.to_string()))?;
                    let public =
                        ed25519_dalek::PublicKey::from_bytes(&key[ed25519_dalek::SECRET_KEY_LENGTH..])
                            .map_err(|e| Error::IllegalArgument(e.to_string()))?;
                    let signature =
                        ed25519_dalek::ExpandedSecretKey::from(&secret).sign(message, &public);
                    Ok(signature.to_bytes().to_vec())
                })
            }
            SignatureAlgorithm::Es256 => {
                Box::new(|key: &[u8], message: &[u8]| -> Result<Vec<u8>, Error> {
                    use p256::ecdsa::{signature::Signer as _, Signature, SigningKey};
                    let sk = SigningKey::from_bytes(key)
                        .map_err(|e| Error::IllegalArgument(e.to_string()))?;
                    let signature: Signature = sk.sign(message);
                    Ok(signature.as_ref().to_vec())
                })
            }
            SignatureAlgorithm::Es256k => {
                Box::new(|key: &[u8], message: &[u8]| -> Result<Vec<u8>, Error> {
                    use k256::ecdsa::{signature::Signer as _, Signature, SigningKey};
                    let sk = SigningKey::from_bytes(key)
                        .map_err(|e| Error::IllegalArgument(e.to_string()))?;
                    let signature: Signature = sk.sign(message);
                    Ok(signature.as_ref().to_vec())
                })
            }
        }
    }

    /// Builds validator closure, which performs signature validation.
    /// A well-formed but wrong signature is `Ok(false)`, not an error.
    fn validator(&self) -> ValidationMethod {
        match self {
            SignatureAlgorithm::EdDsa => Box::new(
                |key: &[u8], message: &[u8], signature: &[u8]| -> Result<bool, Error> {
                    let public = ed25519_dalek::PublicKey::from_bytes(key)
                        .map_err(|e| Error::IllegalArgument(e.to_string()))?;
                    let signature = ed25519_dalek::Signature::try_from(signature)
                        .map_err(|e| Error::MalformedMessage(e.to_string()))?;
                    Ok(public.verify_strict(message, &signature).is_ok())
                },
            ),
            SignatureAlgorithm::Es256 => Box::new(
                |key: &[u8], message: &[u8], signature: &[u8]| -> Result<bool, Error> {
                    use p256::ecdsa::{signature::Verifier as _, Signature, VerifyingKey};
                    let vk = VerifyingKey::from_sec1_bytes(key)
                        .map_err(|e| Error::IllegalArgument(e.to_string()))?;
                    let signature = Signature::try_from(signature)
                        .map_err(|e| Error::MalformedMessage(e.to_string()))?;
                    Ok(vk.verify(message, &signature).is_ok())
                },
            ),
            SignatureAlgorithm::Es256k => Box::new(
                |key: &[u8], message: &[u8], signature: &[u8]| -> Result<bool, Error> {
                    use k256::ecdsa::{signature::Verifier as _, Signature, VerifyingKey};
                    let vk = VerifyingKey::from_sec1_bytes(key)
                        .map_err(|e| Error::IllegalArgument(e.to_string()))?;
                    let signature = Signature::try_from(signature)
                        .map_err(|e| Error::MalformedMessage(e.to_string()))?;
                    Ok(vk.verify(message, &signature).is_ok())
                },
            ),
        }
    }
}

impl TryFrom<&str> for SignatureAlgorithm {
    type Error = Error;
    fn try_from(incoming: &str) -> Result<Self, Error> {
        match incoming {
            "EdDSA" => Ok(Self::EdDsa),
            "ES256" => Ok(Self::Es256),
            "ES256K" => Ok(Self::Es256k),
            other => Err(Error::UnsupportedAlgorithm(other.to_string())),
        }
    }
}
