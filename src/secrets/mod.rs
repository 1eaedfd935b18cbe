//! Locally held private key material ("secrets").

pub mod resolver;

pub use resolver::{ExampleSecretsResolver, SecretsResolver};

use std::fmt;

use crate::Jwk;

/// A private key held by the local party, addressed by the same `kid` its
/// public half carries in the owner's DID document.
///
/// Secrets are inputs only; the type deliberately has no `Serialize` impl.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Secret {
    pub kid: String,

    #[serde(rename = "type")]
    pub type_: SecretType,

    #[serde(flatten)]
    pub material: SecretMaterial,
}

/// Known secret types, mirroring the verification method types of the
/// public side. Anything else round-trips through `Other` and is rejected
/// at key construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretType {
    JsonWebKey2020,
    X25519KeyAgreementKey2019,
    X25519KeyAgreementKey2020,
    Ed25519VerificationKey2018,
    Ed25519VerificationKey2020,
    EcdsaSecp256k1VerificationKey2019,
    Other(String),
}

impl SecretType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::JsonWebKey2020 => "JsonWebKey2020",
            Self::X25519KeyAgreementKey2019 => "X25519KeyAgreementKey2019",
            Self::X25519KeyAgreementKey2020 => "X25519KeyAgreementKey2020",
            Self::Ed25519VerificationKey2018 => "Ed25519VerificationKey2018",
            Self::Ed25519VerificationKey2020 => "Ed25519VerificationKey2020",
            Self::EcdsaSecp256k1VerificationKey2019 => "EcdsaSecp256k1VerificationKey2019",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for SecretType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for SecretType {
    fn from(name: &str) -> Self {
        match name {
            "JsonWebKey2020" => Self::JsonWebKey2020,
            "X25519KeyAgreementKey2019" => Self::X25519KeyAgreementKey2019,
            "X25519KeyAgreementKey2020" => Self::X25519KeyAgreementKey2020,
            "Ed25519VerificationKey2018" => Self::Ed25519VerificationKey2018,
            "Ed25519VerificationKey2020" => Self::Ed25519VerificationKey2020,
            "EcdsaSecp256k1VerificationKey2019" => Self::EcdsaSecp256k1VerificationKey2019,
            other => Self::Other(other.to_string()),
        }
    }
}

impl<'de> serde::Deserialize<'de> for SecretType {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from(name.as_str()))
    }
}

/// Private key material, in any of the spellings the public side uses.
/// `Debug` never shows the material.
#[derive(Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum SecretMaterial {
    Jwk {
        #[serde(rename = "privateKeyJwk")]
        private_key_jwk: Jwk,
    },
    Multibase {
        #[serde(rename = "privateKeyMultibase")]
        private_key_multibase: String,
    },
    Base58 {
        #[serde(rename = "privateKeyBase58")]
        private_key_base58: String,
    },
    Hex {
        #[serde(rename = "privateKeyHex")]
        private_key_hex: String,
    },
}

impl fmt::Debug for SecretMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spelling = match self {
            Self::Jwk { .. } => "jwk",
            Self::Multibase { .. } => "multibase",
            Self::Base58 { .. } => "base58",
            Self::Hex { .. } => "hex",
        };
        write!(f, "SecretMaterial({}, redacted)", spelling)
    }
}
