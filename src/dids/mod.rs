//! DID document model: the subset of the W3C data model the envelope layer
//! reads during key selection.

pub mod resolver;
pub mod url;

pub use resolver::{DidResolver, ExampleDidResolver};

use std::fmt;

use crate::{Error, Jwk, Result};

/// A resolved DID document, reduced to what key selection needs:
/// verification methods plus the `authentication` and `keyAgreement`
/// relationship lists referencing them by DID URL.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    #[serde(rename = "id")]
    pub did: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verification_method: Vec<VerificationMethod>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authentication: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_agreement: Vec<String>,
}

impl DidDocument {
    pub fn new(did: impl Into<String>) -> Self {
        DidDocument {
            did: did.into(),
            ..Default::default()
        }
    }

    /// Dereferences a DID URL into this document's verification method.
    ///
    /// Relationship list entries are expected to dereference within the same
    /// document; a dangling reference is a `DidUrlNotFound`.
    pub fn dereference(&self, did_url: &str) -> Result<&VerificationMethod> {
        self.verification_method
            .iter()
            .find(|method| method.id == did_url)
            .ok_or_else(|| {
                Error::DidUrlNotFound(format!(
                    "no verification method '{}' in document of '{}'",
                    did_url, self.did
                ))
            })
    }
}

/// Single verification method of a DID document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    pub id: String,

    #[serde(rename = "type")]
    pub type_: VerificationMethodType,

    pub controller: String,

    #[serde(flatten)]
    pub material: VerificationMaterial,
}

/// Known verification method types. Anything else round-trips through
/// `Other` and is rejected at key construction, not at document parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationMethodType {
    JsonWebKey2020,
    X25519KeyAgreementKey2019,
    X25519KeyAgreementKey2020,
    Ed25519VerificationKey2018,
    Ed25519VerificationKey2020,
    EcdsaSecp256k1VerificationKey2019,
    Other(String),
}

impl VerificationMethodType {
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

impl fmt::Display for VerificationMethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for VerificationMethodType {
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

impl serde::Serialize for VerificationMethodType {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for VerificationMethodType {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from(name.as_str()))
    }
}

/// Public key material, in any of the spellings found in the wild.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum VerificationMaterial {
    Jwk {
        #[serde(rename = "publicKeyJwk")]
        public_key_jwk: Jwk,
    },
    Multibase {
        #[serde(rename = "publicKeyMultibase")]
        public_key_multibase: String,
    },
    Base58 {
        #[serde(rename = "publicKeyBase58")]
        public_key_base58: String,
    },
    Hex {
        #[serde(rename = "publicKeyHex")]
        public_key_hex: String,
    },
}
