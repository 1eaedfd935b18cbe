use base64_url::{decode, encode};

use crate::{messages::types::MessageType, Error, Jwk, Result};

/// JWE envelope in General JSON serialization with per recipient wrapped
/// content encryption keys.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Jwe {
    /// Base64url encoded protected header, kept in its exact wire form so
    /// the AEAD additional data stays byte for byte what went into the tag.
    pub protected: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipients: Vec<Recipient>,

    pub iv: String,

    pub ciphertext: String,

    pub tag: String,
}

impl Jwe {
    /// Constructor, which should be used after message is encrypted.
    pub fn new(
        protected: String,
        recipients: Vec<Recipient>,
        ciphertext: &[u8],
        iv: &[u8],
        tag: &[u8],
    ) -> Self {
        Jwe {
            protected,
            recipients,
            ciphertext: encode(ciphertext),
            iv: encode(iv),
            tag: encode(tag),
        }
    }

    /// Decodes the protected header for inspection.
    pub fn read_protected(&self) -> Result<JweHeader> {
        let raw = decode(&self.protected)
            .map_err(|e| Error::MalformedMessage(format!("protected header: {}", e)))?;
        serde_json::from_slice(&raw)
            .map_err(|e| Error::MalformedMessage(format!("protected header: {}", e)))
    }

    /// Getter for ciphered payload of JWE.
    pub fn payload(&self) -> Result<Vec<u8>> {
        decode(&self.ciphertext).map_err(|e| Error::MalformedMessage(format!("ciphertext: {}", e)))
    }

    /// `iv` getter.
    pub fn get_iv(&self) -> Result<Vec<u8>> {
        decode(&self.iv).map_err(|e| Error::MalformedMessage(format!("iv: {}", e)))
    }

    /// `tag` getter.
    pub fn get_tag(&self) -> Result<Vec<u8>> {
        decode(&self.tag).map_err(|e| Error::MalformedMessage(format!("tag: {}", e)))
    }

    /// Recipient key ids in envelope order.
    pub fn recipient_kids(&self) -> Vec<String> {
        self.recipients
            .iter()
            .map(|recipient| recipient.header.kid.clone())
            .collect()
    }
}

/// Content of the JWE protected header. Rendered to base64url exactly once
/// per envelope; afterwards only the encoded string circulates.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct JweHeader {
    pub typ: MessageType,

    pub enc: String,

    pub alg: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub skid: Option<String>,

    pub epk: Jwk,
}

impl JweHeader {
    pub fn to_b64(&self) -> Result<String> {
        let raw = serde_json::to_vec(self)
            .map_err(|e| Error::IllegalArgument(format!("cannot serialize protected header: {}", e)))?;
        Ok(encode(&raw))
    }
}

/// Per recipient part of the envelope: the content encryption key wrapped
/// for one key agreement method.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Recipient {
    pub header: RecipientHeader,

    pub encrypted_key: String,
}

/// Unprotected per recipient header with the wrap nonce and tag.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RecipientHeader {
    pub kid: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub iv: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}
