use base64_url::{decode, encode};

use crate::{messages::types::MessageType, Error, Result};

/// JWS envelope in General JSON serialization with detached signatures
/// over the base64url encoded plain message.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Jws {
    /// Base64url encoded plain message.
    pub payload: String,

    pub signatures: Vec<Signature>,
}

impl Jws {
    pub fn new(payload: &[u8], signatures: Vec<Signature>) -> Self {
        Jws {
            payload: encode(payload),
            signatures,
        }
    }

    /// Decoded payload bytes.
    pub fn read_payload(&self) -> Result<Vec<u8>> {
        decode(&self.payload).map_err(|e| Error::MalformedMessage(format!("payload: {}", e)))
    }
}

/// One signature over the payload, with its own protected header kept in
/// exact wire form so verification re-reads the signed bytes unchanged.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Signature {
    pub protected: String,

    pub signature: String,
}

impl Signature {
    pub fn read_protected(&self) -> Result<SignedHeader> {
        let raw = decode(&self.protected)
            .map_err(|e| Error::MalformedMessage(format!("protected header: {}", e)))?;
        serde_json::from_slice(&raw)
            .map_err(|e| Error::MalformedMessage(format!("protected header: {}", e)))
    }

    pub fn read_signature(&self) -> Result<Vec<u8>> {
        decode(&self.signature).map_err(|e| Error::MalformedMessage(format!("signature: {}", e)))
    }
}

/// Content of a signature's protected header.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SignedHeader {
    pub typ: MessageType,

    pub alg: String,

    pub kid: String,
}

impl SignedHeader {
    pub fn to_b64(&self) -> Result<String> {
        let raw = serde_json::to_vec(self)
            .map_err(|e| Error::IllegalArgument(format!("cannot serialize protected header: {}", e)))?;
        Ok(encode(&raw))
    }
}

/// Exact byte string a JWS signature covers, built from the two encoded
/// segments.
pub(crate) fn signing_input(protected_b64: &str, payload_b64: &str) -> String {
    format!("{}.{}", protected_b64, payload_b64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_header_round_trip() -> Result<()> {
        // Arrange
        let header = SignedHeader {
            typ: MessageType::DidCommJws,
            alg: "EdDSA".to_string(),
            kid: "did:example:alice#key-1".to_string(),
        };
        // Act
        let signature = Signature {
            protected: header.to_b64()?,
            signature: encode(&[7u8; 64]),
        };
        let parsed = signature.read_protected()?;
        // Assert
        assert_eq!(parsed.typ, MessageType::DidCommJws);
        assert_eq!(parsed.alg, "EdDSA");
        assert_eq!(parsed.kid, "did:example:alice#key-1");
        Ok(())
    }

    #[test]
    fn garbage_protected_header_is_malformed() {
        // Arrange
        let signature = Signature {
            protected: encode(b"{\"typ\":42}"),
            signature: encode(&[7u8; 64]),
        };
        // Act
        let result = signature.read_protected();
        // Assert
        assert!(matches!(result, Err(Error::MalformedMessage(_))));
    }

    #[test]
    fn signing_input_joins_encoded_segments() {
        // Act
        let input = signing_input("eyJhbGciOiJFZERTQSJ9", "cGF5bG9hZA");
        // Assert
        assert_eq!(input, "eyJhbGciOiJFZERTQSJ9.cGF5bG9hZA");
    }
}
