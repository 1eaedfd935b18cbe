use base64_url::{decode, encode};

use crate::{
    crypto::{SignatureAlgorithm, Signer},
    Error, PrivateKey, PublicKey, Result,
};

/// Claims of the `from_prior` rotation JWT: `iss` is the prior DID, `sub`
/// the new one, and the token is signed by a key the prior DID authorizes.
///
/// Parsing is strict; a token carrying claims outside this registered set
/// does not verify.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PriorClaims {
    pub iss: String,

    pub sub: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// JOSE header of the rotation JWT. Read leniently; issuers may add their
/// own header parameters.
#[derive(Serialize, Deserialize, Clone, Debug)]
struct JwtHeader {
    typ: String,

    alg: String,

    kid: String,
}

impl PriorClaims {
    /// Claims for a rotation from the prior DID `iss` to the new DID `sub`.
    pub fn new(iss: &str, sub: &str) -> Self {
        PriorClaims {
            iss: iss.to_string(),
            sub: sub.to_string(),
            aud: None,
            exp: None,
            nbf: None,
            iat: None,
            jti: None,
        }
    }

    pub fn aud(mut self, aud: &str) -> Self {
        self.aud = Some(aud.to_string());
        self
    }

    pub fn exp(mut self, exp: u64) -> Self {
        self.exp = Some(exp);
        self
    }

    pub fn nbf(mut self, nbf: u64) -> Self {
        self.nbf = Some(nbf);
        self
    }

    pub fn iat(mut self, iat: u64) -> Self {
        self.iat = Some(iat);
        self
    }

    pub fn jti(mut self, jti: &str) -> Self {
        self.jti = Some(jti.to_string());
        self
    }

    /// Stamps `iat` with the current UTC time.
    pub fn issued_now(mut self) -> Self {
        self.iat = Some(chrono::Utc::now().timestamp() as u64);
        self
    }

    /// Renders the claims as a compact JWT signed with `key`. The JWS
    /// algorithm follows the key's curve.
    pub(crate) fn sign(&self, key: &PrivateKey) -> Result<String> {
        let alg = SignatureAlgorithm::for_curve(key.curve)?;
        let header = JwtHeader {
            typ: "JWT".to_string(),
            alg: alg.as_str().to_string(),
            kid: key.kid.clone(),
        };
        let header_b64 = encode(
            &serde_json::to_vec(&header)
                .map_err(|e| Error::IllegalArgument(format!("cannot serialize JWT header: {}", e)))?,
        );
        let claims_b64 = encode(
            &serde_json::to_vec(self)
                .map_err(|e| Error::IllegalArgument(format!("cannot serialize claims: {}", e)))?,
        );
        let input = format!("{}.{}", header_b64, claims_b64);
        let signature = (alg.signer())(key.as_bytes(), input.as_bytes())?;
        Ok(format!("{}.{}", input, encode(&signature)))
    }

    /// Checks a compact JWT against the issuer key and returns its claims.
    /// The header `alg` must be the one the key's curve implies.
    pub(crate) fn verify(jwt: &str, key: &PublicKey) -> Result<Self> {
        let (header, claims_raw, input, signature) = read_token(jwt)?;
        let expected = SignatureAlgorithm::for_curve(key.curve)?;
        if header.alg != expected.as_str() {
            return Err(Error::MalformedMessage(format!(
                "from_prior alg '{}' does not fit issuer key '{}'",
                header.alg, key.kid
            )));
        }
        let valid = (expected.validator())(key.as_bytes(), input.as_bytes(), &signature)?;
        if !valid {
            return Err(Error::MalformedMessage(
                "from_prior signature does not verify".to_string(),
            ));
        }
        serde_json::from_slice(&claims_raw)
            .map_err(|e| Error::MalformedMessage(format!("from_prior claims: {}", e)))
    }

    /// Key id of the token's issuer, read before any verification.
    pub(crate) fn token_kid(jwt: &str) -> Result<String> {
        let (header, _, _, _) = read_token(jwt)?;
        Ok(header.kid)
    }
}

fn read_token(jwt: &str) -> Result<(JwtHeader, Vec<u8>, String, Vec<u8>)> {
    let mut parts = jwt.split('.');
    let (header_b64, claims_b64, signature_b64) =
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(header), Some(claims), Some(signature), None) => (header, claims, signature),
            _ => {
                return Err(Error::MalformedMessage(
                    "from_prior is not a three segment JWT".to_string(),
                ))
            }
        };
    let header_raw = decode(header_b64)
        .map_err(|e| Error::MalformedMessage(format!("from_prior header: {}", e)))?;
    let header: JwtHeader = serde_json::from_slice(&header_raw)
        .map_err(|e| Error::MalformedMessage(format!("from_prior header: {}", e)))?;
    let claims_raw = decode(claims_b64)
        .map_err(|e| Error::MalformedMessage(format!("from_prior claims: {}", e)))?;
    let signature = decode(signature_b64)
        .map_err(|e| Error::MalformedMessage(format!("from_prior signature: {}", e)))?;
    let input = format!("{}.{}", header_b64, claims_b64);
    Ok((header, claims_raw, input, signature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dids::{VerificationMaterial, VerificationMethod, VerificationMethodType},
        Secret, SecretMaterial, SecretType,
    };

    // RFC 8032 test 1 keypair
    const SEED: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
    const PUBLIC: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";
    const KID: &str = "did:example:charlie#key-1";

    fn signing_key() -> Result<PrivateKey> {
        PrivateKey::from_secret(&Secret {
            kid: KID.to_string(),
            type_: SecretType::Ed25519VerificationKey2018,
            material: SecretMaterial::Hex {
                private_key_hex: SEED.to_string(),
            },
        })
    }

    fn issuer_key() -> Result<PublicKey> {
        PublicKey::from_verification_method(&VerificationMethod {
            id: KID.to_string(),
            type_: VerificationMethodType::Ed25519VerificationKey2018,
            controller: "did:example:charlie".to_string(),
            material: VerificationMaterial::Hex {
                public_key_hex: PUBLIC.to_string(),
            },
        })
    }

    fn p256_key() -> Result<PublicKey> {
        PublicKey::from_verification_method(&VerificationMethod {
            id: "did:example:charlie#key-2".to_string(),
            type_: VerificationMethodType::JsonWebKey2020,
            controller: "did:example:charlie".to_string(),
            material: VerificationMaterial::Jwk {
                public_key_jwk: serde_json::from_value(serde_json::json!({
                    "kty": "EC",
                    "crv": "P-256",
                    "x": "f83OJ3D2xF1Bg8vub9tLe1gHMzV76e8Tus9uPHvRVEU",
                    "y": "x_FEzRu9m36HLN_tue659LNpXW6pCyStikYjKIWI5a0"
                }))
                .unwrap(),
            },
        })
    }

    #[test]
    fn sign_and_verify_round_trip() -> Result<()> {
        // Arrange
        let claims = PriorClaims::new("did:example:charlie", "did:example:alice").iat(1_516_239_022);
        // Act
        let jwt = claims.sign(&signing_key()?)?;
        let verified = PriorClaims::verify(&jwt, &issuer_key()?)?;
        // Assert
        assert_eq!(verified, claims);
        assert_eq!(PriorClaims::token_kid(&jwt)?, KID);
        Ok(())
    }

    #[test]
    fn tampered_token_does_not_verify() -> Result<()> {
        // Arrange: swap the signed claims for rewritten ones
        let claims = PriorClaims::new("did:example:charlie", "did:example:alice");
        let jwt = claims.sign(&signing_key()?)?;
        let rewritten = encode(br#"{"iss":"did:example:charlie","sub":"did:example:m4l0ry"}"#);
        let mut parts: Vec<&str> = jwt.split('.').collect();
        parts[1] = &rewritten;
        let forged = parts.join(".");
        // Act
        let result = PriorClaims::verify(&forged, &issuer_key()?);
        // Assert
        assert_ne!(forged, jwt);
        assert!(matches!(result, Err(Error::MalformedMessage(_))));
        Ok(())
    }

    #[test]
    fn header_alg_must_fit_the_issuer_key() -> Result<()> {
        // Arrange: an EdDSA token checked against a P-256 issuer key
        let jwt = PriorClaims::new("did:example:charlie", "did:example:alice")
            .sign(&signing_key()?)?;
        // Act
        let result = PriorClaims::verify(&jwt, &p256_key()?);
        // Assert
        assert!(matches!(result, Err(Error::MalformedMessage(_))));
        Ok(())
    }

    #[test]
    fn unregistered_claims_are_rejected() -> Result<()> {
        // Arrange: a well signed token whose claims carry an extra field
        let key = signing_key()?;
        let header_b64 = encode(br#"{"typ":"JWT","alg":"EdDSA","kid":"did:example:charlie#key-1"}"#);
        let claims_b64 =
            encode(br#"{"iss":"did:example:charlie","sub":"did:example:alice","role":"admin"}"#);
        let input = format!("{}.{}", header_b64, claims_b64);
        let signature = (SignatureAlgorithm::EdDsa.signer())(key.as_bytes(), input.as_bytes())?;
        let jwt = format!("{}.{}", input, encode(&signature));
        // Act
        let result = PriorClaims::verify(&jwt, &issuer_key()?);
        // Assert
        assert!(matches!(result, Err(Error::MalformedMessage(_))));
        Ok(())
    }

    #[test]
    fn truncated_token_is_malformed() {
        // Act
        let result = PriorClaims::token_kid("only.two");
        // Assert
        assert!(matches!(result, Err(Error::MalformedMessage(_))));
    }
}
