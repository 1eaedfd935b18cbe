//! Key material extracted from documents and secrets, plus the selectors
//! pairing a sender's private keys with a recipient's public ones.

pub mod recipient;
pub mod sender;

use std::fmt;

use zeroize::Zeroize;

use crate::{
    dids::{VerificationMaterial, VerificationMethod, VerificationMethodType},
    secrets::{Secret, SecretMaterial, SecretType},
    Error, Jwk, Result,
};

// multicodec varint tags carried by multibase material
const CODEC_ED25519_PUB: u16 = 0xed01;
const CODEC_X25519_PUB: u16 = 0xec01;
const CODEC_ED25519_PRIV: u16 = 0x8026;
const CODEC_X25519_PRIV: u16 = 0x8226;

/// Curves the envelope layer understands. `Display` is the JWA `crv` name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    X25519,
    Ed25519,
    P256,
    P384,
    P521,
    Secp256k1,
}

impl Curve {
    pub fn as_str(&self) -> &'static str {
        match self {
            Curve::X25519 => "X25519",
            Curve::Ed25519 => "Ed25519",
            Curve::P256 => "P-256",
            Curve::P384 => "P-384",
            Curve::P521 => "P-521",
            Curve::Secp256k1 => "secp256k1",
        }
    }

    fn from_crv(name: &str) -> Result<Self> {
        match name {
            "X25519" => Ok(Curve::X25519),
            "Ed25519" => Ok(Curve::Ed25519),
            "P-256" => Ok(Curve::P256),
            "P-384" => Ok(Curve::P384),
            "P-521" => Ok(Curve::P521),
            "secp256k1" => Ok(Curve::Secp256k1),
            other => Err(Error::UnsupportedCurve(other.to_string())),
        }
    }

    fn scalar_length(&self) -> usize {
        match self {
            Curve::X25519 | Curve::Ed25519 | Curve::P256 | Curve::Secp256k1 => 32,
            Curve::P384 => 48,
            Curve::P521 => 66,
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public key of a peer, extracted from one verification method.
///
/// OKP material is the raw 32 bytes, EC material stays SEC1 encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct PublicKey {
    pub kid: String,
    pub curve: Curve,
    material: Vec<u8>,
}

impl PublicKey {
    pub fn from_verification_method(method: &VerificationMethod) -> Result<Self> {
        let (curve, material) = match (&method.type_, &method.material) {
            (
                VerificationMethodType::JsonWebKey2020,
                VerificationMaterial::Jwk { public_key_jwk },
            ) => public_jwk_bytes(public_key_jwk)?,
            (
                VerificationMethodType::X25519KeyAgreementKey2019,
                VerificationMaterial::Base58 { public_key_base58 },
            ) => (
                Curve::X25519,
                decode_base58(public_key_base58, 32).map_err(|e| vm_material(&method.id, e))?,
            ),
            (
                VerificationMethodType::X25519KeyAgreementKey2019,
                VerificationMaterial::Hex { public_key_hex },
            ) => (
                Curve::X25519,
                decode_hex(public_key_hex, 32).map_err(|e| vm_material(&method.id, e))?,
            ),
            (
                VerificationMethodType::Ed25519VerificationKey2018,
                VerificationMaterial::Base58 { public_key_base58 },
            ) => (
                Curve::Ed25519,
                decode_base58(public_key_base58, 32).map_err(|e| vm_material(&method.id, e))?,
            ),
            (
                VerificationMethodType::Ed25519VerificationKey2018,
                VerificationMaterial::Hex { public_key_hex },
            ) => (
                Curve::Ed25519,
                decode_hex(public_key_hex, 32).map_err(|e| vm_material(&method.id, e))?,
            ),
            (
                VerificationMethodType::X25519KeyAgreementKey2020,
                VerificationMaterial::Multibase {
                    public_key_multibase,
                },
            ) => (
                Curve::X25519,
                decode_multibase(public_key_multibase, CODEC_X25519_PUB, 32)
                    .map_err(|e| vm_material(&method.id, e))?,
            ),
            (
                VerificationMethodType::Ed25519VerificationKey2020,
                VerificationMaterial::Multibase {
                    public_key_multibase,
                },
            ) => (
                Curve::Ed25519,
                decode_multibase(public_key_multibase, CODEC_ED25519_PUB, 32)
                    .map_err(|e| vm_material(&method.id, e))?,
            ),
            (
                VerificationMethodType::EcdsaSecp256k1VerificationKey2019,
                VerificationMaterial::Hex { public_key_hex },
            ) => (
                Curve::Secp256k1,
                decode_sec1_hex(public_key_hex).map_err(|e| vm_material(&method.id, e))?,
            ),
            (
                VerificationMethodType::EcdsaSecp256k1VerificationKey2019,
                VerificationMaterial::Jwk { public_key_jwk },
            ) => {
                let (curve, material) = public_jwk_bytes(public_key_jwk)?;
                if curve != Curve::Secp256k1 {
                    return Err(Error::UnsupportedJwk(format!(
                        "secp256k1 method '{}' carries a {} JWK",
                        method.id, curve
                    )));
                }
                (curve, material)
            }
            (VerificationMethodType::Other(name), _) => {
                return Err(Error::UnsupportedVerificationMethodType(name.clone()))
            }
            (type_, _) => {
                return Err(vm_material(
                    &method.id,
                    format!("material spelling not supported for {}", type_),
                ))
            }
        };
        Ok(PublicKey {
            kid: method.id.clone(),
            curve,
            material,
        })
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.material
    }
}

/// Private key of the local party, extracted from one secret.
///
/// Material is wiped on drop, never serialized and never shown by `Debug`.
/// Ed25519 material is normalized to the 64 byte seed-then-public form.
#[derive(Clone)]
pub struct PrivateKey {
    pub kid: String,
    pub curve: Curve,
    material: Vec<u8>,
}

impl PrivateKey {
    pub fn from_secret(secret: &Secret) -> Result<Self> {
        let (curve, material) = match (&secret.type_, &secret.material) {
            (SecretType::JsonWebKey2020, SecretMaterial::Jwk { private_key_jwk }) => {
                private_jwk_bytes(private_key_jwk)?
            }
            (
                SecretType::X25519KeyAgreementKey2019,
                SecretMaterial::Base58 { private_key_base58 },
            ) => (
                Curve::X25519,
                decode_base58(private_key_base58, 32).map_err(|e| secret_material(&secret.kid, e))?,
            ),
            (SecretType::X25519KeyAgreementKey2019, SecretMaterial::Hex { private_key_hex }) => (
                Curve::X25519,
                decode_hex(private_key_hex, 32).map_err(|e| secret_material(&secret.kid, e))?,
            ),
            (
                SecretType::Ed25519VerificationKey2018,
                SecretMaterial::Base58 { private_key_base58 },
            ) => {
                let decoded = bs58::decode(private_key_base58)
                    .into_vec()
                    .map_err(|e| secret_material(&secret.kid, e))?;
                (
                    Curve::Ed25519,
                    normalize_ed25519_private(decoded).map_err(|e| secret_material(&secret.kid, e))?,
                )
            }
            (SecretType::Ed25519VerificationKey2018, SecretMaterial::Hex { private_key_hex }) => {
                let decoded =
                    hex::decode(private_key_hex).map_err(|e| secret_material(&secret.kid, e))?;
                (
                    Curve::Ed25519,
                    normalize_ed25519_private(decoded).map_err(|e| secret_material(&secret.kid, e))?,
                )
            }
            (
                SecretType::X25519KeyAgreementKey2020,
                SecretMaterial::Multibase {
                    private_key_multibase,
                },
            ) => (
                Curve::X25519,
                decode_multibase(private_key_multibase, CODEC_X25519_PRIV, 32)
                    .map_err(|e| secret_material(&secret.kid, e))?,
            ),
            (
                SecretType::Ed25519VerificationKey2020,
                SecretMaterial::Multibase {
                    private_key_multibase,
                },
            ) => {
                let decoded = decode_multibase_any(private_key_multibase, CODEC_ED25519_PRIV)
                    .map_err(|e| secret_material(&secret.kid, e))?;
                (
                    Curve::Ed25519,
                    normalize_ed25519_private(decoded).map_err(|e| secret_material(&secret.kid, e))?,
                )
            }
            (
                SecretType::EcdsaSecp256k1VerificationKey2019,
                SecretMaterial::Hex { private_key_hex },
            ) => (
                Curve::Secp256k1,
                decode_hex(private_key_hex, 32).map_err(|e| secret_material(&secret.kid, e))?,
            ),
            (
                SecretType::EcdsaSecp256k1VerificationKey2019,
                SecretMaterial::Base58 { private_key_base58 },
            ) => (
                Curve::Secp256k1,
                decode_base58(private_key_base58, 32).map_err(|e| secret_material(&secret.kid, e))?,
            ),
            (SecretType::Other(name), _) => {
                return Err(Error::UnsupportedSecretType(name.clone()))
            }
            (type_, _) => {
                return Err(secret_material(
                    &secret.kid,
                    format!("material spelling not supported for {}", type_),
                ))
            }
        };
        Ok(PrivateKey {
            kid: secret.kid.clone(),
            curve,
            material,
        })
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.material
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PrivateKey {{ kid: {:?}, curve: {}, material: redacted }}",
            self.kid, self.curve
        )
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.material.zeroize();
    }
}

fn vm_material(id: &str, detail: impl fmt::Display) -> Error {
    Error::UnsupportedVerificationMethodMaterialFormat(format!("{}: {}", id, detail))
}

fn secret_material(kid: &str, detail: impl fmt::Display) -> Error {
    Error::UnsupportedSecretMaterialFormat(format!("{}: {}", kid, detail))
}

fn public_jwk_bytes(jwk: &Jwk) -> Result<(Curve, Vec<u8>)> {
    match jwk.kty.as_str() {
        "OKP" => {
            let curve = jwk_curve(jwk)?;
            let x = coordinate(jwk.x.as_deref(), "x")?;
            Ok((curve, sized(x, 32).map_err(Error::UnsupportedJwk)?))
        }
        "EC" => {
            let curve = jwk_curve(jwk)?;
            let x = coordinate(jwk.x.as_deref(), "x")?;
            let y = coordinate(jwk.y.as_deref(), "y")?;
            let mut material = Vec::with_capacity(1 + x.len() + y.len());
            material.push(0x04);
            material.extend_from_slice(&x);
            material.extend_from_slice(&y);
            Ok((curve, material))
        }
        other => Err(Error::UnsupportedJwk(format!("kty '{}'", other))),
    }
}

fn private_jwk_bytes(jwk: &Jwk) -> Result<(Curve, Vec<u8>)> {
    if !matches!(jwk.kty.as_str(), "OKP" | "EC") {
        return Err(Error::UnsupportedJwk(format!("kty '{}'", jwk.kty)));
    }
    let curve = jwk_curve(jwk)?;
    let d = coordinate(jwk.d.as_deref(), "d")?;
    let d = sized(d, curve.scalar_length()).map_err(Error::UnsupportedJwk)?;
    match curve {
        Curve::Ed25519 => Ok((
            curve,
            normalize_ed25519_private(d).map_err(Error::UnsupportedJwk)?,
        )),
        _ => Ok((curve, d)),
    }
}

/// Pulls the curve out of a JWK, cross-checking it against the key type.
fn jwk_curve(jwk: &Jwk) -> Result<Curve> {
    let crv = jwk
        .crv
        .as_deref()
        .ok_or_else(|| Error::UnsupportedJwk(format!("{} key without crv", jwk.kty)))?;
    let curve = Curve::from_crv(crv)?;
    let matches_kty = match jwk.kty.as_str() {
        "OKP" => matches!(curve, Curve::X25519 | Curve::Ed25519),
        "EC" => !matches!(curve, Curve::X25519 | Curve::Ed25519),
        _ => true,
    };
    if matches_kty {
        Ok(curve)
    } else {
        Err(Error::UnsupportedJwk(format!(
            "{} key with curve {}",
            jwk.kty, curve
        )))
    }
}

fn coordinate(value: Option<&str>, name: &str) -> Result<Vec<u8>> {
    let text =
        value.ok_or_else(|| Error::UnsupportedJwk(format!("missing '{}' member", name)))?;
    base64_url::decode(text)
        .map_err(|e| Error::UnsupportedJwk(format!("undecodable '{}' member: {}", name, e)))
}

fn sized(bytes: Vec<u8>, expected: usize) -> std::result::Result<Vec<u8>, String> {
    if bytes.len() == expected {
        Ok(bytes)
    } else {
        Err(format!("expected {} bytes, got {}", expected, bytes.len()))
    }
}

fn decode_base58(text: &str, expected: usize) -> std::result::Result<Vec<u8>, String> {
    let bytes = bs58::decode(text).into_vec().map_err(|e| e.to_string())?;
    sized(bytes, expected)
}

fn decode_hex(text: &str, expected: usize) -> std::result::Result<Vec<u8>, String> {
    let bytes = hex::decode(text).map_err(|e| e.to_string())?;
    sized(bytes, expected)
}

/// SEC1 point in hex, compressed or uncompressed.
fn decode_sec1_hex(text: &str) -> std::result::Result<Vec<u8>, String> {
    let bytes = hex::decode(text).map_err(|e| e.to_string())?;
    match bytes.len() {
        33 | 65 => Ok(bytes),
        other => Err(format!("expected a SEC1 point, got {} bytes", other)),
    }
}

fn decode_multibase(
    text: &str,
    codec: u16,
    expected: usize,
) -> std::result::Result<Vec<u8>, String> {
    sized(decode_multibase_any(text, codec)?, expected)
}

fn decode_multibase_any(text: &str, codec: u16) -> std::result::Result<Vec<u8>, String> {
    let tail = text
        .strip_prefix('z')
        .ok_or_else(|| "multibase material must be base58btc ('z')".to_string())?;
    let bytes = bs58::decode(tail).into_vec().map_err(|e| e.to_string())?;
    if bytes.len() < 2 {
        return Err("multicodec tag missing".to_string());
    }
    let tag = u16::from_be_bytes([bytes[0], bytes[1]]);
    if tag != codec {
        return Err(format!("unexpected multicodec tag {:#06x}", tag));
    }
    Ok(bytes[2..].to_vec())
}

/// Accepts a 32 byte seed or the 64 byte seed-then-public form; always
/// returns the latter, deriving the public half when only the seed is given.
fn normalize_ed25519_private(decoded: Vec<u8>) -> std::result::Result<Vec<u8>, String> {
    match decoded.len() {
        64 => Ok(decoded),
        32 => {
            let secret = ed25519_dalek::SecretKey::from_bytes(&decoded)
                .map_err(|e| e.to_string())?;
            let public = ed25519_dalek::PublicKey::from(&secret);
            let mut material = decoded;
            material.extend_from_slice(public.as_bytes());
            Ok(material)
        }
        other => Err(format!("expected 32 or 64 bytes, got {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dids::VerificationMaterial;

    fn jwk_method(id: &str, jwk: serde_json::Value) -> VerificationMethod {
        VerificationMethod {
            id: id.to_string(),
            type_: VerificationMethodType::JsonWebKey2020,
            controller: "did:example:alice".to_string(),
            material: VerificationMaterial::Jwk {
                public_key_jwk: serde_json::from_value(jwk).unwrap(),
            },
        }
    }

    #[test]
    fn extracts_okp_public_from_jwk() {
        // Arrange
        let method = jwk_method(
            "did:example:alice#key-ed25519-1",
            serde_json::json!({
                "kty": "OKP",
                "crv": "Ed25519",
                "x": "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo"
            }),
        );
        // Act
        let key = PublicKey::from_verification_method(&method).unwrap();
        // Assert
        assert_eq!(key.curve, Curve::Ed25519);
        assert_eq!(key.as_bytes().len(), 32);
        assert_eq!(key.kid, "did:example:alice#key-ed25519-1");
    }

    #[test]
    fn extracts_ec_public_as_uncompressed_sec1() {
        // Arrange
        let method = jwk_method(
            "did:example:alice#key-p256-1",
            serde_json::json!({
                "kty": "EC",
                "crv": "P-256",
                "x": "f83OJ3D2xF1Bg8vub9tLe1gHMzV76e8Tus9uPHvRVEU",
                "y": "x_FEzRu9m36HLN_tue659LNpXW6pCyStikYjKIWI5a0"
            }),
        );
        // Act
        let key = PublicKey::from_verification_method(&method).unwrap();
        // Assert
        assert_eq!(key.curve, Curve::P256);
        assert_eq!(key.as_bytes().len(), 65);
        assert_eq!(key.as_bytes()[0], 0x04);
    }

    #[test]
    fn rejects_rsa_and_unknown_curves() {
        // Arrange
        let rsa = jwk_method(
            "did:example:alice#key-rsa-1",
            serde_json::json!({"kty": "RSA", "crv": "RSA", "x": "AQAB"}),
        );
        let unknown = jwk_method(
            "did:example:alice#key-odd-1",
            serde_json::json!({"kty": "OKP", "crv": "Curve448", "x": "AQAB"}),
        );
        // Act / Assert
        assert!(matches!(
            PublicKey::from_verification_method(&rsa),
            Err(Error::UnsupportedJwk(_))
        ));
        assert!(matches!(
            PublicKey::from_verification_method(&unknown),
            Err(Error::UnsupportedCurve(_))
        ));
    }

    #[test]
    fn rejects_kty_curve_mismatch() {
        // Arrange
        let method = jwk_method(
            "did:example:alice#key-odd-2",
            serde_json::json!({
                "kty": "EC",
                "crv": "Ed25519",
                "x": "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo"
            }),
        );
        // Act / Assert
        assert!(matches!(
            PublicKey::from_verification_method(&method),
            Err(Error::UnsupportedJwk(_))
        ));
    }

    #[test]
    fn rejects_unknown_method_type_and_wrong_spelling() {
        // Arrange
        let future = VerificationMethod {
            id: "did:example:alice#key-f-1".to_string(),
            type_: VerificationMethodType::Other("SomeFutureKey2077".to_string()),
            controller: "did:example:alice".to_string(),
            material: VerificationMaterial::Hex {
                public_key_hex: "00".to_string(),
            },
        };
        let mismatched = VerificationMethod {
            id: "did:example:alice#key-x25519-1".to_string(),
            type_: VerificationMethodType::X25519KeyAgreementKey2019,
            material: VerificationMaterial::Multibase {
                public_key_multibase: "z6LSbysY2xFMRpGMhb7tFTLMpeuPRaqaWM1yECx2AtzE3KCc".to_string(),
            },
            controller: "did:example:alice".to_string(),
        };
        // Act / Assert
        assert!(matches!(
            PublicKey::from_verification_method(&future),
            Err(Error::UnsupportedVerificationMethodType(_))
        ));
        assert!(matches!(
            PublicKey::from_verification_method(&mismatched),
            Err(Error::UnsupportedVerificationMethodMaterialFormat(_))
        ));
    }

    #[test]
    fn multibase_material_checks_the_multicodec_tag() {
        // Arrange: an x25519-pub tag under an Ed25519 2020 type
        let mut tagged = vec![0xec, 0x01];
        tagged.extend_from_slice(&[7u8; 32]);
        let method = VerificationMethod {
            id: "did:example:bob#key-ed25519-1".to_string(),
            type_: VerificationMethodType::Ed25519VerificationKey2020,
            controller: "did:example:bob".to_string(),
            material: VerificationMaterial::Multibase {
                public_key_multibase: format!("z{}", bs58::encode(&tagged).into_string()),
            },
        };
        // Act / Assert
        assert!(matches!(
            PublicKey::from_verification_method(&method),
            Err(Error::UnsupportedVerificationMethodMaterialFormat(_))
        ));
    }

    #[test]
    fn parses_compressed_secp256k1_hex() {
        // Arrange
        let method = VerificationMethod {
            id: "did:example:alice#key-secp256k1-1".to_string(),
            type_: VerificationMethodType::EcdsaSecp256k1VerificationKey2019,
            controller: "did:example:alice".to_string(),
            material: VerificationMaterial::Hex {
                public_key_hex:
                    "0361f286ada2a6b2c74bc6ed44a71ef59fb9dd15eca9283cbe5608aeb516730f33"
                        .to_string(),
            },
        };
        // Act
        let key = PublicKey::from_verification_method(&method).unwrap();
        // Assert
        assert_eq!(key.curve, Curve::Secp256k1);
        assert_eq!(key.as_bytes().len(), 33);
    }

    #[test]
    fn ed25519_seed_secrets_expand_to_keypair_form() {
        // Arrange: RFC 8032 test vector 1
        let secret = Secret {
            kid: "did:example:charlie#key-ed25519-1".to_string(),
            type_: SecretType::Ed25519VerificationKey2018,
            material: SecretMaterial::Hex {
                private_key_hex:
                    "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60"
                        .to_string(),
            },
        };
        // Act
        let key = PrivateKey::from_secret(&secret).unwrap();
        // Assert
        assert_eq!(key.curve, Curve::Ed25519);
        assert_eq!(key.as_bytes().len(), 64);
        assert_eq!(
            hex::encode(&key.as_bytes()[32..]),
            "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a"
        );
    }

    #[test]
    fn private_key_debug_never_prints_material() {
        // Arrange
        let secret = Secret {
            kid: "did:example:alice#key-x25519-1".to_string(),
            type_: SecretType::X25519KeyAgreementKey2019,
            material: SecretMaterial::Base58 {
                private_key_base58: "6QN8DfuN9hjgHgPvLXqgzqYE3jRRGRrmJQZkd5tL8paR".to_string(),
            },
        };
        let key = PrivateKey::from_secret(&secret).unwrap();
        // Act
        let printed = format!("{:?}", key);
        // Assert
        assert!(printed.contains("redacted"));
        assert!(printed.contains("did:example:alice#key-x25519-1"));
        assert!(!printed.contains("material: ["));
    }

    #[test]
    fn unknown_secret_type_is_rejected() {
        // Arrange
        let secret = Secret {
            kid: "did:example:alice#key-f-1".to_string(),
            type_: SecretType::Other("SomeFutureKey2077".to_string()),
            material: SecretMaterial::Hex {
                private_key_hex: "00".to_string(),
            },
        };
        // Act / Assert
        assert!(matches!(
            PrivateKey::from_secret(&secret),
            Err(Error::UnsupportedSecretType(_))
        ));
    }
}
