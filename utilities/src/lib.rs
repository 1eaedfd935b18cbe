//! Shared DID fixtures for didcomm-envelope tests.
//!
//! Three example parties with stable key material: alice (signing keys on
//! two curves, one held and one decoy agreement key), bob (agreement keys
//! only, one of them public-only P-256) and charlie (a prior DID used for
//! rotation). Public halves are derived from the private material at
//! runtime where a curve library can do it.

use arrayref::array_ref;
use didcomm_envelope::{
    DidDocument, ExampleDidResolver, ExampleSecretsResolver, Secret, SecretMaterial, SecretType,
    VerificationMaterial, VerificationMethod, VerificationMethodType,
};
use x25519_dalek::{PublicKey, StaticSecret};

pub const ALICE_DID: &str = "did:example:alice";
pub const ALICE_AUTH_ED25519: &str = "did:example:alice#key-ed25519-1";
pub const ALICE_AUTH_P256: &str = "did:example:alice#key-p256-1";
pub const ALICE_AGREEMENT_DECOY: &str = "did:example:alice#key-x25519-2";
pub const ALICE_AGREEMENT: &str = "did:example:alice#key-x25519-1";

pub const BOB_DID: &str = "did:example:bob";
pub const BOB_AGREEMENT_1: &str = "did:example:bob#key-x25519-1";
pub const BOB_AGREEMENT_2: &str = "did:example:bob#key-x25519-2";
pub const BOB_AGREEMENT_P256: &str = "did:example:bob#key-p256-1";

pub const CHARLIE_DID: &str = "did:example:charlie";
pub const CHARLIE_AUTH: &str = "did:example:charlie#key-ed25519-1";

const ALICE_X25519_PRIVATE_B58: &str = "6QN8DfuN9hjgHgPvLXqgzqYE3jRRGRrmJQZkd5tL8paR";
const ALICE_DECOY_SEED_HEX: &str = "77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a";
const BOB_X25519_1_PRIVATE_B58: &str = "HBTcN2MrXNRj9xF9oi8QqYyuEPv3JLLjQKuEgW9oxVKP";
const BOB_X25519_2_PRIVATE_HEX: &str =
    "5dab087e624a8a4b79e17f8b83800ee66f3bb1292618b6fd1c2f8b27ff88e0eb";

// RFC 8032 test 1 keypair
const CHARLIE_ED25519_SEED_HEX: &str =
    "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
const CHARLIE_ED25519_PUBLIC_HEX: &str =
    "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";

/// Resolver knowing every example party.
pub fn example_did_resolver() -> ExampleDidResolver {
    ExampleDidResolver::new(vec![alice_did_doc(), bob_did_doc(), charlie_did_doc()])
}

pub fn alice_secrets_resolver() -> ExampleSecretsResolver {
    ExampleSecretsResolver::new(alice_secrets())
}

pub fn bob_secrets_resolver() -> ExampleSecretsResolver {
    ExampleSecretsResolver::new(bob_secrets())
}

pub fn charlie_secrets_resolver() -> ExampleSecretsResolver {
    ExampleSecretsResolver::new(charlie_secrets())
}

pub fn alice_did_doc() -> DidDocument {
    DidDocument {
        did: ALICE_DID.to_string(),
        verification_method: vec![
            jwk_method(
                ALICE_AUTH_ED25519,
                ALICE_DID,
                serde_json::json!({
                    "kty": "OKP",
                    "crv": "Ed25519",
                    "x": "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo"
                }),
            ),
            jwk_method(
                ALICE_AUTH_P256,
                ALICE_DID,
                serde_json::json!({
                    "kty": "EC",
                    "crv": "P-256",
                    "x": "f83OJ3D2xF1Bg8vub9tLe1gHMzV76e8Tus9uPHvRVEU",
                    "y": "x_FEzRu9m36HLN_tue659LNpXW6pCyStikYjKIWI5a0"
                }),
            ),
            VerificationMethod {
                id: ALICE_AGREEMENT_DECOY.to_string(),
                type_: VerificationMethodType::X25519KeyAgreementKey2019,
                controller: ALICE_DID.to_string(),
                material: VerificationMaterial::Base58 {
                    public_key_base58: bs58_of(&x25519_public(
                        &hex::decode(ALICE_DECOY_SEED_HEX).unwrap(),
                    )),
                },
            },
            VerificationMethod {
                id: ALICE_AGREEMENT.to_string(),
                type_: VerificationMethodType::X25519KeyAgreementKey2019,
                controller: ALICE_DID.to_string(),
                material: VerificationMaterial::Base58 {
                    public_key_base58: bs58_of(&x25519_public(
                        &bs58::decode(ALICE_X25519_PRIVATE_B58).into_vec().unwrap(),
                    )),
                },
            },
        ],
        authentication: vec![ALICE_AUTH_ED25519.to_string(), ALICE_AUTH_P256.to_string()],
        // the decoy comes first so selection has to skip an unheld key
        key_agreement: vec![ALICE_AGREEMENT_DECOY.to_string(), ALICE_AGREEMENT.to_string()],
    }
}

pub fn alice_secrets() -> Vec<Secret> {
    vec![
        Secret {
            kid: ALICE_AUTH_ED25519.to_string(),
            type_: SecretType::JsonWebKey2020,
            material: SecretMaterial::Jwk {
                private_key_jwk: serde_json::from_value(serde_json::json!({
                    "kty": "OKP",
                    "crv": "Ed25519",
                    "x": "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo",
                    "d": "nWGxne_9WmC6hEr0kuwsxERJxWl7MmkZcDusAxyuf2A"
                }))
                .unwrap(),
            },
        },
        Secret {
            kid: ALICE_AUTH_P256.to_string(),
            type_: SecretType::JsonWebKey2020,
            material: SecretMaterial::Jwk {
                private_key_jwk: serde_json::from_value(serde_json::json!({
                    "kty": "EC",
                    "crv": "P-256",
                    "x": "f83OJ3D2xF1Bg8vub9tLe1gHMzV76e8Tus9uPHvRVEU",
                    "y": "x_FEzRu9m36HLN_tue659LNpXW6pCyStikYjKIWI5a0",
                    "d": "jpsQnnGQmL-YBIffH1136cspYG6-0iY7X1fCE9-E9LI"
                }))
                .unwrap(),
            },
        },
        Secret {
            kid: ALICE_AGREEMENT.to_string(),
            type_: SecretType::X25519KeyAgreementKey2019,
            material: SecretMaterial::Base58 {
                private_key_base58: ALICE_X25519_PRIVATE_B58.to_string(),
            },
        },
    ]
}

pub fn bob_did_doc() -> DidDocument {
    let bob_1_public = x25519_public(&bs58::decode(BOB_X25519_1_PRIVATE_B58).into_vec().unwrap());
    let bob_2_public = x25519_public(&hex::decode(BOB_X25519_2_PRIVATE_HEX).unwrap());
    DidDocument {
        did: BOB_DID.to_string(),
        verification_method: vec![
            VerificationMethod {
                id: BOB_AGREEMENT_1.to_string(),
                type_: VerificationMethodType::X25519KeyAgreementKey2020,
                controller: BOB_DID.to_string(),
                material: VerificationMaterial::Multibase {
                    public_key_multibase: multibase_of(&[0xec, 0x01], &bob_1_public),
                },
            },
            VerificationMethod {
                id: BOB_AGREEMENT_2.to_string(),
                type_: VerificationMethodType::X25519KeyAgreementKey2019,
                controller: BOB_DID.to_string(),
                material: VerificationMaterial::Base58 {
                    public_key_base58: bs58_of(&bob_2_public),
                },
            },
            jwk_method(
                BOB_AGREEMENT_P256,
                BOB_DID,
                serde_json::json!({
                    "kty": "EC",
                    "crv": "P-256",
                    "x": "MKBCTNIcKUSDii11ySs3526iDZ8AiTo7Tu6KPAqv7D4",
                    "y": "4Etl6SRW2YiLUrN5vfvVHuhp7x8PxltmWWlbbM4IFyM"
                }),
            ),
        ],
        authentication: vec![],
        key_agreement: vec![
            BOB_AGREEMENT_1.to_string(),
            BOB_AGREEMENT_2.to_string(),
            BOB_AGREEMENT_P256.to_string(),
        ],
    }
}

pub fn bob_secrets() -> Vec<Secret> {
    let bob_1_private = bs58::decode(BOB_X25519_1_PRIVATE_B58).into_vec().unwrap();
    vec![
        Secret {
            kid: BOB_AGREEMENT_1.to_string(),
            type_: SecretType::X25519KeyAgreementKey2020,
            material: SecretMaterial::Multibase {
                private_key_multibase: multibase_of(&[0x82, 0x26], &bob_1_private),
            },
        },
        Secret {
            kid: BOB_AGREEMENT_2.to_string(),
            type_: SecretType::X25519KeyAgreementKey2019,
            material: SecretMaterial::Hex {
                private_key_hex: BOB_X25519_2_PRIVATE_HEX.to_string(),
            },
        },
    ]
}

pub fn charlie_did_doc() -> DidDocument {
    DidDocument {
        did: CHARLIE_DID.to_string(),
        verification_method: vec![VerificationMethod {
            id: CHARLIE_AUTH.to_string(),
            type_: VerificationMethodType::Ed25519VerificationKey2018,
            controller: CHARLIE_DID.to_string(),
            material: VerificationMaterial::Base58 {
                public_key_base58: bs58_of(&hex::decode(CHARLIE_ED25519_PUBLIC_HEX).unwrap()),
            },
        }],
        authentication: vec![CHARLIE_AUTH.to_string()],
        key_agreement: vec![],
    }
}

pub fn charlie_secrets() -> Vec<Secret> {
    vec![Secret {
        kid: CHARLIE_AUTH.to_string(),
        type_: SecretType::Ed25519VerificationKey2018,
        material: SecretMaterial::Hex {
            private_key_hex: format!("{}{}", CHARLIE_ED25519_SEED_HEX, CHARLIE_ED25519_PUBLIC_HEX),
        },
    }]
}

fn jwk_method(id: &str, controller: &str, jwk: serde_json::Value) -> VerificationMethod {
    VerificationMethod {
        id: id.to_string(),
        type_: VerificationMethodType::JsonWebKey2020,
        controller: controller.to_string(),
        material: VerificationMaterial::Jwk {
            public_key_jwk: serde_json::from_value(jwk).unwrap(),
        },
    }
}

fn x25519_public(private: &[u8]) -> [u8; 32] {
    let secret = StaticSecret::from(array_ref!(private, 0, 32).to_owned());
    PublicKey::from(&secret).to_bytes()
}

fn bs58_of(key: &[u8]) -> String {
    bs58::encode(key).into_string()
}

fn multibase_of(codec: &[u8], key: &[u8]) -> String {
    let mut tagged = codec.to_vec();
    tagged.extend_from_slice(key);
    format!("z{}", bs58::encode(tagged).into_string())
}
