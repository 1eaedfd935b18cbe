use crate::{
    crypto::{CryptoAlgorithm, SignatureAlgorithm},
    dids::url::split_did_url,
    dids::DidResolver,
    keys::recipient::RecipientKeySelector,
    messages::helpers::{envelope_kind, receive_jwe, receive_jws},
    messages::message::Message,
    messages::prior_claims::PriorClaims,
    messages::types::MessageType,
    secrets::SecretsResolver,
    Error, Result,
};

/// What unpack found while peeling the envelope layers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnpackMetadata {
    /// Whether the message arrived inside a JWE layer.
    pub encrypted: bool,

    /// Whether the JWE layer authenticated its sender (authcrypt).
    pub authenticated: bool,

    /// Whether a verified signature binds the signer to the message.
    pub non_repudiation: bool,

    /// Whether the JWE layer hid its sender (anoncrypt).
    pub anonymous_sender: bool,

    /// Sender key id of the authenticated encryption layer.
    pub encrypted_from: Option<String>,

    /// Recipient key ids of the encryption layer, in envelope order.
    pub encrypted_to: Option<Vec<String>>,

    /// Signer key id of the verified signature.
    pub sign_from: Option<String>,

    pub sign_alg: Option<SignatureAlgorithm>,

    pub enc_alg_auth: Option<CryptoAlgorithm>,

    pub enc_alg_anon: Option<CryptoAlgorithm>,

    /// Exact signed envelope, kept for later proof of the signature.
    pub signed_message: Option<String>,

    /// Key that issued the verified `from_prior` rotation JWT.
    pub from_prior_issuer_kid: Option<String>,
}

impl Message {
    /// Opens a received envelope of any kind: decrypts the JWE layer,
    /// checks JWS signatures, parses the plain message and restores
    /// verified rotation claims.
    pub fn unpack(
        incoming: &str,
        dids: &dyn DidResolver,
        secrets: &dyn SecretsResolver,
    ) -> Result<(Message, UnpackMetadata)> {
        let mut metadata = UnpackMetadata::default();
        let mut current = incoming.to_string();

        if envelope_kind(&current)? == MessageType::DidCommJwe {
            current = receive_jwe(&current, dids, secrets, &mut metadata)?;
            if envelope_kind(&current)? == MessageType::DidCommJwe {
                return Err(Error::MalformedMessage(
                    "JWE nested inside a JWE".to_string(),
                ));
            }
        }
        if envelope_kind(&current)? == MessageType::DidCommJws {
            current = receive_jws(&current, dids, secrets, &mut metadata)?;
        }
        let message: Message = serde_json::from_str(&current)
            .map_err(|e| Error::MalformedMessage(format!("plain message: {}", e)))?;

        let (message, from_prior_issuer_kid) = message.unpack_from_prior(dids, secrets)?;
        metadata.from_prior_issuer_kid = from_prior_issuer_kid;
        Ok((message, metadata))
    }

    /// Checks the `from_prior` JWT against the prior DID's published key
    /// and restores the claims onto the message. Returns the issuer kid.
    ///
    /// Runs last inside [`unpack`](Message::unpack); calling it directly is
    /// only needed for messages obtained some other way.
    pub fn unpack_from_prior(
        &self,
        dids: &dyn DidResolver,
        secrets: &dyn SecretsResolver,
    ) -> Result<(Message, Option<String>)> {
        let jwt = match &self.from_prior_jwt {
            Some(jwt) => jwt.clone(),
            None => return Ok((self.clone(), None)),
        };
        let kid = PriorClaims::token_kid(&jwt)?;
        let selector = RecipientKeySelector::new(dids, secrets);
        let key = selector.find_verification_key(&kid)?;
        let claims = PriorClaims::verify(&jwt, &key)?;
        if split_did_url(&kid).0 != claims.iss {
            return Err(Error::MalformedMessage(format!(
                "from_prior issuer key '{}' does not belong to '{}'",
                kid, claims.iss
            )));
        }
        debug!("from_prior of message {} verified against '{}'", self.id, kid);
        let mut message = self.clone();
        message.from_prior = Some(claims);
        message.from_prior_jwt = None;
        Ok((message, Some(kid)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DidDocument, ExampleDidResolver, ExampleSecretsResolver, PrivateKey, Secret,
        SecretMaterial, SecretType, VerificationMaterial, VerificationMethod,
        VerificationMethodType,
    };

    // RFC 8032 test 1 keypair
    const SEED: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
    const PUBLIC: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";

    fn empty_resolvers() -> (ExampleDidResolver, ExampleSecretsResolver) {
        (
            ExampleDidResolver::new(vec![]),
            ExampleSecretsResolver::new(vec![]),
        )
    }

    #[test]
    fn plain_message_unpacks_without_flags() -> Result<()> {
        // Arrange
        let (dids, secrets) = empty_resolvers();
        let incoming =
            r#"{"id":"42","type":"https://didcomm.org/trust-ping/2.0/ping","body":{"n":1}}"#;
        // Act
        let (message, metadata) = Message::unpack(incoming, &dids, &secrets)?;
        // Assert
        assert_eq!(message.id, "42");
        assert_eq!(message.body, serde_json::json!({"n": 1}));
        assert_eq!(metadata, UnpackMetadata::default());
        Ok(())
    }

    #[test]
    fn plain_message_needs_a_body() {
        // Arrange
        let (dids, secrets) = empty_resolvers();
        let incoming = r#"{"id":"42","type":"https://didcomm.org/trust-ping/2.0/ping"}"#;
        // Act
        let result = Message::unpack(incoming, &dids, &secrets);
        // Assert
        assert!(matches!(result, Err(Error::MalformedMessage(_))));
    }

    #[test]
    fn jwt_issued_by_a_foreign_key_is_rejected() -> Result<()> {
        // Arrange: valid signature, but the signing key does not belong to
        // the DID the claims name as issuer
        let rogue_kid = "did:example:rogue#key-1";
        let signer = PrivateKey::from_secret(&Secret {
            kid: rogue_kid.to_string(),
            type_: SecretType::Ed25519VerificationKey2018,
            material: SecretMaterial::Hex {
                private_key_hex: SEED.to_string(),
            },
        })?;
        let jwt = PriorClaims::new("did:example:haven", "did:example:keeper").sign(&signer)?;
        let dids = ExampleDidResolver::new(vec![DidDocument {
            did: "did:example:rogue".to_string(),
            verification_method: vec![VerificationMethod {
                id: rogue_kid.to_string(),
                type_: VerificationMethodType::Ed25519VerificationKey2018,
                controller: "did:example:rogue".to_string(),
                material: VerificationMaterial::Hex {
                    public_key_hex: PUBLIC.to_string(),
                },
            }],
            authentication: vec![rogue_kid.to_string()],
            key_agreement: vec![],
        }]);
        let mut message =
            Message::new("https://didcomm.org/trust-ping/2.0/ping", serde_json::json!({}));
        message.from_prior_jwt = Some(jwt);

        // Act
        let result = message.unpack_from_prior(&dids, &ExampleSecretsResolver::new(vec![]));

        // Assert
        assert!(matches!(result, Err(Error::MalformedMessage(_))));
        Ok(())
    }
}
