use rand::Rng;
use x25519_dalek::{PublicKey as X25519Public, StaticSecret};

use crate::{
    crypto::{CryptoAlgorithm, Cypher, SignatureAlgorithm, Signer},
    dids::url::{ensure_did, is_did, is_did_url, split_did_url},
    dids::DidResolver,
    keys::sender::SenderKeySelector,
    messages::helpers::{encrypt_cek, random_nonce},
    messages::jwe::{Jwe, JweHeader},
    messages::jws::{signing_input, Jws, Signature, SignedHeader},
    messages::message::Message,
    messages::types::MessageType,
    secrets::SecretsResolver,
    Curve, Error, Jwk, PrivateKey, Result,
};

/// How `pack_signed` keyed the envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct PackSignedMetadata {
    pub sign_from_kid: String,

    pub from_prior_issuer_kid: Option<String>,
}

/// How `pack_encrypted` keyed the envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct PackEncryptedMetadata {
    /// Recipient key ids the content encryption key was wrapped for, in
    /// envelope order.
    pub to_kids: Vec<String>,

    pub from_kid: Option<String>,

    pub sign_from_kid: Option<String>,

    pub from_prior_issuer_kid: Option<String>,
}

impl Message {
    /// Renders the message as plain JSON, signing pending rotation claims
    /// on the way out.
    pub fn pack_plaintext(
        &self,
        dids: &dyn DidResolver,
        secrets: &dyn SecretsResolver,
    ) -> Result<String> {
        let (message, _) = self.pack_from_prior(None, dids, secrets)?;
        serde_json::to_string(&message)
            .map_err(|e| Error::IllegalArgument(format!("cannot serialize message: {}", e)))
    }

    /// Renders the message as a JWS envelope signed with a key the signer's
    /// DID authorizes.
    ///
    /// # Arguments
    ///
    /// * `sign_from` - signer DID, or DID URL naming the exact key
    pub fn pack_signed(
        &self,
        sign_from: &str,
        dids: &dyn DidResolver,
        secrets: &dyn SecretsResolver,
    ) -> Result<(String, PackSignedMetadata)> {
        ensure_did(sign_from)?;
        let (message, from_prior_issuer_kid) = self.pack_from_prior(None, dids, secrets)?;
        let selector = SenderKeySelector::new(dids, secrets);
        let key = selector.find_signing_key(sign_from)?;
        let payload = serde_json::to_vec(&message)
            .map_err(|e| Error::IllegalArgument(format!("cannot serialize message: {}", e)))?;
        let envelope = sign_payload(&payload, &key)?;
        debug!("message {} signed by '{}'", message.id, key.kid);
        let metadata = PackSignedMetadata {
            sign_from_kid: key.kid.clone(),
            from_prior_issuer_kid,
        };
        Ok((envelope, metadata))
    }

    /// Renders the message as a JWE envelope, optionally signed inside and
    /// optionally authenticating the sender (authcrypt when `from` is
    /// given, anoncrypt otherwise).
    ///
    /// # Arguments
    ///
    /// * `to` - recipient DID, or DID URL pinning one key agreement key
    ///
    /// * `from` - sender DID or DID URL for authcrypt, `None` for anoncrypt
    ///
    /// * `sign_from` - signer DID or DID URL for an inner JWS layer
    ///
    /// * `enc_alg` - content encryption algorithm for the envelope
    pub fn pack_encrypted(
        &self,
        to: &str,
        from: Option<&str>,
        sign_from: Option<&str>,
        dids: &dyn DidResolver,
        secrets: &dyn SecretsResolver,
        enc_alg: &CryptoAlgorithm,
    ) -> Result<(String, PackEncryptedMetadata)> {
        ensure_did(to)?;
        if let Some(from) = from {
            ensure_did(from)?;
            if let Some(header_from) = &self.from {
                if split_did_url(from).0 != header_from {
                    return Err(Error::IllegalArgument(format!(
                        "'{}' does not agree with the message from '{}'",
                        from, header_from
                    )));
                }
            }
        }
        if let Some(sign_from) = sign_from {
            ensure_did(sign_from)?;
        }
        if !self.to.is_empty() {
            let (to_did, _) = split_did_url(to);
            if !self.to.iter().any(|recipient| recipient == to_did) {
                return Err(Error::IllegalArgument(format!(
                    "'{}' is not a recipient of the message",
                    to
                )));
            }
        }

        let (message, from_prior_issuer_kid) = self.pack_from_prior(None, dids, secrets)?;
        let selector = SenderKeySelector::new(dids, secrets);

        let payload = serde_json::to_string(&message)
            .map_err(|e| Error::IllegalArgument(format!("cannot serialize message: {}", e)))?;
        let (payload, sign_from_kid) = match sign_from {
            Some(sign_from) => {
                let key = selector.find_signing_key(sign_from)?;
                let kid = key.kid.clone();
                (sign_payload(payload.as_bytes(), &key)?, Some(kid))
            }
            None => (payload, None),
        };

        let (sender_key, recipient_keys) = match from {
            Some(from) => {
                let (sender, recipients) = selector.find_auth_crypt_keys(from, to)?;
                (Some(sender), recipients)
            }
            None => (None, selector.find_anon_crypt_keys(to)?),
        };
        let authenticated = sender_key.is_some();
        let wrap_alg = enc_alg.key_wrap_alg(authenticated);

        // one ephemeral key and one content key per envelope
        let epk = StaticSecret::new(rand_core::OsRng);
        let cek: [u8; 32] = rand::thread_rng().gen();

        let header = JweHeader {
            typ: MessageType::DidCommJwe,
            enc: enc_alg.as_str().to_string(),
            alg: wrap_alg.to_string(),
            skid: sender_key.as_ref().map(|key| key.kid.clone()),
            epk: Jwk::ephemeral(
                Curve::X25519.as_str().to_string(),
                base64_url::encode(X25519Public::from(&epk).as_bytes()),
            ),
        };
        let protected = header.to_b64()?;

        let mut recipients = Vec::with_capacity(recipient_keys.len());
        for recipient in &recipient_keys {
            recipients.push(encrypt_cek(
                recipient,
                sender_key.as_ref(),
                &epk,
                &cek,
                wrap_alg,
            )?);
        }

        let iv = random_nonce(enc_alg.nonce_length());
        let sealed_and_tag =
            (enc_alg.encryptor())(&iv, &cek, payload.as_bytes(), protected.as_bytes())?;
        let (ciphertext, tag) = sealed_and_tag.split_at(sealed_and_tag.len() - 16);

        let to_kids: Vec<String> = recipient_keys.iter().map(|key| key.kid.clone()).collect();
        let jwe = Jwe::new(protected, recipients, ciphertext, &iv, tag);
        let envelope = serde_json::to_string(&jwe)
            .map_err(|e| Error::IllegalArgument(format!("cannot serialize JWE: {}", e)))?;
        debug!(
            "message {} encrypted to {} recipient keys of '{}'",
            message.id,
            to_kids.len(),
            to
        );

        let metadata = PackEncryptedMetadata {
            to_kids,
            from_kid: sender_key.as_ref().map(|key| key.kid.clone()),
            sign_from_kid,
            from_prior_issuer_kid,
        };
        Ok((envelope, metadata))
    }

    /// Signs pending rotation claims into the wire `from_prior` JWT.
    /// Returns the message to render and the issuer kid used, if any.
    ///
    /// Runs first inside every pack operation; calling it directly is only
    /// needed to control the issuer key via `issuer_kid`.
    pub fn pack_from_prior(
        &self,
        issuer_kid: Option<&str>,
        dids: &dyn DidResolver,
        secrets: &dyn SecretsResolver,
    ) -> Result<(Message, Option<String>)> {
        let claims = match &self.from_prior {
            Some(claims) => claims.clone(),
            None => return Ok((self.clone(), None)),
        };
        if !is_did(&claims.iss) {
            return Err(Error::IllegalArgument(format!(
                "from_prior iss '{}' is not a DID",
                claims.iss
            )));
        }
        if !is_did(&claims.sub) {
            return Err(Error::IllegalArgument(format!(
                "from_prior sub '{}' is not a DID",
                claims.sub
            )));
        }
        if claims.iss == claims.sub {
            return Err(Error::IllegalArgument(
                "from_prior iss and sub name the same DID".to_string(),
            ));
        }
        if let Some(from) = &self.from {
            if from != &claims.sub {
                return Err(Error::IllegalArgument(format!(
                    "from_prior sub '{}' does not agree with the message from '{}'",
                    claims.sub, from
                )));
            }
        }

        let selector = SenderKeySelector::new(dids, secrets);
        let key = match issuer_kid {
            Some(kid) => {
                if !is_did_url(kid) {
                    return Err(Error::IllegalArgument(format!(
                        "DID URL expected, got '{}'",
                        kid
                    )));
                }
                if split_did_url(kid).0 != claims.iss {
                    return Err(Error::IllegalArgument(format!(
                        "issuer kid '{}' does not belong to '{}'",
                        kid, claims.iss
                    )));
                }
                selector.find_signing_key(kid)?
            }
            None => selector.find_signing_key(&claims.iss)?,
        };

        let jwt = claims.sign(&key)?;
        debug!("from_prior of message {} signed by '{}'", self.id, key.kid);
        let mut message = self.clone();
        message.from_prior = None;
        message.from_prior_jwt = Some(jwt);
        Ok((message, Some(key.kid.clone())))
    }
}

/// Renders a payload as a single signature JWS envelope.
fn sign_payload(payload: &[u8], key: &PrivateKey) -> Result<String> {
    let alg = SignatureAlgorithm::for_curve(key.curve)?;
    let header = SignedHeader {
        typ: MessageType::DidCommJws,
        alg: alg.as_str().to_string(),
        kid: key.kid.clone(),
    };
    let protected = header.to_b64()?;
    let payload_b64 = base64_url::encode(payload);
    let input = signing_input(&protected, &payload_b64);
    let signature = (alg.signer())(key.as_bytes(), input.as_bytes())?;
    let jws = Jws {
        payload: payload_b64,
        signatures: vec![Signature {
            protected,
            signature: base64_url::encode(&signature),
        }],
    };
    serde_json::to_string(&jws)
        .map_err(|e| Error::IllegalArgument(format!("cannot serialize JWS: {}", e)))
}
