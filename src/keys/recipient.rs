//! Recipient side key selection for unpack operations.

use crate::{
    dids::url::{is_did_url, split_did_url},
    dids::{DidDocument, DidResolver},
    secrets::SecretsResolver,
    Error, PrivateKey, PublicKey, Result,
};

/// Selects the signer's verification key and the local agreement keys able
/// to open an incoming envelope.
pub struct RecipientKeySelector<'a> {
    dids: &'a dyn DidResolver,
    secrets: &'a dyn SecretsResolver,
}

impl<'a> RecipientKeySelector<'a> {
    pub fn new(dids: &'a dyn DidResolver, secrets: &'a dyn SecretsResolver) -> Self {
        RecipientKeySelector { dids, secrets }
    }

    /// Verification key for an incoming signature. `sign_from` must be a
    /// DID URL naming one of the signer's `authentication` methods.
    pub fn find_verification_key(&self, sign_from: &str) -> Result<PublicKey> {
        if !is_did_url(sign_from) {
            return Err(Error::IllegalArgument(format!(
                "DID URL expected, got '{}'",
                sign_from
            )));
        }
        let (did, _) = split_did_url(sign_from);
        let doc = self.resolve(did)?;
        if !doc.authentication.iter().any(|kid| kid == sign_from) {
            return Err(Error::DidUrlNotFound(format!(
                "'{}' is not an authentication method of '{}'",
                sign_from, did
            )));
        }
        let method = doc.dereference(sign_from)?;
        PublicKey::from_verification_method(method)
    }

    /// Keys for opening authcrypt: the sender's public agreement key and
    /// the curve matched subset of `to_kids` we hold, in input order.
    pub fn find_auth_crypt_keys(
        &self,
        from: &str,
        to_kids: &[String],
    ) -> Result<(PublicKey, Vec<PrivateKey>)> {
        if !is_did_url(from) {
            return Err(Error::IllegalArgument(format!(
                "DID URL expected, got '{}'",
                from
            )));
        }
        let (did, _) = split_did_url(from);
        let doc = self.resolve(did)?;
        if !doc.key_agreement.iter().any(|kid| kid == from) {
            return Err(Error::DidUrlNotFound(format!(
                "'{}' is not a key agreement method of '{}'",
                from, did
            )));
        }
        let sender = PublicKey::from_verification_method(doc.dereference(from)?)?;
        let local = self.held_keys(to_kids)?;
        let compatible: Vec<PrivateKey> = local
            .into_iter()
            .filter(|key| key.curve == sender.curve)
            .collect();
        if compatible.is_empty() {
            return Err(Error::IncompatibleCrypto(format!(
                "no held recipient keys match the {} sender key '{}'",
                sender.curve, from
            )));
        }
        debug!(
            "authcrypt from '{}' opens with {} held recipient keys",
            from,
            compatible.len()
        );
        Ok((sender, compatible))
    }

    /// Keys for opening anoncrypt: the held subset of `to_kids` in input
    /// order. A partially held list succeeds; an unheld one does not.
    pub fn find_anon_crypt_keys(&self, to_kids: &[String]) -> Result<Vec<PrivateKey>> {
        self.held_keys(to_kids)
    }

    fn held_keys(&self, to_kids: &[String]) -> Result<Vec<PrivateKey>> {
        for kid in to_kids {
            if !is_did_url(kid) {
                return Err(Error::IllegalArgument(format!(
                    "DID URL expected, got '{}'",
                    kid
                )));
            }
        }
        let held = self.secrets.find_keys(to_kids);
        if held.is_empty() {
            return Err(Error::SecretNotFound(format!(
                "none of the recipient keys are held: {}",
                to_kids.join(", ")
            )));
        }
        to_kids
            .iter()
            .filter(|kid| held.contains(*kid))
            .map(|kid| {
                let secret = self
                    .secrets
                    .find_key(kid)
                    .ok_or_else(|| Error::SecretNotFound(kid.clone()))?;
                PrivateKey::from_secret(&secret)
            })
            .collect()
    }

    fn resolve(&self, did: &str) -> Result<DidDocument> {
        self.dids
            .resolve(did)
            .ok_or_else(|| Error::DidDocNotResolved(did.to_string()))
    }
}
