//! Sender side key selection for pack operations.

use crate::{
    dids::url::{is_did_url, split_did_url},
    dids::{DidDocument, DidResolver},
    secrets::SecretsResolver,
    Error, PrivateKey, PublicKey, Result,
};

/// Selects the local party's signing/agreement keys and the recipient's
/// published keys for `pack_signed` and `pack_encrypted`.
///
/// Holds nothing but the injected resolvers; every find call is a fresh
/// lookup and the returned keys live only for the one pack call.
pub struct SenderKeySelector<'a> {
    dids: &'a dyn DidResolver,
    secrets: &'a dyn SecretsResolver,
}

impl<'a> SenderKeySelector<'a> {
    pub fn new(dids: &'a dyn DidResolver, secrets: &'a dyn SecretsResolver) -> Self {
        SenderKeySelector { dids, secrets }
    }

    /// Signing key for `sign_from`: the exact secret for a DID URL, or the
    /// secret behind the first `authentication` entry for a bare DID.
    pub fn find_signing_key(&self, sign_from: &str) -> Result<PrivateKey> {
        if is_did_url(sign_from) {
            let secret = self
                .secrets
                .find_key(sign_from)
                .ok_or_else(|| Error::SecretNotFound(sign_from.to_string()))?;
            PrivateKey::from_secret(&secret)
        } else {
            let doc = self.resolve(sign_from)?;
            let kid = doc.authentication.first().ok_or_else(|| {
                Error::DidDoc(format!(
                    "no authentication keys in document of '{}'",
                    sign_from
                ))
            })?;
            debug!("signing as '{}' with first authentication key '{}'", sign_from, kid);
            let secret = self
                .secrets
                .find_key(kid)
                .ok_or_else(|| Error::SecretNotFound(kid.clone()))?;
            PrivateKey::from_secret(&secret)
        }
    }

    /// Keys for authcrypt: one sender agreement key we hold plus every
    /// recipient `keyAgreement` key on the same curve, in document order.
    ///
    /// A bare `from` walks the sender's `keyAgreement` list in order and
    /// short-circuits on the first candidate with a non-empty compatible
    /// recipient set; entries without a held secret are skipped, not failed.
    pub fn find_auth_crypt_keys(
        &self,
        from: &str,
        to: &str,
    ) -> Result<(PrivateKey, Vec<PublicKey>)> {
        let (to_did, _) = split_did_url(to);
        if is_did_url(from) {
            let secret = self
                .secrets
                .find_key(from)
                .ok_or_else(|| Error::SecretNotFound(from.to_string()))?;
            let sender = PrivateKey::from_secret(&secret)?;
            let compatible = self.compatible_agreement_keys(to, &sender)?;
            if compatible.is_empty() {
                return Err(Error::IncompatibleCrypto(format!(
                    "no {} key agreement keys of '{}' match sender key '{}'",
                    sender.curve, to_did, from
                )));
            }
            Ok((sender, compatible))
        } else {
            let doc = self.resolve(from)?;
            if doc.key_agreement.is_empty() {
                return Err(Error::DidDoc(format!(
                    "no keyAgreement keys in document of '{}'",
                    from
                )));
            }
            let held = self.secrets.find_keys(&doc.key_agreement);
            if held.is_empty() {
                return Err(Error::SecretNotFound(format!(
                    "none of the keyAgreement keys of '{}' are held",
                    from
                )));
            }
            // Document order expresses the sender's priority; first match wins.
            for kid in &doc.key_agreement {
                if !held.contains(kid) {
                    trace!("skipping sender candidate '{}': secret not held", kid);
                    continue;
                }
                let secret = self
                    .secrets
                    .find_key(kid)
                    .ok_or_else(|| Error::SecretNotFound(kid.clone()))?;
                let sender = PrivateKey::from_secret(&secret)?;
                let compatible = self.compatible_agreement_keys(to, &sender)?;
                if !compatible.is_empty() {
                    debug!("authcrypt to '{}' with sender key '{}'", to_did, kid);
                    return Ok((sender, compatible));
                }
                trace!("sender candidate '{}' shares no curve with '{}'", kid, to_did);
            }
            Err(Error::IncompatibleCrypto(format!(
                "no key agreement keys of '{}' and '{}' share a curve",
                from, to_did
            )))
        }
    }

    /// Keys for anoncrypt: every recipient `keyAgreement` key on the curve
    /// of the first entry, or exactly the one a DID URL pins.
    pub fn find_anon_crypt_keys(&self, to: &str) -> Result<Vec<PublicKey>> {
        let keys = self.agreement_keys(to)?;
        let selected = keys[0].curve;
        let compatible: Vec<PublicKey> =
            keys.into_iter().filter(|key| key.curve == selected).collect();
        debug!(
            "anoncrypt to '{}' with {} {} recipient keys",
            to,
            compatible.len(),
            selected
        );
        Ok(compatible)
    }

    /// Recipient `keyAgreement` keys for a bare DID (all of them) or a DID
    /// URL (exactly that one), in document order. Never empty on success.
    fn agreement_keys(&self, to: &str) -> Result<Vec<PublicKey>> {
        let (did, fragment) = split_did_url(to);
        let doc = self.resolve(did)?;
        if fragment.is_some() {
            if !doc.key_agreement.iter().any(|kid| kid == to) {
                return Err(Error::DidUrlNotFound(format!(
                    "'{}' is not a key agreement method of '{}'",
                    to, did
                )));
            }
            let method = doc.dereference(to)?;
            Ok(vec![PublicKey::from_verification_method(method)?])
        } else {
            if doc.key_agreement.is_empty() {
                return Err(Error::DidDoc(format!(
                    "no keyAgreement keys in document of '{}'",
                    did
                )));
            }
            doc.key_agreement
                .iter()
                .map(|kid| {
                    let method = doc.dereference(kid)?;
                    PublicKey::from_verification_method(method)
                })
                .collect()
        }
    }

    fn compatible_agreement_keys(&self, to: &str, sender: &PrivateKey) -> Result<Vec<PublicKey>> {
        Ok(self
            .agreement_keys(to)?
            .into_iter()
            .filter(|key| key.curve == sender.curve)
            .collect())
    }

    fn resolve(&self, did: &str) -> Result<DidDocument> {
        self.dids
            .resolve(did)
            .ok_or_else(|| Error::DidDocNotResolved(did.to_string()))
    }
}
