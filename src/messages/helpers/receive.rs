use std::convert::TryFrom;

use serde_json::value::RawValue;

use crate::{
    crypto::{CryptoAlgorithm, Cypher, SignatureAlgorithm, Signer},
    dids::DidResolver,
    keys::recipient::RecipientKeySelector,
    messages::helpers::decrypt_cek,
    messages::jwe::Jwe,
    messages::jws::{signing_input, Jws, Signature},
    messages::types::MessageType,
    messages::unpack::UnpackMetadata,
    secrets::SecretsResolver,
    Error, Result,
};

/// Helper type to check if a received message is plain, signed or encrypted
/// without parsing the whole envelope.
#[derive(Deserialize, Debug)]
struct UnknownReceivedMessage<'a> {
    #[serde(borrow)]
    ciphertext: Option<&'a RawValue>,

    #[serde(borrow)]
    recipients: Option<&'a RawValue>,

    #[serde(borrow)]
    signatures: Option<&'a RawValue>,
}

/// Checks well known envelope fields to derive the layer type.
pub(crate) fn envelope_kind(incoming: &str) -> Result<MessageType> {
    let to_check: UnknownReceivedMessage = serde_json::from_str(incoming)
        .map_err(|e| Error::MalformedMessage(format!("not a JSON envelope: {}", e)))?;
    if to_check.ciphertext.is_some() || to_check.recipients.is_some() {
        return Ok(MessageType::DidCommJwe);
    }
    if to_check.signatures.is_some() {
        return Ok(MessageType::DidCommJws);
    }
    Ok(MessageType::DidCommRaw)
}

/// Opens one JWE layer: selects local agreement keys for the envelope's
/// recipients and tries them in envelope order until one unwraps a content
/// encryption key that opens the payload.
pub(crate) fn receive_jwe(
    incoming: &str,
    dids: &dyn DidResolver,
    secrets: &dyn SecretsResolver,
    metadata: &mut UnpackMetadata,
) -> Result<String> {
    let jwe: Jwe = serde_json::from_str(incoming)
        .map_err(|e| Error::MalformedMessage(format!("JWE envelope: {}", e)))?;
    let header = jwe.read_protected()?;
    if header.typ != MessageType::DidCommJwe {
        return Err(Error::MalformedMessage(
            "JWE protected header carries a non JWE typ".to_string(),
        ));
    }
    let (_, authenticated) = CryptoAlgorithm::from_key_wrap_alg(&header.alg)?;
    let enc_alg = CryptoAlgorithm::try_from(header.enc.as_str())?;

    let kids = jwe.recipient_kids();
    if kids.is_empty() {
        return Err(Error::MalformedMessage("JWE has no recipients".to_string()));
    }

    let selector = RecipientKeySelector::new(dids, secrets);
    let (sender, candidates) = if authenticated {
        let skid = header.skid.clone().ok_or_else(|| {
            Error::MalformedMessage("authenticated JWE without 'skid'".to_string())
        })?;
        let (sender, local) = selector.find_auth_crypt_keys(&skid, &kids)?;
        metadata.encrypted_from = Some(skid);
        (Some(sender), local)
    } else {
        (None, selector.find_anon_crypt_keys(&kids)?)
    };

    let mut ciphertext_and_tag = jwe.payload()?;
    ciphertext_and_tag.extend(jwe.get_tag()?);
    let iv = jwe.get_iv()?;

    let mut plain: Option<Vec<u8>> = None;
    for local in &candidates {
        let recipient = match jwe.recipients.iter().find(|r| r.header.kid == local.kid) {
            Some(recipient) => recipient,
            None => continue,
        };
        let attempt = decrypt_cek(&header, recipient, local, sender.as_ref()).and_then(|cek| {
            (enc_alg.decryptor())(&iv, &cek, &ciphertext_and_tag, jwe.protected.as_bytes())
        });
        match attempt {
            Ok(raw) => {
                debug!("JWE opened with recipient key '{}'", local.kid);
                plain = Some(raw);
                break;
            }
            Err(e) => debug!("recipient key '{}' did not open the JWE: {}", local.kid, e),
        }
    }
    let raw = plain.ok_or_else(|| {
        Error::MalformedMessage("no recipient key could decrypt the JWE".to_string())
    })?;

    metadata.encrypted = true;
    metadata.authenticated = authenticated;
    metadata.anonymous_sender = !authenticated;
    metadata.encrypted_to = Some(kids);
    if authenticated {
        metadata.enc_alg_auth = Some(enc_alg);
    } else {
        metadata.enc_alg_anon = Some(enc_alg);
    }

    String::from_utf8(raw).map_err(|e| Error::MalformedMessage(format!("JWE content: {}", e)))
}

/// Opens one JWS layer: the first signature that verifies against its
/// signer's published authentication key wins.
pub(crate) fn receive_jws(
    incoming: &str,
    dids: &dyn DidResolver,
    secrets: &dyn SecretsResolver,
    metadata: &mut UnpackMetadata,
) -> Result<String> {
    let jws: Jws = serde_json::from_str(incoming)
        .map_err(|e| Error::MalformedMessage(format!("JWS envelope: {}", e)))?;
    if jws.signatures.is_empty() {
        return Err(Error::MalformedMessage("JWS has no signatures".to_string()));
    }

    let selector = RecipientKeySelector::new(dids, secrets);
    let mut verified: Option<(String, SignatureAlgorithm)> = None;
    for signature in &jws.signatures {
        match check_signature(&jws, signature, &selector) {
            Ok(value) => {
                verified = Some(value);
                break;
            }
            Err(e) => debug!("JWS signature did not verify: {}", e),
        }
    }
    let (kid, alg) = verified
        .ok_or_else(|| Error::MalformedMessage("no JWS signature verifies".to_string()))?;

    metadata.non_repudiation = true;
    metadata.sign_from = Some(kid);
    metadata.sign_alg = Some(alg);
    metadata.signed_message = Some(incoming.to_string());

    let raw = jws.read_payload()?;
    String::from_utf8(raw).map_err(|e| Error::MalformedMessage(format!("JWS payload: {}", e)))
}

fn check_signature(
    jws: &Jws,
    signature: &Signature,
    selector: &RecipientKeySelector,
) -> Result<(String, SignatureAlgorithm)> {
    let header = signature.read_protected()?;
    if header.typ != MessageType::DidCommJws {
        return Err(Error::MalformedMessage(
            "JWS protected header carries a non JWS typ".to_string(),
        ));
    }
    let key = selector.find_verification_key(&header.kid)?;
    let alg = SignatureAlgorithm::try_from(header.alg.as_str())?;
    if alg != SignatureAlgorithm::for_curve(key.curve)? {
        return Err(Error::MalformedMessage(format!(
            "JWS alg '{}' does not fit key '{}'",
            header.alg, header.kid
        )));
    }
    let input = signing_input(&signature.protected, &jws.payload);
    let valid = (alg.validator())(key.as_bytes(), input.as_bytes(), &signature.read_signature()?)?;
    if !valid {
        return Err(Error::MalformedMessage(
            "JWS signature does not verify".to_string(),
        ));
    }
    Ok((header.kid, alg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_the_envelope_layer() -> Result<()> {
        // Arrange
        let jwe = r#"{"protected":"e30","recipients":[],"iv":"YQ","ciphertext":"YQ","tag":"YQ"}"#;
        let jws = r#"{"payload":"YQ","signatures":[{"protected":"e30","signature":"YQ"}]}"#;
        let plain = r#"{"id":"42","type":"https://didcomm.org/trust-ping/2.0/ping","body":{}}"#;
        // Act / Assert
        assert_eq!(envelope_kind(jwe)?, MessageType::DidCommJwe);
        assert_eq!(envelope_kind(jws)?, MessageType::DidCommJws);
        assert_eq!(envelope_kind(plain)?, MessageType::DidCommRaw);
        Ok(())
    }

    #[test]
    fn non_json_input_is_malformed() {
        // Act
        let result = envelope_kind("..definitely not an envelope..");
        // Assert
        assert!(matches!(result, Err(Error::MalformedMessage(_))));
    }
}
