use aes_gcm::{aead::generic_array::GenericArray, Aes256Gcm};
use arrayref::array_ref;
use chacha20poly1305::{
    aead::{Aead, NewAead},
    XChaCha20Poly1305, XNonce,
};
use rand::{prelude::SliceRandom, Rng};
use sha2::{Digest, Sha256};
use x25519_dalek::{PublicKey as X25519Public, StaticSecret};

use crate::{
    messages::jwe::{JweHeader, Recipient, RecipientHeader},
    Curve, Error, PrivateKey, PublicKey, Result,
};

/// Wraps the content encryption key for one recipient.
///
/// The ephemeral secret is shared by every recipient of the envelope; the
/// key encryption key is derived per recipient from `zE` (and `zS` when a
/// sender key authenticates the envelope).
///
/// # Arguments
///
/// * `recipient` - recipient key agreement key to wrap for
///
/// * `sender` - sender key agreement key, present for authcrypt only
///
/// * `epk` - per envelope ephemeral secret
///
/// * `cek` - content encryption key, one random key per envelope
///
/// * `wrap_alg` - JWA name of the key wrap, also the KDF algorithm id
pub(crate) fn encrypt_cek(
    recipient: &PublicKey,
    sender: Option<&PrivateKey>,
    epk: &StaticSecret,
    cek: &[u8; 32],
    wrap_alg: &str,
) -> Result<Recipient> {
    trace!("creating per-recipient JWE value for '{}'", recipient.kid);
    let recipient_public = x25519_public(recipient)?;

    // zE (temporary secret)
    let ze = epk.diffie_hellman(&recipient_public);

    let shared: Vec<u8> = match sender {
        Some(sender) => {
            // zS (static secret), authcrypt only
            let zs = x25519_secret(sender)?.diffie_hellman(&recipient_public);
            [ze.as_bytes().as_ref(), zs.as_bytes().as_ref()].concat()
        }
        None => ze.as_bytes().to_vec(),
    };

    // key encryption key
    let kek = concat_kdf(&shared, wrap_alg, None, None)?;

    let iv;
    let sealed_and_tag: Vec<u8> = match wrap_alg {
        "ECDH-1PU+A256KW" | "ECDH-ES+A256KW" => {
            iv = random_nonce(12);
            let crypter = Aes256Gcm::new(GenericArray::from_slice(&kek));
            crypter
                .encrypt(GenericArray::from_slice(&iv), cek.as_ref())
                .map_err(|e| {
                    Error::IllegalArgument(format!("cannot wrap content encryption key: {}", e))
                })?
        }
        "ECDH-1PU+XC20PKW" | "ECDH-ES+XC20PKW" => {
            iv = random_nonce(24);
            let crypter = XChaCha20Poly1305::new(chacha20poly1305::Key::from_slice(&kek));
            crypter
                .encrypt(XNonce::from_slice(&iv), cek.as_ref())
                .map_err(|e| {
                    Error::IllegalArgument(format!("cannot wrap content encryption key: {}", e))
                })?
        }
        _ => return Err(Error::UnsupportedAlgorithm(wrap_alg.to_string())),
    };

    let (sealed_cek, tag) = sealed_and_tag.split_at(sealed_and_tag.len() - 16);
    Ok(Recipient {
        header: RecipientHeader {
            kid: recipient.kid.clone(),
            iv: Some(base64_url::encode(&iv)),
            tag: Some(base64_url::encode(tag)),
        },
        encrypted_key: base64_url::encode(sealed_cek),
    })
}

/// Unwraps the content encryption key from one per recipient JWE value.
///
/// # Arguments
///
/// * `header` - decoded protected header carrying `alg` and the `epk`
///
/// * `recipient` - per recipient value addressed to `local`
///
/// * `local` - recipient key agreement key the envelope names
///
/// * `sender` - sender key agreement key, present for authcrypt only
pub(crate) fn decrypt_cek(
    header: &JweHeader,
    recipient: &Recipient,
    local: &PrivateKey,
    sender: Option<&PublicKey>,
) -> Result<Vec<u8>> {
    trace!("decrypting per-recipient JWE value for '{}'", recipient.header.kid);
    let epk_crv = header.epk.crv.as_deref().unwrap_or_default();
    if epk_crv != Curve::X25519.as_str() {
        return Err(Error::UnsupportedAlgorithm(format!(
            "key agreement on curve '{}'",
            epk_crv
        )));
    }
    let epk_x = header
        .epk
        .x
        .as_ref()
        .ok_or_else(|| Error::MalformedMessage("epk has no x coordinate".to_string()))?;
    let epk_raw = base64_url::decode(epk_x)
        .map_err(|e| Error::MalformedMessage(format!("epk x coordinate: {}", e)))?;
    if epk_raw.len() != 32 {
        return Err(Error::MalformedMessage(format!(
            "epk x coordinate is {} bytes, X25519 needs 32",
            epk_raw.len()
        )));
    }
    let epk_public = X25519Public::from(array_ref!(epk_raw, 0, 32).to_owned());

    let local_secret = x25519_secret(local)?;

    // zE (temporary secret)
    let ze = local_secret.diffie_hellman(&epk_public);

    let shared: Vec<u8> = match sender {
        Some(sender) => {
            // zS (static secret), authcrypt only
            let zs = local_secret.diffie_hellman(&x25519_public(sender)?);
            [ze.as_bytes().as_ref(), zs.as_bytes().as_ref()].concat()
        }
        None => ze.as_bytes().to_vec(),
    };

    // key encryption key
    let kek = concat_kdf(&shared, &header.alg, None, None)?;

    let iv = recipient
        .header
        .iv
        .as_ref()
        .ok_or_else(|| Error::MalformedMessage("recipient header has no iv".to_string()))?;
    let iv = base64_url::decode(iv)
        .map_err(|e| Error::MalformedMessage(format!("recipient iv: {}", e)))?;
    let tag = recipient
        .header
        .tag
        .as_ref()
        .ok_or_else(|| Error::MalformedMessage("recipient header has no tag".to_string()))?;

    let mut ciphertext_and_tag: Vec<u8> = vec![];
    ciphertext_and_tag.extend(
        base64_url::decode(&recipient.encrypted_key)
            .map_err(|e| Error::MalformedMessage(format!("encrypted_key: {}", e)))?,
    );
    ciphertext_and_tag.extend(
        base64_url::decode(tag).map_err(|e| Error::MalformedMessage(format!("recipient tag: {}", e)))?,
    );

    let cek = match header.alg.as_str() {
        "ECDH-1PU+A256KW" | "ECDH-ES+A256KW" => {
            if iv.len() != 12 {
                return Err(Error::MalformedMessage(format!(
                    "key wrap nonce is {} bytes, A256KW needs 12",
                    iv.len()
                )));
            }
            let crypter = Aes256Gcm::new(GenericArray::from_slice(&kek));
            crypter
                .decrypt(GenericArray::from_slice(&iv), ciphertext_and_tag.as_ref())
                .map_err(|e| {
                    Error::MalformedMessage(format!(
                        "encrypted_key for '{}' does not open: {}",
                        recipient.header.kid, e
                    ))
                })?
        }
        "ECDH-1PU+XC20PKW" | "ECDH-ES+XC20PKW" => {
            if iv.len() != 24 {
                return Err(Error::MalformedMessage(format!(
                    "key wrap nonce is {} bytes, XC20PKW needs 24",
                    iv.len()
                )));
            }
            let crypter = XChaCha20Poly1305::new(chacha20poly1305::Key::from_slice(&kek));
            crypter
                .decrypt(XNonce::from_slice(&iv), ciphertext_and_tag.as_ref())
                .map_err(|e| {
                    Error::MalformedMessage(format!(
                        "encrypted_key for '{}' does not open: {}",
                        recipient.header.kid, e
                    ))
                })?
        }
        _ => return Err(Error::UnsupportedAlgorithm(header.alg.clone())),
    };

    // a wrap that opens can still carry a key the content cipher cannot take
    if cek.len() != 32 {
        return Err(Error::MalformedMessage(format!(
            "content encryption key for '{}' is {} bytes, not 32",
            recipient.header.kid,
            cek.len()
        )));
    }
    Ok(cek)
}

/// Random nonce of the given length, fit for one use only.
pub(crate) fn random_nonce(length: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let mut nonce: Vec<u8> = (0..length).map(|_| rng.gen::<u8>()).collect();
    nonce.shuffle(&mut rng);
    nonce
}

/// Concatenation key derivation function, one round of SHA-256 for a
/// 256 bit key, with the wrap algorithm name as the algorithm id.
fn concat_kdf(
    secret: &[u8],
    alg: &str,
    producer_info: Option<&[u8]>,
    consumer_info: Option<&[u8]>,
) -> Result<Vec<u8>> {
    let mut value = length_and_input(alg.as_bytes())?;
    if let Some(info) = producer_info {
        value.extend(length_and_input(info)?);
    } else {
        value.extend(&[0, 0, 0, 0]);
    }
    if let Some(info) = consumer_info {
        value.extend(length_and_input(info)?);
    } else {
        value.extend(&[0, 0, 0, 0]);
    }
    // only key length 256 is supported
    value.extend(&[0, 0, 1, 0]);

    // since our key length is 256 we only have to do one round
    let mut to_hash: Vec<u8> = vec![0, 0, 0, 1];
    to_hash.extend(secret);
    to_hash.extend(value);

    let mut hasher = Sha256::new();
    hasher.input(&to_hash);
    let hash_result = hasher.result();

    Ok(hash_result.as_slice().to_vec())
}

/// Combines an input and its big endian length into a vector.
fn length_and_input(input: &[u8]) -> Result<Vec<u8>> {
    use std::convert::TryFrom;
    let mut collected: Vec<u8> = u32::try_from(input.len())
        .map_err(|e| Error::IllegalArgument(e.to_string()))?
        .to_be_bytes()
        .to_vec();
    collected.extend(input);
    Ok(collected)
}

fn x25519_public(key: &PublicKey) -> Result<X25519Public> {
    if key.curve != Curve::X25519 {
        return Err(Error::UnsupportedAlgorithm(format!(
            "key agreement with '{}' on curve {}",
            key.kid, key.curve
        )));
    }
    let material = key.as_bytes();
    if material.len() != 32 {
        return Err(Error::UnsupportedVerificationMethodMaterialFormat(format!(
            "'{}' is not a 32 byte X25519 key",
            key.kid
        )));
    }
    Ok(X25519Public::from(array_ref!(material, 0, 32).to_owned()))
}

fn x25519_secret(key: &PrivateKey) -> Result<StaticSecret> {
    if key.curve != Curve::X25519 {
        return Err(Error::UnsupportedAlgorithm(format!(
            "key agreement with '{}' on curve {}",
            key.kid, key.curve
        )));
    }
    let material = key.as_bytes();
    if material.len() != 32 {
        return Err(Error::UnsupportedSecretMaterialFormat(format!(
            "'{}' is not a 32 byte X25519 key",
            key.kid
        )));
    }
    Ok(StaticSecret::from(array_ref!(material, 0, 32).to_owned()))
}
