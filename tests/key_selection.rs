use didcomm_envelope::{Curve, Error, RecipientKeySelector, SenderKeySelector};
use utilities::{
    alice_secrets_resolver, bob_secrets_resolver, example_did_resolver, ALICE_AGREEMENT,
    ALICE_AUTH_ED25519, ALICE_DID, BOB_AGREEMENT_1, BOB_AGREEMENT_2, BOB_AGREEMENT_P256, BOB_DID,
};

#[test]
fn bare_signer_did_uses_the_first_authentication_key() -> Result<(), Error> {
    // Arrange
    let dids = example_did_resolver();
    let secrets = alice_secrets_resolver();
    let selector = SenderKeySelector::new(&dids, &secrets);

    // Act
    let key = selector.find_signing_key(ALICE_DID)?;

    // Assert
    assert_eq!(key.kid, ALICE_AUTH_ED25519);
    assert_eq!(key.curve, Curve::Ed25519);
    Ok(())
}

#[test]
fn agreement_scan_skips_unheld_candidates() -> Result<(), Error> {
    // Arrange
    let dids = example_did_resolver();
    let secrets = alice_secrets_resolver();
    let selector = SenderKeySelector::new(&dids, &secrets);

    // Act
    let (sender, recipients) = selector.find_auth_crypt_keys(ALICE_DID, BOB_DID)?;

    // Assert
    // the first keyAgreement entry of alice's document is not in her wallet
    assert_eq!(sender.kid, ALICE_AGREEMENT);
    let kids: Vec<&str> = recipients.iter().map(|key| key.kid.as_str()).collect();
    assert_eq!(kids, [BOB_AGREEMENT_1, BOB_AGREEMENT_2]);
    Ok(())
}

#[test]
fn anoncrypt_follows_the_first_entry_curve() -> Result<(), Error> {
    // Arrange
    let dids = example_did_resolver();
    let secrets = alice_secrets_resolver();
    let selector = SenderKeySelector::new(&dids, &secrets);

    // Act
    let keys = selector.find_anon_crypt_keys(BOB_DID)?;

    // Assert
    let kids: Vec<&str> = keys.iter().map(|key| key.kid.as_str()).collect();
    assert_eq!(kids, [BOB_AGREEMENT_1, BOB_AGREEMENT_2]);
    Ok(())
}

#[test]
fn pinned_agreement_url_selects_exactly_one_key() -> Result<(), Error> {
    // Arrange
    let dids = example_did_resolver();
    let secrets = alice_secrets_resolver();
    let selector = SenderKeySelector::new(&dids, &secrets);

    // Act
    let keys = selector.find_anon_crypt_keys(BOB_AGREEMENT_2)?;

    // Assert
    let kids: Vec<&str> = keys.iter().map(|key| key.kid.as_str()).collect();
    assert_eq!(kids, [BOB_AGREEMENT_2]);
    Ok(())
}

#[test]
fn held_recipient_keys_keep_envelope_order() -> Result<(), Error> {
    // Arrange
    let dids = example_did_resolver();
    let secrets = bob_secrets_resolver();
    let selector = RecipientKeySelector::new(&dids, &secrets);
    let envelope_kids = vec![BOB_AGREEMENT_2.to_string(), BOB_AGREEMENT_1.to_string()];

    // Act
    let keys = selector.find_anon_crypt_keys(&envelope_kids)?;

    // Assert
    let kids: Vec<&str> = keys.iter().map(|key| key.kid.as_str()).collect();
    assert_eq!(kids, [BOB_AGREEMENT_2, BOB_AGREEMENT_1]);
    Ok(())
}

#[test]
fn held_keys_must_match_the_sender_curve() {
    // Arrange
    let dids = example_did_resolver();
    let secrets = bob_secrets_resolver();
    let selector = RecipientKeySelector::new(&dids, &secrets);
    let envelope_kids = vec![BOB_AGREEMENT_1.to_string()];

    // Act: a P-256 sender key cannot agree with bob's X25519 wallet
    let result = selector.find_auth_crypt_keys(BOB_AGREEMENT_P256, &envelope_kids);

    // Assert
    assert!(matches!(result, Err(Error::IncompatibleCrypto(_))));
}

#[test]
fn verification_key_requires_a_did_url() {
    // Arrange
    let dids = example_did_resolver();
    let secrets = bob_secrets_resolver();
    let selector = RecipientKeySelector::new(&dids, &secrets);

    // Act
    let bare = selector.find_verification_key(ALICE_DID);
    let exact = selector.find_verification_key(ALICE_AUTH_ED25519);

    // Assert
    assert!(matches!(bare, Err(Error::IllegalArgument(_))));
    assert_eq!(exact.unwrap().kid, ALICE_AUTH_ED25519);
}

#[test]
fn strangers_hold_none_of_the_wrapped_keys() {
    // Arrange
    let dids = example_did_resolver();
    let secrets = alice_secrets_resolver();
    let selector = RecipientKeySelector::new(&dids, &secrets);
    let envelope_kids = vec![BOB_AGREEMENT_1.to_string(), BOB_AGREEMENT_2.to_string()];

    // Act
    let result = selector.find_anon_crypt_keys(&envelope_kids);

    // Assert
    assert!(matches!(result, Err(Error::SecretNotFound(_))));
}
