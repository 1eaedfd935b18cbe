use didcomm_envelope::{
    CryptoAlgorithm, Error, ExampleSecretsResolver, Message, PriorClaims,
};
use serde_json::{json, Value};
use utilities::{
    alice_secrets, alice_secrets_resolver, bob_secrets_resolver, charlie_secrets,
    example_did_resolver, ALICE_DID, BOB_DID, CHARLIE_AUTH, CHARLIE_DID,
};

/// Alice rotated away from the charlie DID, so her messages carry a
/// `from_prior` JWT issued by a charlie authentication key.
fn rotation_message() -> Message {
    Message::new(
        "https://didcomm.org/trust-ping/2.0/ping",
        json!({"response_requested": true}),
    )
    .from(ALICE_DID)
    .to(&[BOB_DID])
    .from_prior(PriorClaims::new(CHARLIE_DID, ALICE_DID).issued_now())
}

/// The rotating party holds both its current and its prior secrets.
fn rotating_sender_secrets() -> ExampleSecretsResolver {
    ExampleSecretsResolver::new([alice_secrets(), charlie_secrets()].concat())
}

#[test]
fn rotation_claims_travel_inside_the_encrypted_envelope() -> Result<(), Error> {
    // Arrange
    let dids = example_did_resolver();
    let message = rotation_message();

    // Act
    let (packed, pack_metadata) = message.pack_encrypted(
        BOB_DID,
        Some(ALICE_DID),
        None,
        &dids,
        &rotating_sender_secrets(),
        &CryptoAlgorithm::XC20P,
    )?;
    let (received, metadata) = Message::unpack(&packed, &dids, &bob_secrets_resolver())?;

    // Assert
    assert_eq!(
        pack_metadata.from_prior_issuer_kid.as_deref(),
        Some(CHARLIE_AUTH)
    );
    assert_eq!(message, received);
    assert!(received.is_rotation());
    assert_eq!(received.from_prior.as_ref().map(|c| c.iss.as_str()), Some(CHARLIE_DID));
    assert_eq!(received.from_prior_jwt, None);
    assert_eq!(metadata.from_prior_issuer_kid.as_deref(), Some(CHARLIE_AUTH));
    Ok(())
}

#[test]
fn plaintext_rotation_carries_a_jwt_on_the_wire() -> Result<(), Error> {
    // Arrange
    let dids = example_did_resolver();
    let message = rotation_message();

    // Act
    let packed = message.pack_plaintext(&dids, &rotating_sender_secrets())?;
    let wire: Value = serde_json::from_str(&packed).unwrap();
    let (received, metadata) = Message::unpack(&packed, &dids, &bob_secrets_resolver())?;

    // Assert
    // three segment compact JWT, not the claims object
    let jwt = wire["from_prior"].as_str().unwrap();
    assert_eq!(jwt.split('.').count(), 3);
    assert_eq!(message, received);
    assert_eq!(metadata.from_prior_issuer_kid.as_deref(), Some(CHARLIE_AUTH));
    Ok(())
}

#[test]
fn issuer_key_can_be_pinned_explicitly() -> Result<(), Error> {
    // Arrange
    let dids = example_did_resolver();
    let message = rotation_message();

    // Act
    let (staged, issuer_kid) =
        message.pack_from_prior(Some(CHARLIE_AUTH), &dids, &rotating_sender_secrets())?;
    let (restored, verified_kid) = staged.unpack_from_prior(&dids, &bob_secrets_resolver())?;

    // Assert
    assert_eq!(issuer_kid.as_deref(), Some(CHARLIE_AUTH));
    assert!(staged.from_prior.is_none());
    assert!(staged.from_prior_jwt.is_some());
    assert_eq!(restored.from_prior, message.from_prior);
    assert_eq!(verified_kid.as_deref(), Some(CHARLIE_AUTH));
    Ok(())
}

#[test]
fn rotation_needs_the_prior_secret() {
    // Arrange
    let dids = example_did_resolver();
    let message = rotation_message();

    // Act: alice holds no charlie key, so the rotation JWT cannot be issued
    let packed = message.pack_plaintext(&dids, &alice_secrets_resolver());

    // Assert
    assert!(matches!(packed, Err(Error::SecretNotFound(_))));
}
