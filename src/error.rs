#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("DID document not resolved: {0}")]
    DidDocNotResolved(String),
    #[error("DID URL not found: {0}")]
    DidUrlNotFound(String),
    #[error("malformed DID document: {0}")]
    DidDoc(String),
    #[error("secret not found: {0}")]
    SecretNotFound(String),
    #[error("no compatible crypto: {0}")]
    IncompatibleCrypto(String),
    #[error("unsupported verification method type: {0}")]
    UnsupportedVerificationMethodType(String),
    #[error("unsupported verification material format: {0}")]
    UnsupportedVerificationMethodMaterialFormat(String),
    #[error("unsupported secret type: {0}")]
    UnsupportedSecretType(String),
    #[error("unsupported secret material format: {0}")]
    UnsupportedSecretMaterialFormat(String),
    #[error("unsupported curve: {0}")]
    UnsupportedCurve(String),
    #[error("unsupported JWK: {0}")]
    UnsupportedJwk(String),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("malformed message: {0}")]
    MalformedMessage(String),
    #[error("illegal argument: {0}")]
    IllegalArgument(String),
}
