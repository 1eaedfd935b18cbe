use std::collections::HashMap;

use serde_json::Value;

/// JSON Web Key as carried in DID document verification material, secrets
/// and JWE protected headers (`epk`).
///
/// Only the members this crate reads are modeled explicitly; anything else
/// a document carries survives round-trips through `other`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Jwk {
    #[serde(default)]
    pub kty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,
    #[serde(flatten)]
    pub other: HashMap<String, Value>,
}

impl Jwk {
    /// Creates an `epk` entry for a JWE protected header.
    /// Correctness of the coordinate is the caller's concern.
    pub fn ephemeral(crv: impl Into<String>, x: impl Into<String>) -> Self {
        Jwk {
            kty: "OKP".into(),
            crv: Some(crv.into()),
            x: Some(x.into()),
            ..Default::default()
        }
    }
}
