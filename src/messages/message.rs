use std::collections::HashMap;

use serde_json::Value;

use crate::messages::prior_claims::PriorClaims;

/// DIDComm plain message.
/// [Specification](https://identity.foundation/didcomm-messaging/spec/#message-structure)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,

    #[serde(rename = "type")]
    pub m_type: String,

    pub body: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub thid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pthid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_time: Option<u64>,

    /// Signed rotation JWT of the prior DID, as carried on the wire.
    #[serde(rename = "from_prior", default, skip_serializing_if = "Option::is_none")]
    pub from_prior_jwt: Option<String>,

    /// Rotation claims in unpacked form. Packing signs them into
    /// [`from_prior_jwt`](Message::from_prior_jwt); they never serialize as is.
    #[serde(skip)]
    pub from_prior: Option<PriorClaims>,

    /// Application defined headers, kept at the top level of the plain
    /// message next to the registered ones.
    #[serde(flatten, default, skip_serializing_if = "HashMap::is_empty")]
    pub custom_headers: HashMap<String, Value>,
}

impl Message {
    /// Starts a plain message of the given application `type` with a fresh
    /// random `id` and no routing headers set.
    pub fn new(m_type: &str, body: Value) -> Self {
        Message {
            id: uuid::Uuid::new_v4().to_string(),
            m_type: m_type.to_string(),
            body,
            from: None,
            to: vec![],
            thid: None,
            pthid: None,
            created_time: None,
            expires_time: None,
            from_prior_jwt: None,
            from_prior: None,
            custom_headers: HashMap::new(),
        }
    }

    /// Checks if message is a rotation one.
    /// Exposed for explicit checks on sdk level.
    pub fn is_rotation(&self) -> bool {
        self.from_prior.is_some() || self.from_prior_jwt.is_some()
    }

    pub fn from(mut self, from: &str) -> Self {
        self.from = Some(from.to_string());
        self
    }

    pub fn to(mut self, to: &[&str]) -> Self {
        self.to = to.iter().map(|recipient| recipient.to_string()).collect();
        self
    }

    pub fn thid(mut self, thid: &str) -> Self {
        self.thid = Some(thid.to_string());
        self
    }

    pub fn pthid(mut self, pthid: &str) -> Self {
        self.pthid = Some(pthid.to_string());
        self
    }

    /// Seconds from the UTC epoch the message was created at.
    pub fn created_time(mut self, created_time: u64) -> Self {
        self.created_time = Some(created_time);
        self
    }

    /// Seconds from the UTC epoch after which the recipient is to discard
    /// the message on receipt.
    pub fn expires_time(mut self, expires_time: u64) -> Self {
        self.expires_time = Some(expires_time);
        self
    }

    /// Adds (or updates) a custom header key-value pair. Empty keys are
    /// ignored.
    pub fn add_custom_header(mut self, key: &str, value: Value) -> Self {
        if key.is_empty() {
            return self;
        }
        self.custom_headers.insert(key.to_string(), value);
        self
    }

    /// Attaches rotation claims to be signed into the `from_prior` JWT on
    /// the next pack call.
    pub fn from_prior(mut self, claims: PriorClaims) -> Self {
        self.from_prior = Some(claims);
        self
    }
}
