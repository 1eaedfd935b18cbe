#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;

pub mod crypto;
mod dids;
mod error;
mod keys;
mod messages;
mod result;
mod secrets;

pub use crypto::{CryptoAlgorithm, SignatureAlgorithm};
pub use dids::resolver::{DidResolver, ExampleDidResolver};
pub use dids::url::{is_did, is_did_url, split_did_url};
pub use dids::{DidDocument, VerificationMaterial, VerificationMethod, VerificationMethodType};
pub use error::*;
pub use keys::recipient::RecipientKeySelector;
pub use keys::sender::SenderKeySelector;
pub use keys::{Curve, PrivateKey, PublicKey};
pub use messages::*;
pub use result::Result;
pub use secrets::resolver::{ExampleSecretsResolver, SecretsResolver};
pub use secrets::{Secret, SecretMaterial, SecretType};
