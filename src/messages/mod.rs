mod helpers;
mod jwe;
mod jwk;
mod jws;
mod message;
mod pack;
mod prior_claims;
mod types;
mod unpack;

pub use jwe::*;
pub use jwk::*;
pub use jws::*;
pub use message::*;
pub use pack::*;
pub use prior_claims::*;
pub use types::*;
pub use unpack::*;
