//! Addressing helpers for DIDs and DID URLs.
//!
//! A bare DID (`did:example:alice`) addresses a whole document and means
//! "search the relevant relationship list"; a DID URL with a fragment
//! (`did:example:alice#key-1`) pins one specific verification method.

use regex::Regex;

use crate::{Error, Result};

/// Returns `true` when `did_or_url` carries a fragment and therefore
/// addresses a single verification method.
pub fn is_did_url(did_or_url: &str) -> bool {
    did_or_url.contains('#')
}

/// Splits a DID URL into its DID part and optional fragment (without `#`).
///
/// A reference without a fragment is returned unchanged with `None`.
pub fn split_did_url(did_or_url: &str) -> (&str, Option<&str>) {
    match did_or_url.find('#') {
        Some(position) => (&did_or_url[..position], Some(&did_or_url[position + 1..])),
        None => (did_or_url, None),
    }
}

/// Checks `did` against the generic DID syntax.
pub fn is_did(did: &str) -> bool {
    let re = Regex::new(
        r"(?x)
        ^
        did              # scheme
        :
        [a-z0-9]+        # method
        :
        (?:[a-z0-9]*:)*  # optional subdomains, postfixed with a ':'
        [a-zA-Z0-9._-]+  # method specific identifier
        $
    ",
    )
    .unwrap();
    re.is_match(did)
}

/// Validates that `did_or_url` is a DID or DID URL, for pack/unpack inputs.
pub(crate) fn ensure_did(did_or_url: &str) -> Result<()> {
    let (did, _) = split_did_url(did_or_url);
    if is_did(did) {
        Ok(())
    } else {
        Err(Error::IllegalArgument(format!(
            "'{}' is not a DID or DID URL",
            did_or_url
        )))
    }
}
