use crate::DidDocument;

/// Resolution seam between the envelope layer and whatever DID methods the
/// application supports.
///
/// An unknown DID is an absence, not an error; the key selectors translate
/// absence into `Error::DidDocNotResolved` themselves.
pub trait DidResolver {
    fn resolve(&self, did: &str) -> Option<DidDocument>;
}

/// In-memory resolver over a fixed set of documents, for tests, examples
/// and statically configured peers.
#[derive(Debug, Clone, Default)]
pub struct ExampleDidResolver {
    known: Vec<DidDocument>,
}

impl ExampleDidResolver {
    pub fn new(known: Vec<DidDocument>) -> Self {
        ExampleDidResolver { known }
    }
}

impl DidResolver for ExampleDidResolver {
    fn resolve(&self, did: &str) -> Option<DidDocument> {
        self.known.iter().find(|doc| doc.did == did).cloned()
    }
}
