use std::collections::HashSet;

use crate::Secret;

/// Access seam to the local party's key store.
pub trait SecretsResolver {
    /// Looks up a single secret by key id.
    fn find_key(&self, kid: &str) -> Option<Secret>;

    /// Returns the subset of `kids` actually held.
    ///
    /// This powers the skip-unknowns scans: a kid absent from the result
    /// means "not ours" and the scan moves on, it never fails the call.
    fn find_keys(&self, kids: &[String]) -> HashSet<String>;
}

/// In-memory resolver over a fixed set of secrets, for tests and examples.
#[derive(Debug, Clone, Default)]
pub struct ExampleSecretsResolver {
    known: Vec<Secret>,
}

impl ExampleSecretsResolver {
    pub fn new(known: Vec<Secret>) -> Self {
        ExampleSecretsResolver { known }
    }
}

impl SecretsResolver for ExampleSecretsResolver {
    fn find_key(&self, kid: &str) -> Option<Secret> {
        self.known.iter().find(|secret| secret.kid == kid).cloned()
    }

    fn find_keys(&self, kids: &[String]) -> HashSet<String> {
        kids.iter()
            .filter(|kid| self.known.iter().any(|secret| &secret.kid == *kid))
            .cloned()
            .collect()
    }
}
