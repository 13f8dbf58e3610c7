//! Ledger of networks whose last connection attempt failed authentication.

use std::collections::HashSet;

/// Identities whose most recent connection attempt is known to have failed
/// authentication.
///
/// Consulted when deriving a record's `active` flag so that a
/// backend-reported "activated" state for a network with known-bad
/// credentials is not surfaced as active. An entry is cleared whenever a
/// new attempt for that identity begins.
#[derive(Debug, Default)]
pub struct FailureLedger {
    failed: HashSet<String>,
}

impl FailureLedger {
    pub fn mark(&mut self, identity: &str) {
        self.failed.insert(identity.to_owned());
    }

    pub fn clear(&mut self, identity: &str) {
        self.failed.remove(identity);
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.failed.contains(identity)
    }
}
