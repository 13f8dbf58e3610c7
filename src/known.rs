//! Index of identities with stored connection profiles.

use std::collections::HashMap;

use crate::backend::ProfileInfo;
use crate::models::SecurityShape;

/// Identities for which the backend holds a wireless connection profile,
/// with each profile's security shape.
///
/// Rebuilt wholesale whenever the backend reports a profile added or
/// removed; never partially mutated.
#[derive(Debug, Default)]
pub struct KnownNetworkIndex {
    profiles: HashMap<String, SecurityShape>,
}

impl KnownNetworkIndex {
    /// Replaces the entire index from a fresh profile enumeration.
    pub fn rebuild(&mut self, profiles: Vec<ProfileInfo>) {
        self.profiles = profiles
            .into_iter()
            .map(|p| (p.identity, p.shape))
            .collect();
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.profiles.contains_key(identity)
    }

    /// Security shape of the stored profile, if one exists.
    pub fn shape(&self, identity: &str) -> Option<SecurityShape> {
        self.profiles.get(identity).copied()
    }

    /// Whether a stored profile exists whose shape matches the network's
    /// observed security. A mismatch means the profile is stale.
    pub fn matches(&self, identity: &str, secure: bool) -> bool {
        self.shape(identity)
            .is_some_and(|shape| shape.secured() == secure)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
