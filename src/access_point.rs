//! Deduplicated access point records.

use serde::Serialize;

use crate::backend::ApObservation;

/// Snapshot of one observed wireless network.
///
/// One record exists per visible identity; the record is updated in place
/// when a stronger or now-active broadcaster for the same identity appears,
/// so the identity is immutable for the record's lifetime while everything
/// else may be refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessPointRecord {
    pub identity: String,
    /// Hardware address of the broadcaster currently backing this record.
    pub hw_address: String,
    /// Signal strength, 0-100.
    pub strength: u8,
    /// Operating frequency in MHz (informational).
    pub frequency: u32,
    /// Whether the network requires authentication.
    pub secure: bool,
    /// Whether a trustworthy stored profile exists for this identity.
    pub known: bool,
    /// Whether this is the currently active network.
    pub active: bool,
}

/// What changed during an in-place refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RecordDelta {
    /// Any field changed value.
    pub changed: bool,
    /// The `secure` flag flipped, which invalidates stored credentials
    /// if the record was known.
    pub security_flipped: bool,
}

impl AccessPointRecord {
    pub(crate) fn new(obs: &ApObservation) -> Self {
        Self {
            identity: obs.identity.clone(),
            hw_address: obs.hw_address.clone(),
            strength: obs.strength,
            frequency: obs.frequency,
            secure: obs.security.secured(),
            known: false,
            active: false,
        }
    }

    /// Refreshes mutable fields from a new observation of the same identity.
    ///
    /// Only fields that actually changed count toward the delta; the
    /// `known` and `active` flags are derived separately by the table.
    pub(crate) fn refresh(&mut self, obs: &ApObservation) -> RecordDelta {
        debug_assert_eq!(self.identity, obs.identity);

        let mut delta = RecordDelta::default();

        if self.hw_address != obs.hw_address {
            self.hw_address = obs.hw_address.clone();
            delta.changed = true;
        }
        if self.strength != obs.strength {
            self.strength = obs.strength;
            delta.changed = true;
        }
        if self.frequency != obs.frequency {
            self.frequency = obs.frequency;
            delta.changed = true;
        }

        let secure = obs.security.secured();
        if self.secure != secure {
            self.secure = secure;
            delta.changed = true;
            delta.security_flipped = true;
        }

        delta
    }

    /// Sets the derived `known` flag, returning whether it changed.
    pub(crate) fn set_known(&mut self, known: bool) -> bool {
        if self.known != known {
            self.known = known;
            true
        } else {
            false
        }
    }

    /// Sets the derived `active` flag, returning whether it changed.
    pub(crate) fn set_active(&mut self, active: bool) -> bool {
        if self.active != active {
            self.active = active;
            true
        } else {
            false
        }
    }
}
