//! The deduplicating access point table.
//!
//! Reconciles raw backend observations, in which several broadcasters may
//! advertise the same identity, into a stable set of one record per
//! identity. Records keep their position across reconcile passes so that
//! snapshot consumers see a steady ordering.

use log::debug;

use crate::access_point::AccessPointRecord;
use crate::backend::ApObservation;
use crate::known::KnownNetworkIndex;
use crate::ledger::FailureLedger;

/// Outcome of one reconcile pass.
#[derive(Debug, Default)]
pub(crate) struct ReconcileReport {
    /// Any record field or derived flag actually changed value.
    pub any_field_changed: bool,
    /// Identities whose stored credentials were invalidated because the
    /// network's security parameters changed while the record was known.
    pub invalidated: Vec<String>,
}

/// Deduplicated, identity-keyed collection of visible networks.
#[derive(Debug, Default)]
pub struct AccessPointTable {
    records: Vec<AccessPointRecord>,
}

impl AccessPointTable {
    pub fn records(&self) -> &[AccessPointRecord] {
        &self.records
    }

    pub fn get(&self, identity: &str) -> Option<&AccessPointRecord> {
        self.records.iter().find(|r| r.identity == identity)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Reconciles the table against a raw observation list.
    ///
    /// For each distinct identity the best broadcaster wins: an
    /// active-flagged one beats everything, otherwise the strongest signal,
    /// with ties broken by first-seen order. Identities no longer observed
    /// are removed, new ones inserted, surviving ones refreshed in place.
    /// The final step re-derives the `active` and `known` flags for every
    /// record.
    pub(crate) fn reconcile(
        &mut self,
        observations: &[ApObservation],
        active_identity: Option<&str>,
        known: &KnownNetworkIndex,
        ledger: &FailureLedger,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        let best = select_best(observations);

        // Drop records whose identity disappeared.
        let before = self.records.len();
        self.records
            .retain(|r| best.iter().any(|o| o.identity == r.identity));
        if self.records.len() != before {
            report.any_field_changed = true;
        }

        // Refresh survivors, insert newcomers.
        for obs in &best {
            match self.records.iter_mut().find(|r| r.identity == obs.identity) {
                Some(rec) => {
                    let was_known = rec.known;
                    let delta = rec.refresh(obs);
                    report.any_field_changed |= delta.changed;
                    if delta.security_flipped && was_known {
                        // Stored credentials no longer match the network's
                        // security parameters.
                        debug!(
                            "security parameters changed for known network '{}'",
                            rec.identity
                        );
                        rec.set_known(false);
                        report.invalidated.push(rec.identity.clone());
                    }
                }
                None => {
                    self.records.push(AccessPointRecord::new(obs));
                    report.any_field_changed = true;
                }
            }
        }

        // Re-derive flags for every record, changed or not: the active
        // network and the profile set may have moved independently of the
        // observation data.
        for rec in &mut self.records {
            let is_active = active_identity == Some(rec.identity.as_str())
                && !ledger.contains(&rec.identity);
            report.any_field_changed |= rec.set_active(is_active);

            let is_known = known.matches(&rec.identity, rec.secure);
            report.any_field_changed |= rec.set_known(is_known);
        }

        report
    }

    /// Re-derives only the `active` flags, for active-connection changes
    /// that arrive without a new observation set. Returns whether any flag
    /// changed.
    pub(crate) fn derive_active(
        &mut self,
        active_identity: Option<&str>,
        ledger: &FailureLedger,
    ) -> bool {
        let mut changed = false;
        for rec in &mut self.records {
            let is_active = active_identity == Some(rec.identity.as_str())
                && !ledger.contains(&rec.identity);
            changed |= rec.set_active(is_active);
        }
        changed
    }

    /// Re-derives only the `known` flags after an index rebuild. Returns
    /// whether any flag changed.
    pub(crate) fn derive_known(&mut self, known: &KnownNetworkIndex) -> bool {
        let mut changed = false;
        for rec in &mut self.records {
            changed |= rec.set_known(known.matches(&rec.identity, rec.secure));
        }
        changed
    }

    /// Identity of the record currently flagged active, if any.
    pub(crate) fn active_identity(&self) -> Option<String> {
        self.records
            .iter()
            .find(|r| r.active)
            .map(|r| r.identity.clone())
    }

    pub(crate) fn to_snapshot(&self) -> Vec<AccessPointRecord> {
        self.records().to_vec()
    }
}

/// Selects the single best observation per identity, preserving first-seen
/// order across identities.
fn select_best(observations: &[ApObservation]) -> Vec<ApObservation> {
    let mut best: Vec<ApObservation> = Vec::new();

    for obs in observations {
        if obs.identity.is_empty() {
            continue;
        }
        match best.iter_mut().find(|b| b.identity == obs.identity) {
            None => best.push(obs.clone()),
            Some(current) => {
                if obs.active && !current.active {
                    *current = obs.clone();
                } else if !current.active && obs.strength > current.strength {
                    *current = obs.clone();
                }
            }
        }
    }

    best
}
