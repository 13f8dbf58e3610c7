//! Connection attempt lifecycle tracking.
//!
//! One attempt at a time. Each attempt carries a sequence number; timers
//! and activation results arriving with a stale sequence for the same
//! identity are discarded, while results tagged with a different identity
//! remain scoped to that identity.

use std::time::Duration;

use crate::models::{DeviceState, SecurityShape, StateReason};

/// Where an attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptPhase {
    /// Activation request sent, acknowledgement pending.
    Activating,
    /// Activation acknowledged, first check scheduled.
    AwaitingEarlyVerification,
    /// First check passed without a hard failure, second check scheduled.
    AwaitingLateVerification,
    /// Provisional success announced, final re-check scheduled.
    AwaitingDelayedVerification,
    Resolved,
}

/// The verification checks, in firing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyStage {
    Early,
    Late,
    Delayed,
}

impl VerifyStage {
    /// Delay between the previous stage and this one.
    pub fn delay(&self) -> Duration {
        match self {
            VerifyStage::Early => crate::constants::timeouts::early_verify_delay(),
            VerifyStage::Late => crate::constants::timeouts::late_verify_delay(),
            VerifyStage::Delayed => crate::constants::timeouts::delayed_verify_delay(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionAttempt {
    pub identity: String,
    pub seq: u64,
    pub phase: AttemptPhase,
}

/// What to do with a connect request, given what we know about the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeginDecision {
    /// Secure network, nothing saved, no password given. Nothing to try.
    Reject,
    /// A trustworthy saved profile exists; re-activate it.
    ActivateSaved,
    /// Build a fresh profile and activate it, optionally deleting a stale
    /// saved one first.
    RebuildFresh { delete_existing: bool },
    /// Credentials are needed before anything can be activated.
    PasswordRequired { delete_existing: bool },
}

/// Serializes connection attempts and stamps them with sequence numbers.
#[derive(Debug, Default)]
pub struct ConnectionAttemptController {
    current: Option<ConnectionAttempt>,
    next_seq: u64,
}

impl ConnectionAttemptController {
    /// Starts a new attempt, superseding any in-flight one.
    pub fn begin(&mut self, identity: &str) -> u64 {
        self.next_seq += 1;
        self.current = Some(ConnectionAttempt {
            identity: identity.to_owned(),
            seq: self.next_seq,
            phase: AttemptPhase::Activating,
        });
        self.next_seq
    }

    pub fn current(&self) -> Option<&ConnectionAttempt> {
        self.current.as_ref()
    }

    /// Whether the attempt tagged (identity, seq) has been superseded by a
    /// newer attempt for the same identity. Tags for a different identity
    /// are never superseded here; they stay scoped to their own identity.
    pub fn is_superseded(&self, identity: &str, seq: u64) -> bool {
        match &self.current {
            Some(a) => a.identity == identity && a.seq != seq,
            None => false,
        }
    }

    /// Whether (identity, seq) still names the live attempt.
    pub fn is_current(&self, identity: &str, seq: u64) -> bool {
        self.current
            .as_ref()
            .is_some_and(|a| a.identity == identity && a.seq == seq && a.phase != AttemptPhase::Resolved)
    }

    /// Advances the live attempt's phase. No-op if seq is stale.
    pub fn advance(&mut self, seq: u64, phase: AttemptPhase) {
        if let Some(a) = &mut self.current {
            if a.seq == seq {
                a.phase = phase;
            }
        }
    }

    /// Marks the attempt with this sequence number resolved.
    pub fn resolve(&mut self, seq: u64) {
        if let Some(a) = &mut self.current {
            if a.seq == seq {
                a.phase = AttemptPhase::Resolved;
            }
        }
    }

    /// Whether an unresolved attempt for this identity is in flight.
    pub fn tracking(&self, identity: &str) -> bool {
        self.current
            .as_ref()
            .is_some_and(|a| a.identity == identity && a.phase != AttemptPhase::Resolved)
    }

    /// Whether any unresolved attempt is in flight.
    pub fn busy(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|a| a.phase != AttemptPhase::Resolved)
    }
}

/// Decides how to begin an attempt from the target's security, its known
/// status, any saved profile's shape, and the supplied password.
pub fn decide(
    secure: bool,
    known: bool,
    saved_shape: Option<SecurityShape>,
    password: &str,
) -> BeginDecision {
    if !password.is_empty() {
        // A fresh password always wins over whatever is saved.
        return BeginDecision::RebuildFresh {
            delete_existing: saved_shape.is_some(),
        };
    }

    match saved_shape {
        Some(shape) if shape == SecurityShape::for_secure(secure) => BeginDecision::ActivateSaved,
        Some(_) => {
            // Saved profile's shape no longer matches the network. For a
            // now-open network the stale secured profile just gets rebuilt;
            // a now-secured network needs credentials first.
            if secure {
                BeginDecision::PasswordRequired {
                    delete_existing: true,
                }
            } else {
                BeginDecision::RebuildFresh {
                    delete_existing: true,
                }
            }
        }
        None => {
            if !secure {
                BeginDecision::RebuildFresh {
                    delete_existing: false,
                }
            } else if known {
                // Index says known but no profile was found when asked.
                // The index is stale; fall back to asking for credentials.
                BeginDecision::PasswordRequired {
                    delete_existing: false,
                }
            } else {
                BeginDecision::Reject
            }
        }
    }
}

/// Whether a (state, reason) pair at the early check already proves the
/// attempt dead.
pub fn early_failure(state: DeviceState, reason: StateReason) -> bool {
    matches!(
        state,
        DeviceState::Failed | DeviceState::NeedAuth | DeviceState::Disconnected
    ) || matches!(
        reason,
        StateReason::NoSecrets
            | StateReason::SupplicantDisconnected
            | StateReason::SupplicantConfigFailed
            | StateReason::SupplicantTimeout
    )
}

/// Whether a transition reason points at authentication rather than
/// infrastructure.
pub fn auth_related(reason: StateReason) -> bool {
    matches!(
        reason,
        StateReason::NoSecrets
            | StateReason::SupplicantDisconnected
            | StateReason::SupplicantConfigFailed
            | StateReason::SupplicantFailed
            | StateReason::SupplicantTimeout
    )
}

/// Maps a failed attempt's final (state, reason) pair to a human-readable
/// cause.
pub fn classify_failure(state: DeviceState, reason: StateReason) -> &'static str {
    match (state, reason) {
        (DeviceState::Failed, StateReason::NoSecrets) => "incorrect credentials",
        (DeviceState::Disconnected, StateReason::NoSecrets) => "incorrect credentials",
        (DeviceState::NeedAuth, _) => "incorrect credentials",
        (DeviceState::Config, StateReason::SupplicantTimeout) => {
            "incorrect credentials or timeout"
        }
        (DeviceState::IpConfig, _) => "acquiring address, network congested",
        _ => "authentication failed or timed out",
    }
}

/// Reason attached to a failure detected by the early check, which only
/// fires on unambiguous authentication or supplicant trouble.
pub const EARLY_FAILURE_REASON: &str = "incorrect credentials";

/// Reason attached to a failure detected only by the delayed re-check,
/// after a provisional success was already announced.
pub const DELAYED_DROP_REASON: &str = "authentication failed: incorrect credentials";
