//! Constants for NetworkManager D-Bus codes and service timing.
//!
//! The verification delays are empirically chosen to race against the
//! supplicant's own timeouts; the ordering of the stages is the contract,
//! the exact values may need per-platform tuning.

/// NetworkManager device type constants.
pub mod device_type {
    pub const ETHERNET: u32 = 1;
    pub const WIFI: u32 = 2;
}

/// WiFi security flag constants (AP `Flags` / `WpaFlags` / `RsnFlags`).
pub mod security_flags {
    pub const PRIVACY: u32 = 0x1;
    pub const PSK: u32 = 0x0100;
    pub const EAP: u32 = 0x0200;
}

/// Timeout and delay constants.
pub mod timeouts {
    use std::time::Duration;

    /// Delay after activation is acknowledged before the first check.
    pub const EARLY_VERIFY_MS: u64 = 1_000;
    /// Further delay between the early and late checks.
    pub const LATE_VERIFY_MS: u64 = 2_000;
    /// Delay after a provisional success before the final re-check.
    pub const DELAYED_VERIFY_MS: u64 = 5_000;
    /// Settle delay between the two post-scan reconcile passes.
    pub const SCAN_SETTLE_MS: u64 = 1_000;
    /// Fixed wait for NetworkManager scan results to populate.
    pub const SCAN_WAIT_SECONDS: u64 = 3;

    pub fn early_verify_delay() -> Duration {
        Duration::from_millis(EARLY_VERIFY_MS)
    }

    pub fn late_verify_delay() -> Duration {
        Duration::from_millis(LATE_VERIFY_MS)
    }

    pub fn delayed_verify_delay() -> Duration {
        Duration::from_millis(DELAYED_VERIFY_MS)
    }

    pub fn scan_settle_delay() -> Duration {
        Duration::from_millis(SCAN_SETTLE_MS)
    }

    pub fn scan_wait() -> Duration {
        Duration::from_secs(SCAN_WAIT_SECONDS)
    }
}
