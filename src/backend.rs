//! The wireless backend capability.
//!
//! Everything the service needs from the underlying wireless management
//! subsystem is expressed through the [`WifiBackend`] trait: device and
//! access-point enumeration, scan requests, profile management, activation
//! calls, and a stream of change signals. The production implementation
//! talks to NetworkManager over D-Bus ([`crate::nm::NmBackend`]); tests
//! substitute an in-memory backend.

use async_trait::async_trait;
use bitflags::bitflags;
use tokio::sync::mpsc;

use crate::Result;
use crate::constants::security_flags;
use crate::models::{ActiveConnectionState, DeviceState, SecurityShape, StateReason};

bitflags! {
    /// 802.11 access point security flag word, folded from the AP's
    /// general, WPA and RSN flag properties.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SecurityFlags: u32 {
        const PRIVACY = security_flags::PRIVACY;
        const PSK = security_flags::PSK;
        const EAP = security_flags::EAP;
    }
}

impl SecurityFlags {
    /// Whether the access point requires any form of authentication.
    pub fn secured(&self) -> bool {
        !self.is_empty()
    }
}

/// One raw broadcaster observation from a backend scan.
///
/// Identities may repeat across observations (multiple radios advertising
/// the same network name); the table reconciles them down to one record
/// per identity.
#[derive(Debug, Clone)]
pub struct ApObservation {
    /// Human-readable network name (SSID), the dedup/match key.
    pub identity: String,
    /// Hardware address (BSSID) of this broadcaster.
    pub hw_address: String,
    /// Signal strength, 0-100.
    pub strength: u8,
    /// Operating frequency in MHz.
    pub frequency: u32,
    pub security: SecurityFlags,
    /// Whether this broadcaster is the device's currently active one.
    pub active: bool,
}

/// A stored connection profile as seen by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileInfo {
    pub identity: String,
    pub shape: SecurityShape,
}

/// Specification for a profile to be created and activated in one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSpec {
    pub identity: String,
    pub shape: SecurityShape,
    /// Pre-shared key; `None` for open networks.
    pub psk: Option<String>,
}

/// Opaque handle to an activation started by the backend.
#[derive(Debug, Clone)]
pub struct ActivationHandle(pub String);

/// Wi-Fi device state and the reason for its last transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceStatus {
    pub state: DeviceState,
    pub reason: StateReason,
}

/// Change notifications pushed by the backend.
#[derive(Debug, Clone)]
pub enum BackendSignal {
    DeviceAdded,
    DeviceRemoved,
    /// An access point appeared or disappeared.
    AccessPointsChanged,
    WirelessEnabledChanged(bool),
    ActiveConnectionsChanged,
    /// A stored profile was added or removed.
    ProfilesChanged,
    DeviceStateChanged(DeviceStatus),
}

/// Abstract wireless management capability.
///
/// All methods are asynchronous; activation calls return as soon as the
/// backend has accepted the request, with the actual outcome determined
/// later by the service's staged verification checks.
#[async_trait]
pub trait WifiBackend: Send + Sync + 'static {
    /// Whether a usable Wi-Fi device is present at all.
    async fn wifi_available(&self) -> bool;

    /// Raw broadcaster observations from the Wi-Fi device.
    async fn list_access_points(&self) -> Result<Vec<ApObservation>>;

    /// Requests a scan and waits for results to settle.
    async fn request_scan(&self) -> Result<()>;

    /// Identity of the device's currently active broadcaster.
    async fn active_identity(&self) -> Result<Option<String>>;

    /// Identities and activation states of all active connections.
    async fn active_connections(&self) -> Result<Vec<(String, ActiveConnectionState)>>;

    /// All stored wireless connection profiles.
    async fn list_profiles(&self) -> Result<Vec<ProfileInfo>>;

    /// Activates the stored profile for `identity`.
    async fn activate_profile(&self, identity: &str) -> Result<ActivationHandle>;

    /// Creates a profile from `spec` and activates it in one step.
    async fn add_and_activate(&self, spec: ProfileSpec) -> Result<ActivationHandle>;

    /// Deactivates whichever active connection owns the Wi-Fi device.
    async fn deactivate_active(&self) -> Result<()>;

    /// Deletes all stored profiles for `identity`.
    async fn delete_profile(&self, identity: &str) -> Result<()>;

    /// Wi-Fi device state and last transition reason.
    async fn device_status(&self) -> Result<DeviceStatus>;

    async fn wifi_enabled(&self) -> Result<bool>;

    async fn set_wifi_enabled(&self, enabled: bool) -> Result<()>;

    /// Whether an ethernet device is present and activated.
    async fn ethernet_present(&self) -> Result<bool>;

    /// Subscribes to backend change signals.
    async fn signals(&self) -> Result<mpsc::UnboundedReceiver<BackendSignal>>;
}
