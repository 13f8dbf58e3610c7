use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

use crate::access_point::AccessPointRecord;

/// NetworkManager device states.
///
/// These values represent the lifecycle states of a network device as
/// reported by the NM D-Bus API. The intermediate activation states
/// (`Config`, `NeedAuth`, `IpConfig`) matter here because the staged
/// verification checks classify failures from the (state, reason) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Unmanaged,
    Unavailable,
    Disconnected,
    /// Preparing to connect.
    Prepare,
    /// Configuring the supplicant / associating.
    Config,
    /// Waiting for secrets (password) from an agent.
    NeedAuth,
    /// Requesting an IP address.
    IpConfig,
    /// Checking whether the network is reachable.
    IpCheck,
    /// Waiting on secondary connections.
    Secondaries,
    /// Fully connected.
    Activated,
    Deactivating,
    Failed,
    /// Unknown state code not mapped to a specific variant.
    Other(u32),
}

impl From<u32> for DeviceState {
    fn from(code: u32) -> Self {
        match code {
            10 => Self::Unmanaged,
            20 => Self::Unavailable,
            30 => Self::Disconnected,
            40 => Self::Prepare,
            50 => Self::Config,
            60 => Self::NeedAuth,
            70 => Self::IpConfig,
            80 => Self::IpCheck,
            90 => Self::Secondaries,
            100 => Self::Activated,
            110 => Self::Deactivating,
            120 => Self::Failed,
            v => Self::Other(v),
        }
    }
}

impl Display for DeviceState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unmanaged => write!(f, "unmanaged"),
            Self::Unavailable => write!(f, "unavailable"),
            Self::Disconnected => write!(f, "disconnected"),
            Self::Prepare => write!(f, "preparing"),
            Self::Config => write!(f, "configuring"),
            Self::NeedAuth => write!(f, "need-auth"),
            Self::IpConfig => write!(f, "ip-config"),
            Self::IpCheck => write!(f, "ip-check"),
            Self::Secondaries => write!(f, "secondaries"),
            Self::Activated => write!(f, "activated"),
            Self::Deactivating => write!(f, "deactivating"),
            Self::Failed => write!(f, "failed"),
            Self::Other(v) => write!(f, "unknown state ({v})"),
        }
    }
}

/// NetworkManager device state reason codes.
///
/// Indicates why a device transitioned to its current state. Only the
/// codes relevant to Wi-Fi association and authentication are mapped;
/// everything else falls through to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateReason {
    None,
    Unknown,
    NowManaged,
    NowUnmanaged,
    ConfigFailed,
    /// No secrets (password) were available for the connection.
    NoSecrets,
    /// The supplicant dropped the association.
    SupplicantDisconnected,
    /// The supplicant rejected the configuration.
    SupplicantConfigFailed,
    /// The supplicant failed outright.
    SupplicantFailed,
    /// The supplicant timed out during authentication.
    SupplicantTimeout,
    DhcpStartFailed,
    DhcpError,
    DhcpFailed,
    DeviceRemoved,
    Sleeping,
    ConnectionRemoved,
    UserRequested,
    CarrierChanged,
    SupplicantAvailable,
    SsidNotFound,
    /// Unknown reason code not mapped to a specific variant.
    Other(u32),
}

impl From<u32> for StateReason {
    fn from(code: u32) -> Self {
        match code {
            0 => Self::None,
            1 => Self::Unknown,
            2 => Self::NowManaged,
            3 => Self::NowUnmanaged,
            4 => Self::ConfigFailed,
            7 => Self::NoSecrets,
            8 => Self::SupplicantDisconnected,
            9 => Self::SupplicantConfigFailed,
            10 => Self::SupplicantFailed,
            11 => Self::SupplicantTimeout,
            15 => Self::DhcpStartFailed,
            16 => Self::DhcpError,
            17 => Self::DhcpFailed,
            36 => Self::DeviceRemoved,
            37 => Self::Sleeping,
            38 => Self::ConnectionRemoved,
            39 => Self::UserRequested,
            40 => Self::CarrierChanged,
            42 => Self::SupplicantAvailable,
            53 => Self::SsidNotFound,
            v => Self::Other(v),
        }
    }
}

impl Display for StateReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Unknown => write!(f, "unknown"),
            Self::NowManaged => write!(f, "device is now managed"),
            Self::NowUnmanaged => write!(f, "device is now unmanaged"),
            Self::ConfigFailed => write!(f, "configuration failed"),
            Self::NoSecrets => write!(f, "no secrets (password) provided"),
            Self::SupplicantDisconnected => write!(f, "supplicant disconnected"),
            Self::SupplicantConfigFailed => write!(f, "supplicant config failed"),
            Self::SupplicantFailed => write!(f, "supplicant failed"),
            Self::SupplicantTimeout => write!(f, "supplicant timeout"),
            Self::DhcpStartFailed => write!(f, "DHCP start failed"),
            Self::DhcpError => write!(f, "DHCP error"),
            Self::DhcpFailed => write!(f, "DHCP failed"),
            Self::DeviceRemoved => write!(f, "device removed"),
            Self::Sleeping => write!(f, "sleeping"),
            Self::ConnectionRemoved => write!(f, "connection removed"),
            Self::UserRequested => write!(f, "user requested"),
            Self::CarrierChanged => write!(f, "carrier changed"),
            Self::SupplicantAvailable => write!(f, "supplicant available"),
            Self::SsidNotFound => write!(f, "SSID not found"),
            Self::Other(v) => write!(f, "unknown reason ({v})"),
        }
    }
}

/// NetworkManager active connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveConnectionState {
    Unknown,
    Activating,
    Activated,
    Deactivating,
    Deactivated,
    Other(u32),
}

impl From<u32> for ActiveConnectionState {
    fn from(code: u32) -> Self {
        match code {
            0 => Self::Unknown,
            1 => Self::Activating,
            2 => Self::Activated,
            3 => Self::Deactivating,
            4 => Self::Deactivated,
            v => Self::Other(v),
        }
    }
}

impl Display for ActiveConnectionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Activating => write!(f, "activating"),
            Self::Activated => write!(f, "activated"),
            Self::Deactivating => write!(f, "deactivating"),
            Self::Deactivated => write!(f, "deactivated"),
            Self::Other(v) => write!(f, "unknown state ({v})"),
        }
    }
}

/// Security shape of a stored connection profile or a visible network.
///
/// A stored profile is only trustworthy while its shape matches the
/// network's observed security; a mismatch means the network's security
/// parameters changed since the profile was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityShape {
    Open,
    WpaPsk,
}

impl SecurityShape {
    pub fn secured(&self) -> bool {
        matches!(self, SecurityShape::WpaPsk)
    }

    /// Shape a fresh profile must take for a network with this security flag.
    pub fn for_secure(secure: bool) -> Self {
        if secure {
            SecurityShape::WpaPsk
        } else {
            SecurityShape::Open
        }
    }
}

/// Errors that can occur during service and backend operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A D-Bus communication error occurred.
    #[error("D-Bus error: {0}")]
    Dbus(#[from] zbus::Error),

    /// No Wi-Fi device was found on the system.
    #[error("no Wi-Fi device found")]
    NoWifiDevice,

    /// The wireless backend could not be reached at all.
    #[error("wireless backend unavailable")]
    BackendUnavailable,

    /// The backend rejected an activation request outright.
    #[error("activation rejected: {0}")]
    Activation(String),

    /// No stored profile exists for the requested network.
    #[error("no saved profile for network")]
    NoSavedProfile,

    /// The service event loop has shut down.
    #[error("service loop stopped")]
    ServiceStopped,
}

/// State-change events emitted by the service.
///
/// Exactly one of `ConnectionSucceeded` or `ConnectionFailed` follows each
/// accepted connect request's activation phase, but a *second*
/// `ConnectionFailed` may arrive after a `ConnectionSucceeded` for the same
/// identity when the delayed re-verification detects that the link dropped
/// (almost always a post-association credential rejection). The later event
/// is authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent {
    /// The visible network table changed (emitted once per reconcile pass).
    NetworksChanged,
    /// The active network changed.
    ActiveChanged(Option<String>),
    /// A connection attempt reached the activated state and verified.
    ConnectionSucceeded(String),
    /// A connection attempt failed, with a human-readable reason.
    ConnectionFailed { identity: String, reason: String },
    /// Stored credentials are missing or no longer valid for this network.
    PasswordRequired(String),
}

/// Caller-visible snapshot of the service state.
///
/// Published atomically through a watch channel: readers always observe a
/// complete pre- or post-reconcile state, never a partially updated table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkState {
    /// Deduplicated visible networks, one record per identity.
    pub networks: Vec<AccessPointRecord>,
    /// Identity of the currently active network, if any.
    pub active: Option<String>,
    pub wifi_enabled: bool,
    pub ethernet_present: bool,
    pub scanning: bool,
    /// Identity of the most recent in-flight connection attempt.
    pub connecting_to: Option<String>,
}
