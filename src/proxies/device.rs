//! NetworkManager Device proxy.

use zbus::{Result, proxy};

/// Proxy for the NetworkManager device interface.
///
/// Provides access to device properties like interface name, type, state,
/// and the reason for state transitions.
#[proxy(
    interface = "org.freedesktop.NetworkManager.Device",
    default_service = "org.freedesktop.NetworkManager"
)]
pub trait NMDevice {
    /// The network interface name (e.g., "wlan0").
    #[zbus(property)]
    fn interface(&self) -> Result<String>;

    /// Device type as a numeric code (2 = Wi-Fi).
    #[zbus(property)]
    fn device_type(&self) -> Result<u32>;

    /// Current device state (100 = activated, 120 = failed).
    #[zbus(property)]
    fn state(&self) -> Result<u32>;

    /// Current state and reason code for the last state change.
    #[zbus(property)]
    fn state_reason(&self) -> Result<(u32, u32)>;

    /// Signal emitted when device state changes.
    ///
    /// The method is named `device_state_changed` to avoid conflicts with the
    /// `state` property's change stream. Use `receive_device_state_changed()`
    /// to subscribe to this signal.
    #[zbus(signal, name = "StateChanged")]
    fn device_state_changed(&self, new_state: u32, old_state: u32, reason: u32);
}
