//! NetworkManager Active Connection proxy.

use zbus::{Result, proxy};
use zvariant::OwnedObjectPath;

/// Proxy for the active connection interface.
///
/// Provides access to the state of an active (in-progress or established)
/// network connection.
#[proxy(
    interface = "org.freedesktop.NetworkManager.Connection.Active",
    default_service = "org.freedesktop.NetworkManager"
)]
pub trait NMActiveConnection {
    /// Current state of the active connection (2 = activated).
    #[zbus(property)]
    fn state(&self) -> Result<u32>;

    /// Connection identifier (usually the SSID for Wi-Fi).
    #[zbus(property)]
    fn id(&self) -> Result<String>;

    /// Path to the connection settings used for this connection.
    #[zbus(property)]
    fn connection(&self) -> Result<OwnedObjectPath>;

    /// Paths to devices using this connection.
    #[zbus(property)]
    fn devices(&self) -> Result<Vec<OwnedObjectPath>>;

    /// Signal emitted when the connection activation state changes.
    ///
    /// The method is named `activation_state_changed` to avoid conflicts with
    /// the `state` property's change stream.
    #[zbus(signal, name = "StateChanged")]
    fn activation_state_changed(&self, state: u32, reason: u32);
}
