//! NetworkManager AccessPoint proxy.

use zbus::{Result, proxy};

/// Proxy for access point objects.
#[proxy(
    interface = "org.freedesktop.NetworkManager.AccessPoint",
    default_service = "org.freedesktop.NetworkManager"
)]
pub trait NMAccessPoint {
    /// Raw SSID bytes (may not be valid UTF-8).
    #[zbus(property)]
    fn ssid(&self) -> Result<Vec<u8>>;

    /// Signal strength, 0-100.
    #[zbus(property)]
    fn strength(&self) -> Result<u8>;

    /// Hardware address (BSSID) of this access point.
    #[zbus(property)]
    fn hw_address(&self) -> Result<String>;

    /// Radio frequency in MHz.
    #[zbus(property)]
    fn frequency(&self) -> Result<u32>;

    /// General capability flags (bit 0 = privacy).
    #[zbus(property)]
    fn flags(&self) -> Result<u32>;

    /// WPA (legacy) security flags.
    #[zbus(property)]
    fn wpa_flags(&self) -> Result<u32>;

    /// RSN (WPA2/WPA3) security flags.
    #[zbus(property)]
    fn rsn_flags(&self) -> Result<u32>;
}
