//! NetworkManager Settings proxies (profile store and single profiles).

use std::collections::HashMap;
use zbus::{Result, proxy};
use zvariant::OwnedObjectPath;

/// Proxy for the connection settings store.
#[proxy(
    interface = "org.freedesktop.NetworkManager.Settings",
    default_service = "org.freedesktop.NetworkManager",
    default_path = "/org/freedesktop/NetworkManager/Settings"
)]
pub trait NMSettings {
    /// Returns paths to all stored connection profiles.
    fn list_connections(&self) -> Result<Vec<OwnedObjectPath>>;

    /// Signal emitted when a profile is added.
    #[zbus(signal)]
    fn new_connection(&self, connection: OwnedObjectPath);

    /// Signal emitted when a profile is removed.
    #[zbus(signal)]
    fn connection_removed(&self, connection: OwnedObjectPath);
}

/// Proxy for one stored connection profile.
#[proxy(
    interface = "org.freedesktop.NetworkManager.Settings.Connection",
    default_service = "org.freedesktop.NetworkManager"
)]
pub trait NMSettingsConnection {
    /// Returns the profile's settings, without secrets.
    fn get_settings(
        &self,
    ) -> Result<HashMap<String, HashMap<String, zvariant::OwnedValue>>>;

    /// Deletes this profile.
    fn delete(&self) -> Result<()>;
}
