//! NetworkManager-backed implementation of [`WifiBackend`].
//!
//! Talks to NetworkManager over the system D-Bus. Every method resolves the
//! Wi-Fi device fresh from `GetDevices` so that device removal and
//! re-insertion never leaves a stale object path behind.

use std::collections::HashMap;
use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};
use futures_timer::Delay;
use log::{debug, warn};
use tokio::sync::mpsc;
use zbus::Connection;
use zvariant::{OwnedObjectPath, OwnedValue};

use crate::Result;
use crate::backend::{
    ActivationHandle, ApObservation, BackendSignal, DeviceStatus, ProfileInfo, ProfileSpec,
    SecurityFlags, WifiBackend,
};
use crate::constants::{device_type, timeouts};
use crate::models::{ActiveConnectionState, SecurityShape, ServiceError};
use crate::profile_builder::build_profile;
use crate::proxies::{
    NMAccessPointProxy, NMActiveConnectionProxy, NMDeviceProxy, NMProxy, NMSettingsConnectionProxy,
    NMSettingsProxy, NMWirelessProxy,
};
use crate::utils::decode_ssid_or_empty;

/// Device state code for "activated".
const DEVICE_STATE_ACTIVATED: u32 = 100;

/// Production backend speaking to NetworkManager on the system bus.
pub struct NmBackend {
    conn: Connection,
}

impl NmBackend {
    /// Connects to the system bus.
    pub async fn connect() -> Result<Self> {
        let conn = Connection::system().await.map_err(|e| {
            warn!("System bus connection failed: {e}");
            ServiceError::BackendUnavailable
        })?;
        Ok(Self { conn })
    }

    /// Finds the first Wi-Fi device.
    async fn find_wifi_device(&self) -> Result<OwnedObjectPath> {
        let nm = NMProxy::new(&self.conn).await?;
        for dev_path in nm.get_devices().await? {
            let dev = NMDeviceProxy::builder(&self.conn)
                .path(dev_path.clone())?
                .build()
                .await?;
            if dev.device_type().await? == device_type::WIFI {
                return Ok(dev_path);
            }
        }
        Err(ServiceError::NoWifiDevice)
    }

    async fn wireless_proxy(&self, dev_path: &OwnedObjectPath) -> Result<NMWirelessProxy<'_>> {
        Ok(NMWirelessProxy::builder(&self.conn)
            .path(dev_path.clone())?
            .build()
            .await?)
    }

    /// Paths of all stored wireless profiles matching `identity`, by
    /// connection id or by SSID bytes.
    async fn profile_paths_for(&self, identity: &str) -> Result<Vec<OwnedObjectPath>> {
        let settings = NMSettingsProxy::new(&self.conn).await?;
        let mut matches = Vec::new();

        for cpath in settings.list_connections().await? {
            let cproxy = NMSettingsConnectionProxy::builder(&self.conn)
                .path(cpath.clone())?
                .build()
                .await?;
            let Ok(map) = cproxy.get_settings().await else {
                continue;
            };
            if let Some((id, _)) = wireless_profile_summary(&map)
                && id == identity
            {
                matches.push(cpath);
            }
        }

        Ok(matches)
    }

    /// Finds the access point object currently advertising `identity`, to
    /// pass as the activation's specific object. "/" lets NetworkManager
    /// pick one itself.
    async fn ap_path_for(
        &self,
        wifi: &NMWirelessProxy<'_>,
        identity: &str,
    ) -> Result<OwnedObjectPath> {
        for ap_path in wifi.get_all_access_points().await? {
            let ap = NMAccessPointProxy::builder(&self.conn)
                .path(ap_path.clone())?
                .build()
                .await?;
            if let Ok(bytes) = ap.ssid().await
                && decode_ssid_or_empty(&bytes) == identity
            {
                return Ok(ap_path);
            }
        }
        Ok(OwnedObjectPath::try_from("/").map_err(zbus::Error::from)?)
    }
}

/// Extracts (identity, shape) from a stored profile's settings map, or
/// `None` when the profile is not a wireless one.
fn wireless_profile_summary(
    map: &HashMap<String, HashMap<String, OwnedValue>>,
) -> Option<(String, SecurityShape)> {
    let wifi_sec = map.get("802-11-wireless")?;

    let mut identity = None;
    if let Some(conn_sec) = map.get("connection")
        && let Some(v) = conn_sec.get("id")
        && let Ok(id) = <OwnedValue as TryInto<String>>::try_into(v.clone())
    {
        identity = Some(id);
    }
    if identity.is_none()
        && let Some(v) = wifi_sec.get("ssid")
        && let Ok(bytes) = <OwnedValue as TryInto<Vec<u8>>>::try_into(v.clone())
    {
        let decoded = decode_ssid_or_empty(&bytes);
        if !decoded.is_empty() {
            identity = Some(decoded);
        }
    }

    let shape = if map.contains_key("802-11-wireless-security") {
        SecurityShape::WpaPsk
    } else {
        SecurityShape::Open
    };

    identity.map(|id| (id, shape))
}

#[async_trait]
impl WifiBackend for NmBackend {
    async fn wifi_available(&self) -> bool {
        self.find_wifi_device().await.is_ok()
    }

    async fn list_access_points(&self) -> Result<Vec<ApObservation>> {
        let dev_path = self.find_wifi_device().await?;
        let wifi = self.wireless_proxy(&dev_path).await?;

        let active_ap = wifi.active_access_point().await.ok();

        let mut observations = Vec::new();
        for ap_path in wifi.get_all_access_points().await? {
            let ap = NMAccessPointProxy::builder(&self.conn)
                .path(ap_path.clone())?
                .build()
                .await?;

            let Ok(ssid_bytes) = ap.ssid().await else {
                // The AP can vanish between enumeration and property read.
                continue;
            };
            let identity = decode_ssid_or_empty(&ssid_bytes);
            if identity.is_empty() {
                continue;
            }

            let flags = ap.flags().await.unwrap_or(0);
            let wpa = ap.wpa_flags().await.unwrap_or(0);
            let rsn = ap.rsn_flags().await.unwrap_or(0);
            let security = SecurityFlags::from_bits_truncate(flags | wpa | rsn);

            observations.push(ApObservation {
                identity,
                hw_address: ap.hw_address().await.unwrap_or_default(),
                strength: ap.strength().await.unwrap_or(0),
                frequency: ap.frequency().await.unwrap_or(0),
                security,
                active: active_ap.as_ref() == Some(&ap_path),
            });
        }

        Ok(observations)
    }

    async fn request_scan(&self) -> Result<()> {
        let dev_path = self.find_wifi_device().await?;
        let wifi = self.wireless_proxy(&dev_path).await?;

        wifi.request_scan(HashMap::new()).await?;
        // NetworkManager reports scan results asynchronously; give it a
        // fixed window to populate before the caller re-enumerates.
        Delay::new(timeouts::scan_wait()).await;
        Ok(())
    }

    async fn active_identity(&self) -> Result<Option<String>> {
        let dev_path = self.find_wifi_device().await?;
        let wifi = self.wireless_proxy(&dev_path).await?;

        let ap_path = wifi.active_access_point().await?;
        if ap_path.as_str() == "/" {
            return Ok(None);
        }
        let ap = NMAccessPointProxy::builder(&self.conn)
            .path(ap_path)?
            .build()
            .await?;
        let ssid = decode_ssid_or_empty(&ap.ssid().await?);
        Ok((!ssid.is_empty()).then_some(ssid))
    }

    async fn active_connections(&self) -> Result<Vec<(String, ActiveConnectionState)>> {
        let nm = NMProxy::new(&self.conn).await?;
        let mut result = Vec::new();

        for ac_path in nm.active_connections().await? {
            let ac = NMActiveConnectionProxy::builder(&self.conn)
                .path(ac_path)?
                .build()
                .await?;
            let Ok(id) = ac.id().await else {
                continue;
            };
            let state = ActiveConnectionState::from(ac.state().await.unwrap_or(0));
            result.push((id, state));
        }

        Ok(result)
    }

    async fn list_profiles(&self) -> Result<Vec<ProfileInfo>> {
        let settings = NMSettingsProxy::new(&self.conn).await?;
        let mut profiles = Vec::new();

        for cpath in settings.list_connections().await? {
            let cproxy = NMSettingsConnectionProxy::builder(&self.conn)
                .path(cpath)?
                .build()
                .await?;
            let Ok(map) = cproxy.get_settings().await else {
                continue;
            };
            if let Some((identity, shape)) = wireless_profile_summary(&map) {
                profiles.push(ProfileInfo { identity, shape });
            }
        }

        Ok(profiles)
    }

    async fn activate_profile(&self, identity: &str) -> Result<ActivationHandle> {
        let dev_path = self.find_wifi_device().await?;
        let saved = self
            .profile_paths_for(identity)
            .await?
            .into_iter()
            .next()
            .ok_or(ServiceError::NoSavedProfile)?;

        let wifi = self.wireless_proxy(&dev_path).await?;
        let specific = self.ap_path_for(&wifi, identity).await?;

        debug!("Activating saved profile for '{identity}': {}", saved.as_str());
        let active = NMProxy::new(&self.conn)
            .await?
            .activate_connection(saved, dev_path, specific)
            .await
            .map_err(|e| ServiceError::Activation(e.to_string()))?;

        Ok(ActivationHandle(active.to_string()))
    }

    async fn add_and_activate(&self, spec: ProfileSpec) -> Result<ActivationHandle> {
        let dev_path = self.find_wifi_device().await?;
        let wifi = self.wireless_proxy(&dev_path).await?;
        let specific = self.ap_path_for(&wifi, &spec.identity).await?;

        let settings = build_profile(&spec);

        debug!("Creating and activating profile for '{}'", spec.identity);
        let (_, active) = NMProxy::new(&self.conn)
            .await?
            .add_and_activate_connection(settings, dev_path, specific)
            .await
            .map_err(|e| ServiceError::Activation(e.to_string()))?;

        Ok(ActivationHandle(active.to_string()))
    }

    async fn deactivate_active(&self) -> Result<()> {
        let dev_path = self.find_wifi_device().await?;
        let nm = NMProxy::new(&self.conn).await?;

        for ac_path in nm.active_connections().await? {
            let ac = NMActiveConnectionProxy::builder(&self.conn)
                .path(ac_path.clone())?
                .build()
                .await?;
            let Ok(devices) = ac.devices().await else {
                continue;
            };
            if devices.contains(&dev_path) {
                debug!("Deactivating {}", ac_path.as_str());
                nm.deactivate_connection(ac_path).await?;
            }
        }

        Ok(())
    }

    async fn delete_profile(&self, identity: &str) -> Result<()> {
        let paths = self.profile_paths_for(identity).await?;
        if paths.is_empty() {
            return Err(ServiceError::NoSavedProfile);
        }

        for cpath in paths {
            let cproxy = NMSettingsConnectionProxy::builder(&self.conn)
                .path(cpath.clone())?
                .build()
                .await?;
            match cproxy.delete().await {
                Ok(()) => debug!("Deleted profile {}", cpath.as_str()),
                Err(e) => warn!("Failed to delete profile {}: {e}", cpath.as_str()),
            }
        }

        Ok(())
    }

    async fn device_status(&self) -> Result<DeviceStatus> {
        let dev_path = self.find_wifi_device().await?;
        let dev = NMDeviceProxy::builder(&self.conn)
            .path(dev_path)?
            .build()
            .await?;

        let (state, reason) = dev.state_reason().await?;
        Ok(DeviceStatus {
            state: state.into(),
            reason: reason.into(),
        })
    }

    async fn wifi_enabled(&self) -> Result<bool> {
        Ok(NMProxy::new(&self.conn).await?.wireless_enabled().await?)
    }

    async fn set_wifi_enabled(&self, enabled: bool) -> Result<()> {
        Ok(NMProxy::new(&self.conn)
            .await?
            .set_wireless_enabled(enabled)
            .await?)
    }

    async fn ethernet_present(&self) -> Result<bool> {
        let nm = NMProxy::new(&self.conn).await?;
        for dev_path in nm.get_devices().await? {
            let dev = NMDeviceProxy::builder(&self.conn)
                .path(dev_path)?
                .build()
                .await?;
            if dev.device_type().await? == device_type::ETHERNET
                && dev.state().await? == DEVICE_STATE_ACTIVATED
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn signals(&self) -> Result<mpsc::UnboundedReceiver<BackendSignal>> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = self.conn.clone();

        tokio::spawn(async move {
            if let Err(e) = pump_signals(conn, tx).await {
                warn!("Backend signal stream ended: {e}");
            }
        });

        Ok(rx)
    }
}

/// Subscribes to every NetworkManager signal the service cares about and
/// forwards them into one channel. Runs until the receiver is dropped or
/// the bus connection dies.
///
/// Devices appearing after subscription are not individually resubscribed;
/// the service reacts to `DeviceAdded` by re-enumerating, which is enough
/// for the table, and a fresh `signals()` call re-subscribes everything.
async fn pump_signals(
    conn: Connection,
    tx: mpsc::UnboundedSender<BackendSignal>,
) -> Result<()> {
    let nm = NMProxy::new(&conn).await?;
    let settings = NMSettingsProxy::new(&conn).await?;

    let mut streams: Vec<Pin<Box<dyn Stream<Item = BackendSignal> + Send>>> = Vec::new();

    streams.push(Box::pin(
        nm.receive_device_added()
            .await?
            .map(|_| BackendSignal::DeviceAdded),
    ));
    streams.push(Box::pin(
        nm.receive_device_removed()
            .await?
            .map(|_| BackendSignal::DeviceRemoved),
    ));
    streams.push(Box::pin(
        nm.receive_wireless_enabled_changed()
            .await
            .filter_map(|change| async move {
                change
                    .get()
                    .await
                    .ok()
                    .map(BackendSignal::WirelessEnabledChanged)
            }),
    ));
    streams.push(Box::pin(
        nm.receive_active_connections_changed()
            .await
            .map(|_| BackendSignal::ActiveConnectionsChanged),
    ));
    streams.push(Box::pin(
        settings
            .receive_new_connection()
            .await?
            .map(|_| BackendSignal::ProfilesChanged),
    ));
    streams.push(Box::pin(
        settings
            .receive_connection_removed()
            .await?
            .map(|_| BackendSignal::ProfilesChanged),
    ));

    // Per-device subscriptions for whatever Wi-Fi device exists right now.
    let mut wifi_found = false;
    for dev_path in nm.get_devices().await? {
        let dev = NMDeviceProxy::builder(&conn)
            .path(dev_path.clone())?
            .build()
            .await?;
        if dev.device_type().await.unwrap_or(0) != device_type::WIFI {
            continue;
        }
        wifi_found = true;

        let wifi = NMWirelessProxy::builder(&conn)
            .path(dev_path.clone())?
            .build()
            .await?;

        streams.push(Box::pin(
            wifi.receive_access_point_added()
                .await?
                .map(|_| BackendSignal::AccessPointsChanged),
        ));
        streams.push(Box::pin(
            wifi.receive_access_point_removed()
                .await?
                .map(|_| BackendSignal::AccessPointsChanged),
        ));
        streams.push(Box::pin(
            dev.receive_device_state_changed()
                .await?
                .filter_map(|signal| async move {
                    signal.args().ok().map(|args| {
                        BackendSignal::DeviceStateChanged(DeviceStatus {
                            state: args.new_state.into(),
                            reason: args.reason.into(),
                        })
                    })
                }),
        ));

        debug!("Subscribed to Wi-Fi signals on {dev_path}");
    }

    if !wifi_found {
        warn!("No Wi-Fi device present, monitoring bus-level signals only");
    }

    let mut merged = futures::stream::select_all(streams);
    while let Some(signal) = merged.next().await {
        if tx.send(signal).is_err() {
            // Receiver gone, service shut down.
            break;
        }
    }

    Ok(())
}
