//! D-Bus proxy interfaces for NetworkManager.
//!
//! One proxy per file: the `zbus::proxy` macro generates module-level types
//! named after each D-Bus signal, so two proxies renaming a signal to the
//! same bus name (`StateChanged` on Device and Connection.Active) cannot
//! share a module.
//!
//! # NetworkManager D-Bus Structure
//!
//! - `/org/freedesktop/NetworkManager` - Main NM object
//! - `/org/freedesktop/NetworkManager/Devices/*` - Device objects
//! - `/org/freedesktop/NetworkManager/AccessPoint/*` - Access point objects
//! - `/org/freedesktop/NetworkManager/ActiveConnection/*` - Active connection objects
//! - `/org/freedesktop/NetworkManager/Settings` - Stored connection profiles

mod access_point;
mod active_connection;
mod device;
mod main_nm;
mod settings;
mod wireless;

pub(crate) use access_point::NMAccessPointProxy;
pub(crate) use active_connection::NMActiveConnectionProxy;
pub(crate) use device::NMDeviceProxy;
pub(crate) use main_nm::NMProxy;
pub(crate) use settings::{NMSettingsConnectionProxy, NMSettingsProxy};
pub(crate) use wireless::NMWirelessProxy;
