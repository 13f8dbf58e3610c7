//! NetworkManager connection settings builder.
//!
//! Constructs the D-Bus settings dictionaries required by NetworkManager's
//! `AddAndActivateConnection` method.
//!
//! # NetworkManager Settings Structure
//!
//! A connection is represented as a nested dictionary:
//! - `connection`: General settings (type, id, uuid, autoconnect)
//! - `802-11-wireless`: Wi-Fi specific settings (ssid, mode, security reference)
//! - `802-11-wireless-security`: Security settings (key-mgmt, psk, auth-alg)
//! - `ipv4` / `ipv6`: IP configuration ("auto" for DHCP)

use std::collections::HashMap;
use zvariant::Value;

use crate::backend::ProfileSpec;
use crate::models::SecurityShape;

/// Converts a string to bytes for SSID encoding.
fn bytes(val: &str) -> Vec<u8> {
    val.as_bytes().to_vec()
}

/// Creates a D-Bus string array value.
fn string_array(xs: &[&str]) -> Value<'static> {
    let vals: Vec<String> = xs.iter().map(|s| s.to_string()).collect();
    Value::from(vals)
}

/// Builds the `connection` section with type, id, uuid, and autoconnect.
fn base_connection_section(identity: &str) -> HashMap<&'static str, Value<'static>> {
    let mut s = HashMap::new();
    s.insert("type", Value::from("802-11-wireless"));
    s.insert("id", Value::from(identity.to_string()));
    s.insert("uuid", Value::from(uuid::Uuid::new_v4().to_string()));
    s.insert("autoconnect", Value::from(true));
    s
}

/// Builds the `802-11-wireless` section with SSID and mode.
fn base_wifi_section(identity: &str, secured: bool) -> HashMap<&'static str, Value<'static>> {
    let mut s = HashMap::new();
    s.insert("ssid", Value::from(bytes(identity)));
    s.insert("mode", Value::from("infrastructure"));
    if secured {
        s.insert("security", Value::from("802-11-wireless-security"));
    }
    s
}

/// Builds the `802-11-wireless-security` section for WPA-PSK networks.
///
/// Uses WPA2 (RSN) with CCMP encryption. The `psk-flags` of 0 means the
/// password is stored in the connection (agent-owned). The psk entry is
/// omitted when no password was supplied, which lets NetworkManager fail
/// fast with a no-secrets reason instead of stalling.
fn build_psk_security(psk: Option<&str>) -> HashMap<&'static str, Value<'static>> {
    let mut sec = HashMap::new();

    sec.insert("key-mgmt", Value::from("wpa-psk"));
    if let Some(psk) = psk {
        sec.insert("psk", Value::from(psk.to_string()));
    }
    sec.insert("psk-flags", Value::from(0u32));
    sec.insert("auth-alg", Value::from("open"));

    // Enforce WPA2 with AES
    sec.insert("proto", string_array(&["rsn"]));
    sec.insert("pairwise", string_array(&["ccmp"]));
    sec.insert("group", string_array(&["ccmp"]));

    sec
}

/// Builds a complete Wi-Fi connection settings dictionary from a profile
/// specification. The returned dictionary can be passed directly to
/// `AddAndActivateConnection`.
pub(crate) fn build_profile(
    spec: &ProfileSpec,
) -> HashMap<&'static str, HashMap<&'static str, Value<'static>>> {
    let mut conn: HashMap<&'static str, HashMap<&'static str, Value<'static>>> = HashMap::new();

    let secured = spec.shape == SecurityShape::WpaPsk;

    conn.insert("connection", base_connection_section(&spec.identity));
    conn.insert("802-11-wireless", base_wifi_section(&spec.identity, secured));

    // IPv4 and IPv6 auto configuration prevents a stall waiting for
    // addressing settings.
    let mut ipv4 = HashMap::new();
    ipv4.insert("method", Value::from("auto"));
    conn.insert("ipv4", ipv4);

    let mut ipv6 = HashMap::new();
    ipv6.insert("method", Value::from("auto"));
    conn.insert("ipv6", ipv6);

    if secured {
        conn.insert(
            "802-11-wireless-security",
            build_psk_security(spec.psk.as_deref()),
        );
    }

    conn
}
