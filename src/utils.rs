//! Small conversion helpers.

use log::warn;
use std::str;

/// Decode SSID bytes, defaulting to empty string if empty or invalid UTF-8.
/// This is safer than unwrap_or and logs the error.
pub(crate) fn decode_ssid_or_empty(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }
    str::from_utf8(bytes)
        .map(|s| s.to_string())
        .unwrap_or_else(|e| {
            warn!("Invalid UTF-8 in SSID: {e}");
            String::new()
        })
}
