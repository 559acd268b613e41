//! Hub discovery: enumerate HID paths, filter by identity, open hubs.
//!
//! Discovery is a one-shot snapshot. Paths that cannot be opened or queried
//! are skipped; many HID devices on a host are irrelevant and some are
//! permission-restricted.

use crate::error::{Error, Result};
use crate::hub::Hub;
use crate::transport::{FrameChannel, HidFrameChannel};
use std::ffi::CString;
use tracing::{debug, info, warn};

/// USB vendor/product pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HubIdentity {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl HubIdentity {
    /// LEGO WeDo USB hub.
    pub const WEDO: HubIdentity = HubIdentity {
        vendor_id: crate::LEGO_VID,
        product_id: crate::pids::WEDO_HUB,
    };
}

impl Default for HubIdentity {
    fn default() -> Self {
        Self::WEDO
    }
}

impl std::fmt::Display for HubIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04X}:{:04X}", self.vendor_id, self.product_id)
    }
}

/// Host HID facility used by discovery.
pub trait HidBackend {
    type Channel: FrameChannel + 'static;

    /// List every candidate HID path.
    fn enumerate(&self) -> Result<Vec<String>>;

    /// Open `path` for exclusive read/write frame access.
    fn open(&self, path: &str) -> Result<Self::Channel>;

    /// Vendor/product identity of an opened channel.
    fn identity(&self, path: &str, channel: &Self::Channel) -> Result<HubIdentity>;
}

/// Backend over the host HID stack via `hidapi`.
pub struct HidApiBackend {
    api: hidapi::HidApi,
}

impl HidApiBackend {
    pub fn new() -> Result<Self> {
        let api = hidapi::HidApi::new().map_err(|e| Error::Enumeration(e.to_string()))?;
        Ok(Self { api })
    }
}

impl HidBackend for HidApiBackend {
    type Channel = HidFrameChannel;

    fn enumerate(&self) -> Result<Vec<String>> {
        let mut paths: Vec<String> = self
            .api
            .device_list()
            .map(|info| info.path().to_string_lossy().into_owned())
            .collect();
        // One HID device can be listed once per usage.
        paths.sort();
        paths.dedup();
        Ok(paths)
    }

    fn open(&self, path: &str) -> Result<Self::Channel> {
        let open_error = |reason: String| Error::Open {
            path: path.to_string(),
            reason,
        };
        let c_path = CString::new(path).map_err(|e| open_error(e.to_string()))?;
        let device = self
            .api
            .open_path(&c_path)
            .map_err(|e| open_error(e.to_string()))?;
        device
            .set_blocking_mode(true)
            .map_err(|e| open_error(e.to_string()))?;
        Ok(HidFrameChannel::new(device))
    }

    fn identity(&self, path: &str, channel: &Self::Channel) -> Result<HubIdentity> {
        let info = channel.device_info().map_err(|e| Error::Identity {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Ok(HubIdentity {
            vendor_id: info.vendor_id(),
            product_id: info.product_id(),
        })
    }
}

/// Find every connected WeDo hub on the host.
pub fn find_hubs() -> Result<Vec<Hub>> {
    let backend = HidApiBackend::new()?;
    find_hubs_with(&backend)
}

/// Find WeDo hubs through `backend`.
pub fn find_hubs_with<B: HidBackend>(backend: &B) -> Result<Vec<Hub>> {
    find_hubs_matching(backend, HubIdentity::WEDO)
}

/// Find hubs reporting `identity` through `backend`.
///
/// Only an enumeration failure is returned as an error. Every per-path
/// failure is logged and the path skipped.
pub fn find_hubs_matching<B: HidBackend>(backend: &B, identity: HubIdentity) -> Result<Vec<Hub>> {
    debug!(%identity, "Starting hub enumeration");
    let paths = backend.enumerate()?;

    let mut hubs = Vec::new();
    for path in paths {
        let channel = match backend.open(&path) {
            Ok(channel) => channel,
            Err(e) => {
                debug!(path = %path, error = %e, "Skipping HID path");
                continue;
            }
        };

        match backend.identity(&path, &channel) {
            Ok(found) if found == identity => {}
            Ok(found) => {
                debug!(path = %path, identity = %found, "Not a hub");
                continue;
            }
            Err(e) => {
                debug!(path = %path, error = %e, "Skipping HID path");
                continue;
            }
        }

        match Hub::new(path.clone(), channel) {
            Ok(hub) => hubs.push(hub),
            Err(e) => warn!(path = %path, error = %e, "Hub did not answer type query"),
        }
    }

    info!(count = hubs.len(), "Hub enumeration complete");
    Ok(hubs)
}


#[cfg(test)]
mod tests {
    use super::mock::{MockBackend, MockEntry};
    use super::*;

    const KEYBOARD: HubIdentity = HubIdentity {
        vendor_id: 0x046D,
        product_id: 0xC31C,
    };

    #[test]
    fn wedo_identity_constants() {
        assert_eq!(HubIdentity::WEDO.vendor_id, 0x0694);
        assert_eq!(HubIdentity::WEDO.product_id, 0x0003);
        assert_eq!(HubIdentity::default(), HubIdentity::WEDO);
        assert_eq!(HubIdentity::WEDO.to_string(), "0694:0003");
    }

    #[test]
    fn empty_host_yields_no_hubs() {
        let hubs = find_hubs_with(&MockBackend::new()).unwrap();
        assert!(hubs.is_empty());
    }

    #[test]
    fn non_matching_devices_are_ignored() {
        let backend = MockBackend::new().with(
            "kbd",
            MockEntry::Device {
                identity: KEYBOARD,
                frame: [0; 9],
            },
        );
        assert!(find_hubs_with(&backend).unwrap().is_empty());
    }

    #[test]
    fn enumeration_failure_is_returned() {
        let result = find_hubs_with(&MockBackend::failing());
        assert!(matches!(result, Err(Error::Enumeration(_))));
    }

    #[test]
    fn identity_is_read_from_opened_channel() {
        let backend = MockBackend::new().with(
            "/dev/hidraw7",
            MockEntry::Device {
                identity: HubIdentity::WEDO,
                frame: [0; 9],
            },
        );
        let channel = backend.open("/dev/hidraw7").unwrap();
        assert_eq!(
            backend.identity("/dev/hidraw7", &channel).unwrap(),
            HubIdentity::WEDO
        );

        let mute = crate::transport::mock::MockChannel::fixed([0; 9]);
        let err = backend.identity("/dev/hidraw7", &mute).unwrap_err();
        assert!(matches!(err, Error::Identity { ref path, .. } if path == "/dev/hidraw7"));
        assert!(err.is_open_failure());
    }

    #[test]
    fn custom_identity_is_matched() {
        let backend = MockBackend::new().with(
            "clone",
            MockEntry::Device {
                identity: KEYBOARD,
                frame: [0, 0, 0, 0, 38, 0, 231, 0, 0],
            },
        );
        let hubs = find_hubs_matching(&backend, KEYBOARD).unwrap();
        assert_eq!(hubs.len(), 1);
        assert_eq!(hubs[0].path(), "clone");
    }
}
