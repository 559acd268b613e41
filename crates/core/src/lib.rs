//! wedo-core: LEGO WeDo hub discovery, frame protocol, and slot device model.
//!
//! This crate provides the cross-platform core logic for talking to WeDo USB
//! hubs over HID: finding hubs, classifying what is plugged into each of
//! their two slots, reading sensor values and driving outputs.

pub mod codec;
pub mod device;
pub mod discovery;
pub mod error;
pub mod hub;
pub mod protocol;
pub mod transport;

pub use device::{Device, DeviceType};
pub use discovery::{find_hubs, find_hubs_matching, find_hubs_with, HubIdentity};
pub use error::{Error, Result};
pub use hub::Hub;
pub use protocol::Slot;

/// LEGO USB Vendor ID.
pub const LEGO_VID: u16 = 0x0694;

/// Known LEGO product IDs.
pub mod pids {
    /// WeDo USB hub.
    pub const WEDO_HUB: u16 = 0x0003;
}
