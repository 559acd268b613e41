//! A WeDo hub and its two slots.

use crate::codec::Codec;
use crate::device::{Device, DeviceType};
use crate::error::Result;
use crate::protocol::Slot;
use crate::transport::FrameChannel;
use serde::Serialize;
use std::cell::RefCell;
use tracing::info;

/// An opened hub.
///
/// Slot types are classified once when the hub is opened and never
/// re-read. Dropping the hub closes its channel.
pub struct Hub {
    path: String,
    device_types: [DeviceType; 2],
    codec: RefCell<Codec>,
}

impl Hub {
    /// Take ownership of `channel` and classify both slots.
    ///
    /// Fails if the initial type read fails; the channel is dropped (closed)
    /// in that case.
    pub fn new(path: impl Into<String>, channel: impl FrameChannel + 'static) -> Result<Self> {
        let path = path.into();
        let mut codec = Codec::new(Box::new(channel) as Box<dyn FrameChannel>);
        let type_ids = codec.read_device_types()?;
        let device_types = type_ids.map(DeviceType::from_type_id);

        info!(
            path = %path,
            slot_a = %device_types[0],
            slot_b = %device_types[1],
            "Opened WeDo hub"
        );

        Ok(Self {
            path,
            device_types,
            codec: RefCell::new(codec),
        })
    }

    /// OS-level device path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Both slots, in port order.
    pub fn devices(&self) -> [Device<'_>; 2] {
        Slot::ALL.map(|slot| self.device(slot))
    }

    pub fn device(&self, slot: Slot) -> Device<'_> {
        Device::new(self.device_types[slot.index()], slot, &self.codec)
    }

    pub fn device_types(&self) -> [DeviceType; 2] {
        self.device_types
    }

    /// Zero both outputs.
    pub fn stop(&self) -> Result<()> {
        for device in self.devices() {
            device.set_value(0)?;
        }
        Ok(())
    }

    /// Read every slot's current value into a serializable summary.
    pub fn snapshot(&self) -> Result<HubSnapshot> {
        let frame = self.codec.borrow_mut().read_sensor_frame()?;
        let slots = Slot::ALL
            .into_iter()
            .map(|slot| SlotSnapshot {
                slot,
                device_type: self.device_types[slot.index()],
                value: frame.value(slot),
            })
            .collect();

        Ok(HubSnapshot {
            path: self.path.clone(),
            slots,
        })
    }
}

impl std::fmt::Debug for Hub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("path", &self.path)
            .field("device_types", &self.device_types)
            .finish()
    }
}

/// Point-in-time view of a hub.
#[derive(Debug, Clone, Serialize)]
pub struct HubSnapshot {
    pub path: String,
    pub slots: Vec<SlotSnapshot>,
}

/// Point-in-time view of one slot.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SlotSnapshot {
    pub slot: Slot,
    pub device_type: DeviceType,
    pub value: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::transport::mock::MockChannel;

    #[test]
    fn classifies_each_slot_from_its_type_byte() {
        let hub = Hub::new("hub0", MockChannel::fixed([0, 0, 0, 17, 38, 250, 178, 0, 0])).unwrap();
        let [a, b] = hub.devices();

        assert_eq!(a.slot(), Slot::A);
        assert_eq!(a.device_type(), DeviceType::TiltSensor);
        assert_eq!(a.value().unwrap(), 17);

        assert_eq!(b.slot(), Slot::B);
        assert_eq!(b.device_type(), DeviceType::DistanceSensor);
        assert_eq!(b.value().unwrap(), 250);
    }

    #[test]
    fn always_has_two_devices() {
        let hub = Hub::new("hub0", MockChannel::fixed([0; 9])).unwrap();
        let devices = hub.devices();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices.map(|d| d.slot()), [Slot::A, Slot::B]);
        assert_eq!(hub.device_types(), [DeviceType::Motor, DeviceType::Motor]);
    }

    #[test]
    fn construction_fails_on_io_error() {
        let result = Hub::new("hub0", MockChannel::broken());
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn set_value_then_value_round_trips() {
        let hub = Hub::new("hub0", MockChannel::loopback([240, 204])).unwrap();
        for device in hub.devices() {
            device.set_value(123).unwrap();
            assert_eq!(device.value().unwrap(), 123);
        }
    }

    #[test]
    fn writing_slot_a_keeps_slot_b_output() {
        let mock = MockChannel::loopback([240, 240]);
        let log = mock.written();
        let hub = Hub::new("hub0", mock).unwrap();

        hub.device(Slot::B).set_value(77).unwrap();
        hub.device(Slot::A).set_value(33).unwrap();

        let last = *log.lock().unwrap().last().unwrap();
        assert_eq!(last[2], 33);
        assert_eq!(last[3], 77);
    }

    #[test]
    fn stop_zeroes_both_outputs() {
        let mock = MockChannel::loopback([240, 202]);
        let log = mock.written();
        let hub = Hub::new("hub0", mock).unwrap();

        hub.device(Slot::A).set_value(100).unwrap();
        hub.device(Slot::B).set_value(100).unwrap();
        hub.stop().unwrap();

        let last = *log.lock().unwrap().last().unwrap();
        assert_eq!(&last[1..4], &[64, 0, 0]);
    }

    #[test]
    fn snapshot_serializes() {
        let hub = Hub::new("/dev/hidraw2", MockChannel::fixed([0, 0, 0, 5, 39, 6, 231, 0, 0])).unwrap();
        let snapshot = hub.snapshot().unwrap();
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["path"], "/dev/hidraw2");
        assert_eq!(json["slots"][0]["device_type"], "tilt_sensor");
        assert_eq!(json["slots"][0]["value"], 5);
        assert_eq!(json["slots"][1]["device_type"], "none");
        assert_eq!(json["slots"][0]["slot"], 0);
        assert_eq!(json["slots"][1]["slot"], 1);
    }
}
