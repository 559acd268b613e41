//! Stateful frame codec bound to one channel.

use crate::error::Result;
use crate::protocol::{encode_output, Frame, SensorFrame, Slot, FRAME_LEN};
use crate::transport::FrameChannel;
use tracing::trace;

/// Translates between hub frames and per-slot values over an owned channel.
///
/// The output buffer persists across writes: driving one slot re-sends the
/// last value written to the other slot.
pub struct Codec<C: FrameChannel = Box<dyn FrameChannel>> {
    channel: C,
    read_buffer: Frame,
    write_buffer: Frame,
}

impl<C: FrameChannel> Codec<C> {
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            read_buffer: [0; FRAME_LEN],
            write_buffer: [0; FRAME_LEN],
        }
    }

    /// Read the raw type id of both slots.
    ///
    /// Some hub firmware only answers after an output report, so the current
    /// output buffer is sent first.
    pub fn read_device_types(&mut self) -> Result<[u8; 2]> {
        self.channel.write_frame(&self.write_buffer)?;
        let frame = self.read_sensor_frame()?;
        trace!(type_ids = ?frame.type_ids, "read slot type ids");
        Ok(frame.type_ids)
    }

    /// Read a fresh frame and return `slot`'s input value.
    pub fn read_value(&mut self, slot: Slot) -> Result<u8> {
        Ok(self.read_sensor_frame()?.value(slot))
    }

    /// Stage `value` for `slot` and send the whole output buffer.
    pub fn write_value(&mut self, slot: Slot, value: u8) -> Result<()> {
        encode_output(&mut self.write_buffer, slot, value);
        trace!(%slot, value, "write slot value");
        self.channel.write_frame(&self.write_buffer)
    }

    /// Read one frame and decode it.
    pub fn read_sensor_frame(&mut self) -> Result<SensorFrame> {
        self.read_buffer = self.channel.read_frame()?;
        Ok(SensorFrame::decode(&self.read_buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::transport::mock::MockChannel;

    #[test]
    fn read_device_types_writes_before_reading() {
        let mock = MockChannel::fixed([0, 0, 0, 0, 177, 0, 103, 0, 0]);
        let log = mock.written();
        let mut codec = Codec::new(mock);

        assert_eq!(codec.read_device_types().unwrap(), [177, 103]);
        assert_eq!(log.lock().unwrap().as_slice(), &[[0u8; FRAME_LEN]]);
    }

    #[test]
    fn read_value_uses_slot_offset() {
        let mut codec = Codec::new(MockChannel::fixed([0, 0, 0, 42, 38, 99, 231, 0, 0]));
        assert_eq!(codec.read_value(Slot::A).unwrap(), 42);
        assert_eq!(codec.read_value(Slot::B).unwrap(), 99);
    }

    #[test]
    fn write_value_pins_other_slot() {
        let mock = MockChannel::loopback([240, 240]);
        let log = mock.written();
        let mut codec = Codec::new(mock);

        codec.write_value(Slot::B, 100).unwrap();
        codec.write_value(Slot::A, 20).unwrap();

        let written = log.lock().unwrap();
        assert_eq!(written[0], [0, 64, 0, 100, 0, 0, 0, 0, 0]);
        assert_eq!(written[1], [0, 64, 20, 100, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut codec = Codec::new(MockChannel::loopback([240, 202]));
        for slot in Slot::ALL {
            codec.write_value(slot, 0x55 + slot.index() as u8).unwrap();
            assert_eq!(codec.read_value(slot).unwrap(), 0x55 + slot.index() as u8);
        }
    }

    #[test]
    fn channel_failures_propagate() {
        let mut codec = Codec::new(MockChannel::broken());
        assert!(matches!(codec.read_value(Slot::A), Err(Error::Io { .. })));
        assert!(matches!(codec.write_value(Slot::A, 1), Err(Error::Io { .. })));
        assert!(matches!(codec.read_device_types(), Err(Error::Io { .. })));
    }
}
