//! Frame channel: the owned byte pipe between host and one hub.
//!
//! Real hubs go through `hidapi`; tests plug in `mock::MockChannel`.

use crate::error::{Error, FrameOp, Result};
use crate::protocol::{frame_from_input_report, Frame, INPUT_REPORT_LEN};
use tracing::{trace, warn};

/// Exclusive, blocking, fixed-size duplex channel to one hub.
///
/// Implementations own the underlying OS handle and release it on drop.
pub trait FrameChannel: Send {
    /// Write one full frame.
    fn write_frame(&mut self, frame: &Frame) -> Result<()>;

    /// Block until one full frame has been read.
    fn read_frame(&mut self) -> Result<Frame>;
}

impl<C: FrameChannel + ?Sized> FrameChannel for Box<C> {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        (**self).write_frame(frame)
    }

    fn read_frame(&mut self) -> Result<Frame> {
        (**self).read_frame()
    }
}

/// Frame channel backed by an open `hidapi` device.
pub struct HidFrameChannel {
    device: hidapi::HidDevice,
}

impl HidFrameChannel {
    /// Take ownership of an opened device.
    pub fn new(device: hidapi::HidDevice) -> Self {
        Self { device }
    }

    /// Device descriptor as reported by the host for this open handle.
    pub fn device_info(&self) -> hidapi::HidResult<hidapi::DeviceInfo> {
        self.device.get_device_info()
    }
}

impl FrameChannel for HidFrameChannel {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        trace!(frame_hex = format_args!("{:02X?}", frame), "frame TX");
        self.device.write(frame).map_err(|e| Error::Io {
            op: FrameOp::Write,
            reason: e.to_string(),
        })?;
        Ok(())
    }

    fn read_frame(&mut self) -> Result<Frame> {
        let mut report = [0u8; INPUT_REPORT_LEN];
        let n = self.device.read(&mut report).map_err(|e| Error::Io {
            op: FrameOp::Read,
            reason: e.to_string(),
        })?;

        let frame = frame_from_input_report(&report[..n]).inspect_err(|e| {
            warn!(error = %e, "short frame from hub");
        })?;
        trace!(frame_hex = format_args!("{:02X?}", frame), "frame RX");
        Ok(frame)
    }
}
