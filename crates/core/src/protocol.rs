//! WeDo hub frame protocol.
//!
//! Every transaction with the hub is a fixed 9-byte frame (report id 0 plus
//! 8 payload bytes), in both directions.
//!
//! Input frame (hub → host):
//! - byte 3: slot A value, byte 4: slot A type id
//! - byte 5: slot B value, byte 6: slot B type id
//!
//! Output frame (host → hub):
//! - byte 1: output command marker (64)
//! - byte 2: slot A output, byte 3: slot B output

use crate::error::{Error, Result};
use serde::Serialize;

/// Frame length in bytes, including the leading report id.
pub const FRAME_LEN: usize = 9;

/// A raw frame as exchanged with the hub.
pub type Frame = [u8; FRAME_LEN];

/// Input report length as delivered by the host HID stack, which strips
/// report id 0.
pub const INPUT_REPORT_LEN: usize = FRAME_LEN - 1;

/// Offset of the output command marker in an output frame.
pub const OUTPUT_COMMAND_OFFSET: usize = 1;
/// Marker the hub expects before output values.
pub const OUTPUT_COMMAND: u8 = 64;
/// Offset of slot A's output value; slot B follows immediately.
pub const OUTPUT_VALUE_OFFSET: usize = 2;
/// Offset of slot A's input value; slot B is two bytes further.
pub const INPUT_VALUE_OFFSET: usize = 3;
/// Offset of slot A's type id; slot B is two bytes further.
pub const INPUT_TYPE_OFFSET: usize = 4;

/// Type ids reported by a tilt sensor.
pub const TILT_SENSOR_IDS: &[u8] = &[38, 39];
/// Type ids reported by a servo motor.
pub const SERVO_MOTOR_IDS: &[u8] = &[102, 103];
/// Type ids reported by a distance (motion) sensor.
pub const DISTANCE_SENSOR_IDS: &[u8] = &[177, 178, 179, 180];
/// Type ids reported by a light brick.
pub const LIGHT_IDS: &[u8] = &[202, 203, 204, 205];
/// Type id of an empty port.
pub const EMPTY_SLOT_IDS: &[u8] = &[231];
/// Type ids reported by a motor.
///
/// Some hub revisions only ever report 239..=241; 0..=3 is what a motor
/// reads as while it is being driven on other revisions. Both ranges are
/// accepted.
pub const MOTOR_IDS: &[u8] = &[0, 1, 2, 3, 239, 240, 241];

/// One of the two attachment ports on a hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
#[repr(u8)]
pub enum Slot {
    A = 0,
    B = 1,
}

impl Slot {
    /// Both slots, in port order.
    pub const ALL: [Slot; 2] = [Slot::A, Slot::B];

    /// Zero-based port index.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Offset of this slot's input value in an input frame.
    pub fn value_offset(self) -> usize {
        INPUT_VALUE_OFFSET + self.index() * 2
    }

    /// Offset of this slot's type id in an input frame.
    pub fn type_offset(self) -> usize {
        INPUT_TYPE_OFFSET + self.index() * 2
    }

    /// Offset of this slot's output value in an output frame.
    pub fn output_offset(self) -> usize {
        OUTPUT_VALUE_OFFSET + self.index()
    }
}

impl TryFrom<u8> for Slot {
    type Error = Error;

    fn try_from(index: u8) -> Result<Self> {
        match index {
            0 => Ok(Self::A),
            1 => Ok(Self::B),
            other => Err(Error::InvalidSlot(other)),
        }
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> u8 {
        slot as u8
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Rebuild a frame from an input report with its report id stripped.
///
/// The report lands at `frame[1..]` with byte 0 kept as report id 0, so the
/// fixed offsets hold. Reports shorter than [`INPUT_REPORT_LEN`] are rejected.
pub fn frame_from_input_report(report: &[u8]) -> Result<Frame> {
    if report.len() < INPUT_REPORT_LEN {
        return Err(Error::ShortFrame {
            expected: INPUT_REPORT_LEN,
            actual: report.len(),
        });
    }

    let mut frame = [0u8; FRAME_LEN];
    frame[1..].copy_from_slice(&report[..INPUT_REPORT_LEN]);
    Ok(frame)
}

/// A decoded input frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorFrame {
    /// Current input value per slot.
    pub values: [u8; 2],
    /// Raw type id per slot.
    pub type_ids: [u8; 2],
}

impl SensorFrame {
    /// Decode the per-slot values and type ids of an input frame.
    pub fn decode(frame: &Frame) -> Self {
        Self {
            values: Slot::ALL.map(|slot| frame[slot.value_offset()]),
            type_ids: Slot::ALL.map(|slot| frame[slot.type_offset()]),
        }
    }

    /// Value reported for `slot`.
    pub fn value(&self, slot: Slot) -> u8 {
        self.values[slot.index()]
    }
}

/// Stage an output value for `slot` into an output frame.
///
/// Only the command marker and the slot's own byte are touched; whatever the
/// other slot held stays in place.
pub fn encode_output(frame: &mut Frame, slot: Slot, value: u8) {
    frame[OUTPUT_COMMAND_OFFSET] = OUTPUT_COMMAND;
    frame[slot.output_offset()] = value;
}
