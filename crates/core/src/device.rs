//! Device model: slot classification and per-slot access.

use crate::codec::Codec;
use crate::error::Result;
use crate::protocol::{
    Slot, DISTANCE_SENSOR_IDS, EMPTY_SLOT_IDS, LIGHT_IDS, MOTOR_IDS, SERVO_MOTOR_IDS,
    TILT_SENSOR_IDS,
};
use serde::Serialize;
use std::cell::RefCell;

/// Kind of peripheral attached to a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    None,
    Motor,
    ServoMotor,
    Light,
    DistanceSensor,
    TiltSensor,
}

impl DeviceType {
    /// Classify a raw type id. Unknown ids are `None`.
    pub fn from_type_id(id: u8) -> Self {
        if TILT_SENSOR_IDS.contains(&id) {
            Self::TiltSensor
        } else if SERVO_MOTOR_IDS.contains(&id) {
            Self::ServoMotor
        } else if DISTANCE_SENSOR_IDS.contains(&id) {
            Self::DistanceSensor
        } else if LIGHT_IDS.contains(&id) {
            Self::Light
        } else if EMPTY_SLOT_IDS.contains(&id) {
            Self::None
        } else if MOTOR_IDS.contains(&id) {
            Self::Motor
        } else {
            Self::None
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Motor => "Motor",
            Self::ServoMotor => "Servo Motor",
            Self::Light => "Light",
            Self::DistanceSensor => "Distance Sensor",
            Self::TiltSensor => "Tilt Sensor",
        }
    }

    /// Whether the slot produces meaningful input values.
    pub fn is_sensor(&self) -> bool {
        matches!(self, Self::DistanceSensor | Self::TiltSensor)
    }

    /// Whether the slot accepts output values.
    pub fn is_actuator(&self) -> bool {
        matches!(self, Self::Motor | Self::ServoMotor | Self::Light)
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A peripheral slot on a hub.
///
/// Borrows the hub's codec, so it cannot outlive the hub it came from.
#[derive(Clone, Copy)]
pub struct Device<'hub> {
    device_type: DeviceType,
    slot: Slot,
    codec: &'hub RefCell<Codec>,
}

impl<'hub> Device<'hub> {
    pub(crate) fn new(device_type: DeviceType, slot: Slot, codec: &'hub RefCell<Codec>) -> Self {
        Self {
            device_type,
            slot,
            codec,
        }
    }

    /// Type classified when the hub was opened.
    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// Read the slot's current input value (blocking).
    pub fn value(&self) -> Result<u8> {
        self.codec.borrow_mut().read_value(self.slot)
    }

    /// Drive the slot's output (blocking).
    pub fn set_value(&self, value: u8) -> Result<()> {
        self.codec.borrow_mut().write_value(self.slot, value)
    }
}

impl std::fmt::Debug for Device<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("device_type", &self.device_type)
            .field("slot", &self.slot)
            .finish()
    }
}
