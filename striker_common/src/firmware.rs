//! Payloads exchanged with the microcontroller client.
//!
//! `FirmwareCommand` is an owned value type; cloning it is cheap and there
//! is no borrowed-field release ceremony around publishing it.

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Actuator command consumed by the firmware client.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FirmwareCommand {
    /// Firmware handshake flag; true once sensors are initialized.
    pub init: bool,
    /// Planar drive output, controller units.
    pub translational_output: Vec2,
    /// Rotational drive output, controller units.
    pub rotational_output: f64,
    /// Kicker actuation setpoint.
    pub kicker: Vec2,
    /// Dribbler motor on/off.
    pub dribbler: bool,
}

impl FirmwareCommand {
    /// The distinguished safe command: zero motion, dribbler off.
    ///
    /// Published whenever the enable signal is down; a halted robot receives
    /// this continuously until re-enabled.
    pub const fn halt() -> Self {
        Self {
            init: true,
            translational_output: Vec2::ZERO,
            rotational_output: 0.0,
            kicker: Vec2::ZERO,
            dribbler: false,
        }
    }
}

impl Default for FirmwareCommand {
    fn default() -> Self {
        Self::halt()
    }
}

/// Raw motion telemetry reported by the firmware client.
///
/// Same planar frame as [`crate::motion::MotionSnapshot`]; the estimator
/// adapter restructures each packet into a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TelemetryPacket {
    pub translational_displacement: Vec2,
    pub translational_velocity: Vec2,
    pub rotational_displacement: f64,
    pub rotational_velocity: f64,
}
