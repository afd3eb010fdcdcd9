//! Motion vocabulary: feedback snapshots, per-axis setpoints, and the
//! remote motion command decoded from the strategy server.

use serde::{Deserialize, Serialize};

use crate::math::{Vec2, Vec3};

/// Whether an axis controller tracks a position target or a rate target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetpointKind {
    /// Track a position (translational mm / rotational degrees).
    Displacement,
    /// Track a rate (translational mm/s / rotational deg/s).
    Velocity,
}

/// Tagged per-axis target value.
///
/// The control cascade dispatches on `kind`; the conjugate controller of the
/// axis is re-initialized whenever the other one runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Setpoint<T> {
    pub kind: SetpointKind,
    pub value: T,
}

impl<T> Setpoint<T> {
    #[inline]
    pub const fn displacement(value: T) -> Self {
        Self {
            kind: SetpointKind::Displacement,
            value,
        }
    }

    #[inline]
    pub const fn velocity(value: T) -> Self {
        Self {
            kind: SetpointKind::Velocity,
            value,
        }
    }
}

/// Fused motion estimate consumed by the control cascade.
///
/// Planar body frame; rotational units are degrees in `(-180, 180]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionSnapshot {
    /// Translational displacement.
    pub trans_disp: Vec2,
    /// Translational velocity.
    pub trans_vel: Vec2,
    /// Rotational displacement [deg].
    pub rotat_disp: f64,
    /// Rotational velocity [deg/s].
    pub rotat_vel: f64,
}

/// Control mode requested by the strategy server.
///
/// Two letters per axis: T/R = translational/rotational,
/// D/V = displacement/velocity. A leading NS marks the non-smoothed
/// trajectory variants, which carry the same setpoint semantics here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum CtrlMode {
    TDRD,
    TDRV,
    TVRD,
    TVRV,
    NSTDRD,
    NSTDRV,
}

impl CtrlMode {
    /// Setpoint kind for the translational axis.
    #[inline]
    pub const fn trans_kind(self) -> SetpointKind {
        match self {
            Self::TDRD | Self::TDRV | Self::NSTDRD | Self::NSTDRV => SetpointKind::Displacement,
            Self::TVRD | Self::TVRV => SetpointKind::Velocity,
        }
    }

    /// Setpoint kind for the rotational axis.
    #[inline]
    pub const fn rotat_kind(self) -> SetpointKind {
        match self {
            Self::TDRD | Self::TVRD | Self::NSTDRD => SetpointKind::Displacement,
            Self::TDRV | Self::TVRV | Self::NSTDRV => SetpointKind::Velocity,
        }
    }

    /// Decode the wire encoding used by the strategy protocol.
    /// Unknown values fall back to `TVRV`, the safe rate-control default.
    #[inline]
    pub const fn from_wire(value: u8) -> Self {
        match value {
            0 => Self::TDRD,
            1 => Self::TDRV,
            2 => Self::TVRD,
            4 => Self::NSTDRD,
            5 => Self::NSTDRV,
            _ => Self::TVRV,
        }
    }
}

/// Coordinate frame the remote setpoint is expressed in.
///
/// The motion module transforms world-frame setpoints into the body frame
/// before publishing; the control cascade is frame-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefFrame {
    BodyFrame,
    WorldFrame,
}

/// Remote motion command as published by the command server.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionCmd {
    /// `(x, y)` translational target, `z` rotational target.
    pub setpoint_3d: Vec3,
    pub mode: CtrlMode,
    pub ref_frame: RefFrame,
}

impl Default for MotionCmd {
    /// Zero setpoint, rate control, body frame — the do-nothing command.
    fn default() -> Self {
        Self {
            setpoint_3d: Vec3::ZERO,
            mode: CtrlMode::TVRV,
            ref_frame: RefFrame::BodyFrame,
        }
    }
}
