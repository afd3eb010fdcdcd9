//! Broker channel/topic names.
//!
//! Single source of truth — modules address each other only through these
//! pairs, never through direct references. No duplication permitted.

/// Gain-tuning channel.
pub const PID_CHANNEL: &str = "PID";
/// Latest [`crate::gains::GainTable`]; default is the compile-time table.
pub const PID_CONSTANTS: &str = "Constants";

/// Remote command server channel.
pub const CMD_SERVER_CHANNEL: &str = "CMD Server";
/// Latest [`crate::motion::MotionCmd`] from the strategy server.
pub const MOTION_CMD: &str = "MotionCMD";
/// Latest dribbler on/off flag.
pub const ENABLE_DRIBBLER: &str = "EnableDribbler";

/// Kicker channel.
pub const KICKER_CHANNEL: &str = "Kicker";
/// Latest kicker actuation setpoint.
pub const KICKING_SETPOINT: &str = "KickingSetPoint";

/// Strategy-link supervision channel.
pub const AI_CONNECTION_CHANNEL: &str = "AI Connection";
/// Latest enable signal; false gates the cascade into the halt state.
pub const SAFETY_ENABLE: &str = "SafetyEnable";

/// Motion estimation channel.
pub const MOTION_EKF_CHANNEL: &str = "virtual-motion ekf";
/// Latest [`crate::motion::MotionSnapshot`].
pub const MOTION_PREDICTION: &str = "motion prediction";

/// Motion module channel (mode/frame translation output).
pub const MOTION_MODULE_CHANNEL: &str = "Motion Module";
/// Latest translational [`crate::motion::Setpoint`].
pub const TRANS_SETPOINT: &str = "TransSetPoint";
/// Latest rotational [`crate::motion::Setpoint`].
pub const ROTAT_SETPOINT: &str = "RotatSetPoint";

/// Firmware client channel.
pub const FIRMWARE_CHANNEL: &str = "firmware-client";
/// Latest [`crate::firmware::FirmwareCommand`]; default is the halt command.
pub const FIRMWARE_COMMANDS: &str = "commands";
/// Queued [`crate::firmware::TelemetryPacket`] stream.
pub const FIRMWARE_TELEMETRY: &str = "telemetry";
/// Latest sensor (re)initialization request flag.
pub const INIT_SENSORS: &str = "re/init sensors";

/// Connection-initialization channel.
pub const CONNECTION_CHANNEL: &str = "ConnectionInit";
/// Latest robot origin in the world frame.
pub const ROBOT_ORIGIN: &str = "RobotOrigin(WorldFrame)";
