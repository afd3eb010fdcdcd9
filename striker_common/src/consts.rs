//! System-wide constants for the striker workspace.
//!
//! Single source of truth for control-loop defaults, network ports, and the
//! compile-time gain table. Runtime configuration may override most of these;
//! the gain table here is also the broker default on the tuning topic before
//! any publish arrives.

use crate::gains::{GainSet, GainTable};

/// Control loop frequency [Hz].
pub const CTRL_FREQUENCY_HZ: f64 = 100.0;

/// Startup delay before the first enable cycle [ms].
///
/// Upstream modules need a moment to flush stale defaults before the
/// cascade starts consuming them.
pub const INIT_DELAY_MS: u64 = 500;

/// Euclidean cap on the assembled `(tx, ty, rz)` output vector.
pub const OUTPUT_CAP: f64 = 100.0;

/// Preallocated worker threads; every module task pins one for the process
/// lifetime, so this must stay at or above the module count.
pub const THREAD_POOL_SIZE: usize = 10;

/// Bounded capacity of the firmware telemetry queue.
pub const TELEMETRY_QUEUE_CAP: usize = 100;

/// Retry period for the init-subscribers barrier [ms].
pub const SUBSCRIBE_RETRY_MS: u64 = 10;

/// UDP port for remote strategy commands.
pub const CMD_SERVER_PORT: u16 = 6001;

/// TCP port for the one-shot connection/initialization server.
pub const CONN_SERVER_PORT: u16 = 6000;

/// Receive buffer size for strategy packets [bytes].
pub const UDP_RBUF_SIZE: usize = 1024;

/// Rotational displacement gains [deg → output].
pub const PID_RD_GAINS: GainSet = GainSet::new(0.66, 0.0, 0.02);
/// Rotational velocity gains [deg/s → output].
pub const PID_RV_GAINS: GainSet = GainSet::new(1.0, 0.0, 0.0);
/// Translational displacement gains [mm → output].
pub const PID_TD_GAINS: GainSet = GainSet::new(0.05, 0.0, 0.001);
/// Translational velocity gains [mm/s → output].
pub const PID_TV_GAINS: GainSet = GainSet::new(1.0, 0.0, 0.0);
/// Direction correction gains (reserved controller).
pub const PID_DIR_GAINS: GainSet = GainSet::ZERO;

/// The compile-time gain table; broker default on the tuning topic.
pub const DEFAULT_GAINS: GainTable = GainTable {
    rd: PID_RD_GAINS,
    rv: PID_RV_GAINS,
    td: PID_TD_GAINS,
    tv: PID_TV_GAINS,
    dir: PID_DIR_GAINS,
};
