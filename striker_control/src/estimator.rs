//! Motion estimator adapter.
//!
//! Drains the queued firmware telemetry stream and republishes each packet
//! as a structured motion snapshot on the latest-value prediction topic.
//! Purely structural — no filtering; a real estimation filter is a future
//! module behind the same topic contract.

use striker_common::firmware::TelemetryPacket;
use striker_common::motion::MotionSnapshot;
use striker_common::topics;
use striker_pubsub::{BrokerResult, Publisher};
use tracing::{error, info};

use crate::module::{BotModule, ModuleEnv, subscribe_queued};

/// Restructure one telemetry packet into a snapshot.
pub fn snapshot_from_telemetry(packet: &TelemetryPacket) -> MotionSnapshot {
    MotionSnapshot {
        trans_disp: packet.translational_displacement,
        trans_vel: packet.translational_velocity,
        rotat_disp: packet.rotational_displacement,
        rotat_vel: packet.rotational_velocity,
    }
}

/// The adapter module.
#[derive(Debug, Default)]
pub struct MotionEstimator;

impl BotModule for MotionEstimator {
    fn name(&self) -> &'static str {
        "motion estimator"
    }

    fn task(&mut self, env: &ModuleEnv) {
        if let Err(e) = run(env) {
            error!(error = %e, "motion estimator failed");
        }
    }
}

fn run(env: &ModuleEnv) -> BrokerResult<()> {
    let snapshot_pub = Publisher::latest(
        &env.broker,
        topics::MOTION_EKF_CHANNEL,
        topics::MOTION_PREDICTION,
        MotionSnapshot::default(),
    )?;
    let telemetry_sub = subscribe_queued::<TelemetryPacket>(
        env,
        topics::FIRMWARE_CHANNEL,
        topics::FIRMWARE_TELEMETRY,
    )?;
    info!("initialized");

    loop {
        let packet = telemetry_sub.pop();
        snapshot_pub.publish(snapshot_from_telemetry(&packet));
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use striker_common::math::Vec2;

    #[test]
    fn restructure_keeps_all_fields() {
        let packet = TelemetryPacket {
            translational_displacement: Vec2::new(1.0, 2.0),
            translational_velocity: Vec2::new(-0.5, 0.25),
            rotational_displacement: 37.5,
            rotational_velocity: -4.0,
        };
        let snapshot = snapshot_from_telemetry(&packet);
        assert_eq!(snapshot.trans_disp, Vec2::new(1.0, 2.0));
        assert_eq!(snapshot.trans_vel, Vec2::new(-0.5, 0.25));
        assert_eq!(snapshot.rotat_disp, 37.5);
        assert_eq!(snapshot.rotat_vel, -4.0);
    }
}
