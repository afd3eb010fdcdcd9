//! Motion module: remote command → per-axis setpoints.
//!
//! Splits the 3-vector remote setpoint into a translational and a
//! rotational [`Setpoint`] tagged per the requested control mode, and
//! rotates world-frame translational targets into the body frame using the
//! latest heading estimate. Downstream, the cascade stays frame-agnostic.

use std::thread;

use striker_common::math::{Vec2, wrap_deg};
use striker_common::motion::{MotionCmd, MotionSnapshot, RefFrame, Setpoint, SetpointKind};
use striker_common::topics;
use striker_pubsub::{BrokerResult, Publisher};
use tracing::{error, info};

use crate::module::{BotModule, ModuleEnv, subscribe_latest};

/// Translate one remote command given the current heading [deg].
pub fn split_command(cmd: &MotionCmd, heading_deg: f64) -> (Setpoint<Vec2>, Setpoint<f64>) {
    let mut trans_value = cmd.setpoint_3d.xy();
    if cmd.ref_frame == RefFrame::WorldFrame {
        // body frame = world frame rotated back by the heading
        trans_value = trans_value.rotated_deg(-heading_deg);
    }

    let rotat_kind = cmd.mode.rotat_kind();
    let rotat_value = match rotat_kind {
        SetpointKind::Displacement => wrap_deg(cmd.setpoint_3d.z),
        SetpointKind::Velocity => cmd.setpoint_3d.z,
    };

    (
        Setpoint {
            kind: cmd.mode.trans_kind(),
            value: trans_value,
        },
        Setpoint {
            kind: rotat_kind,
            value: rotat_value,
        },
    )
}

/// The translation module.
#[derive(Debug, Default)]
pub struct MotionModule;

impl BotModule for MotionModule {
    fn name(&self) -> &'static str {
        "motion module"
    }

    fn task(&mut self, env: &ModuleEnv) {
        if let Err(e) = run(env) {
            error!(error = %e, "motion module failed");
        }
    }
}

fn run(env: &ModuleEnv) -> BrokerResult<()> {
    let trans_pub = Publisher::latest(
        &env.broker,
        topics::MOTION_MODULE_CHANNEL,
        topics::TRANS_SETPOINT,
        Setpoint::velocity(Vec2::ZERO),
    )?;
    let rotat_pub = Publisher::latest(
        &env.broker,
        topics::MOTION_MODULE_CHANNEL,
        topics::ROTAT_SETPOINT,
        Setpoint::velocity(0.0),
    )?;
    let cmd_sub =
        subscribe_latest::<MotionCmd>(env, topics::CMD_SERVER_CHANNEL, topics::MOTION_CMD)?;
    let snapshot_sub = subscribe_latest::<MotionSnapshot>(
        env,
        topics::MOTION_EKF_CHANNEL,
        topics::MOTION_PREDICTION,
    )?;
    info!("initialized");

    let period = env.config.ctrl_period();
    loop {
        let cmd = cmd_sub.latest();
        let heading = snapshot_sub.latest().rotat_disp;
        let (trans, rotat) = split_command(&cmd, heading);
        trans_pub.publish(trans);
        rotat_pub.publish(rotat);
        thread::sleep(period);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use striker_common::math::Vec3;
    use striker_common::motion::CtrlMode;

    fn cmd(setpoint: Vec3, mode: CtrlMode, ref_frame: RefFrame) -> MotionCmd {
        MotionCmd {
            setpoint_3d: setpoint,
            mode,
            ref_frame,
        }
    }

    #[test]
    fn body_frame_passes_through() {
        let (trans, rotat) = split_command(
            &cmd(Vec3::new(3.0, 4.0, 30.0), CtrlMode::TVRV, RefFrame::BodyFrame),
            45.0,
        );
        assert_eq!(trans.kind, SetpointKind::Velocity);
        assert_eq!(trans.value, Vec2::new(3.0, 4.0));
        assert_eq!(rotat.kind, SetpointKind::Velocity);
        assert_eq!(rotat.value, 30.0);
    }

    #[test]
    fn world_frame_rotates_into_body() {
        // robot heading 90° → a world-frame +x target is body-frame -y
        let (trans, _) = split_command(
            &cmd(Vec3::new(1.0, 0.0, 0.0), CtrlMode::TVRV, RefFrame::WorldFrame),
            90.0,
        );
        assert!((trans.value.x - 0.0).abs() < 1e-12);
        assert!((trans.value.y - (-1.0)).abs() < 1e-12);
    }

    #[test]
    fn mode_tags_both_axes() {
        let (trans, rotat) = split_command(
            &cmd(Vec3::new(1.0, 1.0, 10.0), CtrlMode::TDRV, RefFrame::BodyFrame),
            0.0,
        );
        assert_eq!(trans.kind, SetpointKind::Displacement);
        assert_eq!(rotat.kind, SetpointKind::Velocity);

        let (trans, rotat) = split_command(
            &cmd(Vec3::new(1.0, 1.0, 10.0), CtrlMode::TVRD, RefFrame::BodyFrame),
            0.0,
        );
        assert_eq!(trans.kind, SetpointKind::Velocity);
        assert_eq!(rotat.kind, SetpointKind::Displacement);
    }

    #[test]
    fn displacement_heading_is_wrapped() {
        let (_, rotat) = split_command(
            &cmd(Vec3::new(0.0, 0.0, 270.0), CtrlMode::TVRD, RefFrame::BodyFrame),
            0.0,
        );
        assert_eq!(rotat.value, -90.0);
        // velocity targets are rates, not angles — no wrapping
        let (_, rotat) = split_command(
            &cmd(Vec3::new(0.0, 0.0, 270.0), CtrlMode::TVRV, RefFrame::BodyFrame),
            0.0,
        );
        assert_eq!(rotat.value, 270.0);
    }
}
