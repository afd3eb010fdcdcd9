//! Cascaded PID control subsystem.
//!
//! Five controllers, two axes. Displacement and velocity are not linearly
//! independent, so per axis exactly one of the two controllers runs each
//! tick and the conjugate one is re-initialized — the integral-windup reset
//! on mode switches falls out of the dispatch. Translational and rotational
//! axes are independent and always both active.
//!
//! [`Cascade`] is the pure per-tick computation; [`ControlSubsystem`] wraps
//! it in the enable-gated module task that reads the setpoint/feedback
//! topics and publishes actuator commands at the control frequency.

use std::thread;
use std::time::Duration;

use striker_common::firmware::FirmwareCommand;
use striker_common::gains::GainTable;
use striker_common::math::{Vec2, Vec3};
use striker_common::motion::{MotionSnapshot, Setpoint, SetpointKind};
use striker_common::topics;
use striker_pubsub::{BrokerResult, Publisher};
use tracing::{error, info};

use crate::module::{BotModule, EnableGate, ModuleEnv, subscribe_latest};
use crate::pid::PidController;

/// Signed minimum-magnitude rotational error in `(-180, 180]` degrees.
///
/// When target and actual share a sign both lie in the same half-turn and
/// the direct difference is already the short path. Opposite signs mean one
/// is in `(0, 180]` and the other in `(-180, 0)`; the ±360 alternative is
/// then compared and the smaller magnitude wins. Sign-bit comparison keeps
/// `-0.0` on the negative side; for same-sign operands the alternative
/// branch is unreachable, so exact zeros resolve to the same error either
/// way.
pub fn min_angle_error(target_deg: f64, actual_deg: f64) -> f64 {
    let error = target_deg - actual_deg;
    if target_deg.is_sign_negative() == actual_deg.is_sign_negative() {
        return error;
    }
    let alternative = if error > 0.0 {
        error - 360.0
    } else {
        error + 360.0
    };
    if error.abs() < alternative.abs() {
        error
    } else {
        alternative
    }
}

/// Cap the assembled `(tx, ty, rz)` vector to Euclidean norm `cap`.
///
/// The norm check also guards the division: it only happens for
/// `norm > cap > 0`.
pub fn saturate(output: Vec3, cap: f64) -> Vec3 {
    let norm = output.norm();
    if norm > cap {
        output * (cap / norm)
    } else {
        output
    }
}

/// The five-controller cascade state.
pub struct Cascade {
    rotat_disp: PidController<f64>,
    rotat_vel: PidController<f64>,
    trans_disp: PidController<Vec2>,
    trans_vel: PidController<Vec2>,
    /// Reserved for directional correction; re-initialized with the others
    /// but never invoked.
    direction: PidController<Vec2>,
    frequency_hz: f64,
    output_cap: f64,
}

impl Cascade {
    pub fn new(gains: &GainTable, frequency_hz: f64, output_cap: f64) -> Self {
        Self {
            rotat_disp: PidController::new(gains.rd),
            rotat_vel: PidController::new(gains.rv),
            trans_disp: PidController::new(gains.td),
            trans_vel: PidController::new(gains.tv),
            direction: PidController::new(gains.dir),
            frequency_hz,
            output_cap,
        }
    }

    /// Re-initialize all five controllers at the control frequency.
    /// Runs at the start of every enable cycle.
    pub fn reinit(&mut self) {
        self.rotat_disp.init(self.frequency_hz);
        self.rotat_vel.init(self.frequency_hz);
        self.trans_disp.init(self.frequency_hz);
        self.trans_vel.init(self.frequency_hz);
        self.direction.init(self.frequency_hz);
    }

    /// Push a fresh gain table into all five controllers.
    pub fn update_gains(&mut self, gains: &GainTable) {
        self.rotat_disp.update_gains(gains.rd);
        self.rotat_vel.update_gains(gains.rv);
        self.trans_disp.update_gains(gains.td);
        self.trans_vel.update_gains(gains.tv);
        self.direction.update_gains(gains.dir);
    }

    /// One control step: dispatch each axis on its setpoint kind, run the
    /// active controller, re-initialize the conjugate one, assemble and
    /// saturate the output vector.
    pub fn tick(
        &mut self,
        feedback: &MotionSnapshot,
        trans: Setpoint<Vec2>,
        rotat: Setpoint<f64>,
    ) -> Vec3 {
        let rz = match rotat.kind {
            SetpointKind::Displacement => {
                let error = min_angle_error(rotat.value, feedback.rotat_disp);
                self.rotat_vel.init(self.frequency_hz);
                self.rotat_disp.calculate(error)
            }
            SetpointKind::Velocity => {
                self.rotat_disp.init(self.frequency_hz);
                self.rotat_vel.calculate(rotat.value - feedback.rotat_vel)
            }
        };

        let txy = match trans.kind {
            SetpointKind::Displacement => {
                self.trans_vel.init(self.frequency_hz);
                self.trans_disp.calculate(trans.value - feedback.trans_disp)
            }
            SetpointKind::Velocity => {
                self.trans_disp.init(self.frequency_hz);
                self.trans_vel.calculate(trans.value - feedback.trans_vel)
            }
        };

        saturate(Vec3::new(txy.x, txy.y, rz), self.output_cap)
    }
}

/// The control subsystem module: owns a [`Cascade`] and drives it from the
/// broker at the configured frequency.
#[derive(Debug, Default)]
pub struct ControlSubsystem;

impl BotModule for ControlSubsystem {
    fn name(&self) -> &'static str {
        "control subsystem"
    }

    fn task(&mut self, env: &ModuleEnv) {
        // The command slot defaults to halt, so consumers are safe from the
        // moment this publisher exists.
        let command_pub = match Publisher::latest(
            &env.broker,
            topics::FIRMWARE_CHANNEL,
            topics::FIRMWARE_COMMANDS,
            FirmwareCommand::halt(),
        ) {
            Ok(publisher) => publisher,
            Err(e) => {
                error!(error = %e, "command topic bind failed");
                return;
            }
        };

        if let Err(e) = run_loop(env, &command_pub) {
            error!(error = %e, "control subsystem failed, publishing halt");
            command_pub.publish(FirmwareCommand::halt());
        }
    }
}

fn run_loop(env: &ModuleEnv, command_pub: &Publisher<FirmwareCommand>) -> BrokerResult<()> {
    let gains_sub =
        subscribe_latest::<GainTable>(env, topics::PID_CHANNEL, topics::PID_CONSTANTS)?;
    let snapshot_sub = subscribe_latest::<MotionSnapshot>(
        env,
        topics::MOTION_EKF_CHANNEL,
        topics::MOTION_PREDICTION,
    )?;
    let trans_sub = subscribe_latest::<Setpoint<Vec2>>(
        env,
        topics::MOTION_MODULE_CHANNEL,
        topics::TRANS_SETPOINT,
    )?;
    let rotat_sub = subscribe_latest::<Setpoint<f64>>(
        env,
        topics::MOTION_MODULE_CHANNEL,
        topics::ROTAT_SETPOINT,
    )?;
    let kicker_sub =
        subscribe_latest::<Vec2>(env, topics::KICKER_CHANNEL, topics::KICKING_SETPOINT)?;
    let dribbler_sub =
        subscribe_latest::<bool>(env, topics::CMD_SERVER_CHANNEL, topics::ENABLE_DRIBBLER)?;
    let enable = EnableGate::bind(env)?;
    info!("initialized");

    let control = env.config.control;
    let period = env.config.ctrl_period();
    let mut cascade = Cascade::new(&env.config.gains, control.ctrl_frequency, control.output_cap);

    // Upstream modules need a moment to replace stale defaults before the
    // cascade starts consuming them.
    thread::sleep(Duration::from_millis(control.init_delay_ms));
    info!("control loop started");

    loop {
        cascade.reinit();

        while enable.is_enabled() {
            cascade.update_gains(&gains_sub.latest());

            let mut feedback = snapshot_sub.latest();
            if control.simulator_feedback {
                // Simulator-derived velocities are too noisy to close the
                // loop on; zeroing them turns the velocity controllers into
                // setpoint pass-throughs.
                feedback.trans_vel = Vec2::ZERO;
                feedback.rotat_vel = 0.0;
            }

            let output = cascade.tick(&feedback, trans_sub.latest(), rotat_sub.latest());

            command_pub.publish(FirmwareCommand {
                init: true,
                translational_output: output.xy(),
                rotational_output: output.z,
                kicker: kicker_sub.latest(),
                dribbler: dribbler_sub.latest(),
            });

            thread::sleep(period);
        }

        command_pub.publish(FirmwareCommand::halt());
        while !enable.is_enabled() {
            thread::sleep(period);
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
