//! Virtual firmware client.
//!
//! Kinematic stand-in for the microcontroller link during simulator runs:
//! samples the actuator command topic at the control rate, integrates a
//! first-order body model, and streams the resulting odometry onto the
//! queued telemetry topic. The real wire client replaces this module behind
//! the same two topics.

use std::thread;
use tracing::{error, info};

use striker_common::firmware::{FirmwareCommand, TelemetryPacket};
use striker_common::math::{Vec2, wrap_deg};
use striker_common::topics;
use striker_control::module::{BotModule, ModuleEnv, subscribe_latest};
use striker_pubsub::{BrokerResult, Publisher};

/// Integrated odometry state of the simulated body.
#[derive(Debug, Clone, Copy, Default)]
struct SimState {
    /// World-frame position.
    position: Vec2,
    /// Heading [deg] in `(-180, 180]`.
    heading: f64,
    /// Body-frame velocity of the last step.
    velocity: Vec2,
    /// Rotational rate of the last step [deg/s].
    omega: f64,
}

impl SimState {
    /// Advance one step: drive outputs map directly onto body rates.
    fn integrate(&mut self, cmd: &FirmwareCommand, dt: f64) {
        self.velocity = cmd.translational_output;
        self.omega = cmd.rotational_output;
        self.position += self.velocity.rotated_deg(self.heading) * dt;
        self.heading = wrap_deg(self.heading + self.omega * dt);
    }

    fn telemetry(&self) -> TelemetryPacket {
        TelemetryPacket {
            translational_displacement: self.position,
            translational_velocity: self.velocity,
            rotational_displacement: self.heading,
            rotational_velocity: self.omega,
        }
    }
}

/// The virtual firmware client module.
#[derive(Debug, Default)]
pub struct VirtualFirmwareClient;

impl BotModule for VirtualFirmwareClient {
    fn name(&self) -> &'static str {
        "virtual firmware client"
    }

    fn task(&mut self, env: &ModuleEnv) {
        if let Err(e) = run(env) {
            error!(error = %e, "virtual firmware client failed");
        }
    }
}

fn run(env: &ModuleEnv) -> BrokerResult<()> {
    let telemetry_pub = Publisher::queued(
        &env.broker,
        topics::FIRMWARE_CHANNEL,
        topics::FIRMWARE_TELEMETRY,
        env.config.runtime.telemetry_queue_cap,
    )?;
    let command_sub = subscribe_latest::<FirmwareCommand>(
        env,
        topics::FIRMWARE_CHANNEL,
        topics::FIRMWARE_COMMANDS,
    )?;
    let init_sub = subscribe_latest::<bool>(env, topics::FIRMWARE_CHANNEL, topics::INIT_SENSORS)?;
    info!("initialized");

    let period = env.config.ctrl_period();
    let dt = period.as_secs_f64();
    let mut state = SimState::default();

    loop {
        if init_sub.has_changed() && init_sub.latest() {
            state = SimState::default();
            info!("sensors re-initialized");
        }

        state.integrate(&command_sub.latest(), dt);
        telemetry_pub.publish(state.telemetry());
        thread::sleep(period);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 0.01;

    fn drive(translational: Vec2, rotational: f64) -> FirmwareCommand {
        FirmwareCommand {
            translational_output: translational,
            rotational_output: rotational,
            ..FirmwareCommand::halt()
        }
    }

    #[test]
    fn halt_command_keeps_the_body_still() {
        let mut state = SimState::default();
        for _ in 0..100 {
            state.integrate(&FirmwareCommand::halt(), DT);
        }
        assert_eq!(state.position, Vec2::ZERO);
        assert_eq!(state.heading, 0.0);
    }

    #[test]
    fn forward_drive_integrates_position() {
        let mut state = SimState::default();
        for _ in 0..100 {
            state.integrate(&drive(Vec2::new(5.0, 0.0), 0.0), DT);
        }
        // 5 units/s for 1 s
        assert!((state.position.x - 5.0).abs() < 1e-9);
        assert!(state.position.y.abs() < 1e-9);
    }

    #[test]
    fn heading_wraps_during_spin() {
        let mut state = SimState::default();
        // 90 deg/s for 3 s → 270° of turn → wraps to -90°
        for _ in 0..300 {
            state.integrate(&drive(Vec2::ZERO, 90.0), DT);
        }
        assert!((state.heading - (-90.0)).abs() < 1e-6);
    }

    #[test]
    fn body_velocity_follows_heading() {
        let mut state = SimState {
            heading: 90.0,
            ..Default::default()
        };
        state.integrate(&drive(Vec2::new(1.0, 0.0), 0.0), DT);
        // body +x at a 90° heading moves the body along world +y
        assert!(state.position.x.abs() < 1e-9);
        assert!((state.position.y - 1.0 * DT).abs() < 1e-12);
    }

    #[test]
    fn telemetry_mirrors_state() {
        let mut state = SimState::default();
        state.integrate(&drive(Vec2::new(2.0, -1.0), 30.0), DT);
        let packet = state.telemetry();
        assert_eq!(packet.translational_velocity, Vec2::new(2.0, -1.0));
        assert_eq!(packet.rotational_velocity, 30.0);
        assert_eq!(packet.translational_displacement, state.position);
        assert_eq!(packet.rotational_displacement, state.heading);
    }
}
