//! UDP command server.
//!
//! Receives JSON strategy packets from the remote server, decodes them into
//! the motion command, kicker setpoint and dribbler flag, and publishes all
//! three. A packet that fails to decode publishes `SafetyEnable = false` —
//! a garbled strategy stream must not keep driving the robot — and the
//! receive loop continues.

use serde::Deserialize;
use std::net::UdpSocket;
use tracing::{error, info, warn};

use striker_common::consts::UDP_RBUF_SIZE;
use striker_common::math::{Vec2, Vec3};
use striker_common::motion::{CtrlMode, MotionCmd, RefFrame};
use striker_common::topics;
use striker_control::{BotModule, ModuleEnv};
use striker_pubsub::{BrokerResult, Publisher};

/// Wire layout of one strategy packet.
#[derive(Debug, Deserialize)]
struct StrategyPacket {
    mode: u8,
    is_world_frame: bool,
    motion_set_point: Vec3,
    kicker_set_point: Vec2,
    #[serde(default)]
    enable_dribbler: bool,
}

/// Decode one datagram into the publishable triple.
fn decode_packet(raw: &[u8]) -> Result<(MotionCmd, Vec2, bool), serde_json::Error> {
    let packet: StrategyPacket = serde_json::from_slice(raw)?;
    let cmd = MotionCmd {
        setpoint_3d: packet.motion_set_point,
        mode: CtrlMode::from_wire(packet.mode),
        ref_frame: if packet.is_world_frame {
            RefFrame::WorldFrame
        } else {
            RefFrame::BodyFrame
        },
    };
    Ok((cmd, packet.kicker_set_point, packet.enable_dribbler))
}

/// The command server module.
#[derive(Debug, Default)]
pub struct CmdServer;

impl BotModule for CmdServer {
    fn name(&self) -> &'static str {
        "command server"
    }

    fn task(&mut self, env: &ModuleEnv) {
        if let Err(e) = run(env) {
            error!(error = %e, "command server failed");
        }
    }
}

fn run(env: &ModuleEnv) -> BrokerResult<()> {
    let cmd_pub = Publisher::latest(
        &env.broker,
        topics::CMD_SERVER_CHANNEL,
        topics::MOTION_CMD,
        MotionCmd::default(),
    )?;
    let dribbler_pub = Publisher::latest(
        &env.broker,
        topics::CMD_SERVER_CHANNEL,
        topics::ENABLE_DRIBBLER,
        false,
    )?;
    let kicker_pub = Publisher::latest(
        &env.broker,
        topics::KICKER_CHANNEL,
        topics::KICKING_SETPOINT,
        Vec2::ZERO,
    )?;
    let safety_pub = Publisher::latest(
        &env.broker,
        topics::AI_CONNECTION_CHANNEL,
        topics::SAFETY_ENABLE,
        false,
    )?;

    let port = env.config.network.cmd_server_port;
    let socket = match UdpSocket::bind(("0.0.0.0", port)) {
        Ok(socket) => socket,
        Err(e) => {
            error!(port, error = %e, "UDP bind failed");
            safety_pub.publish(false);
            return Ok(());
        }
    };
    info!(port, "listening for strategy commands");

    let mut buf = [0u8; UDP_RBUF_SIZE];
    loop {
        let received = match socket.recv_from(&mut buf) {
            Ok((len, _peer)) => &buf[..len],
            Err(e) => {
                warn!(error = %e, "receive failed");
                continue;
            }
        };

        match decode_packet(received) {
            Ok((cmd, kicker, dribbler)) => {
                cmd_pub.publish(cmd);
                kicker_pub.publish(kicker);
                dribbler_pub.publish(dribbler);
            }
            Err(e) => {
                warn!(error = %e, "undecodable strategy packet, disabling");
                safety_pub.publish(false);
            }
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_full_packet() {
        let raw = br#"{
            "mode": 1,
            "is_world_frame": true,
            "motion_set_point": {"x": 10.0, "y": -5.0, "z": 90.0},
            "kicker_set_point": {"x": 2.0, "y": 0.0},
            "enable_dribbler": true
        }"#;
        let (cmd, kicker, dribbler) = decode_packet(raw).unwrap();
        assert_eq!(cmd.mode, CtrlMode::TDRV);
        assert_eq!(cmd.ref_frame, RefFrame::WorldFrame);
        assert_eq!(cmd.setpoint_3d, Vec3::new(10.0, -5.0, 90.0));
        assert_eq!(kicker, Vec2::new(2.0, 0.0));
        assert!(dribbler);
    }

    #[test]
    fn dribbler_defaults_to_off() {
        let raw = br#"{
            "mode": 3,
            "is_world_frame": false,
            "motion_set_point": {"x": 0.0, "y": 0.0, "z": 0.0},
            "kicker_set_point": {"x": 0.0, "y": 0.0}
        }"#;
        let (cmd, _, dribbler) = decode_packet(raw).unwrap();
        assert_eq!(cmd.mode, CtrlMode::TVRV);
        assert_eq!(cmd.ref_frame, RefFrame::BodyFrame);
        assert!(!dribbler);
    }

    #[test]
    fn unknown_mode_falls_back_to_rate_control() {
        let raw = br#"{
            "mode": 200,
            "is_world_frame": false,
            "motion_set_point": {"x": 1.0, "y": 1.0, "z": 1.0},
            "kicker_set_point": {"x": 0.0, "y": 0.0}
        }"#;
        let (cmd, _, _) = decode_packet(raw).unwrap();
        assert_eq!(cmd.mode, CtrlMode::TVRV);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(decode_packet(b"not json at all").is_err());
        assert!(decode_packet(br#"{"mode": 1}"#).is_err());
    }
}
