//! TCP connection server.
//!
//! One-shot initialization handshake with the remote AI: a line-based
//! protocol where `init <x> <y>` sets the robot's world-frame origin,
//! requests a sensor re-initialization, and raises the safety-enable
//! signal. Losing the connection drops safety-enable and the server goes
//! back to accepting.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};

use striker_common::math::Vec2;
use striker_common::topics;
use striker_control::{BotModule, ModuleEnv};
use striker_pubsub::{BrokerResult, Publisher};

/// Outcome of one protocol line.
#[derive(Debug, PartialEq)]
enum Request {
    /// `init <x> <y>`: world-frame origin of the robot.
    Init(Vec2),
    Invalid(&'static str),
}

fn parse_line(line: &str) -> Request {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        ["init", x, y] => match (x.parse::<f64>(), y.parse::<f64>()) {
            (Ok(x), Ok(y)) => Request::Init(Vec2::new(x, y)),
            _ => Request::Invalid("Invalid Arguments"),
        },
        ["init", ..] => Request::Invalid("Invalid Arguments"),
        [] => Request::Invalid("Empty Command"),
        _ => Request::Invalid("Invalid Command Received From Remote Side"),
    }
}

/// The connection server module.
#[derive(Debug, Default)]
pub struct ConnServer;

impl BotModule for ConnServer {
    fn name(&self) -> &'static str {
        "connection server"
    }

    fn task(&mut self, env: &ModuleEnv) {
        if let Err(e) = run(env) {
            error!(error = %e, "connection server failed");
        }
    }
}

struct ConnTopics {
    safety: Publisher<bool>,
    origin: Publisher<Vec2>,
    init_sensors: Publisher<bool>,
}

fn run(env: &ModuleEnv) -> BrokerResult<()> {
    let outputs = ConnTopics {
        safety: Publisher::latest(
            &env.broker,
            topics::AI_CONNECTION_CHANNEL,
            topics::SAFETY_ENABLE,
            false,
        )?,
        origin: Publisher::latest(
            &env.broker,
            topics::CONNECTION_CHANNEL,
            topics::ROBOT_ORIGIN,
            Vec2::ZERO,
        )?,
        init_sensors: Publisher::latest(
            &env.broker,
            topics::FIRMWARE_CHANNEL,
            topics::INIT_SENSORS,
            false,
        )?,
    };

    let port = env.config.network.conn_server_port;
    let listener = match TcpListener::bind(("0.0.0.0", port)) {
        Ok(listener) => listener,
        Err(e) => {
            error!(port, error = %e, "TCP bind failed");
            outputs.safety.publish(false);
            return Ok(());
        }
    };
    info!(port, "awaiting remote AI connection");

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                info!("connection established");
                if let Err(e) = serve(stream, &outputs) {
                    warn!(error = %e, "connection lost, disabling");
                }
                outputs.safety.publish(false);
            }
            Err(e) => {
                warn!(error = %e, "accept failed");
                outputs.safety.publish(false);
            }
        }
    }
    Ok(())
}

fn serve(mut stream: TcpStream, outputs: &ConnTopics) -> std::io::Result<()> {
    stream.write_all(b"CONNECTION ESTABLISHED\n")?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            // EOF: remote side went away
            return Ok(());
        }

        let reply = match parse_line(&line) {
            Request::Init(origin) => {
                outputs.init_sensors.publish(true);
                outputs.origin.publish(origin);
                outputs.safety.publish(true);
                info!(x = origin.x, y = origin.y, "initialized, safety enabled");
                "Initialized"
            }
            Request::Invalid(reason) => reason,
        };
        stream.write_all(format!("{reply}\n").as_bytes())?;
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_with_coordinates() {
        assert_eq!(
            parse_line("init 1.5 -2.25\n"),
            Request::Init(Vec2::new(1.5, -2.25))
        );
        assert_eq!(parse_line("init 0 0"), Request::Init(Vec2::ZERO));
    }

    #[test]
    fn init_argument_errors() {
        assert_eq!(parse_line("init"), Request::Invalid("Invalid Arguments"));
        assert_eq!(parse_line("init 1"), Request::Invalid("Invalid Arguments"));
        assert_eq!(
            parse_line("init one two"),
            Request::Invalid("Invalid Arguments")
        );
        assert_eq!(
            parse_line("init 1 2 3"),
            Request::Invalid("Invalid Arguments")
        );
    }

    #[test]
    fn unknown_commands_are_rejected() {
        assert_eq!(
            parse_line("reboot now"),
            Request::Invalid("Invalid Command Received From Remote Side")
        );
        assert_eq!(parse_line("   \n"), Request::Invalid("Empty Command"));
    }
}
