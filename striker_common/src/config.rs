//! Runtime configuration loading.
//!
//! One TOML file overrides the compile-time defaults in [`crate::consts`].
//! Every section is optional; an absent file is not an error at the call
//! sites that opt into defaults, but a present file must parse and validate.
//!
//! # TOML Example
//!
//! ```toml
//! log_level = "debug"
//!
//! [control]
//! ctrl_frequency = 100.0
//! simulator_feedback = true
//!
//! [gains.rd]
//! kp = 0.5
//! ki = 0.0
//! kd = 0.01
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::consts;
use crate::gains::GainTable;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parsing failed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log verbosity for the tracing subscriber.
///
/// Serializes to lowercase strings: "trace", "debug", "info", "warn", "error".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive string accepted by the env-filter.
    pub const fn as_filter(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Control-loop section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Control loop frequency [Hz].
    pub ctrl_frequency: f64,
    /// Startup delay before the first enable cycle [ms].
    pub init_delay_ms: u64,
    /// Euclidean cap on the assembled output vector.
    pub output_cap: f64,
    /// Zero snapshot velocities before use (simulator runs only).
    pub simulator_feedback: bool,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            ctrl_frequency: consts::CTRL_FREQUENCY_HZ,
            init_delay_ms: consts::INIT_DELAY_MS,
            output_cap: consts::OUTPUT_CAP,
            simulator_feedback: false,
        }
    }
}

/// Network section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// UDP port for remote strategy commands.
    pub cmd_server_port: u16,
    /// TCP port for the connection/initialization server.
    pub conn_server_port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            cmd_server_port: consts::CMD_SERVER_PORT,
            conn_server_port: consts::CONN_SERVER_PORT,
        }
    }
}

/// Runtime section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Preallocated worker threads.
    pub thread_pool_size: usize,
    /// Bounded capacity of the firmware telemetry queue.
    pub telemetry_queue_cap: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            thread_pool_size: consts::THREAD_POOL_SIZE,
            telemetry_queue_cap: consts::TELEMETRY_QUEUE_CAP,
        }
    }
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BotConfig {
    pub log_level: Option<LogLevel>,
    pub control: ControlConfig,
    pub network: NetworkConfig,
    pub runtime: RuntimeConfig,
    pub gains: GainTable,
}

impl BotConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        let config: Self =
            toml::from_str(&raw).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Semantic validation beyond what serde enforces.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.control.ctrl_frequency > 0.0) || !self.control.ctrl_frequency.is_finite() {
            return Err(ConfigError::ValidationError(format!(
                "ctrl_frequency must be finite and positive, got {}",
                self.control.ctrl_frequency
            )));
        }
        if !(self.control.output_cap > 0.0) || !self.control.output_cap.is_finite() {
            return Err(ConfigError::ValidationError(format!(
                "output_cap must be finite and positive, got {}",
                self.control.output_cap
            )));
        }
        if self.runtime.thread_pool_size == 0 {
            return Err(ConfigError::ValidationError(
                "thread_pool_size must be at least 1".to_string(),
            ));
        }
        if self.runtime.telemetry_queue_cap == 0 {
            return Err(ConfigError::ValidationError(
                "telemetry_queue_cap must be at least 1".to_string(),
            ));
        }
        if self.network.cmd_server_port == self.network.conn_server_port {
            return Err(ConfigError::ValidationError(format!(
                "cmd_server_port and conn_server_port collide on {}",
                self.network.cmd_server_port
            )));
        }
        Ok(())
    }

    /// Control loop period [s].
    #[inline]
    pub fn ctrl_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.control.ctrl_frequency)
    }
}
