//! Control plane of the striker runtime.
//!
//! The [`pid`] primitive is a single-variable PID generic over scalar and
//! planar errors. [`cascade`] composes five of them into the mode-switched
//! displacement/velocity cascade and hosts the enable-gated control task.
//! [`estimator`] adapts raw firmware telemetry into motion snapshots,
//! [`motion`] translates remote commands into per-axis setpoints, and
//! [`module`] is the lifecycle glue every long-running task is built on.

pub mod cascade;
pub mod estimator;
pub mod module;
pub mod motion;
pub mod pid;

pub use cascade::{Cascade, ControlSubsystem};
pub use estimator::MotionEstimator;
pub use module::{BotModule, ModuleEnv, spawn_module};
pub use motion::MotionModule;
pub use pid::{ControlVariable, PidController};
