//! Module lifecycle glue.
//!
//! Every long-running piece of the runtime is a [`BotModule`]: constructed
//! once, dispatched once onto a pool worker, running forever. Modules know
//! nothing of each other — they receive a [`ModuleEnv`] with the broker and
//! the loaded configuration and bind their own topics during startup.
//!
//! Subscriptions go through the retry helpers below: `NotBound` is
//! transient while the producing module is still starting, so binds are
//! retried until they succeed and module startup order does not matter.
//! A `TypeMismatch` is permanent and is returned to the module, which is
//! expected to safe the robot and give up its task.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use striker_common::config::BotConfig;
use striker_common::consts::SUBSCRIBE_RETRY_MS;
use striker_common::topics;
use striker_pubsub::{
    Broker, BrokerError, BrokerResult, LatestSubscriber, PoolHandle, QueueSubscriber, ThreadPool,
};
use tracing::{error, info};

/// Everything a module task needs: the broker, the configuration, and a
/// pool handle for child tasks.
#[derive(Clone)]
pub struct ModuleEnv {
    pub broker: Arc<Broker>,
    pub config: Arc<BotConfig>,
    pub pool: PoolHandle,
}

impl ModuleEnv {
    pub fn new(broker: Arc<Broker>, config: Arc<BotConfig>, pool: &ThreadPool) -> Self {
        Self {
            broker,
            config,
            pool: pool.handle(),
        }
    }
}

/// A long-running runtime module.
pub trait BotModule: Send + 'static {
    /// Stable name used in log output.
    fn name(&self) -> &'static str;

    /// The task body. Runs on a pool worker and normally never returns;
    /// returning is the failure path after the module has safed itself.
    fn task(&mut self, env: &ModuleEnv);
}

/// Dispatch a module's task onto the pool. Returns immediately.
pub fn spawn_module<M: BotModule>(mut module: M, pool: &ThreadPool, env: ModuleEnv) {
    pool.execute(move || {
        info!(module = module.name(), "thread started");
        module.task(&env);
        error!(module = module.name(), "module task ended");
    });
}

/// Bind a latest-value subscription, retrying while the slot does not
/// exist yet. Any error other than `NotBound` is permanent.
pub fn subscribe_latest<T: Clone + Send + Sync + 'static>(
    env: &ModuleEnv,
    channel: &str,
    topic: &str,
) -> BrokerResult<LatestSubscriber<T>> {
    loop {
        match LatestSubscriber::subscribe(&env.broker, channel, topic) {
            Ok(subscriber) => return Ok(subscriber),
            Err(BrokerError::NotBound { .. }) => {
                thread::sleep(Duration::from_millis(SUBSCRIBE_RETRY_MS));
            }
            Err(fatal) => return Err(fatal),
        }
    }
}

/// Bind a queued subscription, retrying while the slot does not exist yet.
pub fn subscribe_queued<T: Send + Sync + 'static>(
    env: &ModuleEnv,
    channel: &str,
    topic: &str,
) -> BrokerResult<QueueSubscriber<T>> {
    loop {
        match QueueSubscriber::subscribe(&env.broker, channel, topic) {
            Ok(subscriber) => return Ok(subscriber),
            Err(BrokerError::NotBound { .. }) => {
                thread::sleep(Duration::from_millis(SUBSCRIBE_RETRY_MS));
            }
            Err(fatal) => return Err(fatal),
        }
    }
}

/// Gate over the safety-enable topic.
///
/// False is the default and the safe state; upstream decode or connection
/// failures publish false, and the control cascade halts on it.
pub struct EnableGate {
    subscriber: LatestSubscriber<bool>,
}

impl EnableGate {
    /// Bind the gate, retrying through the startup barrier.
    pub fn bind(env: &ModuleEnv) -> BrokerResult<Self> {
        Ok(Self {
            subscriber: subscribe_latest(
                env,
                topics::AI_CONNECTION_CHANNEL,
                topics::SAFETY_ENABLE,
            )?,
        })
    }

    /// Current enable state.
    pub fn is_enabled(&self) -> bool {
        self.subscriber.latest()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use striker_pubsub::Publisher;

    fn env() -> ModuleEnv {
        let pool = ThreadPool::new(2).unwrap();
        ModuleEnv::new(Broker::new(), Arc::new(BotConfig::default()), &pool)
    }

    #[test]
    fn subscribe_latest_waits_for_publisher() {
        let env = env();
        let broker = Arc::clone(&env.broker);
        let waiter = {
            let env = env.clone();
            thread::spawn(move || subscribe_latest::<i32>(&env, "glue", "tp").map(|s| s.latest()))
        };
        thread::sleep(Duration::from_millis(30));
        let _publisher = Publisher::latest(&broker, "glue", "tp", 4_i32).unwrap();
        assert_eq!(waiter.join().unwrap().unwrap(), 4);
    }

    #[test]
    fn subscribe_latest_surfaces_type_mismatch() {
        let env = env();
        let _publisher = Publisher::latest(&env.broker, "glue", "typed", 1_i32).unwrap();
        let err = subscribe_latest::<f64>(&env, "glue", "typed").unwrap_err();
        assert!(matches!(err, BrokerError::TypeMismatch { .. }));
    }

    #[test]
    fn enable_gate_defaults_to_disabled() {
        let env = env();
        let publisher = Publisher::latest(
            &env.broker,
            topics::AI_CONNECTION_CHANNEL,
            topics::SAFETY_ENABLE,
            false,
        )
        .unwrap();
        let gate = EnableGate::bind(&env).unwrap();
        assert!(!gate.is_enabled());
        publisher.publish(true);
        assert!(gate.is_enabled());
        publisher.publish(false);
        assert!(!gate.is_enabled());
    }

    #[test]
    fn spawn_module_runs_task_on_pool() {
        struct Probe(std::sync::mpsc::Sender<&'static str>);
        impl BotModule for Probe {
            fn name(&self) -> &'static str {
                "probe"
            }
            fn task(&mut self, _env: &ModuleEnv) {
                self.0.send("ran").unwrap();
            }
        }

        let pool = ThreadPool::new(1).unwrap();
        let env = ModuleEnv::new(Broker::new(), Arc::new(BotConfig::default()), &pool);
        let (tx, rx) = std::sync::mpsc::channel();
        spawn_module(Probe(tx), &pool, env);
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "ran");
    }
}
