//! Preallocated fixed-size thread pool.
//!
//! Workers are spawned once; `execute` enqueues a job and returns
//! immediately. There is no work stealing and no priority — module tasks
//! are long-lived and effectively pin their worker for the process
//! lifetime. A task may enqueue child tasks through a cloned [`PoolHandle`].

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use tracing::debug;

type Job = Box<dyn FnOnce() + Send + 'static>;

struct PoolShared {
    queue: Mutex<VecDeque<Job>>,
    available: Condvar,
    shutdown: AtomicBool,
}

/// Cloneable submission handle; safe to capture inside pool tasks.
#[derive(Clone)]
pub struct PoolHandle {
    shared: Arc<PoolShared>,
}

impl PoolHandle {
    /// Enqueue a job and return immediately.
    pub fn execute<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.queue.lock().push_back(Box::new(job));
        self.shared.available.notify_one();
    }
}

/// Fixed pool of preallocated worker threads.
pub struct ThreadPool {
    shared: Arc<PoolShared>,
    size: usize,
}

impl ThreadPool {
    /// Spawn `size` workers up front.
    pub fn new(size: usize) -> std::io::Result<Self> {
        let shared = Arc::new(PoolShared {
            queue: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
            shutdown: AtomicBool::new(false),
        });

        let size = size.max(1);
        for id in 0..size {
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name(format!("pool-worker-{id}"))
                .spawn(move || worker_loop(&shared))?;
        }
        debug!(size, "thread pool ready");

        Ok(Self { shared, size })
    }

    /// Number of preallocated workers.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Enqueue a job and return immediately.
    pub fn execute<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.handle().execute(job);
    }

    /// A cloneable submission handle for child tasks.
    pub fn handle(&self) -> PoolHandle {
        PoolHandle {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Drop for ThreadPool {
    /// Signal idle workers to exit. Long-running jobs are not interrupted;
    /// cancellation in this runtime is cooperative (enable-signal gated).
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        self.shared.available.notify_all();
    }
}

fn worker_loop(shared: &PoolShared) {
    loop {
        let job = {
            let mut queue = shared.queue.lock();
            loop {
                if let Some(job) = queue.pop_front() {
                    break job;
                }
                if shared.shutdown.load(Ordering::SeqCst) {
                    return;
                }
                shared.available.wait(&mut queue);
            }
        };
        job();
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
