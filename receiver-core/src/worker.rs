//! The single-consumer task queue pinned to one dedicated thread that owns
//! the DSP graph.
//!
//! A dedicated [`std::thread`] fed by a channel, with an RAII-friendly
//! shutdown path — the same shape as a resilient reactor thread that polls
//! blocking I/O sources, except this worker drains an unbounded queue of
//! boxed closures in strict FIFO order instead of polling anything.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use tokio::sync::mpsc;

use crate::error::WorkerError;

/// A unit of work submitted to the worker: a diagnostic name (typically the
/// caller's function name) plus the closure itself.
type Task = Box<dyn FnOnce() + Send + 'static>;

enum Job {
    Run { name: &'static str, task: Task },
    Shutdown,
}

/// Handle to the dedicated worker thread. Cloning shares the same thread;
/// dropping the last handle does not stop the thread (use [`Worker::stop`]
/// explicitly, mirroring the façade's ownership of its own lifecycle).
#[derive(Clone)]
pub struct Worker {
    inner: Arc<Inner>,
}

struct Inner {
    sender: mpsc::UnboundedSender<Job>,
    paused: AtomicBool,
    join: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl Worker {
    /// Spawns the dedicated thread and starts draining tasks immediately.
    pub fn start() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel::<Job>();

        let handle = std::thread::Builder::new()
            .name("receiver-worker".into())
            .spawn(move || Self::run_loop(receiver))
            .expect("failed to spawn receiver worker thread");

        Worker {
            inner: Arc::new(Inner {
                sender,
                paused: AtomicBool::new(false),
                join: std::sync::Mutex::new(Some(handle)),
            }),
        }
    }

    fn run_loop(mut receiver: mpsc::UnboundedReceiver<Job>) {
        // A minimal current-thread runtime lets submitted closures `block_on`
        // short async calls (e.g. flushing a file sink) without leaving the
        // confinement thread.
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed to build worker-thread runtime");

        rt.block_on(async {
            while let Some(job) = receiver.recv().await {
                match job {
                    Job::Shutdown => break,
                    Job::Run { name, task } => {
                        let span = tracing::info_span!("worker_task", name);
                        let _enter = span.enter();
                        let result = panic::catch_unwind(AssertUnwindSafe(task));
                        if let Err(payload) = result {
                            tracing::error!(name, "worker task panicked: {payload:?}");
                        }
                    }
                }
            }
        });
        tracing::info!("receiver worker thread exiting");
    }

    /// Enqueues `task` unconditionally; returns once the closure is queued,
    /// not once it runs. Fails only if the worker has already stopped.
    pub fn submit<F>(&self, name: &'static str, task: F) -> Result<(), WorkerError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner
            .sender
            .send(Job::Run {
                name,
                task: Box::new(task),
            })
            .map_err(|_| WorkerError)
    }

    /// Whether the worker currently refuses new work. Façade commands check
    /// this *before* enqueuing and fail fast with `WORKER_BUSY`.
    pub fn is_paused(&self) -> bool {
        self.inner.paused.load(Ordering::Acquire)
    }

    pub fn pause(&self) {
        self.inner.paused.store(true, Ordering::Release);
    }

    pub fn resume(&self) {
        self.inner.paused.store(false, Ordering::Release);
    }

    /// Drains outstanding tasks and joins the dedicated thread. Idempotent:
    /// calling it twice is a no-op the second time.
    pub fn stop(&self) {
        self.pause();
        let handle = self.inner.join.lock().unwrap().take();
        if let Some(handle) = handle {
            // A shutdown sentinel is FIFO-ordered behind every task already
            // submitted, so the loop drains everything queued before it
            // breaks.
            let _ = self.inner.sender.send(Job::Shutdown);
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc as std_mpsc;

    #[test]
    fn submits_run_in_fifo_order() {
        let worker = Worker::start();
        let (tx, rx) = std_mpsc::channel();

        for i in 0..50 {
            let tx = tx.clone();
            worker.submit("test_task", move || tx.send(i).unwrap()).unwrap();
        }

        let observed: Vec<i32> = (0..50).map(|_| rx.recv().unwrap()).collect();
        assert_eq!(observed, (0..50).collect::<Vec<_>>());
        worker.stop();
    }

    #[test]
    fn panicking_task_does_not_kill_the_worker() {
        let worker = Worker::start();
        worker.submit("boom", || panic!("expected")).unwrap();

        let (tx, rx) = std_mpsc::channel();
        worker.submit("after", move || tx.send(()).unwrap()).unwrap();
        rx.recv_timeout(std::time::Duration::from_secs(2)).unwrap();
        worker.stop();
    }

    #[test]
    fn paused_worker_reports_paused() {
        let worker = Worker::start();
        assert!(!worker.is_paused());
        worker.pause();
        assert!(worker.is_paused());
        worker.stop();
    }

    #[test]
    fn stop_is_idempotent() {
        let worker = Worker::start();
        worker.stop();
        worker.stop();
    }
}
