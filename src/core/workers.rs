//! Background thread pool for network and disk work (manifest fetch, frame resolve)
//!
//! Uses work-stealing deques so a burst of navigation events spreads over
//! idle threads. Jobs submitted with an epoch are skipped when the epoch has
//! moved on before a worker gets to them.

use crossbeam::deque::{Injector, Stealer, Worker};
use log::{error, trace};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::entities::WorkerPool;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Grace period for in-flight jobs on shutdown (a download may be mid-stream)
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Worker pool with a global injector and per-thread deques.
///
/// # Example
/// ```ignore
/// let epoch = Epoch::new();
/// let workers = Workers::new(2, epoch.shared())?;
///
/// let token = epoch.increment();
/// workers.execute_with_epoch(token, move || {
///     // skipped if another request bumped the epoch first
/// });
/// ```
pub struct Workers {
    injector: Arc<Injector<Job>>,
    handles: Vec<thread::JoinHandle<()>>,
    current_epoch: Arc<AtomicU64>,
    shutdown: Arc<AtomicBool>,
}

impl Workers {
    /// Spawn `num_threads` workers sharing `epoch` with the requester.
    ///
    /// A small pool is enough here: work is I/O bound and at most one frame
    /// request is live at a time. Threads that fail to start are logged and
    /// skipped; if none starts the spawn error is returned, since queued
    /// jobs would otherwise never run.
    pub fn new(num_threads: usize, epoch: Arc<AtomicU64>) -> io::Result<Self> {
        Self::with_spawner(num_threads, epoch, |name, body| {
            thread::Builder::new().name(name).spawn(body)
        })
    }

    fn with_spawner<S>(num_threads: usize, epoch: Arc<AtomicU64>, mut spawn: S) -> io::Result<Self>
    where
        S: FnMut(String, Job) -> io::Result<thread::JoinHandle<()>>,
    {
        let num_threads = num_threads.max(1);
        let injector: Arc<Injector<Job>> = Arc::new(Injector::new());
        let shutdown = Arc::new(AtomicBool::new(false));

        let locals: Vec<Worker<Job>> = (0..num_threads).map(|_| Worker::new_fifo()).collect();
        let stealers: Vec<Stealer<Job>> = locals.iter().map(Worker::stealer).collect();

        let mut handles = Vec::with_capacity(num_threads);
        let mut last_error = None;
        for (worker_id, local) in locals.into_iter().enumerate() {
            let injector = Arc::clone(&injector);
            let shutdown = Arc::clone(&shutdown);
            let stealers = stealers.clone();

            let body: Job = Box::new(move || {
                trace!("Worker {} started", worker_id);
                loop {
                    if let Some(job) = next_job(&local, &injector, &stealers) {
                        job();
                        continue;
                    }
                    if shutdown.load(Ordering::Relaxed) {
                        break;
                    }
                    // No work - short sleep to avoid CPU spin
                    thread::sleep(Duration::from_millis(1));
                }
                trace!("Worker {} stopped", worker_id);
            });

            match spawn(format!("radarloop-worker-{}", worker_id), body) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    error!("Failed to spawn worker {}: {}", worker_id, e);
                    last_error = Some(e);
                }
            }
        }

        if handles.is_empty() {
            return Err(last_error.unwrap_or_else(|| io::Error::other("no worker threads started")));
        }
        trace!("Workers initialized: {} threads", handles.len());

        Ok(Self {
            injector,
            handles,
            current_epoch: epoch,
            shutdown,
        })
    }

    /// Number of running worker threads.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Execute closure on a worker thread.
    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.injector.push(Box::new(f));
    }

    /// Execute closure only if `epoch` is still current at pickup time.
    ///
    /// The check runs when a worker dequeues the job, not at enqueue time, so
    /// requests superseded while waiting in the queue never start.
    pub fn execute_with_epoch<F>(&self, epoch: u64, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let current_epoch = Arc::clone(&self.current_epoch);
        self.injector.push(Box::new(move || {
            if current_epoch.load(Ordering::Acquire) == epoch {
                f();
            } else {
                trace!("Skipping stale job (epoch {})", epoch);
            }
        }));
    }
}

fn next_job(local: &Worker<Job>, injector: &Injector<Job>, stealers: &[Stealer<Job>]) -> Option<Job> {
    if let Some(job) = local.pop() {
        return Some(job);
    }
    if let Some(job) = injector.steal_batch_and_pop(local).success() {
        return Some(job);
    }
    stealers.iter().find_map(|s| s.steal().success())
}

impl Drop for Workers {
    fn drop(&mut self) {
        let num_threads = self.handles.len();
        trace!("Workers shutting down ({} threads)...", num_threads);

        self.shutdown.store(true, Ordering::SeqCst);

        let deadline = Instant::now() + SHUTDOWN_GRACE;
        for handle in std::mem::take(&mut self.handles) {
            while !handle.is_finished() {
                if Instant::now() >= deadline {
                    // Stuck on a socket; let it die with the process
                    trace!("Shutdown timeout reached, detaching remaining workers");
                    return;
                }
                thread::sleep(Duration::from_millis(1));
            }
            let _ = handle.join();
        }

        trace!("All {} workers stopped", num_threads);
    }
}

impl WorkerPool for Workers {
    fn execute(&self, f: Box<dyn FnOnce() + Send + 'static>) {
        Workers::execute(self, f)
    }

    fn execute_with_epoch(&self, epoch: u64, f: Box<dyn FnOnce() + Send + 'static>) {
        Workers::execute_with_epoch(self, epoch, f)
    }
}
