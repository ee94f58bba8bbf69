//! Worker pool on OS threads with poison-pill shutdown.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender, TrySendError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use super::error::{PoolError, PoolResult};
use super::{PoolStats, WorkUnit};

/// Thread name prefix when the caller does not pick one.
const DEFAULT_POOL_NAME: &str = "worker";

/// What travels on the work queue.
enum Message {
    Run(WorkUnit),
    /// Poison pill: the worker that draws it stops.
    Terminate,
}

/// Why a non-blocking enqueue failed.
enum Rejected {
    Full,
    Closed,
}

/// Producer side of the work queue.
enum Dispatch {
    Unbounded(Sender<Message>),
    Bounded {
        tx: SyncSender<Message>,
        capacity: usize,
    },
}

impl Dispatch {
    /// A capacity of 0 gives an unbounded queue.
    fn channel(capacity: usize) -> (Self, Receiver<Message>) {
        if capacity == 0 {
            let (tx, rx) = mpsc::channel();
            (Dispatch::Unbounded(tx), rx)
        } else {
            let (tx, rx) = mpsc::sync_channel(capacity);
            (Dispatch::Bounded { tx, capacity }, rx)
        }
    }

    fn capacity(&self) -> Option<usize> {
        match self {
            Dispatch::Unbounded(_) => None,
            Dispatch::Bounded { capacity, .. } => Some(*capacity),
        }
    }

    /// Enqueue without waiting for room.
    fn try_send(&self, message: Message) -> Result<(), Rejected> {
        match self {
            Dispatch::Unbounded(tx) => tx.send(message).map_err(|_| Rejected::Closed),
            Dispatch::Bounded { tx, .. } => tx.try_send(message).map_err(|e| match e {
                TrySendError::Full(_) => Rejected::Full,
                TrySendError::Disconnected(_) => Rejected::Closed,
            }),
        }
    }

    /// Enqueue, waiting for room on a bounded queue.
    fn send(&self, message: Message) -> PoolResult<()> {
        let sent = match self {
            Dispatch::Unbounded(tx) => tx.send(message),
            Dispatch::Bounded { tx, .. } => tx.send(message),
        };
        sent.map_err(|_| PoolError::ChannelClosed)
    }
}

/// Shared counters, updated by submitters and workers.
#[derive(Default)]
struct Counters {
    live: AtomicUsize,
    pending: AtomicUsize,
    active: AtomicUsize,
    submitted: AtomicU64,
    completed: AtomicU64,
    panicked: AtomicU64,
    rejected: AtomicU64,
}

struct Worker {
    id: usize,
    handle: JoinHandle<()>,
}

/// A fixed set of worker threads consuming one FIFO queue.
///
/// Units are plain closures. Which worker runs a unit is unspecified;
/// workers keep no state between units. A unit that panics is logged
/// and the worker carries on.
///
/// `submit` and `shutdown` serialize on the queue sender, so every unit
/// accepted by `submit` is queued ahead of the poison pills and runs
/// before `shutdown` returns. Anything submitted after that point is
/// rejected with [`PoolError::Shutdown`].
pub struct WorkerPool {
    /// `None` once shutdown has begun.
    dispatch: Mutex<Option<Dispatch>>,
    workers: Mutex<Vec<Worker>>,
    size: usize,
    queue_capacity: Option<usize>,
    counters: Arc<Counters>,
    name: String,
}

impl WorkerPool {
    /// Create a pool of `size` workers over an unbounded queue.
    pub fn new(size: usize) -> PoolResult<Self> {
        Self::with_capacity(size, 0, DEFAULT_POOL_NAME)
    }

    /// Create a pool with a custom queue bound and thread name prefix.
    ///
    /// # Arguments
    /// * `size` - Number of worker threads (must be at least 1)
    /// * `queue_capacity` - Maximum queued units (0 = unbounded)
    /// * `name` - Prefix for thread names and log lines
    ///
    /// Returns once every worker thread is up and waiting for work.
    pub fn with_capacity(
        size: usize,
        queue_capacity: usize,
        name: impl Into<String>,
    ) -> PoolResult<Self> {
        if size == 0 {
            return Err(PoolError::InvalidSize(size));
        }

        let name = name.into();
        let (dispatch, rx) = Dispatch::channel(queue_capacity);
        let rx = Arc::new(Mutex::new(rx));
        let counters = Arc::new(Counters::default());
        let (ready_tx, ready_rx) = mpsc::channel::<usize>();

        let mut workers = Vec::with_capacity(size);

        for id in 0..size {
            let rx = Arc::clone(&rx);
            let counters = Arc::clone(&counters);
            let ready = ready_tx.clone();

            let spawned = thread::Builder::new()
                .name(format!("{}-{}", name, id))
                .spawn(move || Self::worker_loop(id, rx, counters, ready));

            match spawned {
                Ok(handle) => workers.push(Worker { id, handle }),
                Err(e) => {
                    tracing::error!(pool = %name, worker = id, error = %e, "failed to spawn worker");
                    Self::abort_startup(&dispatch, workers);
                    return Err(PoolError::Spawn(e.to_string()));
                }
            }
        }

        drop(ready_tx);
        let ready = ready_rx.iter().take(size).count();
        debug_assert_eq!(ready, size);

        tracing::info!(
            pool = %name,
            workers = size,
            capacity = queue_capacity,
            "worker pool created"
        );

        Ok(Self {
            queue_capacity: dispatch.capacity(),
            dispatch: Mutex::new(Some(dispatch)),
            workers: Mutex::new(workers),
            size,
            counters,
            name,
        })
    }

    /// Worker thread main loop.
    fn worker_loop(
        id: usize,
        rx: Arc<Mutex<Receiver<Message>>>,
        counters: Arc<Counters>,
        ready: Sender<usize>,
    ) {
        counters.live.fetch_add(1, Ordering::SeqCst);
        let _ = ready.send(id);
        drop(ready);

        tracing::debug!(worker = id, "worker started");

        loop {
            let message = {
                let guard = rx.lock().unwrap_or_else(PoisonError::into_inner);
                guard.recv()
            };

            match message {
                Ok(Message::Run(unit)) => {
                    counters.pending.fetch_sub(1, Ordering::SeqCst);
                    counters.active.fetch_add(1, Ordering::SeqCst);

                    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(unit)) {
                        counters.panicked.fetch_add(1, Ordering::SeqCst);
                        tracing::error!(
                            worker = id,
                            panic = %panic_message(payload.as_ref()),
                            "work unit panicked"
                        );
                    }

                    counters.active.fetch_sub(1, Ordering::SeqCst);
                    counters.completed.fetch_add(1, Ordering::SeqCst);
                }
                Ok(Message::Terminate) => break,
                // Every sender is gone, nothing more can arrive
                Err(_) => break,
            }
        }

        counters.live.fetch_sub(1, Ordering::SeqCst);
        tracing::debug!(worker = id, "worker stopped");
    }

    /// Stop the workers spawned so far after a failed spawn.
    fn abort_startup(dispatch: &Dispatch, workers: Vec<Worker>) {
        for _ in 0..workers.len() {
            if dispatch.send(Message::Terminate).is_err() {
                break;
            }
        }
        for worker in workers {
            let _ = worker.handle.join();
        }
    }

    /// Enqueue a unit of work. Never waits for a free worker.
    ///
    /// Fails with [`PoolError::Shutdown`] once shutdown has begun, and with
    /// [`PoolError::QueueFull`] when a bounded queue has no room.
    pub fn submit<F>(&self, unit: F) -> PoolResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let guard = self.lock_dispatch();

        let Some(dispatch) = guard.as_ref() else {
            self.counters.rejected.fetch_add(1, Ordering::SeqCst);
            return Err(PoolError::Shutdown);
        };

        // Count before sending so a fast worker never sees it go negative
        self.counters.pending.fetch_add(1, Ordering::SeqCst);

        match dispatch.try_send(Message::Run(Box::new(unit))) {
            Ok(()) => {
                self.counters.submitted.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            Err(rejected) => {
                self.counters.pending.fetch_sub(1, Ordering::SeqCst);
                self.counters.rejected.fetch_add(1, Ordering::SeqCst);
                Err(match rejected {
                    Rejected::Full => PoolError::QueueFull {
                        capacity: self.queue_capacity.unwrap_or_default(),
                        pending: self.pending_count(),
                    },
                    Rejected::Closed => PoolError::ChannelClosed,
                })
            }
        }
    }

    /// Stop accepting work, send one poison pill per worker and wait for
    /// every worker thread to exit.
    ///
    /// Units already accepted run first. A second call returns
    /// [`PoolError::Shutdown`] and does nothing. Must not be called from
    /// inside a unit running on this pool.
    pub fn shutdown(&self) -> PoolResult<()> {
        let dispatch = self.lock_dispatch().take().ok_or(PoolError::Shutdown)?;

        tracing::info!(
            pool = %self.name,
            workers = self.size,
            pending = self.pending_count(),
            "shutting down worker pool"
        );

        let mut result = Ok(());
        for _ in 0..self.size {
            if let Err(e) = dispatch.send(Message::Terminate) {
                result = Err(e);
                break;
            }
        }
        drop(dispatch);

        let workers = std::mem::take(&mut *self.workers.lock().unwrap_or_else(PoisonError::into_inner));
        for worker in workers {
            if worker.handle.join().is_err() {
                tracing::error!(pool = %self.name, worker = worker.id, "worker thread panicked");
            }
        }

        let stats = self.stats();
        tracing::info!(
            pool = %self.name,
            completed = stats.completed,
            panicked = stats.panicked,
            rejected = stats.rejected,
            "worker pool stopped"
        );

        result
    }

    fn lock_dispatch(&self) -> MutexGuard<'_, Option<Dispatch>> {
        self.dispatch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the number of workers.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get the pool name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the queue bound, `None` when unbounded.
    pub fn queue_capacity(&self) -> Option<usize> {
        self.queue_capacity
    }

    /// Workers still running their loop.
    pub fn live_workers(&self) -> usize {
        self.counters.live.load(Ordering::SeqCst)
    }

    /// Units queued but not yet picked up.
    pub fn pending_count(&self) -> usize {
        self.counters.pending.load(Ordering::SeqCst)
    }

    /// Units currently executing.
    pub fn active_count(&self) -> usize {
        self.counters.active.load(Ordering::SeqCst)
    }

    /// Whether shutdown has begun.
    pub fn is_shutdown(&self) -> bool {
        self.lock_dispatch().is_none()
    }

    pub fn stats(&self) -> PoolStats {
        let c = &self.counters;
        PoolStats {
            workers: self.size,
            live_workers: c.live.load(Ordering::SeqCst),
            pending: c.pending.load(Ordering::SeqCst),
            active: c.active.load(Ordering::SeqCst),
            submitted: c.submitted.load(Ordering::SeqCst),
            completed: c.completed.load(Ordering::SeqCst),
            panicked: c.panicked.load(Ordering::SeqCst),
            rejected: c.rejected.load(Ordering::SeqCst),
            queue_capacity: self.queue_capacity,
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Already shut down is the common case
        let _ = self.shutdown();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        *msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "non-string panic payload"
    }
}
