//! Accept loop feeding the worker pool.

use std::mem;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::error::ListenerError;
use super::tcp::{bind_listener, prepare_stream, wake_acceptor};
use super::ListenerConfig;
use crate::core::{HelloHandler, Outcome, RequestHandler};
use crate::pool::{PoolStats, WorkerPool};

/// Pause after a failed `accept` so a persistent error cannot spin the loop.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(10);

/// How often shutdown re-sends its wake-up while the accept loop is still open.
const WAKE_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Who holds the listening socket.
enum AcceptState {
    /// Bound, `start` not called yet.
    Bound(TcpListener),
    /// Moved into the running accept loop.
    Accepting,
    /// Dropped; the port is released.
    Closed,
}

/// Owns the listening socket and the worker pool.
///
/// `start` blocks the calling thread in the accept loop; `shutdown` may be
/// called from any other thread (typically a signal task holding an
/// `Arc<Listener>`).
pub struct Listener {
    local_addr: SocketAddr,
    state: Mutex<AcceptState>,
    closed: Condvar,
    stopping: AtomicBool,
    pool: WorkerPool,
    handler: Arc<dyn RequestHandler>,
    request_timeout: Option<Duration>,
}

impl Listener {
    /// Bind `0.0.0.0:port` and serve with [`HelloHandler`] on `pool_size` workers.
    pub fn new(port: u16, pool_size: usize) -> Result<Self, ListenerError> {
        let config = ListenerConfig::default()
            .with_port(port)
            .with_pool_size(pool_size);
        Self::bind(config, HelloHandler)
    }

    /// Bind according to `config` and serve every connection with `handler`.
    pub fn bind<H: RequestHandler>(config: ListenerConfig, handler: H) -> Result<Self, ListenerError> {
        let socket = bind_listener(config.addr, config.backlog).map_err(|source| {
            ListenerError::Bind {
                addr: config.addr,
                source,
            }
        })?;
        let local_addr = socket.local_addr()?;

        let pool = WorkerPool::with_capacity(config.pool_size, config.queue_capacity, "worker")?;

        info!(
            addr = %local_addr,
            workers = config.pool_size,
            "Server running on port {}",
            local_addr.port()
        );

        Ok(Self {
            local_addr,
            state: Mutex::new(AcceptState::Bound(socket)),
            closed: Condvar::new(),
            stopping: AtomicBool::new(false),
            pool,
            handler: Arc::new(handler),
            request_timeout: config.request_timeout,
        })
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Snapshot of the worker pool counters.
    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Whether shutdown has been requested.
    pub fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }

    /// Run the accept loop on the calling thread until [`shutdown`](Self::shutdown).
    ///
    /// Each accepted connection becomes one unit on the pool. The listening
    /// socket is closed when the loop exits.
    pub fn start(&self) -> Result<(), ListenerError> {
        let socket = {
            let mut state = self.lock_state();
            match mem::replace(&mut *state, AcceptState::Accepting) {
                AcceptState::Bound(socket) if !self.is_stopping() => socket,
                other => {
                    *state = other;
                    return Err(ListenerError::NotListening);
                }
            }
        };

        info!(addr = %self.local_addr, "accepting connections");

        for incoming in socket.incoming() {
            if self.is_stopping() {
                if let Ok(stream) = incoming {
                    let peer = stream.peer_addr().map(|p| p.to_string()).unwrap_or_default();
                    debug!(peer = %peer, "connection dropped during shutdown");
                }
                break;
            }

            match incoming {
                Ok(stream) => self.dispatch(stream),
                Err(e) => {
                    warn!(error = %e, "failed to accept connection");
                    thread::sleep(ACCEPT_ERROR_BACKOFF);
                }
            }
        }

        drop(socket);
        *self.lock_state() = AcceptState::Closed;
        self.closed.notify_all();

        info!(addr = %self.local_addr, "listener closed");
        Ok(())
    }

    /// Wrap one connection in a unit of work and hand it to the pool.
    fn dispatch(&self, stream: TcpStream) {
        let peer = match stream.peer_addr() {
            Ok(peer) => peer,
            Err(e) => {
                debug!(error = %e, "peer gone before dispatch");
                return;
            }
        };

        debug!(peer = %peer, "connection accepted");
        prepare_stream(&stream, self.request_timeout);

        let handler = Arc::clone(&self.handler);
        let submitted = self.pool.submit(move || serve(handler.as_ref(), stream, peer));

        // The rejected unit, and the stream inside it, is already dropped
        if let Err(e) = submitted {
            warn!(peer = %peer, error = %e, "connection dropped: {}", e.message());
        }
    }

    /// Stop accepting, close the listening socket, then drain and stop the pool.
    ///
    /// Blocks until the accept loop (if running) has exited and every worker
    /// has terminated. A second call returns [`ListenerError::AlreadyShutdown`].
    pub fn shutdown(&self) -> Result<(), ListenerError> {
        if self.stopping.swap(true, Ordering::SeqCst) {
            return Err(ListenerError::AlreadyShutdown);
        }

        info!(addr = %self.local_addr, "shutting down");

        let mut state = self.lock_state();
        match mem::replace(&mut *state, AcceptState::Closed) {
            // Never started: closing is just dropping the socket
            AcceptState::Bound(socket) => drop(socket),
            AcceptState::Accepting => {
                *state = AcceptState::Accepting;
                state = self.wait_for_accept_loop(state);
            }
            AcceptState::Closed => {}
        }
        drop(state);

        self.pool.shutdown()?;

        info!(stats = ?self.pool.stats(), "shutdown complete");
        Ok(())
    }

    /// Wake the blocked `accept` and wait until the loop has closed the socket.
    fn wait_for_accept_loop<'a>(
        &'a self,
        mut state: MutexGuard<'a, AcceptState>,
    ) -> MutexGuard<'a, AcceptState> {
        let started = Instant::now();

        while matches!(*state, AcceptState::Accepting) {
            if let Err(e) = wake_acceptor(self.local_addr) {
                debug!(error = %e, "wake-up connection failed, retrying");
            }

            state = self
                .closed
                .wait_timeout(state, WAKE_RETRY_INTERVAL)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }

        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "accept loop stopped");
        state
    }

    fn lock_state(&self) -> MutexGuard<'_, AcceptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Body of every connection unit: run the handler and log how it went.
fn serve(handler: &dyn RequestHandler, stream: TcpStream, peer: SocketAddr) {
    let start = Instant::now();

    match handler.handle(stream, peer) {
        Ok(Outcome::Responded {
            method,
            path,
            status,
        }) => {
            info!(
                target: "access",
                peer = %peer,
                method = %method,
                path = %path,
                status = status.as_u16(),
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "request served"
            );
        }
        Ok(Outcome::NoRequest) => {
            debug!(peer = %peer, "connection closed without a request");
        }
        Err(e) => {
            warn!(peer = %peer, error = %e, "Error handling request");
        }
    }
}
