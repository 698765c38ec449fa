//! TCP Server
//!
//! Accepts connections and hands each one to its own thread.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::sync::WaitGroup;
use parking_lot::Mutex;

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::{DbError, Result};

use super::Connection;

/// Pause after a failed accept (e.g. out of file descriptors)
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Live connections by id, kept so shutdown can unblock them
type Registry = Arc<Mutex<HashMap<u64, TcpStream>>>;

/// TCP server for custdb
pub struct Server {
    config: Config,

    /// Shared by every connection thread
    dispatcher: Arc<Dispatcher>,

    listener: TcpListener,

    /// Set once to stop accepting
    shutdown: Arc<AtomicBool>,

    connections: Registry,
}

impl Server {
    /// Bind the listen address from `config`
    pub fn bind(config: Config, dispatcher: Arc<Dispatcher>) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            DbError::Network(format!("Failed to bind {}: {}", config.listen_addr, e))
        })?;

        Ok(Self {
            config,
            dispatcher,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
            connections: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// The address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Get a handle that can stop `run` from another thread
    pub fn shutdown_handle(&self) -> Result<ShutdownHandle> {
        Ok(ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            addr: self.local_addr()?,
            connections: Arc::clone(&self.connections),
        })
    }

    /// Start the server (blocking)
    ///
    /// Every accepted connection gets its own thread, so a client that never
    /// sends only ties up that thread. On shutdown, live connections are
    /// closed and `run` returns once their threads have finished.
    pub fn run(self) -> Result<()> {
        let wait_group = WaitGroup::new();
        let mut next_id: u64 = 0;

        tracing::info!("Listening on {}", self.local_addr()?);

        for stream in self.listener.incoming() {
            if self.shutdown.load(Ordering::Acquire) {
                break;
            }

            match stream {
                Ok(stream) => {
                    next_id += 1;
                    self.spawn_connection(next_id, stream, wait_group.clone());
                }
                Err(e) => {
                    tracing::warn!("Failed to accept connection: {}", e);
                    thread::sleep(ACCEPT_BACKOFF);
                }
            }
        }

        let live: Vec<TcpStream> = self.connections.lock().drain().map(|(_, s)| s).collect();
        tracing::info!("Shutting down, closing {} live connections", live.len());
        for stream in live {
            let _ = stream.shutdown(Shutdown::Both);
        }

        wait_group.wait();
        Ok(())
    }

    fn spawn_connection(&self, id: u64, stream: TcpStream, wait_group: WaitGroup) {
        match stream.try_clone() {
            Ok(handle) => {
                self.connections.lock().insert(id, handle);
            }
            Err(e) => tracing::debug!("Connection {} will not be tracked: {}", id, e),
        }

        let dispatcher = Arc::clone(&self.dispatcher);
        let connections = Arc::clone(&self.connections);
        let read_timeout_ms = self.config.read_timeout_ms;
        let write_timeout_ms = self.config.write_timeout_ms;

        let spawned = thread::Builder::new()
            .name(format!("custdb-conn-{}", id))
            .spawn(move || {
                let served = Connection::new(stream, dispatcher).and_then(|mut connection| {
                    connection.set_timeouts(read_timeout_ms, write_timeout_ms)?;
                    connection.handle()
                });

                if let Err(e) = served {
                    tracing::debug!("Connection {} ended with error: {}", id, e);
                }

                connections.lock().remove(&id);
                drop(wait_group);
            });

        if let Err(e) = spawned {
            tracing::error!("Failed to spawn thread for connection {}: {}", id, e);
            self.connections.lock().remove(&id);
        }
    }
}

/// Stops a running [`Server`] from another thread
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,

    /// Where to connect to wake the blocked accept
    addr: SocketAddr,

    connections: Registry,
}

impl ShutdownHandle {
    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::Release);

        let mut wake_addr = self.addr;
        if wake_addr.ip().is_unspecified() {
            let loopback = match wake_addr.ip() {
                IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
                IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::LOCALHOST),
            };
            wake_addr.set_ip(loopback);
        }

        if let Err(e) = TcpStream::connect(wake_addr) {
            tracing::debug!("Failed to wake accept loop at {}: {}", wake_addr, e);
        }
    }

    /// Number of connections currently being served
    pub fn active_connections(&self) -> usize {
        self.connections.lock().len()
    }
}
