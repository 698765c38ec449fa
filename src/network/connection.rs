//! Connection Handler
//!
//! Handles individual client connections.

use std::fmt;
use std::io::{self, BufReader, BufWriter, Read};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use crate::dispatch::Dispatcher;
use crate::error::{DbError, Result};
use crate::protocol::{read_command, write_response, Response, MAX_LINE_LENGTH};

/// Longest a finished connection waits for the client to close its side
const DRAIN_TIMEOUT: Duration = Duration::from_millis(200);

/// Lifecycle of a single connection. There is no way back to an earlier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Open,
    ReadRequest,
    Dispatch,
    WriteResponse,
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Open => "open",
            ConnectionState::ReadRequest => "read-request",
            ConnectionState::Dispatch => "dispatch",
            ConnectionState::WriteResponse => "write-response",
            ConnectionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Shared command dispatcher
    dispatcher: Arc<Dispatcher>,

    /// Peer address for logging
    peer_addr: String,

    state: ConnectionState,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, dispatcher: Arc<Dispatcher>) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            dispatcher,
            peer_addr,
            state: ConnectionState::Open,
        })
    }

    /// Configure connection timeouts (0 leaves the timeout disabled)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }
        Ok(())
    }

    /// Serve the single request on this connection, then close it
    ///
    /// A request that cannot be read or names an unknown operation is still
    /// answered with `Invalid request`.
    pub fn handle(mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        self.transition(ConnectionState::ReadRequest);
        let response = match read_command(&mut self.reader) {
            Ok(command) => {
                tracing::trace!("Received command from {}: {:?}", self.peer_addr, command);
                self.transition(ConnectionState::Dispatch);
                self.dispatcher.execute(command)
            }
            Err(e) => {
                tracing::warn!("Bad request from {}: {}", self.peer_addr, e);
                Response::InvalidRequest
            }
        };

        self.transition(ConnectionState::WriteResponse);
        let result = write_response(&mut self.writer, &response);
        self.close();

        match result {
            Ok(()) => Ok(()),
            Err(DbError::Io(ref e)) if is_disconnect(e) => {
                tracing::debug!(
                    "Client {} disconnected before response could be sent: {}",
                    self.peer_addr,
                    e
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                Err(e)
            }
        }
    }

    /// Half-close, then briefly drain whatever the client still sends so the
    /// close does not reset the connection before the response is read
    fn close(&mut self) {
        let stream = self.writer.get_ref();
        if let Err(e) = stream.shutdown(Shutdown::Write) {
            tracing::trace!("Shutdown of {} failed: {}", self.peer_addr, e);
        }

        // Bounded regardless of the configured read timeout
        if let Err(e) = self.reader.get_ref().set_read_timeout(Some(DRAIN_TIMEOUT)) {
            tracing::trace!("Could not set drain timeout for {}: {}", self.peer_addr, e);
        }

        let mut rest = (&mut self.reader).take(MAX_LINE_LENGTH as u64);
        match io::copy(&mut rest, &mut io::sink()) {
            Ok(n) => tracing::trace!("Drained {} bytes from {}", n, self.peer_addr),
            Err(e) => tracing::trace!("Stopped draining {}: {}", self.peer_addr, e),
        }

        self.transition(ConnectionState::Closed);
    }

    fn transition(&mut self, next: ConnectionState) {
        tracing::trace!("Connection {}: {} -> {}", self.peer_addr, self.state, next);
        self.state = next;
    }
}

fn is_disconnect(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::BrokenPipe
    )
}
