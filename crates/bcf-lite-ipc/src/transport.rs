// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loopback TCP transport
//!
//! Framing is one JSON-encoded [`Envelope`] per `\n`-terminated line. The
//! client opens a short-lived connection per send; the server reads every
//! line of every connection on transport-owned threads and hands decoded
//! envelopes to its handler.

use crate::{Envelope, Result, TransportError};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Default timeout for connecting to the peer
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(20);
const CONNECTION_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Callback invoked on a transport thread for every received envelope
pub type EnvelopeHandler = Arc<dyn Fn(Envelope) + Send + Sync>;

/// Get a free loopback port assigned by the OS
pub fn free_port() -> Result<u16> {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
    Ok(listener.local_addr()?.port())
}

/// Loopback server receiving envelopes from the peer
pub struct IpcServer {
    port: u16,
    running: Arc<AtomicBool>,
    accept_thread: Option<JoinHandle<()>>,
}

impl IpcServer {
    /// Bind to an OS-assigned free loopback port
    pub fn bind<F>(handler: F) -> Result<Self>
    where
        F: Fn(Envelope) + Send + Sync + 'static,
    {
        Self::bind_to(0, handler)
    }

    /// Bind to a given loopback port (`0` lets the OS choose)
    pub fn bind_to<F>(port: u16, handler: F) -> Result<Self>
    where
        F: Fn(Envelope) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, port))?;
        listener.set_nonblocking(true)?;
        let port = listener.local_addr()?.port();

        let running = Arc::new(AtomicBool::new(true));
        let handler: EnvelopeHandler = Arc::new(handler);

        let accept_thread = {
            let running = Arc::clone(&running);
            thread::Builder::new()
                .name(format!("bcf-ipc-accept-{}", port))
                .spawn(move || accept_loop(listener, running, handler))?
        };

        log::info!("IPC server listening on 127.0.0.1:{}", port);

        Ok(Self {
            port,
            running,
            accept_thread: Some(accept_thread),
        })
    }

    /// Port the server is bound to
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Check if the accept loop is still running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop accepting connections and join the accept thread
    ///
    /// Connections already accepted finish reading on their own threads.
    pub fn shutdown(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.accept_thread.take() {
            if handle.join().is_err() {
                log::error!("IPC accept thread on port {} panicked", self.port);
            }
            log::info!("IPC server on port {} stopped", self.port);
        }
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn accept_loop(listener: TcpListener, running: Arc<AtomicBool>, handler: EnvelopeHandler) {
    while running.load(Ordering::Acquire) {
        match listener.accept() {
            Ok((stream, peer)) => {
                log::debug!("IPC connection from {}", peer);
                let handler = Arc::clone(&handler);
                let spawned = thread::Builder::new()
                    .name("bcf-ipc-conn".to_string())
                    .spawn(move || read_connection(stream, handler));
                if let Err(e) = spawned {
                    log::error!("Failed to spawn IPC connection thread: {}", e);
                }
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL_INTERVAL),
            Err(e) => {
                log::warn!("IPC accept failed: {}", e);
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
        }
    }
}

fn read_connection(stream: TcpStream, handler: EnvelopeHandler) {
    if let Err(e) = stream
        .set_nonblocking(false)
        .and_then(|_| stream.set_read_timeout(Some(CONNECTION_READ_TIMEOUT)))
    {
        log::warn!("Failed to configure IPC connection: {}", e);
        return;
    }

    for line in BufReader::new(stream).lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::debug!("IPC connection closed: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match Envelope::from_json(&line) {
            Ok(envelope) => {
                log::debug!(
                    "Received {} (tracking id {})",
                    envelope.message_type,
                    envelope.tracking_id
                );
                handler(envelope);
            }
            Err(e) => log::warn!("Skipping undecodable IPC line: {}", e),
        }
    }
}

/// Client sending envelopes to the peer's server
#[derive(Debug, Clone)]
pub struct IpcClient {
    peer_port: u16,
    connect_timeout: Duration,
}

impl IpcClient {
    /// Create a client for the peer listening on `peer_port`
    pub fn new(peer_port: u16) -> Self {
        Self {
            peer_port,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Peer port
    pub fn peer_port(&self) -> u16 {
        self.peer_port
    }

    /// Send an envelope, reporting every failure
    pub fn try_send(&self, envelope: &Envelope) -> Result<()> {
        let line = envelope.to_json()?;
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, self.peer_port));

        let mut stream = TcpStream::connect_timeout(&addr, self.connect_timeout)
            .map_err(|e| self.classify(e))?;
        stream
            .write_all(line.as_bytes())
            .and_then(|_| stream.write_all(b"\n"))
            .and_then(|_| stream.flush())
            .map_err(|e| self.classify(e))?;

        log::debug!(
            "Sent {} (tracking id {}) to port {}",
            envelope.message_type,
            envelope.tracking_id,
            self.peer_port
        );
        Ok(())
    }

    /// Fire-and-forget send
    ///
    /// A peer that already tore down its socket is expected during shutdown,
    /// so those failures are only logged.
    pub fn send(&self, envelope: &Envelope) {
        match self.try_send(envelope) {
            Ok(()) => {}
            Err(e) if e.is_peer_gone() => log::debug!("Ignoring send failure: {}", e),
            Err(e) => log::warn!("Failed to send {}: {}", envelope.message_type, e),
        }
    }

    fn classify(&self, e: std::io::Error) -> TransportError {
        match e.kind() {
            ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::TimedOut => TransportError::peer_unavailable(self.peer_port, e.to_string()),
            _ => TransportError::Io(e),
        }
    }
}
