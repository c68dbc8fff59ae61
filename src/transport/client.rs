use std::io::{self, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::event::OutboundMessage;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection lifecycle state. The socket handle exists iff `Connected`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
    Reconnecting,
}

/// Seam for establishing the outbound connection.
///
/// Production uses [`TcpConnector`]; tests inject scripted connectors to
/// exercise the reconnect state machine without a network.
pub trait Connect {
    type Stream: Write;

    fn connect(&mut self) -> Result<Self::Stream>;
}

/// TCP connector with bounded connect and write timeouts, so a dead link can
/// never stall the cycle indefinitely.
pub struct TcpConnector {
    host: String,
    port: u16,
    connect_timeout: Duration,
    write_timeout: Duration,
}

impl TcpConnector {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

impl Connect for TcpConnector {
    type Stream = TcpStream;

    fn connect(&mut self) -> Result<TcpStream> {
        let addr = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .with_context(|| format!("resolve {}:{}", self.host, self.port))?
            .next()
            .ok_or_else(|| anyhow!("no address for {}:{}", self.host, self.port))?;

        let stream = TcpStream::connect_timeout(&addr, self.connect_timeout)
            .with_context(|| format!("connect to {}", addr))?;
        stream.set_write_timeout(Some(self.write_timeout))?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}

/// Counters for the periodic health log.
#[derive(Clone, Copy, Debug, Default)]
pub struct StreamStats {
    pub connects: u64,
    pub registrations_sent: u64,
    pub messages_sent: u64,
    pub send_failures: u64,
}

/// Best-effort streaming client for one aggregator endpoint.
///
/// State machine: `Disconnected` (initial) dials on `connect` or on the first
/// `send`; a successful dial writes a `CameraRegistration` immediately and
/// moves to `Connected`. A failed write closes the handle and moves to
/// `Reconnecting`; the next `send` waits the fixed retry delay, dials, and
/// re-registers before carrying its own payload. The message in flight when a
/// link fails is dropped, never replayed (at-most-once per attempt), and no
/// failure propagates past this component.
pub struct StreamClient<C: Connect> {
    connector: C,
    camera_id: String,
    retry_delay: Duration,
    state: ConnectionState,
    stream: Option<C::Stream>,
    stats: StreamStats,
}

impl<C: Connect> StreamClient<C> {
    pub fn new(connector: C, camera_id: &str, retry_delay: Duration) -> Self {
        Self {
            connector,
            camera_id: camera_id.to_string(),
            retry_delay,
            state: ConnectionState::Disconnected,
            stream: None,
            stats: StreamStats::default(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    /// Initial connect with bounded retries and a fixed delay between
    /// attempts. Exhausting the attempts is not fatal: the client stays
    /// `Disconnected` and the send path keeps retrying indefinitely.
    pub fn connect(&mut self, attempts: u32) -> Result<()> {
        for attempt in 1..=attempts {
            match self.dial_and_register() {
                Ok(()) => return Ok(()),
                Err(e) => {
                    log::warn!(
                        "connect attempt {}/{} failed: {:#}",
                        attempt,
                        attempts,
                        e
                    );
                    if attempt < attempts {
                        std::thread::sleep(self.retry_delay);
                    }
                }
            }
        }
        Err(anyhow!("aggregator unreachable after {} attempts", attempts))
    }

    /// Send a message best-effort. Returns whether the payload was handed to
    /// the socket; failures are absorbed into the reconnect cycle.
    pub fn send(&mut self, message: &OutboundMessage) -> bool {
        let wire = match message.to_wire() {
            Ok(wire) => wire,
            Err(e) => {
                log::error!("failed to serialize outbound message: {:#}", e);
                return false;
            }
        };

        if self.state != ConnectionState::Connected {
            self.state = ConnectionState::Reconnecting;
            log::info!(
                "reconnecting to aggregator in {:.1}s",
                self.retry_delay.as_secs_f32()
            );
            std::thread::sleep(self.retry_delay);
            if let Err(e) = self.dial_and_register() {
                log::warn!("reconnect failed: {:#}", e);
                self.stats.send_failures += 1;
                return false;
            }
        }

        match self.write_wire(&wire) {
            Ok(()) => {
                self.stats.messages_sent += 1;
                true
            }
            Err(e) => {
                // Drop the connection; the lost message is not replayed.
                log::warn!("send failed, dropping connection: {:#}", e);
                self.stats.send_failures += 1;
                self.stream = None;
                self.state = ConnectionState::Reconnecting;
                false
            }
        }
    }

    /// Close the connection. Safe to call from any state, repeatedly.
    pub fn close(&mut self) {
        if self.stream.take().is_some() {
            log::info!("closed aggregator connection");
        }
        self.state = ConnectionState::Disconnected;
    }

    fn dial_and_register(&mut self) -> Result<()> {
        let mut stream = self.connector.connect()?;

        let registration = OutboundMessage::registration(&self.camera_id).to_wire()?;
        stream
            .write_all(&registration)
            .and_then(|_| stream.flush())
            .context("send camera registration")?;

        self.stream = Some(stream);
        self.state = ConnectionState::Connected;
        self.stats.connects += 1;
        self.stats.registrations_sent += 1;
        log::info!("connected to aggregator as camera {}", self.camera_id);
        Ok(())
    }

    fn write_wire(&mut self, wire: &[u8]) -> io::Result<()> {
        match self.stream.as_mut() {
            Some(stream) => {
                stream.write_all(wire)?;
                stream.flush()
            }
            None => Err(io::Error::from(io::ErrorKind::NotConnected)),
        }
    }
}
