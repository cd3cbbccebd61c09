//! Core types for the telemetry link.
//!
//! Provides the telemetry sample, connection status, and device command
//! types, as well as the link configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

/// A single telemetry reading from the device.
///
/// Samples are immutable once constructed and replaced wholesale on each
/// successfully parsed frame. Both values are guaranteed finite; frames
/// carrying NaN or infinity are rejected whole by the codec.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySample {
    /// Shaft angle in radians.
    pub angle: f64,
    /// Angular velocity in radians per second.
    pub velocity: f64,
    /// When the frame carrying this sample arrived.
    pub received_at: Instant,
}

/// Liveness of the telemetry link.
///
/// Owned exclusively by the link state machine; read-only to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// Not started, or shut down. The socket is released.
    #[default]
    Disconnected,
    /// Handshake sent, waiting for the first telemetry frame.
    Handshaking,
    /// Telemetry frames are arriving within the staleness window.
    Connected,
    /// No valid frame within the staleness window; a re-handshake is due.
    Stale,
}

impl ConnectionStatus {
    /// Returns true while telemetry is flowing.
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Handshaking => "handshaking",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Stale => "stale",
        };
        write!(f, "{}", name)
    }
}

/// A device-bound directive.
///
/// Created by the caller, encoded and transmitted once, then discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Enable or disable the detent stepping mode.
    SetSteppingMode(bool),
}

/// Configuration for a telemetry link.
///
/// The defaults match the device's SoftAP coordinates (192.168.4.1:4444),
/// a one second staleness window and a 100 ms receive poll.
///
/// # Example
///
/// ```
/// use haptic_link::LinkConfig;
/// use std::time::Duration;
///
/// let config = LinkConfig::default()
///     .with_stale_after(Duration::from_millis(500))
///     .with_poll_interval(Duration::from_millis(50));
/// assert_eq!(config.port, 4444);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkConfig {
    /// Device IP address.
    pub address: IpAddr,

    /// Device UDP port.
    pub port: u16,

    /// Silence window after which the link is considered stale and a
    /// re-handshake is sent.
    #[cfg_attr(feature = "serde", serde(with = "duration_millis"))]
    pub stale_after: Duration,

    /// Upper bound on a single receive wait. Also the latency with which
    /// shutdown and staleness checks take effect. Must be non-zero.
    #[cfg_attr(feature = "serde", serde(with = "duration_millis"))]
    pub poll_interval: Duration,
}

#[cfg(feature = "serde")]
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = duration.as_millis().min(u64::MAX as u128) as u64;
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::new(192, 168, 4, 1)),
            port: 4444,
            stale_after: Duration::from_secs(1),
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl LinkConfig {
    /// Creates a configuration for a device at the given address and port.
    pub fn new(address: IpAddr, port: u16) -> Self {
        Self {
            address,
            port,
            ..Self::default()
        }
    }

    /// Sets the staleness window.
    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    /// Sets the receive poll interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// The device's socket address.
    pub fn device_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }
}
