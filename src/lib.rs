//! Client driver for rotary haptic sensor devices.
//!
//! This crate provides a duplex UDP telemetry/command channel to a haptic
//! rotary device (an ESP32 running a force-feedback knob): connection
//! establishment via handshake, continuous reception and parsing of
//! angle/velocity telemetry, liveness detection with automatic re-handshake
//! after silence, and a small command vocabulary sent back to the device —
//! all decoupled from any presentation layer.
//!
//! # Getting Started
//!
//! ```no_run
//! use haptic_link::{HapticSession, LinkConfig};
//! use std::time::Duration;
//!
//! // Defaults target the device's SoftAP at 192.168.4.1:4444.
//! let session = HapticSession::connect(LinkConfig::default()).unwrap();
//!
//! loop {
//!     if let Some(sample) = session.latest_sample() {
//!         println!(
//!             "angle {:.3} rad, velocity {:.3} rad/s ({})",
//!             sample.angle,
//!             sample.velocity,
//!             session.connection_status()
//!         );
//!     }
//!     std::thread::sleep(Duration::from_millis(50));
//! }
//! ```
//!
//! # Wire Protocol
//!
//! Short ASCII lines over UDP, one per datagram:
//!
//! - Device → client: `<angle>,<velocity>` (radians, radians/sec).
//! - Client → device: the `HELLO` handshake/probe token, and commands such
//!   as `STEPS:<0|1>` (stepping mode off/on).
//!
//! Anything that is not a telemetry frame is dropped silently — garbage on
//! the wire never crashes the client or disturbs the connection status.
//!
//! # Liveness
//!
//! The link is best-effort and single-peer. When no valid frame arrives
//! within the configured staleness window, the status drops to `Stale` and
//! the client re-announces itself until telemetry resumes; there is no
//! terminal failure state short of [`HapticSession::shutdown`].

mod error;
mod link;
pub mod protocol;
mod session;
mod state;
pub mod types;
mod worker;

pub use error::{ConnectError, ParseError, SendError};
pub use session::HapticSession;
pub use types::{Command, ConnectionStatus, LinkConfig, TelemetrySample};

/// Connects to a device with the default configuration.
///
/// Shorthand for `HapticSession::connect(LinkConfig::default())`.
pub fn connect() -> Result<HapticSession, ConnectError> {
    HapticSession::connect(LinkConfig::default())
}
