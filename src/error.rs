//! Crate-level error types.

use std::io;

/// Errors produced when decoding a received datagram.
///
/// A malformed datagram is recovered locally: the receive loop drops the
/// frame without touching the shared snapshot or the connection status.
/// Consumers never see this error.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    /// The datagram is not a valid telemetry frame.
    #[error("malformed telemetry frame: {reason}")]
    Malformed {
        /// What the frame was missing.
        reason: &'static str,
    },
}

impl ParseError {
    pub(crate) fn malformed(reason: &'static str) -> Self {
        Self::Malformed { reason }
    }
}

/// Errors produced when sending a command to the device.
///
/// Command sends are fire-and-forget at the protocol level; failures are
/// surfaced to the caller and never retried by the link itself.
#[derive(thiserror::Error, Debug)]
pub enum SendError {
    /// The link has been shut down; no further sends are attempted.
    #[error("socket unavailable: link has been shut down")]
    SocketUnavailable,

    /// The OS rejected the send.
    #[error("failed to send command: {0}")]
    Io(#[from] io::Error),
}

/// Errors produced when establishing the link.
///
/// These are the only hard failures in the crate. Everything after a
/// successful [`connect`](crate::HapticSession::connect) is handled as a
/// recoverable protocol-level event.
#[derive(thiserror::Error, Debug)]
pub enum ConnectError {
    /// The local UDP socket could not be created or bound.
    #[error("failed to bind local UDP socket: {0}")]
    Bind(#[source] io::Error),

    /// The socket could not be configured (read timeout).
    #[error("failed to configure socket: {0}")]
    Configure(#[source] io::Error),

    /// The link configuration is unusable.
    #[error("invalid link configuration: {0}")]
    InvalidConfig(String),
}
