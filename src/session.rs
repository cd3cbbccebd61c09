//! Consumer-facing session handle.
//!
//! [`HapticSession`] owns the link lifecycle: it binds the socket, sends
//! the initial handshake, spawns the receive loop and exposes the latest
//! telemetry snapshot, the connection status and the command path. The
//! session never blocks the caller beyond a mutex around the snapshot;
//! rendering and input layers poll it on their own schedule.

use log::{info, warn};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::error::{ConnectError, SendError};
use crate::link::Endpoint;
use crate::state::LinkState;
use crate::types::{Command, ConnectionStatus, LinkConfig, TelemetrySample};
use crate::worker::{run_receive_loop, LinkShared};

/// An active telemetry link to a haptic rotary device.
///
/// # Example
///
/// ```no_run
/// use haptic_link::{HapticSession, LinkConfig};
///
/// let session = HapticSession::connect(LinkConfig::default())?;
///
/// if let Some(sample) = session.latest_sample() {
///     println!(
///         "{:.3} rad @ {:.3} rad/s ({})",
///         sample.angle,
///         sample.velocity,
///         session.connection_status()
///     );
/// }
///
/// session.set_stepping_mode(false)?;
/// session.shutdown();
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct HapticSession {
    endpoint: Endpoint,
    shared: Arc<LinkShared>,
    config: LinkConfig,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl HapticSession {
    /// Binds a local socket, announces the client to the device and starts
    /// the receive loop.
    ///
    /// Socket bind/configure failure is the only hard error. A failed
    /// initial handshake send is recoverable — the receive loop retries it
    /// after the staleness window, like any other silence.
    pub fn connect(config: LinkConfig) -> Result<Self, ConnectError> {
        if config.poll_interval.is_zero() {
            return Err(ConnectError::InvalidConfig(
                "poll_interval cannot be zero".into(),
            ));
        }
        if config.stale_after.is_zero() {
            return Err(ConnectError::InvalidConfig(
                "stale_after cannot be zero".into(),
            ));
        }

        let endpoint = Endpoint::open(&config)?;
        let shared = Arc::new(LinkShared::new());
        let mut state = LinkState::new(config.stale_after);

        // Register this client as the telemetry receiver. The device is not
        // guaranteed to be listening yet; silence recovery takes it from here.
        if let Err(err) = endpoint.send_handshake() {
            warn!("initial handshake send failed: {}", err);
        }
        state.handshake_sent(Instant::now());
        shared.publish_status(state.status());
        info!("connecting to {}", endpoint.device_addr());

        let worker_endpoint = endpoint.clone();
        let worker_shared = Arc::clone(&shared);
        let handle = thread::spawn(move || run_receive_loop(worker_endpoint, worker_shared, state));

        Ok(Self {
            endpoint,
            shared,
            config,
            worker: Mutex::new(Some(handle)),
        })
    }

    /// Returns the session configuration.
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// The most recent telemetry sample, if any frame has been received.
    ///
    /// The sample may be stale; pair it with
    /// [`connection_status`](Self::connection_status) when freshness matters.
    pub fn latest_sample(&self) -> Option<TelemetrySample> {
        self.shared.latest_sample()
    }

    /// Current liveness of the link.
    pub fn connection_status(&self) -> ConnectionStatus {
        self.shared.status()
    }

    /// Enables or disables the device's stepping mode.
    ///
    /// Fire-and-forget: no acknowledgement is modeled and the link never
    /// retries. Whether to resend on user action is the caller's decision.
    pub fn set_stepping_mode(&self, enabled: bool) -> Result<(), SendError> {
        self.send(Command::SetSteppingMode(enabled))
    }

    /// Sends a device-bound command through the link.
    pub fn send(&self, command: Command) -> Result<(), SendError> {
        if self.shared.is_shut_down() {
            return Err(SendError::SocketUnavailable);
        }
        self.endpoint.send_command(&command)?;
        Ok(())
    }

    /// Shuts the link down. Idempotent.
    ///
    /// Signals the receive loop, waits for it to exit its current poll
    /// cycle and leaves the status at `Disconnected`. Subsequent sends
    /// return [`SendError::SocketUnavailable`].
    pub fn shutdown(&self) {
        if self.shared.request_shutdown() {
            return;
        }
        if let Some(handle) = self.worker.lock().unwrap().take() {
            let _ = handle.join();
        }
        info!("link to {} shut down", self.endpoint.device_addr());
    }
}

impl Drop for HapticSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
