//! Background receive loop and the shared telemetry snapshot.
//!
//! The receive loop is the single writer of the snapshot: it polls the
//! socket with a bounded timeout, decodes telemetry via the codec, drives
//! the liveness state machine and publishes the latest sample. Consumers
//! read the snapshot from any thread through [`LinkShared`].

use log::{debug, info, warn};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::link::Endpoint;
use crate::protocol;
use crate::state::{LinkState, SilenceVerdict};
use crate::types::{ConnectionStatus, TelemetrySample};

/// Latest-wins snapshot of the link.
///
/// Sample and status live under one lock so a reader never observes a
/// fresh sample paired with an outdated status.
#[derive(Default)]
struct Snapshot {
    sample: Option<TelemetrySample>,
    status: ConnectionStatus,
}

/// State shared between the receive loop and consumers.
///
/// One writer (the receive loop), any number of readers. The shutdown flag
/// is checked by the loop once per poll cycle and by the command path on
/// every send.
pub(crate) struct LinkShared {
    snapshot: Mutex<Snapshot>,
    shutdown: AtomicBool,
}

impl LinkShared {
    pub fn new() -> Self {
        Self {
            snapshot: Mutex::new(Snapshot::default()),
            shutdown: AtomicBool::new(false),
        }
    }

    pub fn latest_sample(&self) -> Option<TelemetrySample> {
        self.snapshot.lock().unwrap().sample
    }

    pub fn status(&self) -> ConnectionStatus {
        self.snapshot.lock().unwrap().status
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Sets the shutdown flag. Returns true if it was already set.
    pub fn request_shutdown(&self) -> bool {
        self.shutdown.swap(true, Ordering::SeqCst)
    }

    pub fn publish_status(&self, status: ConnectionStatus) {
        self.snapshot.lock().unwrap().status = status;
    }

    fn publish_sample(&self, sample: TelemetrySample, status: ConnectionStatus) {
        let mut snapshot = self.snapshot.lock().unwrap();
        snapshot.sample = Some(sample);
        snapshot.status = status;
    }
}

/// Runs until shutdown is requested or the socket fails terminally.
///
/// Each iteration performs one bounded receive attempt, then drives the
/// silence check. Malformed datagrams are dropped without touching the
/// snapshot; timeouts are the idle path, not errors.
pub(crate) fn run_receive_loop(endpoint: Endpoint, shared: Arc<LinkShared>, mut state: LinkState) {
    let mut buf = [0u8; protocol::MAX_DATAGRAM];
    info!("receive loop started for {}", endpoint.device_addr());

    while !shared.is_shut_down() {
        match endpoint.recv(&mut buf) {
            Ok(len) => match protocol::decode_telemetry(&buf[..len]) {
                Ok((angle, velocity)) => {
                    let now = Instant::now();
                    if !state.status().is_connected() {
                        info!("telemetry flowing, link connected");
                    }
                    state.frame_received(now);
                    shared.publish_sample(
                        TelemetrySample {
                            angle,
                            velocity,
                            received_at: now,
                        },
                        state.status(),
                    );
                }
                Err(err) => {
                    // Non-telemetry datagram: drop it, snapshot untouched.
                    debug!("ignoring datagram: {}", err);
                }
            },
            Err(err) if is_poll_timeout(&err) => {}
            Err(err) => {
                if shared.is_shut_down() {
                    // In-flight error while shutting down is normal loop
                    // termination, not a fault.
                    break;
                }
                warn!("receive loop terminating: {}", err);
                break;
            }
        }

        drive_silence_check(&endpoint, &shared, &mut state);
    }

    state.shut_down();
    shared.publish_status(ConnectionStatus::Disconnected);
    info!("receive loop stopped");
}

fn drive_silence_check(endpoint: &Endpoint, shared: &Arc<LinkShared>, state: &mut LinkState) {
    match state.check_silence(Instant::now()) {
        SilenceVerdict::None => {}
        SilenceVerdict::WentStale => {
            warn!(
                "no telemetry from {} within the staleness window",
                endpoint.device_addr()
            );
            shared.publish_status(state.status());
        }
        SilenceVerdict::ProbeDue => {
            match endpoint.send_handshake() {
                Ok(()) => state.handshake_sent(Instant::now()),
                // Send failures here are transient; the probe stays due and
                // is retried on the next cycle.
                Err(err) => debug!("probe send failed: {}", err),
            }
            shared.publish_status(state.status());
        }
    }
}

fn is_poll_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}
