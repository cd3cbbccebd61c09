//! Link liveness state machine.
//!
//! Pure transition logic with no sockets and no clock of its own. The
//! receive loop feeds it frame/handshake events and the current time; it
//! answers with the [`ConnectionStatus`] and whether a (re-)handshake is
//! due. Keeping it free of I/O makes every transition testable without a
//! device on the network.
//!
//! The lifecycle is `Disconnected → Handshaking → Connected → Stale →
//! Handshaking → …` with no terminal failure state short of shutdown: the
//! device may stop responding transiently (Wi-Fi hiccups) and the machine's
//! only job is to keep re-announcing presence.

use std::time::{Duration, Instant};

use crate::types::ConnectionStatus;

/// What the silence check decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SilenceVerdict {
    /// Nothing to do.
    None,
    /// The link just crossed the staleness window.
    WentStale,
    /// A handshake/probe should be sent now.
    ProbeDue,
}

/// Connection liveness tracker.
pub(crate) struct LinkState {
    status: ConnectionStatus,
    last_frame: Option<Instant>,
    last_handshake: Option<Instant>,
    stale_after: Duration,
}

impl LinkState {
    /// Creates a new state machine in `Disconnected`.
    pub fn new(stale_after: Duration) -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            last_frame: None,
            last_handshake: None,
            stale_after,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Records that a handshake or probe was sent.
    pub fn handshake_sent(&mut self, now: Instant) {
        self.last_handshake = Some(now);
        self.status = ConnectionStatus::Handshaking;
    }

    /// Records a successfully decoded telemetry frame.
    ///
    /// From `Stale` this goes directly to `Connected` — a recovering link
    /// never passes through `Disconnected`.
    pub fn frame_received(&mut self, now: Instant) {
        self.last_frame = Some(now);
        if self.status != ConnectionStatus::Disconnected {
            self.status = ConnectionStatus::Connected;
        }
    }

    /// Advances the silence timers.
    ///
    /// In `Connected`, crossing the staleness window yields
    /// [`SilenceVerdict::WentStale`] exactly once; the probe itself is due
    /// on the following check, and again every `stale_after` while the
    /// device stays silent.
    pub fn check_silence(&mut self, now: Instant) -> SilenceVerdict {
        match self.status {
            ConnectionStatus::Connected => {
                let silent = self
                    .last_frame
                    .map_or(true, |t| now.duration_since(t) > self.stale_after);
                if silent {
                    self.status = ConnectionStatus::Stale;
                    SilenceVerdict::WentStale
                } else {
                    SilenceVerdict::None
                }
            }
            ConnectionStatus::Stale => SilenceVerdict::ProbeDue,
            ConnectionStatus::Handshaking => {
                let overdue = self
                    .last_handshake
                    .map_or(true, |t| now.duration_since(t) > self.stale_after);
                if overdue {
                    SilenceVerdict::ProbeDue
                } else {
                    SilenceVerdict::None
                }
            }
            ConnectionStatus::Disconnected => SilenceVerdict::None,
        }
    }

    /// Shutdown from any state.
    pub fn shut_down(&mut self) {
        self.status = ConnectionStatus::Disconnected;
    }
}
