//! Channel Heartbeat Clocks
//!
//! Two liveness roles, selected per channel:
//!
//! - **Poll** (channels 1 and 3): on each 5-second tick, if nothing was sent
//!   within the last interval, the session emits a POLL probe to keep the
//!   line active.
//! - **Beat timeout** (channel 2): on each 30-second tick, if no inbound
//!   frame was parsed within the timeout, the connection is considered stale
//!   and force-closed.
//!
//! The clocks only hold timestamps; the session's select loop owns the
//! repeating tick source and acts on the answers, so shutdown stops the
//! timer and the receive loop together.

use std::time::Duration;

use tokio::time::Instant;

/// Tracks outbound traffic for the active poll role.
#[derive(Debug)]
pub struct PollClock {
    interval: Duration,
    last_send: Instant,
}

impl PollClock {
    /// Create a clock that considers a probe due after `interval` of send
    /// silence.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_send: Instant::now(),
        }
    }

    /// Record an outbound frame (application data or probe).
    pub fn record_send(&mut self) {
        self.last_send = Instant::now();
    }

    /// Whether the line has been send-idle for a full interval.
    #[must_use]
    pub fn poll_due(&self) -> bool {
        self.last_send.elapsed() >= self.interval
    }
}

/// Tracks inbound traffic for the passive staleness check.
#[derive(Debug)]
pub struct BeatClock {
    timeout: Duration,
    last_recv: Instant,
}

impl BeatClock {
    /// Create a clock that reports the connection stale after `timeout`
    /// without a parsed inbound frame.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            last_recv: Instant::now(),
        }
    }

    /// Record a successfully parsed inbound frame.
    pub fn record_recv(&mut self) {
        self.last_recv = Instant::now();
    }

    /// Whether the inbound side has been silent past the timeout.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.last_recv.elapsed() > self.timeout
    }

    /// Time since the last parsed inbound frame.
    #[must_use]
    pub fn idle_for(&self) -> Duration {
        self.last_recv.elapsed()
    }
}
