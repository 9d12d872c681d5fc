//! Per-Channel Sequence Bookkeeping
//!
//! Each of the three MAX channels carries its own monotonically tracked
//! "last sequence" value, used both for session authentication (the LINK/DLNK
//! frame carries it) and for gap detection on inbound DATA frames. The
//! counters live for the whole process and survive reconnects; they are not
//! persisted across restarts.
//!
//! The update policy applied when the venue acknowledges authentication
//! (LIOK/DLOK) differs per channel and is reproduced exactly:
//!
//! - channel 1 adopts the received value whenever it differs,
//! - channel 2 adopts it only when it is strictly greater,
//! - channel 3 adopts it only when it is strictly smaller (the venue's
//!   acknowledged sequence marks the recovery point for replay handled
//!   upstream).

use std::sync::atomic::{AtomicU64, Ordering};

/// One of the three logical MAX channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Channel 1: job registration/cancel requests and acknowledgements.
    Job,
    /// Channel 2: new/cancel order requests arriving from the venue.
    Order,
    /// Channel 3: order acknowledgements and executions sent to the venue.
    Report,
}

impl Channel {
    /// Wire/port number of this channel (1, 2, or 3).
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Job => 1,
            Self::Order => 2,
            Self::Report => 3,
        }
    }

    const fn index(self) -> usize {
        self.number() as usize - 1
    }
}

/// Outcome of applying a LIOK/DLOK sequence update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    /// The stored value was kept.
    Kept,
    /// The received value was adopted as the new stored sequence.
    Adopted,
}

/// The three independent per-channel sequence counters.
///
/// Each channel session exclusively writes its own slot; the slots are
/// atomics only so the book can sit in the shared gateway context.
#[derive(Debug, Default)]
pub struct SequenceBook {
    slots: [AtomicU64; 3],
}

impl SequenceBook {
    /// Create a book with all counters at zero (fresh session state).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last sequence value for a channel.
    #[must_use]
    pub fn last(&self, channel: Channel) -> u64 {
        self.slots[channel.index()].load(Ordering::SeqCst)
    }

    /// Overwrite a channel's counter.
    pub fn set(&self, channel: Channel, value: u64) {
        self.slots[channel.index()].store(value, Ordering::SeqCst);
    }

    /// Increment a channel's counter and return the new value.
    ///
    /// Used to stamp outbound DATA frames: sequence numbers increase by
    /// exactly one per sent frame.
    pub fn next(&self, channel: Channel) -> u64 {
        self.slots[channel.index()].fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Apply the per-channel LIOK/DLOK sequence adoption policy.
    pub fn apply_link_ack(&self, channel: Channel, received: u64) -> AckOutcome {
        let slot = &self.slots[channel.index()];
        let stored = slot.load(Ordering::SeqCst);
        let adopt = match channel {
            Channel::Job => received != stored,
            Channel::Order => received > stored,
            Channel::Report => received < stored,
        };
        if adopt {
            slot.store(received, Ordering::SeqCst);
            AckOutcome::Adopted
        } else {
            AckOutcome::Kept
        }
    }

    /// Accept an inbound DATA sequence if it is exactly `stored + 1`.
    ///
    /// On acceptance the counter advances to `received` and `true` is
    /// returned. Any other value leaves the counter unchanged and returns
    /// `false`; the caller closes the connection so the resumed session
    /// re-authenticates with the last known-good value.
    pub fn try_advance(&self, channel: Channel, received: u64) -> bool {
        let slot = &self.slots[channel.index()];
        let stored = slot.load(Ordering::SeqCst);
        if received == stored + 1 {
            slot.store(received, Ordering::SeqCst);
            true
        } else {
            false
        }
    }
}
