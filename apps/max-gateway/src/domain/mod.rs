//! Domain layer - pure protocol state with no I/O.

pub mod framing;
pub mod sequence;

pub use framing::{MIN_PREFIX, STX, next_frame};
pub use sequence::{AckOutcome, Channel, SequenceBook};
