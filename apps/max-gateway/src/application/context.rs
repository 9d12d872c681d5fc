//! Gateway Context
//!
//! The process-wide identity, resolved configuration, and sequence state
//! shared by the three channel sessions. Carried as an explicit object (one
//! `Arc` handed to each session at construction) so session behavior stays
//! unit-testable in isolation.

use std::collections::HashMap;

use crate::domain::SequenceBook;

/// Resolved configuration: string keys to string values, as loaded from the
/// configuration store.
pub type ConfigMap = HashMap<String, String>;

/// Shared, read-only context for the channel sessions.
///
/// The sequence book is the only mutable member; each session exclusively
/// writes its own channel's slot.
#[derive(Debug)]
pub struct GatewayContext {
    /// Session identity assigned at startup, stamped into every outbound
    /// frame's ACCESS_ID field.
    pub access_id: String,
    /// Resolved configuration map (may be empty if the store was
    /// unreachable; sessions then fail to resolve endpoints and keep
    /// retrying).
    pub config: ConfigMap,
    /// Per-channel last-sequence counters.
    pub sequences: SequenceBook,
}

impl GatewayContext {
    /// Create a context with fresh (zeroed) sequence state.
    #[must_use]
    pub fn new(access_id: impl Into<String>, config: ConfigMap) -> Self {
        Self {
            access_id: access_id.into(),
            config,
            sequences: SequenceBook::new(),
        }
    }
}
