#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! MAX Gateway - OMS Protocol Bridge
//!
//! Bridges the Order Management System to the MAX trading venue over three
//! independent, long-lived TCP client connections, each carrying a distinct
//! subset of a fixed-width binary protocol:
//!
//! - **Channel 1**: job registration/cancel requests and acknowledgements
//! - **Channel 2**: new/cancel order requests pushed by the venue
//! - **Channel 3**: order acknowledgements and executions
//!
//! # Layers (inside -> outside)
//!
//! - **Domain**: Pure protocol state
//!   - `framing`: start-marker + declared-length frame extraction
//!   - `sequence`: per-channel sequence counters and adoption policies
//!
//! - **Application**: Wiring
//!   - `context`: shared access identity, resolved config, sequence book
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `max`: wire codec, message catalog, and the three channel sessions
//!   - `config`: endpoint settings and the configuration store loader
//!   - `telemetry`: tracing subscriber setup
//!
//! # Data Flow
//!
//! ```text
//!                   frames                 frames
//! MAX ch-1 TCP <------------ JobChannel <----------- job mailbox (OMS)
//! MAX ch-2 TCP ------------> OrderChannel --> decoded + logged
//! MAX ch-3 TCP <------------ ReportChannel <-------- report mailbox (OMS)
//! ```
//!
//! Each session owns its socket, buffer, and sequence slot; the sessions
//! share only the read-only context and the logging sink.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - pure protocol state with no I/O.
pub mod domain;

/// Application layer - wiring between the domain and the channel adapters.
pub mod application;

/// Infrastructure layer - adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::{AckOutcome, Channel, SequenceBook};

// Application context
pub use application::{ConfigMap, GatewayContext};

// Configuration
pub use infrastructure::config::{
    SessionTimings, SettingsError, StoreError, load_service_config,
};

// Channel sessions
pub use infrastructure::max::{
    JobChannel, JobChannelError, OrderChannel, OrderChannelError, ReportChannel,
    ReportChannelError,
};

// Outbound mailboxes
pub use infrastructure::max::{
    JobDispatch, JobSender, ReportDispatch, ReportSender, job_mailbox, report_mailbox,
};

// Wire messages (for integration tests and embedders)
pub use infrastructure::max::messages;
pub use infrastructure::max::{
    AckJob, BodyHeader, CodecError, DataHeader, JobNotice, MsgHeader, ReqJob, ReqOrder, RespOrder,
};

// Telemetry
pub use infrastructure::telemetry::init as init_telemetry;
