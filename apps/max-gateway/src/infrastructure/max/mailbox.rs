//! Outbound Mailboxes
//!
//! Application-originated sends enter a channel session through an ordered,
//! single-consumer inbox: job requests on channel 1, order acknowledgements
//! and executions on channel 3. The session serializes them onto the socket
//! one at a time, stamping header fields (access id, send time, sequence) at
//! send time. Channel 2 never originates application messages.
//!
//! There is no retry queue: a request submitted while the channel is down is
//! dropped with an error log, and any redelivery policy belongs to the
//! caller.

use tokio::sync::mpsc;

use crate::infrastructure::max::messages::{ReqJob, RespOrder};

/// Queue depth for each channel's outbound mailbox.
const MAILBOX_DEPTH: usize = 256;

/// A job registration or cancel request bound for channel 1.
#[derive(Debug, Clone)]
pub struct JobDispatch {
    /// Service type to stamp into the body header
    /// ([`svc::JOB_REGIS_REQ`](crate::infrastructure::max::messages::svc::JOB_REGIS_REQ)
    /// or
    /// [`svc::JOB_CANCEL_REQ`](crate::infrastructure::max::messages::svc::JOB_CANCEL_REQ)).
    pub service_type: String,
    /// Request payload; its header and body are overwritten at send time.
    pub job: ReqJob,
}

/// An order acknowledgement or execution report bound for channel 3.
#[derive(Debug, Clone)]
pub struct ReportDispatch {
    /// Service type to stamp into the body header (31, 32, 33, or 41).
    pub service_type: String,
    /// Report payload; its header and body are overwritten at send time.
    pub report: RespOrder,
}

/// Sending half of the channel-1 mailbox.
pub type JobSender = mpsc::Sender<JobDispatch>;
/// Receiving half of the channel-1 mailbox (owned by the session).
pub type JobReceiver = mpsc::Receiver<JobDispatch>;
/// Sending half of the channel-3 mailbox.
pub type ReportSender = mpsc::Sender<ReportDispatch>;
/// Receiving half of the channel-3 mailbox (owned by the session).
pub type ReportReceiver = mpsc::Receiver<ReportDispatch>;

/// Create the channel-1 outbound mailbox.
#[must_use]
pub fn job_mailbox() -> (JobSender, JobReceiver) {
    mpsc::channel(MAILBOX_DEPTH)
}

/// Create the channel-3 outbound mailbox.
#[must_use]
pub fn report_mailbox() -> (ReportSender, ReportReceiver) {
    mpsc::channel(MAILBOX_DEPTH)
}
