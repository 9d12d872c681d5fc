//! MAX Venue Adapters
//!
//! Implements the three TCP client sessions against the venue's fixed-width
//! binary protocol:
//!
//! - **Channel 1**: job registration/cancel requests and acknowledgements
//! - **Channel 2**: new/cancel order requests pushed by the venue
//! - **Channel 3**: order acknowledgements and executions

pub mod codec;
pub mod heartbeat;
pub mod job_channel;
pub mod mailbox;
pub mod messages;
pub mod order_channel;
pub mod report_channel;

pub use codec::CodecError;
pub use heartbeat::{BeatClock, PollClock};
pub use job_channel::{JobChannel, JobChannelError};
pub use mailbox::{
    JobDispatch, JobReceiver, JobSender, ReportDispatch, ReportReceiver, ReportSender,
    job_mailbox, report_mailbox,
};
pub use messages::{
    AckJob, BodyHeader, DataHeader, JobNotice, MsgHeader, ReqJob, ReqOrder, RespOrder,
};
pub use order_channel::{OrderChannel, OrderChannelError};
pub use report_channel::{ReportChannel, ReportChannelError};
