//! Channel 1 - Job Registration/Cancel Requests and Acknowledgements
//!
//! Outbound-initiated channel: the OMS submits job registration and cancel
//! requests through the session's mailbox, and the venue answers with DAOK
//! acknowledgements. During idle periods the session emits POLL probes to
//! keep the line active.

use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::application::GatewayContext;
use crate::domain::{Channel, framing};
use crate::infrastructure::config::settings::{self, SessionTimings, SettingsError};
use crate::infrastructure::max::heartbeat::PollClock;
use crate::infrastructure::max::mailbox::{JobDispatch, JobReceiver};
use crate::infrastructure::max::messages::{AckJob, BodyHeader, MsgHeader, op};

const CHANNEL: Channel = Channel::Job;
const RECV_BUFFER: usize = 1024;

/// Errors that close the channel-1 connection.
#[derive(Debug, thiserror::Error)]
pub enum JobChannelError {
    /// Endpoint resolution failed.
    #[error("endpoint configuration: {0}")]
    Settings(#[from] SettingsError),

    /// Socket-level failure.
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    /// The venue closed the connection.
    #[error("peer closed the connection")]
    PeerClosed,

    /// An op-code outside the known set was received.
    #[error("unexpected op-code {op_code:?}")]
    Protocol {
        /// The offending op-code.
        op_code: String,
    },
}

/// Channel-1 session: connect, authenticate, forward mailbox job requests,
/// and reconnect with a fixed backoff on any failure.
pub struct JobChannel {
    ctx: Arc<GatewayContext>,
    timings: SessionTimings,
    mailbox: JobReceiver,
    mailbox_open: bool,
    cancel: CancellationToken,
}

impl JobChannel {
    /// Create the session around its outbound mailbox.
    #[must_use]
    pub const fn new(
        ctx: Arc<GatewayContext>,
        timings: SessionTimings,
        mailbox: JobReceiver,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            ctx,
            timings,
            mailbox,
            mailbox_open: true,
            cancel,
        }
    }

    /// Drive the connect/authenticate/send/receive cycle until shutdown.
    pub async fn run(mut self) {
        loop {
            if self.cancel.is_cancelled() {
                tracing::info!(channel = 1, "Job channel stopped");
                return;
            }

            match self.connect_and_run().await {
                Ok(()) => {
                    tracing::info!(channel = 1, "Job channel stopped");
                    return;
                }
                Err(e) => {
                    tracing::error!(channel = 1, error = %e, "Job channel connection error");
                }
            }

            if !self.backoff().await {
                return;
            }
        }
    }

    /// Wait out the reconnect delay, dropping (and logging) any job requests
    /// submitted while the socket is down. Returns `false` on shutdown.
    async fn backoff(&mut self) -> bool {
        let deadline = tokio::time::Instant::now() + self.timings.retry_delay;
        while self.mailbox_open {
            tokio::select! {
                () = self.cancel.cancelled() => return false,
                () = tokio::time::sleep_until(deadline) => return true,
                dispatch = self.mailbox.recv() => match dispatch {
                    Some(dispatch) => tracing::error!(
                        channel = 1,
                        service_type = %dispatch.service_type,
                        req_id = dispatch.job.req_id,
                        "Channel disconnected, dropping job request"
                    ),
                    None => self.mailbox_open = false,
                },
            }
        }
        tokio::select! {
            () = self.cancel.cancelled() => false,
            () = tokio::time::sleep_until(deadline) => true,
        }
    }

    /// Connect and process traffic until an error or cancellation.
    async fn connect_and_run(&mut self) -> Result<(), JobChannelError> {
        let addr = settings::endpoint(&self.ctx.config, CHANNEL)?;
        tracing::info!(channel = 1, addr = %addr, "Connecting to MAX");
        let mut stream = TcpStream::connect(&addr).await?;
        self.session(&mut stream).await
    }

    async fn session(&mut self, stream: &mut TcpStream) -> Result<(), JobChannelError> {
        let link = MsgHeader::link(&self.ctx.access_id, self.ctx.sequences.last(CHANNEL));
        tracing::info!(channel = 1, op_code = %link.op_code, seq = link.seq_num, "Authenticating");
        stream.write_all(&link.encode()).await?;

        let mut buf = BytesMut::with_capacity(RECV_BUFFER);
        let mut poll = PollClock::new(self.timings.poll_interval);
        let mut ticker = tokio::time::interval_at(
            tokio::time::Instant::now() + self.timings.poll_interval,
            self.timings.poll_interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => return Ok(()),
                _ = ticker.tick() => {
                    if poll.poll_due() {
                        let probe =
                            MsgHeader::poll(&self.ctx.access_id, self.ctx.sequences.last(CHANNEL));
                        stream.write_all(&probe.encode()).await?;
                        poll.record_send();
                    }
                }
                dispatch = self.mailbox.recv(), if self.mailbox_open => match dispatch {
                    Some(dispatch) => self.send_job(stream, dispatch, &mut poll).await?,
                    None => self.mailbox_open = false,
                },
                read = fill(stream, &mut buf) => {
                    let n = read?;
                    if n == 0 {
                        report_leftover(&buf);
                        return Err(JobChannelError::PeerClosed);
                    }
                    while let Some(frame) = framing::next_frame(&mut buf) {
                        self.on_frame(&frame)?;
                    }
                }
            }
        }
    }

    /// Stamp header fields onto a mailbox request and write it out.
    async fn send_job(
        &self,
        stream: &mut TcpStream,
        dispatch: JobDispatch,
        poll: &mut PollClock,
    ) -> Result<(), JobChannelError> {
        let JobDispatch {
            service_type,
            mut job,
        } = dispatch;
        job.head = MsgHeader::data(&self.ctx.access_id, self.ctx.sequences.next(CHANNEL));
        job.body = BodyHeader::new(&service_type);

        stream.write_all(&job.encode()).await?;
        poll.record_send();

        tracing::debug!(
            channel = 1,
            service_type = %service_type,
            req_id = job.req_id,
            seq = job.head.seq_num,
            "Job request sent"
        );
        Ok(())
    }

    /// Dispatch one complete inbound frame.
    fn on_frame(&self, frame: &[u8]) -> Result<(), JobChannelError> {
        let head = match MsgHeader::decode(frame) {
            Ok(head) => head,
            Err(e) => {
                tracing::error!(channel = 1, error = %e, "Dropping undecodable frame");
                return Ok(());
            }
        };

        match head.op_code.as_str() {
            // Probe acknowledgements need no handling.
            op::POOK => Ok(()),
            op::LIOK | op::DLOK => {
                tracing::info!(
                    channel = 1,
                    op_code = %head.op_code,
                    recv_seq = head.seq_num,
                    last_seq = self.ctx.sequences.last(CHANNEL),
                    "Link acknowledged"
                );
                self.ctx.sequences.apply_link_ack(CHANNEL, head.seq_num);
                Ok(())
            }
            op::DAOK => {
                self.on_job_ack(frame, &head);
                Ok(())
            }
            other => {
                tracing::info!(
                    channel = 1,
                    op_code = %other,
                    recv_seq = head.seq_num,
                    last_seq = self.ctx.sequences.last(CHANNEL),
                    "Unexpected op-code, closing connection"
                );
                Err(JobChannelError::Protocol {
                    op_code: other.to_owned(),
                })
            }
        }
    }

    /// Decode and log a job registration/cancel acknowledgement.
    fn on_job_ack(&self, frame: &[u8], head: &MsgHeader) {
        match AckJob::decode(frame) {
            Ok(ack) if ack.error_flag == 'Y' => tracing::info!(
                channel = 1,
                recv_seq = head.seq_num,
                req_id = ack.req_id,
                error_flag = %ack.error_flag,
                error_msg = %ack.error_msg,
                "Job acknowledged"
            ),
            Ok(ack) => tracing::info!(
                channel = 1,
                recv_seq = head.seq_num,
                req_id = ack.req_id,
                error_flag = %ack.error_flag,
                "Job acknowledged"
            ),
            Err(e) => {
                tracing::error!(channel = 1, error = %e, "Dropping undecodable job acknowledgement");
            }
        }
    }
}

/// Grow the buffer and read more bytes from the socket.
async fn fill(stream: &mut TcpStream, buf: &mut BytesMut) -> std::io::Result<usize> {
    buf.reserve(RECV_BUFFER);
    stream.read_buf(buf).await
}

/// Log any bytes left in the buffer when the connection ends.
fn report_leftover(buf: &BytesMut) {
    if !buf.is_empty() {
        tracing::error!(
            channel = 1,
            leftover = %String::from_utf8_lossy(buf),
            "Connection ended with undrained bytes"
        );
    }
}
