//! Channel 2 - New/Cancel Order Requests
//!
//! Inbound-initiated channel: the venue pushes order requests (and job
//! done/emergency notifications) as DATA frames, each carrying the next
//! sequence number. The session answers POLL probes with POOK, verifies the
//! inbound sequence is exactly `stored + 1`, and tears the connection down
//! when the inbound side goes silent past the heartbeat timeout. It never
//! originates application messages.

use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::application::GatewayContext;
use crate::domain::{Channel, framing};
use crate::infrastructure::config::settings::{self, SessionTimings, SettingsError};
use crate::infrastructure::max::codec::CodecError;
use crate::infrastructure::max::heartbeat::BeatClock;
use crate::infrastructure::max::messages::{DataHeader, JobNotice, MsgHeader, ReqOrder, op, svc};

const CHANNEL: Channel = Channel::Order;
const RECV_BUFFER: usize = 1024;

/// Errors that close the channel-2 connection.
#[derive(Debug, thiserror::Error)]
pub enum OrderChannelError {
    /// Endpoint resolution failed.
    #[error("endpoint configuration: {0}")]
    Settings(#[from] SettingsError),

    /// Socket-level failure.
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    /// The venue closed the connection.
    #[error("peer closed the connection")]
    PeerClosed,

    /// No inbound frame within the heartbeat timeout.
    #[error("heartbeat timeout")]
    HeartbeatTimeout,

    /// An inbound DATA frame skipped the expected sequence.
    #[error("out-of-order sequence: received {received}, last {last}")]
    SequenceGap {
        /// Sequence carried by the offending frame.
        received: u64,
        /// Stored sequence at the time of the gap.
        last: u64,
    },

    /// An op-code outside the known set was received.
    #[error("unexpected op-code {op_code:?}")]
    Protocol {
        /// The offending op-code.
        op_code: String,
    },
}

/// Channel-2 session: connect, authenticate, receive order traffic, reply to
/// polls, and reconnect with a fixed backoff on any failure.
pub struct OrderChannel {
    ctx: Arc<GatewayContext>,
    timings: SessionTimings,
    cancel: CancellationToken,
}

impl OrderChannel {
    /// Create the session. It owns no socket until [`run`](Self::run)
    /// connects one.
    #[must_use]
    pub const fn new(
        ctx: Arc<GatewayContext>,
        timings: SessionTimings,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            ctx,
            timings,
            cancel,
        }
    }

    /// Drive the connect/authenticate/receive cycle until shutdown.
    ///
    /// Failures are logged and followed by the fixed reconnect backoff; the
    /// sequence counter persists across cycles.
    pub async fn run(self) {
        loop {
            if self.cancel.is_cancelled() {
                tracing::info!(channel = 2, "Order channel stopped");
                return;
            }

            match self.connect_and_run().await {
                Ok(()) => {
                    tracing::info!(channel = 2, "Order channel stopped");
                    return;
                }
                Err(e) => {
                    tracing::error!(channel = 2, error = %e, "Order channel connection error");
                }
            }

            tokio::select! {
                () = self.cancel.cancelled() => {}
                () = tokio::time::sleep(self.timings.retry_delay) => {}
            }
        }
    }

    /// Connect and process frames until an error or cancellation.
    async fn connect_and_run(&self) -> Result<(), OrderChannelError> {
        let addr = settings::endpoint(&self.ctx.config, CHANNEL)?;
        tracing::info!(channel = 2, addr = %addr, "Connecting to MAX");
        let mut stream = TcpStream::connect(&addr).await?;
        self.session(&mut stream).await
    }

    async fn session(&self, stream: &mut TcpStream) -> Result<(), OrderChannelError> {
        let link = MsgHeader::link(&self.ctx.access_id, self.ctx.sequences.last(CHANNEL));
        tracing::info!(channel = 2, op_code = %link.op_code, seq = link.seq_num, "Authenticating");
        stream.write_all(&link.encode()).await?;

        let mut buf = BytesMut::with_capacity(RECV_BUFFER);
        let mut beat = BeatClock::new(self.timings.beat_timeout);
        let mut ticker = tokio::time::interval_at(
            tokio::time::Instant::now() + self.timings.beat_timeout,
            self.timings.beat_timeout,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => return Ok(()),
                _ = ticker.tick() => {
                    if beat.is_stale() {
                        tracing::warn!(
                            channel = 2,
                            idle_secs = beat.idle_for().as_secs(),
                            "Heartbeat timeout, closing connection"
                        );
                        return Err(OrderChannelError::HeartbeatTimeout);
                    }
                }
                read = fill(stream, &mut buf) => {
                    let n = read?;
                    if n == 0 {
                        report_leftover(&buf);
                        return Err(OrderChannelError::PeerClosed);
                    }
                    while let Some(frame) = framing::next_frame(&mut buf) {
                        beat.record_recv();
                        self.on_frame(&frame, stream).await?;
                    }
                }
            }
        }
    }

    /// Dispatch one complete inbound frame.
    async fn on_frame(
        &self,
        frame: &[u8],
        stream: &mut TcpStream,
    ) -> Result<(), OrderChannelError> {
        let head = match MsgHeader::decode(frame) {
            Ok(head) => head,
            Err(e) => {
                tracing::error!(channel = 2, error = %e, "Dropping undecodable frame");
                return Ok(());
            }
        };

        let op_code = head.op_code.clone();
        match op_code.as_str() {
            op::POLL => {
                // Echo the probe header back, substituting our op-code and
                // this channel's stored sequence.
                let mut pook = head;
                pook.op_code = op::POOK.to_owned();
                pook.seq_num = self.ctx.sequences.last(CHANNEL);
                stream.write_all(&pook.encode()).await?;
                Ok(())
            }
            op::LIOK | op::DLOK => {
                tracing::info!(
                    channel = 2,
                    op_code = %head.op_code,
                    recv_seq = head.seq_num,
                    last_seq = self.ctx.sequences.last(CHANNEL),
                    "Link acknowledged"
                );
                self.ctx.sequences.apply_link_ack(CHANNEL, head.seq_num);
                Ok(())
            }
            op::DATA => self.on_data(frame),
            other => {
                tracing::info!(
                    channel = 2,
                    op_code = %other,
                    recv_seq = head.seq_num,
                    last_seq = self.ctx.sequences.last(CHANNEL),
                    "Unexpected op-code, closing connection"
                );
                Err(OrderChannelError::Protocol {
                    op_code: other.to_owned(),
                })
            }
        }
    }

    /// Verify the DATA sequence, then decode and log the carried message.
    fn on_data(&self, frame: &[u8]) -> Result<(), OrderChannelError> {
        let data = match DataHeader::decode(frame) {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(channel = 2, error = %e, "Dropping undecodable data header");
                return Ok(());
            }
        };

        let last = self.ctx.sequences.last(CHANNEL);
        if !self.ctx.sequences.try_advance(CHANNEL, data.head.seq_num) {
            tracing::warn!(
                channel = 2,
                recv_seq = data.head.seq_num,
                last_seq = last,
                "Sequence error, closing connection"
            );
            return Err(OrderChannelError::SequenceGap {
                received: data.head.seq_num,
                last,
            });
        }

        match data.body.service_type.as_str() {
            svc::JOB_EMERGENCY | svc::JOB_DONE => self.log_job_notice(frame),
            _ => self.log_order_request(frame),
        }
        Ok(())
    }

    fn log_job_notice(&self, frame: &[u8]) {
        match JobNotice::decode(frame) {
            Ok(notice) => tracing::info!(
                channel = 2,
                service_type = %notice.body.service_type,
                tr_code = %notice.tr_code,
                req_id = notice.req_id,
                issue_code = %notice.issue_code,
                reason = %notice.reason,
                "Job notification"
            ),
            Err(e) => self.log_drop(frame, &e),
        }
    }

    fn log_order_request(&self, frame: &[u8]) {
        match ReqOrder::decode(frame) {
            Ok(order) => tracing::info!(
                channel = 2,
                service_type = %order.body.service_type,
                tr_code = %order.tr_code,
                req_id = order.req_id,
                action_id = %order.action_id,
                orig_order_id = order.orig_order_id,
                issue_code = %order.issue_code,
                ask_bid = %order.ask_bid,
                order_qty = order.order_qty,
                partial_flag = %order.partial_flag,
                order_price = order.order_price,
                order_type = %order.order_type,
                user_id = %order.user_id,
                "Order request"
            ),
            Err(e) => self.log_drop(frame, &e),
        }
    }

    #[allow(clippy::unused_self)]
    fn log_drop(&self, frame: &[u8], error: &CodecError) {
        tracing::error!(
            channel = 2,
            frame_len = frame.len(),
            error = %error,
            "Dropping undecodable payload"
        );
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
            channel = 2,
            leftover = %String::from_utf8_lossy(buf),
            "Connection ended with undrained bytes"
        );
    }
}
