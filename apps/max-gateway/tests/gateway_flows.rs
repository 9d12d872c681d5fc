//! Channel Session Integration Tests
//!
//! Each test stands up a stub venue (a real TCP listener on port 0) and
//! drives one channel session end to end: authentication op-code selection,
//! outbound sequence stamping, poll/poll-ack behavior, inbound sequencing,
//! and the reconnect cycle.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use max_gateway::messages::{op, svc, tr};
use max_gateway::{
    BodyHeader, Channel, ConfigMap, GatewayContext, JobChannel, JobDispatch, MsgHeader,
    OrderChannel, ReportChannel, ReportDispatch, ReqJob, ReqOrder, RespOrder, SessionTimings,
    job_mailbox, report_mailbox,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

const WAIT: Duration = Duration::from_secs(5);

fn test_ctx(channel: Channel, port: u16) -> Arc<GatewayContext> {
    let config = ConfigMap::from([
        ("Max:Active:Ip".to_owned(), "127.0.0.1".to_owned()),
        (
            format!("Max:Active:Port:{}", channel.number()),
            port.to_string(),
        ),
    ]);
    Arc::new(GatewayContext::new("OMS001", config))
}

/// Read one complete frame (start marker + 4-digit length) off the stub
/// venue's socket.
async fn read_frame(stream: &mut TcpStream) -> Vec<u8> {
    let mut prefix = [0u8; 5];
    stream.read_exact(&mut prefix).await.unwrap();
    assert_eq!(prefix[0], 0x02, "frame must open with the start marker");

    let length: usize = std::str::from_utf8(&prefix[1..])
        .unwrap()
        .parse()
        .unwrap();
    let mut rest = vec![0u8; length - 5];
    stream.read_exact(&mut rest).await.unwrap();

    let mut frame = prefix.to_vec();
    frame.extend_from_slice(&rest);
    frame
}

async fn wait_until(mut cond: impl FnMut() -> bool) {
    timeout(WAIT, async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

/// Header as the venue would stamp it on a control frame.
fn venue_header(op_code: &str, seq_num: u64) -> MsgHeader {
    MsgHeader {
        access_id: "MAXSVR".to_owned(),
        send_time: "090000000".to_owned(),
        op_code: op_code.to_owned(),
        seq_num,
        cnt: "00".to_owned(),
        async_flag: '0',
    }
}

/// A venue-originated new-order DATA frame carrying `seq_num`.
fn order_frame(seq_num: u64) -> Vec<u8> {
    let mut head = venue_header(op::DATA, seq_num);
    head.cnt = "01".to_owned();
    head.async_flag = '1';

    ReqOrder {
        head,
        body: BodyHeader::new(svc::ORDER_NEW_REQ),
        tr_code: tr::ORDER_NEW.to_owned(),
        req_id: 1001,
        action_id: "AX00000001".to_owned(),
        orig_order_id: 0,
        issue_code: "KR7005930003".to_owned(),
        ask_bid: '1',
        order_qty: 100,
        partial_flag: '1',
        order_price: 71_300,
        order_type: '2',
        user_id: "trader01".to_owned(),
        user_ip: "10.20.30.40".to_owned(),
        user_mac: "AABBCCDDEEFF".to_owned(),
    }
    .encode()
}

fn sample_job() -> ReqJob {
    ReqJob {
        head: MsgHeader::data("", 0),
        body: BodyHeader::new(svc::JOB_REGIS_REQ),
        tr_code: tr::JOB_REGIS.to_owned(),
        req_id: 1001,
        issue_code: "KR7005930003".to_owned(),
        ask_bid: '2',
        order_qty: 5000,
        order_price: 71_200,
        order_type: '0',
        user_id: "trader01".to_owned(),
        user_ip: "10.20.30.40".to_owned(),
        user_mac: "AABBCCDDEEFF".to_owned(),
        algo_type: "01".to_owned(),
        start_time: "090000".to_owned(),
        end_time: "153000".to_owned(),
        range_bound: "20".to_owned(),
        fee: "5".to_owned(),
    }
}

fn sample_report() -> RespOrder {
    RespOrder {
        head: MsgHeader::data("", 0),
        body: BodyHeader::new(svc::ORDER_EXEC),
        tr_code: tr::ORDER_EXEC.to_owned(),
        req_id: 1001,
        action_id: "AX00000001".to_owned(),
        order_id: 555_001,
        orig_order_id: 0,
        issue_code: "KR7005930003".to_owned(),
        ask_bid: '1',
        plc_type: '1',
        order_qty: 100,
        order_price: 71_300,
        order_type: '2',
        confirm_qty: 0,
        trading_no: 778_899,
        trading_price: 71_250,
        trading_volume: 40,
        trading_time: "101502321".to_owned(),
        error_code: String::new(),
        error_msg: String::new(),
    }
}

#[tokio::test]
async fn fresh_job_session_authenticates_with_link() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let ctx = test_ctx(Channel::Job, port);
    let cancel = CancellationToken::new();
    let (_job_tx, job_rx) = job_mailbox();

    let session = JobChannel::new(
        Arc::clone(&ctx),
        SessionTimings::default(),
        job_rx,
        cancel.clone(),
    );
    let handle = tokio::spawn(session.run());

    let (mut venue, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
    let frame = timeout(WAIT, read_frame(&mut venue)).await.unwrap();

    let head = MsgHeader::decode(&frame).unwrap();
    assert_eq!(head.op_code, op::LINK);
    assert_eq!(head.seq_num, 0);
    assert_eq!(head.access_id, "OMS001");
    assert_eq!(head.cnt, "00");
    assert_eq!(head.async_flag, '0');

    cancel.cancel();
    timeout(WAIT, handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn resumed_session_authenticates_with_dlnk() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let ctx = test_ctx(Channel::Report, port);
    ctx.sequences.set(Channel::Report, 7);
    let cancel = CancellationToken::new();
    let (_report_tx, report_rx) = report_mailbox();

    let session = ReportChannel::new(
        Arc::clone(&ctx),
        SessionTimings::default(),
        report_rx,
        cancel.clone(),
    );
    let handle = tokio::spawn(session.run());

    let (mut venue, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
    let frame = timeout(WAIT, read_frame(&mut venue)).await.unwrap();

    let head = MsgHeader::decode(&frame).unwrap();
    assert_eq!(head.op_code, op::DLNK);
    assert_eq!(head.seq_num, 7);

    cancel.cancel();
    timeout(WAIT, handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn job_submission_stamps_the_next_sequence() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let ctx = test_ctx(Channel::Job, port);
    ctx.sequences.set(Channel::Job, 5);
    let cancel = CancellationToken::new();
    let (job_tx, job_rx) = job_mailbox();

    let session = JobChannel::new(
        Arc::clone(&ctx),
        SessionTimings::default(),
        job_rx,
        cancel.clone(),
    );
    let handle = tokio::spawn(session.run());

    let (mut venue, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
    let auth = timeout(WAIT, read_frame(&mut venue)).await.unwrap();
    assert_eq!(MsgHeader::decode(&auth).unwrap().op_code, op::DLNK);

    job_tx
        .send(JobDispatch {
            service_type: svc::JOB_REGIS_REQ.to_owned(),
            job: sample_job(),
        })
        .await
        .unwrap();

    let frame = timeout(WAIT, read_frame(&mut venue)).await.unwrap();
    assert_eq!(frame.len(), ReqJob::WIDTH);
    assert_eq!(&frame[1..5], b"0253");
    assert_eq!(&frame[24..34], b"0000000006");

    let sent = ReqJob::decode(&frame).unwrap();
    assert_eq!(sent.head.op_code, op::DATA);
    assert_eq!(sent.head.seq_num, 6);
    assert_eq!(sent.head.access_id, "OMS001");
    assert_eq!(sent.head.cnt, "01");
    assert_eq!(sent.body.service_type, svc::JOB_REGIS_REQ);
    assert_eq!(sent.req_id, 1001);
    assert_eq!(ctx.sequences.last(Channel::Job), 6);

    cancel.cancel();
    timeout(WAIT, handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn report_submission_stamps_the_next_sequence() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let ctx = test_ctx(Channel::Report, port);
    ctx.sequences.set(Channel::Report, 41);
    let cancel = CancellationToken::new();
    let (report_tx, report_rx) = report_mailbox();

    let session = ReportChannel::new(
        Arc::clone(&ctx),
        SessionTimings::default(),
        report_rx,
        cancel.clone(),
    );
    let handle = tokio::spawn(session.run());

    let (mut venue, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
    let _auth = timeout(WAIT, read_frame(&mut venue)).await.unwrap();

    report_tx
        .send(ReportDispatch {
            service_type: svc::ORDER_EXEC.to_owned(),
            report: sample_report(),
        })
        .await
        .unwrap();

    let frame = timeout(WAIT, read_frame(&mut venue)).await.unwrap();
    assert_eq!(frame.len(), RespOrder::WIDTH);

    let sent = RespOrder::decode(&frame).unwrap();
    assert_eq!(sent.head.op_code, op::DATA);
    assert_eq!(sent.head.seq_num, 42);
    assert_eq!(sent.body.service_type, svc::ORDER_EXEC);
    assert_eq!(sent.trading_no, 778_899);
    assert_eq!(ctx.sequences.last(Channel::Report), 42);

    cancel.cancel();
    timeout(WAIT, handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn order_channel_answers_poll_with_stored_sequence() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let ctx = test_ctx(Channel::Order, port);
    ctx.sequences.set(Channel::Order, 9);
    let cancel = CancellationToken::new();

    let session = OrderChannel::new(Arc::clone(&ctx), SessionTimings::default(), cancel.clone());
    let handle = tokio::spawn(session.run());

    let (mut venue, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
    let _auth = timeout(WAIT, read_frame(&mut venue)).await.unwrap();

    venue
        .write_all(&venue_header(op::POLL, 3).encode())
        .await
        .unwrap();

    let frame = timeout(WAIT, read_frame(&mut venue)).await.unwrap();
    let pook = MsgHeader::decode(&frame).unwrap();
    assert_eq!(pook.op_code, op::POOK);
    // The reply carries this channel's stored sequence, not the probe's.
    assert_eq!(pook.seq_num, 9);
    // Everything else echoes the probe header.
    assert_eq!(pook.access_id, "MAXSVR");

    cancel.cancel();
    timeout(WAIT, handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn order_channel_advances_sequence_and_closes_on_gap() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let ctx = test_ctx(Channel::Order, port);
    ctx.sequences.set(Channel::Order, 4);
    let cancel = CancellationToken::new();
    let timings = SessionTimings {
        retry_delay: Duration::from_millis(50),
        ..SessionTimings::default()
    };

    let session = OrderChannel::new(Arc::clone(&ctx), timings, cancel.clone());
    let handle = tokio::spawn(session.run());

    let (mut venue, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
    let auth = timeout(WAIT, read_frame(&mut venue)).await.unwrap();
    assert_eq!(MsgHeader::decode(&auth).unwrap().seq_num, 4);

    // In-order frames advance the counter by exactly one each.
    venue.write_all(&order_frame(5)).await.unwrap();
    venue.write_all(&order_frame(6)).await.unwrap();
    let ctx_seq = Arc::clone(&ctx);
    wait_until(move || ctx_seq.sequences.last(Channel::Order) == 6).await;

    // A gap closes the connection without advancing the counter.
    venue.write_all(&order_frame(9)).await.unwrap();
    let mut probe = [0u8; 1];
    let n = timeout(WAIT, venue.read(&mut probe)).await.unwrap().unwrap();
    assert_eq!(n, 0, "session should close the socket on a sequence gap");
    assert_eq!(ctx.sequences.last(Channel::Order), 6);

    // The session reconnects and re-authenticates with the last good value.
    let (mut venue, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
    let auth = timeout(WAIT, read_frame(&mut venue)).await.unwrap();
    let head = MsgHeader::decode(&auth).unwrap();
    assert_eq!(head.op_code, op::DLNK);
    assert_eq!(head.seq_num, 6);

    cancel.cancel();
    timeout(WAIT, handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn order_channel_reassembles_fragmented_frames() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let ctx = test_ctx(Channel::Order, port);
    let cancel = CancellationToken::new();

    let session = OrderChannel::new(Arc::clone(&ctx), SessionTimings::default(), cancel.clone());
    let handle = tokio::spawn(session.run());

    let (mut venue, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
    let _auth = timeout(WAIT, read_frame(&mut venue)).await.unwrap();

    // One frame delivered in three chunks.
    let frame = order_frame(1);
    venue.write_all(&frame[..10]).await.unwrap();
    venue.flush().await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    venue.write_all(&frame[10..100]).await.unwrap();
    venue.flush().await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    venue.write_all(&frame[100..]).await.unwrap();

    let ctx_seq = Arc::clone(&ctx);
    wait_until(move || ctx_seq.sequences.last(Channel::Order) == 1).await;

    // Two frames coalesced into one write.
    let mut burst = order_frame(2);
    burst.extend_from_slice(&order_frame(3));
    venue.write_all(&burst).await.unwrap();

    let ctx_seq = Arc::clone(&ctx);
    wait_until(move || ctx_seq.sequences.last(Channel::Order) == 3).await;

    cancel.cancel();
    timeout(WAIT, handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn order_channel_heartbeat_timeout_forces_reconnect() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let ctx = test_ctx(Channel::Order, port);
    let cancel = CancellationToken::new();
    let timings = SessionTimings {
        beat_timeout: Duration::from_millis(200),
        retry_delay: Duration::from_millis(50),
        ..SessionTimings::default()
    };

    let session = OrderChannel::new(Arc::clone(&ctx), timings, cancel.clone());
    let handle = tokio::spawn(session.run());

    let (mut venue, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
    let _auth = timeout(WAIT, read_frame(&mut venue)).await.unwrap();

    // Stay silent: the session must conclude the line is stale and close.
    let mut probe = [0u8; 1];
    let n = timeout(WAIT, venue.read(&mut probe)).await.unwrap().unwrap();
    assert_eq!(n, 0, "session should close a silent connection");

    // And reconnect after the backoff.
    let accepted = timeout(WAIT, listener.accept()).await;
    assert!(accepted.is_ok(), "session should reconnect after timeout");

    cancel.cancel();
    timeout(WAIT, handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn poll_probe_sent_when_line_is_idle() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let ctx = test_ctx(Channel::Job, port);
    ctx.sequences.set(Channel::Job, 12);
    let cancel = CancellationToken::new();
    let (_job_tx, job_rx) = job_mailbox();
    let timings = SessionTimings {
        poll_interval: Duration::from_millis(100),
        ..SessionTimings::default()
    };

    let session = JobChannel::new(Arc::clone(&ctx), timings, job_rx, cancel.clone());
    let handle = tokio::spawn(session.run());

    let (mut venue, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
    let _auth = timeout(WAIT, read_frame(&mut venue)).await.unwrap();

    let frame = timeout(WAIT, read_frame(&mut venue)).await.unwrap();
    let poll = MsgHeader::decode(&frame).unwrap();
    assert_eq!(poll.op_code, op::POLL);
    assert_eq!(poll.seq_num, 12);
    assert_eq!(poll.cnt, "00");
    assert_eq!(poll.async_flag, '1');

    // The line stays idle, so probes keep coming.
    let frame = timeout(WAIT, read_frame(&mut venue)).await.unwrap();
    assert_eq!(MsgHeader::decode(&frame).unwrap().op_code, op::POLL);

    cancel.cancel();
    timeout(WAIT, handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn job_channel_handles_ack_and_keeps_processing() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let ctx = test_ctx(Channel::Job, port);
    let cancel = CancellationToken::new();
    let (_job_tx, job_rx) = job_mailbox();

    let session = JobChannel::new(
        Arc::clone(&ctx),
        SessionTimings::default(),
        job_rx,
        cancel.clone(),
    );
    let handle = tokio::spawn(session.run());

    let (mut venue, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
    let _auth = timeout(WAIT, read_frame(&mut venue)).await.unwrap();

    // POOK is ignored, DAOK is decoded and logged, and the session keeps
    // reading: the trailing LIOK must still update the sequence.
    venue
        .write_all(&venue_header(op::POOK, 0).encode())
        .await
        .unwrap();

    let mut ack_head = venue_header(op::DAOK, 1);
    ack_head.cnt = "01".to_owned();
    let ack = max_gateway::AckJob {
        head: ack_head,
        body: BodyHeader::new(svc::JOB_REGIS_ACK),
        req_id: 1001,
        error_flag: 'Y',
        error_msg: "duplicate job registration".to_owned(),
    };
    venue.write_all(&ack.encode()).await.unwrap();

    venue
        .write_all(&venue_header(op::LIOK, 42).encode())
        .await
        .unwrap();

    let ctx_seq = Arc::clone(&ctx);
    wait_until(move || ctx_seq.sequences.last(Channel::Job) == 42).await;

    cancel.cancel();
    timeout(WAIT, handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn job_channel_closes_on_protocol_error_code() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let ctx = test_ctx(Channel::Job, port);
    let cancel = CancellationToken::new();
    let (_job_tx, job_rx) = job_mailbox();
    let timings = SessionTimings {
        retry_delay: Duration::from_millis(50),
        ..SessionTimings::default()
    };

    let session = JobChannel::new(Arc::clone(&ctx), timings, job_rx, cancel.clone());
    let handle = tokio::spawn(session.run());

    let (mut venue, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
    let _auth = timeout(WAIT, read_frame(&mut venue)).await.unwrap();

    venue
        .write_all(&venue_header(op::E006, 0).encode())
        .await
        .unwrap();

    let mut probe = [0u8; 1];
    let n = timeout(WAIT, venue.read(&mut probe)).await.unwrap().unwrap();
    assert_eq!(n, 0, "session should close on a protocol error code");

    // Fresh cycle: sequence is still 0, so the retry authenticates with LINK.
    let (mut venue, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
    let auth = timeout(WAIT, read_frame(&mut venue)).await.unwrap();
    assert_eq!(MsgHeader::decode(&auth).unwrap().op_code, op::LINK);

    cancel.cancel();
    timeout(WAIT, handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn report_channel_adopts_smaller_ack_sequence() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let ctx = test_ctx(Channel::Report, port);
    ctx.sequences.set(Channel::Report, 10);
    let cancel = CancellationToken::new();
    let (_report_tx, report_rx) = report_mailbox();

    let session = ReportChannel::new(
        Arc::clone(&ctx),
        SessionTimings::default(),
        report_rx,
        cancel.clone(),
    );
    let handle = tokio::spawn(session.run());

    let (mut venue, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
    let _auth = timeout(WAIT, read_frame(&mut venue)).await.unwrap();

    // A smaller acknowledged sequence marks the recovery point.
    venue
        .write_all(&venue_header(op::DLOK, 4).encode())
        .await
        .unwrap();
    let ctx_seq = Arc::clone(&ctx);
    wait_until(move || ctx_seq.sequences.last(Channel::Report) == 4).await;

    // A larger one is ignored.
    venue
        .write_all(&venue_header(op::DLOK, 20).encode())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(ctx.sequences.last(Channel::Report), 4);

    cancel.cancel();
    timeout(WAIT, handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn job_request_dropped_while_disconnected() {
    // No listener and no endpoint configuration: the session cannot connect
    // and must drain (and drop) submitted requests during its backoff.
    let ctx = Arc::new(GatewayContext::new("OMS001", ConfigMap::new()));
    let cancel = CancellationToken::new();
    let (job_tx, job_rx) = job_mailbox();
    let timings = SessionTimings {
        retry_delay: Duration::from_millis(50),
        ..SessionTimings::default()
    };

    let session = JobChannel::new(Arc::clone(&ctx), timings, job_rx, cancel.clone());
    let handle = tokio::spawn(session.run());

    job_tx
        .send(JobDispatch {
            service_type: svc::JOB_REGIS_REQ.to_owned(),
            job: sample_job(),
        })
        .await
        .unwrap();

    // The dropped request frees its mailbox slot and never consumes a
    // sequence number.
    let tx_probe = job_tx.clone();
    wait_until(move || tx_probe.capacity() == tx_probe.max_capacity()).await;
    assert_eq!(ctx.sequences.last(Channel::Job), 0);

    cancel.cancel();
    timeout(WAIT, handle).await.unwrap().unwrap();
}
