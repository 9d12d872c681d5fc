//! MAX Wire Message Catalog
//!
//! Typed definitions for every frame exchanged with the venue, each with an
//! explicit fixed-width encode/decode pair (offsets and widths known at
//! compile time). A frame is a 40-byte message header, optionally followed by
//! a 50-byte body header and a message-specific fixed field set.
//!
//! Encoding always recomputes the start marker and LENGTH field from the
//! concrete type's width; callers never hand-construct those two fields.

use crate::domain::framing::STX;
use crate::infrastructure::max::codec::{self, CodecError};

/// Logical operation codes carried in the message header.
pub mod op {
    /// Initial authentication (stored sequence is 0).
    pub const LINK: &str = "LINK";
    /// Authentication acknowledgement for LINK.
    pub const LIOK: &str = "LIOK";
    /// Resumed authentication (stored sequence > 0).
    pub const DLNK: &str = "DLNK";
    /// Authentication acknowledgement for DLNK.
    pub const DLOK: &str = "DLOK";
    /// Application data frame.
    pub const DATA: &str = "DATA";
    /// Job acknowledgement frame (channel 1 only).
    pub const DAOK: &str = "DAOK";
    /// Liveness probe.
    pub const POLL: &str = "POLL";
    /// Liveness probe acknowledgement.
    pub const POOK: &str = "POOK";

    /// Start-marker error reported by the venue.
    pub const E001: &str = "E001";
    /// Message-length error reported by the venue.
    pub const E002: &str = "E002";
    /// Unknown access id reported by the venue.
    pub const E003: &str = "E003";
    /// Sequence error reported by the venue.
    pub const E006: &str = "E006";
}

/// Service-type codes identifying the business message in a DATA frame.
pub mod svc {
    /// Job registration request.
    pub const JOB_REGIS_REQ: &str = "11";
    /// Job registration acknowledgement.
    pub const JOB_REGIS_ACK: &str = "12";
    /// Job cancel request.
    pub const JOB_CANCEL_REQ: &str = "13";
    /// Job cancel acknowledgement.
    pub const JOB_CANCEL_ACK: &str = "14";
    /// Job done notification.
    pub const JOB_DONE: &str = "16";
    /// New order request.
    pub const ORDER_NEW_REQ: &str = "21";
    /// Cancel order request.
    pub const ORDER_CANCEL_REQ: &str = "22";
    /// Replace order request.
    pub const ORDER_REPLACE_REQ: &str = "23";
    /// New order acknowledgement.
    pub const ORDER_NEW_ACK: &str = "31";
    /// Cancel order acknowledgement.
    pub const ORDER_CANCEL_ACK: &str = "32";
    /// Replace order acknowledgement.
    pub const ORDER_REPLACE_ACK: &str = "33";
    /// Execution report.
    pub const ORDER_EXEC: &str = "41";
    /// Job emergency cancel notification.
    pub const JOB_EMERGENCY: &str = "90";
}

/// Transaction codes carried in DATA payloads.
pub mod tr {
    /// Job registration.
    pub const JOB_REGIS: &str = "TCHAOR10001";
    /// Job cancel.
    pub const JOB_CANCEL: &str = "TCHAOR10003";
    /// Job done.
    pub const JOB_DONE: &str = "TTRODP11307";
    /// Job emergency cancel.
    pub const JOB_EMERGENCY: &str = "TTRODP11303";
    /// New order.
    pub const ORDER_NEW: &str = "TCHODR10001";
    /// Cancel order.
    pub const ORDER_CANCEL: &str = "TCHODR10003";
    /// Replace order.
    pub const ORDER_REPLACE: &str = "TCHODR10005";
    /// Normal order acknowledgement.
    pub const ORDER_NORMAL: &str = "TTRODP11301";
    /// Refused order acknowledgement.
    pub const ORDER_REJECT: &str = "TTRODP11321";
    /// Execution.
    pub const ORDER_EXEC: &str = "TTRTDP21301";
}

/// Message count for control frames.
pub const CNT_NONE: &str = "00";
/// Message count for DATA frames.
pub const CNT_DATA: &str = "01";
/// Synchronous communicate mode flag.
pub const SYNC: char = '0';
/// Asynchronous communicate mode flag.
pub const ASYNC: char = '1';

/// SEND_TIME wall-clock format (`HHmmssfff`).
pub const TIME_FORMAT: &str = "%H%M%S%3f";

/// Current wall-clock SEND_TIME stamp.
#[must_use]
pub fn send_time_now() -> String {
    chrono::Local::now().format(TIME_FORMAT).to_string()
}

// =============================================================================
// Message Header
// =============================================================================

/// 40-byte header opening every frame.
///
/// The start marker and LENGTH field are not represented: both are derived
/// at encode time and validated at decode time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgHeader {
    /// Session identity (6 chars).
    pub access_id: String,
    /// `HHmmssfff` send timestamp, informational.
    pub send_time: String,
    /// Operation code (4 chars).
    pub op_code: String,
    /// Sequence number (10 digits on the wire).
    pub seq_num: u64,
    /// Message count indicator (`"00"` or `"01"`).
    pub cnt: String,
    /// Communicate mode (`'0'` sync, `'1'` async).
    pub async_flag: char,
}

impl MsgHeader {
    /// Fixed header width in bytes.
    pub const WIDTH: usize = 40;

    /// Build the authentication header for a session whose stored sequence
    /// is `seq_num`: LINK for a fresh session (sequence 0), DLNK when
    /// resuming.
    #[must_use]
    pub fn link(access_id: &str, seq_num: u64) -> Self {
        let op_code = if seq_num == 0 { op::LINK } else { op::DLNK };
        Self {
            access_id: access_id.to_owned(),
            send_time: send_time_now(),
            op_code: op_code.to_owned(),
            seq_num,
            cnt: CNT_NONE.to_owned(),
            async_flag: SYNC,
        }
    }

    /// Build a POLL liveness probe header.
    #[must_use]
    pub fn poll(access_id: &str, seq_num: u64) -> Self {
        Self {
            access_id: access_id.to_owned(),
            send_time: send_time_now(),
            op_code: op::POLL.to_owned(),
            seq_num,
            cnt: CNT_NONE.to_owned(),
            async_flag: ASYNC,
        }
    }

    /// Build the header stamped onto an outbound DATA frame.
    #[must_use]
    pub fn data(access_id: &str, seq_num: u64) -> Self {
        Self {
            access_id: access_id.to_owned(),
            send_time: send_time_now(),
            op_code: op::DATA.to_owned(),
            seq_num,
            cnt: CNT_DATA.to_owned(),
            async_flag: ASYNC,
        }
    }

    /// Encode as a standalone header-only frame (LENGTH = 40).
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![b' '; Self::WIDTH];
        self.encode_into(&mut buf, Self::WIDTH);
        buf
    }

    /// Write the header into the first 40 bytes of a frame whose total
    /// length is `frame_len`.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn encode_into(&self, buf: &mut [u8], frame_len: usize) {
        buf[0] = STX;
        codec::write_digits(buf, 1..5, frame_len as u64);
        codec::write_text(buf, 5..11, &self.access_id);
        codec::write_text(buf, 11..20, &self.send_time);
        codec::write_text(buf, 20..24, &self.op_code);
        codec::write_digits(buf, 24..34, self.seq_num);
        codec::write_text(buf, 34..36, &self.cnt);
        codec::write_char(buf, 36, self.async_flag);
        codec::write_text(buf, 37..40, "");
    }

    /// Decode the header from the front of a frame.
    ///
    /// # Errors
    ///
    /// Fails on a short slice, a missing start marker, or non-numeric
    /// LENGTH/SEQ_NUM digits.
    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        codec::ensure_len(buf, Self::WIDTH)?;
        if buf[0] != STX {
            return Err(CodecError::BadMarker);
        }
        codec::read_digits(buf, 1..5, "LENGTH")?;
        Ok(Self {
            access_id: codec::read_text(buf, 5..11),
            send_time: codec::read_text(buf, 11..20),
            op_code: codec::read_text(buf, 20..24),
            seq_num: codec::read_digits(buf, 24..34, "SEQ_NUM")?,
            cnt: codec::read_text(buf, 34..36),
            async_flag: codec::read_char(buf, 36),
        })
    }
}

// =============================================================================
// Body Header
// =============================================================================

/// 50-byte body header following the message header in DATA frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyHeader {
    /// Data type tag (`'L'` = algo).
    pub data_type: char,
    /// Service-type code (2 chars, see [`svc`]).
    pub service_type: String,
    /// Respond code (`"0000"` = normal).
    pub respond_code: String,
}

impl BodyHeader {
    /// Fixed body-header width in bytes.
    pub const WIDTH: usize = 50;

    /// Build a body header with the default data type and respond code.
    #[must_use]
    pub fn new(service_type: &str) -> Self {
        Self {
            data_type: 'L',
            service_type: service_type.to_owned(),
            respond_code: "0000".to_owned(),
        }
    }

    /// Write the body header into its 50-byte slice of a frame.
    pub(crate) fn encode_into(&self, buf: &mut [u8]) {
        codec::write_char(buf, 0, self.data_type);
        codec::write_text(buf, 1..3, &self.service_type);
        codec::write_text(buf, 3..7, &self.respond_code);
        codec::write_text(buf, 7..50, "");
    }

    /// Decode the body header from its 50-byte slice of a frame.
    ///
    /// # Errors
    ///
    /// Fails if the slice is shorter than 50 bytes.
    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        codec::ensure_len(buf, Self::WIDTH)?;
        Ok(Self {
            data_type: codec::read_char(buf, 0),
            service_type: codec::read_text(buf, 1..3),
            respond_code: codec::read_text(buf, 3..7),
        })
    }
}

// =============================================================================
// Combined Data Header
// =============================================================================

/// Message header + body header prefix shared by all DATA payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataHeader {
    /// Message header.
    pub head: MsgHeader,
    /// Body header.
    pub body: BodyHeader,
}

impl DataHeader {
    /// Combined prefix width in bytes.
    pub const WIDTH: usize = MsgHeader::WIDTH + BodyHeader::WIDTH;

    /// Decode both headers from the front of a DATA frame.
    ///
    /// # Errors
    ///
    /// Fails if either header fails to decode.
    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        codec::ensure_len(buf, Self::WIDTH)?;
        Ok(Self {
            head: MsgHeader::decode(buf)?,
            body: BodyHeader::decode(&buf[MsgHeader::WIDTH..Self::WIDTH])?,
        })
    }
}

// =============================================================================
// OMS -> MAX: Job Registration / Cancel Request
// =============================================================================

/// Job registration or cancel request (service types 11, 13).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReqJob {
    /// Message header (stamped by the session at send time).
    pub head: MsgHeader,
    /// Body header (stamped by the session at send time).
    pub body: BodyHeader,
    /// Transaction code ([`tr::JOB_REGIS`] or [`tr::JOB_CANCEL`]).
    pub tr_code: String,
    /// Job registration id of the OMS.
    pub req_id: u64,
    /// Issue code.
    pub issue_code: String,
    /// `'1'` ask, `'2'` bid.
    pub ask_bid: char,
    /// Order quantity.
    pub order_qty: u64,
    /// Order price.
    pub order_price: u64,
    /// `'0'` = AI order.
    pub order_type: char,
    /// User id.
    pub user_id: String,
    /// User IP address.
    pub user_ip: String,
    /// User MAC address.
    pub user_mac: String,
    /// Algo type (`"01"` VWAP, `"02"` TWAP).
    pub algo_type: String,
    /// Job start time (HHMMSS).
    pub start_time: String,
    /// Job end time (HHMMSS).
    pub end_time: String,
    /// Tolerance percentage (1-99, default 20).
    pub range_bound: String,
    /// Fee.
    pub fee: String,
}

impl ReqJob {
    /// Fixed frame width in bytes.
    pub const WIDTH: usize = 253;

    /// Encode the request into a complete wire frame.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![b' '; Self::WIDTH];
        self.head.encode_into(&mut buf, Self::WIDTH);
        self.body
            .encode_into(&mut buf[MsgHeader::WIDTH..DataHeader::WIDTH]);
        let b = &mut buf[DataHeader::WIDTH..];
        codec::write_text(b, 0..11, &self.tr_code);
        codec::write_digits(b, 11..21, self.req_id);
        codec::write_text(b, 21..33, &self.issue_code);
        codec::write_char(b, 33, self.ask_bid);
        codec::write_digits(b, 34..44, self.order_qty);
        codec::write_digits(b, 44..55, self.order_price);
        codec::write_char(b, 55, self.order_type);
        codec::write_text(b, 56..68, &self.user_id);
        codec::write_text(b, 68..80, &self.user_ip);
        codec::write_text(b, 80..92, &self.user_mac);
        codec::write_text(b, 92..97, &self.algo_type);
        codec::write_text(b, 97..103, &self.start_time);
        codec::write_text(b, 103..109, &self.end_time);
        codec::write_text(b, 109..113, &self.range_bound);
        codec::write_text(b, 113..117, &self.fee);
        buf
    }

    /// Decode a complete job request frame.
    ///
    /// # Errors
    ///
    /// Fails on a short slice or a non-numeric numeric field.
    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        codec::ensure_len(buf, Self::WIDTH)?;
        let DataHeader { head, body } = DataHeader::decode(buf)?;
        let b = &buf[DataHeader::WIDTH..];
        Ok(Self {
            head,
            body,
            tr_code: codec::read_text(b, 0..11),
            req_id: codec::read_digits(b, 11..21, "REQ_ID")?,
            issue_code: codec::read_text(b, 21..33),
            ask_bid: codec::read_char(b, 33),
            order_qty: codec::read_digits(b, 34..44, "ORDER_QTY")?,
            order_price: codec::read_digits(b, 44..55, "ORDER_PRICE")?,
            order_type: codec::read_char(b, 55),
            user_id: codec::read_text(b, 56..68),
            user_ip: codec::read_text(b, 68..80),
            user_mac: codec::read_text(b, 80..92),
            algo_type: codec::read_text(b, 92..97),
            start_time: codec::read_text(b, 97..103),
            end_time: codec::read_text(b, 103..109),
            range_bound: codec::read_text(b, 109..113),
            fee: codec::read_text(b, 113..117),
        })
    }
}

// =============================================================================
// MAX -> OMS: Job Registration / Cancel Acknowledgement
// =============================================================================

/// Job registration or cancel acknowledgement (service types 12, 14).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckJob {
    /// Message header.
    pub head: MsgHeader,
    /// Body header.
    pub body: BodyHeader,
    /// Job registration id of the OMS.
    pub req_id: u64,
    /// `'Y'` error, `'N'` no error.
    pub error_flag: char,
    /// Error reason.
    pub error_msg: String,
}

impl AckJob {
    /// Fixed frame width in bytes.
    pub const WIDTH: usize = 231;

    /// Encode the acknowledgement into a complete wire frame.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![b' '; Self::WIDTH];
        self.head.encode_into(&mut buf, Self::WIDTH);
        self.body
            .encode_into(&mut buf[MsgHeader::WIDTH..DataHeader::WIDTH]);
        let b = &mut buf[DataHeader::WIDTH..];
        codec::write_digits(b, 0..10, self.req_id);
        codec::write_char(b, 10, self.error_flag);
        codec::write_text(b, 11..91, &self.error_msg);
        buf
    }

    /// Decode a complete job acknowledgement frame.
    ///
    /// # Errors
    ///
    /// Fails on a short slice or a non-numeric REQ_ID.
    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        codec::ensure_len(buf, Self::WIDTH)?;
        let DataHeader { head, body } = DataHeader::decode(buf)?;
        let b = &buf[DataHeader::WIDTH..];
        Ok(Self {
            head,
            body,
            req_id: codec::read_digits(b, 0..10, "REQ_ID")?,
            error_flag: codec::read_char(b, 10),
            error_msg: codec::read_text(b, 11..91),
        })
    }
}

// =============================================================================
// MAX -> OMS: New / Cancel Order Request
// =============================================================================

/// New, cancel, or replace order request (service types 21, 22, 23).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReqOrder {
    /// Message header.
    pub head: MsgHeader,
    /// Body header.
    pub body: BodyHeader,
    /// Transaction code.
    pub tr_code: String,
    /// Job registration id of the OMS (first half of the 20-char order id).
    pub req_id: u64,
    /// Action id of the upstream engine (second half of the order id).
    pub action_id: String,
    /// Original order id, for cancels.
    pub orig_order_id: u64,
    /// Issue code.
    pub issue_code: String,
    /// `'1'` ask, `'2'` bid.
    pub ask_bid: char,
    /// Order quantity.
    pub order_qty: u64,
    /// `'1'` full cancel, `'2'` partial cancel.
    pub partial_flag: char,
    /// Order price.
    pub order_price: u64,
    /// `'1'` market, `'2'` limit.
    pub order_type: char,
    /// User id.
    pub user_id: String,
    /// User IP address.
    pub user_ip: String,
    /// User MAC address.
    pub user_mac: String,
}

impl ReqOrder {
    /// Fixed frame width in bytes.
    pub const WIDTH: usize = 253;

    /// Encode the request into a complete wire frame.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![b' '; Self::WIDTH];
        self.head.encode_into(&mut buf, Self::WIDTH);
        self.body
            .encode_into(&mut buf[MsgHeader::WIDTH..DataHeader::WIDTH]);
        let b = &mut buf[DataHeader::WIDTH..];
        codec::write_text(b, 0..11, &self.tr_code);
        codec::write_digits(b, 11..21, self.req_id);
        codec::write_text(b, 21..31, &self.action_id);
        codec::write_digits(b, 31..41, self.orig_order_id);
        codec::write_text(b, 41..53, &self.issue_code);
        codec::write_char(b, 53, self.ask_bid);
        codec::write_digits(b, 54..64, self.order_qty);
        codec::write_char(b, 64, self.partial_flag);
        codec::write_digits(b, 65..76, self.order_price);
        codec::write_char(b, 76, self.order_type);
        codec::write_text(b, 77..89, &self.user_id);
        codec::write_text(b, 89..101, &self.user_ip);
        codec::write_text(b, 101..113, &self.user_mac);
        buf
    }

    /// Decode a complete order request frame.
    ///
    /// # Errors
    ///
    /// Fails on a short slice or a non-numeric numeric field.
    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        codec::ensure_len(buf, Self::WIDTH)?;
        let DataHeader { head, body } = DataHeader::decode(buf)?;
        let b = &buf[DataHeader::WIDTH..];
        Ok(Self {
            head,
            body,
            tr_code: codec::read_text(b, 0..11),
            req_id: codec::read_digits(b, 11..21, "REQ_ID")?,
            action_id: codec::read_text(b, 21..31),
            orig_order_id: codec::read_digits(b, 31..41, "ORIG_ORDER_ID")?,
            issue_code: codec::read_text(b, 41..53),
            ask_bid: codec::read_char(b, 53),
            order_qty: codec::read_digits(b, 54..64, "ORDER_QTY")?,
            partial_flag: codec::read_char(b, 64),
            order_price: codec::read_digits(b, 65..76, "ORDER_PRICE")?,
            order_type: codec::read_char(b, 76),
            user_id: codec::read_text(b, 77..89),
            user_ip: codec::read_text(b, 89..101),
            user_mac: codec::read_text(b, 101..113),
        })
    }
}

// =============================================================================
// OMS -> MAX: Order Acknowledgement & Execution
// =============================================================================

/// Order acknowledgement or execution report (service types 31, 32, 33, 41).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RespOrder {
    /// Message header (stamped by the session at send time).
    pub head: MsgHeader,
    /// Body header (stamped by the session at send time).
    pub body: BodyHeader,
    /// Transaction code ([`tr::ORDER_NORMAL`], [`tr::ORDER_REJECT`], or
    /// [`tr::ORDER_EXEC`]).
    pub tr_code: String,
    /// Job registration id of the OMS.
    pub req_id: u64,
    /// Action id of the upstream engine.
    pub action_id: String,
    /// Order id of the OMS.
    pub order_id: u64,
    /// Original order id, for cancels.
    pub orig_order_id: u64,
    /// Issue code.
    pub issue_code: String,
    /// `'1'` ask, `'2'` bid.
    pub ask_bid: char,
    /// `'1'` new, `'2'` replace, `'3'` cancel.
    pub plc_type: char,
    /// Order quantity.
    pub order_qty: u64,
    /// Order price.
    pub order_price: u64,
    /// `'1'` market, `'2'` limit.
    pub order_type: char,
    /// Confirmed quantity for cancels.
    pub confirm_qty: u64,
    /// Trading number.
    pub trading_no: u64,
    /// Trading price.
    pub trading_price: u64,
    /// Trading volume.
    pub trading_volume: u64,
    /// Trading time (HHMMSSsss).
    pub trading_time: String,
    /// Error code.
    pub error_code: String,
    /// Error reason, free format.
    pub error_msg: String,
}

impl RespOrder {
    /// Fixed frame width in bytes.
    pub const WIDTH: usize = 358;

    /// Encode the report into a complete wire frame.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![b' '; Self::WIDTH];
        self.head.encode_into(&mut buf, Self::WIDTH);
        self.body
            .encode_into(&mut buf[MsgHeader::WIDTH..DataHeader::WIDTH]);
        let b = &mut buf[DataHeader::WIDTH..];
        codec::write_text(b, 0..11, &self.tr_code);
        codec::write_digits(b, 11..21, self.req_id);
        codec::write_text(b, 21..31, &self.action_id);
        codec::write_digits(b, 31..41, self.order_id);
        codec::write_digits(b, 41..51, self.orig_order_id);
        codec::write_text(b, 51..63, &self.issue_code);
        codec::write_char(b, 63, self.ask_bid);
        codec::write_char(b, 64, self.plc_type);
        codec::write_digits(b, 65..75, self.order_qty);
        codec::write_digits(b, 75..86, self.order_price);
        codec::write_char(b, 86, self.order_type);
        codec::write_digits(b, 87..97, self.confirm_qty);
        codec::write_digits(b, 97..108, self.trading_no);
        codec::write_digits(b, 108..119, self.trading_price);
        codec::write_digits(b, 119..129, self.trading_volume);
        codec::write_text(b, 129..138, &self.trading_time);
        codec::write_text(b, 138..148, &self.error_code);
        codec::write_text(b, 148..228, &self.error_msg);
        buf
    }

    /// Decode a complete order report frame.
    ///
    /// # Errors
    ///
    /// Fails on a short slice or a non-numeric numeric field.
    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        codec::ensure_len(buf, Self::WIDTH)?;
        let DataHeader { head, body } = DataHeader::decode(buf)?;
        let b = &buf[DataHeader::WIDTH..];
        Ok(Self {
            head,
            body,
            tr_code: codec::read_text(b, 0..11),
            req_id: codec::read_digits(b, 11..21, "REQ_ID")?,
            action_id: codec::read_text(b, 21..31),
            order_id: codec::read_digits(b, 31..41, "ORDER_ID")?,
            orig_order_id: codec::read_digits(b, 41..51, "ORIG_ORDER_ID")?,
            issue_code: codec::read_text(b, 51..63),
            ask_bid: codec::read_char(b, 63),
            plc_type: codec::read_char(b, 64),
            order_qty: codec::read_digits(b, 65..75, "ORDER_QTY")?,
            order_price: codec::read_digits(b, 75..86, "ORDER_PRICE")?,
            order_type: codec::read_char(b, 86),
            confirm_qty: codec::read_digits(b, 87..97, "CONFIRM_QTY")?,
            trading_no: codec::read_digits(b, 97..108, "TRADING_NO")?,
            trading_price: codec::read_digits(b, 108..119, "TRADING_PRICE")?,
            trading_volume: codec::read_digits(b, 119..129, "TRADING_VOLUME")?,
            trading_time: codec::read_text(b, 129..138),
            error_code: codec::read_text(b, 138..148),
            error_msg: codec::read_text(b, 148..228),
        })
    }
}

// =============================================================================
// MAX -> OMS: Job Emergency Cancel / Job Done Notification
// =============================================================================

/// Job emergency cancel or job done notification (service types 90, 16).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobNotice {
    /// Message header.
    pub head: MsgHeader,
    /// Body header.
    pub body: BodyHeader,
    /// Transaction code ([`tr::JOB_EMERGENCY`] or [`tr::JOB_DONE`]).
    pub tr_code: String,
    /// Job registration id of the OMS.
    pub req_id: u64,
    /// Issue code.
    pub issue_code: String,
    /// Notify reason.
    pub reason: String,
}

impl JobNotice {
    /// Fixed frame width in bytes.
    pub const WIDTH: usize = 253;

    /// Encode the notification into a complete wire frame.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![b' '; Self::WIDTH];
        self.head.encode_into(&mut buf, Self::WIDTH);
        self.body
            .encode_into(&mut buf[MsgHeader::WIDTH..DataHeader::WIDTH]);
        let b = &mut buf[DataHeader::WIDTH..];
        codec::write_text(b, 0..11, &self.tr_code);
        codec::write_digits(b, 11..21, self.req_id);
        codec::write_text(b, 21..33, &self.issue_code);
        codec::write_text(b, 33..113, &self.reason);
        buf
    }

    /// Decode a complete notification frame.
    ///
    /// # Errors
    ///
    /// Fails on a short slice or a non-numeric REQ_ID.
    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        codec::ensure_len(buf, Self::WIDTH)?;
        let DataHeader { head, body } = DataHeader::decode(buf)?;
        let b = &buf[DataHeader::WIDTH..];
        Ok(Self {
            head,
            body,
            tr_code: codec::read_text(b, 0..11),
            req_id: codec::read_digits(b, 11..21, "REQ_ID")?,
            issue_code: codec::read_text(b, 21..33),
            reason: codec::read_text(b, 33..113),
        })
    }
}
