//! Intel HEX Stream Decoding
//!
//! This crate decodes the Intel HEX text that the host streams over the
//! serial console and turns data records into byte programming calls.
//! The decoder is incremental: characters are fed one at a time and only
//! a single line is ever buffered.
//!
//! # Record Overview
//!
//! Every record is one text line:
//! ```text
//! ┌───────┬────────────┬─────────┬──────┬──────────────┬──────────┐
//! │ START │ BYTE COUNT │ ADDRESS │ TYPE │ DATA         │ CHECKSUM │
//! │ ':'   │ 2 digits   │ 4 dig.  │ 2 d. │ 2×count dig. │ 2 digits │
//! └───────┴────────────┴─────────┴──────┴──────────────┴──────────┘
//! ```
//!
//! Only data (`00`) and end-of-file (`01`) records are accepted; the
//! programmer addresses at most 32 KiB so extended address records never
//! apply.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod parser;
pub mod record;

pub use parser::{
    ChecksumMode, Feed, HexParser, HexTarget, LineError, LineSummary, StreamEnd, MAX_LINE_LENGTH,
};
pub use record::{hex_char_to_int, Record, RecordError, RecordKind, START_CODE};
