//! Incremental Intel HEX stream parser.
//!
//! Characters are accumulated into a fixed-capacity line buffer. When a
//! newline arrives the buffered line is decoded, data records are
//! programmed through a [`HexTarget`] (each byte written and read back),
//! and the buffer is cleared for the next line.

use core::fmt;

use heapless::Vec;

use crate::record::{Record, RecordError, RecordKind};

/// Maximum number of characters buffered per line
///
/// Enough for a record carrying 16 data bytes plus slack.
pub const MAX_LINE_LENGTH: usize = 45;

/// Checksum handling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChecksumMode {
    /// Accept records without looking at the checksum field
    #[default]
    Ignore,
    /// Require complete, well-formed records with a valid checksum
    Verify,
}

/// Device side of the parser: where decoded data bytes go
pub trait HexTarget {
    /// Error raised by the underlying device
    type Error;

    /// Program one byte
    fn write_byte(&mut self, address: u16, data: u8) -> Result<(), Self::Error>;

    /// Read one byte back for verification
    fn read_byte(&mut self, address: u16) -> Result<u8, Self::Error>;
}

impl<T: HexTarget + ?Sized> HexTarget for &mut T {
    type Error = T::Error;

    fn write_byte(&mut self, address: u16, data: u8) -> Result<(), Self::Error> {
        (**self).write_byte(address, data)
    }

    fn read_byte(&mut self, address: u16) -> Result<u8, Self::Error> {
        (**self).read_byte(address)
    }
}

/// Why a line was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError<E> {
    /// The record itself could not be decoded
    Record(RecordError),
    /// Line exceeded the buffer capacity (strict mode)
    Overflow,
    /// A programmed byte did not read back correctly
    VerifyMismatch {
        /// Address of the failing byte
        address: u16,
        /// Byte that was written
        expected: u8,
        /// Byte that was read back
        actual: u8,
    },
    /// The target device failed
    Target(E),
}

impl<E> From<RecordError> for LineError<E> {
    fn from(e: RecordError) -> Self {
        LineError::Record(e)
    }
}

impl<E: fmt::Debug> fmt::Display for LineError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineError::Record(e) => e.fmt(f),
            LineError::Overflow => f.write_str("Line too long"),
            LineError::VerifyMismatch {
                address,
                expected,
                actual,
            } => write!(
                f,
                "Verification failed at 0x{:X}: wrote 0x{:X}, read 0x{:X}",
                address, expected, actual
            ),
            LineError::Target(e) => write!(f, "Device error: {:?}", e),
        }
    }
}

/// Summary of a successfully programmed data line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineSummary {
    /// Load address of the record
    pub address: u16,
    /// Number of bytes programmed
    pub byte_count: u8,
}

/// How the stream ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamEnd {
    /// An empty line was submitted (manual abort)
    EmptyLine,
    /// An end-of-file record was decoded
    EndOfFile,
}

/// Result of feeding one character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Feed<E> {
    /// Character buffered, line not complete yet
    Continue,
    /// Data line decoded and programmed
    LineOk(LineSummary),
    /// Line rejected; the stream may continue
    LineError(LineError<E>),
    /// No more input expected
    StreamEnd(StreamEnd),
}

/// Line-buffering Intel HEX parser
///
/// `N` is the line capacity; characters beyond it are dropped.
#[derive(Debug, Clone)]
pub struct HexParser<const N: usize = MAX_LINE_LENGTH> {
    line: Vec<u8, N>,
    overflowed: bool,
    checksum: ChecksumMode,
}

impl<const N: usize> Default for HexParser<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> HexParser<N> {
    /// Create a parser that ignores record checksums
    pub fn new() -> Self {
        Self::with_checksum_mode(ChecksumMode::Ignore)
    }

    /// Create a parser with an explicit checksum policy
    pub fn with_checksum_mode(checksum: ChecksumMode) -> Self {
        Self {
            line: Vec::new(),
            overflowed: false,
            checksum,
        }
    }

    /// Clear the line buffer
    pub fn reset(&mut self) {
        self.line.clear();
        self.overflowed = false;
    }

    /// Characters currently buffered
    pub fn buffered(&self) -> &[u8] {
        &self.line
    }

    /// Feed a single character
    ///
    /// Carriage returns are ignored. A newline completes the line: an
    /// empty line ends the stream, anything else is decoded and the
    /// buffer is cleared whatever the outcome.
    pub fn feed_char<T: HexTarget>(&mut self, c: u8, target: &mut T) -> Feed<T::Error> {
        match c {
            b'\r' => Feed::Continue,
            b'\n' => {
                if self.line.is_empty() {
                    return Feed::StreamEnd(StreamEnd::EmptyLine);
                }

                let result = self.process_line(target);
                self.reset();
                result
            }
            _ => {
                if self.line.push(c).is_err() {
                    self.overflowed = true;
                }
                Feed::Continue
            }
        }
    }

    /// Decode the buffered line and program data records
    fn process_line<T: HexTarget>(&self, target: &mut T) -> Feed<T::Error> {
        if self.overflowed && self.checksum == ChecksumMode::Verify {
            return Feed::LineError(LineError::Overflow);
        }

        let record = match Record::parse(&self.line, self.checksum) {
            Ok(record) => record,
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("HEX line rejected: {}", e);
                return Feed::LineError(e.into());
            }
        };

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "HEX line: type={} address={=u16:#x} count={}",
            record.kind(),
            record.address(),
            record.byte_count()
        );

        match record.kind() {
            RecordKind::Data => match Self::program(&record, target) {
                Ok(()) => Feed::LineOk(LineSummary {
                    address: record.address(),
                    byte_count: record.byte_count(),
                }),
                Err(e) => Feed::LineError(e),
            },
            RecordKind::EndOfFile => Feed::StreamEnd(StreamEnd::EndOfFile),
        }
    }

    /// Write every data byte and verify it; the first mismatch aborts the line
    fn program<T: HexTarget>(record: &Record<'_>, target: &mut T) -> Result<(), LineError<T::Error>> {
        for (offset, data) in record.data().enumerate() {
            let address = record.address().wrapping_add(offset as u16);
            target.write_byte(address, data).map_err(LineError::Target)?;

            let actual = target.read_byte(address).map_err(LineError::Target)?;
            if actual != data {
                return Err(LineError::VerifyMismatch {
                    address,
                    expected: data,
                    actual,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Op {
        Write(u16, u8),
        Read(u16),
    }

    /// Target backed by a small memory that records every call
    struct MockTarget {
        memory: [u8; 0x100],
        ops: std::vec::Vec<Op>,
        /// Address whose read-back is corrupted
        stuck: Option<u16>,
    }

    impl MockTarget {
        fn new() -> Self {
            Self {
                memory: [0xFF; 0x100],
                ops: std::vec::Vec::new(),
                stuck: None,
            }
        }
    }

    impl HexTarget for MockTarget {
        type Error = ();

        fn write_byte(&mut self, address: u16, data: u8) -> Result<(), ()> {
            self.ops.push(Op::Write(address, data));
            self.memory[address as usize & 0xFF] = data;
            Ok(())
        }

        fn read_byte(&mut self, address: u16) -> Result<u8, ()> {
            self.ops.push(Op::Read(address));
            let value = self.memory[address as usize & 0xFF];
            if self.stuck == Some(address) {
                Ok(!value)
            } else {
                Ok(value)
            }
        }
    }

    fn feed_line<const N: usize>(
        parser: &mut HexParser<N>,
        target: &mut MockTarget,
        line: &[u8],
    ) -> Feed<()> {
        let mut last = Feed::Continue;
        for &c in line {
            last = parser.feed_char(c, target);
        }
        last
    }

    #[test]
    fn test_data_record_writes_and_verifies() {
        let mut parser = HexParser::<MAX_LINE_LENGTH>::new();
        let mut target = MockTarget::new();

        let result = feed_line(&mut parser, &mut target, b":0300300002337A1E\n");

        assert_eq!(
            result,
            Feed::LineOk(LineSummary {
                address: 0x0030,
                byte_count: 3
            })
        );
        assert_eq!(
            target.ops,
            [
                Op::Write(0x30, 0x02),
                Op::Read(0x30),
                Op::Write(0x31, 0x33),
                Op::Read(0x31),
                Op::Write(0x32, 0x7A),
                Op::Read(0x32),
            ]
        );
        assert!(parser.buffered().is_empty());
    }

    #[test]
    fn test_end_of_file_record_ends_stream() {
        let mut parser = HexParser::<MAX_LINE_LENGTH>::new();
        let mut target = MockTarget::new();

        let result = feed_line(&mut parser, &mut target, b":00000001FF\n");

        assert_eq!(result, Feed::StreamEnd(StreamEnd::EndOfFile));
        assert!(target.ops.is_empty());
    }

    #[test]
    fn test_empty_line_ends_stream_without_decoding() {
        let mut parser = HexParser::<MAX_LINE_LENGTH>::new();
        let mut target = MockTarget::new();

        assert_eq!(
            parser.feed_char(b'\n', &mut target),
            Feed::StreamEnd(StreamEnd::EmptyLine)
        );
        // A lone carriage return leaves the line empty as well
        assert_eq!(
            feed_line(&mut parser, &mut target, b"\r\n"),
            Feed::StreamEnd(StreamEnd::EmptyLine)
        );
        assert!(target.ops.is_empty());
    }

    #[test]
    fn test_crlf_line_endings_are_accepted() {
        let mut parser = HexParser::<MAX_LINE_LENGTH>::new();
        let mut target = MockTarget::new();

        let result = feed_line(&mut parser, &mut target, b":0100000055AA\r\n");
        assert!(matches!(result, Feed::LineOk(_)));
        assert_eq!(target.memory[0], 0x55);
    }

    #[test]
    fn test_malformed_lines_report_error_and_reset() {
        let mut parser = HexParser::<MAX_LINE_LENGTH>::new();
        let mut target = MockTarget::new();

        assert_eq!(
            feed_line(&mut parser, &mut target, b":0000\n"),
            Feed::LineError(LineError::Record(RecordError::TooShort))
        );
        assert!(parser.buffered().is_empty());

        assert_eq!(
            feed_line(&mut parser, &mut target, b"X0300300002337A1E\n"),
            Feed::LineError(LineError::Record(RecordError::MissingStartCode))
        );
        assert!(parser.buffered().is_empty());

        // The parser keeps working after errors
        let result = feed_line(&mut parser, &mut target, b":0300300002337A1E\n");
        assert!(matches!(result, Feed::LineOk(_)));
    }

    #[test]
    fn test_unsupported_record_type() {
        let mut parser = HexParser::<MAX_LINE_LENGTH>::new();
        let mut target = MockTarget::new();

        assert_eq!(
            feed_line(&mut parser, &mut target, b":02000002100000EC\n"),
            Feed::LineError(LineError::Record(RecordError::UnsupportedType(0x02)))
        );
        assert!(target.ops.is_empty());
    }

    #[test]
    fn test_verify_mismatch_aborts_rest_of_line() {
        let mut parser = HexParser::<MAX_LINE_LENGTH>::new();
        let mut target = MockTarget::new();
        target.stuck = Some(0x31);

        let result = feed_line(&mut parser, &mut target, b":0300300002337A1E\n");

        assert_eq!(
            result,
            Feed::LineError(LineError::VerifyMismatch {
                address: 0x31,
                expected: 0x33,
                actual: 0xCC,
            })
        );
        // Third byte never attempted
        assert!(!target.ops.contains(&Op::Write(0x32, 0x7A)));
    }

    #[test]
    fn test_overlong_line_is_truncated() {
        let mut parser = HexParser::<16>::new();
        let mut target = MockTarget::new();

        for &c in b":0400000011223344AA" {
            parser.feed_char(c, &mut target);
        }
        assert_eq!(parser.buffered(), b":040000001122334");

        // Default mode decodes what is left; the missing digit reads as 0
        let result = parser.feed_char(b'\n', &mut target);
        assert_eq!(
            result,
            Feed::LineOk(LineSummary {
                address: 0,
                byte_count: 4
            })
        );
        assert_eq!(&target.memory[..4], &[0x11, 0x22, 0x33, 0x40]);
    }

    #[test]
    fn test_overlong_line_rejected_in_strict_mode() {
        let mut parser = HexParser::<16>::with_checksum_mode(ChecksumMode::Verify);
        let mut target = MockTarget::new();

        let result = feed_line(&mut parser, &mut target, b":0400000011223344AA\n");
        assert_eq!(result, Feed::LineError(LineError::Overflow));
        assert!(target.ops.is_empty());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut parser = HexParser::<MAX_LINE_LENGTH>::new();
        let mut target = MockTarget::new();

        parser.reset();
        parser.reset();
        assert!(parser.buffered().is_empty());

        feed_line(&mut parser, &mut target, b":03003000");
        parser.reset();
        assert!(parser.buffered().is_empty());
        parser.reset();
        assert!(parser.buffered().is_empty());
    }

    #[test]
    fn test_target_error_is_reported() {
        struct Broken;

        impl HexTarget for Broken {
            type Error = &'static str;

            fn write_byte(&mut self, _: u16, _: u8) -> Result<(), Self::Error> {
                Err("nack")
            }

            fn read_byte(&mut self, _: u16) -> Result<u8, Self::Error> {
                Err("nack")
            }
        }

        let mut parser = HexParser::<MAX_LINE_LENGTH>::new();
        let mut result = Feed::Continue;
        for &c in b":0100000055AA\n" {
            result = parser.feed_char(c, &mut Broken);
        }
        assert_eq!(result, Feed::LineError(LineError::Target("nack")));
    }

    proptest! {
        #[test]
        fn test_arbitrary_input_never_overflows(input in proptest::collection::vec(any::<u8>(), 0..200)) {
            let mut parser = HexParser::<MAX_LINE_LENGTH>::new();
            let mut target = MockTarget::new();
            for c in input {
                parser.feed_char(c, &mut target);
                prop_assert!(parser.buffered().len() <= MAX_LINE_LENGTH);
                if c == b'\n' {
                    prop_assert!(parser.buffered().is_empty());
                }
            }
        }
    }
}
