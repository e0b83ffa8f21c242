//! Intel HEX record decoding.
//!
//! Record layout (ASCII, one record per line):
//! - START (1 char): `:`
//! - BYTE COUNT (2 digits): number of data bytes
//! - ADDRESS (4 digits): big-endian 16-bit load address
//! - TYPE (2 digits): `00` data, `01` end of file
//! - DATA (2 × BYTE COUNT digits)
//! - CHECKSUM (2 digits): two's complement of the byte sum of every
//!   preceding field

use core::fmt;

use crate::parser::ChecksumMode;

/// Record start code
pub const START_CODE: u8 = b':';

/// Shortest possible record (`:` + count + address + type + checksum)
pub const MIN_RECORD_LEN: usize = 11;

/// Offset of the first data digit
const DATA_OFFSET: usize = 9;

/// Data record type
pub const TYPE_DATA: u8 = 0x00;

/// End-of-file record type
pub const TYPE_END_OF_FILE: u8 = 0x01;

/// Errors that can occur while decoding a single record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError {
    /// Line is shorter than the smallest valid record
    TooShort,
    /// Line does not begin with `:`
    MissingStartCode,
    /// Record type other than data or end-of-file
    UnsupportedType(u8),
    /// Line ends before the declared data and checksum (strict mode)
    Truncated,
    /// Non-hex character inside the record (strict mode)
    InvalidDigit {
        /// Character position within the line
        position: usize,
    },
    /// Checksum field does not match the record contents (strict mode)
    Checksum {
        /// Checksum computed from the record fields
        expected: u8,
        /// Checksum found on the line
        actual: u8,
    },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::TooShort => f.write_str("Line too short"),
            RecordError::MissingStartCode => f.write_str("Missing start character (:)"),
            RecordError::UnsupportedType(t) => write!(f, "Unsupported record type: {:X}", t),
            RecordError::Truncated => f.write_str("Line truncated"),
            RecordError::InvalidDigit { position } => {
                write!(f, "Invalid hex digit at column {}", position)
            }
            RecordError::Checksum { expected, actual } => write!(
                f,
                "Checksum mismatch: expected 0x{:02X}, found 0x{:02X}",
                expected, actual
            ),
        }
    }
}

/// Record types understood by the programmer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordKind {
    /// Bytes to program starting at the record address
    Data,
    /// End of the HEX stream
    EndOfFile,
}

impl RecordKind {
    /// Map a raw record type to a supported kind
    pub fn from_u8(record_type: u8) -> Option<Self> {
        match record_type {
            TYPE_DATA => Some(RecordKind::Data),
            TYPE_END_OF_FILE => Some(RecordKind::EndOfFile),
            _ => None,
        }
    }
}

/// Convert an ASCII hex digit to its value
///
/// Any character outside `0-9`, `A-F` and `a-f` maps to 0.
pub fn hex_char_to_int(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'A'..=b'F' => c - b'A' + 10,
        b'a'..=b'f' => c - b'a' + 10,
        _ => 0,
    }
}

/// Decode the two digits at `pos`, treating missing characters as `0`
fn hex_byte(line: &[u8], pos: usize) -> u8 {
    let digit = |i: usize| line.get(i).copied().map_or(0, hex_char_to_int);
    (digit(pos) << 4) | digit(pos + 1)
}

/// A decoded record borrowing its source line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    line: &'a [u8],
    byte_count: u8,
    address: u16,
    kind: RecordKind,
}

impl<'a> Record<'a> {
    /// Decode one line (without line terminator)
    ///
    /// With [`ChecksumMode::Ignore`] the line only needs a start code and
    /// the minimum length; missing or malformed digits decode as 0. With
    /// [`ChecksumMode::Verify`] every digit must be present and valid and
    /// the checksum must match.
    pub fn parse(line: &'a [u8], mode: ChecksumMode) -> Result<Self, RecordError> {
        if line.len() < MIN_RECORD_LEN {
            return Err(RecordError::TooShort);
        }

        if line[0] != START_CODE {
            return Err(RecordError::MissingStartCode);
        }

        let byte_count = hex_byte(line, 1);
        let address = ((hex_byte(line, 3) as u16) << 8) | hex_byte(line, 5) as u16;
        let record_type = hex_byte(line, 7);

        if mode == ChecksumMode::Verify {
            let checksum_pos = DATA_OFFSET + 2 * byte_count as usize;
            if line.len() < checksum_pos + 2 {
                return Err(RecordError::Truncated);
            }
            if let Some(position) = line[1..checksum_pos + 2]
                .iter()
                .position(|c| !c.is_ascii_hexdigit())
            {
                return Err(RecordError::InvalidDigit {
                    position: position + 1,
                });
            }
        }

        let kind =
            RecordKind::from_u8(record_type).ok_or(RecordError::UnsupportedType(record_type))?;

        let record = Self {
            line,
            byte_count,
            address,
            kind,
        };

        if mode == ChecksumMode::Verify {
            let expected = record.computed_checksum();
            let actual = record.checksum_field();
            if expected != actual {
                return Err(RecordError::Checksum { expected, actual });
            }
        }

        Ok(record)
    }

    /// Declared number of data bytes
    pub fn byte_count(&self) -> u8 {
        self.byte_count
    }

    /// Load address of the first data byte
    pub fn address(&self) -> u16 {
        self.address
    }

    /// Record kind
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Iterate over the decoded data bytes
    pub fn data(&self) -> impl Iterator<Item = u8> + 'a {
        let line = self.line;
        (0..self.byte_count as usize).map(move |i| hex_byte(line, DATA_OFFSET + 2 * i))
    }

    /// Checksum digits as found on the line
    pub fn checksum_field(&self) -> u8 {
        hex_byte(self.line, DATA_OFFSET + 2 * self.byte_count as usize)
    }

    /// Checksum computed over count, address, type and data
    pub fn computed_checksum(&self) -> u8 {
        let header = self
            .byte_count
            .wrapping_add((self.address >> 8) as u8)
            .wrapping_add(self.address as u8)
            .wrapping_add(hex_byte(self.line, 7));
        let sum = self.data().fold(header, |acc, b| acc.wrapping_add(b));
        (!sum).wrapping_add(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hex_char_to_int_digits() {
        assert_eq!(hex_char_to_int(b'0'), 0);
        assert_eq!(hex_char_to_int(b'9'), 9);
        assert_eq!(hex_char_to_int(b'A'), 10);
        assert_eq!(hex_char_to_int(b'f'), 15);
        assert_eq!(hex_char_to_int(b'G'), 0);
        assert_eq!(hex_char_to_int(b':'), 0);
    }

    #[test]
    fn test_parse_data_record() {
        let record = Record::parse(b":0300300002337A1E", ChecksumMode::Ignore).unwrap();

        assert_eq!(record.kind(), RecordKind::Data);
        assert_eq!(record.byte_count(), 3);
        assert_eq!(record.address(), 0x0030);

        let mut data = [0u8; 3];
        for (slot, byte) in data.iter_mut().zip(record.data()) {
            *slot = byte;
        }
        assert_eq!(data, [0x02, 0x33, 0x7A]);
        assert_eq!(record.computed_checksum(), 0x1E);
    }

    #[test]
    fn test_parse_end_of_file() {
        let record = Record::parse(b":00000001FF", ChecksumMode::Verify).unwrap();
        assert_eq!(record.kind(), RecordKind::EndOfFile);
        assert_eq!(record.data().count(), 0);
    }

    #[test]
    fn test_parse_rejects_short_and_unanchored_lines() {
        assert_eq!(
            Record::parse(b":000000", ChecksumMode::Ignore),
            Err(RecordError::TooShort)
        );
        assert_eq!(
            Record::parse(b"00000001FFAA", ChecksumMode::Ignore),
            Err(RecordError::MissingStartCode)
        );
    }

    #[test]
    fn test_parse_rejects_extended_address_record() {
        assert_eq!(
            Record::parse(b":020000040800F2", ChecksumMode::Ignore),
            Err(RecordError::UnsupportedType(0x04))
        );
    }

    #[test]
    fn test_checksum_ignored_by_default() {
        // Last byte should be 0x1E
        let record = Record::parse(b":0300300002337A00", ChecksumMode::Ignore);
        assert!(record.is_ok());
    }

    #[test]
    fn test_checksum_verified_in_strict_mode() {
        assert_eq!(
            Record::parse(b":0300300002337A00", ChecksumMode::Verify),
            Err(RecordError::Checksum {
                expected: 0x1E,
                actual: 0x00
            })
        );
        assert_eq!(
            Record::parse(b":0300300002331E", ChecksumMode::Verify),
            Err(RecordError::Truncated)
        );
        assert_eq!(
            Record::parse(b":0300300002337Z1E", ChecksumMode::Verify),
            Err(RecordError::InvalidDigit { position: 14 })
        );
    }

    #[test]
    fn test_short_data_line_decodes_missing_digits_as_zero() {
        // Declares 4 bytes but only carries one
        let record = Record::parse(b":04001000AB", ChecksumMode::Ignore).unwrap();
        let mut data = [0xFFu8; 4];
        for (slot, byte) in data.iter_mut().zip(record.data()) {
            *slot = byte;
        }
        assert_eq!(data, [0xAB, 0x00, 0x00, 0x00]);
    }

    proptest! {
        #[test]
        fn test_hex_char_to_int_is_total(c in any::<u8>()) {
            let value = hex_char_to_int(c);
            prop_assert!(value < 16);
            if !c.is_ascii_hexdigit() {
                prop_assert_eq!(value, 0);
            }
        }
    }
}
