//! Write-only status sink
//!
//! Long-running operations describe what they are doing through
//! [`Report`] values. Nothing in the core depends on whether anyone is
//! listening; every outcome is also part of the return value.

use core::fmt;

use crate::diagnostics::{ImageStep, ProgressTick, TestPattern};

/// A status event for the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Report {
    /// A byte did not read back as expected
    VerifyFailed {
        /// Address of the byte
        address: u16,
        /// Expected contents
        expected: u8,
        /// Contents read from the chip
        actual: u8,
    },
    /// Progress indicator for ranged operations
    Progress(ProgressTick),
    /// Erase of `[start, end)` is starting
    EraseStarted {
        /// First address
        start: u16,
        /// One past the last address
        end: u16,
        /// Fill byte
        pattern: u8,
    },
    /// Erase finished
    EraseComplete,
    /// Full chip test is starting
    TestStarted {
        /// Number of bytes under test
        size: u32,
    },
    /// One test segment is starting
    SegmentStarted {
        /// Pattern written to the segment
        pattern: TestPattern,
        /// First address
        start: u16,
        /// One past the last address
        end: u16,
    },
    /// One test segment finished
    SegmentComplete {
        /// Pattern written to the segment
        pattern: TestPattern,
        /// Errors counted so far, across all segments
        errors: u32,
    },
    /// Full chip test finished
    TestComplete {
        /// Number of bytes tested
        size: u32,
        /// Total number of mismatches
        errors: u32,
    },
    /// ROM image write moved to a new step
    Image(ImageStep),
    /// ROM image write finished
    ImageComplete {
        /// Number of bytes that failed verification
        errors: u32,
    },
    /// ROM image comparison is starting
    CheckStarted,
    /// ROM image comparison finished
    CheckComplete {
        /// Number of differing bytes
        errors: u32,
    },
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Report::VerifyFailed {
                address,
                expected,
                actual,
            } => writeln!(
                f,
                "\nVerification failed at 0x{:X}: Expected 0x{:X}, Read 0x{:X}",
                address, expected, actual
            ),
            Report::Progress(tick) => tick.fmt(f),
            Report::EraseStarted {
                start,
                end,
                pattern,
            } => writeln!(
                f,
                "Erasing EEPROM from 0x{:X} to 0x{:X} with pattern 0x{:X}",
                start,
                end.wrapping_sub(1),
                pattern
            ),
            Report::EraseComplete => f.write_str("\nErase Done!\n"),
            Report::TestStarted { size } => {
                write!(f, "\nStarting Full EEPROM Test\nTesting {} bytes\n", size)
            }
            Report::SegmentStarted {
                pattern,
                start,
                end,
            } => writeln!(
                f,
                "Testing {} (0x{:X} - 0x{:X})",
                pattern.name(),
                start,
                end
            ),
            Report::SegmentComplete { pattern, errors } => {
                if errors != 0 {
                    write!(f, "\nTest failed with {} errors.\n\n", errors)
                } else {
                    write!(f, "\nTesting {} - Done.\n\n", pattern.name())
                }
            }
            Report::TestComplete { size, errors } => {
                write!(f, "EEPROM Test Complete\nTested {} bytes\n\n", size)?;
                if errors == 0 {
                    f.write_str("EEPROM test passed successfully!\n")
                } else {
                    writeln!(f, "Test failed with {} errors.", errors)
                }
            }
            Report::Image(step) => step.fmt(f),
            Report::ImageComplete { errors } => {
                if errors == 0 {
                    f.write_str("\nVerification successful - ROM written correctly!\n")?;
                } else {
                    write!(f, "\nVerification failed with {} errors.\n", errors)?;
                }
                f.write_str("\nROM Writing Complete!\n")
            }
            Report::CheckStarted => f.write_str("\nChecking EEPROM contents...\n"),
            Report::CheckComplete { errors } => {
                if errors != 0 {
                    writeln!(f, "{} bytes differ.", errors)?;
                }
                f.write_str("Check complete!\n")
            }
        }
    }
}

/// Consumer of status reports
pub trait Reporter {
    /// Deliver one report
    fn report(&mut self, report: Report);
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, report: Report) {
        (**self).report(report)
    }
}

/// Reporter that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&mut self, _report: Report) {}
}
