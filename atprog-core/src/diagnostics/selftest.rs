//! Full chip test
//!
//! The chip is split into six equal segments, each written and verified
//! with a different pattern. Mismatches are counted and never abort the
//! test.

use embedded_hal::delay::DelayNs;

use super::pattern::TestPattern;
use super::progress::progress_tick;
use crate::programmer::{At28c, ProgramError};
use crate::traits::{EepromBus, Report, Reporter};

/// Outcome of a full chip test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TestSummary {
    /// Bytes tested
    pub size: u32,
    /// Bytes that did not read back correctly
    pub errors: u32,
}

impl TestSummary {
    /// Check if every byte verified
    pub fn passed(&self) -> bool {
        self.errors == 0
    }
}

/// Segment bounds `(pattern, start, end)` for a chip of `size` bytes
///
/// The last segment absorbs the remainder of the division.
pub fn test_segments(size: u32) -> [(TestPattern, u32, u32); 6] {
    let segment = size / 6;
    let mut segments = [(TestPattern::WalkingOnes, 0, 0); 6];

    for (i, pattern) in TestPattern::ALL.into_iter().enumerate() {
        let start = segment * i as u32;
        let end = if i == 5 { size } else { start + segment };
        segments[i] = (pattern, start, end);
    }

    segments
}

/// Write and verify every byte of the chip
pub fn run_full_test<B, D, R>(
    programmer: &mut At28c<B, D>,
    reporter: &mut R,
) -> Result<TestSummary, ProgramError<B::Error>>
where
    B: EepromBus,
    D: DelayNs,
    R: Reporter,
{
    let size = programmer.chip().size;
    let mut errors: u32 = 0;

    #[cfg(feature = "defmt")]
    defmt::info!("full test of {} bytes", size);

    reporter.report(Report::TestStarted { size });

    for (pattern, start, end) in test_segments(size) {
        let (start, end) = (start as u16, end as u16);
        reporter.report(Report::SegmentStarted {
            pattern,
            start,
            end,
        });

        for address in start..end {
            let value = pattern.value(address);
            programmer.write_byte(address, value)?;

            if !programmer.verify_byte(address, value, reporter)? {
                errors += 1;
            }

            if let Some(tick) = progress_tick(address - start) {
                reporter.report(Report::Progress(tick));
            }
        }

        reporter.report(Report::SegmentComplete { pattern, errors });
    }

    reporter.report(Report::TestComplete { size, errors });

    #[cfg(feature = "defmt")]
    defmt::info!("full test done, {} errors", errors);

    Ok(TestSummary { size, errors })
}
