//! ROM image write and check

use core::fmt;

use embedded_hal::delay::DelayNs;

use super::progress::progress_tick;
use crate::programmer::{At28c, ProgramError};
use crate::traits::{EepromBus, Report, Reporter};

/// Steps of a ROM image write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ImageStep {
    /// Blanking the target range
    Erasing,
    /// Programming the image bytes
    Writing,
    /// All bytes programmed
    WriteComplete,
    /// Reading the image back
    Verifying,
}

impl fmt::Display for ImageStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageStep::Erasing => f.write_str("\nStep 1: Erasing EEPROM section\n"),
            ImageStep::Writing => f.write_str("\nStep 2: Writing ROM data\n"),
            ImageStep::WriteComplete => f.write_str("\nWrite complete!\n"),
            ImageStep::Verifying => f.write_str("\nStep 3: Verifying ROM data\n"),
        }
    }
}

/// Part of `image` that fits the chip
fn clip<'a, B: EepromBus, D: DelayNs>(programmer: &At28c<B, D>, image: &'a [u8]) -> &'a [u8] {
    let size = programmer.chip().size as usize;
    &image[..image.len().min(size)]
}

/// Erase, program and verify an image starting at address 0
///
/// Returns the number of bytes that failed verification.
pub fn write_image<B, D, R>(
    programmer: &mut At28c<B, D>,
    image: &[u8],
    reporter: &mut R,
) -> Result<u32, ProgramError<B::Error>>
where
    B: EepromBus,
    D: DelayNs,
    R: Reporter,
{
    let image = clip(programmer, image);
    let len = image.len() as u16;

    #[cfg(feature = "defmt")]
    defmt::info!("writing {} byte image", len);

    reporter.report(Report::Image(ImageStep::Erasing));
    programmer.erase_section(0, len, 0xFF, reporter)?;

    reporter.report(Report::Image(ImageStep::Writing));
    for (address, &byte) in (0u16..).zip(image) {
        programmer.write_byte(address, byte)?;

        if let Some(tick) = progress_tick(address) {
            reporter.report(Report::Progress(tick));
        }
    }
    reporter.report(Report::Image(ImageStep::WriteComplete));

    reporter.report(Report::Image(ImageStep::Verifying));
    let mut errors = 0;
    for (address, &byte) in (0u16..).zip(image) {
        if !programmer.verify_byte(address, byte, reporter)? {
            errors += 1;
        }

        if let Some(tick) = progress_tick(address) {
            reporter.report(Report::Progress(tick));
        }
    }

    reporter.report(Report::ImageComplete { errors });
    Ok(errors)
}

/// Compare the chip against an image without writing
///
/// Returns the number of differing bytes.
pub fn check_image<B, D, R>(
    programmer: &mut At28c<B, D>,
    image: &[u8],
    reporter: &mut R,
) -> Result<u32, ProgramError<B::Error>>
where
    B: EepromBus,
    D: DelayNs,
    R: Reporter,
{
    let image = clip(programmer, image);
    reporter.report(Report::CheckStarted);

    let mut errors = 0;
    for (address, &byte) in (0u16..).zip(image) {
        if !programmer.verify_byte(address, byte, reporter)? {
            errors += 1;
        }
    }

    #[cfg(feature = "defmt")]
    defmt::info!("image check: {} differences", errors);

    reporter.report(Report::CheckComplete { errors });
    Ok(errors)
}
