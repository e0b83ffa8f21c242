//! Programming errors

use core::fmt;

/// Errors raised by the byte programming engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProgramError<E> {
    /// The bus (expander or pins) failed
    Bus(E),
    /// Data polling did not finish within the configured limit
    PollTimeout {
        /// Address being written
        address: u16,
        /// Byte being written
        data: u8,
    },
}

impl<E> From<E> for ProgramError<E> {
    fn from(e: E) -> Self {
        ProgramError::Bus(e)
    }
}

impl<E: fmt::Debug> fmt::Display for ProgramError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramError::Bus(e) => write!(f, "Bus error: {:?}", e),
            ProgramError::PollTimeout { address, data } => write!(
                f,
                "Write of 0x{:X} to 0x{:X} did not complete",
                data, address
            ),
        }
    }
}
