//! Console output formatting

use core::fmt;

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::programmer::{At28c, ProgramError};
use crate::traits::EepromBus;

/// Bytes per dump row
pub const DUMP_ROW_LEN: usize = 16;

/// Rows printed before the dump waits for a key
pub const DUMP_PAGE_ROWS: u8 = 10;

/// Prompt shown when a dump page is full
pub const DUMP_PAGE_PROMPT: &str = "Press SPACE to continue, Q to quit...";

/// Elapsed time in whole minutes and seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionTime {
    /// Elapsed milliseconds
    pub millis: u64,
}

impl ExecutionTime {
    /// Wrap a duration in milliseconds
    pub fn from_millis(millis: u64) -> Self {
        Self { millis }
    }
}

impl fmt::Display for ExecutionTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seconds = self.millis / 1000;
        writeln!(
            f,
            "Execution time: {} minutes, {} seconds",
            seconds / 60,
            seconds % 60
        )
    }
}

/// One dump row: address and up to 16 bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpRow {
    /// Address of the first byte
    pub address: u16,
    /// Bytes read
    pub bytes: Vec<u8, DUMP_ROW_LEN>,
}

impl DumpRow {
    /// Read the row starting at `address`
    ///
    /// The row ends at the next 16-byte boundary or the end of the chip,
    /// whichever comes first.
    pub fn read<B: EepromBus, D: DelayNs>(
        programmer: &mut At28c<B, D>,
        address: u16,
    ) -> Result<Self, ProgramError<B::Error>> {
        let size = programmer.chip().size;
        let boundary = (address as u32 | (DUMP_ROW_LEN as u32 - 1)) + 1;
        let end = boundary.min(size);

        let mut bytes = Vec::new();
        for a in address as u32..end {
            let byte = programmer.read_byte(a as u16)?;
            // At most 16 iterations
            let _ = bytes.push(byte);
        }

        Ok(Self { address, bytes })
    }

    /// Address following this row
    pub fn next_address(&self) -> u32 {
        self.address as u32 + self.bytes.len() as u32
    }
}

impl fmt::Display for DumpRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}: ", self.address)?;
        for byte in &self.bytes {
            write!(f, "{:02X} ", byte)?;
        }
        Ok(())
    }
}

/// Keys accepted at the dump page prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKey {
    /// SPACE
    Continue,
    /// Q
    Quit,
    /// Anything else
    Other,
}

impl PageKey {
    /// Classify a received byte (case-insensitive)
    pub fn classify(c: u8) -> Self {
        match c.to_ascii_uppercase() {
            b' ' => PageKey::Continue,
            b'Q' => PageKey::Quit,
            _ => PageKey::Other,
        }
    }
}

/// Counts rows and decides when to pause
#[derive(Debug, Clone, Copy, Default)]
pub struct Pager {
    rows: u8,
}

impl Pager {
    /// Create a pager for an empty page
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a row about to be printed; true if the page is full first
    pub fn next_row(&mut self) -> bool {
        self.rows = self.rows.saturating_add(1);
        self.rows >= DUMP_PAGE_ROWS
    }

    /// Start a new page
    pub fn new_page(&mut self) {
        self.rows = 0;
    }
}
