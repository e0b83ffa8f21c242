//! Board-agnostic core logic for the EEPROM programmer firmware
//!
//! This crate contains all programming logic that does not depend on
//! specific hardware implementations:
//!
//! - Chip family presets and programmer configuration
//! - Bus and status reporting traits
//! - Byte programming engine (write, read, verify, erase, write protect)
//! - Diagnostics (full chip test, ROM image write and check)
//! - Console helpers (command keys, hex entry, dump formatting)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod console;
pub mod diagnostics;
pub mod programmer;
pub mod traits;

#[cfg(test)]
mod sim;

pub use config::{ChipConfig, ChipFamily, PollLimit, ProgrammerConfig, Timing};
pub use programmer::{At28c, ProgramError, WritePhase};
pub use traits::{EepromBus, NullReporter, Report, Reporter};
