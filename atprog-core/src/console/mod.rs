//! Console helpers
//!
//! Pieces of the serial console that do not depend on the UART: command
//! decoding, hex value entry and output formatting.

pub mod command;
pub mod format;
pub mod hex_input;

pub use command::{Command, Key, HELP, PROMPT, UNKNOWN_COMMAND};
pub use format::{DumpRow, ExecutionTime, PageKey, Pager, DUMP_PAGE_PROMPT};
pub use hex_input::{HexInput, HexKey};
