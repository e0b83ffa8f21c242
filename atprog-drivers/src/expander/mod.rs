//! I2C GPIO expanders

pub mod mcp23017;

pub use mcp23017::{ExpanderPort, Mcp23017};
