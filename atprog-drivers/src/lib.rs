//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in atprog-core:
//!
//! - MCP23017 I2C GPIO expander
//! - Parallel EEPROM bus (expander ports plus MCU pins)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod bus;
pub mod expander;

pub use bus::{BusError, ControlPins, ParallelBus};
pub use expander::{ExpanderPort, Mcp23017};
