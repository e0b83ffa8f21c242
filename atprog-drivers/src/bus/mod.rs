//! EEPROM bus implementations

pub mod parallel;

pub use parallel::{BusError, ControlPins, ParallelBus, MAX_HIGH_ADDRESS_PINS};
