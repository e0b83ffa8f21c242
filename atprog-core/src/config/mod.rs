//! Configuration types
//!
//! Chip presets and programmer settings. The firmware fills these in
//! from its build-time board configuration.

pub mod chip;
pub mod programmer;

pub use chip::*;
pub use programmer::*;
