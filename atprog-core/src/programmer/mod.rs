//! Byte programming engine
//!
//! Single-byte write/read/verify primitives plus the ranged erase and
//! write protection commands built on them.

pub mod engine;
pub mod error;
pub mod phase;

pub use engine::At28c;
pub use error::ProgramError;
pub use phase::WritePhase;
