//! Hardware abstraction traits
//!
//! These traits define the interface between the programming logic
//! and the board-specific bus and console implementations.

pub mod bus;
pub mod reporter;

pub use bus::{ControlLine, EepromBus, Port, PortDirection};
pub use reporter::{NullReporter, Report, Reporter};
