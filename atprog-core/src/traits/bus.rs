//! Parallel EEPROM bus abstraction
//!
//! The programming engine only sequences logical operations; how an
//! address or data byte reaches the chip (expander registers, MCU pins)
//! is up to the implementation.

/// Logical 8-bit ports of the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    /// Data lines I/O0-I/O7
    Data,
    /// Low address byte A0-A7
    Address,
}

/// Port direction as seen from the programmer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortDirection {
    /// Programmer samples the lines
    Input,
    /// Programmer drives the lines
    Output,
}

/// Active-low control strobes of the chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlLine {
    /// CE, selects the chip
    ChipEnable,
    /// WE, latches address and data on its rising edge
    WriteEnable,
    /// OE, lets the chip drive the data lines
    OutputEnable,
}

/// Trait for the physical bus of a parallel EEPROM
///
/// Control lines take a logical level: `active = true` means the line is
/// asserted, i.e. driven low. Implementations take care of the inversion.
pub trait EepromBus {
    /// Error type for bus transactions
    type Error;

    /// Drive the full address (low byte and high lines)
    fn set_address(&mut self, address: u16) -> Result<(), Self::Error>;

    /// Change the direction of a logical port
    fn set_port_direction(
        &mut self,
        port: Port,
        direction: PortDirection,
    ) -> Result<(), Self::Error>;

    /// Write a byte to the data port (must be an output)
    fn write_data(&mut self, data: u8) -> Result<(), Self::Error>;

    /// Sample the data port (must be an input)
    fn read_data(&mut self) -> Result<u8, Self::Error>;

    /// Assert or release a control line
    fn set_control(&mut self, line: ControlLine, active: bool) -> Result<(), Self::Error>;

    /// Check that the bus hardware responds
    ///
    /// Buses without anything to probe report success.
    fn probe(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<T: EepromBus + ?Sized> EepromBus for &mut T {
    type Error = T::Error;

    fn set_address(&mut self, address: u16) -> Result<(), Self::Error> {
        (**self).set_address(address)
    }

    fn set_port_direction(
        &mut self,
        port: Port,
        direction: PortDirection,
    ) -> Result<(), Self::Error> {
        (**self).set_port_direction(port, direction)
    }

    fn write_data(&mut self, data: u8) -> Result<(), Self::Error> {
        (**self).write_data(data)
    }

    fn read_data(&mut self) -> Result<u8, Self::Error> {
        (**self).read_data()
    }

    fn set_control(&mut self, line: ControlLine, active: bool) -> Result<(), Self::Error> {
        (**self).set_control(line, active)
    }

    fn probe(&mut self) -> Result<(), Self::Error> {
        (**self).probe()
    }
}
