//! Parallel EEPROM bus over an MCP23017 and MCU pins
//!
//! Wiring:
//! - expander port A: data lines I/O0-I/O7
//! - expander port B: address lines A0-A7
//! - MCU pins: CE, WE, OE (active low) and A8 upwards

use core::fmt;

use atprog_core::traits::{ControlLine, EepromBus, Port, PortDirection};
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;
use heapless::Vec;

use crate::expander::{ExpanderPort, Mcp23017};
use crate::expander::mcp23017::{ALL_INPUT, ALL_OUTPUT};

/// Most high address lines a supported chip needs (A8-A14)
pub const MAX_HIGH_ADDRESS_PINS: usize = 7;

/// Errors raised by the parallel bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError<I, P> {
    /// I2C transaction with the expander failed
    I2c(I),
    /// Driving an MCU pin failed
    Pin(P),
    /// Expander answered but its direction registers do not match
    ExpanderMismatch {
        /// Port that read back wrong
        port: ExpanderPort,
        /// Expected IODIR value
        expected: u8,
        /// IODIR value read back
        actual: u8,
    },
}

impl<I: fmt::Debug, P: fmt::Debug> fmt::Display for BusError<I, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusError::I2c(e) => write!(f, "I2C error: {:?}", e),
            BusError::Pin(e) => write!(f, "Pin error: {:?}", e),
            BusError::ExpanderMismatch {
                port,
                expected,
                actual,
            } => write!(
                f,
                "MCP23017 port {:?} direction 0x{:02X}, expected 0x{:02X}",
                port, actual, expected
            ),
        }
    }
}

/// Control strobe pins
pub struct ControlPins<P> {
    /// CE
    pub chip_enable: P,
    /// WE
    pub write_enable: P,
    /// OE
    pub output_enable: P,
}

/// Bus driver for an AT28C wired through an MCP23017
pub struct ParallelBus<I2C, P> {
    expander: Mcp23017<I2C>,
    control: ControlPins<P>,
    high_address: Vec<P, MAX_HIGH_ADDRESS_PINS>,
    data_direction: PortDirection,
    address_direction: PortDirection,
}

fn expander_port(port: Port) -> ExpanderPort {
    match port {
        Port::Data => ExpanderPort::A,
        Port::Address => ExpanderPort::B,
    }
}

fn iodir(direction: PortDirection) -> u8 {
    match direction {
        PortDirection::Input => ALL_INPUT,
        PortDirection::Output => ALL_OUTPUT,
    }
}

impl<I2C, P> ParallelBus<I2C, P>
where
    I2C: I2c,
    P: OutputPin,
{
    /// Create a bus driver
    ///
    /// `high_address` holds the pins for A8 upwards, in order. Pass
    /// exactly as many as the chip has high address lines.
    pub fn new(
        expander: Mcp23017<I2C>,
        control: ControlPins<P>,
        high_address: Vec<P, MAX_HIGH_ADDRESS_PINS>,
    ) -> Self {
        Self {
            expander,
            control,
            high_address,
            // MCP23017 power-on state
            data_direction: PortDirection::Input,
            address_direction: PortDirection::Input,
        }
    }

    /// Number of high address pins
    pub fn high_address_bits(&self) -> usize {
        self.high_address.len()
    }

    /// Last direction set for a port
    pub fn direction(&self, port: Port) -> PortDirection {
        match port {
            Port::Data => self.data_direction,
            Port::Address => self.address_direction,
        }
    }

    /// Release the expander and pins
    pub fn release(self) -> (Mcp23017<I2C>, ControlPins<P>, Vec<P, MAX_HIGH_ADDRESS_PINS>) {
        (self.expander, self.control, self.high_address)
    }
}

impl<I2C, P> EepromBus for ParallelBus<I2C, P>
where
    I2C: I2c,
    P: OutputPin,
{
    type Error = BusError<I2C::Error, P::Error>;

    fn set_address(&mut self, address: u16) -> Result<(), Self::Error> {
        self.expander
            .write_port(ExpanderPort::B, address as u8)
            .map_err(BusError::I2c)?;

        for (bit, pin) in self.high_address.iter_mut().enumerate() {
            if (address >> (8 + bit)) & 1 == 1 {
                pin.set_high().map_err(BusError::Pin)?;
            } else {
                pin.set_low().map_err(BusError::Pin)?;
            }
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("address {=u16:#x}", address);

        Ok(())
    }

    fn set_port_direction(
        &mut self,
        port: Port,
        direction: PortDirection,
    ) -> Result<(), Self::Error> {
        self.expander
            .set_all_input(expander_port(port), direction == PortDirection::Input)
            .map_err(BusError::I2c)?;

        match port {
            Port::Data => self.data_direction = direction,
            Port::Address => self.address_direction = direction,
        }
        Ok(())
    }

    fn write_data(&mut self, data: u8) -> Result<(), Self::Error> {
        self.expander
            .write_port(ExpanderPort::A, data)
            .map_err(BusError::I2c)
    }

    fn read_data(&mut self) -> Result<u8, Self::Error> {
        self.expander
            .read_port(ExpanderPort::A)
            .map_err(BusError::I2c)
    }

    fn set_control(&mut self, line: ControlLine, active: bool) -> Result<(), Self::Error> {
        let pin = match line {
            ControlLine::ChipEnable => &mut self.control.chip_enable,
            ControlLine::WriteEnable => &mut self.control.write_enable,
            ControlLine::OutputEnable => &mut self.control.output_enable,
        };

        // Active low
        if active {
            pin.set_low().map_err(BusError::Pin)
        } else {
            pin.set_high().map_err(BusError::Pin)
        }
    }

    /// Read both direction registers back and compare with what was set
    fn probe(&mut self) -> Result<(), Self::Error> {
        for port in [Port::Data, Port::Address] {
            let expander_port = expander_port(port);
            let expected = iodir(self.direction(port));
            let actual = self
                .expander
                .direction(expander_port)
                .map_err(BusError::I2c)?;

            if actual != expected {
                #[cfg(feature = "defmt")]
                defmt::error!(
                    "MCP23017 at {=u8:#x}: port {} reads {=u8:#x}",
                    self.expander.address(),
                    expander_port,
                    actual
                );

                return Err(BusError::ExpanderMismatch {
                    port: expander_port,
                    expected,
                    actual,
                });
            }
        }

        Ok(())
    }
}
