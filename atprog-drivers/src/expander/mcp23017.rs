//! MCP23017 16-bit I2C GPIO expander
//!
//! Only the registers the programmer needs are used, with the power-on
//! `IOCON.BANK = 0` register layout. Port A carries the EEPROM data
//! lines, port B the low address byte.

use embedded_hal::i2c::I2c;

/// Register addresses (IOCON.BANK = 0)
#[allow(dead_code)]
pub mod registers {
    pub const IODIRA: u8 = 0x00;
    pub const IODIRB: u8 = 0x01;
    pub const GPPUA: u8 = 0x0C;
    pub const GPPUB: u8 = 0x0D;
    pub const GPIOA: u8 = 0x12;
    pub const GPIOB: u8 = 0x13;
    pub const OLATA: u8 = 0x14;
    pub const OLATB: u8 = 0x15;
}

/// IODIR value for an all-input port
pub const ALL_INPUT: u8 = 0xFF;

/// IODIR value for an all-output port
pub const ALL_OUTPUT: u8 = 0x00;

/// One of the two 8-bit ports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExpanderPort {
    A,
    B,
}

impl ExpanderPort {
    fn iodir(self) -> u8 {
        match self {
            ExpanderPort::A => registers::IODIRA,
            ExpanderPort::B => registers::IODIRB,
        }
    }

    fn gpio(self) -> u8 {
        match self {
            ExpanderPort::A => registers::GPIOA,
            ExpanderPort::B => registers::GPIOB,
        }
    }
}

/// MCP23017 driver
pub struct Mcp23017<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Mcp23017<I2C> {
    /// Create a driver for the expander at `address` (7-bit)
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Device address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Borrow the I2C bus
    pub fn i2c(&self) -> &I2C {
        &self.i2c
    }

    /// Borrow the I2C bus mutably
    pub fn i2c_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    /// Release the I2C bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Make every pin of a port an input (`true`) or an output
    pub fn set_all_input(&mut self, port: ExpanderPort, input: bool) -> Result<(), I2C::Error> {
        let value = if input { ALL_INPUT } else { ALL_OUTPUT };
        self.write_register(port.iodir(), value)
    }

    /// Read back a port's direction register
    pub fn direction(&mut self, port: ExpanderPort) -> Result<u8, I2C::Error> {
        self.read_register(port.iodir())
    }

    /// Drive a port's output pins
    pub fn write_port(&mut self, port: ExpanderPort, value: u8) -> Result<(), I2C::Error> {
        self.write_register(port.gpio(), value)
    }

    /// Sample a port's pins
    pub fn read_port(&mut self, port: ExpanderPort) -> Result<u8, I2C::Error> {
        self.read_register(port.gpio())
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[register, value])
    }

    fn read_register(&mut self, register: u8) -> Result<u8, I2C::Error> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(self.address, &[register], &mut buf)?;
        Ok(buf[0])
    }
}
