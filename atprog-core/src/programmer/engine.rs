//! Byte programming engine
//!
//! Sequences control strobes, bus direction and delays for single-byte
//! writes, reads and the software data protection commands of AT28C
//! parts. Write completion is detected with data polling: while the
//! internal write cycle runs the chip returns the complement of bit 7.

use atprog_protocol::HexTarget;
use embedded_hal::delay::DelayNs;

use super::error::ProgramError;
use super::phase::WritePhase;
use crate::config::{ChipConfig, ProgrammerConfig};
use crate::diagnostics::progress_tick;
use crate::traits::{ControlLine, EepromBus, Port, PortDirection, Report, Reporter};

/// Data polling completion bit
const POLL_BIT: u8 = 0x80;

/// Programmer for AT28C64 / AT28C256 parallel EEPROMs
pub struct At28c<B, D> {
    bus: B,
    delay: D,
    config: ProgrammerConfig,
}

impl<B, D> At28c<B, D>
where
    B: EepromBus,
    D: DelayNs,
{
    /// Create a new programmer
    ///
    /// Call [`At28c::init`] before any other operation.
    pub fn new(bus: B, delay: D, config: ProgrammerConfig) -> Self {
        let config = config.with_timing(config.timing);
        Self { bus, delay, config }
    }

    /// Put the bus into its idle state and check the hardware responds
    ///
    /// All strobes are released, the data port becomes an input and the
    /// address port an output.
    pub fn init(&mut self) -> Result<(), ProgramError<B::Error>> {
        self.bus.set_control(ControlLine::WriteEnable, false)?;
        self.bus.set_control(ControlLine::OutputEnable, false)?;
        self.bus.set_control(ControlLine::ChipEnable, false)?;

        self.bus.set_port_direction(Port::Data, PortDirection::Input)?;
        self.bus
            .set_port_direction(Port::Address, PortDirection::Output)?;

        self.bus.probe()?;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "programmer ready: {} ({} bytes)",
            self.config.chip.name,
            self.config.chip.size
        );

        Ok(())
    }

    /// Selected chip
    pub fn chip(&self) -> &ChipConfig {
        &self.config.chip
    }

    /// Full configuration
    pub fn config(&self) -> &ProgrammerConfig {
        &self.config
    }

    /// Borrow the bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Borrow the bus mutably
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Release the bus and delay provider
    pub fn into_parts(self) -> (B, D) {
        (self.bus, self.delay)
    }

    /// Program one byte and wait for the write cycle to finish
    ///
    /// Addresses outside the chip are ignored without touching the bus.
    pub fn write_byte(&mut self, address: u16, data: u8) -> Result<(), ProgramError<B::Error>> {
        if !self.config.chip.contains(address) {
            return Ok(());
        }

        let timing = self.config.timing;
        let mut phase = WritePhase::Idle;

        while !phase.is_terminal() {
            #[cfg(feature = "defmt")]
            defmt::trace!("write {=u16:#x}: {}", address, phase);

            match phase {
                WritePhase::Idle => {
                    self.bus.set_control(ControlLine::OutputEnable, false)?;
                    self.bus.set_control(ControlLine::WriteEnable, false)?;
                }
                WritePhase::AddressSet => {
                    self.bus.set_address(address)?;
                }
                WritePhase::BusDrive => {
                    self.bus.set_port_direction(Port::Data, PortDirection::Output)?;
                    self.bus.write_data(data)?;
                }
                WritePhase::PulseAssert => {
                    self.bus.set_control(ControlLine::ChipEnable, true)?;
                    self.delay.delay_us(timing.address_setup_us);
                    self.bus.set_control(ControlLine::WriteEnable, true)?;
                    self.delay.delay_us(timing.write_pulse_us);
                }
                WritePhase::PulseHold => {
                    self.bus.set_control(ControlLine::WriteEnable, false)?;
                    self.delay.delay_us(timing.data_hold_us);
                    self.bus.set_control(ControlLine::ChipEnable, false)?;
                }
                WritePhase::PollRead => {
                    self.poll_completion(address, data)?;
                }
                WritePhase::Done => {}
            }

            phase = phase.next();
        }

        Ok(())
    }

    /// Read back until bit 7 matches the written byte
    fn poll_completion(&mut self, address: u16, data: u8) -> Result<(), ProgramError<B::Error>> {
        self.bus.set_port_direction(Port::Data, PortDirection::Input)?;
        self.bus.set_control(ControlLine::WriteEnable, false)?;
        self.bus.set_control(ControlLine::ChipEnable, true)?;
        self.bus.set_control(ControlLine::OutputEnable, true)?;

        let expected = data & POLL_BIT;
        let mut attempts: u32 = 0;

        loop {
            let current = self.bus.read_data()? & POLL_BIT;
            attempts = attempts.saturating_add(1);

            if current == expected {
                break;
            }

            if self.config.poll_limit.exhausted(attempts) {
                self.release_read()?;

                #[cfg(feature = "defmt")]
                defmt::error!(
                    "write {=u16:#x} still busy after {} polls",
                    address,
                    attempts
                );

                return Err(ProgramError::PollTimeout { address, data });
            }
        }

        self.release_read()
    }

    /// Release OE and CE after a read
    fn release_read(&mut self) -> Result<(), ProgramError<B::Error>> {
        self.bus.set_control(ControlLine::OutputEnable, false)?;
        self.bus.set_control(ControlLine::ChipEnable, false)?;
        Ok(())
    }

    /// Read one byte
    ///
    /// Addresses outside the chip return `0xFF` without touching the bus.
    pub fn read_byte(&mut self, address: u16) -> Result<u8, ProgramError<B::Error>> {
        if !self.config.chip.contains(address) {
            return Ok(0xFF);
        }

        let timing = self.config.timing;

        self.bus.set_address(address)?;
        self.bus.set_port_direction(Port::Data, PortDirection::Input)?;
        self.bus.set_control(ControlLine::OutputEnable, false)?;
        self.bus.set_control(ControlLine::WriteEnable, false)?;
        self.bus.set_control(ControlLine::ChipEnable, true)?;
        self.delay.delay_us(timing.address_setup_us);
        self.bus.set_control(ControlLine::OutputEnable, true)?;
        self.delay.delay_us(timing.output_enable_us);

        let data = self.bus.read_data()?;
        self.release_read()?;

        #[cfg(feature = "defmt")]
        defmt::trace!("read {=u16:#x} = {=u8:#x}", address, data);

        Ok(data)
    }

    /// Compare one byte against its expected value
    ///
    /// A mismatch is reported and returned as `false`.
    pub fn verify_byte<R: Reporter>(
        &mut self,
        address: u16,
        expected: u8,
        reporter: &mut R,
    ) -> Result<bool, ProgramError<B::Error>> {
        let actual = self.read_byte(address)?;
        if actual == expected {
            return Ok(true);
        }

        #[cfg(feature = "defmt")]
        defmt::warn!(
            "verify {=u16:#x}: expected {=u8:#x}, read {=u8:#x}",
            address,
            expected,
            actual
        );

        reporter.report(Report::VerifyFailed {
            address,
            expected,
            actual,
        });
        Ok(false)
    }

    /// Fill `[start, end)` with `pattern`, in ascending order
    pub fn erase_section<R: Reporter>(
        &mut self,
        start: u16,
        end: u16,
        pattern: u8,
        reporter: &mut R,
    ) -> Result<(), ProgramError<B::Error>> {
        #[cfg(feature = "defmt")]
        defmt::info!(
            "erase {=u16:#x}..{=u16:#x} with {=u8:#x}",
            start,
            end,
            pattern
        );

        reporter.report(Report::EraseStarted {
            start,
            end,
            pattern,
        });

        for address in start..end {
            self.write_byte(address, pattern)?;

            if let Some(tick) = progress_tick(address) {
                reporter.report(Report::Progress(tick));
            }
        }

        reporter.report(Report::EraseComplete);
        Ok(())
    }

    /// Enable or disable software data protection
    ///
    /// Chips without SDP support are left untouched.
    pub fn set_write_protect(&mut self, enable: bool) -> Result<(), ProgramError<B::Error>> {
        let Some(sdp) = self.config.chip.sdp else {
            #[cfg(feature = "defmt")]
            defmt::warn!("{} has no write protection", self.config.chip.name);
            return Ok(());
        };

        let timing = self.config.timing;

        self.bus.set_control(ControlLine::OutputEnable, false)?;
        self.bus.set_control(ControlLine::WriteEnable, false)?;
        self.bus.set_control(ControlLine::ChipEnable, true)?;
        self.bus.set_port_direction(Port::Data, PortDirection::Output)?;

        for (address, command) in sdp.commands(enable) {
            self.bus.set_address(address)?;
            self.bus.write_data(command)?;
            self.delay.delay_us(timing.address_setup_us);
            self.bus.set_control(ControlLine::WriteEnable, true)?;
            self.delay.delay_us(timing.write_pulse_us);
            self.bus.set_control(ControlLine::WriteEnable, false)?;
            self.delay.delay_us(timing.data_hold_us);
        }

        self.delay.delay_ms(timing.sdp_settle_ms);
        self.bus.set_control(ControlLine::ChipEnable, false)?;
        self.bus.set_port_direction(Port::Data, PortDirection::Input)?;

        #[cfg(feature = "defmt")]
        defmt::info!("write protection {}", if enable { "enabled" } else { "disabled" });

        Ok(())
    }
}

impl<B, D> HexTarget for At28c<B, D>
where
    B: EepromBus,
    D: DelayNs,
{
    type Error = ProgramError<B::Error>;

    fn write_byte(&mut self, address: u16, data: u8) -> Result<(), Self::Error> {
        At28c::write_byte(self, address, data)
    }

    fn read_byte(&mut self, address: u16) -> Result<u8, Self::Error> {
        At28c::read_byte(self, address)
    }
}
