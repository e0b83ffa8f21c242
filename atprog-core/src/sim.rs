//! Simulated AT28C chip for host tests
//!
//! Models the parts of the chip the programmer relies on: latching on
//! the rising edge of WE, data polling on bit 7 and recognition of the
//! SDP command sequences. Bus misuse (WE and OE asserted together,
//! reading a port that is driven, writing a port that is an input)
//! panics so tests catch ordering mistakes.

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;

use crate::config::{ChipConfig, ProgrammerConfig};
use crate::programmer::At28c;
use crate::traits::{ControlLine, EepromBus, Port, PortDirection, Report, Reporter};

/// One observable bus or delay action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    SetAddress(u16),
    Direction(Port, PortDirection),
    WriteData(u8),
    ReadData(u8),
    Control(ControlLine, bool),
    Probe,
    Delay(u32),
}

#[derive(Debug, Default)]
pub struct SimLog {
    events: Vec<BusEvent>,
    writes: Vec<(u16, u8)>,
}

pub type SharedLog = Rc<RefCell<SimLog>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    NoAcknowledge,
}

pub struct SimAt28c {
    chip: ChipConfig,
    memory: Vec<u8>,
    address: u16,
    latch: u8,
    address_port: PortDirection,
    data_port: PortDirection,
    chip_enable: bool,
    write_enable: bool,
    output_enable: bool,
    busy_polls: u32,
    remaining_polls: u32,
    stuck: bool,
    stuck_high: u8,
    last_written: u8,
    protected: bool,
    history: Vec<(u16, u8)>,
    probe_fails: bool,
    log: SharedLog,
}

impl SimAt28c {
    pub fn new(chip: ChipConfig, log: SharedLog) -> Self {
        Self {
            chip,
            memory: vec![0xFF; chip.size as usize],
            address: 0,
            latch: 0,
            // MCP23017 powers up with every pin as an input
            address_port: PortDirection::Input,
            data_port: PortDirection::Input,
            chip_enable: false,
            write_enable: false,
            output_enable: false,
            busy_polls: 0,
            remaining_polls: 0,
            stuck: false,
            stuck_high: 0,
            last_written: 0,
            protected: false,
            history: Vec::new(),
            probe_fails: false,
            log,
        }
    }

    pub fn set_busy_polls(&mut self, polls: u32) {
        self.busy_polls = polls;
    }

    pub fn set_stuck(&mut self, stuck: bool) {
        self.stuck = stuck;
    }

    /// Data lines in `mask` always read back high
    pub fn set_stuck_high(&mut self, mask: u8) {
        self.stuck_high = mask;
    }

    pub fn fail_probe(&mut self) {
        self.probe_fails = true;
    }

    pub fn load(&mut self, address: u16, bytes: &[u8]) {
        for (i, &b) in bytes.iter().enumerate() {
            let index = (address as usize + i) % self.memory.len();
            self.memory[index] = b;
        }
    }

    pub fn memory(&self, address: u16) -> u8 {
        self.memory[address as usize % self.memory.len()]
    }

    pub fn sdp_enabled(&self) -> bool {
        self.protected
    }

    pub fn events(&self) -> Vec<BusEvent> {
        self.log.borrow().events.clone()
    }

    pub fn latched_writes(&self) -> Vec<(u16, u8)> {
        self.log.borrow().writes.clone()
    }

    pub fn clear_log(&self) {
        let mut log = self.log.borrow_mut();
        log.events.clear();
        log.writes.clear();
    }

    fn record(&self, event: BusEvent) {
        self.log.borrow_mut().events.push(event);
    }

    fn index(&self) -> usize {
        self.address as usize % self.memory.len()
    }

    fn latch_write(&mut self) {
        let (address, data) = (self.address, self.latch);
        self.log.borrow_mut().writes.push((address, data));

        if !self.protected {
            let index = self.index();
            self.memory[index] = data;
            self.last_written = data;
            self.remaining_polls = self.busy_polls;
        }

        self.history.push((address, data));
        if self.history.len() > 6 {
            self.history.remove(0);
        }
        self.check_sdp();
    }

    fn check_sdp(&mut self) {
        let Some(sdp) = self.chip.sdp else {
            return;
        };

        let enable = sdp.commands(true);
        let disable = sdp.commands(false);

        if self.history.ends_with(&disable) {
            self.protected = false;
            self.history.clear();
        } else if self.history.ends_with(&enable) {
            self.protected = true;
            self.history.clear();
        }
    }
}

impl EepromBus for SimAt28c {
    type Error = SimError;

    fn set_address(&mut self, address: u16) -> Result<(), Self::Error> {
        assert_eq!(
            self.address_port,
            PortDirection::Output,
            "address driven while the address port is an input"
        );
        self.record(BusEvent::SetAddress(address));
        self.address = address;
        Ok(())
    }

    fn set_port_direction(
        &mut self,
        port: Port,
        direction: PortDirection,
    ) -> Result<(), Self::Error> {
        self.record(BusEvent::Direction(port, direction));
        match port {
            Port::Data => self.data_port = direction,
            Port::Address => self.address_port = direction,
        }
        Ok(())
    }

    fn write_data(&mut self, data: u8) -> Result<(), Self::Error> {
        assert_eq!(
            self.data_port,
            PortDirection::Output,
            "data written while the data port is an input"
        );
        self.record(BusEvent::WriteData(data));
        self.latch = data;
        Ok(())
    }

    fn read_data(&mut self) -> Result<u8, Self::Error> {
        assert_eq!(
            self.data_port,
            PortDirection::Input,
            "data read while the data port is driven"
        );
        assert!(
            self.chip_enable && self.output_enable,
            "data read without CE and OE asserted"
        );

        let stored = self.memory[self.index()] | self.stuck_high;
        let value = if self.stuck || self.remaining_polls > 0 {
            self.remaining_polls = self.remaining_polls.saturating_sub(1);
            (stored & 0x7F) | (!self.last_written & 0x80)
        } else {
            stored
        };

        self.record(BusEvent::ReadData(value));
        Ok(value)
    }

    fn set_control(&mut self, line: ControlLine, active: bool) -> Result<(), Self::Error> {
        self.record(BusEvent::Control(line, active));

        match line {
            ControlLine::ChipEnable => self.chip_enable = active,
            ControlLine::OutputEnable => self.output_enable = active,
            ControlLine::WriteEnable => {
                let rising_edge = self.write_enable && !active;
                self.write_enable = active;
                if rising_edge && self.chip_enable {
                    self.latch_write();
                }
            }
        }

        assert!(
            !(self.write_enable && self.output_enable),
            "WE and OE asserted together"
        );
        Ok(())
    }

    fn probe(&mut self) -> Result<(), Self::Error> {
        self.record(BusEvent::Probe);
        if self.probe_fails {
            Err(SimError::NoAcknowledge)
        } else {
            Ok(())
        }
    }
}

/// Delay that records instead of waiting
pub struct RecordingDelay {
    log: SharedLog,
}

impl RecordingDelay {
    pub fn new(log: SharedLog) -> Self {
        Self { log }
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.borrow_mut().events.push(BusEvent::Delay(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.delay_ns(us.saturating_mul(1_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay_ns(ms.saturating_mul(1_000_000));
    }
}

#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub reports: Vec<Report>,
}

impl RecordingReporter {
    pub fn failures(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r, Report::VerifyFailed { .. }))
            .count()
    }
}

impl Reporter for RecordingReporter {
    fn report(&mut self, report: Report) {
        self.reports.push(report);
    }
}

pub type TestProgrammer = At28c<SimAt28c, RecordingDelay>;

impl At28c<SimAt28c, RecordingDelay> {
    pub fn sim(chip: ChipConfig) -> Self {
        Self::sim_with_config(ProgrammerConfig::new(chip))
    }

    pub fn sim_with_config(config: ProgrammerConfig) -> Self {
        let log = SharedLog::default();
        At28c::new(
            SimAt28c::new(config.chip, log.clone()),
            RecordingDelay::new(log),
            config,
        )
    }
}
