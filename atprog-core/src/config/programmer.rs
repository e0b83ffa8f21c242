//! Programmer configuration
//!
//! Everything the byte programming engine needs besides the bus itself:
//! the chip preset, strobe timing and the busy-poll bound.

use super::chip::ChipConfig;

/// Default I2C address of the MCP23017 expander (A0-A2 tied low)
pub const DEFAULT_EXPANDER_ADDRESS: u8 = 0x20;

/// Strobe and settle delays
///
/// The AT28C datasheets specify nanosecond minimums; the microsecond
/// defaults here leave plenty of margin for a bit-banged bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Address setup before the write pulse (tAS)
    pub address_setup_us: u32,
    /// Write enable pulse width (tWP)
    pub write_pulse_us: u32,
    /// Data hold after the write pulse (tDH)
    pub data_hold_us: u32,
    /// Output enable to data valid during reads
    pub output_enable_us: u32,
    /// Settle time after an SDP command sequence
    pub sdp_settle_ms: u32,
}

impl Timing {
    /// Replace zero delays with the minimum of one unit
    ///
    /// Every phase needs a real delay, a zero-length strobe is not
    /// guaranteed to be seen by the chip.
    pub fn sanitized(self) -> Self {
        Self {
            address_setup_us: self.address_setup_us.max(1),
            write_pulse_us: self.write_pulse_us.max(1),
            data_hold_us: self.data_hold_us.max(1),
            output_enable_us: self.output_enable_us.max(1),
            sdp_settle_ms: self.sdp_settle_ms.max(1),
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            address_setup_us: 1,
            write_pulse_us: 1,
            data_hold_us: 1,
            output_enable_us: 100,
            sdp_settle_ms: 10,
        }
    }
}

/// Bound on the data polling loop after a write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollLimit {
    /// Poll until bit 7 matches, however long that takes
    #[default]
    Unbounded,
    /// Give up after this many reads
    Attempts(u32),
}

impl PollLimit {
    /// Whether `attempts` reads have used up the budget
    pub fn exhausted(&self, attempts: u32) -> bool {
        match self {
            PollLimit::Unbounded => false,
            PollLimit::Attempts(max) => attempts >= *max,
        }
    }
}

/// Complete programmer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProgrammerConfig {
    /// Target chip
    pub chip: ChipConfig,
    /// Strobe timing
    pub timing: Timing,
    /// Busy-poll bound
    pub poll_limit: PollLimit,
    /// 7-bit I2C address of the expander
    pub expander_address: u8,
}

impl ProgrammerConfig {
    /// Configuration with default timing for the given chip
    pub fn new(chip: ChipConfig) -> Self {
        Self {
            chip,
            ..Self::default()
        }
    }

    /// Replace the poll limit
    pub fn with_poll_limit(mut self, poll_limit: PollLimit) -> Self {
        self.poll_limit = poll_limit;
        self
    }

    /// Replace the timing (zero delays are raised to one unit)
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing.sanitized();
        self
    }
}

impl Default for ProgrammerConfig {
    fn default() -> Self {
        Self {
            chip: ChipConfig::default(),
            timing: Timing::default(),
            poll_limit: PollLimit::default(),
            expander_address: DEFAULT_EXPANDER_ADDRESS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProgrammerConfig::default();
        assert_eq!(config.expander_address, 0x20);
        assert_eq!(config.poll_limit, PollLimit::Unbounded);
        assert_eq!(config.timing.output_enable_us, 100);
        assert_eq!(config.chip, ChipConfig::AT28C64);
    }

    #[test]
    fn test_zero_timing_is_raised() {
        let config = ProgrammerConfig::new(ChipConfig::AT28C256).with_timing(Timing {
            address_setup_us: 0,
            write_pulse_us: 0,
            data_hold_us: 5,
            output_enable_us: 0,
            sdp_settle_ms: 0,
        });

        assert_eq!(config.timing.address_setup_us, 1);
        assert_eq!(config.timing.write_pulse_us, 1);
        assert_eq!(config.timing.data_hold_us, 5);
        assert_eq!(config.timing.output_enable_us, 1);
        assert_eq!(config.timing.sdp_settle_ms, 1);
    }

    #[test]
    fn test_poll_limit() {
        assert!(!PollLimit::Unbounded.exhausted(u32::MAX));
        assert!(!PollLimit::Attempts(3).exhausted(2));
        assert!(PollLimit::Attempts(3).exhausted(3));
    }
}
