//! Write cycle phases
//!
//! A byte write walks these phases strictly in order. Only `PollRead`
//! can last an unbounded time; it is left once bit 7 of the readback
//! matches the written byte.

/// Phase of a single byte write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WritePhase {
    /// Nothing started, strobes released
    Idle,
    /// Address driven onto the bus
    AddressSet,
    /// Data port switched to output and loaded
    BusDrive,
    /// CE and WE asserted
    PulseAssert,
    /// WE released, data held, CE released
    PulseHold,
    /// Reading back until the internal write cycle finishes
    PollRead,
    /// Write cycle complete
    Done,
}

impl WritePhase {
    /// Phase that follows this one
    ///
    /// `Done` is terminal and maps to itself.
    pub fn next(self) -> Self {
        use WritePhase::*;

        match self {
            Idle => AddressSet,
            AddressSet => BusDrive,
            BusDrive => PulseAssert,
            PulseAssert => PulseHold,
            PulseHold => PollRead,
            PollRead => Done,
            Done => Done,
        }
    }

    /// Check if the write cycle is over
    pub fn is_terminal(&self) -> bool {
        matches!(self, WritePhase::Done)
    }

    /// Check if WE is asserted during this phase
    pub fn write_enable_active(&self) -> bool {
        matches!(self, WritePhase::PulseAssert)
    }

    /// Check if OE is asserted during this phase
    pub fn output_enable_active(&self) -> bool {
        matches!(self, WritePhase::PollRead)
    }
}
