//! Test patterns for the full chip test

/// Data pattern written to one test segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TestPattern {
    /// `1 << (addr & 7)`
    WalkingOnes,
    /// Low address byte
    AddressAsData,
    /// 0x55 on even, 0xAA on odd addresses
    Alternating,
    /// 0x00
    AllZeros,
    /// 0xFF
    AllOnes,
    /// Complement of the low address byte
    InvertedAddress,
}

impl TestPattern {
    /// Patterns in segment order
    pub const ALL: [TestPattern; 6] = [
        TestPattern::WalkingOnes,
        TestPattern::AddressAsData,
        TestPattern::Alternating,
        TestPattern::AllZeros,
        TestPattern::AllOnes,
        TestPattern::InvertedAddress,
    ];

    /// Byte to write at `address`
    pub fn value(&self, address: u16) -> u8 {
        match self {
            TestPattern::WalkingOnes => 1 << (address & 7),
            TestPattern::AddressAsData => address as u8,
            TestPattern::Alternating => {
                if address & 1 == 1 {
                    0xAA
                } else {
                    0x55
                }
            }
            TestPattern::AllZeros => 0x00,
            TestPattern::AllOnes => 0xFF,
            TestPattern::InvertedAddress => !(address as u8),
        }
    }

    /// Console label
    pub fn name(&self) -> &'static str {
        match self {
            TestPattern::WalkingOnes => "Pattern 1: Walking 1's",
            TestPattern::AddressAsData => "Pattern 2: Address as data",
            TestPattern::Alternating => "Pattern 3: Alternating 0x55/0xAA",
            TestPattern::AllZeros => "Pattern 4: All zeros",
            TestPattern::AllOnes => "Pattern 5: All ones",
            TestPattern::InvertedAddress => "Pattern 6: Inverted address",
        }
    }
}
