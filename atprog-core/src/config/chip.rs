//! Chip family presets
//!
//! The supported parts differ only in capacity, the number of address
//! lines and the magic addresses of the software data protection
//! command sequence.

use heapless::Vec;

/// Number of address lines driven through the expander's address port
pub const LOW_ADDRESS_BITS: u8 = 8;

/// Longest SDP command sequence (disable)
pub const MAX_SDP_COMMANDS: usize = 6;

/// Supported chip families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipFamily {
    /// AT28C64, 8 KiB, A0-A12
    At28c64,
    /// AT28C256, 32 KiB, A0-A14
    At28c256,
}

impl ChipFamily {
    /// All supported families
    pub const ALL: [ChipFamily; 2] = [ChipFamily::At28c64, ChipFamily::At28c256];

    /// Preset for this family
    pub const fn config(self) -> ChipConfig {
        match self {
            ChipFamily::At28c64 => ChipConfig::AT28C64,
            ChipFamily::At28c256 => ChipConfig::AT28C256,
        }
    }

    /// Look up a family by part name (case-insensitive, e.g. "AT28C64")
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|family| family.config().name.eq_ignore_ascii_case(name.trim()))
    }
}

/// Magic addresses of the software data protection sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SdpAddresses {
    /// Address receiving 0xAA and the mode byte
    pub first: u16,
    /// Address receiving 0x55
    pub second: u16,
}

impl SdpAddresses {
    /// Command sequence that enables (`true`) or disables protection
    pub fn commands(&self, enable: bool) -> Vec<(u16, u8), MAX_SDP_COMMANDS> {
        let (a, b) = (self.first, self.second);
        let sequence: &[(u16, u8)] = if enable {
            &[(a, 0xAA), (b, 0x55), (a, 0xA0)]
        } else {
            &[
                (a, 0xAA),
                (b, 0x55),
                (a, 0x80),
                (a, 0xAA),
                (b, 0x55),
                (a, 0x20),
            ]
        };

        // Both sequences fit in MAX_SDP_COMMANDS
        Vec::from_slice(sequence).unwrap_or_default()
    }
}

/// Geometry and command set of one chip family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipConfig {
    /// Family this preset describes
    pub family: ChipFamily,
    /// Part name shown on the console
    pub name: &'static str,
    /// Capacity in bytes
    pub size: u32,
    /// Total number of address lines
    pub address_bits: u8,
    /// Software data protection support
    pub sdp: Option<SdpAddresses>,
}

impl ChipConfig {
    /// AT28C64 preset
    pub const AT28C64: Self = Self {
        family: ChipFamily::At28c64,
        name: "AT28C64",
        size: 8192,
        address_bits: 13,
        sdp: Some(SdpAddresses {
            first: 0x1555,
            second: 0x0AAA,
        }),
    };

    /// AT28C256 preset
    pub const AT28C256: Self = Self {
        family: ChipFamily::At28c256,
        name: "AT28C256",
        size: 32768,
        address_bits: 15,
        sdp: Some(SdpAddresses {
            first: 0x5555,
            second: 0x2AAA,
        }),
    };

    /// Check whether an address lies inside the chip
    pub fn contains(&self, address: u16) -> bool {
        (address as u32) < self.size
    }

    /// Number of address lines driven directly by MCU pins
    pub fn high_address_bits(&self) -> u8 {
        self.address_bits.saturating_sub(LOW_ADDRESS_BITS)
    }

    /// Whether the family supports software data protection
    pub fn supports_write_protect(&self) -> bool {
        self.sdp.is_some()
    }
}

impl Default for ChipConfig {
    fn default() -> Self {
        Self::AT28C64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_match_address_width() {
        for family in ChipFamily::ALL {
            let chip = family.config();
            assert_eq!(chip.size, 1 << chip.address_bits);
            assert_eq!(chip.family, family);
        }
        assert_eq!(ChipConfig::AT28C64.high_address_bits(), 5);
        assert_eq!(ChipConfig::AT28C256.high_address_bits(), 7);
    }

    #[test]
    fn test_contains_boundary() {
        let chip = ChipConfig::AT28C64;
        assert!(chip.contains(0));
        assert!(chip.contains(8191));
        assert!(!chip.contains(8192));
        assert!(ChipConfig::AT28C256.contains(32767));
        assert!(!ChipConfig::AT28C256.contains(32768));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(ChipFamily::from_name("at28c64"), Some(ChipFamily::At28c64));
        assert_eq!(ChipFamily::from_name(" AT28C256 "), Some(ChipFamily::At28c256));
        assert_eq!(ChipFamily::from_name("AT28C16"), None);
    }

    #[test]
    fn test_sdp_sequences() {
        let sdp = ChipConfig::AT28C64.sdp.unwrap();
        assert_eq!(
            sdp.commands(true).as_slice(),
            &[(0x1555, 0xAA), (0x0AAA, 0x55), (0x1555, 0xA0)]
        );

        let sdp = ChipConfig::AT28C256.sdp.unwrap();
        assert_eq!(
            sdp.commands(false).as_slice(),
            &[
                (0x5555, 0xAA),
                (0x2AAA, 0x55),
                (0x5555, 0x80),
                (0x5555, 0xAA),
                (0x2AAA, 0x55),
                (0x5555, 0x20),
            ]
        );
    }
}
