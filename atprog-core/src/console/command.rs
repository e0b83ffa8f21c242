//! Single-key console commands

/// Help text printed by `?` and after every command
pub const HELP: &str = "\nCommands:\n \
E - Erase EEPROM\n \
C - Check EEPROM against ROM image\n \
T - Full EEPROM test\n \
D - Dump EEPROM contents\n \
W - Write Intel HEX data to EEPROM\n \
R - Write ROM image\n \
X - Enable write protection\n \
S - Disable write protection\n \
? - Help\n\n>";

/// Reply to a key that is not a command
pub const UNKNOWN_COMMAND: &str = "\nUnknown command. Type ? for help.\n>";

/// Re-prompt after a bare line ending
pub const PROMPT: &str = "\n>";

/// Console commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Fill a range with a pattern
    Erase,
    /// Compare the chip against the ROM image
    Check,
    /// Hex dump
    Dump,
    /// Program Intel HEX from the console
    WriteHex,
    /// Program the ROM image
    WriteRom,
    /// Full chip test
    Test,
    /// Enable software data protection
    EnableProtect,
    /// Disable software data protection
    DisableProtect,
    /// Print the command list
    Help,
}

/// Classified console key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    /// A command key
    Command(Command),
    /// CR or LF
    LineEnd,
    /// Anything else
    Unknown(u8),
}

impl Command {
    /// Decode a command key (case-insensitive)
    pub fn from_byte(c: u8) -> Option<Self> {
        match c.to_ascii_uppercase() {
            b'E' => Some(Command::Erase),
            b'C' => Some(Command::Check),
            b'D' => Some(Command::Dump),
            b'W' => Some(Command::WriteHex),
            b'R' => Some(Command::WriteRom),
            b'T' => Some(Command::Test),
            b'X' => Some(Command::EnableProtect),
            b'S' => Some(Command::DisableProtect),
            b'?' => Some(Command::Help),
            _ => None,
        }
    }

    /// Key echoed back when the command starts
    pub fn key(&self) -> char {
        match self {
            Command::Erase => 'E',
            Command::Check => 'C',
            Command::Dump => 'D',
            Command::WriteHex => 'W',
            Command::WriteRom => 'R',
            Command::Test => 'T',
            Command::EnableProtect => 'X',
            Command::DisableProtect => 'S',
            Command::Help => '?',
        }
    }
}

impl Key {
    /// Classify a received byte
    pub fn classify(c: u8) -> Self {
        match c {
            b'\r' | b'\n' => Key::LineEnd,
            _ => Command::from_byte(c).map_or(Key::Unknown(c), Key::Command),
        }
    }
}
