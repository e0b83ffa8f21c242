//! Hex value entry
//!
//! Collects hex digits typed on the console. When more than `N` digits
//! are typed the oldest one is dropped, so the value is always the last
//! `N` digits entered.

use heapless::Vec;

/// Outcome of one key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HexKey {
    /// Digit accepted; echo this (upper-cased) character
    Echo(u8),
    /// Key ignored
    Ignored,
    /// Enter pressed
    Done,
}

/// Up to `N` hex digits typed by the operator
#[derive(Debug, Clone, Default)]
pub struct HexInput<const N: usize> {
    digits: Vec<u8, N>,
}

impl<const N: usize> HexInput<N> {
    /// Create an empty entry
    pub fn new() -> Self {
        Self { digits: Vec::new() }
    }

    /// Process one key
    pub fn push(&mut self, c: u8) -> HexKey {
        match c {
            b'\r' | b'\n' => HexKey::Done,
            c if c.is_ascii_hexdigit() => {
                let c = c.to_ascii_uppercase();
                if self.digits.push(c).is_err() && !self.digits.is_empty() {
                    // Full: shift out the oldest digit
                    self.digits.rotate_left(1);
                    if let Some(last) = self.digits.last_mut() {
                        *last = c;
                    }
                }
                HexKey::Echo(c)
            }
            _ => HexKey::Ignored,
        }
    }

    /// Digits entered so far
    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    /// Check if nothing was entered
    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// Entered value, or `default` when nothing was typed
    pub fn value_or(&self, default: u32) -> u32 {
        if self.digits.is_empty() {
            return default;
        }
        self.digits.iter().fold(0u32, |acc, &c| {
            (acc << 4) | atprog_protocol::hex_char_to_int(c) as u32
        })
    }

    /// Discard entered digits
    pub fn clear(&mut self) {
        self.digits.clear();
    }
}
