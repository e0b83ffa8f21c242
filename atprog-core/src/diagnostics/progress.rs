//! Progress ticks for ranged operations

use core::fmt;

/// Progress indicator for one offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProgressTick {
    /// 16 more bytes done
    Dot,
    /// 16 more bytes done, completing a 1 KiB line
    DotLineBreak,
}

impl fmt::Display for ProgressTick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressTick::Dot => f.write_str("."),
            ProgressTick::DotLineBreak => f.write_str(".\n"),
        }
    }
}

/// Tick to emit after processing `offset`, if any
pub fn progress_tick(offset: u16) -> Option<ProgressTick> {
    if offset & 0x3FF == 0x3FF {
        Some(ProgressTick::DotLineBreak)
    } else if offset & 0x0F == 0x0F {
        Some(ProgressTick::Dot)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_positions() {
        assert_eq!(progress_tick(0x00), None);
        assert_eq!(progress_tick(0x0E), None);
        assert_eq!(progress_tick(0x0F), Some(ProgressTick::Dot));
        assert_eq!(progress_tick(0x3EF), Some(ProgressTick::Dot));
        assert_eq!(progress_tick(0x3FF), Some(ProgressTick::DotLineBreak));
        assert_eq!(progress_tick(0x7FFF), Some(ProgressTick::DotLineBreak));
    }

    #[test]
    fn test_one_line_per_kib() {
        let ticks: Vec<ProgressTick> = (0u16..0x400).filter_map(progress_tick).collect();
        assert_eq!(ticks.len(), 64);
        assert_eq!(ticks.last(), Some(&ProgressTick::DotLineBreak));
    }
}
