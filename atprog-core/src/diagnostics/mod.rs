//! Diagnostics built on the programming engine
//!
//! - Progress ticks for ranged operations
//! - Full chip test with six data patterns
//! - ROM image write and check

pub mod image;
pub mod pattern;
pub mod progress;
pub mod selftest;

pub use image::{check_image, write_image, ImageStep};
pub use pattern::TestPattern;
pub use progress::{progress_tick, ProgressTick};
pub use selftest::{run_full_test, test_segments, TestSummary};
