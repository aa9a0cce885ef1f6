//! Core traits for gandalf
//!
//! - [`Clock`]: calendar date source for zone serials

pub mod clock;

pub use clock::{Clock, FixedClock, SystemClock};
