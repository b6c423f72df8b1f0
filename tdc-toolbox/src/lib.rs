extern crate byteorder;

pub mod coinc_tools;
pub mod errors;
pub mod parsers;

/// Timestamps are fixed-point nanoseconds with 8 fractional bits, i.e. units
/// of 1/256 ns. This is the native resolution of the 4 ps timestamp units and
/// stays exact at timetag magnitudes where an f64 in nanoseconds no longer
/// can.
pub type Tick = u64;

/// Fixed-point scale of [`Tick`].
pub const TICKS_PER_NS: u64 = 256;

/// Number of detector inputs on the supported timestamp units.
pub const NUM_CHANNELS: usize = 4;

/// A single detection record.
///
/// `pattern` is a bitmask with one bit per detector channel; more than one
/// bit is set when several channels fire within the same timetag. Within any
/// one sequence `tof` is non-decreasing; the algorithms rely on this and do
/// not re-check it in release builds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Event {
    pub tof: Tick,
    pub pattern: u16,
}

/// Convert a duration in nanoseconds to fixed-point ticks.
#[inline]
pub fn ns_to_ticks(ns: f64) -> Tick {
    (ns * TICKS_PER_NS as f64).round() as Tick
}
