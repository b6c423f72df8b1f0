pub mod cond_delta;
pub mod delta;
pub mod fourfold;
pub mod masked_delta;
pub mod multi_stream;
pub mod peak_finder;

mod coincidence_window;
mod min_heap;

use crate::errors::Error;
use crate::{ns_to_ticks, Tick};

/// Histogram geometry shared by the delta algorithms.
///
/// `bin_width_ns` is quantized to whole ticks once at entry so the hot loops
/// run purely on integers; the correlation window is then exactly
/// `bins * bin_width` ticks, upper edge excluded.
#[derive(Debug, Copy, Clone)]
pub(crate) struct BinSpec {
    pub bins: usize,
    pub bin_width: Tick,
    pub max_range: Tick,
    pub bin_width_ns: f64,
}

impl BinSpec {
    pub fn new(bins: usize, bin_width_ns: f64) -> Result<Self, Error> {
        if bins == 0 {
            return Err(Error::InvalidBins);
        }
        if !(bin_width_ns > 0.0) {
            return Err(Error::InvalidBinWidth(bin_width_ns));
        }
        let bin_width = ns_to_ticks(bin_width_ns);
        if bin_width == 0 {
            return Err(Error::InvalidBinWidth(bin_width_ns));
        }
        Ok(Self {
            bins,
            bin_width,
            max_range: bins as Tick * bin_width,
            bin_width_ns,
        })
    }

    /// Left bin edges in nanoseconds.
    pub fn time_axis(&self) -> Vec<f64> {
        (0..self.bins).map(|i| i as f64 * self.bin_width_ns).collect()
    }
}

/// Convert and validate a coincidence window given in nanoseconds.
pub(crate) fn window_ticks(coincw_ns: f64) -> Result<Tick, Error> {
    if !(coincw_ns > 0.0) {
        return Err(Error::InvalidCoincidenceWindow(coincw_ns));
    }
    let window = ns_to_ticks(coincw_ns);
    if window == 0 {
        return Err(Error::InvalidCoincidenceWindow(coincw_ns));
    }
    Ok(window)
}

/// Sortedness is a documented precondition of every algorithm here; the scan
/// is only compiled into debug builds to keep the hot paths branch-free.
pub(crate) fn debug_assert_ascending(timestamps: &[Tick]) {
    debug_assert!(
        timestamps.windows(2).all(|w| w[0] <= w[1]),
        "timestamp sequence must be non-decreasing"
    );
}
