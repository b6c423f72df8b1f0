use crate::coinc_tools::{debug_assert_ascending, BinSpec};
use crate::errors::Error;
use crate::Tick;

struct Delta<'a> {
    starts: &'a [Tick],
    stops: &'a [Tick],
    spec: BinSpec,
}

/// Result from the delta algorithm
pub struct DeltaResult {
    pub t: Vec<f64>,
    pub hist: Vec<u64>,
}

/// Parameters for the delta algorithm
///
/// # Parameters
///    - bins: Number of histogram bins
///    - bin_width_ns: Width of one histogram bin in nanoseconds
#[derive(Debug, Copy, Clone)]
pub struct DeltaParams {
    pub bins: usize,
    pub bin_width_ns: f64,
}

impl Default for DeltaParams {
    fn default() -> Self {
        Self {
            bins: 500,
            bin_width_ns: 2.0,
        }
    }
}

impl<'a> Delta<'a> {
    fn compute(self) -> Vec<u64> {
        let mut histogram = vec![0u64; self.spec.bins];

        // The cursor only ever moves forward. Every stop is skipped at most
        // once across all outer iterations, so the whole scan is O(N1 + N2).
        let mut cursor = 0;
        for &start in self.starts {
            while cursor < self.stops.len() && self.stops[cursor] < start {
                cursor += 1;
            }
            if cursor == self.stops.len() {
                break;
            }
            // Subtraction cannot underflow: the cursor rests on the first
            // stop >= start.
            let delta = self.stops[cursor] - start;
            if delta < self.spec.max_range {
                histogram[(delta / self.spec.bin_width) as usize] += 1;
            }
        }
        histogram
    }
}

/// Computes the histogram of start-stop time differences between two channels.
///
/// ## Parameters
///
/// The parameters to the algorithm are passed via a `DeltaParams` struct that
/// contains the following:
///    - bins: Number of histogram bins,
///    - bin_width_ns: Width of one histogram bin in nanoseconds,
///
/// Both timestamp sequences must be sorted ascending; this is a precondition
/// that is only asserted in debug builds.
///
/// ## Algorithm description
///
/// For every start timestamp we want the delay to the causally nearest stop,
/// i.e. the earliest stop that arrived at or after it. Delays at or beyond
/// `bins * bin_width_ns` fall outside the correlation window and are not
/// recorded; negative delays cannot occur because stops earlier than the
/// start are never matched.
///
/// Because both sequences are time ordered, the stop that answers one start
/// can never sit before the stop that answered the previous start. A single
/// cursor into the stop sequence therefore advances monotonically over the
/// whole scan instead of restarting for every start, which brings the naive
/// O(N1 * N2) pairing down to amortized O(N1 + N2).
///
/// A stop is not consumed by being matched: the cursor only advances past
/// stops that are strictly earlier than the current start, so duplicate
/// starts resolve to the same stop.
///
/// ## Return
///
/// `t` holds the left bin edges in nanoseconds and `hist` the counts per bin.
pub fn delta(starts: &[Tick], stops: &[Tick], params: &DeltaParams) -> Result<DeltaResult, Error> {
    let spec = BinSpec::new(params.bins, params.bin_width_ns)?;
    debug_assert_ascending(starts);
    debug_assert_ascending(stops);

    let t = spec.time_axis();
    let hist = Delta {
        starts,
        stops,
        spec,
    }
    .compute();
    Ok(DeltaResult { t, hist })
}
