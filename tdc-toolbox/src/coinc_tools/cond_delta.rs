use crate::coinc_tools::{debug_assert_ascending, BinSpec};
use crate::errors::Error;
use crate::Tick;

struct CondDelta<'a> {
    heralds: &'a [Tick],
    signal_2: &'a [Tick],
    signal_3: &'a [Tick],
    spec: BinSpec,
}

/// Result from the conditional delta algorithm
///
/// All four histograms share the time axis `t`.
///    - hist_h2: delay of the nearest signal-2 event after each herald
///    - hist_h3: delay of the nearest signal-3 event after each herald
///    - hist_23: delay from that signal-2 event to the nearest signal-3
///      event, for heralds where signal 2 arrived first
///    - hist_32: delay from the signal-3 event to the signal-2 event, for
///      heralds where signal 3 arrived first
pub struct CondDeltaResult {
    pub t: Vec<f64>,
    pub hist_h2: Vec<u64>,
    pub hist_h3: Vec<u64>,
    pub hist_23: Vec<u64>,
    pub hist_32: Vec<u64>,
}

/// Parameters for the conditional delta algorithm
///
/// # Parameters
///    - bins: Number of histogram bins
///    - bin_width_ns: Width of one histogram bin in nanoseconds
#[derive(Debug, Copy, Clone)]
pub struct CondDeltaParams {
    pub bins: usize,
    pub bin_width_ns: f64,
}

impl Default for CondDeltaParams {
    fn default() -> Self {
        Self {
            bins: 500,
            bin_width_ns: 2.0,
        }
    }
}

/// One ordered scan over the herald sequence.
///
/// `first` and `second` are the two signal sequences in the ordering this
/// pass resolves. Returns the histogram of `first` delays relative to the
/// heralds and the histogram of `second - first` delays for heralds where
/// both signals qualified and `second` did not precede `first`.
///
/// The cursors live and die inside this function. Each pass must start from
/// fresh cursor state; sharing a cursor between the two passes silently
/// corrupts the histograms because the second pass would resume from
/// positions that belong to the other signal ordering.
fn ordered_scan(
    heralds: &[Tick],
    first: &[Tick],
    second: &[Tick],
    spec: &BinSpec,
) -> (Vec<u64>, Vec<u64>) {
    let mut hist_first = vec![0u64; spec.bins];
    let mut hist_pair = vec![0u64; spec.bins];

    let mut cursor_first = 0;
    let mut cursor_second = 0;
    for &herald in heralds {
        while cursor_first < first.len() && first[cursor_first] < herald {
            cursor_first += 1;
        }
        if cursor_first == first.len() {
            // Nothing recordable remains in this pass; both outputs need
            // the first signal.
            break;
        }
        let b = first[cursor_first];
        let delta_first = b - herald;
        if delta_first >= spec.max_range {
            continue;
        }
        hist_first[(delta_first / spec.bin_width) as usize] += 1;

        while cursor_second < second.len() && second[cursor_second] < herald {
            cursor_second += 1;
        }
        if cursor_second == second.len() {
            continue;
        }
        let c = second[cursor_second];
        // Both signals sit within the herald window; this pass only records
        // the ordering where `first` is not preceded by `second`.
        if c - herald < spec.max_range && c >= b {
            hist_pair[((c - b) / spec.bin_width) as usize] += 1;
        }
    }
    (hist_first, hist_pair)
}

impl<'a> CondDelta<'a> {
    fn compute(self) -> (Vec<u64>, Vec<u64>, Vec<u64>, Vec<u64>) {
        // Two independent passes, one per signal ordering. Each call owns
        // its cursor state.
        let (hist_h2, hist_23) = ordered_scan(self.heralds, self.signal_2, self.signal_3, &self.spec);
        let (hist_h3, hist_32) = ordered_scan(self.heralds, self.signal_3, self.signal_2, &self.spec);
        (hist_h2, hist_h3, hist_23, hist_32)
    }
}

/// Heralded correlation histograms between three channels.
///
/// ## Parameters
///
/// The parameters to the algorithm are passed via a `CondDeltaParams` struct
/// that contains the following:
///    - bins: Number of histogram bins,
///    - bin_width_ns: Width of one histogram bin in nanoseconds,
///
/// All three timestamp sequences must be sorted ascending.
///
/// ## Algorithm description
///
/// For a heralded single-photon measurement the herald channel provides the
/// reference time and the two signal channels are not intrinsically ordered:
/// either one may fire first after a given herald. Resolving which signal was
/// causally nearer the herald is what makes unbiased triple statistics
/// possible, so the analysis runs twice, once per ordering.
///
/// Each pass uses the same monotonic cursor technique as the pairwise delta
/// scan, with one cursor per signal sequence. For every herald the nearest
/// in-window event of the leading signal is recorded against the herald;
/// when the trailing signal also has an in-window event that did not precede
/// the leading one, their separation is recorded into the pass's pair
/// histogram. Signal events arriving at exactly the same timetag are
/// recorded by both passes at zero delay.
///
/// The two passes are not interchangeable: the first produces `hist_h2` and
/// `hist_23`, the second `hist_h3` and `hist_32`. Callers must not assume
/// symmetry between them.
pub fn cond_delta(
    heralds: &[Tick],
    signal_2: &[Tick],
    signal_3: &[Tick],
    params: &CondDeltaParams,
) -> Result<CondDeltaResult, Error> {
    let spec = BinSpec::new(params.bins, params.bin_width_ns)?;
    debug_assert_ascending(heralds);
    debug_assert_ascending(signal_2);
    debug_assert_ascending(signal_3);

    let t = spec.time_axis();
    let (hist_h2, hist_h3, hist_23, hist_32) = CondDelta {
        heralds,
        signal_2,
        signal_3,
        spec,
    }
    .compute();
    Ok(CondDeltaResult {
        t,
        hist_h2,
        hist_h3,
        hist_23,
        hist_32,
    })
}
