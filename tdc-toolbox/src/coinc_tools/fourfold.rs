use crate::coinc_tools::coincidence_window::CoincidenceWindow;
use crate::coinc_tools::window_ticks;
use crate::errors::Error;
use crate::{Event, NUM_CHANNELS};

/// Parameters for the coincidence counters
///
/// # Parameters
///    - coincw_ns: Width of the coincidence window in nanoseconds
#[derive(Debug, Copy, Clone)]
pub struct CoincidenceParams {
    pub coincw_ns: f64,
}

const PATTERN_MASK: u32 = (1 << NUM_CHANNELS) - 1;

/// Counts 4-fold coincidences in one interleaved event sequence.
///
/// ## Parameters
///
/// The parameters to the algorithm are passed via a `CoincidenceParams`
/// struct that contains the following:
///    - coincw_ns: Width of the coincidence window in nanoseconds,
///
/// The event sequence must be sorted ascending in `tof`.
///
/// ## Algorithm description
///
/// A coincidence is a set of four detections, one per channel, that all fall
/// within `coincw_ns` of each other. Rather than searching for such sets,
/// the counter slides a trailing window over the sequence: events older than
/// the window are evicted from a FIFO (an event aged exactly `coincw_ns` is
/// already out), and each arriving detection adds the product of the other
/// three channels' active counts to the total. That product is exactly the
/// number of new sets this detection completes, so every set is counted
/// once, when its last member arrives. The whole pass is O(N) amortized and
/// the total is accumulated in 64 bits, which high event rates need.
///
/// Rollover and dummy records carry an empty channel pattern and do not
/// participate; pattern bits above the channel count are ignored.
pub fn count_coincidences(events: &[Event], params: &CoincidenceParams) -> Result<u64, Error> {
    let width = window_ticks(params.coincw_ns)?;
    debug_assert!(
        events.windows(2).all(|w| w[0].tof <= w[1].tof),
        "event sequence must be non-decreasing in tof"
    );

    let mut window = CoincidenceWindow::new(width, NUM_CHANNELS);
    for event in events {
        let pattern = event.pattern as u32 & PATTERN_MASK;
        if pattern == 0 {
            continue;
        }
        window.record(event.tof, pattern);
    }
    Ok(window.total())
}
