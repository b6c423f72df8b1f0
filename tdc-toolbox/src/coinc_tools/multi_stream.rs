use crate::coinc_tools::coincidence_window::CoincidenceWindow;
use crate::coinc_tools::fourfold::CoincidenceParams;
use crate::coinc_tools::min_heap::MinHeap;
use crate::coinc_tools::{debug_assert_ascending, window_ticks};
use crate::errors::Error;
use crate::Tick;

/// Channel patterns are carried in a u32, one bit per stream.
const MAX_STREAMS: usize = 32;

/// Counts K-fold coincidences across separately recorded channel streams.
///
/// ## Parameters
///
/// The parameters to the algorithm are passed via a `CoincidenceParams`
/// struct that contains the following:
///    - coincw_ns: Width of the coincidence window in nanoseconds,
///
/// Every stream must be sorted ascending. At most 32 streams are supported.
///
/// ## Algorithm description
///
/// Each stream holds the timestamps of a single channel, so the interleaved
/// sequence the windowed counter wants never exists in memory. Instead the
/// streams are merged on the fly: a binary min-heap keyed on
/// `(tof, channel)` holds the next pending timestamp of every stream, the
/// smallest entry is popped, the owning stream refills its slot, and the
/// popped timestamp is fed to the same trailing-window state the
/// single-stream counter uses, as a one-bit pattern. Equal timestamps on
/// different channels pop lowest channel first, so the merge order, and with
/// it the count, is deterministic.
///
/// Merging costs O(N log K) for N events over K streams; the window update
/// stays O(1) amortized per event. For the same underlying detections this
/// returns exactly the total of
/// [`count_coincidences`](crate::coinc_tools::fourfold::count_coincidences)
/// on the interleaved sequence.
pub fn count_coincidences_multi(
    streams: &[&[Tick]],
    params: &CoincidenceParams,
) -> Result<u64, Error> {
    if streams.len() > MAX_STREAMS {
        return Err(Error::TooManyChannels {
            got: streams.len(),
            max: MAX_STREAMS,
        });
    }
    let width = window_ticks(params.coincw_ns)?;
    for stream in streams {
        debug_assert_ascending(stream);
    }

    let mut heap = MinHeap::with_capacity(streams.len());
    let mut next = vec![0usize; streams.len()];
    for (channel, stream) in streams.iter().enumerate() {
        if let Some(&tof) = stream.first() {
            heap.push(tof, channel as u32);
            next[channel] = 1;
        }
    }

    let mut window = CoincidenceWindow::new(width, streams.len());
    while let Some((tof, channel)) = heap.pop() {
        let idx = next[channel as usize];
        if let Some(&pending) = streams[channel as usize].get(idx) {
            heap.push(pending, channel);
            next[channel as usize] = idx + 1;
        }
        window.record(tof, 1 << channel);
    }
    Ok(window.total())
}
