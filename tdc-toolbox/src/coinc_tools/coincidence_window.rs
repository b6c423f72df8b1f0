use std::collections::VecDeque;

use crate::Tick;

/// Trailing-window state shared by the coincidence counters.
///
/// Keeps the events still inside the window `(t - width, t]` in arrival
/// order together with one active-detection count per channel, and
/// accumulates the number of complete coincidence sets as events are fed in.
/// Every event is pushed and evicted exactly once, so feeding a whole
/// sequence is O(N) amortized.
pub(super) struct CoincidenceWindow {
    width: Tick,
    fifo: VecDeque<(Tick, u32)>,
    active: Vec<u64>,
    total: u64,
}

impl CoincidenceWindow {
    pub fn new(width: Tick, n_channels: usize) -> Self {
        Self {
            width,
            fifo: VecDeque::new(),
            active: vec![0; n_channels],
            total: 0,
        }
    }

    /// Feed the next event. `pattern` has one bit per channel and must not
    /// carry bits beyond the channel count; events must arrive in
    /// non-decreasing `tof` order.
    #[inline]
    pub fn record(&mut self, tof: Tick, pattern: u32) {
        // Events aged exactly `width` fall out: the window is half open.
        while let Some(&(front_tof, front_pattern)) = self.fifo.front() {
            if tof - front_tof < self.width {
                break;
            }
            self.fifo.pop_front();
            let mut bits = front_pattern;
            while bits != 0 {
                self.active[bits.trailing_zeros() as usize] -= 1;
                bits &= bits - 1;
            }
        }

        // Each new detection on one channel combines exactly once with every
        // already-active combination of the remaining channels, so the
        // number of coincidence sets it completes is the product of the
        // other channels' active counts. Bits are folded in lowest first,
        // updating the counts as we go, so that an event carrying several
        // channels contributes exactly as the equivalent run of
        // single-channel events would.
        let mut bits = pattern;
        while bits != 0 {
            let channel = bits.trailing_zeros() as usize;
            let mut sets: u64 = 1;
            for (other, &count) in self.active.iter().enumerate() {
                if other != channel {
                    sets *= count;
                }
            }
            self.total += sets;
            self.active[channel] += 1;
            bits &= bits - 1;
        }
        self.fifo.push_back((tof, pattern));
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_full_set_counts_once() {
        let mut window = CoincidenceWindow::new(100, 4);
        for (tof, channel) in [(0, 0), (10, 1), (20, 2), (30, 3)] {
            window.record(tof, 1 << channel);
        }
        assert_eq!(window.total(), 1);
    }

    #[test]
    fn eviction_is_half_open_at_the_window_edge() {
        let mut window = CoincidenceWindow::new(100, 4);
        window.record(0, 0b0001);
        window.record(1, 0b0010);
        window.record(2, 0b0100);
        // exactly 100 old relative to the first event: it is already gone
        window.record(100, 0b1000);
        assert_eq!(window.total(), 0);

        let mut window = CoincidenceWindow::new(100, 4);
        window.record(0, 0b0001);
        window.record(1, 0b0010);
        window.record(2, 0b0100);
        window.record(99, 0b1000);
        assert_eq!(window.total(), 1);
    }

    #[test]
    fn one_event_can_carry_several_channels() {
        let mut window = CoincidenceWindow::new(100, 4);
        window.record(0, 0b1111);
        assert_eq!(window.total(), 1);
    }

    #[test]
    fn repeated_detections_multiply_the_set_count() {
        let mut window = CoincidenceWindow::new(100, 4);
        window.record(0, 0b0001);
        window.record(1, 0b0001);
        window.record(2, 0b0010);
        window.record(3, 0b0100);
        // two choices on channel 1 once the last channel completes the set
        window.record(4, 0b1000);
        assert_eq!(window.total(), 2);
    }
}
