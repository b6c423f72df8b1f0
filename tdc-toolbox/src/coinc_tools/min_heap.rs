use crate::Tick;

/// Binary min-heap over `(tof, channel)` pairs.
///
/// The merge needs the smallest pending timestamp at every step, with equal
/// timestamps resolved to the lowest channel id so the merge order is
/// deterministic. Lexicographic tuple order gives exactly that key, and the
/// heap never holds more than one entry per stream.
pub(super) struct MinHeap {
    items: Vec<(Tick, u32)>,
}

impl MinHeap {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, tof: Tick, channel: u32) {
        self.items.push((tof, channel));
        self.sift_up(self.items.len() - 1);
    }

    pub fn pop(&mut self) -> Option<(Tick, u32)> {
        if self.items.is_empty() {
            return None;
        }
        let top = self.items.swap_remove(0);
        if !self.items.is_empty() {
            self.sift_down(0);
        }
        Some(top)
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if self.items[idx] >= self.items[parent] {
                break;
            }
            self.items.swap(idx, parent);
            idx = parent;
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        loop {
            let left = 2 * idx + 1;
            if left >= self.items.len() {
                break;
            }
            let right = left + 1;
            let mut smallest = left;
            if right < self.items.len() && self.items[right] < self.items[left] {
                smallest = right;
            }
            if self.items[idx] <= self.items[smallest] {
                break;
            }
            self.items.swap(idx, smallest);
            idx = smallest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_ascending_time_order() {
        let mut heap = MinHeap::with_capacity(4);
        for &(tof, ch) in &[(30, 0), (10, 1), (20, 2), (5, 3)] {
            heap.push(tof, ch);
        }
        let mut popped = Vec::new();
        while let Some(item) = heap.pop() {
            popped.push(item);
        }
        assert_eq!(popped, vec![(5, 3), (10, 1), (20, 2), (30, 0)]);
    }

    #[test]
    fn equal_timestamps_pop_the_lowest_channel_first() {
        let mut heap = MinHeap::with_capacity(4);
        heap.push(10, 3);
        heap.push(10, 0);
        heap.push(10, 2);
        heap.push(10, 1);
        assert_eq!(heap.pop(), Some((10, 0)));
        assert_eq!(heap.pop(), Some((10, 1)));
        assert_eq!(heap.pop(), Some((10, 2)));
        assert_eq!(heap.pop(), Some((10, 3)));
        assert_eq!(heap.pop(), None);
    }

    #[test]
    fn interleaved_push_and_pop_keeps_the_order() {
        let mut heap = MinHeap::with_capacity(2);
        heap.push(5, 0);
        heap.push(3, 1);
        assert_eq!(heap.pop(), Some((3, 1)));
        heap.push(1, 1);
        assert_eq!(heap.pop(), Some((1, 1)));
        assert_eq!(heap.pop(), Some((5, 0)));
    }
}
