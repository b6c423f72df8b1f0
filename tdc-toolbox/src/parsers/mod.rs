pub mod a1;
pub mod hex;

use crate::{Event, Tick, NUM_CHANNELS};

/// Rollover dummy records flag bit 4 of the low event word.
pub(crate) const ROLLOVER_FLAG: u32 = 0b10000;
/// The detector channel pattern sits in the low 4 bits of the event word.
pub(crate) const PATTERN_MASK: u32 = 0xF;

/// Unpack a consolidated 64-bit event word into an [`Event`].
///
/// The upper 54 bits are the timetag in 1/256 ns units, which is the crate's
/// tick scale, so no rescaling happens here.
#[inline]
pub(crate) fn unpack_event(word: u64) -> Event {
    Event {
        tof: word >> 10,
        pattern: (word as u32 & PATTERN_MASK) as u16,
    }
}

/// Pack an [`Event`] back into its consolidated 64-bit word.
#[inline]
pub(crate) fn pack_event(event: &Event) -> u64 {
    (event.tof << 10) | (event.pattern as u32 & PATTERN_MASK) as u64
}

/// Consolidated, time-sorted event words: the on-disk layout every writer
/// shares.
pub(crate) fn consolidate_events(events: &[Event]) -> Vec<u64> {
    let mut words: Vec<u64> = events.iter().map(pack_event).collect();
    words.sort_unstable();
    words
}

/// Split an interleaved event sequence into per-channel timestamp arrays.
///
/// A timestamp lands in every channel whose pattern bit is set, so an event
/// that fired several detectors shows up in each of their streams. The
/// output order follows the input order, i.e. each stream stays sorted.
pub fn split_channels(events: &[Event]) -> [Vec<Tick>; NUM_CHANNELS] {
    let mut channels: [Vec<Tick>; NUM_CHANNELS] = Default::default();
    for event in events {
        for (channel, stream) in channels.iter_mut().enumerate() {
            if event.pattern & (1 << channel) != 0 {
                stream.push(event.tof);
            }
        }
    }
    channels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_split_by_pattern_bit() {
        let events = [
            Event { tof: 0, pattern: 0b0001 },
            Event { tof: 5, pattern: 0b0011 },
            Event { tof: 9, pattern: 0b1000 },
        ];
        let channels = split_channels(&events);
        assert_eq!(channels[0], vec![0, 5]);
        assert_eq!(channels[1], vec![5]);
        assert!(channels[2].is_empty());
        assert_eq!(channels[3], vec![9]);
    }

    #[test]
    fn event_words_unpack_to_tof_and_pattern() {
        let word = (1234u64 << 10) | 0b0101;
        let event = unpack_event(word);
        assert_eq!(event.tof, 1234);
        assert_eq!(event.pattern, 0b0101);
    }

    #[test]
    fn packing_inverts_unpacking() {
        let event = Event { tof: 987_654, pattern: 0b1001 };
        assert_eq!(unpack_event(pack_event(&event)), event);
    }

    #[test]
    fn consolidation_sorts_the_words() {
        let events = [
            Event { tof: 30, pattern: 0b0001 },
            Event { tof: 10, pattern: 0b0010 },
            Event { tof: 20, pattern: 0b0100 },
        ];
        let words = consolidate_events(&events);
        assert_eq!(
            words.iter().map(|&w| w >> 10).collect::<Vec<u64>>(),
            vec![10, 20, 30]
        );
    }
}
