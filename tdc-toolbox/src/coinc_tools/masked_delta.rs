use crate::coinc_tools::{debug_assert_ascending, BinSpec};
use crate::errors::Error;
use crate::Tick;

struct MaskedDelta<'a> {
    starts: &'a [Tick],
    stops: &'a [Tick],
    spec: BinSpec,
}

/// Result from the masked delta algorithm
///
/// The masks are aligned 1:1 with the input sequences; an entry is `true`
/// iff that timestamp was part of at least one recorded pair.
pub struct MaskedDeltaResult {
    pub t: Vec<f64>,
    pub hist: Vec<u64>,
    pub start_mask: Vec<bool>,
    pub stop_mask: Vec<bool>,
}

/// Parameters for the masked delta algorithm
///
/// # Parameters
///    - bins: Number of histogram bins
///    - bin_width_ns: Width of one histogram bin in nanoseconds
#[derive(Debug, Copy, Clone)]
pub struct MaskedDeltaParams {
    pub bins: usize,
    pub bin_width_ns: f64,
}

impl Default for MaskedDeltaParams {
    fn default() -> Self {
        Self {
            bins: 500,
            bin_width_ns: 2.0,
        }
    }
}

impl<'a> MaskedDelta<'a> {
    fn compute(self) -> (Vec<u64>, Vec<bool>, Vec<bool>) {
        let mut histogram = vec![0u64; self.spec.bins];
        let mut start_mask = vec![false; self.starts.len()];
        let mut stop_mask = vec![false; self.stops.len()];

        // Same monotonic cursor as the plain delta scan.
        let mut cursor = 0;
        for (start_idx, &start) in self.starts.iter().enumerate() {
            while cursor < self.stops.len() && self.stops[cursor] < start {
                cursor += 1;
            }
            if cursor == self.stops.len() {
                break;
            }
            let delta = self.stops[cursor] - start;
            if delta < self.spec.max_range {
                histogram[(delta / self.spec.bin_width) as usize] += 1;
                start_mask[start_idx] = true;
                stop_mask[cursor] = true;
            }
        }
        (histogram, start_mask, stop_mask)
    }
}

/// The delta histogram plus per-timestamp participation masks.
///
/// Identical scan to [`delta`](crate::coinc_tools::delta::delta), but every
/// recorded pair additionally flags both of its members in the output masks.
///
/// The masks exist to chain correlation stages: a third-order analysis run on
/// the raw streams would count every uncorrelated background event against
/// the heralds and inflate the accidental rate, so the caller first filters
/// the streams down to the timestamps that took part in a pairwise
/// coincidence and feeds only those into the next pass.
pub fn masked_delta(
    starts: &[Tick],
    stops: &[Tick],
    params: &MaskedDeltaParams,
) -> Result<MaskedDeltaResult, Error> {
    let spec = BinSpec::new(params.bins, params.bin_width_ns)?;
    debug_assert_ascending(starts);
    debug_assert_ascending(stops);

    let t = spec.time_axis();
    let (hist, start_mask, stop_mask) = MaskedDelta {
        starts,
        stops,
        spec,
    }
    .compute();
    Ok(MaskedDeltaResult {
        t,
        hist,
        start_mask,
        stop_mask,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coinc_tools::delta::{delta, DeltaParams};
    use crate::TICKS_PER_NS;

    fn ns(timestamps: &[u64]) -> Vec<Tick> {
        timestamps.iter().map(|&t| t * TICKS_PER_NS).collect()
    }

    #[test]
    fn participants_are_flagged() {
        let params = MaskedDeltaParams {
            bins: 5,
            bin_width_ns: 2.0,
        };
        let result = masked_delta(&ns(&[0, 10, 20]), &ns(&[5, 12, 50]), &params).unwrap();
        assert_eq!(result.hist, vec![0, 1, 1, 0, 0]);
        assert_eq!(result.start_mask, vec![true, true, false]);
        assert_eq!(result.stop_mask, vec![true, true, false]);
    }

    #[test]
    fn histogram_matches_the_unmasked_scan() {
        let starts = ns(&[0, 4, 7, 7, 19, 30]);
        let stops = ns(&[1, 5, 9, 21, 33, 40]);
        let masked = masked_delta(
            &starts,
            &stops,
            &MaskedDeltaParams {
                bins: 6,
                bin_width_ns: 2.0,
            },
        )
        .unwrap();
        let plain = delta(
            &starts,
            &stops,
            &DeltaParams {
                bins: 6,
                bin_width_ns: 2.0,
            },
        )
        .unwrap();
        assert_eq!(masked.hist, plain.hist);
    }

    #[test]
    fn shared_stop_is_flagged_once_for_both_starts() {
        let params = MaskedDeltaParams {
            bins: 5,
            bin_width_ns: 2.0,
        };
        let result = masked_delta(&ns(&[0, 0]), &ns(&[5]), &params).unwrap();
        assert_eq!(result.hist.iter().sum::<u64>(), 2);
        assert_eq!(result.start_mask, vec![true, true]);
        assert_eq!(result.stop_mask, vec![true]);
    }

    #[test]
    fn no_pairs_leaves_the_masks_clear() {
        let params = MaskedDeltaParams {
            bins: 2,
            bin_width_ns: 1.0,
        };
        let result = masked_delta(&ns(&[0, 1]), &ns(&[100, 200]), &params).unwrap();
        assert_eq!(result.hist, vec![0, 0]);
        assert!(result.start_mask.iter().all(|&m| !m));
        assert!(result.stop_mask.iter().all(|&m| !m));
    }

    #[test]
    fn mask_lengths_follow_the_inputs_even_when_empty() {
        let params = MaskedDeltaParams {
            bins: 2,
            bin_width_ns: 1.0,
        };
        let result = masked_delta(&[], &ns(&[1, 2, 3]), &params).unwrap();
        assert!(result.start_mask.is_empty());
        assert_eq!(result.stop_mask.len(), 3);
    }
}
