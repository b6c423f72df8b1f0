use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::coinc_tools::debug_assert_ascending;
use crate::errors::Error;
use crate::{ns_to_ticks, Tick};

struct PeakFinder<'a> {
    series_1: &'a [Tick],
    series_2: &'a [Tick],
    params: PeakFinderParams,
}

/// Result from the peak finder algorithm
pub struct PeakFinderResult {
    /// Delay of series 2 relative to series 1 at the correlation peak, in
    /// nanoseconds.
    pub delay_ns: f64,
    pub t: Vec<f64>,
    pub correlation: Vec<f64>,
}

/// Parameters for the peak finder algorithm
///
/// # Parameters
///    - resolution_ns: Sample width used when folding the timestamps
///    - buffer_length: log2 of the number of samples in the folded signals
#[derive(Debug, Copy, Clone)]
pub struct PeakFinderParams {
    pub resolution_ns: f64,
    pub buffer_length: u32,
}

impl<'a> PeakFinder<'a> {
    fn compute(self, resolution: Tick) -> PeakFinderResult {
        let n = 1usize << self.params.buffer_length;

        let fold = |series: &[Tick]| {
            let mut signal = vec![Complex::new(0.0, 0.0); n];
            for &tof in series {
                let sample = ((tof / resolution) % n as u64) as usize;
                signal[sample].re += 1.0;
            }
            signal
        };
        let mut signal_1 = fold(self.series_1);
        let mut signal_2 = fold(self.series_2);

        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(n);
        fft.process(&mut signal_1);
        fft.process(&mut signal_2);

        // Cross-correlation through the frequency domain: conj(F1) * F2
        // back-transformed holds the correlation at every circular shift.
        let mut product: Vec<Complex<f64>> = signal_1
            .iter()
            .zip(&signal_2)
            .map(|(a, b)| a.conj() * b)
            .collect();
        planner.plan_fft_inverse(n).process(&mut product);

        // the inverse transform is unnormalized
        let correlation: Vec<f64> = product.iter().map(|c| c.re / n as f64).collect();
        let idx_max = correlation
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(idx, _)| idx)
            .unwrap_or(0);

        let t = (0..n)
            .map(|i| i as f64 * self.params.resolution_ns)
            .collect();
        PeakFinderResult {
            delay_ns: idx_max as f64 * self.params.resolution_ns,
            t,
            correlation,
        }
    }
}

/// Locates the relative delay between two click streams.
///
/// ## Parameters
///
/// The parameters to the algorithm are passed via a `PeakFinderParams`
/// struct that contains the following:
///    - resolution_ns: Sample width used when folding the timestamps,
///    - buffer_length: log2 of the number of samples in the folded signals,
///
/// ## Algorithm description
///
/// Two streams looking at the same click source through different cable and
/// processing delays are identical up to a time offset. To estimate that
/// offset each stream is resampled onto `2^buffer_length` samples of
/// `resolution_ns` width, folding timestamps beyond the buffer back to its
/// start, and the two sample vectors are circularly cross-correlated through
/// the frequency domain. The correlation peaks at the sample shift that best
/// overlays the streams, which is the delay of series 2 behind series 1.
///
/// The buffer folds, so delays are only resolved modulo
/// `2^buffer_length * resolution_ns`; pick a buffer that spans the largest
/// plausible delay. The resolution bounds the precision of the estimate: a
/// finer resolution sharpens the peak but needs a longer buffer to cover the
/// same delay range.
pub fn peak_finder(
    series_1: &[Tick],
    series_2: &[Tick],
    params: &PeakFinderParams,
) -> Result<PeakFinderResult, Error> {
    if !(params.resolution_ns > 0.0) {
        return Err(Error::InvalidResolution(params.resolution_ns));
    }
    let resolution = ns_to_ticks(params.resolution_ns);
    if resolution == 0 {
        return Err(Error::InvalidResolution(params.resolution_ns));
    }
    if params.buffer_length == 0 || params.buffer_length > 30 {
        return Err(Error::InvalidBufferLength(params.buffer_length));
    }
    debug_assert_ascending(series_1);
    debug_assert_ascending(series_2);

    Ok(PeakFinder {
        series_1,
        series_2,
        params: *params,
    }
    .compute(resolution))
}
