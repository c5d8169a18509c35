use std::sync::Arc;

use rustfft::num_complex::Complex32;
use rustfft::{Fft, FftPlanner};

use crate::error::{Error, Result};

/// Analysis window applied before the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowKind {
    #[default]
    Rectangular,
    Hann,
}

impl WindowKind {
    fn coefficients(self, len: usize) -> Vec<f32> {
        match self {
            WindowKind::Rectangular => vec![1.0; len],
            WindowKind::Hann => apodize::hanning_iter(len).map(|x| x as f32).collect(),
        }
    }
}

/// Turns fixed-length analysis windows into normalized log-power columns.
///
/// One column holds `window_len / 2 + 1` one-sided spectrum bins. Power is
/// normalized so that conjugate-pair bins count their mirrored energy:
/// `2 / Σw²` per bin, except DC and (for even lengths) Nyquist which use
/// `1 / Σw²`. For the rectangular window `Σw²` is the window length.
/// `log2(1 + power)` compresses the dynamic range.
pub struct PsdComputer {
    window_len: usize,
    window: Vec<f32>,
    norm: Vec<f32>,
    frequencies: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    signal: Vec<Complex32>,
    scratch: Vec<Complex32>,
}

impl PsdComputer {
    pub fn new(sample_rate: u32, window_len: usize, kind: WindowKind) -> Self {
        assert!(window_len >= 1);
        let window = kind.coefficients(window_len);
        let energy: f32 = window.iter().map(|w| w * w).sum();

        let bins = window_len / 2 + 1;
        let mut norm = vec![2.0 / energy; bins];
        norm[0] = 1.0 / energy;
        if window_len % 2 == 0 {
            // Only even lengths have a distinct Nyquist bin without a
            // conjugate pair.
            norm[bins - 1] = 1.0 / energy;
        }

        let nyquist = sample_rate as f32 / 2.0;
        let frequencies = (0..bins)
            .map(|i| {
                if bins == 1 {
                    0.0
                } else {
                    nyquist * i as f32 / (bins - 1) as f32
                }
            })
            .collect();

        let fft = FftPlanner::new().plan_fft_forward(window_len);
        let scratch = vec![Complex32::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Self {
            window_len,
            window,
            norm,
            frequencies,
            signal: vec![Complex32::new(0.0, 0.0); window_len],
            scratch,
            fft,
        }
    }

    /// Bin center frequencies, evenly spaced from 0 to Nyquist.
    pub fn frequencies(&self) -> &[f32] {
        &self.frequencies
    }

    pub fn bin_count(&self) -> usize {
        self.frequencies.len()
    }

    /// Computes one log-power column into `out`, reusing its allocation.
    pub fn compute(&mut self, samples: &[f32], out: &mut Vec<f32>) -> Result<()> {
        if samples.len() != self.window_len {
            return Err(Error::WindowLength {
                got: samples.len(),
                expected: self.window_len,
            });
        }

        for ((slot, &sample), &w) in self.signal.iter_mut().zip(samples).zip(&self.window) {
            *slot = Complex32::new(sample * w, 0.0);
        }
        self.fft.process_with_scratch(&mut self.signal, &mut self.scratch);

        out.clear();
        out.extend(
            self.signal[..self.frequencies.len()]
                .iter()
                .zip(&self.norm)
                .map(|(bin, &norm)| (1.0 + bin.norm_sqr() * norm).log2()),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn frequencies_span_zero_to_nyquist() {
        let psd = PsdComputer::new(8000, 8, WindowKind::Rectangular);
        assert_eq!(psd.frequencies(), &[0.0, 1000.0, 2000.0, 3000.0, 4000.0]);
    }

    #[test]
    fn odd_window_has_no_nyquist_bin() {
        let psd = PsdComputer::new(6000, 7, WindowKind::Rectangular);
        assert_eq!(psd.bin_count(), 4);
        assert_eq!(psd.frequencies(), &[0.0, 1000.0, 2000.0, 3000.0]);
    }

    #[test]
    fn dc_signal_lands_in_bin_zero() {
        let mut psd = PsdComputer::new(8000, 8, WindowKind::Rectangular);
        let mut column = Vec::new();
        psd.compute(&[1.0; 8], &mut column).unwrap();
        // |X_0|² = 64, DC normalization 1/8 → log2(1 + 8).
        assert!(close(column[0], 9.0f32.log2()));
        for &bin in &column[1..] {
            assert!(close(bin, 0.0));
        }
    }

    #[test]
    fn tone_lands_in_matching_bin_with_doubled_energy() {
        let mut psd = PsdComputer::new(8000, 8, WindowKind::Rectangular);
        let samples: Vec<f32> = (0..8)
            .map(|n| (std::f32::consts::TAU * 2.0 * n as f32 / 8.0).cos())
            .collect();
        let mut column = Vec::new();
        psd.compute(&samples, &mut column).unwrap();
        // |X_2|² = 16, conjugate-pair normalization 2/8 → log2(1 + 4).
        assert!(close(column[2], 5.0f32.log2()));
        for (i, &bin) in column.iter().enumerate() {
            if i != 2 {
                assert!(close(bin, 0.0), "bin {i} = {bin}");
            }
        }
    }

    #[test]
    fn alternating_signal_lands_in_nyquist_bin() {
        let mut psd = PsdComputer::new(8000, 8, WindowKind::Rectangular);
        let samples: Vec<f32> = (0..8).map(|n| if n % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let mut column = Vec::new();
        psd.compute(&samples, &mut column).unwrap();
        // |X_4|² = 64, Nyquist normalization 1/8 → log2(1 + 8).
        assert!(close(column[4], 9.0f32.log2()));
    }

    #[test]
    fn odd_length_dc_normalization() {
        let mut psd = PsdComputer::new(8000, 5, WindowKind::Rectangular);
        let mut column = Vec::new();
        psd.compute(&[1.0; 5], &mut column).unwrap();
        assert_eq!(column.len(), 3);
        // |X_0|² = 25, 1/5 → log2(1 + 5).
        assert!(close(column[0], 6.0f32.log2()));
    }

    #[test]
    fn wrong_window_length_is_rejected() {
        let mut psd = PsdComputer::new(8000, 8, WindowKind::Rectangular);
        let mut column = Vec::new();
        let err = psd.compute(&[0.0; 7], &mut column).unwrap_err();
        assert!(matches!(
            err,
            Error::WindowLength { got: 7, expected: 8 }
        ));
    }

    #[test]
    fn hann_window_keeps_tone_in_the_same_bin() {
        let len = 64;
        let tone = |n: usize| (std::f32::consts::TAU * 8.0 * n as f32 / len as f32).cos();
        let samples: Vec<f32> = (0..len).map(tone).collect();
        let mut column = Vec::new();

        let argmax = |column: &[f32]| {
            column
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(i, _)| i)
                .unwrap()
        };

        let mut rect = PsdComputer::new(8000, len, WindowKind::Rectangular);
        rect.compute(&samples, &mut column).unwrap();
        assert_eq!(argmax(&column), 8);

        let mut hann = PsdComputer::new(8000, len, WindowKind::Hann);
        hann.compute(&samples, &mut column).unwrap();
        assert_eq!(argmax(&column), 8);
    }
}
