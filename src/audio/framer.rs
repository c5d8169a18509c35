/// Re-chunks an unbounded stream of arbitrarily sized sample chunks into
/// fixed-length analysis windows.
///
/// Leftover samples carry over between calls; windows are contiguous and
/// non-overlapping, and a short window is never produced.
pub struct FrameAccumulator {
    window_len: usize,
    carry: Vec<f32>,
    window: Vec<f32>,
}

impl FrameAccumulator {
    pub fn new(window_len: usize) -> Self {
        assert!(window_len >= 1);
        Self {
            window_len,
            carry: Vec::with_capacity(window_len * 2),
            window: vec![0.0; window_len],
        }
    }

    pub fn window_len(&self) -> usize {
        self.window_len
    }

    /// Number of samples waiting for the next complete window.
    pub fn buffered(&self) -> usize {
        self.carry.len()
    }

    pub fn push(&mut self, chunk: &[f32]) {
        self.carry.extend_from_slice(chunk);
    }

    /// Slices the next complete window off the accumulated samples, or
    /// returns `None` if fewer than `window_len` are buffered.
    pub fn next_window(&mut self) -> Option<&[f32]> {
        if self.carry.len() < self.window_len {
            return None;
        }
        self.window.copy_from_slice(&self.carry[..self.window_len]);
        self.carry.drain(..self.window_len);
        Some(&self.window)
    }
}
