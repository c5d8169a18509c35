use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::audio::{FrameAccumulator, PsdComputer, SampleChunk};
use crate::broadcast::{Received, Subscription};
use crate::config::{POLL_INTERVAL_MS, ViewConfig};
use crate::error::{Error, Result};
use crate::image::{ColorLut, ColumnHistory};
use crate::worker::{Step, Worker};

/// One viewer's processing pipeline: a worker thread drains a broadcast
/// subscription through the frame accumulator and PSD computer, appending
/// one column per analysis window to a rotating history.
///
/// The history lives behind a mutex shared between the worker and
/// [`render`](Self::render); that mutex is the lock the rendering side
/// must hold against concurrent appends.
pub struct SpectrogramView {
    history: Arc<Mutex<ColumnHistory>>,
    lut: ColorLut,
    frequencies: Vec<f32>,
    vmin: f32,
    vmax: f32,
    width: usize,
    height: usize,
    worker: Worker,
}

impl SpectrogramView {
    pub fn spawn(
        mut subscription: Subscription<SampleChunk>,
        sample_rate: u32,
        lut: ColorLut,
        config: &ViewConfig,
    ) -> Self {
        let mut framer = FrameAccumulator::new(config.window_len);
        let mut psd = PsdComputer::new(sample_rate, config.window_len, config.window_kind);
        let frequencies = psd.frequencies().to_vec();
        let width = config.history_width;
        let height = frequencies.len();
        let history = Arc::new(Mutex::new(ColumnHistory::new(
            width,
            height,
            config.fill_value,
        )));

        let shared = Arc::clone(&history);
        let poll = Duration::from_millis(POLL_INTERVAL_MS);
        let mut column = Vec::with_capacity(height);
        let worker = Worker::spawn("spectrogram-view", move || {
            match subscription.recv_timeout(poll) {
                Received::Value(chunk) => {
                    framer.push(&chunk);
                    while let Some(window) = framer.next_window() {
                        psd.compute(window, &mut column)
                            .expect("framer windows match the configured length");
                        shared
                            .lock()
                            .unwrap()
                            .append(&column)
                            .expect("PSD columns match the history height");
                    }
                    Step::Continue
                }
                Received::TimedOut => Step::Continue,
                Received::Closed => Step::Done,
            }
        });

        Self {
            history,
            lut,
            frequencies,
            vmin: config.vmin,
            vmax: config.vmax,
            width,
            height,
            worker,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bin center frequencies for this view's rows.
    pub fn frequencies(&self) -> &[f32] {
        &self.frequencies
    }

    /// Shared history for renderers that blit the raw columns themselves.
    /// Hold the mutex while reading `buffers()`; the worker takes it per
    /// append.
    pub fn history(&self) -> Arc<Mutex<ColumnHistory>> {
        Arc::clone(&self.history)
    }

    /// Colorizes the current history into `dest`, a `width * height`
    /// column-major grid of packed colors, oldest column first.
    pub fn render(&self, dest: &mut [u32]) -> Result<()> {
        if dest.len() != self.width * self.height {
            return Err(Error::SizeMismatch {
                source_len: self.width * self.height,
                dest_len: dest.len(),
            });
        }
        let history = self.history.lock().unwrap();
        let (older, newer) = history.buffers();
        let (left, right) = dest.split_at_mut(older.samples().len());
        self.lut.map(self.vmin, self.vmax, older.samples(), left)?;
        self.lut.map(self.vmin, self.vmax, newer.samples(), right)?;
        Ok(())
    }

    /// Stops the worker; no column is appended after this returns.
    pub fn close(&mut self) {
        self.worker.close();
    }
}
