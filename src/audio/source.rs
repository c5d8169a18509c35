use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapRb};

use crate::broadcast::Broadcaster;
use crate::error::{Error, Result};
use crate::worker::{Step, Worker};

/// One chunk of mono samples. Chunk boundaries carry no meaning; the
/// framer re-chunks downstream regardless.
pub type SampleChunk = Vec<f32>;

/// Drives a chunk source on its own thread, broadcasting each chunk.
/// When the source ends, subscribers get the close sentinel and the worker
/// finishes on its own.
pub fn spawn_broadcast_loop<I>(broadcaster: Broadcaster<SampleChunk>, mut source: I) -> Worker
where
    I: Iterator<Item = SampleChunk> + Send + 'static,
{
    Worker::spawn("sample-broadcast", move || match source.next() {
        Some(chunk) => {
            broadcaster.broadcast(chunk);
            Step::Continue
        }
        None => {
            broadcaster.close();
            Step::Done
        }
    })
}

/// Endlessly replays a sample buffer in fixed-size chunks, pacing each
/// chunk to real time at the nominal sample rate.
pub struct LoopingSource {
    samples: Vec<f32>,
    sample_rate: u32,
    chunk_len: usize,
    offset: usize,
}

impl LoopingSource {
    pub fn new(samples: Vec<f32>, sample_rate: u32, chunk_len: usize) -> Self {
        assert!(!samples.is_empty() && chunk_len >= 1);
        Self {
            samples,
            sample_rate,
            chunk_len,
            offset: 0,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl Iterator for LoopingSource {
    type Item = SampleChunk;

    fn next(&mut self) -> Option<SampleChunk> {
        let end = (self.offset + self.chunk_len).min(self.samples.len());
        let chunk = self.samples[self.offset..end].to_vec();
        self.offset = if end == self.samples.len() { 0 } else { end };
        thread::sleep(Duration::from_secs_f64(
            chunk.len() as f64 / self.sample_rate as f64,
        ));
        Some(chunk)
    }
}

/// Keeps the capture stream alive. Dropping it stops capture; the chunk
/// iterator then drains whatever is left in the ring and ends.
pub struct CaptureHandle {
    _stream: Stream,
    sample_rate: u32,
}

impl CaptureHandle {
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Consumer side of a live capture: drains the callback ring into
/// fixed-size chunks. Safe to move onto a broadcast worker thread.
pub struct CaptureChunks {
    consumer: HeapCons<f32>,
    sample_rate: u32,
    chunk_len: usize,
}

impl Iterator for CaptureChunks {
    type Item = SampleChunk;

    fn next(&mut self) -> Option<SampleChunk> {
        let mut chunk = vec![0.0; self.chunk_len];
        let mut filled = 0;
        while filled < self.chunk_len {
            filled += self.consumer.pop_slice(&mut chunk[filled..]);
            if filled == self.chunk_len {
                break;
            }
            if !self.consumer.write_is_held() {
                // Capture stopped. Drain once more in case samples landed
                // just before the producer went away, then yield whatever
                // is left as a short final chunk.
                filled += self.consumer.pop_slice(&mut chunk[filled..]);
                if filled == 0 {
                    return None;
                }
                chunk.truncate(filled);
                return Some(chunk);
            }
            // Wait roughly as long as the missing samples take to arrive
            // instead of spinning on the ring.
            let missing = self.chunk_len - filled;
            thread::sleep(Duration::from_secs_f64(
                missing as f64 / self.sample_rate as f64,
            ));
        }
        Some(chunk)
    }
}

/// Opens a capture stream on the default input device.
pub fn open_capture(chunk_len: usize) -> Result<(CaptureHandle, CaptureChunks)> {
    let host = cpal::default_host();
    let device = host.default_input_device().ok_or(Error::NoInputDevice)?;
    open_capture_on(&device, chunk_len)
}

/// Opens a mono f32 capture stream on `device`.
///
/// The audio callback averages interleaved channels down to mono and
/// pushes into an SPSC ring; it never blocks, so samples are dropped if
/// the consumer falls behind a full second of audio.
pub fn open_capture_on(device: &Device, chunk_len: usize) -> Result<(CaptureHandle, CaptureChunks)> {
    let config = device.default_input_config()?;
    if config.sample_format() != SampleFormat::F32 {
        return Err(Error::UnsupportedSampleFormat);
    }
    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;
    let stream_config: StreamConfig = config.into();

    let ring = HeapRb::<f32>::new(sample_rate as usize);
    let (mut producer, consumer) = ring.split();

    let stream = device.build_input_stream(
        &stream_config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            for frame in data.chunks(channels) {
                let sample = frame.iter().sum::<f32>() / frame.len() as f32;
                let _ = producer.try_push(sample);
            }
        },
        |err| eprintln!("Input stream error: {}", err),
        None,
    )?;
    stream.play()?;

    Ok((
        CaptureHandle {
            _stream: stream,
            sample_rate,
        },
        CaptureChunks {
            consumer,
            sample_rate,
            chunk_len,
        },
    ))
}
