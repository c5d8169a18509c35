//! Error types for the waterfall pipeline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("LUT has no entries")]
    EmptyTable,

    #[error("LUT row must have 4 channels: {0}")]
    ChannelCount(usize),

    #[error("vmin equals vmax but the LUT has {0} entries")]
    DegenerateRange(usize),

    #[error("invalid map range: {vmin} to {vmax}")]
    InvalidRange { vmin: f32, vmax: f32 },

    #[error("source and destination have mismatched sizes: {source_len} vs {dest_len}")]
    SizeMismatch { source_len: usize, dest_len: usize },

    #[error("column length {got} does not match history height {expected}")]
    ColumnLength { got: usize, expected: usize },

    #[error("analysis window length {got} does not match configured length {expected}")]
    WindowLength { got: usize, expected: usize },

    #[error("no input device available")]
    NoInputDevice,

    #[error("input device does not support f32 samples")]
    UnsupportedSampleFormat,

    #[error("failed to read device configuration")]
    DeviceConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build audio stream")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream")]
    PlayStream(#[from] cpal::PlayStreamError),
}

pub type Result<T> = core::result::Result<T, Error>;
