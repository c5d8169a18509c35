//! Real-time scrolling spectrogram pipeline.
//!
//! Raw audio chunks fan out through a [`Broadcaster`] to any number of
//! independent views. Each view re-chunks the sample stream into fixed
//! analysis windows, computes a log-scaled power spectral density column
//! per window, and keeps a screen's worth of columns in a rotating history
//! that a renderer can colorize through a [`ColorLut`].

pub mod audio;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod image;
pub mod view;
pub mod worker;

pub use audio::{FrameAccumulator, PsdComputer, SampleChunk, WindowKind};
pub use broadcast::{Broadcaster, Received, Subscription};
pub use config::ViewConfig;
pub use error::{Error, Result};
pub use image::{ColorLut, ColumnHistory, ColumnsView};
pub use view::SpectrogramView;
pub use worker::{Step, Worker};
