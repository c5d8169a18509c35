pub mod framer;
pub mod psd;
pub mod source;

pub use framer::FrameAccumulator;
pub use psd::{PsdComputer, WindowKind};
pub use source::{
    CaptureChunks, CaptureHandle, LoopingSource, SampleChunk, open_capture, open_capture_on,
    spawn_broadcast_loop,
};
