use crate::audio::WindowKind;

pub const WINDOW_LEN: usize = 1024;
pub const HISTORY_WIDTH: usize = 1920;
pub const FILL_VALUE: f32 = 11.0;
pub const MAP_MIN: f32 = 10.0;
pub const MAP_MAX: f32 = 34.0;
pub const LUT_LEVELS: usize = 256;
pub const CAPTURE_CHUNK: usize = 1000;

/// How long a view worker waits on its subscription before re-checking for
/// shutdown. Bounds `close()` latency.
pub const POLL_INTERVAL_MS: u64 = 50;

/// Per-view settings for the analysis and history stages.
#[derive(Debug, Clone)]
pub struct ViewConfig {
    pub window_len: usize,
    pub history_width: usize,
    pub fill_value: f32,
    pub vmin: f32,
    pub vmax: f32,
    pub window_kind: WindowKind,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            window_len: WINDOW_LEN,
            history_width: HISTORY_WIDTH,
            fill_value: FILL_VALUE,
            vmin: MAP_MIN,
            vmax: MAP_MAX,
            window_kind: WindowKind::Rectangular,
        }
    }
}
