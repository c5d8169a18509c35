pub mod history;
pub mod lut;

pub use history::{ColumnHistory, ColumnsView};
pub use lut::ColorLut;
