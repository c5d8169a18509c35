use crate::error::{Error, Result};

/// Fixed-capacity store of numeric columns that overwrites its oldest
/// column once full.
///
/// Storage is column-major: each column is one contiguous run of `height`
/// values, so appends and the chronological views are plain slices.
///
/// The store itself is single-owner state. If a renderer on another thread
/// reads `buffers()` while the processing thread appends, the caller must
/// wrap the store in its own lock; see [`crate::view::SpectrogramView`].
pub struct ColumnHistory {
    width: usize,
    height: usize,
    data: Vec<f32>,
    // Ranges over [0, width]: a completed cycle parks the cursor at
    // `width` so the whole grid reads as newest data, and the next
    // append wraps back to column 0.
    cursor: usize,
}

impl ColumnHistory {
    pub fn new(width: usize, height: usize, fill: f32) -> Self {
        assert!(width >= 1 && height >= 1);
        Self {
            width,
            height,
            data: vec![fill; width * height],
            cursor: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Overwrites the column at the cursor and advances it, wrapping at
    /// `width`.
    pub fn append(&mut self, column: &[f32]) -> Result<()> {
        if column.len() != self.height {
            return Err(Error::ColumnLength {
                got: column.len(),
                expected: self.height,
            });
        }
        if self.cursor == self.width {
            self.cursor = 0;
        }
        let start = self.cursor * self.height;
        self.data[start..start + self.height].copy_from_slice(column);
        self.cursor += 1;
        Ok(())
    }

    /// Returns `(older, newer)` views; concatenating them yields every
    /// column oldest-to-newest. Before the first append, `older` spans the
    /// full width of fill values and `newer` is empty; after exactly
    /// `width` appends the roles are swapped.
    pub fn buffers(&self) -> (ColumnsView<'_>, ColumnsView<'_>) {
        let split = self.cursor * self.height;
        (
            ColumnsView {
                data: &self.data[split..],
                height: self.height,
            },
            ColumnsView {
                data: &self.data[..split],
                height: self.height,
            },
        )
    }
}

/// Borrowed run of chronologically ordered columns.
#[derive(Debug, Clone, Copy)]
pub struct ColumnsView<'a> {
    data: &'a [f32],
    height: usize,
}

impl<'a> ColumnsView<'a> {
    pub fn width(&self) -> usize {
        self.data.len() / self.height
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn column(&self, index: usize) -> &'a [f32] {
        &self.data[index * self.height..(index + 1) * self.height]
    }

    pub fn columns(&self) -> impl Iterator<Item = &'a [f32]> {
        self.data.chunks(self.height)
    }

    /// The underlying column-major values, one contiguous run per column.
    pub fn samples(&self) -> &'a [f32] {
        self.data
    }
}
