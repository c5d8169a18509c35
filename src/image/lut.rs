use rayon::prelude::*;

use crate::error::{Error, Result};

// Granularity of the parallel split in `map`; each chunk is a few pixel
// columns' worth of work.
const MAP_CHUNK: usize = 4096;

/// Precomputed table mapping a bounded value range to packed colors.
///
/// Entries are RGBA rows packed into `u32` as alpha:red:green:blue from
/// most- to least-significant byte, in input order.
#[derive(Debug)]
pub struct ColorLut {
    entries: Vec<u32>,
}

impl ColorLut {
    /// Builds the table from RGBA rows, one row per level.
    pub fn from_table(table: &[Vec<u8>]) -> Result<Self> {
        if table.is_empty() {
            return Err(Error::EmptyTable);
        }
        let mut entries = Vec::with_capacity(table.len());
        for row in table {
            if row.len() != 4 {
                return Err(Error::ChannelCount(row.len()));
            }
            let (r, g, b, a) = (row[0], row[1], row[2], row[3]);
            entries.push(u32::from_be_bytes([a, r, g, b]));
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[u32] {
        &self.entries
    }

    /// Maps every value in `source` to a table entry in `dest`.
    ///
    /// Values are clamped to `[vmin, vmax]`, normalized, and truncated to
    /// an entry index; out-of-range inputs clamp rather than error. Work is
    /// split across threads since this runs once per rendered column over a
    /// screen-sized grid.
    ///
    /// `vmin` must not exceed `vmax` (a reversed or NaN range is
    /// rejected), and `vmin == vmax` is only meaningful for a
    /// single-entry table; with more entries the normalization is
    /// undefined and rejected.
    pub fn map(&self, vmin: f32, vmax: f32, source: &[f32], dest: &mut [u32]) -> Result<()> {
        if source.len() != dest.len() {
            return Err(Error::SizeMismatch {
                source_len: source.len(),
                dest_len: dest.len(),
            });
        }
        // NaN bounds fail this check too, keeping clamp() panic-free.
        if !(vmin <= vmax) {
            return Err(Error::InvalidRange { vmin, vmax });
        }
        if self.entries.len() > 1 && vmin == vmax {
            return Err(Error::DegenerateRange(self.entries.len()));
        }

        source
            .par_chunks(MAP_CHUNK)
            .zip(dest.par_chunks_mut(MAP_CHUNK))
            .for_each(|(source, dest)| self.map_chunk(vmin, vmax, source, dest));
        Ok(())
    }

    fn map_chunk(&self, vmin: f32, vmax: f32, source: &[f32], dest: &mut [u32]) {
        let n = self.entries.len();
        if n == 1 {
            dest.fill(self.entries[0]);
            return;
        }
        let scale = (n - 1) as f32 / (vmax - vmin);
        for (out, &value) in dest.iter_mut().zip(source) {
            let clamped = value.clamp(vmin, vmax);
            let index = ((clamped - vmin) * scale) as usize;
            *out = self.entries[index.min(n - 1)];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(rows: &[[u8; 4]]) -> Vec<Vec<u8>> {
        rows.iter().map(|r| r.to_vec()).collect()
    }

    #[test]
    fn empty_table_is_rejected() {
        let err = ColorLut::from_table(&[]).unwrap_err();
        assert!(matches!(err, Error::EmptyTable));
    }

    #[test]
    fn too_few_color_channels() {
        let err = ColorLut::from_table(&[vec![0, 0, 0]]).unwrap_err();
        assert!(matches!(err, Error::ChannelCount(3)));
    }

    #[test]
    fn too_many_color_channels() {
        let err = ColorLut::from_table(&[vec![0, 0, 0, 0, 0]]).unwrap_err();
        assert!(matches!(err, Error::ChannelCount(5)));
    }

    #[test]
    fn packs_single_entry() {
        let lut = ColorLut::from_table(&rows(&[[0x11, 0x22, 0x33, 0x44]])).unwrap();
        assert_eq!(lut.entries(), &[0x4411_2233]);
    }

    #[test]
    fn packs_entries_in_input_order() {
        let lut = ColorLut::from_table(&rows(&[
            [0x11, 0x22, 0x33, 0x44],
            [0x55, 0x66, 0x77, 0x88],
        ]))
        .unwrap();
        assert_eq!(lut.entries(), &[0x4411_2233, 0x8855_6677]);
    }

    #[test]
    fn map_single_entry_clamps_everything_to_it() {
        let lut = ColorLut::from_table(&rows(&[[0, 0, 1, 0]])).unwrap();
        let entry = lut.entries()[0];
        let source = [10.0, 12.5, 15.0, 20.0, 9.0, 21.0];
        let mut dest = [0u32; 6];
        lut.map(10.0, 20.0, &source, &mut dest).unwrap();
        assert_eq!(dest, [entry; 6]);
    }

    #[test]
    fn map_rounds_down_and_clamps_at_both_ends() {
        let lut = ColorLut::from_table(&rows(&[
            [0, 0, 1, 0],
            [0, 0, 2, 0],
            [0, 0, 3, 0],
            [0, 0, 4, 0],
        ]))
        .unwrap();
        let e = lut.entries();
        let source = [0.9, 1.0, 1.5, 1.75, 2.0, 2.1];
        let mut dest = [0u32; 6];
        lut.map(1.0, 2.0, &source, &mut dest).unwrap();
        assert_eq!(dest, [e[0], e[0], e[1], e[2], e[3], e[3]]);
    }

    #[test]
    fn map_size_mismatch_is_rejected() {
        let lut = ColorLut::from_table(&rows(&[[0, 0, 0, 255]])).unwrap();
        let mut dest = [0u32; 2];
        let err = lut.map(0.0, 1.0, &[0.0; 3], &mut dest).unwrap_err();
        assert!(matches!(
            err,
            Error::SizeMismatch {
                source_len: 3,
                dest_len: 2
            }
        ));
    }

    #[test]
    fn reversed_or_nan_range_is_rejected() {
        let lut = ColorLut::from_table(&rows(&[[0, 0, 0, 0], [255, 255, 255, 255]])).unwrap();
        let mut dest = [0u32; 2];
        let err = lut.map(2.0, 1.0, &[0.0, 3.0], &mut dest).unwrap_err();
        assert!(matches!(err, Error::InvalidRange { .. }));
        let err = lut.map(f32::NAN, 1.0, &[0.0, 3.0], &mut dest).unwrap_err();
        assert!(matches!(err, Error::InvalidRange { .. }));
    }

    #[test]
    fn degenerate_range_needs_single_entry() {
        let single = ColorLut::from_table(&rows(&[[1, 2, 3, 4]])).unwrap();
        let mut dest = [0u32; 2];
        single.map(5.0, 5.0, &[4.0, 6.0], &mut dest).unwrap();
        assert_eq!(dest, [single.entries()[0]; 2]);

        let multi =
            ColorLut::from_table(&rows(&[[0, 0, 0, 0], [255, 255, 255, 255]])).unwrap();
        let err = multi.map(5.0, 5.0, &[4.0, 6.0], &mut dest).unwrap_err();
        assert!(matches!(err, Error::DegenerateRange(2)));
    }

    #[test]
    fn map_spans_parallel_chunk_boundaries() {
        let lut = ColorLut::from_table(&rows(&[[0, 0, 0, 0], [255, 0, 0, 255]])).unwrap();
        let len = MAP_CHUNK * 2 + 17;
        let source: Vec<f32> = (0..len).map(|i| (i % 2) as f32).collect();
        let mut dest = vec![0u32; len];
        lut.map(0.0, 1.0, &source, &mut dest).unwrap();
        for (i, &value) in dest.iter().enumerate() {
            assert_eq!(value, lut.entries()[i % 2]);
        }
    }
}
