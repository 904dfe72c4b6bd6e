//! Texture projection matrix
//!
//! A texvec is a 2x4 matrix: one row each for the s and t axes, holding the
//! axis direction in the first three columns and the offset in the fourth.
//! Files store it row-major; in memory it is kept column-major so that a
//! column (one axis component for both s and t) is contiguous. Reading and
//! writing therefore go element by element.

use binrw::{BinRead, BinResult, BinWrite};
use std::io::{Read, Seek, Write};

/// Texture projection, stored column-major
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TexVec {
    columns: [[f32; 2]; 4],
}

impl TexVec {
    /// Build from the two on-disk rows
    pub fn from_rows(rows: [[f32; 4]; 2]) -> Self {
        let mut vec = Self::default();
        for (row, values) in rows.iter().enumerate() {
            for (col, value) in values.iter().enumerate() {
                vec.set(row, col, *value);
            }
        }
        vec
    }

    /// The two rows in file order
    pub fn rows(&self) -> [[f32; 4]; 2] {
        let mut rows = [[0.0; 4]; 2];
        for (row, values) in rows.iter_mut().enumerate() {
            for (col, value) in values.iter_mut().enumerate() {
                *value = self.at(row, col);
            }
        }
        rows
    }

    /// Element at `row` (0 = s, 1 = t) and `col` (0..3 axis, 3 offset)
    pub fn at(&self, row: usize, col: usize) -> f32 {
        self.columns[col][row]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        self.columns[col][row] = value;
    }

    /// Texture-space coordinates of a world position, in texels
    pub fn uvs(&self, pos: [f32; 3]) -> [f32; 2] {
        let mut uv = [0.0; 2];
        for (row, out) in uv.iter_mut().enumerate() {
            *out = pos[0] * self.at(row, 0)
                + pos[1] * self.at(row, 1)
                + pos[2] * self.at(row, 2)
                + self.at(row, 3);
        }
        uv
    }

    /// [`Self::uvs`] normalised to a texture of `width` x `height`
    pub fn uvs_scaled(&self, pos: [f32; 3], width: u32, height: u32) -> [f32; 2] {
        let [u, v] = self.uvs(pos);
        [u / width as f32, v / height as f32]
    }
}

impl BinRead for TexVec {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let mut vec = Self::default();
        for row in 0..2 {
            for col in 0..4 {
                vec.set(row, col, f32::read_options(reader, endian, ())?);
            }
        }
        Ok(vec)
    }
}

impl BinWrite for TexVec {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        for row in 0..2 {
            for col in 0..4 {
                self.at(row, col).write_options(writer, endian, ())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_row_major() {
        let mut data = Vec::new();
        for value in 1..=8 {
            data.extend_from_slice(&(value as f32).to_le_bytes());
        }
        let vec = TexVec::read_le(&mut Cursor::new(&data)).expect("Test operation should succeed");
        // s row is 1..4, t row is 5..8
        assert_eq!(vec.at(0, 0), 1.0);
        assert_eq!(vec.at(0, 3), 4.0);
        assert_eq!(vec.at(1, 0), 5.0);
        assert_eq!(vec.at(1, 3), 8.0);
        assert_eq!(vec.columns[0], [1.0, 5.0]);

        let mut out = Cursor::new(Vec::new());
        vec.write_le(&mut out).expect("Test operation should succeed");
        assert_eq!(out.into_inner(), data);
    }

    #[test]
    fn test_uvs() {
        let vec = TexVec::from_rows([[1.0, 0.0, 0.0, 8.0], [0.0, -1.0, 0.0, 0.0]]);
        assert_eq!(vec.uvs([16.0, 32.0, 0.0]), [24.0, -32.0]);
        assert_eq!(vec.uvs_scaled([16.0, 32.0, 0.0], 64, 32), [0.375, -1.0]);
        assert_eq!(vec.rows()[0], [1.0, 0.0, 0.0, 8.0]);
    }
}
