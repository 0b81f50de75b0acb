//! Character grid geometry and DDRAM address mapping.
//!
//! The HD44780 is logically two 40-cell DDRAM lines. On 4-row modules the
//! visible rows interleave across them: row 0 and row 2 share the first
//! line, row 1 and row 3 the second.

use crate::error::ConfigError;

/// Largest row count the controller can drive.
pub const MAX_ROWS: usize = 4;

/// Largest column count the controller can drive (one full DDRAM line).
pub const MAX_COLS: usize = 40;

/// DDRAM start address of the second controller line.
const SECOND_LINE: u8 = 0x40;

/// Row/column counts and the DDRAM start address of every visible row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    cols: u8,
    rows: u8,
    row_offsets: [u8; MAX_ROWS],
}

impl Geometry {
    /// 20 columns × 4 rows.
    pub const LCD2004: Geometry = Geometry {
        cols: 20,
        rows: 4,
        row_offsets: [0x00, 0x40, 0x14, 0x54],
    };

    /// 16 columns × 2 rows.
    pub const LCD1602: Geometry = Geometry {
        cols: 16,
        rows: 2,
        row_offsets: [0x00, 0x40, 0x10, 0x50],
    };

    /// Build a geometry for a `cols` × `rows` module.
    ///
    /// Row offsets follow the standard HD44780 map
    /// `[0x00, 0x40, cols, 0x40 + cols]`.
    ///
    /// # Errors
    /// [`ConfigError::InvalidGeometry`] unless `1 <= rows <= 4` and
    /// `1 <= cols <= 40`, with at most 20 columns when more than two rows
    /// share the two DDRAM lines.
    pub const fn new(cols: u8, rows: u8) -> Result<Self, ConfigError> {
        if rows == 0 || rows as usize > MAX_ROWS || cols == 0 || cols as usize > MAX_COLS {
            return Err(ConfigError::InvalidGeometry);
        }
        if rows > 2 && cols as usize > MAX_COLS / 2 {
            return Err(ConfigError::InvalidGeometry);
        }

        Ok(Self {
            cols,
            rows,
            row_offsets: [0x00, SECOND_LINE, cols, SECOND_LINE + cols],
        })
    }

    /// Characters per row.
    pub const fn cols(&self) -> usize {
        self.cols as usize
    }

    /// Visible rows.
    pub const fn rows(&self) -> usize {
        self.rows as usize
    }

    /// DDRAM start addresses of the visible rows, top to bottom.
    pub fn row_offsets(&self) -> &[u8] {
        &self.row_offsets[..self.rows as usize]
    }

    /// Clip `(col, row)` into the visible grid.
    ///
    /// Out-of-range input is never an error; negative values land on 0,
    /// overlarge values on the last column/row.
    pub fn clamp(&self, col: i32, row: i32) -> (u8, u8) {
        let col = col.clamp(0, self.cols as i32 - 1) as u8;
        let row = row.clamp(0, self.rows as i32 - 1) as u8;
        (col, row)
    }

    /// DDRAM address of `(col, row)` after clamping.
    pub fn ddram_address(&self, col: i32, row: i32) -> u8 {
        let (col, row) = self.clamp(col, row);
        self.row_offsets[row as usize] + col
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::LCD2004
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lcd2004_matches_generated_map() {
        assert_eq!(Geometry::new(20, 4), Ok(Geometry::LCD2004));
        assert_eq!(Geometry::LCD2004.row_offsets(), &[0x00, 0x40, 0x14, 0x54]);
    }

    #[test]
    fn lcd1602_exposes_two_offsets() {
        assert_eq!(Geometry::new(16, 2), Ok(Geometry::LCD1602));
        assert_eq!(Geometry::LCD1602.row_offsets(), &[0x00, 0x40]);
    }

    #[test]
    fn rejects_unaddressable_sizes() {
        assert_eq!(Geometry::new(0, 4), Err(ConfigError::InvalidGeometry));
        assert_eq!(Geometry::new(20, 0), Err(ConfigError::InvalidGeometry));
        assert_eq!(Geometry::new(20, 5), Err(ConfigError::InvalidGeometry));
        assert_eq!(Geometry::new(41, 1), Err(ConfigError::InvalidGeometry));
        assert_eq!(Geometry::new(24, 4), Err(ConfigError::InvalidGeometry));
        assert!(Geometry::new(40, 2).is_ok());
    }

    #[test]
    fn clamp_keeps_every_input_on_the_grid() {
        let g = Geometry::LCD2004;
        for col in -50..50 {
            for row in -10..10 {
                let (c, r) = g.clamp(col, row);
                assert!((c as usize) < g.cols());
                assert!((r as usize) < g.rows());
            }
        }
        assert_eq!(g.clamp(-3, 9), (0, 3));
        assert_eq!(g.clamp(25, -1), (19, 0));
    }

    #[test]
    fn ddram_address_interleaves_rows() {
        let g = Geometry::LCD2004;
        assert_eq!(g.ddram_address(0, 0), 0x00);
        assert_eq!(g.ddram_address(0, 1), 0x40);
        assert_eq!(g.ddram_address(0, 2), 0x14);
        assert_eq!(g.ddram_address(19, 3), 0x67);
        assert_eq!(g.ddram_address(100, 100), 0x67);
    }
}
