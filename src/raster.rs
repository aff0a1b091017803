//! Fixed-resolution 2D grid of aggregated cell values.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Row-major raster. Row 0 holds the lowest vertical coordinate.
///
/// Cell (row, col) covers the half-open window
///   u in [origin[0] + col * cell_size, origin[0] + (col + 1) * cell_size)
///   v in [origin[1] + row * cell_size, origin[1] + (row + 1) * cell_size)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RasterGrid {
    pub rows: usize,
    pub cols: usize,
    pub cell_size: f64,
    pub origin: [f64; 2],
    pub data: Vec<f64>,
}

impl RasterGrid {
    /// A grid with every cell set to 0.
    pub fn new(rows: usize, cols: usize, cell_size: f64, origin: [f64; 2]) -> Self {
        Self {
            rows,
            cols,
            cell_size,
            origin,
            data: vec![0.; rows * cols],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    /// Cell containing plane coordinate (u, v). Coordinates on the far edge of
    /// the grid fall into the last row/column; coordinates below the origin or
    /// non-finite are rejected.
    pub fn cell_of(&self, u: f64, v: f64) -> Option<(usize, usize)> {
        let col = self.axis_index(u - self.origin[0], self.cols)?;
        let row = self.axis_index(v - self.origin[1], self.rows)?;
        Some((row, col))
    }

    fn axis_index(&self, offset: f64, n: usize) -> Option<usize> {
        let i = (offset / self.cell_size).floor();
        if !i.is_finite() || i < 0. {
            return None;
        }
        Some((i as usize).min(n.saturating_sub(1)))
    }

    pub fn cell_area(&self) -> f64 {
        self.cell_size * self.cell_size
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    pub fn max(&self) -> f64 {
        self.data.iter().copied().fold(0., f64::max)
    }

    /// Number of cells holding a non-default value.
    pub fn occupied(&self) -> usize {
        self.data.iter().filter(|v| **v != 0.).count()
    }

    /// Rows from the highest vertical coordinate down, as an image is laid out.
    pub fn rows_top_down(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks(self.cols.max(1)).rev()
    }
}

impl Index<(usize, usize)> for RasterGrid {
    type Output = f64;
    fn index(&self, (r, c): (usize, usize)) -> &f64 {
        &self.data[r * self.cols + c]
    }
}

impl IndexMut<(usize, usize)> for RasterGrid {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut f64 {
        &mut self.data[r * self.cols + c]
    }
}
