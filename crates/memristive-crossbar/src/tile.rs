//! Tiles: fixed-size crossbar blocks covering a weight matrix.
//!
//! A weight matrix of `rows × cols` is partitioned into a grid of
//! `ceil(rows / tile_rows) × ceil(cols / tile_cols)` tiles. Every tile has
//! the full tile shape; cells beyond the matrix edge are padding and hold no
//! device (they read as zero conductance).

use memristive_devices::{DeviceId, Memristor, ModelConfig, Polarity};
use nalgebra::DMatrix;

use crate::error::{Error, Result};
use crate::scheme::Scheme;

/// Partition of a logical `rows × cols` matrix into tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    rows: usize,
    cols: usize,
    tile_shape: (usize, usize),
    grid_shape: (usize, usize),
}

impl TileGrid {
    /// Partition `rows × cols` into tiles of `tile_shape`.
    pub fn new(rows: usize, cols: usize, tile_shape: (usize, usize)) -> Result<Self> {
        if tile_shape.0 == 0 || tile_shape.1 == 0 {
            return Err(Error::Configuration(format!(
                "tile shape must be non-zero, got {:?}",
                tile_shape
            )));
        }
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidShape(format!(
                "cannot tile an empty {}x{} matrix",
                rows, cols
            )));
        }
        Ok(Self {
            rows,
            cols,
            tile_shape,
            grid_shape: (rows.div_ceil(tile_shape.0), cols.div_ceil(tile_shape.1)),
        })
    }

    /// Logical `(rows, cols)` covered by the grid.
    pub fn logical_shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn tile_shape(&self) -> (usize, usize) {
        self.tile_shape
    }

    /// Number of tiles along `(rows, cols)`.
    pub fn grid_shape(&self) -> (usize, usize) {
        self.grid_shape
    }

    pub fn tile_count(&self) -> usize {
        self.grid_shape.0 * self.grid_shape.1
    }

    /// Grid position `(tile_row, tile_col)` of tile `index` (row-major).
    pub fn position(&self, index: usize) -> (usize, usize) {
        (index / self.grid_shape.1, index % self.grid_shape.1)
    }

    /// Top-left logical cell of tile `index`.
    pub fn origin(&self, index: usize) -> (usize, usize) {
        let (tr, tc) = self.position(index);
        (tr * self.tile_shape.0, tc * self.tile_shape.1)
    }

    /// Unpadded `(rows, cols)` of tile `index`.
    pub fn active_shape(&self, index: usize) -> (usize, usize) {
        let (r0, c0) = self.origin(index);
        (
            self.tile_shape.0.min(self.rows - r0),
            self.tile_shape.1.min(self.cols - c0),
        )
    }
}

/// One crossbar tile and the devices it owns.
#[derive(Debug, Clone)]
pub struct Tile {
    index: usize,
    origin: (usize, usize),
    shape: (usize, usize),
    active: (usize, usize),
    /// Row-major over the active region.
    positive: Vec<Memristor>,
    /// Present in the double-column scheme.
    negative: Option<Vec<Memristor>>,
}

impl Tile {
    /// Create tile `index` of `grid` with pristine devices drawn from `model`.
    pub fn new(
        grid: &TileGrid,
        index: usize,
        scheme: Scheme,
        model: &ModelConfig,
        seed: u64,
    ) -> Result<Self> {
        let active = grid.active_shape(index);
        let build = |polarity: Polarity| -> Result<Vec<Memristor>> {
            let mut devices = Vec::with_capacity(active.0 * active.1);
            for row in 0..active.0 {
                for col in 0..active.1 {
                    let id = DeviceId::new(index as u32, row as u32, col as u32, polarity);
                    devices.push(Memristor::instantiate(id, model, seed)?);
                }
            }
            Ok(devices)
        };

        let positive = build(Polarity::Positive)?;
        let negative = match scheme {
            Scheme::DoubleColumn => Some(build(Polarity::Negative)?),
            Scheme::SingleColumn => None,
        };

        Ok(Self {
            index,
            origin: grid.origin(index),
            shape: grid.tile_shape(),
            active,
            positive,
            negative,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Top-left logical cell covered by this tile.
    pub fn origin(&self) -> (usize, usize) {
        self.origin
    }

    /// Full (padded) tile shape.
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Unpadded region holding devices.
    pub fn active_shape(&self) -> (usize, usize) {
        self.active
    }

    /// Device at `(row, col)` of the array with `polarity`, `None` for padding.
    pub fn device(&self, row: usize, col: usize, polarity: Polarity) -> Option<&Memristor> {
        if row >= self.active.0 || col >= self.active.1 {
            return None;
        }
        self.array(polarity).map(|a| &a[row * self.active.1 + col])
    }

    /// Devices of one array, row-major over the active region.
    pub fn array(&self, polarity: Polarity) -> Option<&[Memristor]> {
        match polarity {
            Polarity::Positive => Some(&self.positive),
            Polarity::Negative => self.negative.as_deref(),
        }
    }

    /// Mutable devices of one array, row-major over the active region.
    pub fn array_mut(&mut self, polarity: Polarity) -> Option<&mut [Memristor]> {
        match polarity {
            Polarity::Positive => Some(&mut self.positive),
            Polarity::Negative => self.negative.as_deref_mut(),
        }
    }

    /// Every device of the tile.
    pub fn devices(&self) -> impl Iterator<Item = &Memristor> {
        self.positive.iter().chain(self.negative.iter().flatten())
    }

    /// Every device of the tile, mutably.
    pub fn devices_mut(&mut self) -> impl Iterator<Item = &mut Memristor> {
        self.positive
            .iter_mut()
            .chain(self.negative.iter_mut().flatten())
    }

    pub fn device_count(&self) -> usize {
        self.positive.len() + self.negative.as_ref().map_or(0, Vec::len)
    }

    /// Full tile-shape matrix of `conductance(device)` for one array; padding is zero.
    pub fn conductance_matrix_with<F>(&self, polarity: Polarity, conductance: F) -> DMatrix<f64>
    where
        F: Fn(&Memristor) -> f64,
    {
        let mut m = DMatrix::zeros(self.shape.0, self.shape.1);
        if let Some(devices) = self.array(polarity) {
            for (k, device) in devices.iter().enumerate() {
                m[(k / self.active.1, k % self.active.1)] = conductance(device);
            }
        }
        m
    }

    /// Full tile-shape conductance matrix of one array.
    pub fn conductance_matrix(&self, polarity: Polarity) -> DMatrix<f64> {
        self.conductance_matrix_with(polarity, Memristor::conductance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_300_columns() {
        let grid = TileGrid::new(128, 300, (128, 128)).unwrap();
        assert_eq!(grid.grid_shape(), (1, 3));
        assert_eq!(grid.tile_count(), 3);
        let widths: Vec<usize> = (0..3).map(|i| grid.active_shape(i).1).collect();
        assert_eq!(widths, vec![128, 128, 44]);
        assert_eq!(grid.origin(2), (0, 256));
    }

    #[test]
    fn test_partition_both_axes() {
        let grid = TileGrid::new(10, 7, (4, 3)).unwrap();
        assert_eq!(grid.grid_shape(), (3, 3));
        assert_eq!(grid.position(4), (1, 1));
        assert_eq!(grid.origin(4), (4, 3));
        assert_eq!(grid.active_shape(8), (2, 1));
        assert!(TileGrid::new(10, 7, (0, 3)).is_err());
    }

    #[test]
    fn test_padded_tile_reads_zero() {
        let grid = TileGrid::new(3, 5, (4, 4)).unwrap();
        let tile = Tile::new(&grid, 1, Scheme::DoubleColumn, &ModelConfig::default(), 0).unwrap();
        assert_eq!(tile.active_shape(), (3, 1));
        assert_eq!(tile.device_count(), 6);

        let g = tile.conductance_matrix(Polarity::Positive);
        assert_eq!(g.shape(), (4, 4));
        assert!(g[(0, 0)] > 0.0);
        assert_eq!(g[(0, 1)], 0.0);
        assert_eq!(g[(3, 0)], 0.0);
        assert!(tile.device(3, 0, Polarity::Positive).is_none());
    }

    #[test]
    fn test_single_column_has_no_negative_array() {
        let grid = TileGrid::new(2, 2, (2, 2)).unwrap();
        let tile = Tile::new(&grid, 0, Scheme::SingleColumn, &ModelConfig::default(), 0).unwrap();
        assert!(tile.array(Polarity::Negative).is_none());
        assert_eq!(tile.devices().count(), 4);
        let id = tile.device(1, 0, Polarity::Positive).unwrap().id();
        assert_eq!((id.row, id.col), (1, 0));
    }
}
