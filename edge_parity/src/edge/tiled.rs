use rayon::prelude::*;

use super::{EdgeBuffer, EdgeEngine, sobel_row};
use crate::prelude::*;

pub const DEFAULT_TILE_ROWS: u32 = 32;

/// Host data-parallel engine.
///
/// The output is split into bands of `tile_rows` rows; each rayon task owns one
/// band exclusively and reads the shared intensity grid.
#[derive(Debug, Clone, Copy)]
pub struct TiledEdgeEngine {
    tile_rows: u32,
}

impl TiledEdgeEngine {
    pub fn new(tile_rows: u32) -> Result<Self> {
        if tile_rows == 0 {
            return Err(Error::Config("tile_rows must be > 0".to_string()));
        }
        Ok(Self { tile_rows })
    }

    pub fn tile_rows(&self) -> u32 {
        self.tile_rows
    }
}

impl Default for TiledEdgeEngine {
    fn default() -> Self {
        Self {
            tile_rows: DEFAULT_TILE_ROWS,
        }
    }
}

impl EdgeEngine for TiledEdgeEngine {
    fn name(&self) -> &str {
        "tiled"
    }

    fn detect(&self, intensity: &IntensityBuffer) -> Result<EdgeBuffer> {
        let mut edges = EdgeBuffer::new_zeroed(intensity.dimensions())?;
        let width = intensity.width() as usize;
        let tile_len = width * self.tile_rows as usize;

        edges
            .values_mut()
            .par_chunks_mut(tile_len)
            .enumerate()
            .for_each(|(tile, band)| {
                let first_row = tile as u32 * self.tile_rows;
                for (i, row) in band.chunks_exact_mut(width).enumerate() {
                    sobel_row(intensity, first_row + i as u32, row);
                }
            });

        Ok(edges)
    }
}
