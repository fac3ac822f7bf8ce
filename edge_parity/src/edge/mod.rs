//! Sobel gradient-magnitude edge detection.
//!
//! Every engine computes, for each pixel, `|Gx| + |Gy|` where `Gx` and `Gy` are
//! the responses of [`SOBEL_X`] and [`SOBEL_Y`] over the 3x3 neighborhood.
//! Neighborhood coordinates outside the grid are clamped to the nearest edge
//! sample, so a flat image produces zero everywhere including the border.
//! All arithmetic is integer, so engines must agree bit for bit.

mod gpu;
mod pipeline;
mod sequential;
mod tiled;


use crate::common::error::try_alloc_zeroed;
use crate::prelude::*;

pub use gpu::{GpuEdgeEngine, StagedTimings};
pub use pipeline::GpuSobelPipeline;
pub use sequential::SequentialEdgeEngine;
pub use tiled::{DEFAULT_TILE_ROWS, TiledEdgeEngine};

pub type Kernel3 = [[i32; 3]; 3];

/// Horizontal gradient kernel. Positive where intensity increases to the right.
pub const SOBEL_X: Kernel3 = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];

/// Vertical gradient kernel. Positive where intensity increases downward.
pub const SOBEL_Y: Kernel3 = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Combines a 3x3 intensity window into one edge magnitude.
///
/// With samples in `0..=255` the result is at most 1530 and always fits `i16`.
#[inline]
pub fn sobel_magnitude(window: &Kernel3) -> i16 {
    let mut gx = 0i32;
    let mut gy = 0i32;
    for (r, row) in window.iter().enumerate() {
        for (c, &v) in row.iter().enumerate() {
            gx += SOBEL_X[r][c] * v;
            gy += SOBEL_Y[r][c] * v;
        }
    }
    (gx.abs() + gy.abs()) as i16
}

/// A strategy that turns an intensity grid into an edge map.
pub trait EdgeEngine {
    fn name(&self) -> &str;

    fn detect(&self, intensity: &IntensityBuffer) -> Result<EdgeBuffer>;
}

/// Per-pixel edge magnitudes, row-major, same size as the source image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeBuffer {
    width: u32,
    height: u32,
    values: Vec<i16>,
}

impl EdgeBuffer {
    pub(crate) fn new_zeroed(dims: Dimensions) -> Result<EdgeBuffer> {
        Ok(EdgeBuffer {
            width: dims.width,
            height: dims.height,
            values: try_alloc_zeroed("edge buffer", dims.cell_count())?,
        })
    }

    pub fn from_values(width: u32, height: u32, values: Vec<i16>) -> Result<EdgeBuffer> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidImage(format!(
                "edge buffer has no cells: {}x{}",
                width, height
            )));
        }
        if values.len() != width as usize * height as usize {
            return Err(Error::InvalidImage(format!(
                "{} values do not fill a {}x{} edge buffer",
                values.len(),
                width,
                height
            )));
        }

        Ok(EdgeBuffer {
            width,
            height,
            values,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn values(&self) -> &[i16] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut [i16] {
        &mut self.values
    }

    pub fn get(&self, x: u32, y: u32) -> i16 {
        self.values[y as usize * self.width as usize + x as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, value: i16) {
        self.values[y as usize * self.width as usize + x as usize] = value;
    }
}

/// Computes edge magnitudes for row `y` into `out`, which must hold `width` cells.
///
/// Clamped neighbor indices are resolved before any sample is read, so every
/// access stays inside the grid.
pub(crate) fn sobel_row(intensity: &IntensityBuffer, y: u32, out: &mut [i16]) {
    let width = intensity.width() as usize;
    let height = intensity.height() as usize;
    debug_assert_eq!(out.len(), width);

    let samples = intensity.samples();
    let y = y as usize;
    let rows = [
        y.saturating_sub(1) * width,
        y * width,
        (y + 1).min(height - 1) * width,
    ];

    for (x, cell) in out.iter_mut().enumerate() {
        let cols = [x.saturating_sub(1), x, (x + 1).min(width - 1)];

        let mut window: Kernel3 = [[0; 3]; 3];
        for (r, &row_start) in rows.iter().enumerate() {
            for (c, &col) in cols.iter().enumerate() {
                window[r][c] = samples[row_start + col] as i32;
            }
        }

        *cell = sobel_magnitude(&window);
    }
}
