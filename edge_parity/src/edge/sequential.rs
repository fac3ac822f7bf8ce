use super::{EdgeBuffer, EdgeEngine, sobel_row};
use crate::prelude::*;

/// Reference engine: one thread, row-major, every cell exactly once.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialEdgeEngine;

impl SequentialEdgeEngine {
    pub fn new() -> Self {
        Self
    }
}

impl EdgeEngine for SequentialEdgeEngine {
    fn name(&self) -> &str {
        "sequential"
    }

    fn detect(&self, intensity: &IntensityBuffer) -> Result<EdgeBuffer> {
        let mut edges = EdgeBuffer::new_zeroed(intensity.dimensions())?;
        let width = intensity.width() as usize;

        for (y, row) in edges.values_mut().chunks_exact_mut(width).enumerate() {
            sobel_row(intensity, y as u32, row);
        }

        Ok(edges)
    }
}
