mod common;
mod compare;
mod config;
mod display;
mod driver;
mod edge;
mod gpu;
mod image;
mod intensity;
mod render;
mod timing;

pub mod prelude;

pub use prelude::*;

// Color formats
pub use crate::common::{ChannelCount, ChannelSize, ChannelType, ColorFormat};

// Error handling
pub use crate::common::{Dimensions, Error, Result};

// Image types
pub use crate::image::{Image, ImageDesc, PngCompression, SUPPORTED_EXTENSIONS};

// Core
pub use crate::compare::{Comparison, Mismatch, compare};
pub use crate::edge::{
    EdgeBuffer, EdgeEngine, GpuEdgeEngine, GpuSobelPipeline, SOBEL_X, SOBEL_Y,
    SequentialEdgeEngine, StagedTimings, TiledEdgeEngine, sobel_magnitude,
};
pub use crate::intensity::{IntensityBuffer, luma};

// GPU
pub use crate::gpu::Gpu;

// Adapters and orchestration
pub use crate::config::{ParallelBackend, RunConfig};
pub use crate::display::{LogViewer, PreviewViewer, Viewer};
pub use crate::driver::{EngineComparison, RunReport, compare_engines, run};
pub use crate::render::render_edges;
pub use crate::timing::{Speedup, Timed};
