//! One comparison run: decode, extract intensity once, detect with both
//! engines, check equivalence, then export and display.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::compare::{Comparison, compare};
use crate::config::{ParallelBackend, RunConfig};
use crate::display::Viewer;
use crate::edge::{GpuEdgeEngine, SequentialEdgeEngine, TiledEdgeEngine};
use crate::prelude::*;
use crate::render::render_edges;
use crate::timing::{Speedup, Timed};

/// Both edge maps, their detection times and the equivalence verdict.
#[derive(Debug, Clone)]
pub struct EngineComparison {
    pub sequential: Timed<EdgeBuffer>,
    pub parallel: Timed<EdgeBuffer>,
    pub comparison: Comparison,
}

impl EngineComparison {
    pub fn speedup(&self) -> Speedup {
        Speedup::new(self.sequential.elapsed, self.parallel.elapsed)
    }
}

/// Runs `sequential` and `parallel` on the same intensity grid and compares
/// the results. Intensity extraction is not part of either timing.
pub fn compare_engines(
    image: &Image,
    sequential: &dyn EdgeEngine,
    parallel: &dyn EdgeEngine,
    max_reported: usize,
) -> Result<EngineComparison> {
    let intensity = IntensityBuffer::from_image(image)?;

    let sequential_edges = Timed::run(|| sequential.detect(&intensity)).transpose()?;
    tracing::info!(
        "{} engine: {:?}",
        sequential.name(),
        sequential_edges.elapsed
    );

    let parallel_edges = Timed::run(|| parallel.detect(&intensity)).transpose()?;
    tracing::info!("{} engine: {:?}", parallel.name(), parallel_edges.elapsed);

    let comparison = compare(&sequential_edges.value, &parallel_edges.value, max_reported)?;

    Ok(EngineComparison {
        sequential: sequential_edges,
        parallel: parallel_edges,
        comparison,
    })
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub input: PathBuf,
    pub dimensions: Dimensions,
    pub parallel_engine: String,
    pub sequential_time: Duration,
    pub parallel_time: Duration,
    pub comparison: Comparison,
    /// Edge maps written to disk, sequential first.
    pub outputs: Vec<PathBuf>,
}

impl RunReport {
    pub fn is_equivalent(&self) -> bool {
        self.comparison.is_equivalent()
    }

    pub fn speedup(&self) -> Speedup {
        Speedup::new(self.sequential_time, self.parallel_time)
    }
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "input:      {} ({})", self.input.display(), self.dimensions)?;
        writeln!(f, "sequential: {:?}", self.sequential_time)?;
        writeln!(f, "{:<11} {:?}", format!("{}:", self.parallel_engine), self.parallel_time)?;
        writeln!(f, "speedup:    {}", self.speedup())?;
        if self.is_equivalent() {
            write!(f, "result:     equivalent")
        } else {
            write!(
                f,
                "result:     {} mismatched cells",
                self.comparison.mismatch_count()
            )
        }
    }
}

/// Creates the engine compared against the sequential reference.
///
/// The accelerator backend fails with [`Error::AcceleratorUnavailable`] when no
/// adapter is present; it never falls back to the host.
pub fn parallel_engine(config: &RunConfig) -> Result<Box<dyn EdgeEngine>> {
    match config.backend {
        ParallelBackend::Gpu => {
            let gpu = Gpu::new()?;
            Ok(Box::new(GpuEdgeEngine::new(gpu)?))
        }
        ParallelBackend::Cpu => Ok(Box::new(TiledEdgeEngine::new(config.tile_rows)?)),
    }
}

/// Performs a full comparison run.
///
/// Non-equivalence is reported through [`RunReport::comparison`], not as an
/// error. Viewer failures are logged and ignored.
pub fn run(config: &RunConfig, viewer: &mut dyn Viewer) -> Result<RunReport> {
    tracing::info!("loading {}", config.input.display());
    let image = Image::read_file(&config.input)?;
    tracing::info!("source image: {}", image.desc());

    let parallel = parallel_engine(config)?;
    let sequential = SequentialEdgeEngine::new();

    let result = compare_engines(
        &image,
        &sequential,
        parallel.as_ref(),
        config.max_reported_mismatches,
    )?;

    let comparison = &result.comparison;
    if comparison.is_equivalent() {
        tracing::info!(
            "{} and {} edge maps are identical ({})",
            sequential.name(),
            parallel.name(),
            comparison.dimensions()
        );
    } else {
        tracing::error!(
            "{} of {} cells differ between {} and {}",
            comparison.mismatch_count(),
            comparison.dimensions().cell_count(),
            sequential.name(),
            parallel.name()
        );
        for m in comparison.mismatches() {
            tracing::error!(
                "  ({}, {}): sequential {} vs parallel {}",
                m.x,
                m.y,
                m.sequential,
                m.parallel
            );
        }
    }
    tracing::info!("speedup: {}", result.speedup());

    let sequential_image = render_edges(&result.sequential.value)?;
    let parallel_image = render_edges(&result.parallel.value)?;

    let mut outputs = Vec::new();
    export(&sequential_image, &config.output, config, &mut outputs)?;
    if let Some(path) = &config.parallel_output {
        export(&parallel_image, path, config, &mut outputs)?;
    }

    if config.display {
        show(viewer, "sequential edges", &sequential_image);
        show(viewer, &format!("{} edges", parallel.name()), &parallel_image);
    }

    Ok(RunReport {
        input: config.input.clone(),
        dimensions: image.dimensions(),
        parallel_engine: parallel.name().to_string(),
        sequential_time: result.sequential.elapsed,
        parallel_time: result.parallel.elapsed,
        comparison: result.comparison,
        outputs,
    })
}

fn export(
    image: &Image,
    path: &Path,
    config: &RunConfig,
    outputs: &mut Vec<PathBuf>,
) -> Result<()> {
    image.save_png(path, config.png_compression)?;
    tracing::info!("wrote {}", path.display());
    outputs.push(path.to_path_buf());
    Ok(())
}

fn show(viewer: &mut dyn Viewer, title: &str, image: &Image) {
    if let Err(e) = viewer.show(title, image) {
        tracing::warn!("could not display {}: {}", title, e);
    }
}
