use std::sync::mpsc;
use std::time::{Duration, Instant};

use wgpu::util::DeviceExt;

use super::pipeline::{GpuSobelPipeline, WORKGROUP_SIZE};
use super::{EdgeBuffer, EdgeEngine};
use crate::prelude::*;

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct Params {
    width: u32,
    height: u32,
    _padding: [u32; 2],
}

/// Wall time of each accelerator stage for one detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StagedTimings {
    /// Widening samples to `i32` and creating device buffers.
    pub upload: Duration,
    /// Dispatch until the queue is idle.
    pub compute: Duration,
    /// Copy to the staging buffer, map and narrow back to `i16`.
    pub download: Duration,
}

impl StagedTimings {
    pub fn total(&self) -> Duration {
        self.upload + self.compute + self.download
    }
}

/// Accelerator engine running the Sobel kernel as a wgpu compute shader.
///
/// One invocation per output pixel; invocation `(x, y)` writes only cell
/// `y * width + x`, so no two invocations touch the same output.
#[derive(Debug)]
pub struct GpuEdgeEngine {
    pipeline: GpuSobelPipeline,
    gpu: Gpu,
}

impl GpuEdgeEngine {
    /// Compiles the compute pipeline. Shader compilation is not part of detection time.
    pub fn new(gpu: Gpu) -> Result<Self> {
        let pipeline = GpuSobelPipeline::new(&gpu)?;
        Ok(Self { pipeline, gpu })
    }

    /// Runs copy-in, compute and copy-out, timing each stage.
    pub fn detect_staged(
        &self,
        intensity: &IntensityBuffer,
    ) -> Result<(EdgeBuffer, StagedTimings)> {
        let device = self.gpu.device();
        let queue = self.gpu.queue();
        let dims = intensity.dimensions();

        let limits = self.gpu.limits();
        let (groups_x, groups_y) = workgroup_counts(dims, &limits)?;
        let buffer_size = storage_buffer_size(dims, &limits)?;

        // Copy-in
        let upload_start = Instant::now();

        let widened: Vec<i32> = intensity.samples().iter().map(|&s| s as i32).collect();

        let params = Params {
            width: dims.width,
            height: dims.height,
            _padding: [0; 2],
        };

        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sobel_params_buffer"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let input_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sobel_intensity_buffer"),
            contents: bytemuck::cast_slice(&widened),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sobel_edges_buffer"),
            size: buffer_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sobel_edges_staging"),
            size: buffer_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        self.gpu.wait()?;
        let upload = upload_start.elapsed();

        // Compute
        let compute_start = Instant::now();

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sobel_bind_group"),
            layout: &self.pipeline.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: input_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: output_buffer.as_entire_binding(),
                },
            ],
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("sobel_encoder"),
        });

        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("sobel_pass"),
                timestamp_writes: None,
            });
            compute_pass.set_pipeline(&self.pipeline.compute_pipeline);
            compute_pass.set_bind_group(0, &bind_group, &[]);
            compute_pass.dispatch_workgroups(groups_x, groups_y, 1);
        }

        queue.submit(std::iter::once(encoder.finish()));
        self.gpu.wait()?;
        let compute = compute_start.elapsed();

        // Copy-out
        let download_start = Instant::now();

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("sobel_download_encoder"),
        });
        encoder.copy_buffer_to_buffer(&output_buffer, 0, &staging_buffer, 0, buffer_size);
        queue.submit(std::iter::once(encoder.finish()));

        let (sender, receiver) = mpsc::channel();
        let buffer_slice = staging_buffer.slice(..);
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });

        self.gpu.wait()?;
        receiver
            .recv()
            .map_err(|_| Error::Gpu("readback map callback never fired".to_string()))?
            .map_err(|e| Error::Gpu(format!("failed to map staging buffer: {}", e)))?;

        let mut edges = EdgeBuffer::new_zeroed(dims)?;
        {
            let data = buffer_slice.get_mapped_range();
            for (cell, bytes) in edges.values_mut().iter_mut().zip(data.chunks_exact(4)) {
                *cell = i32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as i16;
            }
        }
        staging_buffer.unmap();

        let download = download_start.elapsed();

        let timings = StagedTimings {
            upload,
            compute,
            download,
        };
        tracing::debug!(
            "gpu sobel {}: upload {:?}, compute {:?}, download {:?}",
            dims,
            timings.upload,
            timings.compute,
            timings.download
        );

        Ok((edges, timings))
    }

}

/// Workgroups needed to cover `dims`, checked against the dispatch limit.
fn workgroup_counts(dims: Dimensions, limits: &wgpu::Limits) -> Result<(u32, u32)> {
    let groups_x = dims.width.div_ceil(WORKGROUP_SIZE);
    let groups_y = dims.height.div_ceil(WORKGROUP_SIZE);
    let max_groups = limits.max_compute_workgroups_per_dimension;

    if groups_x > max_groups || groups_y > max_groups {
        return Err(Error::InvalidImage(format!(
            "{} exceeds the accelerator dispatch limit of {} workgroups per dimension",
            dims, max_groups
        )));
    }

    Ok((groups_x, groups_y))
}

/// Byte size of one `i32` storage buffer for `dims`, checked against the binding limits.
fn storage_buffer_size(dims: Dimensions, limits: &wgpu::Limits) -> Result<u64> {
    let bytes = dims.cell_count() * std::mem::size_of::<i32>();
    let max_binding =
        (limits.max_storage_buffer_binding_size as u64).min(limits.max_buffer_size);

    if bytes as u64 > max_binding {
        return Err(Error::Allocation {
            what: "accelerator storage buffer",
            bytes,
        });
    }

    Ok(bytes as u64)
}

impl EdgeEngine for GpuEdgeEngine {
    fn name(&self) -> &str {
        "gpu"
    }

    fn detect(&self, intensity: &IntensityBuffer) -> Result<EdgeBuffer> {
        self.detect_staged(intensity).map(|(edges, _)| edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::{random_intensity, step_intensity, test_gpu};
    use crate::edge::SequentialEdgeEngine;

    fn small_limits() -> wgpu::Limits {
        wgpu::Limits {
            max_compute_workgroups_per_dimension: 4,
            max_storage_buffer_binding_size: 1024,
            max_buffer_size: 4096,
            ..wgpu::Limits::default()
        }
    }

    #[test]
    fn test_workgroup_counts_round_up() {
        let limits = small_limits();
        assert_eq!(workgroup_counts(Dimensions::new(1, 1), &limits).unwrap(), (1, 1));
        assert_eq!(workgroup_counts(Dimensions::new(17, 16), &limits).unwrap(), (2, 1));
        assert_eq!(workgroup_counts(Dimensions::new(64, 33), &limits).unwrap(), (4, 3));
    }

    #[test]
    fn test_dispatch_limit_is_invalid_image() {
        let limits = small_limits();
        // 65 columns need 5 workgroups; the limit is 4.
        for dims in [Dimensions::new(65, 1), Dimensions::new(1, 65)] {
            assert!(
                matches!(workgroup_counts(dims, &limits), Err(Error::InvalidImage(_))),
                "{} was accepted",
                dims
            );
        }
    }

    #[test]
    fn test_storage_buffer_size_uses_smaller_limit() {
        let limits = small_limits();
        assert_eq!(storage_buffer_size(Dimensions::new(16, 16), &limits).unwrap(), 1024);

        let result = storage_buffer_size(Dimensions::new(16, 17), &limits);
        assert!(matches!(
            result,
            Err(Error::Allocation {
                what: "accelerator storage buffer",
                bytes: 1088,
            })
        ));

        let narrow = wgpu::Limits {
            max_buffer_size: 512,
            ..small_limits()
        };
        assert!(matches!(
            storage_buffer_size(Dimensions::new(16, 16), &narrow),
            Err(Error::Allocation { .. })
        ));
    }

    #[test]
    fn test_gpu_matches_sequential_on_noise() {
        let Some(gpu) = test_gpu() else {
            return;
        };
        let engine = GpuEdgeEngine::new(gpu).unwrap();

        // Sizes that are not multiples of the workgroup edge exercise the bounds guard.
        for (w, h, seed) in [(1, 1, 1), (17, 3, 2), (64, 64, 3), (101, 37, 4)] {
            let intensity = random_intensity(w, h, seed);
            let expected = SequentialEdgeEngine.detect(&intensity).unwrap();
            let actual = engine.detect(&intensity).unwrap();
            assert_eq!(expected, actual, "mismatch for {}x{}", w, h);
        }
    }

    #[test]
    fn test_gpu_step_edge_values() {
        let Some(gpu) = test_gpu() else {
            return;
        };
        let engine = GpuEdgeEngine::new(gpu).unwrap();

        let intensity = step_intensity(4, 4, 2, 0, 100);
        let (edges, timings) = engine.detect_staged(&intensity).unwrap();
        for y in 0..4 {
            assert_eq!(edges.get(0, y), 0);
            assert_eq!(edges.get(1, y), 400);
            assert_eq!(edges.get(2, y), 400);
            assert_eq!(edges.get(3, y), 0);
        }
        assert_eq!(timings.total(), timings.upload + timings.compute + timings.download);
    }

    #[test]
    fn test_engine_is_reusable() {
        let Some(gpu) = test_gpu() else {
            return;
        };
        let engine = GpuEdgeEngine::new(gpu).unwrap();

        let intensity = random_intensity(40, 30, 9);
        let first = engine.detect(&intensity).unwrap();
        let second = engine.detect(&intensity).unwrap();
        assert_eq!(first, second);
    }
}
