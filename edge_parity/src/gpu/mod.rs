use std::sync::Arc;

use crate::common::{Error, Result};

/// Accelerator domain: one wgpu device and queue.
///
/// Created explicitly before the first GPU dispatch and released when dropped,
/// after outstanding work has drained.
#[derive(Debug)]
pub struct Gpu {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    adapter_info: wgpu::AdapterInfo,
}

impl Gpu {
    /// Initializes wgpu on the highest-performance adapter available.
    ///
    /// Fails with [`Error::AcceleratorUnavailable`] when no adapter or device
    /// can be created. There is no fallback to a CPU path.
    pub fn new() -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| {
            Error::AcceleratorUnavailable(format!("failed to find suitable GPU adapter: {}", e))
        })?;

        let adapter_info = adapter.get_info();

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("edge_parity_device"),
            required_limits: adapter.limits(),
            ..Default::default()
        }))
        .map_err(|e| Error::AcceleratorUnavailable(format!("failed to create device: {}", e)))?;

        tracing::info!(
            "accelerator initialized: {} ({:?}, {:?})",
            adapter_info.name,
            adapter_info.backend,
            adapter_info.device_type
        );

        Ok(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
            adapter_info,
        })
    }

    /// Returns a reference to the wgpu device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the wgpu queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn limits(&self) -> wgpu::Limits {
        self.device.limits()
    }

    /// Blocks until all submitted work has completed and map callbacks have fired.
    pub fn wait(&self) -> Result<()> {
        self.device
            .poll(wgpu::PollType::Wait)
            .map(|_| ())
            .map_err(|e| Error::Gpu(format!("device poll failed: {}", e)))
    }
}

impl Drop for Gpu {
    fn drop(&mut self) {
        if let Err(e) = self.wait() {
            tracing::warn!("accelerator teardown: {}", e);
        }
        tracing::debug!("accelerator released: {}", self.adapter_info.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_context_creation() {
        let result = Gpu::new();
        if let Err(e) = &result {
            eprintln!(
                "GPU context creation failed (expected on headless systems): {}",
                e
            );
            assert!(matches!(e, Error::AcceleratorUnavailable(_)));
            return;
        }
        let gpu = result.unwrap();
        assert!(gpu.limits().max_compute_workgroups_per_dimension > 0);
        gpu.wait().unwrap();
    }
}
