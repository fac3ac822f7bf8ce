//! Sequential vs parallel edge detection.
//! Run with: cargo bench -p edge_parity --bench edge_engines -- "<pattern>"

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use edge_parity::{
    EdgeEngine, Gpu, GpuEdgeEngine, IntensityBuffer, SequentialEdgeEngine, TiledEdgeEngine,
};

/// Deterministic gradient-plus-texture grid so every cell has a non-trivial window.
fn create_test_intensity(width: u32, height: u32) -> IntensityBuffer {
    let samples = (0..height)
        .flat_map(|y| (0..width).map(move |x| ((x * 7 + y * 13 + (x ^ y)) % 256) as i16))
        .collect();
    IntensityBuffer::from_samples(width, height, samples).unwrap()
}

fn benchmarks(c: &mut Criterion) {
    let mut engines: Vec<Box<dyn EdgeEngine>> = vec![
        Box::new(SequentialEdgeEngine::new()),
        Box::new(TiledEdgeEngine::default()),
    ];
    match Gpu::new().and_then(GpuEdgeEngine::new) {
        Ok(engine) => engines.push(Box::new(engine)),
        Err(e) => eprintln!("Skipping gpu engine: {}", e),
    }

    let mut group = c.benchmark_group("sobel");
    for (label, width, height) in [("512", 512, 512), ("2k", 2048, 2048)] {
        let intensity = create_test_intensity(width, height);
        group.throughput(Throughput::Elements(width as u64 * height as u64));

        for engine in &engines {
            group.bench_function(BenchmarkId::new(engine.name(), label), |b| {
                b.iter(|| black_box(engine.detect(black_box(&intensity)).unwrap()))
            });
        }
    }
    group.finish();
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
