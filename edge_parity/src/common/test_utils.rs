use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::prelude::*;

/// Returns the workspace root directory (parent of the crate directory).
fn workspace_root() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/..")
}

/// Returns a path under `test_output/`, creating the directory if needed.
pub fn test_output_path(name: &str) -> String {
    let dir = format!("{}/test_output", workspace_root());
    std::fs::create_dir_all(&dir).unwrap();
    format!("{}/{}", dir, name)
}

/// Creates the accelerator, or returns None on machines without a usable adapter.
pub fn test_gpu() -> Option<Gpu> {
    match Gpu::new() {
        Ok(gpu) => Some(gpu),
        Err(e) => {
            eprintln!("Skipping GPU test - no accelerator available: {}", e);
            None
        }
    }
}

/// Uniform RGB image.
pub fn flat_rgb_image(width: u32, height: u32, rgb: [u8; 3]) -> Image {
    let packed: Vec<u8> = (0..width * height).flat_map(|_| rgb).collect();
    Image::from_packed(width, height, ColorFormat::RGB_U8, &packed).unwrap()
}

/// Seeded noise image with every channel random.
pub fn random_image(width: u32, height: u32, format: ColorFormat, seed: u64) -> Image {
    let mut rng = StdRng::seed_from_u64(seed);
    let len = (width * height) as usize * format.byte_count() as usize;
    let packed: Vec<u8> = (0..len).map(|_| rng.random::<u8>()).collect();
    Image::from_packed(width, height, format, &packed).unwrap()
}

/// Seeded random intensity samples in the extractor's output range.
pub fn random_intensity(width: u32, height: u32, seed: u64) -> IntensityBuffer {
    let mut rng = StdRng::seed_from_u64(seed);
    let samples: Vec<i16> = (0..width * height)
        .map(|_| rng.random_range(0..=255))
        .collect();
    IntensityBuffer::from_samples(width, height, samples).unwrap()
}

/// Intensity grid with `low` left of `column` and `high` from `column` on.
pub fn step_intensity(
    width: u32,
    height: u32,
    column: u32,
    low: i16,
    high: i16,
) -> IntensityBuffer {
    let samples: Vec<i16> = (0..height)
        .flat_map(|_| (0..width).map(move |x| if x < column { low } else { high }))
        .collect();
    IntensityBuffer::from_samples(width, height, samples).unwrap()
}

/// Flat intensity grid with one bright sample at (x, y).
pub fn impulse_intensity(
    width: u32,
    height: u32,
    x: u32,
    y: u32,
    background: i16,
    peak: i16,
) -> IntensityBuffer {
    let mut samples = vec![background; (width * height) as usize];
    samples[(y * width + x) as usize] = peak;
    IntensityBuffer::from_samples(width, height, samples).unwrap()
}
