use rayon::prelude::*;

use crate::common::error::try_alloc_zeroed;
use crate::prelude::*;

/// Integer BT.601 luma: `(77 R + 150 G + 29 B + 128) >> 8`.
///
/// The weights sum to 256, so a gray pixel maps to itself.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> i16 {
    ((77 * r as u32 + 150 * g as u32 + 29 * b as u32 + 128) >> 8) as i16
}

/// Single-channel intensity grid shared by both edge engines.
///
/// Samples are row-major and tightly packed, each in `0..=255`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntensityBuffer {
    width: u32,
    height: u32,
    samples: Vec<i16>,
}

impl IntensityBuffer {
    /// Derives intensity from an 8-bit L, LA, RGB or RGBA image. Alpha is ignored.
    pub fn from_image(image: &Image) -> Result<IntensityBuffer> {
        let desc = image.desc();
        if desc.is_empty() {
            return Err(Error::InvalidImage(format!(
                "image has no pixels: {}x{}",
                desc.width, desc.height
            )));
        }
        desc.color_format.validate()?;

        let width = desc.width as usize;
        let pixel_size = desc.color_format.byte_count() as usize;
        let has_color = desc.color_format.channel_count.has_color();

        let cell_count = image.dimensions().cell_count();
        let mut samples = try_alloc_zeroed::<i16>("intensity buffer", cell_count)?;

        samples
            .par_chunks_exact_mut(width)
            .enumerate()
            .for_each(|(y, out_row)| {
                let row = image.row(y as u32);
                for (out, pixel) in out_row.iter_mut().zip(row.chunks_exact(pixel_size)) {
                    *out = if has_color {
                        luma(pixel[0], pixel[1], pixel[2])
                    } else {
                        pixel[0] as i16
                    };
                }
            });

        tracing::debug!("extracted intensity from {}", desc);

        Ok(IntensityBuffer {
            width: desc.width,
            height: desc.height,
            samples,
        })
    }

    /// Wraps precomputed samples. Used for synthetic grids.
    ///
    /// Samples must lie in `0..=255`, the extractor's output range; wider
    /// values could overflow the `i16` edge magnitudes.
    pub fn from_samples(width: u32, height: u32, samples: Vec<i16>) -> Result<IntensityBuffer> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidImage(format!(
                "intensity grid has no samples: {}x{}",
                width, height
            )));
        }
        if samples.len() != width as usize * height as usize {
            return Err(Error::InvalidImage(format!(
                "{} samples do not fill a {}x{} grid",
                samples.len(),
                width,
                height
            )));
        }
        if let Some(pos) = samples.iter().position(|s| !(0..=255).contains(s)) {
            return Err(Error::InvalidImage(format!(
                "sample {} at index {} is outside 0..=255",
                samples[pos], pos
            )));
        }

        Ok(IntensityBuffer {
            width,
            height,
            samples,
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

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Sample at (x, y) with clamp-to-edge addressing for out-of-grid coordinates.
    #[inline]
    pub fn get_clamped(&self, x: i64, y: i64) -> i16 {
        let cx = x.clamp(0, self.width as i64 - 1) as usize;
        let cy = y.clamp(0, self.height as i64 - 1) as usize;
        self.samples[cy * self.width as usize + cx]
    }
}
