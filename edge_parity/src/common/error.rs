use std::fmt;
use std::io;

use thiserror::Error;

/// Width and height of a pixel grid, used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Every variant is fatal to the current run; nothing is retried.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Accelerator unavailable: {0}")]
    AcceleratorUnavailable(String),

    #[error("Dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: Dimensions, right: Dimensions },

    #[error("Failed to allocate {bytes} bytes for {what}")]
    Allocation { what: &'static str, bytes: usize },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid file extension: {0}")]
    InvalidExtension(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<image_lib::ImageError> for Error {
    fn from(e: image_lib::ImageError) -> Self {
        match e {
            image_lib::ImageError::IoError(io) => Error::Io(io),
            other => Error::Encoding(other.to_string()),
        }
    }
}

impl From<serde_yml::Error> for Error {
    fn from(e: serde_yml::Error) -> Self {
        Error::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Allocates a zeroed vector, reporting allocation failure instead of aborting.
pub(crate) fn try_alloc_zeroed<T: Default + Clone>(
    what: &'static str,
    len: usize,
) -> Result<Vec<T>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|_| Error::Allocation {
        what,
        bytes: len.saturating_mul(std::mem::size_of::<T>()),
    })?;
    data.resize(len, T::default());
    Ok(data)
}
