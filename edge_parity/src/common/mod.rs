pub(crate) mod color_format;
pub(crate) mod error;
#[cfg(test)]
pub(crate) mod test_utils;

pub use color_format::{ChannelCount, ChannelSize, ChannelType, ColorFormat};
pub use error::{Dimensions, Error, Result};
