pub use crate::common::{
    ChannelCount, ChannelSize, ChannelType, ColorFormat, Dimensions, Error, Result,
};
pub use crate::edge::{EdgeBuffer, EdgeEngine};
pub use crate::gpu::Gpu;
pub use crate::image::{Image, ImageDesc};
pub use crate::intensity::IntensityBuffer;
