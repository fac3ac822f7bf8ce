use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image_lib::codecs::png::{CompressionType, FilterType, PngEncoder};
use image_lib::{DynamicImage, ExtendedColorType, ImageEncoder};

use super::PngCompression;
use crate::prelude::*;

pub(crate) fn load<P: AsRef<Path>>(filename: P) -> Result<Image> {
    let img = image_lib::open(filename.as_ref())?;

    let (color_format, img) = match img.color() {
        image_lib::ColorType::L8 => (ColorFormat::L_U8, img),
        image_lib::ColorType::La8 => (ColorFormat::LA_U8, img),
        image_lib::ColorType::Rgb8 => (ColorFormat::RGB_U8, img),
        image_lib::ColorType::Rgba8 => (ColorFormat::RGBA_U8, img),
        other => {
            // The extractor works on 8-bit channels; wider sources are narrowed here.
            tracing::debug!(
                "narrowing {:?} to 8-bit RGB for {}",
                other,
                filename.as_ref().display()
            );
            (
                ColorFormat::RGB_U8,
                DynamicImage::ImageRgb8(img.into_rgb8()),
            )
        }
    };

    let (width, height) = (img.width(), img.height());
    let image = Image::from_packed(width, height, color_format, img.as_bytes())?;

    tracing::debug!(
        "decoded {} as {}",
        filename.as_ref().display(),
        image.desc()
    );

    Ok(image)
}

pub(crate) fn save_png<P: AsRef<Path>>(
    packed: &[u8],
    desc: &ImageDesc,
    filename: P,
    compression: PngCompression,
) -> Result<()> {
    if desc.color_format.channel_type != ChannelType::UInt
        || desc.color_format.channel_size != ChannelSize::_8bit
    {
        return Err(Error::Encoding(format!(
            "PNG export supports 8-bit channels only, got {}",
            desc.color_format
        )));
    }

    let color_type = match desc.color_format.channel_count {
        ChannelCount::L => ExtendedColorType::L8,
        ChannelCount::LA => ExtendedColorType::La8,
        ChannelCount::Rgb => ExtendedColorType::Rgb8,
        ChannelCount::Rgba => ExtendedColorType::Rgba8,
    };

    let compression = match compression {
        PngCompression::Fast => CompressionType::Fast,
        PngCompression::Default => CompressionType::Default,
        PngCompression::Best => CompressionType::Best,
    };

    if let Some(parent) = filename.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let writer = BufWriter::new(File::create(filename.as_ref())?);
    let encoder = PngEncoder::new_with_quality(writer, compression, FilterType::Adaptive);
    encoder.write_image(packed, desc.width, desc.height, color_type)?;

    Ok(())
}
