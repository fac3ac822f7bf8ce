mod io;
mod stride;


use std::path::Path;

use serde::Deserialize;
use strum_macros::{Display, EnumString};

use crate::common::{ColorFormat, Dimensions, Error, Result};

use stride::{add_stride_padding, align_stride, strip_stride_padding};

/// Supported image file extensions for reading. Only PNG is written.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "tif"];

#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct ImageDesc {
    pub width: u32,
    pub height: u32,
    pub stride: usize,
    pub color_format: ColorFormat,
}

/// Multi-channel pixel grid with 4-byte aligned rows.
#[derive(Clone, Debug)]
pub struct Image {
    desc: ImageDesc,
    bytes: Vec<u8>,
}

/// PNG compression effort used when exporting edge maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PngCompression {
    Fast,
    Default,
    #[default]
    Best,
}

impl Image {
    /// Returns the image descriptor.
    pub fn desc(&self) -> &ImageDesc {
        &self.desc
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.desc.width, self.desc.height)
    }

    pub fn new_empty(desc: ImageDesc) -> Result<Image> {
        let bytes = vec![0; desc.size_in_bytes()];

        Ok(Image { desc, bytes })
    }

    pub fn new_with_data(desc: ImageDesc, bytes: Vec<u8>) -> Result<Image> {
        if bytes.len() != desc.size_in_bytes() {
            return Err(Error::InvalidImage(format!(
                "bytes length {} does not match expected size {}",
                bytes.len(),
                desc.size_in_bytes()
            )));
        }

        Ok(Image { desc, bytes })
    }

    /// Builds an image from tightly packed rows, adding stride padding as needed.
    pub fn from_packed(
        width: u32,
        height: u32,
        color_format: ColorFormat,
        packed: &[u8],
    ) -> Result<Image> {
        let desc = ImageDesc::new(width, height, color_format);
        let expected = desc.row_bytes() * height as usize;
        if packed.len() != expected {
            return Err(Error::InvalidImage(format!(
                "packed length {} does not match expected size {}",
                packed.len(),
                expected
            )));
        }

        let bytes = add_stride_padding(packed, desc.row_bytes(), height as usize, desc.stride);
        Image::new_with_data(desc, bytes)
    }

    /// Returns one row of pixel data without padding.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.desc.stride;
        &self.bytes[start..start + self.desc.row_bytes()]
    }

    /// Decodes an image file. The codec is chosen by extension.
    pub fn read_file<P: AsRef<Path>>(filename: P) -> Result<Image> {
        let extension = file_extension(filename.as_ref())?;

        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(Error::InvalidExtension(extension));
        }

        io::load(filename)
    }

    /// Saves the image as PNG with default compression.
    pub fn save_file<P: AsRef<Path>>(&self, filename: P) -> Result<()> {
        self.save_png(filename, PngCompression::Default)
    }

    pub fn save_png<P: AsRef<Path>>(&self, filename: P, compression: PngCompression) -> Result<()> {
        let extension = file_extension(filename.as_ref())?;
        if extension != "png" {
            return Err(Error::InvalidExtension(extension));
        }

        io::save_png(&self.packed_bytes(), &self.desc, filename, compression)
    }

    /// Returns pixel bytes with stride padding removed.
    pub fn packed_bytes(&self) -> Vec<u8> {
        strip_stride_padding(
            &self.bytes,
            self.desc.row_bytes(),
            self.desc.height as usize,
            self.desc.stride,
        )
    }
}

fn file_extension(filename: &Path) -> Result<String> {
    Ok(filename
        .extension()
        .and_then(|os_str| os_str.to_str())
        .ok_or_else(|| Error::InvalidExtension("missing extension".to_string()))?
        .to_ascii_lowercase())
}

impl ImageDesc {
    pub fn new(width: u32, height: u32, color_format: ColorFormat) -> Self {
        let stride = align_stride(width as usize * color_format.byte_count() as usize);

        Self {
            width,
            height,
            stride,
            color_format,
        }
    }

    pub fn size_in_bytes(&self) -> usize {
        self.height as usize * self.stride
    }

    /// Returns the number of bytes per row without padding.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.color_format.byte_count() as usize
    }

    /// Returns true if stride equals row bytes (no padding).
    pub fn is_packed(&self) -> bool {
        self.stride == self.row_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for ImageDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} {}", self.width, self.height, self.color_format)
    }
}
