use crate::prelude::*;

/// Converts an edge map to an 8-bit gray image, saturating magnitudes to `0..=255`.
pub fn render_edges(edges: &EdgeBuffer) -> Result<Image> {
    let packed: Vec<u8> = edges
        .values()
        .iter()
        .map(|&v| v.clamp(0, u8::MAX as i16) as u8)
        .collect();

    Image::from_packed(edges.width(), edges.height(), ColorFormat::L_U8, &packed)
}
