/// Aligns a row length to a 4-byte boundary.
pub(crate) fn align_stride(n: usize) -> usize {
    (n + 3) & !3
}

/// Copies tightly packed rows into a buffer with `stride` bytes per row.
pub(crate) fn add_stride_padding(
    src: &[u8],
    row_bytes: usize,
    height: usize,
    stride: usize,
) -> Vec<u8> {
    if row_bytes == stride {
        return src.to_vec();
    }

    let mut padded = vec![0u8; stride * height];
    for (dst, src) in padded
        .chunks_exact_mut(stride)
        .zip(src.chunks_exact(row_bytes))
    {
        dst[..row_bytes].copy_from_slice(src);
    }
    padded
}

/// Drops per-row padding, returning tightly packed rows.
pub(crate) fn strip_stride_padding(
    src: &[u8],
    row_bytes: usize,
    height: usize,
    stride: usize,
) -> Vec<u8> {
    if row_bytes == stride {
        return src.to_vec();
    }

    let mut packed = Vec::with_capacity(row_bytes * height);
    for row in src.chunks_exact(stride).take(height) {
        packed.extend_from_slice(&row[..row_bytes]);
    }
    packed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_stride() {
        assert_eq!(align_stride(0), 0);
        assert_eq!(align_stride(3), 4);
        assert_eq!(align_stride(4), 4);
        assert_eq!(align_stride(2685), 2688);
    }

    #[test]
    fn test_padding_roundtrip_keeps_pixels() {
        let packed: Vec<u8> = (0..9).collect();
        let padded = add_stride_padding(&packed, 3, 3, 4);
        assert_eq!(padded, vec![0, 1, 2, 0, 3, 4, 5, 0, 6, 7, 8, 0]);
        assert_eq!(strip_stride_padding(&padded, 3, 3, 4), packed);
    }
}
