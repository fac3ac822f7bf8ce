//! Cell-by-cell equivalence check between two edge maps.

use rayon::prelude::*;

use crate::prelude::*;

/// A cell where the two engines disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    pub x: u32,
    pub y: u32,
    pub sequential: i16,
    pub parallel: i16,
}

/// Outcome of comparing two edge maps of equal size.
///
/// Any mismatch means one engine is wrong; there is no tolerance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    dimensions: Dimensions,
    mismatch_count: u64,
    mismatches: Vec<Mismatch>,
}

impl Comparison {
    pub fn is_equivalent(&self) -> bool {
        self.mismatch_count == 0
    }

    pub fn mismatch_count(&self) -> u64 {
        self.mismatch_count
    }

    /// The first mismatches in row-major order, at most the requested number.
    pub fn mismatches(&self) -> &[Mismatch] {
        &self.mismatches
    }

    pub fn first_mismatch(&self) -> Option<&Mismatch> {
        self.mismatches.first()
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }
}

/// Compares `sequential` against `parallel`, recording up to `max_reported` mismatches.
///
/// Fails with [`Error::DimensionMismatch`] before reading any cell when the
/// buffers differ in size.
pub fn compare(
    sequential: &EdgeBuffer,
    parallel: &EdgeBuffer,
    max_reported: usize,
) -> Result<Comparison> {
    if sequential.dimensions() != parallel.dimensions() {
        return Err(Error::DimensionMismatch {
            left: sequential.dimensions(),
            right: parallel.dimensions(),
        });
    }

    let width = sequential.width() as usize;

    // Rows are scanned in parallel; collect keeps them in order so the
    // reported mismatches are the first ones in row-major order.
    let rows: Vec<(u64, Vec<Mismatch>)> = sequential
        .values()
        .par_chunks_exact(width)
        .zip(parallel.values().par_chunks_exact(width))
        .enumerate()
        .map(|(y, (row_a, row_b))| {
            let mut count = 0u64;
            let mut found = Vec::new();
            for (x, (&a, &b)) in row_a.iter().zip(row_b.iter()).enumerate() {
                if a != b {
                    count += 1;
                    if found.len() < max_reported {
                        found.push(Mismatch {
                            x: x as u32,
                            y: y as u32,
                            sequential: a,
                            parallel: b,
                        });
                    }
                }
            }
            (count, found)
        })
        .collect();

    let mut mismatch_count = 0u64;
    let mut mismatches = Vec::new();
    for (count, found) in rows {
        mismatch_count += count;
        let room = max_reported - mismatches.len();
        mismatches.extend(found.into_iter().take(room));
    }

    Ok(Comparison {
        dimensions: sequential.dimensions(),
        mismatch_count,
        mismatches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(width: u32, height: u32, fill: i16) -> EdgeBuffer {
        EdgeBuffer::from_values(width, height, vec![fill; (width * height) as usize]).unwrap()
    }

    #[test]
    fn test_identical_buffers_are_equivalent() {
        let a = buffer(8, 5, 12);
        let result = compare(&a, &a.clone(), 10).unwrap();
        assert!(result.is_equivalent());
        assert_eq!(result.mismatch_count(), 0);
        assert!(result.first_mismatch().is_none());
        assert_eq!(result.dimensions(), Dimensions::new(8, 5));
    }

    #[test]
    fn test_single_difference_is_located() {
        let a = buffer(6, 4, 0);
        let mut b = a.clone();
        b.set(4, 2, 99);

        let result = compare(&a, &b, 10).unwrap();
        assert!(!result.is_equivalent());
        assert_eq!(result.mismatch_count(), 1);
        assert_eq!(
            result.first_mismatch(),
            Some(&Mismatch {
                x: 4,
                y: 2,
                sequential: 0,
                parallel: 99,
            })
        );
    }

    #[test]
    fn test_report_is_capped_but_count_is_not() {
        let a = buffer(5, 5, 1);
        let b = buffer(5, 5, 2);

        let result = compare(&a, &b, 3).unwrap();
        assert_eq!(result.mismatch_count(), 25);
        let coords: Vec<(u32, u32)> = result.mismatches().iter().map(|m| (m.x, m.y)).collect();
        assert_eq!(coords, vec![(0, 0), (1, 0), (2, 0)]);
    }

    #[test]
    fn test_first_mismatches_follow_row_major_order() {
        let a = buffer(4, 4, 0);
        let mut b = a.clone();
        b.set(3, 3, 1);
        b.set(0, 1, 1);
        b.set(2, 1, 1);

        let result = compare(&a, &b, 2).unwrap();
        assert_eq!(result.mismatch_count(), 3);
        let coords: Vec<(u32, u32)> = result.mismatches().iter().map(|m| (m.x, m.y)).collect();
        assert_eq!(coords, vec![(0, 1), (2, 1)]);
    }

    #[test]
    fn test_zero_reported_still_counts() {
        let a = buffer(3, 3, 0);
        let b = buffer(3, 3, 5);
        let result = compare(&a, &b, 0).unwrap();
        assert_eq!(result.mismatch_count(), 9);
        assert!(result.mismatches().is_empty());
    }

    #[test]
    fn test_dimension_mismatch_is_an_error() {
        let a = buffer(4, 4, 0);
        let b = buffer(4, 5, 0);
        let result = compare(&a, &b, 10);
        assert!(matches!(
            result,
            Err(Error::DimensionMismatch { left, right })
                if left == Dimensions::new(4, 4) && right == Dimensions::new(4, 5)
        ));
    }

    #[test]
    fn test_transposed_dimensions_are_a_mismatch() {
        let a = buffer(2, 8, 0);
        let b = buffer(8, 2, 0);
        assert!(matches!(
            compare(&a, &b, 1),
            Err(Error::DimensionMismatch { .. })
        ));
    }
}
