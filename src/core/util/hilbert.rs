//! Hilbert curve ordering of lattice points.
//!
//! Inserting vertices along a space-filling curve keeps consecutive
//! insertions close together, so each point-location walk starts next to its
//! target.

use crate::geometry::point::GridPoint;

/// Bits per axis used when ordering points. Points closer than
/// `extent / 2^HILBERT_BITS` share a curve cell and keep their relative order.
pub const HILBERT_BITS: u32 = 16;

/// Map lattice points to `[0, 2^bits)` per axis, relative to their common
/// bounding cube.
///
/// # Panics
/// Panics if `bits == 0` or `bits > 31`.
///
/// # Examples
///
/// ```rust
/// use periodic_delaunay::core::util::hilbert::quantize_points;
/// use periodic_delaunay::geometry::point::GridPoint;
///
/// let pts = [GridPoint::new([0, 0, 0]), GridPoint::new([1 << 20, 1 << 19, 0])];
/// let q = quantize_points(&pts, 4);
/// assert_eq!(q, vec![[0, 0, 0], [8, 4, 0]]);
/// ```
#[must_use]
pub fn quantize_points(points: &[GridPoint], bits: u32) -> Vec<[u32; 3]> {
    assert!(bits > 0 && bits <= 31, "bits must be in range [1, 31]");

    let Some(first) = points.first() else {
        return Vec::new();
    };
    let mut lo = *first.coords();
    let mut hi = lo;
    for p in points {
        for axis in 0..3 {
            lo[axis] = lo[axis].min(p.coords()[axis]);
            hi[axis] = hi[axis].max(p.coords()[axis]);
        }
    }
    let extent = (0..3).map(|a| hi[a] - lo[a]).max().unwrap_or(0);

    // Smallest shift that brings the extent below 2^bits.
    let extent_bits = u64::BITS - extent.unsigned_abs().leading_zeros();
    let shift = extent_bits.saturating_sub(bits);
    let max_cell = (1_u32 << bits) - 1;

    points
        .iter()
        .map(|p| {
            let c = p.coords();
            std::array::from_fn(|axis| {
                let cell = ((c[axis] - lo[axis]) >> shift).unsigned_abs();
                u32::try_from(cell).unwrap_or(max_cell).min(max_cell)
            })
        })
        .collect()
}

/// Hilbert index of integer coordinates, each `bits` wide.
///
/// Uses Skilling's transpose algorithm (J. Skilling, "Programming the
/// Hilbert curve", AIP Conference Proceedings 707, 2004).
#[must_use]
pub fn hilbert_index_from_quantized(coords: &[u32; 3], bits: u32) -> u128 {
    let mut x = *coords;
    let top: u32 = 1 << (bits - 1);

    // Undo excess work.
    let mut q = top;
    while q > 1 {
        let p = q - 1;
        for i in 0..3 {
            if x[i] & q == 0 {
                let t = (x[0] ^ x[i]) & p;
                x[0] ^= t;
                x[i] ^= t;
            } else {
                x[0] ^= p;
            }
        }
        q >>= 1;
    }

    // Gray encode.
    x[1] ^= x[0];
    x[2] ^= x[1];
    let mut t = 0;
    let mut q = top;
    while q > 1 {
        if x[2] & q != 0 {
            t ^= q - 1;
        }
        q >>= 1;
    }
    for c in &mut x {
        *c ^= t;
    }

    // Interleave, most significant bit first.
    let mut index: u128 = 0;
    for bit in (0..bits).rev() {
        for c in x {
            index = (index << 1) | u128::from((c >> bit) & 1);
        }
    }
    index
}

/// Indices of `points` in Hilbert order. Ties keep input order.
///
/// # Examples
///
/// ```rust
/// use periodic_delaunay::core::util::hilbert::hilbert_sorted_indices;
/// use periodic_delaunay::geometry::point::GridPoint;
///
/// let pts = [
///     GridPoint::new([900, 900, 0]),
///     GridPoint::new([0, 0, 0]),
///     GridPoint::new([10, 0, 0]),
/// ];
/// let order = hilbert_sorted_indices(&pts);
/// assert_eq!(order[0], 1);
/// ```
#[must_use]
pub fn hilbert_sorted_indices(points: &[GridPoint]) -> Vec<usize> {
    let quantized = quantize_points(points, HILBERT_BITS);
    let mut keyed: Vec<(u128, usize)> = quantized
        .iter()
        .enumerate()
        .map(|(i, q)| (hilbert_index_from_quantized(q, HILBERT_BITS), i))
        .collect();
    keyed.sort_unstable();
    keyed.into_iter().map(|(_, i)| i).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hilbert_curve_is_continuous_on_3d_grid() {
        let bits: u32 = 3;
        let n: u32 = 1 << bits;

        let mut cells: Vec<([u32; 3], u128)> = Vec::new();
        for x in 0..n {
            for y in 0..n {
                for z in 0..n {
                    let q = [x, y, z];
                    cells.push((q, hilbert_index_from_quantized(&q, bits)));
                }
            }
        }
        cells.sort_by_key(|(_, idx)| *idx);

        for (i, (_, idx)) in cells.iter().enumerate() {
            assert_eq!(*idx, i as u128);
        }
        for pair in cells.windows(2) {
            let (a, b) = (pair[0].0, pair[1].0);
            let step: u32 = (0..3).map(|k| a[k].abs_diff(b[k])).sum();
            assert_eq!(step, 1, "non-adjacent step: {a:?} -> {b:?}");
        }
    }

    #[test]
    fn test_origin_maps_to_zero() {
        assert_eq!(hilbert_index_from_quantized(&[0, 0, 0], 16), 0);
    }

    #[test]
    fn test_sorted_indices_is_a_permutation() {
        let pts: Vec<GridPoint> = (0..50_i64)
            .map(|i| GridPoint::new([(i * 7919) % 1000, (i * 104_729) % 1000, (i * 31) % 1000]))
            .collect();
        let mut order = hilbert_sorted_indices(&pts);
        order.sort_unstable();
        assert_eq!(order, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_quantize_handles_negative_coordinates_and_single_point() {
        let pts = [GridPoint::new([-100, -100, -100]), GridPoint::new([100, 100, 100])];
        let q = quantize_points(&pts, 8);
        assert_eq!(q[0], [0, 0, 0]);
        assert_eq!(q[1], [200, 200, 200]);

        let single = quantize_points(&[GridPoint::new([5, 5, 5])], 8);
        assert_eq!(single, vec![[0, 0, 0]]);
    }
}
