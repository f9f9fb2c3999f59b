//! Packs boundary strips into flat comm buffers and unpacks received
//! buffers into ghost regions.
//!
//! Each boundary line is a contiguous run of `depth` (left/right) or `x`
//! (bottom/top) cells, so both directions are expressed as disjoint
//! line copies.

use crate::backend::Backend;
use crate::chunk::Face;
use crate::par_slice;

/// Copies a `depth`-wide boundary-adjacent interior strip of `field` into
/// `buffer`. The buffer must be exactly `face_len * depth`.
#[allow(clippy::too_many_arguments)]
pub fn pack(
    backend: Backend,
    face: Face,
    x: usize,
    y: usize,
    depth: usize,
    halo_depth: usize,
    field: &[f64],
    buffer: &mut [f64],
) {
    match face {
        Face::Left => {
            debug_assert_eq!(buffer.len(), y * depth);
            par_slice::for_each_line(backend, buffer, depth, |jj, line| {
                line.copy_from_slice(&field[jj * x + halo_depth..][..depth]);
            });
        }
        Face::Right => {
            debug_assert_eq!(buffer.len(), y * depth);
            let first_col = x - halo_depth - depth;
            par_slice::for_each_line(backend, buffer, depth, |jj, line| {
                line.copy_from_slice(&field[jj * x + first_col..][..depth]);
            });
        }
        Face::Bottom => {
            debug_assert_eq!(buffer.len(), x * depth);
            par_slice::for_each_line(backend, buffer, x, |lines, line| {
                line.copy_from_slice(&field[x * (halo_depth + lines)..][..x]);
            });
        }
        Face::Top => {
            debug_assert_eq!(buffer.len(), x * depth);
            let first_row = y - halo_depth - depth;
            par_slice::for_each_line(backend, buffer, x, |lines, line| {
                line.copy_from_slice(&field[x * (first_row + lines)..][..x]);
            });
        }
    }
}

/// Inverse of [`pack`]: copies a received buffer into the ghost region of
/// `field` on the given face.
#[allow(clippy::too_many_arguments)]
pub fn unpack(
    backend: Backend,
    face: Face,
    x: usize,
    y: usize,
    depth: usize,
    halo_depth: usize,
    buffer: &[f64],
    field: &mut [f64],
) {
    match face {
        Face::Left => {
            debug_assert_eq!(buffer.len(), y * depth);
            let first_col = halo_depth - depth;
            par_slice::for_each_line(backend, field, x, |jj, row| {
                row[first_col..][..depth].copy_from_slice(&buffer[jj * depth..][..depth]);
            });
        }
        Face::Right => {
            debug_assert_eq!(buffer.len(), y * depth);
            let first_col = x - halo_depth;
            par_slice::for_each_line(backend, field, x, |jj, row| {
                row[first_col..][..depth].copy_from_slice(&buffer[jj * depth..][..depth]);
            });
        }
        Face::Bottom => {
            debug_assert_eq!(buffer.len(), x * depth);
            let ghost = &mut field[x * (halo_depth - depth)..][..x * depth];
            par_slice::for_each_line(backend, ghost, x, |lines, row| {
                row.copy_from_slice(&buffer[x * lines..][..x]);
            });
        }
        Face::Top => {
            debug_assert_eq!(buffer.len(), x * depth);
            let ghost = &mut field[x * (y - halo_depth)..][..x * depth];
            par_slice::for_each_line(backend, ghost, x, |lines, row| {
                row.copy_from_slice(&buffer[x * lines..][..x]);
            });
        }
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn numbered_field(x: usize, y: usize) -> Vec<f64> {
        (0..x * y).map(|i| i as f64).collect()
    }

    #[test]
    fn pack_unpack_left_right_roundtrip() {
        // Pack the right interior strip of one field and unpack it into
        // the left ghost strip of another, for every legal depth.
        let (x, y, halo) = (8_usize, 6_usize, 2_usize);
        for depth in 1..=halo {
            let src = numbered_field(x, y);
            let mut dst = vec![0.0; x * y];
            let mut buffer = vec![0.0; y * depth];

            pack(Backend::Serial, Face::Right, x, y, depth, halo, &src, &mut buffer);
            unpack(Backend::Serial, Face::Left, x, y, depth, halo, &buffer, &mut dst);

            for jj in 0..y {
                for d in 0..depth {
                    let ghost = jj * x + (halo - depth) + d;
                    let interior = jj * x + (x - halo - depth) + d;
                    assert_approx_eq!(f64, dst[ghost], src[interior]);
                }
            }
        }
    }

    #[test]
    fn pack_unpack_top_bottom_roundtrip() {
        let (x, y, halo) = (6_usize, 8_usize, 2_usize);
        for depth in 1..=halo {
            let src = numbered_field(x, y);
            let mut dst = vec![0.0; x * y];
            let mut buffer = vec![0.0; x * depth];

            pack(Backend::Serial, Face::Top, x, y, depth, halo, &src, &mut buffer);
            unpack(Backend::Serial, Face::Bottom, x, y, depth, halo, &buffer, &mut dst);

            for lines in 0..depth {
                for kk in 0..x {
                    let ghost = x * (halo - depth + lines) + kk;
                    let interior = x * (y - halo - depth + lines) + kk;
                    assert_approx_eq!(f64, dst[ghost], src[interior]);
                }
            }
        }
    }

    #[test]
    fn pack_left_takes_first_interior_columns() {
        let (x, y, halo) = (6_usize, 4_usize, 1_usize);
        let src = numbered_field(x, y);
        let mut buffer = vec![0.0; y];
        pack(Backend::Serial, Face::Left, x, y, 1, halo, &src, &mut buffer);
        for jj in 0..y {
            assert_approx_eq!(f64, buffer[jj], (jj * x + halo) as f64);
        }
    }
}
