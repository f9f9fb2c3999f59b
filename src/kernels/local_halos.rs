//! Reflective ghost updates for faces with no neighbouring chunk.
//!
//! The copy runs between two offsets of the same buffer; the flip index
//! mirrors each ghost line onto its matching interior line so strips of
//! depth > 1 land correctly in one pass.

use crate::backend::Backend;
use crate::chunk::Face;
use crate::par_slice;

/// Mirrors the boundary-adjacent interior strip of `field` into the ghost
/// region of the given face.
pub fn update_face(
    backend: Backend,
    face: Face,
    x: usize,
    y: usize,
    depth: usize,
    halo_depth: usize,
    field: &mut [f64],
) {
    match face {
        Face::Left => {
            par_slice::for_each_line(backend, field, x, |_, row| {
                let (ghost, interior) = row.split_at_mut(halo_depth);
                for flip in 0..depth {
                    let to = halo_depth - depth + flip;
                    let from = to + 2 * (depth - flip) - 1;
                    ghost[to] = interior[from - halo_depth];
                }
            });
        }
        Face::Right => {
            par_slice::for_each_line(backend, field, x, |_, row| {
                let (interior, ghost) = row.split_at_mut(x - halo_depth);
                for flip in 0..depth {
                    let to = x - halo_depth + flip;
                    let from = to - (1 + flip * 2);
                    ghost[flip] = interior[from];
                }
            });
        }
        Face::Bottom => {
            let (front, interior) = field.split_at_mut(x * halo_depth);
            let ghost = &mut front[x * (halo_depth - depth)..];
            par_slice::for_each_line(backend, ghost, x, |line, row| {
                // ghost line `line` is absolute row halo_depth - depth + line
                let lines = depth - 1 - line;
                row.copy_from_slice(&interior[x * lines..][..x]);
            });
        }
        Face::Top => {
            let (interior, back) = field.split_at_mut(x * (y - halo_depth));
            let ghost = &mut back[..x * depth];
            par_slice::for_each_line(backend, ghost, x, |lines, row| {
                let from_row = y - halo_depth - 1 - lines;
                row.copy_from_slice(&interior[x * from_row..][..x]);
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
    fn left_right_reflection_depth_2() {
        let (x, y, halo) = (8_usize, 4_usize, 2_usize);
        let mut field = numbered_field(x, y);
        update_face(Backend::Serial, Face::Left, x, y, 2, halo, &mut field);
        update_face(Backend::Serial, Face::Right, x, y, 2, halo, &mut field);
        for jj in 0..y {
            let row = jj * x;
            // left ghost mirrors the first interior columns
            assert_approx_eq!(f64, field[row + 1], (row + 2) as f64);
            assert_approx_eq!(f64, field[row], (row + 3) as f64);
            // right ghost mirrors the last interior columns
            assert_approx_eq!(f64, field[row + x - 2], (row + x - 3) as f64);
            assert_approx_eq!(f64, field[row + x - 1], (row + x - 4) as f64);
        }
    }

    #[test]
    fn top_bottom_reflection_depth_2() {
        let (x, y, halo) = (4_usize, 8_usize, 2_usize);
        let mut field = numbered_field(x, y);
        update_face(Backend::Serial, Face::Bottom, x, y, 2, halo, &mut field);
        update_face(Backend::Serial, Face::Top, x, y, 2, halo, &mut field);
        for kk in 0..x {
            // bottom ghost rows 1, 0 mirror interior rows 2, 3
            assert_approx_eq!(f64, field[x + kk], (2 * x + kk) as f64);
            assert_approx_eq!(f64, field[kk], (3 * x + kk) as f64);
            // top ghost rows 6, 7 mirror interior rows 5, 4
            assert_approx_eq!(f64, field[6 * x + kk], (5 * x + kk) as f64);
            assert_approx_eq!(f64, field[7 * x + kk], (4 * x + kk) as f64);
        }
    }

    #[test]
    fn depth_1_touches_single_line() {
        let (x, y, halo) = (6_usize, 6_usize, 2_usize);
        let mut field = numbered_field(x, y);
        let before = field.clone();
        update_face(Backend::Serial, Face::Left, x, y, 1, halo, &mut field);
        for jj in 0..y {
            let row = jj * x;
            // ghost column halo-1 mirrors interior column halo
            assert_approx_eq!(f64, field[row + 1], before[row + 2]);
            // column 0 untouched at depth 1
            assert_approx_eq!(f64, field[row], before[row]);
        }
    }
}
