//! Point-Jacobi solver kernels.

use super::in_band;
use crate::backend::Backend;
use crate::par_slice;
use crate::settings::Coefficient;

/// Sets `u0 = u = energy * density` and derives the face conductivities
/// from the density field via harmonic-mean averaging.
#[allow(clippy::too_many_arguments)]
pub fn init(
    backend: Backend,
    x: usize,
    y: usize,
    halo_depth: usize,
    coefficient: Coefficient,
    rx: f64,
    ry: f64,
    density: &[f64],
    energy: &[f64],
    u0: &mut [f64],
    u: &mut [f64],
    kx: &mut [f64],
    ky: &mut [f64],
) {
    par_slice::apply2(backend, u0, u, |i, u0_i, u_i| {
        if in_band(i, x, y, 1, 1) {
            let temp = energy[i] * density[i];
            *u0_i = temp;
            *u_i = temp;
        }
    });

    par_slice::apply2(backend, kx, ky, |i, kx_i, ky_i| {
        if in_band(i, x, y, halo_depth, 1) {
            let centre = match coefficient {
                Coefficient::Conductivity => density[i],
                Coefficient::RecipConductivity => 1.0 / density[i],
            };
            let left = match coefficient {
                Coefficient::Conductivity => density[i - 1],
                Coefficient::RecipConductivity => 1.0 / density[i - 1],
            };
            let down = match coefficient {
                Coefficient::Conductivity => density[i - x],
                Coefficient::RecipConductivity => 1.0 / density[i - x],
            };

            *kx_i = rx * (left + centre) / (2.0 * left * centre);
            *ky_i = ry * (down + centre) / (2.0 * down * centre);
        }
    });
}

/// One Jacobi sweep: stashes `u` in `r`, recomputes `u` from the stashed
/// neighbour values, and returns this chunk's `sum |u - r|`.
#[allow(clippy::too_many_arguments)]
pub fn iterate(
    backend: Backend,
    x: usize,
    y: usize,
    halo_depth: usize,
    u0: &[f64],
    u: &mut [f64],
    r: &mut [f64],
    kx: &[f64],
    ky: &[f64],
) -> f64 {
    par_slice::copy(backend, r, u);
    let r: &[f64] = r;

    par_slice::reduce_apply(backend, u, |i, u_i| {
        if !in_band(i, x, y, halo_depth, halo_depth) {
            return 0.0;
        }
        *u_i = (u0[i]
            + (kx[i + 1] * r[i + 1] + kx[i] * r[i - 1])
            + (ky[i + x] * r[i + x] + ky[i] * r[i - x]))
            / (1.0 + (kx[i] + kx[i + 1]) + (ky[i] + ky[i + x]));
        (*u_i - r[i]).abs()
    })
}
