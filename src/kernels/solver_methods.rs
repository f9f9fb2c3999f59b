//! Methods shared between the solvers.

use super::{interior, smvp};
use crate::backend::Backend;
use crate::par_slice;

/// Copies the current `u` into `u0`, interior only.
pub fn copy_u(
    backend: Backend,
    x: usize,
    y: usize,
    halo_depth: usize,
    u0: &mut [f64],
    u: &[f64],
) {
    par_slice::apply(backend, u0, |i, u0_i| {
        if interior(i, x, y, halo_depth) {
            *u0_i = u[i];
        }
    });
}

/// `r = u0 - A u`.
#[allow(clippy::too_many_arguments)]
pub fn calculate_residual(
    backend: Backend,
    x: usize,
    y: usize,
    halo_depth: usize,
    u: &[f64],
    u0: &[f64],
    r: &mut [f64],
    kx: &[f64],
    ky: &[f64],
) {
    par_slice::apply(backend, r, |i, r_i| {
        if interior(i, x, y, halo_depth) {
            *r_i = u0[i] - smvp(u, kx, ky, i, x);
        }
    });
}

/// Squared 2-norm of a buffer over the interior.
pub fn calculate_2norm(
    backend: Backend,
    x: usize,
    y: usize,
    halo_depth: usize,
    buffer: &[f64],
) -> f64 {
    par_slice::reduce(
        backend,
        buffer.len(),
        0.0,
        |i| {
            if interior(i, x, y, halo_depth) {
                buffer[i] * buffer[i]
            } else {
                0.0
            }
        },
        |a, b| a + b,
    )
}

/// Converts the solved temperature back to energy: `energy = u / density`.
pub fn finalise(
    backend: Backend,
    x: usize,
    y: usize,
    halo_depth: usize,
    density: &[f64],
    u: &[f64],
    energy: &mut [f64],
) {
    par_slice::apply(backend, energy, |i, energy_i| {
        if interior(i, x, y, halo_depth) {
            *energy_i = u[i] / density[i];
        }
    });
}

/// Stores the original energy state, whole buffer.
pub fn store_energy(backend: Backend, energy0: &[f64], energy: &mut [f64]) {
    par_slice::copy(backend, energy, energy0);
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn norm_ignores_halo() {
        let (x, y, halo) = (4, 4, 1);
        let buffer = vec![2.0; x * y];
        // 2x2 interior of a 4x4 grid
        let norm = calculate_2norm(Backend::Serial, x, y, halo, &buffer);
        assert_approx_eq!(f64, norm, 16.0);
    }

    #[test]
    fn finalise_divides_by_density() {
        let (x, y, halo) = (4, 4, 1);
        let n = x * y;
        let density = vec![4.0; n];
        let u = vec![2.0; n];
        let mut energy = vec![0.0; n];
        finalise(Backend::Serial, x, y, halo, &density, &u, &mut energy);
        assert_approx_eq!(f64, energy[5], 0.5);
        assert_approx_eq!(f64, energy[0], 0.0);
    }
}
