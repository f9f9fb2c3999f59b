//! Polynomial-preconditioned CG inner-smoothing kernels.

use super::{interior, smvp};
use crate::backend::Backend;
use crate::par_slice;

/// Seeds the smoothing direction: `sd = r / theta`.
pub fn init(
    backend: Backend,
    x: usize,
    y: usize,
    halo_depth: usize,
    theta: f64,
    r: &[f64],
    sd: &mut [f64],
) {
    par_slice::apply(backend, sd, |i, sd_i| {
        if interior(i, x, y, halo_depth) {
            *sd_i = r[i] / theta;
        }
    });
}

/// One inner smoothing step: `r -= A sd; u += sd`, then
/// `sd = alpha sd + beta r`.
#[allow(clippy::too_many_arguments)]
pub fn inner_iteration(
    backend: Backend,
    x: usize,
    y: usize,
    halo_depth: usize,
    alpha: f64,
    beta: f64,
    u: &mut [f64],
    r: &mut [f64],
    kx: &[f64],
    ky: &[f64],
    sd: &mut [f64],
) {
    {
        let sd: &[f64] = sd;
        par_slice::apply2(backend, r, u, |i, r_i, u_i| {
            if !interior(i, x, y, halo_depth) {
                return;
            }
            *r_i -= smvp(sd, kx, ky, i, x);
            *u_i += sd[i];
        });
    }

    {
        let r: &[f64] = r;
        par_slice::apply(backend, sd, |i, sd_i| {
            if interior(i, x, y, halo_depth) {
                *sd_i = alpha * *sd_i + beta * r[i];
            }
        });
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn inner_iteration_identity_operator() {
        // Zero conductivity: A = I, so r -= sd and u += sd.
        let (x, y, halo) = (5, 5, 1);
        let n = x * y;
        let mut u = vec![0.0; n];
        let mut r = vec![4.0; n];
        let kx = vec![0.0; n];
        let ky = vec![0.0; n];
        let mut sd = vec![2.0; n];
        inner_iteration(
            Backend::Serial,
            x,
            y,
            halo,
            0.5,
            0.25,
            &mut u,
            &mut r,
            &kx,
            &ky,
            &mut sd,
        );
        let c = 6;
        assert_approx_eq!(f64, r[c], 2.0);
        assert_approx_eq!(f64, u[c], 2.0);
        // sd = 0.5*2 + 0.25*2
        assert_approx_eq!(f64, sd[c], 1.5);
        // halo untouched
        assert_approx_eq!(f64, sd[0], 2.0);
    }
}
