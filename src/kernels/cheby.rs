//! Chebyshev-accelerated solver kernels.
//!
//! The per-iteration alpha/beta come from the Chebyshev recurrence over
//! the estimated eigenvalue bounds, not from the data, which is what
//! removes CG's two global reductions per iteration.

use super::{interior, smvp};
use crate::backend::Backend;
use crate::par_slice;

fn calc_u(
    backend: Backend,
    x: usize,
    y: usize,
    halo_depth: usize,
    u: &mut [f64],
    p: &[f64],
) {
    par_slice::apply(backend, u, |i, u_i| {
        if interior(i, x, y, halo_depth) {
            *u_i += p[i];
        }
    });
}

/// First Chebyshev step: `p = (u0 - A u) / theta`, then `u += p`.
#[allow(clippy::too_many_arguments)]
pub fn init(
    backend: Backend,
    x: usize,
    y: usize,
    halo_depth: usize,
    theta: f64,
    u: &mut [f64],
    u0: &[f64],
    p: &mut [f64],
    r: &mut [f64],
    w: &mut [f64],
    kx: &[f64],
    ky: &[f64],
) {
    {
        let u: &[f64] = u;
        par_slice::apply3(backend, w, r, p, |i, w_i, r_i, p_i| {
            if !interior(i, x, y, halo_depth) {
                return;
            }
            *w_i = smvp(u, kx, ky, i, x);
            *r_i = u0[i] - *w_i;
            *p_i = *r_i / theta;
        });
    }

    calc_u(backend, x, y, halo_depth, u, p);
}

/// The main Chebyshev iteration: `p = alpha p + beta (u0 - A u)`, then
/// `u += p`.
#[allow(clippy::too_many_arguments)]
pub fn iterate(
    backend: Backend,
    x: usize,
    y: usize,
    halo_depth: usize,
    alpha: f64,
    beta: f64,
    u: &mut [f64],
    u0: &[f64],
    p: &mut [f64],
    r: &mut [f64],
    w: &mut [f64],
    kx: &[f64],
    ky: &[f64],
) {
    {
        let u: &[f64] = u;
        par_slice::apply3(backend, w, r, p, |i, w_i, r_i, p_i| {
            if !interior(i, x, y, halo_depth) {
                return;
            }
            *w_i = smvp(u, kx, ky, i, x);
            *r_i = u0[i] - *w_i;
            *p_i = alpha * *p_i + beta * *r_i;
        });
    }

    calc_u(backend, x, y, halo_depth, u, p);
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn init_scales_residual_by_theta() {
        // Zero conductivity: A = I, so r = u0 - u and p = r / theta.
        let (x, y, halo) = (5, 5, 1);
        let n = x * y;
        let mut u = vec![1.0; n];
        let u0 = vec![3.0; n];
        let mut p = vec![0.0; n];
        let mut r = vec![0.0; n];
        let mut w = vec![0.0; n];
        let kx = vec![0.0; n];
        let ky = vec![0.0; n];
        init(
            Backend::Serial,
            x,
            y,
            halo,
            2.0,
            &mut u,
            &u0,
            &mut p,
            &mut r,
            &mut w,
            &kx,
            &ky,
        );
        let c = 6 + 6; // arbitrary interior index (2, 2)
        assert_approx_eq!(f64, r[c], 2.0);
        assert_approx_eq!(f64, p[c], 1.0);
        assert_approx_eq!(f64, u[c], 2.0);
    }
}
