//! Conjugate gradient solver kernels.

use super::{in_band, interior, smvp};
use crate::backend::Backend;
use crate::par_slice;
use crate::settings::Coefficient;

/// Full CG setup: zeroes the search vectors, loads `u`, derives the face
/// conductivities, and seeds `w`, `r`, `p` from the first operator
/// application. Returns this chunk's initial `rro = sum r . p`.
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
    u: &mut [f64],
    p: &mut [f64],
    r: &mut [f64],
    w: &mut [f64],
    kx: &mut [f64],
    ky: &mut [f64],
) -> f64 {
    par_slice::apply3(backend, p, r, u, |i, p_i, r_i, u_i| {
        *p_i = 0.0;
        *r_i = 0.0;
        *u_i = energy[i] * density[i];
    });

    par_slice::apply(backend, w, |i, w_i| {
        if in_band(i, x, y, 1, 1) {
            *w_i = match coefficient {
                Coefficient::Conductivity => density[i],
                Coefficient::RecipConductivity => 1.0 / density[i],
            };
        }
    });

    {
        let w: &[f64] = w;
        par_slice::apply2(backend, kx, ky, |i, kx_i, ky_i| {
            if in_band(i, x, y, halo_depth, 1) {
                *kx_i = rx * (w[i - 1] + w[i]) / (2.0 * w[i - 1] * w[i]);
                *ky_i = ry * (w[i - x] + w[i]) / (2.0 * w[i - x] * w[i]);
            }
        });
    }

    let u: &[f64] = u;
    let kx: &[f64] = kx;
    let ky: &[f64] = ky;
    par_slice::reduce_apply3(backend, w, r, p, |i, w_i, r_i, p_i| {
        if !interior(i, x, y, halo_depth) {
            return 0.0;
        }
        *w_i = smvp(u, kx, ky, i, x);
        *r_i = u[i] - *w_i;
        *p_i = *r_i;
        *r_i * *p_i
    })
}

/// `w = A p`; returns this chunk's `pw = sum w . p`.
pub fn calc_w(
    backend: Backend,
    x: usize,
    y: usize,
    halo_depth: usize,
    p: &[f64],
    w: &mut [f64],
    kx: &[f64],
    ky: &[f64],
) -> f64 {
    par_slice::reduce_apply(backend, w, |i, w_i| {
        if !interior(i, x, y, halo_depth) {
            return 0.0;
        }
        *w_i = smvp(p, kx, ky, i, x);
        *w_i * p[i]
    })
}

/// `u += alpha p; r -= alpha w`; returns this chunk's `rrn = sum r . r`.
#[allow(clippy::too_many_arguments)]
pub fn calc_ur(
    backend: Backend,
    x: usize,
    y: usize,
    halo_depth: usize,
    alpha: f64,
    u: &mut [f64],
    r: &mut [f64],
    p: &[f64],
    w: &[f64],
) -> f64 {
    par_slice::reduce_apply2(backend, u, r, |i, u_i, r_i| {
        if !interior(i, x, y, halo_depth) {
            return 0.0;
        }
        *u_i += alpha * p[i];
        *r_i -= alpha * w[i];
        *r_i * *r_i
    })
}

/// `p = beta p + r`.
pub fn calc_p(
    backend: Backend,
    x: usize,
    y: usize,
    halo_depth: usize,
    beta: f64,
    p: &mut [f64],
    r: &[f64],
) {
    par_slice::apply(backend, p, |i, p_i| {
        if interior(i, x, y, halo_depth) {
            *p_i = beta * *p_i + r[i];
        }
    });
}
