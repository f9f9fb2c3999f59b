//! Applies the problem's initial states over a chunk's mesh.

use super::in_band;
use crate::backend::Backend;
use crate::par_slice;
use crate::settings::{State, StateGeometry};

/// Fills `density`/`energy0` from the default (first) state, applies the
/// remaining states in order over the vertex/cell coordinate arrays, then
/// loads `u = energy0 * density` on the inner ring.
#[allow(clippy::too_many_arguments)]
pub fn set_chunk_state(
    backend: Backend,
    x: usize,
    y: usize,
    vertex_x: &[f64],
    vertex_y: &[f64],
    cell_x: &[f64],
    cell_y: &[f64],
    density: &mut [f64],
    energy0: &mut [f64],
    u: &mut [f64],
    states: &[State],
) {
    let default_state = states[0];
    par_slice::apply2(backend, density, energy0, |_, density_i, energy0_i| {
        *density_i = default_state.density;
        *energy0_i = default_state.energy;
    });

    for state in &states[1..] {
        let state = *state;
        par_slice::apply2(backend, density, energy0, |i, density_i, energy0_i| {
            let kk = i % x;
            let jj = i / x;

            let apply_state = match state.geometry {
                StateGeometry::Default => false,
                StateGeometry::Rectangle {
                    x_min,
                    y_min,
                    x_max,
                    y_max,
                } => {
                    vertex_x[kk + 1] >= x_min
                        && vertex_x[kk] < x_max
                        && vertex_y[jj + 1] >= y_min
                        && vertex_y[jj] < y_max
                }
                StateGeometry::Circle {
                    x: cx,
                    y: cy,
                    radius,
                } => {
                    let dx = cell_x[kk] - cx;
                    let dy = cell_y[jj] - cy;
                    (dx * dx + dy * dy).sqrt() <= radius
                }
                StateGeometry::Point { x: px, y: py } => {
                    vertex_x[kk] == px && vertex_y[jj] == py
                }
            };

            if apply_state {
                *energy0_i = state.energy;
                *density_i = state.density;
            }
        });
    }

    {
        let density: &[f64] = density;
        let energy0: &[f64] = energy0;
        par_slice::apply(backend, u, |i, u_i| {
            if in_band(i, x, y, 1, 1) {
                *u_i = energy0[i] * density[i];
            }
        });
    }
}
