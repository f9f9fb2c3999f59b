//! Mesh data initialisation for one chunk.

use crate::backend::Backend;
use crate::par_slice;

/// Fills the vertex/cell coordinate arrays and the cell geometry buffers.
/// `x_min`/`y_min` are the world coordinates of this chunk's interior
/// origin, so vertex positions run backwards through the halo border.
#[allow(clippy::too_many_arguments)]
pub fn set_chunk_data(
    backend: Backend,
    halo_depth: usize,
    x_min: f64,
    y_min: f64,
    dx: f64,
    dy: f64,
    vertex_x: &mut [f64],
    vertex_y: &mut [f64],
    vertex_dx: &mut [f64],
    vertex_dy: &mut [f64],
    cell_x: &mut [f64],
    cell_y: &mut [f64],
    cell_dx: &mut [f64],
    cell_dy: &mut [f64],
    volume: &mut [f64],
    x_area: &mut [f64],
    y_area: &mut [f64],
) {
    let halo = halo_depth as f64;
    par_slice::apply(backend, vertex_x, |i, v| {
        *v = x_min + dx * (i as f64 - halo);
    });
    par_slice::apply(backend, vertex_y, |i, v| {
        *v = y_min + dy * (i as f64 - halo);
    });
    par_slice::set_value(backend, vertex_dx, dx);
    par_slice::set_value(backend, vertex_dy, dy);

    {
        let vertex_x: &[f64] = vertex_x;
        par_slice::apply(backend, cell_x, |i, c| {
            *c = 0.5 * (vertex_x[i] + vertex_x[i + 1]);
        });
    }
    {
        let vertex_y: &[f64] = vertex_y;
        par_slice::apply(backend, cell_y, |i, c| {
            *c = 0.5 * (vertex_y[i] + vertex_y[i + 1]);
        });
    }
    par_slice::set_value(backend, cell_dx, dx);
    par_slice::set_value(backend, cell_dy, dy);

    par_slice::set_value(backend, volume, dx * dy);
    par_slice::set_value(backend, x_area, dy);
    par_slice::set_value(backend, y_area, dx);
}
