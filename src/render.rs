//! Renders the assembled temperature field as a PNG through a colour
//! gradient. Strictly a reporting surface; the solver core never calls
//! into here.

use crate::chunk::Chunk;
use crate::error::{HearthError, HearthResult};
use crate::settings::Settings;
use std::path::Path;

/// Gathers every chunk's interior `u` values into the global cell grid
/// and writes it as an image, min/max normalised.
pub fn render_u<P: AsRef<Path>>(
    chunks: &[Chunk],
    settings: &Settings,
    path: P,
) -> HearthResult<()> {
    let width = settings.grid_x_cells;
    let height = settings.grid_y_cells;
    let halo = settings.halo_depth;

    let mut grid = vec![0.0; width * height];
    for chunk in chunks {
        for jj in halo..chunk.y - halo {
            for kk in halo..chunk.x - halo {
                let global_x = chunk.left + kk - halo;
                let global_y = chunk.bottom + jj - halo;
                grid[global_y * width + global_x] = chunk.u[kk + jj * chunk.x];
            }
        }
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in &grid {
        min = min.min(*v);
        max = max.max(*v);
    }
    let range = if max > min { max - min } else { 1.0 };

    let gradient = colorous::TURBO;
    let mut img = image::RgbImage::new(width as u32, height as u32);
    for (l, v) in grid.iter().enumerate() {
        let i = (l % width) as u32;
        // image rows run top-down, grid rows bottom-up
        let j = (height - 1 - l / width) as u32;
        let c = gradient.eval_continuous((v - min) / range);
        img.put_pixel(i, j, image::Rgb(c.as_array()));
    }
    img.save(path.as_ref())
        .map_err(|e| HearthError::Config(format!("could not save image: {}", e)))
}
