//! Point-Jacobi driver.

use super::SolveOutcome;
use crate::chunk::{Chunk, FieldId};
use crate::comms::Communicator;
use crate::error::HearthResult;
use crate::halo::halo_update;
use crate::kernels::jacobi;
use crate::settings::Settings;

pub fn jacobi_solve(
    chunks: &mut [Chunk],
    settings: &Settings,
    comm: &dyn Communicator,
) -> HearthResult<SolveOutcome> {
    profiling::scope!("jacobi_solve");
    let rx = settings.dt_init / (settings.dx() * settings.dx());
    let ry = settings.dt_init / (settings.dy() * settings.dy());

    for chunk in chunks.iter_mut() {
        let (x, y) = (chunk.x, chunk.y);
        let Chunk {
            density,
            energy,
            u0,
            u,
            kx,
            ky,
            ..
        } = chunk;
        jacobi::init(
            settings.backend,
            x,
            y,
            settings.halo_depth,
            settings.coefficient,
            rx,
            ry,
            density,
            energy,
            u0,
            u,
            kx,
            ky,
        );
    }
    halo_update(chunks, settings, comm, &[FieldId::U], 1)?;

    let mut error = f64::MAX;
    let mut iterations = 0;
    for tt in 0..settings.max_iters {
        let mut local = 0.0;
        for chunk in chunks.iter_mut() {
            let (x, y) = (chunk.x, chunk.y);
            let Chunk { u0, u, r, kx, ky, .. } = chunk;
            local += jacobi::iterate(
                settings.backend,
                x,
                y,
                settings.halo_depth,
                u0,
                u,
                r,
                kx,
                ky,
            );
        }
        error = comm.reduce_sum(local);
        halo_update(chunks, settings, comm, &[FieldId::U], 1)?;
        iterations = tt + 1;
        log::debug!("jacobi iteration {}: error {:e}", iterations, error);
        if error < settings.eps {
            break;
        }
    }

    Ok(SolveOutcome {
        converged: error < settings.eps,
        iterations,
        residual: error,
    })
}
