//! Polynomial-preconditioned CG driver.
//!
//! CG outer structure with a fixed-count Chebyshev smoothing loop applied
//! to the residual between the `ur` and `p` updates. The smoothing
//! direction `sd` is halo-refreshed before every inner operator
//! application.

use super::{eigenvalues, SolveOutcome};
use crate::chunk::{Chunk, FieldId};
use crate::comms::Communicator;
use crate::drivers::cg as cg_driver;
use crate::error::HearthResult;
use crate::halo::halo_update;
use crate::kernels::{cg, ppcg, solver_methods};
use crate::settings::Settings;

pub fn ppcg_solve(
    chunks: &mut [Chunk],
    settings: &Settings,
    comm: &dyn Communicator,
) -> HearthResult<SolveOutcome> {
    profiling::scope!("ppcg_solve");
    let backend = settings.backend;
    let halo_depth = settings.halo_depth;

    let warmup = cg_driver::warmup(chunks, settings, comm)?;
    if warmup.converged {
        return Ok(SolveOutcome {
            converged: true,
            iterations: warmup.iterations,
            residual: warmup.rro.abs().sqrt(),
        });
    }

    let n = warmup.iterations;
    let (eig_min, eig_max) =
        eigenvalues::estimate_bounds(&chunks[0].cg_alphas[..n], &chunks[0].cg_betas[..n])?;
    let inner_steps = settings.ppcg_inner_steps.max(1);
    let (theta, inner_alphas, inner_betas) =
        eigenvalues::cheby_coefficients(eig_min, eig_max, inner_steps);
    log::info!(
        "ppcg: eigenvalue bounds [{:.6e}, {:.6e}] from {} CG iterations, {} inner steps",
        eig_min,
        eig_max,
        n,
        inner_steps
    );
    for chunk in chunks.iter_mut() {
        chunk.cheby_alphas[..inner_steps].copy_from_slice(&inner_alphas);
        chunk.cheby_betas[..inner_steps].copy_from_slice(&inner_betas);
    }

    let mut rro = warmup.rro;
    let mut rrn = rro;
    let mut iterations = n;

    for tt in n..settings.max_iters {
        let mut pw = 0.0;
        for chunk in chunks.iter_mut() {
            let (x, y) = (chunk.x, chunk.y);
            let Chunk { p, w, kx, ky, .. } = chunk;
            pw += cg::calc_w(backend, x, y, halo_depth, p, w, kx, ky);
        }
        let pw = comm.reduce_sum(pw);
        let alpha = rro / pw;

        let mut pre_smooth = 0.0;
        for chunk in chunks.iter_mut() {
            let (x, y) = (chunk.x, chunk.y);
            let Chunk { u, r, p, w, .. } = chunk;
            pre_smooth += cg::calc_ur(backend, x, y, halo_depth, alpha, u, r, p, w);
        }
        log::debug!("ppcg iteration {}: pre-smoothing rrn {:e}", tt + 1, pre_smooth);

        for chunk in chunks.iter_mut() {
            let (x, y) = (chunk.x, chunk.y);
            let Chunk { r, sd, .. } = chunk;
            ppcg::init(backend, x, y, halo_depth, theta, r, sd);
        }
        for pp in 0..inner_steps {
            halo_update(chunks, settings, comm, &[FieldId::Sd], 1)?;
            for chunk in chunks.iter_mut() {
                let (x, y) = (chunk.x, chunk.y);
                let Chunk { u, r, kx, ky, sd, .. } = chunk;
                ppcg::inner_iteration(
                    backend,
                    x,
                    y,
                    halo_depth,
                    inner_alphas[pp],
                    inner_betas[pp],
                    u,
                    r,
                    kx,
                    ky,
                    sd,
                );
            }
        }

        let mut norm = 0.0;
        for chunk in chunks.iter_mut() {
            let (x, y) = (chunk.x, chunk.y);
            norm += solver_methods::calculate_2norm(backend, x, y, halo_depth, &chunk.r);
        }
        rrn = comm.reduce_sum(norm);
        let beta = rrn / rro;

        for chunk in chunks.iter_mut() {
            let (x, y) = (chunk.x, chunk.y);
            let Chunk { p, r, .. } = chunk;
            cg::calc_p(backend, x, y, halo_depth, beta, p, r);
            chunk.cg_alphas[tt] = alpha;
            chunk.cg_betas[tt] = beta;
        }
        halo_update(chunks, settings, comm, &[FieldId::U, FieldId::P], 1)?;

        rro = rrn;
        iterations = tt + 1;
        if rrn.abs().sqrt() < settings.eps {
            break;
        }
    }

    let residual = rrn.abs().sqrt();
    Ok(SolveOutcome {
        converged: residual < settings.eps,
        iterations,
        residual,
    })
}
