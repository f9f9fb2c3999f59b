//! Chebyshev-accelerated driver.
//!
//! Runs a CG warm-up window to harvest eigenvalue estimates, then switches
//! to the reduction-free Chebyshev recurrence, measuring the true residual
//! only every `check_frequency` iterations.

use super::{eigenvalues, residual_norm, SolveOutcome};
use crate::chunk::{Chunk, FieldId};
use crate::comms::Communicator;
use crate::drivers::cg;
use crate::error::HearthResult;
use crate::halo::halo_update;
use crate::kernels::cheby;
use crate::settings::Settings;

pub fn cheby_solve(
    chunks: &mut [Chunk],
    settings: &Settings,
    comm: &dyn Communicator,
) -> HearthResult<SolveOutcome> {
    profiling::scope!("cheby_solve");
    let warmup = cg::warmup(chunks, settings, comm)?;
    if warmup.converged {
        return Ok(SolveOutcome {
            converged: true,
            iterations: warmup.iterations,
            residual: warmup.rro.abs().sqrt(),
        });
    }

    let n = warmup.iterations;
    let remaining = settings.max_iters - n;
    if remaining == 0 {
        return Ok(SolveOutcome {
            converged: false,
            iterations: n,
            residual: warmup.rro.abs().sqrt(),
        });
    }
    let (eig_min, eig_max) =
        eigenvalues::estimate_bounds(&chunks[0].cg_alphas[..n], &chunks[0].cg_betas[..n])?;
    let (theta, alphas, betas) = eigenvalues::cheby_coefficients(eig_min, eig_max, remaining);
    log::info!(
        "cheby: eigenvalue bounds [{:.6e}, {:.6e}] from {} CG iterations, theta {:.6e}",
        eig_min,
        eig_max,
        n,
        theta
    );
    for chunk in chunks.iter_mut() {
        chunk.cheby_alphas[..remaining].copy_from_slice(&alphas);
        chunk.cheby_betas[..remaining].copy_from_slice(&betas);
    }

    for chunk in chunks.iter_mut() {
        let (x, y) = (chunk.x, chunk.y);
        let Chunk {
            u, u0, p, r, w, kx, ky, ..
        } = chunk;
        cheby::init(
            settings.backend,
            x,
            y,
            settings.halo_depth,
            theta,
            u,
            u0,
            p,
            r,
            w,
            kx,
            ky,
        );
    }
    halo_update(chunks, settings, comm, &[FieldId::U], 1)?;
    let mut iterations = n + 1;

    for step in 0..remaining.saturating_sub(1) {
        for chunk in chunks.iter_mut() {
            let (x, y) = (chunk.x, chunk.y);
            let Chunk {
                u, u0, p, r, w, kx, ky, ..
            } = chunk;
            cheby::iterate(
                settings.backend,
                x,
                y,
                settings.halo_depth,
                alphas[step],
                betas[step],
                u,
                u0,
                p,
                r,
                w,
                kx,
                ky,
            );
        }
        halo_update(chunks, settings, comm, &[FieldId::U], 1)?;
        iterations += 1;

        if (iterations - n) % settings.check_frequency == 0 {
            let error = residual_norm(chunks, settings, comm);
            log::debug!("cheby iteration {}: error {:e}", iterations, error);
            if error.abs().sqrt() < settings.eps {
                break;
            }
        }
    }

    let residual = residual_norm(chunks, settings, comm).abs().sqrt();
    Ok(SolveOutcome {
        converged: residual < settings.eps,
        iterations,
        residual,
    })
}
