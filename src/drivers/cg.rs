//! Conjugate gradient driver. Also provides the init/iteration phases the
//! Chebyshev and PPCG drivers reuse for their warm-up window.

use super::SolveOutcome;
use crate::chunk::{Chunk, FieldId};
use crate::comms::Communicator;
use crate::error::HearthResult;
use crate::halo::halo_update;
use crate::kernels::{cg, solver_methods};
use crate::settings::Settings;

/// Runs the CG setup on every chunk, stores the right-hand side in `u0`,
/// and refreshes the halos the first iteration depends on. Returns the
/// global `rro`.
pub(crate) fn init_phase(
    chunks: &mut [Chunk],
    settings: &Settings,
    comm: &dyn Communicator,
) -> HearthResult<f64> {
    profiling::scope!("cg_init");
    let rx = settings.dt_init / (settings.dx() * settings.dx());
    let ry = settings.dt_init / (settings.dy() * settings.dy());

    let mut rro = 0.0;
    for chunk in chunks.iter_mut() {
        let (x, y) = (chunk.x, chunk.y);
        let Chunk {
            density,
            energy,
            u,
            p,
            r,
            w,
            kx,
            ky,
            ..
        } = chunk;
        rro += cg::init(
            settings.backend,
            x,
            y,
            settings.halo_depth,
            settings.coefficient,
            rx,
            ry,
            density,
            energy,
            u,
            p,
            r,
            w,
            kx,
            ky,
        );
    }
    let rro = comm.reduce_sum(rro);

    // u0 keeps the right-hand side for the residual-based solvers
    for chunk in chunks.iter_mut() {
        let (x, y) = (chunk.x, chunk.y);
        let Chunk { u, u0, .. } = chunk;
        solver_methods::copy_u(settings.backend, x, y, settings.halo_depth, u0, u);
    }

    halo_update(chunks, settings, comm, &[FieldId::U, FieldId::P], 1)?;
    Ok(rro)
}

/// One full CG iteration: two global reductions (pw, rrn), the three
/// vector updates, and the halo refresh for the next operator application.
/// Records alpha/beta in every chunk's history at index `tt`.
pub(crate) fn iteration(
    chunks: &mut [Chunk],
    settings: &Settings,
    comm: &dyn Communicator,
    tt: usize,
    rro: f64,
) -> HearthResult<f64> {
    let halo_depth = settings.halo_depth;
    let backend = settings.backend;

    let mut pw = 0.0;
    for chunk in chunks.iter_mut() {
        let (x, y) = (chunk.x, chunk.y);
        let Chunk { p, w, kx, ky, .. } = chunk;
        pw += cg::calc_w(backend, x, y, halo_depth, p, w, kx, ky);
    }
    let pw = comm.reduce_sum(pw);
    let alpha = rro / pw;

    let mut rrn = 0.0;
    for chunk in chunks.iter_mut() {
        let (x, y) = (chunk.x, chunk.y);
        let Chunk { u, r, p, w, .. } = chunk;
        rrn += cg::calc_ur(backend, x, y, halo_depth, alpha, u, r, p, w);
    }
    let rrn = comm.reduce_sum(rrn);
    let beta = rrn / rro;

    for chunk in chunks.iter_mut() {
        let (x, y) = (chunk.x, chunk.y);
        let Chunk { p, r, .. } = chunk;
        cg::calc_p(backend, x, y, halo_depth, beta, p, r);
        chunk.cg_alphas[tt] = alpha;
        chunk.cg_betas[tt] = beta;
    }

    halo_update(chunks, settings, comm, &[FieldId::U, FieldId::P], 1)?;
    Ok(rrn)
}

/// Outcome of the CG warm-up window run for the accelerated solvers.
pub(crate) struct Warmup {
    pub rro: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Runs plain CG for `presteps` iterations to harvest the alpha/beta
/// history the eigenvalue estimate needs. May converge outright on easy
/// problems.
pub(crate) fn warmup(
    chunks: &mut [Chunk],
    settings: &Settings,
    comm: &dyn Communicator,
) -> HearthResult<Warmup> {
    let mut rro = init_phase(chunks, settings, comm)?;
    // the initial guess can already satisfy the system; iterating from a
    // zero residual would divide by a zero pw
    if rro.abs().sqrt() < settings.eps {
        return Ok(Warmup {
            rro,
            iterations: 0,
            converged: true,
        });
    }
    let presteps = settings.presteps.clamp(1, settings.max_iters.max(1));

    let mut rrn = rro;
    let mut iterations = 0;
    for tt in 0..presteps {
        rrn = iteration(chunks, settings, comm, tt, rro)?;
        rro = rrn;
        iterations = tt + 1;
        if rrn.abs().sqrt() < settings.eps {
            return Ok(Warmup {
                rro: rrn,
                iterations,
                converged: true,
            });
        }
    }

    Ok(Warmup {
        rro: rrn,
        iterations,
        converged: false,
    })
}

pub fn cg_solve(
    chunks: &mut [Chunk],
    settings: &Settings,
    comm: &dyn Communicator,
) -> HearthResult<SolveOutcome> {
    profiling::scope!("cg_solve");
    let mut rro = init_phase(chunks, settings, comm)?;
    if rro.abs().sqrt() < settings.eps {
        return Ok(SolveOutcome {
            converged: true,
            iterations: 0,
            residual: rro.abs().sqrt(),
        });
    }
    let mut rrn = rro;
    let mut iterations = 0;

    for tt in 0..settings.max_iters {
        rrn = iteration(chunks, settings, comm, tt, rro)?;
        rro = rrn;
        iterations = tt + 1;
        log::debug!("cg iteration {}: rrn {:e}", iterations, rrn);
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
