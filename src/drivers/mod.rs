//! Solver state machines and the outer timestep loop.

mod cg;
mod cheby;
mod eigenvalues;
mod jacobi;
mod ppcg;
mod solve;

pub use cg::cg_solve;
pub use cheby::cheby_solve;
pub use jacobi::jacobi_solve;
pub use ppcg::ppcg_solve;
pub use solve::{diffuse, init_application, solve_step, StepReport};

use crate::chunk::Chunk;
use crate::comms::Communicator;
use crate::kernels::solver_methods;
use crate::settings::Settings;

/// Terminal state of one solve. Hitting the iteration cap is a reportable
/// outcome, not an error; the caller decides how to treat it.
#[derive(Debug, Clone, Copy)]
pub struct SolveOutcome {
    pub converged: bool,
    pub iterations: usize,
    pub residual: f64,
}

/// Recomputes `r = u0 - A u` on every chunk and returns the global
/// squared residual norm.
pub(crate) fn residual_norm(
    chunks: &mut [Chunk],
    settings: &Settings,
    comm: &dyn Communicator,
) -> f64 {
    let mut norm = 0.0;
    for chunk in chunks.iter_mut() {
        let (x, y) = (chunk.x, chunk.y);
        let Chunk {
            u, u0, r, kx, ky, ..
        } = chunk;
        solver_methods::calculate_residual(
            settings.backend,
            x,
            y,
            settings.halo_depth,
            u,
            u0,
            r,
            kx,
            ky,
        );
        norm += solver_methods::calculate_2norm(settings.backend, x, y, settings.halo_depth, r);
    }
    comm.reduce_sum(norm)
}
