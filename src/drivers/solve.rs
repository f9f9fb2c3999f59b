//! The outer "diffuse" loop: mesh/state initialisation, one solve per
//! timestep, energy finalisation, and the per-step field summary.

use super::{cg_solve, cheby_solve, jacobi_solve, ppcg_solve, SolveOutcome};
use crate::chunk::{Chunk, FieldId};
use crate::comms::Communicator;
use crate::error::{HearthError, HearthResult};
use crate::halo::halo_update;
use crate::kernels::field_summary::{field_summary, Summary};
use crate::kernels::{set_chunk_data, set_chunk_state, solver_methods};
use crate::settings::{Settings, SolverKind, State, StateGeometry};

#[derive(Debug, Clone, Copy)]
pub struct StepReport {
    pub step: usize,
    pub outcome: SolveOutcome,
    pub summary: Summary,
}

/// Initialises every chunk's mesh data and applies the problem states.
/// The first state must be the whole-domain default.
pub fn init_application(
    chunks: &mut [Chunk],
    settings: &Settings,
    states: &[State],
) -> HearthResult<()> {
    match states.first() {
        None => {
            return Err(HearthError::Config("no initial states supplied".into()));
        }
        Some(state) if !matches!(state.geometry, StateGeometry::Default) => {
            return Err(HearthError::Config(
                "the first state must cover the whole domain".into(),
            ));
        }
        Some(_) => {}
    }

    let dx = settings.dx();
    let dy = settings.dy();
    for chunk in chunks.iter_mut() {
        let x_min = settings.grid_x_min + dx * chunk.left as f64;
        let y_min = settings.grid_y_min + dy * chunk.bottom as f64;
        let Chunk {
            vertex_x,
            vertex_y,
            vertex_dx,
            vertex_dy,
            cell_x,
            cell_y,
            cell_dx,
            cell_dy,
            volume,
            x_area,
            y_area,
            ..
        } = chunk;
        set_chunk_data::set_chunk_data(
            settings.backend,
            settings.halo_depth,
            x_min,
            y_min,
            dx,
            dy,
            vertex_x,
            vertex_y,
            vertex_dx,
            vertex_dy,
            cell_x,
            cell_y,
            cell_dx,
            cell_dy,
            volume,
            x_area,
            y_area,
        );

        let (x, y) = (chunk.x, chunk.y);
        let Chunk {
            vertex_x,
            vertex_y,
            cell_x,
            cell_y,
            density,
            energy0,
            u,
            ..
        } = chunk;
        set_chunk_state::set_chunk_state(
            settings.backend,
            x,
            y,
            vertex_x,
            vertex_y,
            cell_x,
            cell_y,
            density,
            energy0,
            u,
            states,
        );

        let Chunk {
            density,
            density0,
            energy0,
            energy,
            ..
        } = chunk;
        solver_methods::store_energy(settings.backend, energy0, energy);
        crate::par_slice::copy(settings.backend, density0, density);
    }

    Ok(())
}

/// Runs the configured solver for one timestep and reports the outcome
/// and field aggregates.
pub fn solve_step(
    chunks: &mut [Chunk],
    settings: &Settings,
    comm: &dyn Communicator,
    step: usize,
) -> HearthResult<StepReport> {
    profiling::scope!("solve_step");

    halo_update(
        chunks,
        settings,
        comm,
        &[FieldId::Density, FieldId::Energy],
        settings.halo_depth,
    )?;

    let outcome = match settings.solver {
        SolverKind::Jacobi => jacobi_solve(chunks, settings, comm)?,
        SolverKind::Cg => cg_solve(chunks, settings, comm)?,
        SolverKind::Cheby => cheby_solve(chunks, settings, comm)?,
        SolverKind::Ppcg => ppcg_solve(chunks, settings, comm)?,
    };
    if !outcome.converged {
        log::warn!(
            "step {}: solver hit the iteration cap at {} with residual {:e}",
            step,
            outcome.iterations,
            outcome.residual
        );
    }

    for chunk in chunks.iter_mut() {
        let (x, y) = (chunk.x, chunk.y);
        let Chunk {
            density, u, energy, ..
        } = chunk;
        solver_methods::finalise(settings.backend, x, y, settings.halo_depth, density, u, energy);
    }

    let mut local = Summary::default();
    for chunk in chunks.iter() {
        local = local
            + field_summary(
                settings.backend,
                chunk.x,
                chunk.y,
                settings.halo_depth,
                &chunk.volume,
                &chunk.density,
                &chunk.energy0,
                &chunk.u,
            );
    }
    let summary = Summary {
        vol: comm.reduce_sum(local.vol),
        mass: comm.reduce_sum(local.mass),
        ie: comm.reduce_sum(local.ie),
        temp: comm.reduce_sum(local.temp),
    };

    log::info!(
        "step {}: {} iterations, residual {:e}, vol {:.6e}, mass {:.6e}, ie {:.6e}, temp {:.6e}",
        step,
        outcome.iterations,
        outcome.residual,
        summary.vol,
        summary.mass,
        summary.ie,
        summary.temp
    );

    Ok(StepReport {
        step,
        outcome,
        summary,
    })
}

/// The full application flow: initialise once, then one solve per step.
pub fn diffuse(
    chunks: &mut [Chunk],
    settings: &Settings,
    states: &[State],
    comm: &dyn Communicator,
) -> HearthResult<Vec<StepReport>> {
    init_application(chunks, settings, states)?;

    let mut reports = Vec::with_capacity(settings.end_step);
    for step in 0..settings.end_step {
        reports.push(solve_step(chunks, settings, comm, step)?);
    }
    Ok(reports)
}
