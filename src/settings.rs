//! Run configuration and problem state descriptors.
//!
//! `Settings` is immutable for the duration of a solve; drivers and
//! kernels only ever borrow it.

use crate::backend::Backend;
use crate::error::HearthError;

/// Which iterative method drives the solve.
#[derive(Debug, Copy, Clone, PartialEq, Eq, clap::ValueEnum)]
pub enum SolverKind {
    Jacobi,
    Cg,
    Cheby,
    Ppcg,
}

/// How the face conductivities are derived from density.
#[derive(Debug, Copy, Clone, PartialEq, Eq, clap::ValueEnum)]
pub enum Coefficient {
    Conductivity,
    RecipConductivity,
}

impl Coefficient {
    /// Deck-style raw value, 1-based.
    pub fn raw(self) -> i32 {
        match self {
            Coefficient::Conductivity => 1,
            Coefficient::RecipConductivity => 2,
        }
    }
}

impl TryFrom<i32> for Coefficient {
    type Error = HearthError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(Coefficient::Conductivity),
            2 => Ok(Coefficient::RecipConductivity),
            other => Err(HearthError::InvalidCoefficient(other)),
        }
    }
}

/// Geometric footprint of an initial state.
#[derive(Debug, Copy, Clone)]
pub enum StateGeometry {
    /// Applies everywhere; only valid for the first state.
    Default,
    Rectangle {
        x_min: f64,
        y_min: f64,
        x_max: f64,
        y_max: f64,
    },
    Circle {
        x: f64,
        y: f64,
        radius: f64,
    },
    Point {
        x: f64,
        y: f64,
    },
}

/// One initial-condition descriptor, applied in order over the mesh.
#[derive(Debug, Copy, Clone)]
pub struct State {
    pub density: f64,
    pub energy: f64,
    pub geometry: StateGeometry,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub grid_x_cells: usize,
    pub grid_y_cells: usize,
    pub grid_x_min: f64,
    pub grid_y_min: f64,
    pub grid_x_max: f64,
    pub grid_y_max: f64,
    pub halo_depth: usize,
    pub num_chunks: usize,
    pub dt_init: f64,
    pub end_step: usize,
    pub solver: SolverKind,
    pub coefficient: Coefficient,
    pub eps: f64,
    pub max_iters: usize,
    /// CG warm-up iterations used to harvest eigenvalue estimates.
    pub presteps: usize,
    /// Fixed inner smoothing steps per PPCG outer iteration.
    pub ppcg_inner_steps: usize,
    /// Residual check cadence for the reduction-free Chebyshev loop.
    pub check_frequency: usize,
    pub backend: Backend,
}

impl Settings {
    pub fn dx(&self) -> f64 {
        (self.grid_x_max - self.grid_x_min) / self.grid_x_cells as f64
    }

    pub fn dy(&self) -> f64 {
        (self.grid_y_max - self.grid_y_min) / self.grid_y_cells as f64
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            grid_x_cells: 10,
            grid_y_cells: 10,
            grid_x_min: 0.0,
            grid_y_min: 0.0,
            grid_x_max: 10.0,
            grid_y_max: 10.0,
            halo_depth: 2,
            num_chunks: 1,
            dt_init: 0.1,
            end_step: 10,
            solver: SolverKind::Cg,
            coefficient: Coefficient::Conductivity,
            eps: 1e-15,
            max_iters: 10_000,
            presteps: 30,
            ppcg_inner_steps: 10,
            check_frequency: 10,
            backend: Backend::Serial,
        }
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn coefficient_whitelist() {
        assert_eq!(Coefficient::try_from(1).unwrap(), Coefficient::Conductivity);
        assert_eq!(
            Coefficient::try_from(2).unwrap(),
            Coefficient::RecipConductivity
        );
        for bad in [-1, 0, 3, 99] {
            assert!(matches!(
                Coefficient::try_from(bad),
                Err(HearthError::InvalidCoefficient(v)) if v == bad
            ));
        }
    }

    #[test]
    fn grid_spacing() {
        let settings = Settings::default();
        assert_eq!(settings.dx(), 1.0);
        assert_eq!(settings.dy(), 1.0);
    }
}
