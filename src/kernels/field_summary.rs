//! Aggregates of the field state, reported after each solve.

use super::interior;
use crate::backend::Backend;
use crate::par_slice;

#[derive(Debug, Default, Copy, Clone)]
pub struct Summary {
    pub vol: f64,
    pub mass: f64,
    pub ie: f64,
    pub temp: f64,
}

impl std::ops::Add for Summary {
    type Output = Summary;

    fn add(self, that: Summary) -> Summary {
        Summary {
            vol: self.vol + that.vol,
            mass: self.mass + that.mass,
            ie: self.ie + that.ie,
            temp: self.temp + that.temp,
        }
    }
}

/// Volume, mass, internal energy, and mass-weighted temperature over the
/// interior cells.
pub fn field_summary(
    backend: Backend,
    x: usize,
    y: usize,
    halo_depth: usize,
    volume: &[f64],
    density: &[f64],
    energy0: &[f64],
    u: &[f64],
) -> Summary {
    par_slice::reduce(
        backend,
        x * y,
        Summary::default(),
        |i| {
            if !interior(i, x, y, halo_depth) {
                return Summary::default();
            }
            let cell_vol = volume[i];
            let cell_mass = cell_vol * density[i];
            Summary {
                vol: cell_vol,
                mass: cell_mass,
                ie: cell_mass * energy0[i],
                temp: cell_mass * u[i],
            }
        },
        |a, b| a + b,
    )
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn summary_over_uniform_interior() {
        let (x, y, halo) = (4, 4, 1);
        let n = x * y;
        let volume = vec![2.0; n];
        let density = vec![3.0; n];
        let energy0 = vec![0.5; n];
        let u = vec![1.5; n];
        let s = field_summary(
            Backend::Serial,
            x,
            y,
            halo,
            &volume,
            &density,
            &energy0,
            &u,
        );
        // 4 interior cells
        assert_approx_eq!(f64, s.vol, 8.0);
        assert_approx_eq!(f64, s.mass, 24.0);
        assert_approx_eq!(f64, s.ie, 12.0);
        assert_approx_eq!(f64, s.temp, 36.0);
    }
}
