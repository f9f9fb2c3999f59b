//! Eigenvalue bound estimation for the Chebyshev-accelerated solvers.
//!
//! The CG warm-up window yields a Lanczos tridiagonal whose extremal
//! eigenvalues bound the operator spectrum: diagonal
//! `1/alpha[i] + beta[i-1]/alpha[i-1]`, off-diagonal
//! `sqrt(beta[i])/alpha[i]`.

use crate::error::{HearthError, HearthResult};
use nalgebra::DMatrix;

/// Safety margins applied to the raw bounds; underestimating the range
/// makes the Chebyshev recurrence diverge.
const EIG_MIN_SCALE: f64 = 0.95;
const EIG_MAX_SCALE: f64 = 1.05;

/// Returns widened `(eig_min, eig_max)` from the recorded CG coefficients.
pub fn estimate_bounds(cg_alphas: &[f64], cg_betas: &[f64]) -> HearthResult<(f64, f64)> {
    let n = cg_alphas.len();
    if n == 0 {
        return Err(HearthError::Config(
            "eigenvalue estimation needs at least one CG iteration".into(),
        ));
    }
    if cg_alphas.iter().any(|a| *a == 0.0) {
        return Err(HearthError::Config(
            "eigenvalue estimation hit a zero CG alpha".into(),
        ));
    }

    let mut tridiag = DMatrix::zeros(n, n);
    for i in 0..n {
        tridiag[(i, i)] = 1.0 / cg_alphas[i];
        if i > 0 {
            tridiag[(i, i)] += cg_betas[i - 1] / cg_alphas[i - 1];
        }
        if i + 1 < n {
            let off = cg_betas[i].sqrt() / cg_alphas[i];
            tridiag[(i, i + 1)] = off;
            tridiag[(i + 1, i)] = off;
        }
    }

    let eigenvalues = tridiag.symmetric_eigen().eigenvalues;
    let mut eig_min = f64::INFINITY;
    let mut eig_max = f64::NEG_INFINITY;
    for value in eigenvalues.iter() {
        eig_min = eig_min.min(*value);
        eig_max = eig_max.max(*value);
    }

    Ok((eig_min * EIG_MIN_SCALE, eig_max * EIG_MAX_SCALE))
}

/// Chebyshev recurrence over the bounds: returns `theta` plus the
/// per-iteration alpha/beta sequences.
pub fn cheby_coefficients(
    eig_min: f64,
    eig_max: f64,
    count: usize,
) -> (f64, Vec<f64>, Vec<f64>) {
    let theta = (eig_max + eig_min) / 2.0;
    let delta = (eig_max - eig_min) / 2.0;
    let sigma = theta / delta;

    let mut alphas = vec![0.0; count];
    let mut betas = vec![0.0; count];
    let mut rho_old = 1.0 / sigma;
    for ii in 0..count {
        let rho_new = 1.0 / (2.0 * sigma - rho_old);
        alphas[ii] = rho_new * rho_old;
        betas[ii] = 2.0 * rho_new / delta;
        rho_old = rho_new;
    }

    (theta, alphas, betas)
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn diagonal_system_bounds() {
        // With betas = 0 the tridiagonal is diagonal with entries
        // 1/alpha, so the bounds are the scaled extremes.
        let alphas = [0.5, 0.25, 1.0];
        let betas = [0.0, 0.0, 0.0];
        let (eig_min, eig_max) = estimate_bounds(&alphas, &betas).unwrap();
        assert_approx_eq!(f64, eig_min, 1.0 * EIG_MIN_SCALE);
        assert_approx_eq!(f64, eig_max, 4.0 * EIG_MAX_SCALE);
    }

    #[test]
    fn empty_history_is_an_error() {
        assert!(estimate_bounds(&[], &[]).is_err());
        assert!(estimate_bounds(&[0.0], &[0.0]).is_err());
    }

    #[test]
    fn recurrence_shape() {
        let (theta, alphas, betas) = cheby_coefficients(1.0, 3.0, 4);
        assert_approx_eq!(f64, theta, 2.0);
        // sigma = 2, rho_0 = 0.5: first step rho = 1/3.5
        assert_approx_eq!(f64, alphas[0], 0.5 / 3.5);
        assert_approx_eq!(f64, betas[0], 2.0 / 3.5);
        // the sequence stays positive and bounded
        for (a, b) in alphas.iter().zip(betas.iter()) {
            assert!(*a > 0.0 && *a < 1.0);
            assert!(*b > 0.0);
        }
    }
}
