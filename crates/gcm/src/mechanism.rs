//! Per-node generative mechanisms.
//!
//! Root nodes carry an [`EmpiricalDistribution`] of their observed values;
//! non-root nodes carry a [`LinearAnm`], a linear additive-noise model whose
//! noise is the empirical residual distribution of the fit.

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};
use rand::Rng;

use crate::error::GcmError;
use crate::stats;

/// Bootstrap distribution over observed samples.
#[derive(Debug, Clone)]
pub struct EmpiricalDistribution {
    samples: Array1<f64>,
}

impl EmpiricalDistribution {
    pub fn fit(values: ArrayView1<'_, f64>) -> Self {
        Self {
            samples: values.to_owned(),
        }
    }

    /// Draw `n` values by sampling the stored observations with replacement.
    pub fn sample(&self, n: usize, rng: &mut impl Rng) -> Array1<f64> {
        let len = self.samples.len();
        Array1::from_iter((0..n).map(|_| self.samples[rng.gen_range(0..len)]))
    }

    pub fn mean(&self) -> f64 {
        stats::mean(self.samples.view())
    }

    pub fn variance(&self) -> f64 {
        stats::variance(self.samples.view())
    }
}

/// Linear additive-noise model: `child = w . parents + b + noise`.
///
/// Fitted by ordinary least squares over the normal equations; the training
/// residuals are kept and bootstrapped as the noise distribution.
#[derive(Debug, Clone)]
pub struct LinearAnm {
    coefficients: Array1<f64>,
    intercept: f64,
    residuals: Array1<f64>,
}

impl LinearAnm {
    /// Fit coefficients and intercept for `targets` against the parent
    /// `design` matrix (one column per parent, one row per observation).
    pub fn fit(
        node: &str,
        design: ArrayView2<'_, f64>,
        targets: ArrayView1<'_, f64>,
    ) -> Result<Self, GcmError> {
        let rows = design.nrows();
        let parents = design.ncols();
        let params = parents + 1;
        if rows < params {
            return Err(GcmError::InsufficientRows {
                node: node.to_string(),
                rows,
                params,
            });
        }
        let mut augmented = Array2::ones((rows, params));
        augmented.slice_mut(s![.., ..parents]).assign(&design);
        let xtx = augmented.t().dot(&augmented);
        let xty = augmented.t().dot(&targets);
        let solution = solve_normal_equations(xtx, xty, node)?;
        let coefficients = solution.slice(s![..parents]).to_owned();
        let intercept = solution[parents];
        let residuals = &targets - &(design.dot(&coefficients) + intercept);
        Ok(Self {
            coefficients,
            intercept,
            residuals,
        })
    }

    pub fn coefficients(&self) -> ArrayView1<'_, f64> {
        self.coefficients.view()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Deterministic part of the mechanism for a batch of parent rows.
    pub fn predict(&self, parents: ArrayView2<'_, f64>) -> Array1<f64> {
        debug_assert_eq!(parents.ncols(), self.coefficients.len());
        parents.dot(&self.coefficients) + self.intercept
    }

    /// Draw `n` noise values by bootstrapping the training residuals.
    pub fn sample_noise(&self, n: usize, rng: &mut impl Rng) -> Array1<f64> {
        let len = self.residuals.len();
        Array1::from_iter((0..n).map(|_| self.residuals[rng.gen_range(0..len)]))
    }

    pub fn noise_variance(&self) -> f64 {
        stats::variance(self.residuals.view())
    }
}

/// Mechanism assigned to a single graph node.
#[derive(Debug, Clone)]
pub enum NodeMechanism {
    Root(EmpiricalDistribution),
    Additive(LinearAnm),
}

/// Solve `A x = b` by Gaussian elimination with partial pivoting.
///
/// `A` is the symmetric normal-equations matrix; a vanishing pivot means the
/// design is collinear for `node`.
fn solve_normal_equations(
    mut a: Array2<f64>,
    mut b: Array1<f64>,
    node: &str,
) -> Result<Array1<f64>, GcmError> {
    let n = b.len();
    for col in 0..n {
        let mut pivot_row = col;
        let mut best = a[[col, col]].abs();
        for row in col + 1..n {
            let candidate = a[[row, col]].abs();
            if candidate > best {
                best = candidate;
                pivot_row = row;
            }
        }
        if best < 1e-12 {
            return Err(GcmError::SingularDesign(node.to_string()));
        }
        if pivot_row != col {
            for c in 0..n {
                let tmp = a[[col, c]];
                a[[col, c]] = a[[pivot_row, c]];
                a[[pivot_row, c]] = tmp;
            }
            b.swap(col, pivot_row);
        }
        for row in col + 1..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for c in col..n {
                a[[row, c]] -= factor * a[[col, c]];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut x = Array1::zeros(n);
    for row in (0..n).rev() {
        let mut acc = b[row];
        for c in row + 1..n {
            acc -= a[[row, c]] * x[c];
        }
        x[row] = acc / a[[row, row]];
    }
    Ok(x)
}
