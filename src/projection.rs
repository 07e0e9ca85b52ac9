//! Standardization and principal component projection.
//!
//! `standardize` and `project` are the only entry points the views use. `Pca`
//! eigen-decomposes the covariance matrix with linfa-linalg.

use crate::error::{MindError, Result};
use crate::logging::{log_projection, ProfileScope};
use linfa_linalg::eigh::{EigSort, Eigh};
use ndarray::{Array1, Array2, Axis};
use serde::Serialize;

/// Column-wise z-score with sample standard deviation (ddof = 1).
/// Columns whose deviation is zero or undefined map to 0.
pub fn standardize(data: &Array2<f64>) -> Array2<f64> {
    let n = data.nrows();
    let mut out = Array2::<f64>::zeros(data.raw_dim());
    if n < 2 {
        return out;
    }
    for (j, col) in data.axis_iter(Axis(1)).enumerate() {
        let mean = col.sum() / n as f64;
        let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        let std = var.sqrt();
        if !std.is_finite() || std <= f64::EPSILON * mean.abs().max(1.0) {
            continue;
        }
        for (i, v) in col.iter().enumerate() {
            out[[i, j]] = (v - mean) / std;
        }
    }
    out
}

/// A fitted linear projection onto the leading principal axes.
#[derive(Debug, Clone)]
pub struct Pca {
    mean: Array1<f64>,
    /// `D x k`, one component per column
    components: Array2<f64>,
    explained_variance: Vec<f64>,
    total_variance: f64,
}

impl Pca {
    pub fn fit(data: &Array2<f64>, k: usize) -> Result<Self> {
        let (n, d) = data.dim();
        if !(2..=3).contains(&k) {
            return Err(MindError::computation(format!("projection to {} components is not supported", k)));
        }
        if n < k || n < 2 {
            return Err(MindError::computation(format!(
                "need at least {} rows for a {}-component projection, got {}",
                k.max(2),
                k,
                n
            )));
        }
        if d < k {
            return Err(MindError::computation(format!(
                "need at least {} columns for a {}-component projection, got {}",
                k, k, d
            )));
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(MindError::computation("input contains non-finite values"));
        }

        let _scope = ProfileScope::new("projection.pca_fit");
        let mean = data
            .mean_axis(Axis(0))
            .ok_or_else(|| MindError::computation("empty input"))?;
        let centered = data - &mean;
        let cov = centered.t().dot(&centered) / (n - 1) as f64;
        let total_variance: f64 = cov.diag().sum();
        if total_variance <= 0.0 {
            return Err(MindError::computation("every column is degenerate"));
        }

        let (values, vectors) = cov
            .eigh()
            .map_err(|e| MindError::computation(format!("eigen-decomposition failed: {}", e)))?
            .sort_eig_desc();
        let mut components = Array2::<f64>::zeros((d, k));
        for c in 0..k {
            let mut axis = vectors.column(c).to_owned();
            // fix the sign so the largest loading is positive
            let pivot = axis
                .iter()
                .copied()
                .max_by(|a, b| a.abs().total_cmp(&b.abs()))
                .unwrap_or(0.0);
            if pivot < 0.0 {
                axis.mapv_inplace(|x| -x);
            }
            components.column_mut(c).assign(&axis);
        }
        let explained_variance = values.iter().take(k).map(|v| v.max(0.0)).collect();

        Ok(Self {
            mean,
            components,
            explained_variance,
            total_variance,
        })
    }

    pub fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>> {
        if data.ncols() != self.mean.len() {
            return Err(MindError::computation(format!(
                "expected {} columns, got {}",
                self.mean.len(),
                data.ncols()
            )));
        }
        Ok((data - &self.mean).dot(&self.components))
    }

    pub fn explained_variance(&self) -> &[f64] {
        &self.explained_variance
    }

    pub fn explained_variance_ratio(&self) -> Vec<f64> {
        self.explained_variance
            .iter()
            .map(|v| v / self.total_variance)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectionResult {
    /// `N x k`
    #[serde(skip)]
    pub points: Array2<f64>,
    pub explained_variance: Vec<f64>,
    pub explained_variance_ratio: Vec<f64>,
}

/// Fit and apply a `k`-component projection. The fitted model is discarded.
pub fn project(data: &Array2<f64>, k: usize) -> Result<ProjectionResult> {
    let pca = Pca::fit(data, k)?;
    let points = pca.transform(data)?;
    let ratios = pca.explained_variance_ratio();
    log_projection(k, data.nrows(), data.ncols(), &ratios);
    Ok(ProjectionResult {
        points,
        explained_variance: pca.explained_variance().to_vec(),
        explained_variance_ratio: ratios,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn col_mean_std(m: &Array2<f64>, j: usize) -> (f64, f64) {
        let col = m.column(j);
        let n = col.len() as f64;
        let mean = col.sum() / n;
        let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        (mean, var.sqrt())
    }

    #[test]
    fn standardize_centers_and_scales() {
        let data = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [10.0, 45.0]];
        let z = standardize(&data);
        for j in 0..2 {
            let (mean, std) = col_mean_std(&z, j);
            assert!(mean.abs() < 1e-12);
            assert!((std - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn standardize_zeroes_constant_column() {
        let data = array![[5.0, 1.0], [5.0, 2.0], [5.0, 3.0]];
        let z = standardize(&data);
        assert_eq!(z.column(0).to_vec(), vec![0.0, 0.0, 0.0]);
        assert!(z.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn leading_axis_follows_the_spread() {
        let data = array![[1.0, 1.1, 0.0], [2.0, 2.1, 0.1], [3.0, 2.9, 0.0], [4.0, 4.2, 0.1], [5.0, 4.9, 0.0]];
        let pca = Pca::fit(&data, 2).unwrap();
        let axis = pca.components.column(0);
        // both correlated columns load on the first component with a positive sign
        assert!(axis[0] > 0.6 && axis[1] > 0.6);
        assert!(axis[2].abs() < 0.1);
        let ratio = pca.explained_variance_ratio();
        assert!(ratio[0] > 0.99);
    }

    #[test]
    fn pca_variance_is_descending() {
        let data = array![
            [2.5, 2.4, 0.5, 1.0],
            [0.5, 0.7, 0.1, 2.0],
            [2.2, 2.9, 0.9, 0.5],
            [1.9, 2.2, 0.4, 1.5],
            [3.1, 3.0, 0.3, 0.1],
            [2.3, 2.7, 0.8, 0.9],
            [2.0, 1.6, 0.2, 1.1],
            [1.0, 1.1, 0.6, 1.9],
        ];
        let z = standardize(&data);
        let p3 = project(&z, 3).unwrap();
        let ev = &p3.explained_variance;
        assert!(ev[0] >= ev[1] && ev[1] >= ev[2]);
        let total: f64 = p3.explained_variance_ratio.iter().sum();
        assert!(total <= 1.0 + 1e-9);
        assert_eq!(p3.points.dim(), (8, 3));

        let p2 = project(&z, 2).unwrap();
        assert!(p2.explained_variance[0] >= p2.explained_variance[1]);
    }

    #[test]
    fn projected_components_are_uncorrelated() {
        let data = array![[1.0, 2.0, 0.0], [2.0, 3.9, 1.0], [3.0, 6.1, 0.0], [4.0, 8.0, 1.0], [5.0, 9.8, 0.5]];
        let p = project(&standardize(&data), 2).unwrap();
        let a = p.points.column(0);
        let b = p.points.column(1);
        let cov: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        assert!(cov.abs() < 1e-9);
    }

    #[test]
    fn too_few_rows_is_reported() {
        let data = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let err = project(&data, 3).unwrap_err();
        assert!(matches!(err, MindError::ComputationFailure(_)));
    }

    #[test]
    fn all_degenerate_columns_are_reported() {
        let data = array![[1.0, 1.0], [1.0, 1.0], [1.0, 1.0]];
        let err = project(&standardize(&data), 2).unwrap_err();
        assert!(err.to_string().contains("degenerate"));
    }

    #[test]
    fn unsupported_k_is_rejected() {
        let data = array![[1.0, 2.0, 3.0, 4.0], [2.0, 1.0, 0.0, 4.0], [0.0, 2.0, 1.0, 3.0], [3.0, 3.0, 3.0, 1.0]];
        assert!(project(&data, 4).is_err());
    }
}
