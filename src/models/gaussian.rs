//! Diagonal-covariance Gaussian emission distribution

use ndarray::{Array1, ArrayView1, ArrayView2};
use std::f64::consts::PI;

/// Variance floor applied after every update to keep the density proper.
const VAR_FLOOR: f64 = 1e-6;

/// Gaussian with diagonal covariance, stored as mean and variance vectors
#[derive(Debug, Clone)]
pub struct DiagonalGaussian {
    /// Mean vector
    pub mean: Array1<f64>,
    /// Per-dimension variance
    pub variance: Array1<f64>,
}

impl DiagonalGaussian {
    /// Create from mean and variance vectors
    pub fn new(mean: Array1<f64>, variance: Array1<f64>) -> Self {
        let variance = variance.mapv(|v| v.max(VAR_FLOOR));
        Self { mean, variance }
    }

    /// Dimension of the distribution
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Log probability density at a point
    pub fn log_pdf(&self, x: ArrayView1<f64>) -> f64 {
        let mut acc = 0.0;
        for j in 0..self.dim() {
            let diff = x[j] - self.mean[j];
            acc += self.variance[j].ln() + diff * diff / self.variance[j];
        }
        -0.5 * (self.dim() as f64 * (2.0 * PI).ln() + acc)
    }

    /// Probability density at a point
    pub fn pdf(&self, x: ArrayView1<f64>) -> f64 {
        self.log_pdf(x).exp()
    }

    /// Re-estimate mean and variance from weighted samples.
    ///
    /// Leaves the parameters untouched when the total weight is negligible
    /// (a state that owns no observations keeps its previous estimate).
    pub fn update_weighted(&mut self, samples: ArrayView2<f64>, weights: ArrayView1<f64>) {
        let n = samples.nrows();
        let d = samples.ncols();
        let weight_sum = weights.sum();

        if weight_sum < 1e-10 {
            return;
        }

        let mut new_mean = Array1::zeros(d);
        for i in 0..n {
            for j in 0..d {
                new_mean[j] += weights[i] * samples[[i, j]];
            }
        }
        new_mean /= weight_sum;

        let mut new_var = Array1::zeros(d);
        for i in 0..n {
            for j in 0..d {
                let diff = samples[[i, j]] - new_mean[j];
                new_var[j] += weights[i] * diff * diff;
            }
        }
        new_var /= weight_sum;
        new_var.mapv_inplace(|v| v.max(VAR_FLOOR));

        self.mean = new_mean;
        self.variance = new_var;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_pdf_highest_at_mean() {
        let g = DiagonalGaussian::new(array![1.0, -1.0], array![1.0, 1.0]);
        let at_mean = g.log_pdf(array![1.0, -1.0].view());
        let away = g.log_pdf(array![2.0, 0.0].view());
        assert!(at_mean > away);
    }

    #[test]
    fn test_variance_floor() {
        let g = DiagonalGaussian::new(array![0.0], array![0.0]);
        assert!(g.variance[0] > 0.0);
        assert!(g.log_pdf(array![0.0].view()).is_finite());
    }

    #[test]
    fn test_update_weighted_recovers_moments() {
        let samples = ndarray::arr2(&[[1.0], [2.0], [3.0], [4.0]]);
        let weights = array![1.0, 1.0, 1.0, 1.0];
        let mut g = DiagonalGaussian::new(array![0.0], array![1.0]);
        g.update_weighted(samples.view(), weights.view());

        assert!((g.mean[0] - 2.5).abs() < 1e-10);
        assert!((g.variance[0] - 1.25).abs() < 1e-10);
    }

    #[test]
    fn test_update_weighted_zero_weight_is_noop() {
        let samples = ndarray::arr2(&[[10.0], [20.0]]);
        let weights = array![0.0, 0.0];
        let mut g = DiagonalGaussian::new(array![1.0], array![2.0]);
        g.update_weighted(samples.view(), weights.view());

        assert!((g.mean[0] - 1.0).abs() < 1e-10);
        assert!((g.variance[0] - 2.0).abs() < 1e-10);
    }
}
