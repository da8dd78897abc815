//! Gaussian Hidden Markov Model over multi-sequence bundles

use super::algorithms::{forward_backward, transition_counts};
use super::error::{ModelError, ModelResult};
use super::gaussian::DiagonalGaussian;
use crate::data::SequenceBundle;
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Gaussian-emission HMM with diagonal covariance
///
/// Fitting runs Baum-Welch over every sequence of a bundle; each sequence
/// restarts at the initial state distribution. All randomness (parameter
/// init, k-means seeding) comes from the seed passed to [`fit`], so the
/// same inputs always produce the same model.
///
/// [`fit`]: GaussianHmm::fit
#[derive(Debug, Clone)]
pub struct GaussianHmm {
    /// Number of hidden states
    n_states: usize,
    /// Feature dimensionality, set on fit
    n_features: usize,
    /// Initial state probabilities
    initial_probs: Array1<f64>,
    /// State transition matrix
    transition_matrix: Array2<f64>,
    /// Emission distribution per state
    states: Vec<DiagonalGaussian>,
    /// Whether the model is trained
    is_fitted: bool,
    /// Convergence tolerance on the log-likelihood
    tol: f64,
}

impl GaussianHmm {
    /// Create new untrained HMM with given number of states
    pub fn new(n_states: usize) -> Self {
        Self {
            n_states,
            n_features: 0,
            initial_probs: Array1::zeros(0),
            transition_matrix: Array2::zeros((0, 0)),
            states: vec![],
            is_fitted: false,
            tol: 1e-4,
        }
    }

    /// Set convergence tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Number of hidden states
    pub fn n_states(&self) -> usize {
        self.n_states
    }

    /// Whether the model has been fitted
    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Get the transition matrix
    pub fn transition_matrix(&self) -> &Array2<f64> {
        &self.transition_matrix
    }

    /// Fit the model with Baum-Welch (EM)
    ///
    /// # Arguments
    /// * `bundle` - Training sequences in concatenated form
    /// * `max_iter` - EM iteration cap
    /// * `seed` - RNG seed for parameter initialization
    ///
    /// # Returns
    /// Final training log-likelihood
    pub fn fit(&mut self, bundle: &SequenceBundle, max_iter: usize, seed: u64) -> ModelResult<f64> {
        let n_frames = bundle.n_frames();
        if n_frames < self.n_states {
            return Err(ModelError::TooFewObservations {
                needed: self.n_states,
                got: n_frames,
            });
        }

        let mut rng = StdRng::seed_from_u64(seed);
        self.init_params(bundle, &mut rng);

        let mut prev_ll = f64::NEG_INFINITY;
        let mut log_ll = f64::NEG_INFINITY;

        for iter in 0..max_iter {
            // E-step: accumulate statistics over all sequences
            let mut gamma = Array2::zeros((n_frames, self.n_states));
            let mut first_gamma = Array1::zeros(self.n_states);
            let mut xi_sum = Array2::zeros((self.n_states, self.n_states));
            let mut ll = 0.0;
            let mut offset = 0;

            for segment in bundle.segments() {
                let (alpha, beta, seg_gamma, seg_ll) = forward_backward(
                    segment,
                    &self.initial_probs,
                    &self.transition_matrix,
                    &self.states,
                );
                xi_sum += &transition_counts(
                    segment,
                    &alpha,
                    &beta,
                    &self.transition_matrix,
                    &self.states,
                );

                first_gamma += &seg_gamma.row(0);
                let t = segment.nrows();
                gamma
                    .slice_mut(ndarray::s![offset..offset + t, ..])
                    .assign(&seg_gamma);
                offset += t;
                ll += seg_ll;
            }

            if !ll.is_finite() {
                return Err(ModelError::Degenerate);
            }

            // M-step
            self.initial_probs = normalize_or_uniform(first_gamma);
            for i in 0..self.n_states {
                let row = normalize_or_uniform(xi_sum.row(i).to_owned());
                self.transition_matrix.row_mut(i).assign(&row);
            }
            for j in 0..self.n_states {
                self.states[j].update_weighted(bundle.frames().view(), gamma.column(j));
            }

            log_ll = ll;

            if (ll - prev_ll).abs() < self.tol {
                tracing::debug!(iterations = iter + 1, log_likelihood = ll, "EM converged");
                break;
            }
            prev_ll = ll;
        }

        self.is_fitted = true;
        Ok(log_ll)
    }

    /// Log-likelihood of a bundle under the fitted model
    pub fn score(&self, bundle: &SequenceBundle) -> ModelResult<f64> {
        if !self.is_fitted {
            return Err(ModelError::NotFitted);
        }
        if bundle.n_features() != self.n_features {
            return Err(ModelError::DimensionMismatch {
                expected: self.n_features,
                got: bundle.n_features(),
            });
        }

        let mut total = 0.0;
        for segment in bundle.segments() {
            let (_, _, _, seg_ll) = forward_backward(
                segment,
                &self.initial_probs,
                &self.transition_matrix,
                &self.states,
            );
            total += seg_ll;
        }

        if total.is_finite() {
            Ok(total)
        } else {
            Err(ModelError::Degenerate)
        }
    }

    /// Random starting parameters plus k-means emission init
    fn init_params(&mut self, bundle: &SequenceBundle, rng: &mut StdRng) {
        let n = self.n_states;
        let frames = bundle.frames();
        self.n_features = frames.ncols();

        // Uniform-ish initial probabilities
        let mut initial = Array1::zeros(n);
        for i in 0..n {
            initial[i] = rng.gen::<f64>() + 0.1;
        }
        self.initial_probs = normalize_or_uniform(initial);

        // Diagonal-dominant transition matrix
        let mut transition = Array2::zeros((n, n));
        for i in 0..n {
            for j in 0..n {
                transition[[i, j]] = if i == j {
                    0.8 + rng.gen::<f64>() * 0.15
                } else {
                    rng.gen::<f64>() * 0.1
                };
            }
            let row = normalize_or_uniform(transition.row(i).to_owned());
            transition.row_mut(i).assign(&row);
        }
        self.transition_matrix = transition;

        // Emission means via a few k-means iterations, variance from the data
        let variance = data_variance(frames);
        let centers = kmeans_centers(frames, n, rng);
        self.states = centers
            .into_iter()
            .map(|mean| DiagonalGaussian::new(mean, variance.clone()))
            .collect();
    }
}

/// Normalize a non-negative vector to sum 1, falling back to uniform
fn normalize_or_uniform(v: Array1<f64>) -> Array1<f64> {
    let sum = v.sum();
    let n = v.len();
    if sum > 1e-300 {
        v / sum
    } else {
        Array1::from_elem(n, 1.0 / n as f64)
    }
}

/// Per-dimension variance of all frames
fn data_variance(frames: &Array2<f64>) -> Array1<f64> {
    let mean = frames
        .mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(frames.ncols()));
    let mut var = Array1::zeros(frames.ncols());
    for row in frames.rows() {
        for j in 0..frames.ncols() {
            let diff = row[j] - mean[j];
            var[j] += diff * diff;
        }
    }
    if frames.nrows() > 0 {
        var /= frames.nrows() as f64;
    }
    var.mapv(|v: f64| v.max(1e-2))
}

/// Simple k-means over frames, returning k centers
fn kmeans_centers(frames: &Array2<f64>, k: usize, rng: &mut StdRng) -> Vec<Array1<f64>> {
    let n = frames.nrows();
    let d = frames.ncols();

    let mut centers: Vec<Array1<f64>> = (0..k)
        .map(|_| frames.row(rng.gen_range(0..n)).to_owned())
        .collect();

    for _ in 0..10 {
        // Assign frames to nearest center
        let mut assignments = vec![0; n];
        for i in 0..n {
            let mut best_dist = f64::MAX;
            for (j, center) in centers.iter().enumerate() {
                let dist: f64 = frames
                    .row(i)
                    .iter()
                    .zip(center.iter())
                    .map(|(a, b)| (a - b).powi(2))
                    .sum();
                if dist < best_dist {
                    best_dist = dist;
                    assignments[i] = j;
                }
            }
        }

        // Update centers
        for j in 0..k {
            let mut new_center = Array1::zeros(d);
            let mut count = 0;
            for i in 0..n {
                if assignments[i] == j {
                    new_center += &frames.row(i);
                    count += 1;
                }
            }
            if count > 0 {
                new_center /= count as f64;
                centers[j] = new_center;
            }
        }
    }

    centers
}
