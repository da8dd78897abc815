//! Sequence-model provider seam
//!
//! Selection and recognition consume the HMM primitive only through
//! [`SequenceModelProvider`], which keeps the search logic independent of
//! the concrete model and testable against stubs.

use super::error::ModelResult;
use super::hmm::GaussianHmm;
use crate::data::SequenceBundle;

/// Narrow fit/score interface over a trainable sequence model
pub trait SequenceModelProvider {
    /// Fitted model handle
    type Model;

    /// Train a model with exactly `n_states` hidden states on a bundle
    fn fit(&self, bundle: &SequenceBundle, n_states: usize, seed: u64) -> ModelResult<Self::Model>;

    /// Log-likelihood of a bundle under a fitted model
    fn score(&self, model: &Self::Model, bundle: &SequenceBundle) -> ModelResult<f64>;
}

/// Provider backed by [`GaussianHmm`]
#[derive(Debug, Clone)]
pub struct GaussianHmmProvider {
    /// EM iteration cap per fit
    pub max_iter: usize,
    /// EM convergence tolerance
    pub tol: f64,
}

impl Default for GaussianHmmProvider {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tol: 1e-4,
        }
    }
}

impl GaussianHmmProvider {
    /// Create with a custom iteration cap
    pub fn with_max_iter(max_iter: usize) -> Self {
        Self {
            max_iter,
            ..Self::default()
        }
    }
}

impl SequenceModelProvider for GaussianHmmProvider {
    type Model = GaussianHmm;

    fn fit(&self, bundle: &SequenceBundle, n_states: usize, seed: u64) -> ModelResult<GaussianHmm> {
        let mut hmm = GaussianHmm::new(n_states).with_tol(self.tol);
        hmm.fit(bundle, self.max_iter, seed)?;
        Ok(hmm)
    }

    fn score(&self, model: &GaussianHmm, bundle: &SequenceBundle) -> ModelResult<f64> {
        model.score(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_fit_score() {
        let rows: Vec<[f64; 1]> = (0..20)
            .map(|i| [if i < 10 { 0.0 } else { 3.0 } + 0.1 * (i % 3) as f64])
            .collect();
        let bundle = SequenceBundle::new(ndarray::arr2(&rows), vec![20]).unwrap();

        let provider = GaussianHmmProvider::with_max_iter(50);
        let model = provider.fit(&bundle, 2, 14).unwrap();
        assert_eq!(model.n_states(), 2);
        assert!(provider.score(&model, &bundle).unwrap().is_finite());
    }
}
