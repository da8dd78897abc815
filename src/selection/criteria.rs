//! Numeric selection criteria

/// Free parameters of an `n`-state diagonal-covariance HMM over `d` features
///
/// `n^2` transition parameters plus mean and variance vectors per state.
pub fn free_parameters(n_states: usize, n_features: usize) -> usize {
    n_states * n_states + 2 * n_features * n_states
}

/// Bayesian Information Criterion; lower is better
pub fn bic(log_likelihood: f64, free_parameters: usize, n_frames: usize) -> f64 {
    -2.0 * log_likelihood + free_parameters as f64 * (n_frames as f64).ln()
}

/// Discriminative Information Criterion; higher is better
///
/// `m` counts the target word plus every successfully scored anti-word.
/// With no scored anti-word (`m <= 1`) the penalty term is zero, so the
/// criterion degenerates to the target word's own log-likelihood.
pub fn dic(own_log_likelihood: f64, anti_log_likelihood_sum: f64, m: usize) -> f64 {
    if m <= 1 {
        own_log_likelihood
    } else {
        own_log_likelihood - anti_log_likelihood_sum / (m - 1) as f64
    }
}
