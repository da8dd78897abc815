//! Forward-backward recursions for a single observation sequence
//!
//! Scaled implementation: alpha and beta rows are renormalized at every
//! step so long sequences do not underflow; the log-likelihood is
//! recovered from the scaling factors.

use super::gaussian::DiagonalGaussian;
use ndarray::{Array1, Array2, ArrayView2};

/// Forward-Backward algorithm over one sequence
///
/// # Arguments
/// * `observations` - Observation matrix (T x D)
/// * `initial_probs` - Initial state probabilities (N)
/// * `transition_matrix` - State transition probabilities (N x N)
/// * `states` - Emission distribution per state
///
/// # Returns
/// (alpha, beta, gamma, log_likelihood)
/// - alpha: scaled forward probabilities (T x N)
/// - beta: scaled backward probabilities (T x N)
/// - gamma: posterior state probabilities (T x N)
/// - log_likelihood: log P(observations | model)
pub fn forward_backward(
    observations: ArrayView2<f64>,
    initial_probs: &Array1<f64>,
    transition_matrix: &Array2<f64>,
    states: &[DiagonalGaussian],
) -> (Array2<f64>, Array2<f64>, Array2<f64>, f64) {
    let t = observations.nrows();
    let n = initial_probs.len();

    if t == 0 {
        return (
            Array2::zeros((0, n)),
            Array2::zeros((0, n)),
            Array2::zeros((0, n)),
            0.0,
        );
    }

    let emission_probs = emission_matrix(observations, states);

    // Forward pass
    let mut alpha = Array2::zeros((t, n));
    let mut scale = Array1::zeros(t);

    for j in 0..n {
        alpha[[0, j]] = initial_probs[j] * emission_probs[[0, j]];
    }
    scale[0] = alpha.row(0).sum();
    if scale[0] > 1e-300 {
        for j in 0..n {
            alpha[[0, j]] /= scale[0];
        }
    }

    for t_idx in 1..t {
        for j in 0..n {
            let mut sum = 0.0;
            for i in 0..n {
                sum += alpha[[t_idx - 1, i]] * transition_matrix[[i, j]];
            }
            alpha[[t_idx, j]] = sum * emission_probs[[t_idx, j]];
        }

        scale[t_idx] = alpha.row(t_idx).sum();
        if scale[t_idx] > 1e-300 {
            for j in 0..n {
                alpha[[t_idx, j]] /= scale[t_idx];
            }
        }
    }

    let log_likelihood: f64 = scale.iter().map(|s| (s + 1e-300).ln()).sum();

    // Backward pass
    let mut beta = Array2::zeros((t, n));

    for j in 0..n {
        beta[[t - 1, j]] = 1.0;
    }

    for t_idx in (0..t - 1).rev() {
        for i in 0..n {
            let mut sum = 0.0;
            for j in 0..n {
                sum += transition_matrix[[i, j]]
                    * emission_probs[[t_idx + 1, j]]
                    * beta[[t_idx + 1, j]];
            }
            beta[[t_idx, i]] = sum;
        }

        if scale[t_idx + 1] > 1e-300 {
            for i in 0..n {
                beta[[t_idx, i]] /= scale[t_idx + 1];
            }
        }
    }

    // Posterior state probabilities
    let mut gamma = Array2::zeros((t, n));
    for t_idx in 0..t {
        let mut sum = 0.0;
        for j in 0..n {
            gamma[[t_idx, j]] = alpha[[t_idx, j]] * beta[[t_idx, j]];
            sum += gamma[[t_idx, j]];
        }
        if sum > 1e-300 {
            for j in 0..n {
                gamma[[t_idx, j]] /= sum;
            }
        }
    }

    (alpha, beta, gamma, log_likelihood)
}

/// Expected transition counts for one sequence (summed over time)
///
/// Takes the scaled alpha/beta from [`forward_backward`] and returns the
/// N x N matrix of expected i -> j transitions.
pub fn transition_counts(
    observations: ArrayView2<f64>,
    alpha: &Array2<f64>,
    beta: &Array2<f64>,
    transition_matrix: &Array2<f64>,
    states: &[DiagonalGaussian],
) -> Array2<f64> {
    let t = observations.nrows();
    let n = transition_matrix.nrows();
    let mut xi_sum = Array2::zeros((n, n));

    if t < 2 {
        return xi_sum;
    }

    let emission_probs = emission_matrix(observations, states);

    for t_idx in 0..t - 1 {
        for i in 0..n {
            for j in 0..n {
                xi_sum[[i, j]] += alpha[[t_idx, i]]
                    * transition_matrix[[i, j]]
                    * emission_probs[[t_idx + 1, j]]
                    * beta[[t_idx + 1, j]];
            }
        }
    }

    xi_sum
}

/// Emission probabilities for every (frame, state) pair
fn emission_matrix(observations: ArrayView2<f64>, states: &[DiagonalGaussian]) -> Array2<f64> {
    let t = observations.nrows();
    let n = states.len();
    let mut emission_probs = Array2::zeros((t, n));
    for t_idx in 0..t {
        let obs = observations.row(t_idx);
        for j in 0..n {
            emission_probs[[t_idx, j]] = states[j].pdf(obs);
        }
    }
    emission_probs
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn create_test_hmm() -> (Array1<f64>, Array2<f64>, Vec<DiagonalGaussian>) {
        // 2-state HMM with well-separated emissions
        let initial = array![0.6, 0.4];
        let transition = ndarray::arr2(&[[0.7, 0.3], [0.4, 0.6]]);

        let states = vec![
            DiagonalGaussian::new(array![0.0], array![1.0]),
            DiagonalGaussian::new(array![3.0], array![1.0]),
        ];

        (initial, transition, states)
    }

    #[test]
    fn test_forward_backward() {
        let (initial, transition, states) = create_test_hmm();
        let obs = ndarray::arr2(&[[0.1], [0.2], [2.8], [3.1]]);

        let (alpha, _beta, gamma, log_ll) =
            forward_backward(obs.view(), &initial, &transition, &states);

        assert_eq!(alpha.nrows(), 4);
        assert_eq!(gamma.nrows(), 4);

        // Gamma rows should sum to 1
        for t in 0..4 {
            let sum: f64 = gamma.row(t).sum();
            assert!((sum - 1.0).abs() < 1e-6);
        }

        assert!(log_ll.is_finite());
        assert!(log_ll < 0.0);

        // Posterior should follow the separation in the data
        assert!(gamma[[0, 0]] > gamma[[0, 1]]);
        assert!(gamma[[3, 1]] > gamma[[3, 0]]);
    }

    #[test]
    fn test_empty_sequence() {
        let (initial, transition, states) = create_test_hmm();
        let obs = Array2::zeros((0, 1));

        let (_, _, gamma, log_ll) = forward_backward(obs.view(), &initial, &transition, &states);
        assert_eq!(gamma.nrows(), 0);
        assert_eq!(log_ll, 0.0);
    }

    #[test]
    fn test_transition_counts_shape() {
        let (initial, transition, states) = create_test_hmm();
        let obs = ndarray::arr2(&[[0.1], [0.2], [2.8], [3.1]]);

        let (alpha, beta, _, _) = forward_backward(obs.view(), &initial, &transition, &states);
        let xi = transition_counts(obs.view(), &alpha, &beta, &transition, &states);

        assert_eq!(xi.nrows(), 2);
        assert_eq!(xi.ncols(), 2);
        assert!(xi.iter().all(|v| *v >= 0.0));
    }
}
