//! Sequence-model primitive
//!
//! Provides the Gaussian-emission HMM used as the fit/score primitive,
//! exposed to the rest of the crate through the provider trait.

mod algorithms;
mod error;
mod gaussian;
mod hmm;
mod provider;

pub use algorithms::{forward_backward, transition_counts};
pub use error::{ModelError, ModelResult};
pub use gaussian::DiagonalGaussian;
pub use hmm::GaussianHmm;
pub use provider::{GaussianHmmProvider, SequenceModelProvider};
