//! Per-word HMM topology selection and word recognition
//!
//! For each vocabulary word, a selection strategy searches over candidate
//! hidden-state counts and keeps the best-fitting Gaussian-emission HMM.
//! The resulting word -> model map is then used to classify unseen
//! sequences by maximum-likelihood scoring.

pub mod data;
pub mod models;
pub mod recognize;
pub mod selection;

pub use data::{SequenceBundle, TestItem, TestSet, WordDataset};
pub use models::{GaussianHmm, GaussianHmmProvider, ModelError, SequenceModelProvider};
pub use recognize::{recognize, Recognition, ScoreTable};
pub use selection::{Selector, SelectorConfig, SelectorContext, SelectorKind};
