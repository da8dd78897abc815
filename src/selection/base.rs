//! Shared selector state and the strategy trait

use crate::data::{SequenceBundle, WordDataset};
use crate::models::SequenceModelProvider;
use anyhow::{ensure, Result};
use ndarray::Array2;
use std::ops::RangeInclusive;

/// Search parameters shared by every strategy
#[derive(Debug, Clone, Copy)]
pub struct SelectorConfig {
    /// State count used by the constant baseline strategy
    pub n_constant: usize,
    /// Smallest candidate state count (inclusive)
    pub min_states: usize,
    /// Largest candidate state count (inclusive)
    pub max_states: usize,
    /// Seed passed to every fit call
    pub seed: u64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            n_constant: 3,
            min_states: 2,
            max_states: 10,
            seed: 14,
        }
    }
}

impl SelectorConfig {
    /// The inclusive candidate range
    pub fn state_range(&self) -> RangeInclusive<usize> {
        self.min_states..=self.max_states
    }
}

/// Per-word view of the training corpus handed to a strategy
///
/// Holds the target word's sequences and bundle plus the full dataset,
/// which the discriminative strategy needs for its anti-word scores.
pub struct SelectorContext<'a> {
    dataset: &'a WordDataset,
    word: &'a str,
    sequences: &'a [Array2<f64>],
    bundle: &'a SequenceBundle,
    config: SelectorConfig,
}

impl<'a> SelectorContext<'a> {
    /// Create a context for one vocabulary word
    pub fn new(dataset: &'a WordDataset, word: &'a str, config: SelectorConfig) -> Result<Self> {
        ensure!(
            config.min_states <= config.max_states,
            "empty state range {}..={}",
            config.min_states,
            config.max_states
        );
        let (sequences, bundle) = dataset
            .sequences(word)
            .zip(dataset.bundle(word))
            .ok_or_else(|| anyhow::anyhow!("word {word:?} is not in the dataset"))?;
        Ok(Self {
            dataset,
            word,
            sequences,
            bundle,
            config,
        })
    }

    /// Target word
    pub fn word(&self) -> &str {
        self.word
    }

    /// Search parameters
    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// The target word's training sequences
    pub fn sequences(&self) -> &[Array2<f64>] {
        self.sequences
    }

    /// The target word's bundled training data
    pub fn bundle(&self) -> &SequenceBundle {
        self.bundle
    }

    /// Bundles of every other vocabulary word, in stable order
    pub fn other_bundles(&self) -> impl Iterator<Item = (&'a str, &'a SequenceBundle)> + 'a {
        let target = self.word;
        self.dataset.bundles().filter(move |(word, _)| *word != target)
    }

    /// Fit a candidate with `n` states on the target word's data
    ///
    /// Fit failure is local to the candidate: it is logged and mapped to
    /// `None` so the search continues with the next state count.
    pub fn fit_candidate<P: SequenceModelProvider>(
        &self,
        provider: &P,
        n: usize,
    ) -> Option<P::Model> {
        match provider.fit(self.bundle(), n, self.config.seed) {
            Ok(model) => Some(model),
            Err(err) => {
                tracing::debug!(word = self.word, n_states = n, %err, "candidate fit failed");
                None
            }
        }
    }
}

/// A model-selection strategy
pub trait Selector {
    /// Strategy name, matching its registry key
    fn name(&self) -> &'static str;

    /// Run the search and return the chosen model, or `None` when every
    /// candidate failed
    fn select<P: SequenceModelProvider>(
        &self,
        ctx: &SelectorContext<'_>,
        provider: &P,
    ) -> Option<P::Model>;
}

/// Best-so-far candidate: criterion value plus the model that scored it
pub(crate) struct Best<M> {
    pub value: f64,
    pub model: M,
}
