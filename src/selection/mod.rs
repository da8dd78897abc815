//! Model-selection strategies
//!
//! Four strategies share one contract: search the configured state-count
//! range for one word and return the best model, or `None` when every
//! candidate failed. `SelectorKind` is the registry keyed by strategy
//! name; enum dispatch keeps the provider type parameter intact.

mod base;
mod bic;
mod constant;
mod criteria;
mod cv;
mod dic;

pub use base::{Selector, SelectorConfig, SelectorContext};
pub use bic::BicSelector;
pub use constant::ConstantSelector;
pub use criteria::{bic as bic_score, dic as dic_score, free_parameters};
pub use cv::CvSelector;
pub use dic::DicSelector;

use crate::data::WordDataset;
use crate::models::SequenceModelProvider;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Strategy registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    /// Fixed state count, no search
    Constant,
    /// Bayesian Information Criterion
    Bic,
    /// Discriminative Information Criterion
    Dic,
    /// k-fold cross-validated likelihood
    Cv,
}

impl SelectorKind {
    /// All registered strategies
    pub const ALL: [SelectorKind; 4] = [
        SelectorKind::Constant,
        SelectorKind::Bic,
        SelectorKind::Dic,
        SelectorKind::Cv,
    ];

    /// Registry key of the strategy
    pub fn name(&self) -> &'static str {
        match self {
            SelectorKind::Constant => ConstantSelector.name(),
            SelectorKind::Bic => BicSelector.name(),
            SelectorKind::Dic => DicSelector.name(),
            SelectorKind::Cv => CvSelector.name(),
        }
    }

    /// Run the strategy for one word
    pub fn select<P: SequenceModelProvider>(
        &self,
        ctx: &SelectorContext<'_>,
        provider: &P,
    ) -> Option<P::Model> {
        match self {
            SelectorKind::Constant => ConstantSelector.select(ctx, provider),
            SelectorKind::Bic => BicSelector.select(ctx, provider),
            SelectorKind::Dic => DicSelector.select(ctx, provider),
            SelectorKind::Cv => CvSelector.select(ctx, provider),
        }
    }
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SelectorKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SelectorKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| {
                anyhow::anyhow!("unknown selection strategy {s:?} (expected constant, bic, dic or cv)")
            })
    }
}

/// Run a strategy over every vocabulary word
///
/// Words whose selector returns no model are left out of the mapping;
/// recognition then simply runs against the reduced vocabulary.
pub fn train_words<P: SequenceModelProvider>(
    kind: SelectorKind,
    dataset: &WordDataset,
    config: SelectorConfig,
    provider: &P,
) -> BTreeMap<String, P::Model> {
    let mut models = BTreeMap::new();

    for word in dataset.words() {
        let ctx = match SelectorContext::new(dataset, word, config) {
            Ok(ctx) => ctx,
            Err(err) => {
                tracing::warn!(word, %err, "skipping word");
                continue;
            }
        };

        match kind.select(&ctx, provider) {
            Some(model) => {
                tracing::info!(word, strategy = kind.name(), "model selected");
                models.insert(word.to_string(), model);
            }
            None => {
                tracing::warn!(word, strategy = kind.name(), "no candidate succeeded");
            }
        }
    }

    models
}


#[cfg(test)]
mod tests {
    use super::testutil::{toy_dataset, StubProvider};
    use super::*;
    use crate::models::ModelError;

    #[test]
    fn test_kind_from_str() {
        assert_eq!("constant".parse::<SelectorKind>().unwrap(), SelectorKind::Constant);
        assert_eq!("bic".parse::<SelectorKind>().unwrap(), SelectorKind::Bic);
        assert_eq!("dic".parse::<SelectorKind>().unwrap(), SelectorKind::Dic);
        assert_eq!("cv".parse::<SelectorKind>().unwrap(), SelectorKind::Cv);
        assert!("viterbi".parse::<SelectorKind>().is_err());
    }

    #[test]
    fn test_kind_display_round_trips() {
        for kind in SelectorKind::ALL {
            assert_eq!(kind.to_string().parse::<SelectorKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_train_words_skips_failed_words() {
        let dataset = toy_dataset(&[("CAT", 3, 10), ("DOG", 2, 7)]);

        // DOG's bundle (14 frames) never fits
        let provider = StubProvider::new(
            |_, bundle| bundle.n_frames() != 14,
            |_, _| Ok(-1.0),
        );

        let models = train_words(
            SelectorKind::Constant,
            &dataset,
            SelectorConfig::default(),
            &provider,
        );

        assert_eq!(models.len(), 1);
        assert!(models.contains_key("CAT"));
        assert!(!models.contains_key("DOG"));
    }

    #[test]
    fn test_train_words_full_vocabulary() {
        let dataset = toy_dataset(&[("CAT", 3, 10), ("DOG", 2, 7), ("EEL", 2, 8)]);
        let provider = StubProvider::new(|_, _| true, |_, _| Ok(-1.0));

        let models = train_words(
            SelectorKind::Bic,
            &dataset,
            SelectorConfig::default(),
            &provider,
        );
        let words: Vec<_> = models.keys().map(String::as_str).collect();
        assert_eq!(words, vec!["CAT", "DOG", "EEL"]);
    }

    #[test]
    fn test_train_words_empty_when_everything_fails() {
        let dataset = toy_dataset(&[("CAT", 3, 10)]);
        let provider = StubProvider::new(|_, _| false, |_, _| Err(ModelError::Degenerate));

        let models = train_words(
            SelectorKind::Dic,
            &dataset,
            SelectorConfig::default(),
            &provider,
        );
        assert!(models.is_empty());
    }
}
