//! Cross-validated model selection

use super::base::{Best, Selector, SelectorContext};
use crate::data::{kfold_split, SequenceBundle};
use crate::models::SequenceModelProvider;

/// Selects the state count with the highest average held-out
/// log-likelihood over k folds
///
/// k = min(3, sequence count), so a word with a single sequence still gets
/// one (degenerate) fold instead of an impossible 3-way split. Folds are
/// built from whole sequences; a sequence is never split across train and
/// test. A failed fold contributes 0 to the sum but still counts in the
/// average. The model kept for the winning state count is the one fitted
/// on its last fold that fit; candidates where no fold produced a model
/// are not eligible.
pub struct CvSelector;

/// Fold cap
const MAX_FOLDS: usize = 3;

impl Selector for CvSelector {
    fn name(&self) -> &'static str {
        "cv"
    }

    fn select<P: SequenceModelProvider>(
        &self,
        ctx: &SelectorContext<'_>,
        provider: &P,
    ) -> Option<P::Model> {
        let sequences = ctx.sequences();
        let k = sequences.len().min(MAX_FOLDS);
        let folds = kfold_split(k, sequences.len());

        let mut best: Option<Best<P::Model>> = None;

        for n in ctx.config().state_range() {
            let mut log_l_sum = 0.0;
            let mut fold_count = 0usize;
            let mut last_model: Option<P::Model> = None;

            for (train_idx, test_idx) in &folds {
                fold_count += 1;

                let fold_log_l = run_fold(
                    ctx,
                    provider,
                    n,
                    sequences,
                    train_idx,
                    test_idx,
                    &mut last_model,
                );
                log_l_sum += fold_log_l.unwrap_or(0.0);
            }

            let average = log_l_sum / fold_count.max(1) as f64;
            tracing::debug!(
                word = ctx.word(),
                n_states = n,
                cv_log_likelihood = average,
                "candidate scored"
            );

            if let Some(model) = last_model {
                if best.as_ref().map_or(true, |b| average > b.value) {
                    best = Some(Best {
                        value: average,
                        model,
                    });
                }
            }
        }

        best.map(|b| b.model)
    }
}

/// One train/score fold; returns the held-out log-likelihood on success.
///
/// The fitted model is stashed in `last_model` even when the held-out
/// scoring then fails, so the candidate keeps its most recent fit.
fn run_fold<P: SequenceModelProvider>(
    ctx: &SelectorContext<'_>,
    provider: &P,
    n: usize,
    sequences: &[ndarray::Array2<f64>],
    train_idx: &[usize],
    test_idx: &[usize],
    last_model: &mut Option<P::Model>,
) -> Option<f64> {
    let train = gather(sequences, train_idx)?;
    let test = gather(sequences, test_idx)?;

    match provider.fit(&train, n, ctx.config().seed) {
        Ok(model) => {
            let log_l = provider.score(&model, &test);
            *last_model = Some(model);
            match log_l {
                Ok(value) => Some(value),
                Err(err) => {
                    tracing::debug!(word = ctx.word(), n_states = n, %err, "fold score failed");
                    None
                }
            }
        }
        Err(err) => {
            tracing::debug!(word = ctx.word(), n_states = n, %err, "fold fit failed");
            None
        }
    }
}

/// Rebuild a bundle from a subset of whole sequences
fn gather(sequences: &[ndarray::Array2<f64>], indices: &[usize]) -> Option<SequenceBundle> {
    SequenceBundle::from_views(indices.iter().map(|&i| sequences[i].view())).ok()
}
