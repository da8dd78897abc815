//! DIC-based discriminative model selection

use super::base::{Best, Selector, SelectorContext};
use super::criteria;
use crate::models::SequenceModelProvider;

/// Selects the state count with the highest Discriminative Information
/// Criterion
///
/// DIC = logL(target) - mean logL(other words), rewarding models that fit
/// their own word well while fitting competing words poorly. Anti-words
/// whose scoring fails contribute nothing to the penalty average.
pub struct DicSelector;

impl Selector for DicSelector {
    fn name(&self) -> &'static str {
        "dic"
    }

    fn select<P: SequenceModelProvider>(
        &self,
        ctx: &SelectorContext<'_>,
        provider: &P,
    ) -> Option<P::Model> {
        let mut best: Option<Best<P::Model>> = None;

        for n in ctx.config().state_range() {
            let Some(model) = ctx.fit_candidate(provider, n) else {
                continue;
            };

            let own_log_l = match provider.score(&model, ctx.bundle()) {
                Ok(value) => value,
                Err(err) => {
                    tracing::debug!(word = ctx.word(), n_states = n, %err, "self-score failed");
                    continue;
                }
            };

            let mut anti_sum = 0.0;
            let mut m = 1usize;
            for (other, bundle) in ctx.other_bundles() {
                match provider.score(&model, bundle) {
                    Ok(value) => {
                        anti_sum += value;
                        m += 1;
                    }
                    Err(err) => {
                        tracing::debug!(
                            word = ctx.word(),
                            anti_word = other,
                            n_states = n,
                            %err,
                            "anti-word score failed"
                        );
                    }
                }
            }

            let value = criteria::dic(own_log_l, anti_sum, m);
            tracing::debug!(word = ctx.word(), n_states = n, dic = value, "candidate scored");

            if best.as_ref().map_or(true, |b| value > b.value) {
                best = Some(Best { value, model });
            }
        }

        best.map(|b| b.model)
    }
}
