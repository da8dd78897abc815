//! BIC-based model selection

use super::base::{Best, Selector, SelectorContext};
use super::criteria;
use crate::models::SequenceModelProvider;

/// Selects the state count with the lowest Bayesian Information Criterion
///
/// BIC = -2 logL + p ln N, where p is the free-parameter count and N the
/// number of training frames. The complexity penalty keeps the search from
/// always preferring the largest topology.
pub struct BicSelector;

impl Selector for BicSelector {
    fn name(&self) -> &'static str {
        "bic"
    }

    fn select<P: SequenceModelProvider>(
        &self,
        ctx: &SelectorContext<'_>,
        provider: &P,
    ) -> Option<P::Model> {
        let bundle = ctx.bundle();
        let n_features = bundle.n_features();
        let n_frames = bundle.n_frames();

        let mut best: Option<Best<P::Model>> = None;

        for n in ctx.config().state_range() {
            let Some(model) = ctx.fit_candidate(provider, n) else {
                continue;
            };

            let log_l = match provider.score(&model, bundle) {
                Ok(value) => value,
                Err(err) => {
                    tracing::debug!(word = ctx.word(), n_states = n, %err, "training score failed");
                    continue;
                }
            };

            let value = criteria::bic(log_l, criteria::free_parameters(n, n_features), n_frames);
            tracing::debug!(word = ctx.word(), n_states = n, bic = value, "candidate scored");

            // Strict comparison keeps the first-seen minimum on ties
            if best.as_ref().map_or(true, |b| value < b.value) {
                best = Some(Best { value, model });
            }
        }

        best.map(|b| b.model)
    }
}
