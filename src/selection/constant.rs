//! Fixed-state-count baseline strategy

use super::base::{Selector, SelectorContext};
use crate::models::SequenceModelProvider;

/// Baseline: no search, always fit `n_constant` states
pub struct ConstantSelector;

impl Selector for ConstantSelector {
    fn name(&self) -> &'static str {
        "constant"
    }

    fn select<P: SequenceModelProvider>(
        &self,
        ctx: &SelectorContext<'_>,
        provider: &P,
    ) -> Option<P::Model> {
        ctx.fit_candidate(provider, ctx.config().n_constant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::testutil::{toy_dataset, StubProvider};
    use crate::selection::SelectorConfig;

    #[test]
    fn test_exactly_one_fit_with_n_constant() {
        let dataset = toy_dataset(&[("CAT", 3, 10)]);
        let config = SelectorConfig {
            n_constant: 4,
            ..Default::default()
        };
        let ctx = SelectorContext::new(&dataset, "CAT", config).unwrap();
        let provider = StubProvider::always_ok();

        let model = ConstantSelector.select(&ctx, &provider).unwrap();
        assert_eq!(model.n_states, 4);
        assert_eq!(*provider.fit_calls.borrow(), vec![4]);
    }

    #[test]
    fn test_fit_failure_yields_none() {
        let dataset = toy_dataset(&[("CAT", 3, 10)]);
        let ctx = SelectorContext::new(&dataset, "CAT", SelectorConfig::default()).unwrap();
        let provider = StubProvider::always_failing();

        assert!(ConstantSelector.select(&ctx, &provider).is_none());
        assert_eq!(provider.fit_calls.borrow().len(), 1);
    }
}
