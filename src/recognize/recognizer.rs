//! Maximum-likelihood word recognition

use crate::data::TestSet;
use crate::models::SequenceModelProvider;
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-item scores: word -> log-likelihood
///
/// A scoring failure is stored as negative infinity, so it can only win
/// the argmax when every other entry failed too.
pub type ScoreTable = BTreeMap<String, f64>;

/// Recognition output, aligned with the test-item order
#[derive(Debug, Clone, Serialize)]
pub struct Recognition {
    /// One score table per test item
    pub probabilities: Vec<ScoreTable>,
    /// Arg-max word per test item; ties keep the first word in table order
    pub guesses: Vec<String>,
}

/// Score every test item against every word model
///
/// Inputs are not mutated; a per-(model, item) scoring failure only
/// affects that table entry. Fails up front when the model map is empty,
/// since no guess could be produced.
pub fn recognize<P: SequenceModelProvider>(
    provider: &P,
    models: &BTreeMap<String, P::Model>,
    test_set: &TestSet,
) -> Result<Recognition> {
    if models.is_empty() {
        anyhow::bail!("no word models to score against");
    }

    let mut probabilities = Vec::with_capacity(test_set.len());
    let mut guesses = Vec::with_capacity(test_set.len());

    for item in test_set.items() {
        let mut table = ScoreTable::new();
        let mut best_word: Option<&str> = None;
        let mut best_log_l = f64::NEG_INFINITY;

        for (word, model) in models {
            let log_l = match provider.score(model, &item.bundle) {
                Ok(value) => value,
                Err(err) => {
                    tracing::debug!(item = %item.id, %word, %err, "score failed");
                    f64::NEG_INFINITY
                }
            };
            table.insert(word.clone(), log_l);

            if best_word.is_none() || log_l > best_log_l {
                best_word = Some(word);
                best_log_l = log_l;
            }
        }

        if let Some(guess) = best_word {
            guesses.push(guess.to_string());
        }
        probabilities.push(table);
    }

    Ok(Recognition {
        probabilities,
        guesses,
    })
}

/// Fraction of labeled test items guessed wrong
///
/// Returns `None` when no item carries a label.
pub fn word_error_rate(recognition: &Recognition, test_set: &TestSet) -> Option<f64> {
    let mut labeled = 0usize;
    let mut wrong = 0usize;

    for (item, guess) in test_set.items().iter().zip(&recognition.guesses) {
        if let Some(label) = &item.label {
            labeled += 1;
            if label != guess {
                wrong += 1;
            }
        }
    }

    (labeled > 0).then(|| wrong as f64 / labeled as f64)
}

/// Serializable per-item recognition report
#[derive(Debug, Clone, Serialize)]
pub struct RecognitionReport {
    /// Per-item rows, in test order
    pub items: Vec<ItemReport>,
    /// Error rate over labeled items, if any were labeled
    pub word_error_rate: Option<f64>,
}

/// One test item's outcome
#[derive(Debug, Clone, Serialize)]
pub struct ItemReport {
    /// Test item id
    pub id: String,
    /// True word, when known
    pub label: Option<String>,
    /// Recognized word
    pub guess: String,
    /// Full score table
    pub scores: ScoreTable,
}

/// Build the per-item report from a recognition run
pub fn report(recognition: &Recognition, test_set: &TestSet) -> RecognitionReport {
    let items = test_set
        .items()
        .iter()
        .zip(&recognition.guesses)
        .zip(&recognition.probabilities)
        .map(|((item, guess), scores)| ItemReport {
            id: item.id.clone(),
            label: item.label.clone(),
            guess: guess.clone(),
            scores: scores.clone(),
        })
        .collect();

    RecognitionReport {
        items,
        word_error_rate: word_error_rate(recognition, test_set),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SequenceBundle, TestItem};
    use crate::models::ModelError;
    use crate::selection::testutil::{StubModel, StubProvider};
    use ndarray::Array2;

    fn test_item(id: &str, value: f64, label: Option<&str>) -> TestItem {
        let frames = Array2::from_elem((3, 2), value);
        TestItem {
            id: id.to_string(),
            bundle: SequenceBundle::new(frames, vec![3]).unwrap(),
            label: label.map(str::to_string),
        }
    }

    fn models(tags: &[&'static str]) -> BTreeMap<String, StubModel> {
        tags.iter()
            .map(|&tag| (tag.to_string(), StubModel::tagged(tag)))
            .collect()
    }

    #[test]
    fn test_cat_dog_scenario() {
        let mut set = TestSet::new();
        set.push(test_item("0", 1.0, None));

        let provider = StubProvider::new(
            |_, _| true,
            |model, _| {
                Ok(match model.tag {
                    "CAT" => -120.5,
                    "DOG" => -95.2,
                    _ => unreachable!(),
                })
            },
        );

        let result = recognize(&provider, &models(&["CAT", "DOG"]), &set).unwrap();
        assert_eq!(result.guesses, vec!["DOG"]);
        assert_eq!(result.probabilities[0]["CAT"], -120.5);
        assert_eq!(result.probabilities[0]["DOG"], -95.2);
    }

    #[test]
    fn test_output_alignment_and_argmax() {
        let mut set = TestSet::new();
        set.push(test_item("0", 0.0, None));
        set.push(test_item("1", 1.0, None));
        set.push(test_item("2", 2.0, None));

        // Best word flips with the item's frame value
        let provider = StubProvider::new(
            |_, _| true,
            |model, bundle| {
                let v = bundle.frames()[[0, 0]];
                Ok(match model.tag {
                    "CAT" => -10.0 - v,
                    "DOG" => -12.0 + v,
                    _ => unreachable!(),
                })
            },
        );

        let result = recognize(&provider, &models(&["CAT", "DOG"]), &set).unwrap();
        assert_eq!(result.probabilities.len(), 3);
        assert_eq!(result.guesses.len(), 3);

        for (table, guess) in result.probabilities.iter().zip(&result.guesses) {
            let max = table
                .iter()
                .fold(None::<(&String, f64)>, |best, (w, &v)| match best {
                    Some((_, bv)) if v <= bv => best,
                    _ => Some((w, v)),
                });
            assert_eq!(max.unwrap().0, guess);
        }
        assert_eq!(result.guesses, vec!["CAT", "CAT", "DOG"]);
    }

    #[test]
    fn test_score_failure_is_neg_infinity_and_never_wins() {
        let mut set = TestSet::new();
        set.push(test_item("0", 0.0, None));

        let provider = StubProvider::new(
            |_, _| true,
            |model, _| match model.tag {
                "CAT" => Err(ModelError::Degenerate),
                _ => Ok(-500.0),
            },
        );

        let result = recognize(&provider, &models(&["CAT", "DOG"]), &set).unwrap();
        assert_eq!(result.probabilities[0]["CAT"], f64::NEG_INFINITY);
        assert_eq!(result.guesses, vec!["DOG"]);
    }

    #[test]
    fn test_all_failures_falls_back_to_first_word() {
        let mut set = TestSet::new();
        set.push(test_item("0", 0.0, None));

        let provider = StubProvider::new(|_, _| true, |_, _| Err(ModelError::Degenerate));
        let result = recognize(&provider, &models(&["CAT", "DOG"]), &set).unwrap();

        assert!(result.probabilities[0].values().all(|v| *v == f64::NEG_INFINITY));
        assert_eq!(result.guesses, vec!["CAT"]);
    }

    #[test]
    fn test_single_model_always_guessed() {
        let mut set = TestSet::new();
        set.push(test_item("0", 0.0, None));
        set.push(test_item("1", 1.0, None));

        let provider = StubProvider::new(|_, _| true, |_, _| Ok(-1e9));
        let result = recognize(&provider, &models(&["ONLY"]), &set).unwrap();
        assert_eq!(result.guesses, vec!["ONLY", "ONLY"]);
    }

    #[test]
    fn test_empty_model_map_is_an_error() {
        let mut set = TestSet::new();
        set.push(test_item("0", 0.0, None));

        let provider = StubProvider::always_ok();
        let empty: BTreeMap<String, StubModel> = BTreeMap::new();
        assert!(recognize(&provider, &empty, &set).is_err());
    }

    #[test]
    fn test_word_error_rate() {
        let mut set = TestSet::new();
        set.push(test_item("0", 0.0, Some("CAT")));
        set.push(test_item("1", 0.0, Some("DOG")));
        set.push(test_item("2", 0.0, None));

        let provider = StubProvider::new(
            |_, _| true,
            |model, _| Ok(if model.tag == "CAT" { -1.0 } else { -2.0 }),
        );
        let result = recognize(&provider, &models(&["CAT", "DOG"]), &set).unwrap();

        // Everything is guessed CAT: one of two labeled items is wrong
        let wer = word_error_rate(&result, &set).unwrap();
        assert!((wer - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_word_error_rate_unlabeled() {
        let mut set = TestSet::new();
        set.push(test_item("0", 0.0, None));

        let provider = StubProvider::new(|_, _| true, |_, _| Ok(-1.0));
        let result = recognize(&provider, &models(&["CAT"]), &set).unwrap();
        assert!(word_error_rate(&result, &set).is_none());
    }

    #[test]
    fn test_report_rows_align() {
        let mut set = TestSet::new();
        set.push(test_item("a", 0.0, Some("CAT")));
        set.push(test_item("b", 0.0, None));

        let provider = StubProvider::new(|_, _| true, |_, _| Ok(-3.0));
        let result = recognize(&provider, &models(&["CAT"]), &set).unwrap();
        let report = report(&result, &set);

        assert_eq!(report.items.len(), 2);
        assert_eq!(report.items[0].id, "a");
        assert_eq!(report.items[0].guess, "CAT");
        assert_eq!(report.word_error_rate, Some(0.0));
    }
}
