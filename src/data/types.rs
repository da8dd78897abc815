//! Core dataset types
//!
//! A word's training data is a list of feature sequences; models consume
//! the concatenated-frames plus per-sequence-lengths form.

use anyhow::{ensure, Result};
use ndarray::{s, Array2, ArrayView2};
use std::collections::BTreeMap;

/// Concatenated sequences with their individual lengths
///
/// Invariant: the lengths sum to the number of concatenated frames, and
/// every length is positive.
#[derive(Debug, Clone)]
pub struct SequenceBundle {
    frames: Array2<f64>,
    lengths: Vec<usize>,
}

impl SequenceBundle {
    /// Create from already-concatenated frames, checking the invariant
    pub fn new(frames: Array2<f64>, lengths: Vec<usize>) -> Result<Self> {
        ensure!(
            lengths.iter().all(|&l| l > 0),
            "sequence lengths must be positive"
        );
        ensure!(
            lengths.iter().sum::<usize>() == frames.nrows(),
            "lengths sum to {} but bundle has {} frames",
            lengths.iter().sum::<usize>(),
            frames.nrows()
        );
        Ok(Self { frames, lengths })
    }

    /// Concatenate a list of sequences into a bundle
    pub fn from_sequences(sequences: &[Array2<f64>]) -> Result<Self> {
        Self::from_views(sequences.iter().map(|seq| seq.view()))
    }

    /// Concatenate sequence views into a bundle
    pub fn from_views<'a>(views: impl IntoIterator<Item = ArrayView2<'a, f64>>) -> Result<Self> {
        let views: Vec<_> = views.into_iter().collect();
        ensure!(!views.is_empty(), "cannot build a bundle from zero sequences");
        ensure!(
            views.iter().all(|v| v.nrows() > 0),
            "cannot bundle an empty sequence"
        );

        let d = views[0].ncols();
        ensure!(
            views.iter().all(|v| v.ncols() == d),
            "all sequences must have the same feature width"
        );

        let total: usize = views.iter().map(|v| v.nrows()).sum();
        let mut frames = Array2::zeros((total, d));
        let mut lengths = Vec::with_capacity(views.len());
        let mut offset = 0;

        for view in &views {
            let t = view.nrows();
            frames.slice_mut(s![offset..offset + t, ..]).assign(view);
            lengths.push(t);
            offset += t;
        }

        Ok(Self { frames, lengths })
    }

    /// Concatenated frame matrix (frames x features)
    pub fn frames(&self) -> &Array2<f64> {
        &self.frames
    }

    /// Per-sequence lengths
    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// Total number of frames
    pub fn n_frames(&self) -> usize {
        self.frames.nrows()
    }

    /// Feature dimensionality
    pub fn n_features(&self) -> usize {
        self.frames.ncols()
    }

    /// Number of sequences
    pub fn n_sequences(&self) -> usize {
        self.lengths.len()
    }

    /// Iterate over the per-sequence frame views
    pub fn segments(&self) -> impl Iterator<Item = ArrayView2<'_, f64>> {
        self.lengths.iter().scan(0usize, move |offset, &len| {
            let start = *offset;
            *offset += len;
            Some(self.frames.slice(s![start..start + len, ..]))
        })
    }
}

#[derive(Debug, Clone)]
struct WordEntry {
    sequences: Vec<Array2<f64>>,
    bundle: SequenceBundle,
}

/// Training corpus: per-word sequence lists plus their bundled form
///
/// Backed by a `BTreeMap`, so word iteration order is stable.
#[derive(Debug, Clone, Default)]
pub struct WordDataset {
    words: BTreeMap<String, WordEntry>,
}

impl WordDataset {
    /// Create an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a word with its training sequences
    pub fn insert(&mut self, word: impl Into<String>, sequences: Vec<Array2<f64>>) -> Result<()> {
        let bundle = SequenceBundle::from_sequences(&sequences)?;
        self.words.insert(word.into(), WordEntry { sequences, bundle });
        Ok(())
    }

    /// Iterate vocabulary words in stable order
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.keys().map(String::as_str)
    }

    /// Training sequences for a word
    pub fn sequences(&self, word: &str) -> Option<&[Array2<f64>]> {
        self.words.get(word).map(|e| e.sequences.as_slice())
    }

    /// Bundled training data for a word
    pub fn bundle(&self, word: &str) -> Option<&SequenceBundle> {
        self.words.get(word).map(|e| &e.bundle)
    }

    /// Iterate (word, bundle) pairs in stable order
    pub fn bundles(&self) -> impl Iterator<Item = (&str, &SequenceBundle)> {
        self.words.iter().map(|(w, e)| (w.as_str(), &e.bundle))
    }

    /// Whether the word is present
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains_key(word)
    }

    /// Vocabulary size
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// One test utterance
#[derive(Debug, Clone)]
pub struct TestItem {
    /// Item id, unique within the test set
    pub id: String,
    /// Feature frames of the utterance
    pub bundle: SequenceBundle,
    /// True word, when known (used only for error-rate reporting)
    pub label: Option<String>,
}

/// Ordered test corpus; items keep their insertion (item-id) order
#[derive(Debug, Clone, Default)]
pub struct TestSet {
    items: Vec<TestItem>,
}

impl TestSet {
    /// Create an empty test set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a test item
    pub fn push(&mut self, item: TestItem) {
        self.items.push(item);
    }

    /// Items in order
    pub fn items(&self) -> &[TestItem] {
        &self.items
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(rows: &[[f64; 2]]) -> Array2<f64> {
        ndarray::arr2(rows)
    }

    #[test]
    fn test_bundle_invariant() {
        let frames = seq(&[[0.0, 1.0], [1.0, 2.0], [2.0, 3.0]]);
        assert!(SequenceBundle::new(frames.clone(), vec![2, 1]).is_ok());
        assert!(SequenceBundle::new(frames.clone(), vec![2, 2]).is_err());
        assert!(SequenceBundle::new(frames, vec![3, 0]).is_err());
    }

    #[test]
    fn test_from_sequences_and_segments() {
        let a = seq(&[[0.0, 0.0], [1.0, 1.0]]);
        let b = seq(&[[2.0, 2.0], [3.0, 3.0], [4.0, 4.0]]);
        let bundle = SequenceBundle::from_sequences(&[a.clone(), b.clone()]).unwrap();

        assert_eq!(bundle.n_frames(), 5);
        assert_eq!(bundle.n_sequences(), 2);
        assert_eq!(bundle.lengths(), &[2, 3]);

        let segments: Vec<_> = bundle.segments().collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], a.view());
        assert_eq!(segments[1], b.view());
    }

    #[test]
    fn test_from_sequences_rejects_mixed_width() {
        let a = ndarray::arr2(&[[0.0, 0.0]]);
        let b = ndarray::arr2(&[[1.0]]);
        assert!(SequenceBundle::from_views([a.view(), b.view()]).is_err());
    }

    #[test]
    fn test_from_sequences_rejects_empty() {
        let none: [Array2<f64>; 0] = [];
        assert!(SequenceBundle::from_sequences(&none).is_err());
    }

    #[test]
    fn test_word_dataset_order() {
        let mut dataset = WordDataset::new();
        dataset.insert("DOG", vec![seq(&[[0.0, 0.0]])]).unwrap();
        dataset.insert("CAT", vec![seq(&[[1.0, 1.0]])]).unwrap();

        let words: Vec<_> = dataset.words().collect();
        assert_eq!(words, vec!["CAT", "DOG"]);
        assert!(dataset.contains("CAT"));
        assert_eq!(dataset.bundle("DOG").unwrap().n_frames(), 1);
    }

    #[test]
    fn test_test_set_preserves_order() {
        let mut set = TestSet::new();
        for id in ["2", "0", "1"] {
            set.push(TestItem {
                id: id.to_string(),
                bundle: SequenceBundle::new(seq(&[[0.0, 0.0]]), vec![1]).unwrap(),
                label: None,
            });
        }
        let ids: Vec<_> = set.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "0", "1"]);
    }
}
