//! Deterministic k-fold index splitting
//!
//! Contiguous, unshuffled folds: the first `n_items % n_splits` folds get
//! one extra element, so every index lands in exactly one test fold.

/// Split `0..n_items` into `n_splits` (train, test) index partitions
pub fn kfold_split(n_splits: usize, n_items: usize) -> Vec<(Vec<usize>, Vec<usize>)> {
    if n_splits == 0 || n_items == 0 {
        return vec![];
    }
    let n_splits = n_splits.min(n_items);

    let base = n_items / n_splits;
    let extra = n_items % n_splits;
    let mut folds = Vec::with_capacity(n_splits);
    let mut start = 0;

    for fold in 0..n_splits {
        let size = base + usize::from(fold < extra);
        let end = start + size;
        let test: Vec<usize> = (start..end).collect();
        let train: Vec<usize> = (0..start).chain(end..n_items).collect();
        folds.push((train, test));
        start = end;
    }

    folds
}
