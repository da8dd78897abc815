//! CSV corpus loading
//!
//! Training format: `word,seq,<f0..fD>` — one row per frame, frames of a
//! sequence contiguous in the file, sequences keyed by (word, seq id).
//! Test format: `item,label,<f0..fD>` — one row per frame, grouped by item
//! id; `label` may be empty when the true word is unknown.

use super::types::{SequenceBundle, TestItem, TestSet, WordDataset};
use anyhow::{bail, Context, Result};
use ndarray::Array2;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Load a training corpus from a CSV file
pub fn load_training(path: impl AsRef<Path>) -> Result<WordDataset> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("cannot open training corpus {path:?}"))?;
    load_training_from_reader(file)
}

/// Load a training corpus from any reader
pub fn load_training_from_reader<R: Read>(reader: R) -> Result<WordDataset> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    // word -> seq id -> frames, both levels in sorted order
    let mut grouped: BTreeMap<String, BTreeMap<String, Vec<Vec<f64>>>> = BTreeMap::new();

    for (row_idx, record) in csv_reader.records().enumerate() {
        let record = record.with_context(|| format!("bad training row {row_idx}"))?;
        if record.len() < 3 {
            bail!("training row {row_idx} has {} columns, need at least 3", record.len());
        }

        let word = record[0].to_string();
        let seq_id = record[1].to_string();
        let frame = parse_frame(&record, 2)
            .with_context(|| format!("bad feature value in training row {row_idx}"))?;

        grouped.entry(word).or_default().entry(seq_id).or_default().push(frame);
    }

    let mut dataset = WordDataset::new();
    for (word, sequences) in grouped {
        let arrays = sequences
            .into_values()
            .map(rows_to_array)
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("inconsistent sequences for word {word}"))?;
        dataset.insert(word, arrays)?;
    }

    Ok(dataset)
}

/// Load a test corpus from a CSV file
pub fn load_test(path: impl AsRef<Path>) -> Result<TestSet> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("cannot open test corpus {path:?}"))?;
    load_test_from_reader(file)
}

/// Load a test corpus from any reader
pub fn load_test_from_reader<R: Read>(reader: R) -> Result<TestSet> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    // item id -> (label, frames), iterated in sorted item-id order
    let mut grouped: BTreeMap<String, (Option<String>, Vec<Vec<f64>>)> = BTreeMap::new();

    for (row_idx, record) in csv_reader.records().enumerate() {
        let record = record.with_context(|| format!("bad test row {row_idx}"))?;
        if record.len() < 3 {
            bail!("test row {row_idx} has {} columns, need at least 3", record.len());
        }

        let item = record[0].to_string();
        let label = (!record[1].is_empty()).then(|| record[1].to_string());
        let frame = parse_frame(&record, 2)
            .with_context(|| format!("bad feature value in test row {row_idx}"))?;

        let entry = grouped.entry(item).or_insert_with(|| (label.clone(), vec![]));
        entry.1.push(frame);
    }

    let mut test_set = TestSet::new();
    for (id, (label, rows)) in grouped {
        let frames = rows_to_array(rows).with_context(|| format!("bad frames for item {id}"))?;
        let n_frames = frames.nrows();
        let bundle = SequenceBundle::new(frames, vec![n_frames])?;
        test_set.push(TestItem { id, bundle, label });
    }

    Ok(test_set)
}

fn parse_frame(record: &csv::StringRecord, skip: usize) -> Result<Vec<f64>> {
    record
        .iter()
        .skip(skip)
        .map(|field| field.trim().parse::<f64>().map_err(Into::into))
        .collect()
}

fn rows_to_array(rows: Vec<Vec<f64>>) -> Result<Array2<f64>> {
    if rows.is_empty() {
        bail!("sequence has no frames");
    }
    let d = rows[0].len();
    if rows.iter().any(|r| r.len() != d) {
        bail!("frames have inconsistent widths");
    }
    let mut array = Array2::zeros((rows.len(), d));
    for (i, row) in rows.iter().enumerate() {
        for (j, &v) in row.iter().enumerate() {
            array[[i, j]] = v;
        }
    }
    Ok(array)
}
