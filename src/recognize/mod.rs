//! Recognition of test sequences against trained word models

mod recognizer;

pub use recognizer::{
    recognize, report, word_error_rate, ItemReport, Recognition, RecognitionReport, ScoreTable,
};
