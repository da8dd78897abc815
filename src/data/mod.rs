//! Dataset types, CSV loading and index splitting

mod loader;
mod split;
mod types;

pub use loader::{load_test, load_test_from_reader, load_training, load_training_from_reader};
pub use split::kfold_split;
pub use types::{SequenceBundle, TestItem, TestSet, WordDataset};
