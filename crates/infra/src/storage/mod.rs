//! File-based persistence of stage outputs

pub mod batch_files;

pub use batch_files::{aggregated_path_for_events, read_json, write_json, Stage, StagePaths};
