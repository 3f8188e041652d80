//! Processing pipeline components.

mod aggregator;
mod coordinator;
mod processor;

pub use aggregator::{Aggregator, aggregate};
pub use coordinator::{output_path_for, prepare_output_dir, write_outputs};
pub use processor::{RunOptions, RunOutput, RunSummary, run_manifest};
