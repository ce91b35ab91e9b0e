//! # File Pipeline
//!
//! Generic, line-oriented file transformation shared by every plugin command.
//!
//! ## Flow
//!
//! ```text
//! process_path(path)
//!  ├── missing      → reported, nothing written
//!  ├── file         → process_file (strategy filter bypassed)
//!  └── directory    → process_directory
//!                      ├── sub-directory → recurse
//!                      ├── accepted file → process_file
//!                      └── rejected file → "Skipping: <name>"
//!
//! process_file(file)
//!  reset() → for each line: process_line()
//!            first line: create target, prepare_target()
//!            write the returned text verbatim
//! ```
//!
//! Target files are never overwritten: an existing `a.md` makes the next
//! output `a 1.md`, then `a 2.md`.
//!
//! ## Key Types
//!
//! - [`TransformStrategy`] - The contract a plugin implements
//! - [`FilePipeline`] - Walks paths and drives a strategy
//! - [`PipelineSummary`] - What a traversal wrote and skipped

mod strategy;
mod target;
mod walker;

pub use strategy::TransformStrategy;
pub use target::{copy_then_open_for_append, create_output_dir, create_target_file, unique_file_name};
pub use walker::{FilePipeline, PipelineError, PipelineSummary};
