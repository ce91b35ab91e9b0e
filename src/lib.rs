//! majic - a general-purpose CLI extended by plugins
//!
//! Plugins add subcommands at startup. Most of them transform files: they
//! supply a [`TransformStrategy`](pipeline::TransformStrategy) that the
//! [`FilePipeline`](pipeline::FilePipeline) runs over a file or directory
//! tree, writing results to the output directory.

pub mod cli;
pub mod pipeline;
pub mod plugin;
pub mod storage;
