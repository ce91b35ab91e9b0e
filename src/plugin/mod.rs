//! # Plugin System
//!
//! Extensibility layer: plugins contribute subcommands, most of which run a
//! [`TransformStrategy`](crate::pipeline::TransformStrategy) through the file
//! pipeline.
//!
//! ## Overview
//!
//! Plugins run in-process. At startup every `*.plugin` file in the plugins
//! directory is read; its `[plugin]` table is the descriptor.
//!
//! | Descriptor | Plugin |
//! |------------|--------|
//! | `entry = "<key>"` | A plugin compiled into majic, looked up in the [`PluginCatalog`] |
//! | `register = [...]` + `[commands.<Id>]` | A declarative [`RewritePlugin`] |
//!
//! ## Registration Protocol
//!
//! ```text
//! Loader                          Plugin
//!  │                                │
//!  ├── register() ─────────────────►│
//!  │◄──────────── ["SayHiCmd", "FilesCmd"]
//!  │                                │
//!  ├── lookup("SayHiCmd") ─────────►│  Export::Command
//!  ├── lookup("InitSayHiCmd") ─────►│  Export::Initializer (optional)
//!  └── attach to command tree
//! ```
//!
//! A missing or mistyped symbol skips that one command. A plugin that fails
//! to load is skipped; the scan carries on with the next file.
//!
//! ## Key Types
//!
//! - [`PluginLoader`] - Discovers plugins and registers their commands
//! - [`Plugin`] - The descriptor capability
//! - [`PluginCommand`] - A contributed subcommand
//! - [`TransformCommand`] - Subcommand that feeds a path to the pipeline

mod catalog;
mod loader;
mod manifest;
mod protocol;
mod rewrite;
mod sample;
mod transform_cmd;

pub use catalog::{PluginCatalog, PluginFactory};
pub use loader::{PluginError, PluginInfo, PluginLoader, PLUGIN_EXTENSION};
pub use manifest::{CommandSpec, DescriptorSpec, PluginArtifact, RuleSpec};
pub use protocol::{init_symbol, Export, Initializer, Plugin, PluginCommand};
pub use rewrite::{RewritePlugin, RewriteRules, RewriteStrategy};
pub use sample::EmphasizeThe;
pub use transform_cmd::{StrategyFactory, TransformCommand};
