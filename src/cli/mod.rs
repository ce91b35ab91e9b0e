//! # Command-Line Interface
//!
//! Built-in commands, the command tree plugins attach to, and leveled output.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `version` | Version and configured directories |
//! | `clean` | Delete generated output |
//! | `plugins` | List loaded plugins |
//! | *plugin commands* | Added at startup from the plugins directory |
//!
//! ## Output Levels
//!
//! - normal: always shown
//! - `--detailed`: progress and configuration details
//! - `--verbose` (or `-v`): everything, including each processed line
//!
//! `detailed = true` or `verbose = true` in `~/.majic/clirc` enables a
//! level permanently.
//!
//! ## Entry Point
//!
//! Call [`run()`] to load configuration and plugins, parse arguments and
//! execute the selected command.

mod app;
mod context;
mod output;
mod plugin_cmd;
mod tree;

pub use app::{run, run_from, Cli, Commands};
pub use context::AppContext;
pub use output::{Output, OutputFormat};
pub use tree::{CommandTree, DuplicateCommand};
