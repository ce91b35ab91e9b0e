//! Plugin protocol types
//!
//! A plugin is an in-process object. It names the commands it wants to
//! expose through [`Plugin::register`], and hands out the matching exports
//! through [`Plugin::lookup`]:
//!
//! | Symbol | Export |
//! |--------|--------|
//! | `<Id>` | [`Export::Command`] attached under the root command |
//! | `Init<Id>` | [`Export::Initializer`] run on the command definition before attaching (optional) |

use clap::{ArgMatches, Command};

use crate::cli::AppContext;

/// Registration capability every plugin exposes
pub trait Plugin {
    /// Display name used in diagnostics and `majic plugins`
    fn name(&self) -> &str;

    /// Ordered identifiers of the commands this plugin exposes
    fn register(&self) -> Vec<String>;

    /// Resolves an exported symbol by name
    fn lookup(&self, symbol: &str) -> Option<Export>;
}

/// A subcommand contributed by a plugin
pub trait PluginCommand {
    /// The clap definition attached to the command tree
    fn definition(&self) -> Command;

    /// Runs the command with its own sub-matches
    fn run(&self, ctx: &AppContext, matches: &ArgMatches) -> anyhow::Result<()>;
}

/// Registration-time setup for a command, typically attaching flags
pub type Initializer = Box<dyn FnOnce(Command) -> Command>;

/// A symbol resolved inside a plugin
pub enum Export {
    Command(Box<dyn PluginCommand>),
    Initializer(Initializer),
}

impl Export {
    /// Short name of the export kind, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Export::Command(_) => "command",
            Export::Initializer(_) => "initializer",
        }
    }
}

/// Name of the optional initializer symbol for a command identifier
pub fn init_symbol(id: &str) -> String {
    format!("Init{}", id)
}
