//! Command tree
//!
//! The clap definition of every subcommand, plus the plugin command objects
//! that handle the subcommands plugins contributed.

use std::collections::BTreeMap;
use std::ffi::OsString;

use clap::{ArgMatches, Command};
use thiserror::Error;

use crate::plugin::PluginCommand;

#[derive(Debug, Error)]
#[error("a command named '{0}' is already registered")]
pub struct DuplicateCommand(pub String);

/// Root command plus ownership of attached plugin commands
pub struct CommandTree {
    root: Command,
    plugin_commands: BTreeMap<String, Box<dyn PluginCommand>>,
}

impl CommandTree {
    pub fn new(root: Command) -> Self {
        Self {
            root,
            plugin_commands: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> &Command {
        &self.root
    }

    /// Returns true if `name` is already taken by a subcommand or alias
    pub fn contains(&self, name: &str) -> bool {
        name == "help" || self.root.find_subcommand(name).is_some()
    }

    /// Attaches a plugin command under the root
    ///
    /// Returns the subcommand name the command was attached as. Fails if the
    /// name or any alias is already taken.
    pub fn attach(
        &mut self,
        definition: Command,
        command: Box<dyn PluginCommand>,
    ) -> Result<String, DuplicateCommand> {
        let name = definition.get_name().to_string();
        if let Some(taken) = std::iter::once(name.as_str())
            .chain(definition.get_all_aliases())
            .find(|candidate| self.contains(candidate))
        {
            return Err(DuplicateCommand(taken.to_string()));
        }

        let root = std::mem::replace(&mut self.root, Command::new(""));
        self.root = root.subcommand(definition);
        self.plugin_commands.insert(name.clone(), command);
        Ok(name)
    }

    /// Looks up the plugin command attached as `name`
    pub fn plugin_command(&self, name: &str) -> Option<&dyn PluginCommand> {
        self.plugin_commands.get(name).map(|command| command.as_ref())
    }

    /// Parses arguments, exiting with usage on error or `--help`
    pub fn get_matches_from<I, T>(&self, args: I) -> ArgMatches
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        self.root.clone().get_matches_from(args)
    }

    /// Parses arguments without exiting
    pub fn try_get_matches_from<I, T>(&self, args: I) -> Result<ArgMatches, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        self.root.clone().try_get_matches_from(args)
    }
}
