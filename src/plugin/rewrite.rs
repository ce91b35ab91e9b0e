//! Declarative rewrite plugins
//!
//! Built from a `.plugin` artifact that declares its commands inline. Each
//! command rewrites lines with an ordered list of regex substitutions.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::rc::Rc;

use clap::{ArgMatches, Command};
use regex::Regex;

use super::loader::PluginError;
use super::manifest::{CommandSpec, DescriptorSpec};
use super::protocol::{Export, Plugin};
use super::transform_cmd::TransformCommand;
use crate::pipeline::TransformStrategy;

/// Compiled form of a [`CommandSpec`]
#[derive(Debug)]
pub struct RewriteRules {
    name: String,
    about: String,
    aliases: Vec<String>,
    extensions: Vec<String>,
    target_name: Option<String>,
    header: Option<String>,
    append_newline: bool,
    rules: Vec<(Regex, String)>,
}

impl RewriteRules {
    pub fn compile(id: &str, spec: &CommandSpec) -> Result<Self, PluginError> {
        let rules = spec
            .rules
            .iter()
            .map(|rule| {
                Regex::new(&rule.pattern)
                    .map(|re| (re, rule.replacement.clone()))
                    .map_err(|e| PluginError::InvalidRule {
                        command: id.to_string(),
                        pattern: rule.pattern.clone(),
                        message: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: spec.name.clone(),
            about: spec.about.clone(),
            aliases: spec.aliases.clone(),
            extensions: spec
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .collect(),
            target_name: spec.target_name.clone(),
            header: spec.header.clone(),
            append_newline: spec.append_newline,
            rules,
        })
    }

    fn definition(&self) -> Command {
        Command::new(self.name.clone())
            .about(self.about.clone())
            .visible_aliases(self.aliases.clone())
    }

    fn apply(&self, line: &str) -> String {
        let mut result = line.to_string();
        for (pattern, replacement) in &self.rules {
            result = pattern
                .replace_all(&result, replacement.as_str())
                .into_owned();
        }
        if self.append_newline {
            result.push('\n');
        }
        result
    }
}

/// Strategy applying a command's rewrite rules
pub struct RewriteStrategy {
    rules: Rc<RewriteRules>,
}

impl RewriteStrategy {
    pub fn new(rules: Rc<RewriteRules>) -> Self {
        Self { rules }
    }
}

impl TransformStrategy for RewriteStrategy {
    fn should_process(&self, file_name: &str) -> bool {
        if self.rules.extensions.is_empty() {
            return true;
        }
        Path::new(file_name)
            .extension()
            .map(|ext| ext.to_string_lossy())
            .is_some_and(|ext| self.rules.extensions.iter().any(|e| *e == ext))
    }

    fn uses_generated_names(&self) -> bool {
        self.rules.target_name.is_some()
    }

    fn target_name(&self) -> String {
        self.rules.target_name.clone().unwrap_or_default()
    }

    fn prepare_target(&mut self, target: &mut File) -> io::Result<()> {
        if let Some(header) = &self.rules.header {
            writeln!(target, "{}", header)?;
        }
        Ok(())
    }

    fn process_line(&mut self, line: &str) -> String {
        self.rules.apply(line)
    }
}

/// A plugin whose commands are all declared in its artifact
pub struct RewritePlugin {
    name: String,
    register: Vec<String>,
    commands: BTreeMap<String, Rc<RewriteRules>>,
}

impl RewritePlugin {
    pub fn new(
        name: impl Into<String>,
        descriptor: &DescriptorSpec,
        commands: &BTreeMap<String, CommandSpec>,
    ) -> Result<Self, PluginError> {
        let commands = commands
            .iter()
            .map(|(id, spec)| Ok((id.clone(), Rc::new(RewriteRules::compile(id, spec)?))))
            .collect::<Result<BTreeMap<_, _>, PluginError>>()?;

        Ok(Self {
            name: descriptor.name.clone().unwrap_or_else(|| name.into()),
            register: descriptor.register.clone().unwrap_or_default(),
            commands,
        })
    }
}

impl Plugin for RewritePlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn register(&self) -> Vec<String> {
        self.register.clone()
    }

    fn lookup(&self, symbol: &str) -> Option<Export> {
        let rules = Rc::clone(self.commands.get(symbol)?);
        let definition = rules.definition();
        let command = TransformCommand::new(
            definition,
            Box::new(move |_: &ArgMatches| -> Box<dyn TransformStrategy> {
                Box::new(RewriteStrategy::new(Rc::clone(&rules)))
            }),
        );
        Some(Export::Command(Box::new(command)))
    }
}
