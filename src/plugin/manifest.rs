//! Plugin artifact format
//!
//! Artifacts are TOML files with the `.plugin` extension. The `[plugin]`
//! table is the descriptor. It either binds a compiled-in plugin:
//!
//! ```toml
//! [plugin]
//! entry = "sample"
//! ```
//!
//! or declares rewrite commands:
//!
//! ```toml
//! [plugin]
//! name = "shout"
//! register = ["ShoutCmd"]
//!
//! [commands.ShoutCmd]
//! use = "shout"
//! about = "Upper-case greetings"
//! extensions = ["md"]
//!
//! [[commands.ShoutCmd.rules]]
//! pattern = "hello"
//! replacement = "HELLO"
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

/// A parsed `.plugin` file
#[derive(Debug, Clone, Deserialize)]
pub struct PluginArtifact {
    /// The descriptor table
    pub plugin: Option<DescriptorSpec>,

    /// Command definitions, keyed by identifier
    #[serde(default)]
    pub commands: BTreeMap<String, CommandSpec>,
}

impl PluginArtifact {
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// The `[plugin]` descriptor
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DescriptorSpec {
    /// Key of a compiled-in plugin in the catalog
    pub entry: Option<String>,

    /// Display name (defaults to the artifact's file stem)
    pub name: Option<String>,

    /// Human-readable description
    pub description: Option<String>,

    /// Command identifiers to register, in order
    pub register: Option<Vec<String>>,
}

/// A declarative rewrite command
#[derive(Debug, Clone, Deserialize)]
pub struct CommandSpec {
    /// Subcommand name
    #[serde(rename = "use")]
    pub name: String,

    /// Short help text
    #[serde(default)]
    pub about: String,

    #[serde(default)]
    pub aliases: Vec<String>,

    /// Accepted file extensions, without the dot. Empty accepts every file.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Generated target file name
    pub target_name: Option<String>,

    /// Line written at the top of every target file
    pub header: Option<String>,

    /// Terminate every processed line with `\n`
    #[serde(default = "default_true")]
    pub append_newline: bool,

    /// Regex substitutions applied to each line, in order
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// One regex substitution
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSpec {
    pub pattern: String,

    #[serde(default)]
    pub replacement: String,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_entry_artifact() {
        let artifact = PluginArtifact::parse("[plugin]\nentry = \"sample\"\n").unwrap();

        let descriptor = artifact.plugin.unwrap();
        assert_eq!(descriptor.entry.as_deref(), Some("sample"));
        assert!(descriptor.register.is_none());
        assert!(artifact.commands.is_empty());
    }

    #[test]
    fn parse_declarative_artifact() {
        let toml = r##"
[plugin]
name = "shout"
register = ["ShoutCmd", "Other"]

[commands.ShoutCmd]
use = "shout"
about = "Upper-case greetings"
extensions = ["md", "txt"]
header = "# Shouted"

[[commands.ShoutCmd.rules]]
pattern = "hello"
replacement = "HELLO"
"##;

        let artifact = PluginArtifact::parse(toml).unwrap();
        let descriptor = artifact.plugin.unwrap();
        assert_eq!(descriptor.register.unwrap(), vec!["ShoutCmd", "Other"]);

        let command = &artifact.commands["ShoutCmd"];
        assert_eq!(command.name, "shout");
        assert_eq!(command.extensions, vec!["md", "txt"]);
        assert!(command.append_newline);
        assert!(command.target_name.is_none());
        assert_eq!(command.rules.len(), 1);
        assert_eq!(command.rules[0].replacement, "HELLO");
    }

    #[test]
    fn missing_descriptor_parses_as_none() {
        let artifact = PluginArtifact::parse("title = \"not a plugin\"\n").unwrap();
        assert!(artifact.plugin.is_none());
    }

    #[test]
    fn command_requires_a_name() {
        let toml = "[plugin]\nregister = [\"X\"]\n[commands.X]\nabout = \"no use key\"\n";
        assert!(PluginArtifact::parse(toml).is_err());
    }
}
