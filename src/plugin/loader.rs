//! Plugin discovery and registration
//!
//! Plugins are discovered in the configured plugins directory
//! (`~/.majic/plugins` by default). Every regular file ending in `.plugin`
//! is loaded; anything else is ignored.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use super::catalog::PluginCatalog;
use super::manifest::PluginArtifact;
use super::protocol::{init_symbol, Export, Plugin};
use super::rewrite::RewritePlugin;
use crate::cli::{CommandTree, Output};

/// File extension of plugin artifacts
pub const PLUGIN_EXTENSION: &str = "plugin";

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("Failed to list plugins directory {path}: {source}")]
    ReadDir { path: PathBuf, source: io::Error },

    #[error("Failed to inspect {path}: {source}")]
    Stat { path: PathBuf, source: io::Error },

    #[error("Failed to read plugin {path}: {source}")]
    ReadArtifact { path: PathBuf, source: io::Error },

    #[error("Invalid plugin file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("No [plugin] descriptor in {0}")]
    MissingDescriptor(PathBuf),

    #[error("Descriptor in {0} declares neither an entry nor commands to register")]
    NotADescriptor(PathBuf),

    #[error("Unknown plugin entry '{entry}' in {path} (available: {available})")]
    UnknownEntry {
        path: PathBuf,
        entry: String,
        available: String,
    },

    #[error("Invalid pattern '{pattern}' in command {command}: {message}")]
    InvalidRule {
        command: String,
        pattern: String,
        message: String,
    },
}

/// Information about a loaded plugin
#[derive(Debug, Clone, Serialize)]
pub struct PluginInfo {
    /// Plugin name
    pub name: String,

    /// Path to the plugin artifact
    pub path: PathBuf,

    /// Subcommands the plugin attached
    pub commands: Vec<String>,
}

/// Plugin loader and registry
///
/// A plugin is dropped once its commands are registered. The commands it
/// exported live on in the [`CommandTree`].
pub struct PluginLoader {
    catalog: PluginCatalog,
    info: Vec<PluginInfo>,
}

impl PluginLoader {
    /// Creates a loader resolving `entry` descriptors against `catalog`
    pub fn new(catalog: PluginCatalog) -> Self {
        Self {
            catalog,
            info: Vec::new(),
        }
    }

    /// Lists loaded plugins in load order
    pub fn list(&self) -> &[PluginInfo] {
        &self.info
    }

    /// Loads every plugin in `plugins_dir` and attaches its commands to `tree`
    ///
    /// A missing directory means no plugins. Broken artifacts and unresolvable
    /// commands are reported and skipped. Only failures to list or inspect the
    /// directory are returned as errors.
    pub fn load_plugins(
        &mut self,
        plugins_dir: &Path,
        tree: &mut CommandTree,
        output: &Output,
    ) -> Result<(), PluginError> {
        let read_dir_err = |source| PluginError::ReadDir {
            path: plugins_dir.to_path_buf(),
            source,
        };

        let entries = match fs::read_dir(plugins_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(read_dir_err(e)),
        };

        for entry in entries {
            let entry = entry.map_err(read_dir_err)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();

            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    output.normal(&format!("File {} does not exist.", path.display()));
                    continue;
                }
                Err(source) => return Err(PluginError::Stat { path, source }),
            };

            if !metadata.is_file() || !is_plugin_artifact(&path) {
                output.verbose(&format!("Skipping non-plugin file: {}", name));
                continue;
            }

            match self.load_plugin(&path) {
                Ok(plugin) => self.register_commands(plugin, path, tree, output),
                Err(e) => {
                    output.normal(&format!("Failed to load plugin: {}", path.display()));
                    output.detailed(&e.to_string());
                }
            }
        }

        Ok(())
    }

    /// Reads an artifact and resolves its descriptor into a plugin
    pub fn load_plugin(&self, path: &Path) -> Result<Box<dyn Plugin>, PluginError> {
        let content = fs::read_to_string(path).map_err(|source| PluginError::ReadArtifact {
            path: path.to_path_buf(),
            source,
        })?;

        let artifact = PluginArtifact::parse(&content).map_err(|e| PluginError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let descriptor = artifact
            .plugin
            .as_ref()
            .ok_or_else(|| PluginError::MissingDescriptor(path.to_path_buf()))?;

        if let Some(entry) = &descriptor.entry {
            return self
                .catalog
                .instantiate(entry)
                .ok_or_else(|| PluginError::UnknownEntry {
                    path: path.to_path_buf(),
                    entry: entry.clone(),
                    available: self.catalog.entries().collect::<Vec<_>>().join(", "),
                });
        }

        if descriptor.register.is_some() {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let plugin = RewritePlugin::new(stem, descriptor, &artifact.commands)?;
            return Ok(Box::new(plugin));
        }

        Err(PluginError::NotADescriptor(path.to_path_buf()))
    }

    /// Resolves each registered identifier and attaches it to the tree
    fn register_commands(
        &mut self,
        plugin: Box<dyn Plugin>,
        path: PathBuf,
        tree: &mut CommandTree,
        output: &Output,
    ) {
        output.detailed(&format!("Registering plugin: {}", plugin.name()));

        let mut attached = Vec::new();
        for id in plugin.register() {
            let command = match plugin.lookup(&id) {
                Some(Export::Command(command)) => command,
                Some(other) => {
                    output.normal(&format!(
                        "Warning: symbol {} in plugin {} is an {}, not a command",
                        id,
                        plugin.name(),
                        other.kind()
                    ));
                    continue;
                }
                None => {
                    output.normal(&format!(
                        "Warning: symbol {} not found in plugin {}",
                        id,
                        plugin.name()
                    ));
                    continue;
                }
            };

            let mut definition = command.definition();
            match plugin.lookup(&init_symbol(&id)) {
                Some(Export::Initializer(init)) => {
                    output.verbose(&format!("Initializing command {}", id));
                    definition = init(definition);
                }
                Some(other) => output.normal(&format!(
                    "Warning: symbol {} in plugin {} is a {}, not an initializer",
                    init_symbol(&id),
                    plugin.name(),
                    other.kind()
                )),
                None => {}
            }

            match tree.attach(definition, command) {
                Ok(name) => {
                    output.verbose(&format!("Registered command: {}", name));
                    attached.push(name);
                }
                Err(e) => output.normal(&format!("Warning: {} (plugin {})", e, plugin.name())),
            }
        }

        self.info.push(PluginInfo {
            name: plugin.name().to_string(),
            path,
            commands: attached,
        });
    }
}

fn is_plugin_artifact(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == PLUGIN_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::AppContext;
    use clap::{ArgMatches, Command};
    use tempfile::TempDir;

    use crate::plugin::PluginCommand;

    struct Named(&'static str);

    impl PluginCommand for Named {
        fn definition(&self) -> Command {
            Command::new(self.0)
        }

        fn run(&self, _ctx: &AppContext, _matches: &ArgMatches) -> anyhow::Result<()> {
            Ok(())
        }
    }

    /// Registers one good command, one missing symbol and one that is an initializer
    struct Patchy;

    impl Plugin for Patchy {
        fn name(&self) -> &str {
            "patchy"
        }

        fn register(&self) -> Vec<String> {
            vec!["Missing".into(), "InitGood".into(), "Good".into()]
        }

        fn lookup(&self, symbol: &str) -> Option<Export> {
            match symbol {
                "Good" => Some(Export::Command(Box::new(Named("good")))),
                "InitGood" => Some(Export::Initializer(Box::new(|cmd: Command| {
                    cmd.about("initialized")
                }))),
                _ => None,
            }
        }
    }

    fn patchy() -> Box<dyn Plugin> {
        Box::new(Patchy)
    }

    fn loader() -> PluginLoader {
        let mut catalog = PluginCatalog::builtin();
        catalog.install("patchy", patchy);
        PluginLoader::new(catalog)
    }

    fn tree() -> CommandTree {
        CommandTree::new(Command::new("majic").subcommand(Command::new("version")))
    }

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn new_loader_is_empty() {
        let loader = loader();
        assert!(loader.list().is_empty());
    }

    #[test]
    fn missing_directory_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let mut loader = loader();
        let mut tree = tree();

        loader
            .load_plugins(&dir.path().join("plugins"), &mut tree, &Output::default())
            .unwrap();

        assert!(loader.list().is_empty());
    }

    #[test]
    fn non_plugin_entries_are_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "README.md", "[plugin]\nentry = \"sample\"\n");
        fs::create_dir(dir.path().join("nested.plugin")).unwrap();
        let mut loader = loader();
        let mut tree = tree();

        loader
            .load_plugins(dir.path(), &mut tree, &Output::default())
            .unwrap();

        assert!(loader.list().is_empty());
        assert!(tree.plugin_command("files").is_none());
    }

    #[test]
    fn entry_plugin_attaches_commands_and_runs_initializer() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "sample.plugin", "[plugin]\nentry = \"sample\"\n");
        let mut loader = loader();
        let mut tree = tree();

        loader
            .load_plugins(dir.path(), &mut tree, &Output::default())
            .unwrap();

        assert_eq!(loader.list().len(), 1);
        assert_eq!(loader.list()[0].commands, vec!["sayhi", "files"]);

        let matches = tree
            .try_get_matches_from(["majic", "sayhi", "--excited"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "sayhi");
        assert!(sub.get_flag("excited"));
    }

    #[test]
    fn unresolvable_commands_are_skipped_individually() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "patchy.plugin", "[plugin]\nentry = \"patchy\"\n");
        let mut loader = loader();
        let mut tree = tree();

        loader
            .load_plugins(dir.path(), &mut tree, &Output::default())
            .unwrap();

        assert_eq!(loader.list()[0].commands, vec!["good"]);
        let good = tree.root().find_subcommand("good").unwrap();
        assert_eq!(good.get_about().unwrap().to_string(), "initialized");
    }

    #[test]
    fn broken_plugins_do_not_stop_the_scan() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a-missing.plugin", "title = \"no descriptor\"\n");
        write(dir.path(), "b-unsatisfied.plugin", "[plugin]\nname = \"empty\"\n");
        write(dir.path(), "c-unknown.plugin", "[plugin]\nentry = \"nope\"\n");
        write(dir.path(), "d-garbage.plugin", "[plugin\n");
        write(dir.path(), "e-sample.plugin", "[plugin]\nentry = \"sample\"\n");
        let mut loader = loader();
        let mut tree = tree();

        loader
            .load_plugins(dir.path(), &mut tree, &Output::default())
            .unwrap();

        let names: Vec<_> = loader.list().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["sample"]);
        assert!(tree.plugin_command("files").is_some());
    }

    #[test]
    fn load_plugin_classifies_failures() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "missing.plugin", "x = 1\n");
        write(dir.path(), "unsatisfied.plugin", "[plugin]\ndescription = \"?\"\n");
        write(dir.path(), "unknown.plugin", "[plugin]\nentry = \"nope\"\n");
        let loader = loader();

        assert!(matches!(
            loader.load_plugin(&dir.path().join("missing.plugin")).err().unwrap(),
            PluginError::MissingDescriptor(_)
        ));
        assert!(matches!(
            loader.load_plugin(&dir.path().join("unsatisfied.plugin")).err().unwrap(),
            PluginError::NotADescriptor(_)
        ));
        let unknown = loader
            .load_plugin(&dir.path().join("unknown.plugin"))
            .err()
            .unwrap();
        assert!(matches!(unknown, PluginError::UnknownEntry { .. }));
        assert!(unknown.to_string().ends_with("(available: patchy, sample)"));
        assert!(matches!(
            loader.load_plugin(&dir.path().join("absent.plugin")).err().unwrap(),
            PluginError::ReadArtifact { .. }
        ));
    }

    #[test]
    fn declarative_plugin_registers_listed_commands() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "shout.plugin",
            r##"
[plugin]
register = ["ShoutCmd", "Ghost"]

[commands.ShoutCmd]
use = "shout"

[[commands.ShoutCmd.rules]]
pattern = "hello"
replacement = "HELLO"
"##,
        );
        let mut loader = loader();
        let mut tree = tree();

        loader
            .load_plugins(dir.path(), &mut tree, &Output::default())
            .unwrap();

        let info = &loader.list()[0];
        assert_eq!(info.name, "shout");
        assert_eq!(info.commands, vec!["shout"]);
        assert!(tree.plugin_command("shout").is_some());
    }

    #[test]
    fn colliding_commands_are_skipped() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "clash.plugin",
            "[plugin]\nregister = [\"V\"]\n[commands.V]\nuse = \"version\"\n",
        );
        let mut loader = loader();
        let mut tree = tree();

        loader
            .load_plugins(dir.path(), &mut tree, &Output::default())
            .unwrap();

        assert!(loader.list()[0].commands.is_empty());
        assert!(tree.plugin_command("version").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_is_fatal() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let plugins = dir.path().join("plugins");
        fs::create_dir(&plugins).unwrap();
        fs::set_permissions(&plugins, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits are ignored when running as root
        if fs::read_dir(&plugins).is_ok() {
            return;
        }

        let mut loader = loader();
        let err = loader
            .load_plugins(&plugins, &mut tree(), &Output::default())
            .unwrap_err();
        fs::set_permissions(&plugins, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(err, PluginError::ReadDir { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_artifact_names_are_loaded() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let name = OsStr::from_bytes(b"sampl\xe9.plugin");
        fs::write(dir.path().join(name), "[plugin]\nentry = \"sample\"\n").unwrap();
        let mut loader = loader();
        let mut tree = tree();

        loader
            .load_plugins(dir.path(), &mut tree, &Output::default())
            .unwrap();

        assert_eq!(loader.list().len(), 1);
        assert_eq!(loader.list()[0].path, dir.path().join(name));
        assert!(tree.plugin_command("sayhi").is_some());
    }
}
