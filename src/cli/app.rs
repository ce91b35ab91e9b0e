//! Main CLI application structure

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;

use anyhow::{Context, Result};
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};

use super::context::AppContext;
use super::output::{Output, OutputFormat};
use super::plugin_cmd;
use super::tree::CommandTree;
use crate::pipeline::create_output_dir;
use crate::plugin::{PluginCatalog, PluginLoader};
use crate::storage::{Config, KEY_DETAILED, KEY_VERBOSE};

#[derive(Parser)]
#[command(name = "majic")]
#[command(author, version, about = "Because who doesn't need a bespoke CLI to handle day-to-day tasks?")]
#[command(
    long_about = "majic is a general-purpose command-line tool with a modular architecture: \
                  plugins dropped into the plugins directory add new commands."
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Detailed output
    #[arg(long, global = true)]
    pub detailed: bool,

    /// Verbose output (i.e. everything)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Version information for the application
    #[command(visible_alias = "ver")]
    Version,

    /// Permanently delete generated output files
    Clean,

    /// List loaded plugins and the commands they added
    Plugins,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    run_from(std::env::args_os())
}

/// Runs the CLI with explicit arguments
pub fn run_from<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let config = Config::load(&Output::default()).context("Failed to load configuration")?;
    let output = Output::new(
        OutputFormat::Text,
        config.get_bool(KEY_DETAILED),
        config.get_bool(KEY_VERBOSE),
    );
    let mut ctx = AppContext::new(config, output);

    let plugins_dir = ctx.plugins_dir();
    let output_dir = ctx.output_dir();
    create_output_dir(&output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;
    ctx.output()
        .detailed(&format!("Plugins directory: {}", plugins_dir.display()));
    ctx.output()
        .detailed(&format!("Input directory: {}", ctx.input_dir().display()));
    ctx.output()
        .detailed(&format!("Output directory: {}", output_dir.display()));

    let mut tree = CommandTree::new(Cli::command());
    let mut loader = PluginLoader::new(PluginCatalog::builtin());
    loader
        .load_plugins(&plugins_dir, &mut tree, ctx.output())
        .context("Failed to load plugins")?;

    let matches = tree.get_matches_from(args);
    ctx.apply_flags(&matches);

    if let Some((name, sub_matches)) = matches.subcommand() {
        if let Some(command) = tree.plugin_command(name) {
            ctx.output()
                .verbose(&format!("Running plugin command: {}", name));
            return command.run(&ctx, sub_matches);
        }
    }

    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    match cli.command {
        Commands::Version => version(&ctx),
        Commands::Clean => clean(&ctx)?,
        Commands::Plugins => plugin_cmd::list_plugins(&ctx, &loader),
    }

    ctx.output().verbose("Command completed successfully");
    Ok(())
}

/// Prints the version and configured directories
fn version(ctx: &AppContext) {
    let output = ctx.output();
    let plugins_dir = ctx.plugins_dir();
    let input_dir = ctx.input_dir();
    let output_dir = ctx.output_dir();

    if output.is_json() {
        output.data(&serde_json::json!({
            "name": "majic",
            "version": env!("CARGO_PKG_VERSION"),
            "config_file": ctx.config().path(),
            "plugins_dir": plugins_dir,
            "input_dir": input_dir,
            "output_dir": output_dir,
        }));
    } else {
        output.normal(&format!("majic CLI {}", env!("CARGO_PKG_VERSION")));
        output.normal(&format!("Plugins directory: {}", plugins_dir.display()));
        output.normal(&format!("Input directory: {}", input_dir.display()));
        output.normal(&format!("Output directory: {}", output_dir.display()));
    }
}

/// Deletes the output directory and everything in it
fn clean(ctx: &AppContext) -> Result<()> {
    let output_dir = ctx.output_dir();
    ctx.output()
        .normal(&format!("Deleting contents of {}", output_dir.display()));

    match fs::remove_dir_all(&output_dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e)
            .with_context(|| format!("Failed to delete {}", output_dir.display())),
    }
}
