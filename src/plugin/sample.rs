//! Sample plugin shipped with majic
//!
//! Activated by a `.plugin` artifact containing `entry = "sample"`.
//!
//! - `sayhi [NAME] [--excited]` - greets NAME (default "World")
//! - `files [PATH]` - changes "the" to "THE" in markdown files

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};

use super::catalog::PluginCatalog;
use super::protocol::{Export, Plugin, PluginCommand};
use super::transform_cmd::TransformCommand;
use crate::cli::AppContext;
use crate::pipeline::TransformStrategy;

/// Catalog key of the sample plugin
pub const ENTRY: &str = "sample";

const SAY_HI: &str = "SayHiCmd";
const INIT_SAY_HI: &str = "InitSayHiCmd";
const FILES: &str = "FilesCmd";

/// Installs the sample plugin into the catalog
pub fn install(catalog: &mut PluginCatalog) {
    catalog.install(ENTRY, create);
}

fn create() -> Box<dyn Plugin> {
    Box::new(SamplePlugin)
}

struct SamplePlugin;

impl Plugin for SamplePlugin {
    fn name(&self) -> &str {
        "sample"
    }

    fn register(&self) -> Vec<String> {
        vec![SAY_HI.to_string(), FILES.to_string()]
    }

    fn lookup(&self, symbol: &str) -> Option<Export> {
        match symbol {
            SAY_HI => Some(Export::Command(Box::new(SayHiCommand))),
            INIT_SAY_HI => Some(Export::Initializer(Box::new(|command: Command| {
                command.arg(
                    Arg::new("excited")
                        .short('e')
                        .long("excited")
                        .action(ArgAction::SetTrue)
                        .help("Say it like you mean it!"),
                )
            }))),
            FILES => Some(Export::Command(Box::new(TransformCommand::new(
                Command::new("files").about("Change \"the\" to \"THE\" in markdown files"),
                Box::new(|_: &ArgMatches| -> Box<dyn TransformStrategy> {
                    Box::new(EmphasizeThe)
                }),
            )))),
            _ => None,
        }
    }
}

/// Greets someone, enthusiastically with `--excited`
struct SayHiCommand;

impl PluginCommand for SayHiCommand {
    fn definition(&self) -> Command {
        Command::new("sayhi")
            .visible_alias("hi")
            .about("Sample command that says 'hi'")
            .arg(Arg::new("name").help("Who to greet"))
    }

    fn run(&self, ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
        let name = matches
            .get_one::<String>("name")
            .map(String::as_str)
            .unwrap_or("World");

        // `--excited` only exists once InitSayHiCmd has run
        let excited = matches
            .try_get_one::<bool>("excited")
            .ok()
            .flatten()
            .copied()
            .unwrap_or(false);

        if excited {
            ctx.output().normal(&format!("Hi {}!!!!!", name));
        } else {
            ctx.output().normal(&format!("Hello {}.", name));
        }
        Ok(())
    }
}

/// Upper-cases every "the" in markdown files
#[derive(Debug, Default)]
pub struct EmphasizeThe;

impl TransformStrategy for EmphasizeThe {
    fn should_process(&self, file_name: &str) -> bool {
        file_name.ends_with(".md")
    }

    fn process_line(&mut self, line: &str) -> String {
        format!("{}\n", line.replace("the", "THE"))
    }
}
