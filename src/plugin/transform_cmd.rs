//! Plugin command that runs a transform strategy over a path

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgMatches, Command};

use super::protocol::PluginCommand;
use crate::cli::AppContext;
use crate::pipeline::TransformStrategy;

/// Builds a fresh strategy for one invocation
pub type StrategyFactory = Box<dyn Fn(&ArgMatches) -> Box<dyn TransformStrategy>>;

/// A subcommand taking an optional path and feeding it to the file pipeline
///
/// Without a path, the configured input directory is processed.
pub struct TransformCommand {
    definition: Command,
    factory: StrategyFactory,
}

impl TransformCommand {
    pub fn new(definition: Command, factory: StrategyFactory) -> Self {
        let definition = definition.arg(
            Arg::new("path")
                .help("File or directory to process [default: configured input_dir]")
                .value_parser(value_parser!(PathBuf)),
        );
        Self {
            definition,
            factory,
        }
    }
}

impl PluginCommand for TransformCommand {
    fn definition(&self) -> Command {
        self.definition.clone()
    }

    fn run(&self, ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
        let output = ctx.output();
        let path = match matches.get_one::<PathBuf>("path") {
            Some(path) => path.clone(),
            None => {
                let input = ctx.input_dir();
                output.normal(&format!(
                    "No path given, processing input directory {}",
                    input.display()
                ));
                input
            }
        };

        let mut strategy = (self.factory)(matches);
        let mut pipeline = ctx.pipeline();
        pipeline
            .process_path(&path, &mut strategy)
            .with_context(|| format!("Failed to process {}", path.display()))?;

        let summary = pipeline.into_summary();
        if output.is_json() {
            output.data(&summary);
        } else {
            output.detailed(&format!(
                "Wrote {} file(s), skipped {}",
                summary.written.len(),
                summary.skipped.len()
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Output;
    use crate::storage::Config;
    use std::fs;
    use tempfile::TempDir;

    /// Upper-cases every line
    struct Upper;

    impl TransformStrategy for Upper {
        fn should_process(&self, _file_name: &str) -> bool {
            true
        }

        fn process_line(&mut self, line: &str) -> String {
            format!("{}\n", line.to_uppercase())
        }
    }

    fn upper() -> TransformCommand {
        TransformCommand::new(
            Command::new("upper"),
            Box::new(|_: &ArgMatches| -> Box<dyn TransformStrategy> { Box::new(Upper) }),
        )
    }

    #[test]
    fn help_names_the_input_dir_default() {
        let help = upper().definition().render_help().to_string();
        assert!(help.contains("[default: configured input_dir]"));
    }

    #[test]
    fn missing_path_processes_input_dir() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        let output_dir = dir.path().join("out");
        fs::create_dir(&input).unwrap();
        fs::create_dir(&output_dir).unwrap();
        fs::write(input.join("a.txt"), "shout\n").unwrap();

        let clirc = dir.path().join("clirc");
        fs::write(
            &clirc,
            format!(
                "input_dir = {:?}\noutput_dir = {:?}\n",
                input.display().to_string(),
                output_dir.display().to_string()
            ),
        )
        .unwrap();
        let config = Config::load_from(&clirc, &Output::default()).unwrap();
        let ctx = AppContext::new(config, Output::default());

        let command = upper();
        let matches = command.definition().try_get_matches_from(["upper"]).unwrap();
        command.run(&ctx, &matches).unwrap();

        assert_eq!(fs::read_to_string(output_dir.join("a.txt")).unwrap(), "SHOUT\n");
    }
}
