//! Shared state handed to every command

use std::path::PathBuf;

use clap::ArgMatches;

use super::output::{Output, OutputFormat};
use crate::pipeline::FilePipeline;
use crate::storage::{
    Config, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_PLUGINS_DIR, KEY_INPUT_DIR,
    KEY_OUTPUT_DIR, KEY_PLUGINS_DIR,
};

/// Configuration and output levels, built once at startup
pub struct AppContext {
    config: Config,
    output: Output,
}

impl AppContext {
    pub fn new(config: Config, output: Output) -> Self {
        Self { config, output }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Merges the global `--format`, `--detailed` and `--verbose` flags
    pub fn apply_flags(&mut self, matches: &ArgMatches) {
        let format = matches
            .try_get_one::<OutputFormat>("format")
            .ok()
            .flatten()
            .copied()
            .unwrap_or_default();
        let flag = |id: &str| {
            matches
                .try_get_one::<bool>(id)
                .ok()
                .flatten()
                .copied()
                .unwrap_or(false)
        };

        self.output = self
            .output
            .with_flags(format, flag("detailed"), flag("verbose"));
    }

    /// Returns the expanded setting for `key`, or `default` when missing
    pub fn setting(&self, key: &str, default: &str) -> String {
        self.config.get_or(key, default, &self.output)
    }

    pub fn plugins_dir(&self) -> PathBuf {
        PathBuf::from(self.setting(KEY_PLUGINS_DIR, DEFAULT_PLUGINS_DIR))
    }

    pub fn input_dir(&self) -> PathBuf {
        PathBuf::from(self.setting(KEY_INPUT_DIR, DEFAULT_INPUT_DIR))
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(self.setting(KEY_OUTPUT_DIR, DEFAULT_OUTPUT_DIR))
    }

    /// Creates a file pipeline writing into the configured output directory
    pub fn pipeline(&self) -> FilePipeline<'_> {
        FilePipeline::new(&self.output, self.output_dir())
    }
}
