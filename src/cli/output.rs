//! Leveled console output for CLI commands

use std::borrow::Cow;

use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Output helper shared by every command, the pipeline and the plugin registry
///
/// Three levels are supported:
/// - normal: always shown
/// - detailed: shown with `--detailed` or `--verbose`
/// - verbose: shown with `--verbose` only
///
/// Levels are additive. A level enabled in the configuration file cannot be
/// switched off from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    format: OutputFormat,
    detailed: bool,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, detailed: bool, verbose: bool) -> Self {
        Self {
            format,
            detailed,
            verbose,
        }
    }

    /// Returns a copy with the command-line levels merged in
    pub fn with_flags(self, format: OutputFormat, detailed: bool, verbose: bool) -> Self {
        Self {
            format,
            detailed: self.detailed || detailed,
            verbose: self.verbose || verbose,
        }
    }

    /// Prints a message regardless of verbosity
    pub fn normal(&self, message: &str) {
        print!("{}", terminated(message));
    }

    /// Prints a message when detailed or verbose output is enabled
    pub fn detailed(&self, message: &str) {
        if self.is_detailed() {
            self.normal(message);
        }
    }

    /// Prints a message when verbose output is enabled
    pub fn verbose(&self, message: &str) {
        if self.is_verbose() {
            self.normal(message);
        }
    }

    /// Prints structured data
    pub fn data<T: Serialize>(&self, data: &T) {
        let json = match self.format {
            OutputFormat::Text => serde_json::to_string_pretty(data),
            OutputFormat::Json => serde_json::to_string(data),
        };
        if let Ok(json) = json {
            println!("{}", json);
        }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Returns true if detailed messages are shown
    pub fn is_detailed(&self) -> bool {
        self.detailed || self.verbose
    }

    /// Returns true if verbose messages are shown
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Appends a newline unless the message already ends in one
fn terminated(message: &str) -> Cow<'_, str> {
    if message.ends_with('\n') {
        Cow::Borrowed(message)
    } else {
        Cow::Owned(format!("{}\n", message))
    }
}
