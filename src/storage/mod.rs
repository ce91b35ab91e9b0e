//! # Storage Layer
//!
//! Persistent settings for majic.
//!
//! ## Layout
//!
//! ```text
//! ~/.majic/
//! ├── clirc        # Configuration (generated on first run)
//! ├── plugins/     # *.plugin artifacts
//! ├── input/       # Default path for plugin commands
//! └── output/      # Target files written by the pipeline
//! ```
//!
//! Every directory is configurable through `clirc`.

mod config;

pub use config::{
    Config, ConfigError, APP_CONFIG_FILE, APP_CONFIG_HOME, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR,
    DEFAULT_PLUGINS_DIR, KEY_DETAILED, KEY_INPUT_DIR, KEY_OUTPUT_DIR, KEY_PLUGINS_DIR, KEY_VERBOSE,
};
