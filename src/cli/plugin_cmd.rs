//! Plugin listing command

use super::context::AppContext;
use crate::plugin::{PluginLoader, PLUGIN_EXTENSION};

pub fn list_plugins(ctx: &AppContext, loader: &PluginLoader) {
    let output = ctx.output();
    let plugins = loader.list();

    if output.is_json() {
        output.data(&plugins);
        return;
    }

    if plugins.is_empty() {
        println!("No plugins loaded.");
        println!();
        println!(
            "Plugins are loaded from *.{} files in {}",
            PLUGIN_EXTENSION,
            ctx.plugins_dir().display()
        );
    } else {
        println!("Loaded plugins:");
        println!("{:<20} {:<30} PATH", "NAME", "COMMANDS");
        println!("{}", "-".repeat(70));
        for plugin in plugins {
            println!(
                "{:<20} {:<30} {}",
                plugin.name,
                plugin.commands.join(", "),
                plugin.path.display()
            );
        }
    }
}
