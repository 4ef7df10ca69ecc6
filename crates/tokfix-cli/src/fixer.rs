//! Fixer listing for the tokfix CLI

use colored::*;
use tokfix_fixer::{FixerRegistry, Preset};

/// List available fixers and presets
pub fn list_fixers(registry: &FixerRegistry) {
    println!("{}", "Available fixers:".bold());
    println!();

    for info in registry.list() {
        let risky_marker = if info.is_risky {
            " [risky]".yellow().to_string()
        } else {
            String::new()
        };

        println!(
            "  {} - {} (priority: {}){}",
            info.name.green(),
            info.description,
            info.priority,
            risky_marker
        );
    }

    println!();
    println!("{}", "Presets:".bold());
    for preset in [Preset::Psr2, Preset::Symfony] {
        println!("  {} - {}", preset.name().green(), preset.rules().join(", "));
    }
}
