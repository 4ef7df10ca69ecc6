//! Fixer presets
//!
//! Maps preset names to the rules they enable.

/// Available presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Psr2,
    Symfony,
}

impl Preset {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "psr2" | "psr-2" | "@psr2" | "@psr-2" => Some(Preset::Psr2),
            "symfony" | "@symfony" => Some(Preset::Symfony),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Psr2 => "psr2",
            Preset::Symfony => "symfony",
        }
    }

    pub fn rules(&self) -> &'static [&'static str] {
        match self {
            Preset::Psr2 => PSR2_RULES,
            Preset::Symfony => SYMFONY_RULES,
        }
    }
}

/// Get the list of rules for a preset, empty for unknown names
pub fn get_preset_rules(preset_name: &str) -> &'static [&'static str] {
    Preset::from_str(preset_name).map_or(&[], |preset| preset.rules())
}

/// PSR-2 preset rules
pub const PSR2_RULES: &[&str] = &["indentation"];

/// Symfony preset rules (extends PSR-2)
pub const SYMFONY_RULES: &[&str] = &["indentation", "remove_lines_between_uses"];
