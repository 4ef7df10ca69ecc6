//! Rule selection helpers shared by library users and the CLI

mod presets;

pub use presets::{get_preset_rules, Preset, PSR2_RULES, SYMFONY_RULES};
