//! Battle data loaded from TOML
//!
//! Three files describe a battle, each with a bundled copy under `config/`:
//!
//! - `battle.toml`: one [`BattleConfig`] (tie breaker, damage floor, merge policy,
//!   luck weight, action prevention)
//! - `actions.toml`: `[[attacks]]` and `[[items]]` tables, validated into an
//!   [`ActionCatalog`](crate::catalog::ActionCatalog)
//! - `combatants.toml`: `[[combatants]]` tables, keyed by id into
//!   [`CombatantTemplate`]s that are built against a catalog
//!
//! Every loader has a `load_*` (path) and `parse_*` (string) form; the bundled
//! data is reachable through the `default_*` functions.

mod actions;
mod battle;
mod combatants;

pub use actions::{default_action_catalog, load_action_catalog, parse_action_catalog, ActionsConfig};
pub use battle::{load_battle_config, parse_battle_config, BattleConfig, EffectMergePolicy};
pub use combatants::{
    default_combatants, load_combatant_templates, parse_combatant_templates, CombatantTemplate,
    CombatantsConfig,
};

use std::fs;
use std::path::Path;
use thiserror::Error;

/// Why a battle, action or combatant file could not be used
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read battle data file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse battle data TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    /// Parsed fine but describes something unplayable (bad range, unknown action id, ...)
    #[error("Invalid battle data: {0}")]
    ValidationError(String),
}

/// Read one of the battle data files and deserialize it
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_toml(&content)
}

pub fn parse_toml<T: serde::de::DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    Ok(toml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_is_reported() {
        let result: Result<BattleConfig, _> = parse_toml("min_damage = \"lots\"");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result: Result<BattleConfig, _> = load_toml(Path::new("/nonexistent/battle.toml"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_validation_error_names_the_data() {
        let err = parse_battle_config("luck_weight = -1.0").unwrap_err();
        assert!(err.to_string().starts_with("Invalid battle data:"), "{}", err);
    }
}
