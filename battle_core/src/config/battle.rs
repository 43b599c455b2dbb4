//! Engine-scoped battle settings

use super::ConfigError;
use crate::types::Side;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What happens when an effect lands on a combatant already carrying one with the same name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectMergePolicy {
    /// Keep the existing instance and extend it to the longer duration
    #[default]
    Refresh,
    /// Attach another instance; both tick
    Stack,
    /// Keep the existing instance, drop the new one
    Ignore,
}

fn default_luck_weight() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleConfig {
    /// Who goes first when SPD is equal
    #[serde(default)]
    pub tie_breaker: Side,
    /// Floor for computed attack damage
    #[serde(default)]
    pub min_damage: i32,
    #[serde(default)]
    pub merge_policy: EffectMergePolicy,
    /// Mystery weight shift per point of LUCK difference
    #[serde(default = "default_luck_weight")]
    pub luck_weight: f64,
    /// Skip the action of a combatant whose turn-start effects prevent acting
    #[serde(default = "default_true")]
    pub enforce_action_prevention: bool,
}

impl Default for BattleConfig {
    fn default() -> Self {
        BattleConfig {
            tie_breaker: Side::A,
            min_damage: 0,
            merge_policy: EffectMergePolicy::Refresh,
            luck_weight: default_luck_weight(),
            enforce_action_prevention: true,
        }
    }
}

impl BattleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.luck_weight.is_finite() || self.luck_weight < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "luck_weight must be a non-negative number, got {}",
                self.luck_weight
            )));
        }
        Ok(())
    }
}

/// Load battle settings from a TOML file
pub fn load_battle_config(path: &Path) -> Result<BattleConfig, ConfigError> {
    let config: BattleConfig = super::load_toml(path)?;
    config.validate()?;
    Ok(config)
}

/// Load battle settings from a TOML string
pub fn parse_battle_config(content: &str) -> Result<BattleConfig, ConfigError> {
    let config: BattleConfig = super::parse_toml(content)?;
    config.validate()?;
    Ok(config)
}
