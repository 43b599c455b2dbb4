//! Action catalog loading

use super::ConfigError;
use crate::catalog::{ActionCatalog, AttackDefinition, ItemDefinition};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Container for attack and item definitions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionsConfig {
    #[serde(default)]
    pub attacks: Vec<AttackDefinition>,
    #[serde(default)]
    pub items: Vec<ItemDefinition>,
}

impl ActionsConfig {
    fn into_catalog(self) -> Result<ActionCatalog, ConfigError> {
        let mut catalog = ActionCatalog::new();
        for attack in self.attacks {
            catalog.register_attack(attack);
        }
        for item in self.items {
            catalog.register_item(item);
        }
        catalog.validate()?;
        Ok(catalog)
    }
}

/// Load an action catalog from a TOML file
pub fn load_action_catalog(path: &Path) -> Result<ActionCatalog, ConfigError> {
    let config: ActionsConfig = super::load_toml(path)?;
    config.into_catalog()
}

/// Load an action catalog from a TOML string
pub fn parse_action_catalog(content: &str) -> Result<ActionCatalog, ConfigError> {
    let config: ActionsConfig = super::parse_toml(content)?;
    config.into_catalog()
}

/// Get the bundled action catalog
pub fn default_action_catalog() -> ActionCatalog {
    let toml = include_str!("../../config/actions.toml");
    parse_action_catalog(toml).unwrap_or_else(|err| {
        warn!(%err, "bundled action catalog unusable, falling back to basic actions");
        ActionCatalog::basic()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{DamageFormula, ItemEffect, Recipient};
    use crate::effect::EffectRecipe;
    use crate::types::TargetKind;

    #[test]
    fn test_parse_actions() {
        let toml = r#"
[[attacks]]
id = "slash"
name = "Slash"
power = 12
formula = "power_vs_defense"

[[items]]
id = "poison_vial"
name = "Poison Vial"
requires_target_selection = true

[items.effect]
kind = "poison"
damage = 5
turns = { min = 2, max = 5 }

[[items]]
id = "potion"
name = "Potion"
default_target = "user"

[items.payload]
heal = 30
"#;

        let catalog = parse_action_catalog(toml).unwrap();
        assert_eq!(catalog.len(), 3);

        let slash = catalog.attack("slash").unwrap();
        assert_eq!(slash.formula, DamageFormula::PowerVsDefense);

        let vial = catalog.create("poison_vial").unwrap();
        assert!(vial.requires_target_selection);
        assert!(matches!(
            vial.as_item().map(|item| &item.effect),
            Some(ItemEffect::Status(EffectRecipe::Poison { damage: 5, .. }))
        ));

        let potion = catalog.create("potion").unwrap();
        assert_eq!(potion.default_target, TargetKind::User);
        assert_eq!(potion.as_item().and_then(|item| item.payload.heal), Some(30));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let toml = r#"
[[items]]
id = "frost"
name = "Frost"

[items.effect]
kind = "freeze"
turns = { min = 3, max = 1 }
"#;
        assert!(matches!(parse_action_catalog(toml), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_bundled_catalog() {
        let catalog = parse_action_catalog(include_str!("../../config/actions.toml")).unwrap();
        for id in [
            "strike",
            "quick_shot",
            "heavy_blow",
            "potion",
            "elixir",
            "poison_vial",
            "fire_flask",
            "frost_shard",
            "regen_tonic",
            "power_tonic",
            "mystery_potion",
        ] {
            assert!(catalog.contains(id), "missing {}", id);
        }

        let mystery = catalog.item("mystery_potion").unwrap();
        let ItemEffect::Mystery(table) = &mystery.effect else {
            panic!("mystery_potion should be a mystery item");
        };
        assert!(table.luck_bias);
        assert!(table.branches.iter().any(|b| b.recipient == Recipient::User));
        assert_eq!(default_action_catalog().len(), catalog.len());
    }
}
