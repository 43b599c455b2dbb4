//! Combatant template loading

use super::ConfigError;
use crate::catalog::ActionCatalog;
use crate::combatant::Combatant;
use crate::stats::StatBlock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A combatant described by data, with actions referenced by catalog id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sprite: String,
    pub max_hp: i32,
    /// Starting HP; full health when absent
    #[serde(default)]
    pub current_hp: Option<i32>,
    pub stats: StatBlock,
    #[serde(default)]
    pub actions: Vec<String>,
}

impl CombatantTemplate {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_hp <= 0 {
            return Err(ConfigError::ValidationError(format!(
                "combatant `{}` has non-positive max_hp {}",
                self.id, self.max_hp
            )));
        }
        Ok(())
    }

    /// Build a combatant, creating each listed action from `catalog`
    pub fn build(&self, catalog: &ActionCatalog) -> Result<Combatant, ConfigError> {
        self.validate()?;

        let mut combatant = Combatant::new(self.name.clone(), self.max_hp, self.stats)
            .with_sprite(self.sprite.clone());
        if let Some(hp) = self.current_hp {
            combatant = combatant.with_current_hp(hp);
        }

        for id in &self.actions {
            let action = catalog.create(id).ok_or_else(|| {
                ConfigError::ValidationError(format!(
                    "combatant `{}` references unknown action `{}`",
                    self.id, id
                ))
            })?;
            combatant.add_action(action);
        }

        Ok(combatant)
    }
}

/// Container for combatant templates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatantsConfig {
    #[serde(rename = "combatants")]
    pub combatants: Vec<CombatantTemplate>,
}

fn into_map(config: CombatantsConfig) -> Result<HashMap<String, CombatantTemplate>, ConfigError> {
    let mut map = HashMap::new();
    for template in config.combatants {
        template.validate()?;
        map.insert(template.id.clone(), template);
    }
    Ok(map)
}

/// Load combatant templates from a TOML file
pub fn load_combatant_templates(path: &Path) -> Result<HashMap<String, CombatantTemplate>, ConfigError> {
    let config: CombatantsConfig = super::load_toml(path)?;
    into_map(config)
}

/// Load combatant templates from a TOML string
pub fn parse_combatant_templates(content: &str) -> Result<HashMap<String, CombatantTemplate>, ConfigError> {
    let config: CombatantsConfig = super::parse_toml(content)?;
    into_map(config)
}

/// Get the bundled combatant templates
pub fn default_combatants() -> HashMap<String, CombatantTemplate> {
    let toml = include_str!("../../config/combatants.toml");
    parse_combatant_templates(toml).unwrap_or_else(|err| {
        tracing::warn!(%err, "bundled combatant templates unusable");
        HashMap::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Stat;

    #[test]
    fn test_parse_and_build() {
        let toml = r#"
[[combatants]]
id = "knight"
name = "Knight"
sprite = "sprites/knight.png"
max_hp = 120
current_hp = 90
actions = ["strike", "potion"]

[combatants.stats]
atk = 11
def = 9
spd = 7
"#;
        let templates = parse_combatant_templates(toml).unwrap();
        let knight = templates["knight"].build(&ActionCatalog::basic()).unwrap();

        assert_eq!(knight.name(), "Knight");
        assert_eq!(knight.sprite(), "sprites/knight.png");
        assert_eq!(knight.max_hp(), 120);
        assert_eq!(knight.current_hp(), 90);
        assert_eq!(knight.stat(Stat::Luck), 0);
        assert_eq!(knight.available_actions().len(), 2);
    }

    #[test]
    fn test_unknown_action_rejected() {
        let template = CombatantTemplate {
            id: "mage".to_string(),
            name: "Mage".to_string(),
            sprite: String::new(),
            max_hp: 60,
            current_hp: None,
            stats: StatBlock::new(5, 3, 9),
            actions: vec!["fireball".to_string()],
        };
        let result = template.build(&ActionCatalog::basic());
        assert!(matches!(result, Err(ConfigError::ValidationError(msg)) if msg.contains("fireball")));
    }

    #[test]
    fn test_non_positive_hp_rejected() {
        let toml = r#"
[[combatants]]
id = "ghost"
name = "Ghost"
max_hp = 0

[combatants.stats]
atk = 1
def = 1
spd = 1
"#;
        assert!(matches!(
            parse_combatant_templates(toml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_bundled_templates_build() {
        let catalog = super::super::default_action_catalog();
        let templates = default_combatants();
        let hero = templates["hero"].build(&catalog).unwrap();
        let goblin = templates["goblin"].build(&catalog).unwrap();

        assert_eq!(hero.max_hp(), 100);
        assert_eq!(hero.stat(Stat::Spd), 14);
        assert_eq!(goblin.max_hp(), 80);
        assert_eq!(goblin.stat(Stat::Spd), 10);
        assert!(hero.find_action("mystery_potion").is_some());
    }
}
