//! Action catalog - Data-driven attack and item definitions
//!
//! Definitions are plain data loaded from TOML; [`ActionCatalog::create`] turns
//! one into a fresh [`Action`] with any registered presentation hook attached.

use crate::action::{Action, ActionKind, Attack, AttackRange, DamageFormula, Item, ItemEffect, ItemPayload};
use crate::config::ConfigError;
use crate::hooks::PresentationEffect;
use crate::types::TargetKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Attack entry in an `[[attacks]]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackDefinition {
    pub id: String,
    pub name: String,
    pub power: i32,
    #[serde(default)]
    pub formula: DamageFormula,
    #[serde(default)]
    pub range: AttackRange,
    #[serde(default)]
    pub requires_target_selection: bool,
    #[serde(default)]
    pub default_target: TargetKind,
}

impl AttackDefinition {
    pub fn into_action(self) -> Action {
        let attack = Attack::new(self.power, self.formula).with_range(self.range);
        Action::new(self.id, self.name, ActionKind::Attack(attack))
            .with_target_selection(self.requires_target_selection)
            .with_default_target(self.default_target)
    }
}

/// Item entry in an `[[items]]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub requires_target_selection: bool,
    #[serde(default)]
    pub default_target: TargetKind,
    #[serde(default)]
    pub payload: ItemPayload,
    #[serde(default = "crate::action::default_consumable")]
    pub consumable: bool,
    #[serde(default)]
    pub effect: ItemEffect,
}

impl ItemDefinition {
    pub fn into_action(self) -> Action {
        let item = Item {
            payload: self.payload,
            consumable: self.consumable,
            effect: self.effect,
        };
        Action::item(self.id, self.name, item)
            .with_target_selection(self.requires_target_selection)
            .with_default_target(self.default_target)
    }
}

/// Registry of every action a combatant template can reference by id
#[derive(Clone, Default)]
pub struct ActionCatalog {
    attacks: HashMap<String, AttackDefinition>,
    items: HashMap<String, ItemDefinition>,
    presentations: HashMap<String, Arc<dyn PresentationEffect>>,
    default_presentation: Option<Arc<dyn PresentationEffect>>,
}

impl fmt::Debug for ActionCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionCatalog")
            .field("attacks", &self.attacks)
            .field("items", &self.items)
            .field("presentations", &self.presentations.keys().collect::<Vec<_>>())
            .field("default_presentation", &self.default_presentation.is_some())
            .finish()
    }
}

impl ActionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bundled catalog from `config/actions.toml`
    pub fn with_defaults() -> Self {
        crate::config::default_action_catalog()
    }

    /// Minimal catalog used when the bundled data cannot be read
    pub fn basic() -> Self {
        let mut catalog = Self::new();
        catalog.register_attack(AttackDefinition {
            id: "strike".to_string(),
            name: "Strike".to_string(),
            power: 10,
            formula: DamageFormula::Fixed,
            range: AttackRange::Melee,
            requires_target_selection: false,
            default_target: TargetKind::Opponent,
        });
        catalog.register_item(ItemDefinition {
            id: "potion".to_string(),
            name: "Potion".to_string(),
            requires_target_selection: false,
            default_target: TargetKind::User,
            payload: ItemPayload::heal(30),
            consumable: true,
            effect: ItemEffect::None,
        });
        catalog
    }

    /// Register an attack; a later definition with the same id replaces the earlier one
    pub fn register_attack(&mut self, definition: AttackDefinition) {
        if self.items.remove(&definition.id).is_some() {
            warn!(id = %definition.id, "attack replaces item with the same id");
        }
        self.attacks.insert(definition.id.clone(), definition);
    }

    pub fn register_item(&mut self, definition: ItemDefinition) {
        if self.attacks.remove(&definition.id).is_some() {
            warn!(id = %definition.id, "item replaces attack with the same id");
        }
        self.items.insert(definition.id.clone(), definition);
    }

    pub fn attack(&self, id: &str) -> Option<&AttackDefinition> {
        self.attacks.get(id)
    }

    pub fn item(&self, id: &str) -> Option<&ItemDefinition> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.attacks.contains_key(id) || self.items.contains_key(id)
    }

    /// All ids, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .attacks
            .keys()
            .chain(self.items.keys())
            .map(String::as_str)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.attacks.len() + self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attach a presentation hook to every action created from `id`
    pub fn set_presentation(&mut self, id: impl Into<String>, effect: Arc<dyn PresentationEffect>) {
        self.presentations.insert(id.into(), effect);
    }

    /// Hook for actions without a specific one
    pub fn set_default_presentation(&mut self, effect: Arc<dyn PresentationEffect>) {
        self.default_presentation = Some(effect);
    }

    /// Build a fresh action from its definition
    pub fn create(&self, id: &str) -> Option<Action> {
        let mut action = if let Some(attack) = self.attacks.get(id) {
            attack.clone().into_action()
        } else {
            self.items.get(id)?.clone().into_action()
        };

        let presentation = self
            .presentations
            .get(id)
            .or(self.default_presentation.as_ref())
            .cloned();
        action.set_presentation(presentation);
        Some(action)
    }

    /// Check every definition's effect data
    pub fn validate(&self) -> Result<(), ConfigError> {
        for item in self.items.values() {
            item.effect
                .validate()
                .map_err(|err| ConfigError::ValidationError(format!("item `{}`: {}", item.id, err)))?;
        }
        Ok(())
    }
}
