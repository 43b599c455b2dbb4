//! Actions - Everything a combatant can do on its turn
//!
//! The action family is closed: an [`Action`] is either an [`Attack`] or an
//! [`Item`], and items come in a fixed set of flavors selected by [`ItemEffect`]
//! (plain, a fixed status effect recipe, or a mystery table). All of them share
//! the same `execute` entry point, target-selection flag and presentation hook.

mod attack;
mod item;
mod mystery;

pub use attack::{Attack, AttackRange, DamageFormula};
pub use item::{Item, ItemEffect, ItemPayload};
pub(crate) use item::default_consumable;
pub use mystery::{MysteryBranch, MysteryTable, Recipient};

use crate::engine::BattleEngine;
use crate::hooks::PresentationEffect;
use crate::types::{Side, TargetKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// The variant-specific part of an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    Attack(Attack),
    Item(Item),
}

/// An executable choice for a combatant's turn
#[derive(Clone, Serialize, Deserialize)]
pub struct Action {
    /// Unique within one combatant's action list
    pub id: String,
    /// Display name
    pub name: String,
    /// Whether the caller must be asked who to target
    #[serde(default)]
    pub requires_target_selection: bool,
    /// Target used when none is supplied and no selection is required
    #[serde(default)]
    pub default_target: TargetKind,
    pub kind: ActionKind,
    #[serde(skip)]
    presentation: Option<Arc<dyn PresentationEffect>>,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("requires_target_selection", &self.requires_target_selection)
            .field("default_target", &self.default_target)
            .field("kind", &self.kind)
            .field("presentation", &self.presentation.is_some())
            .finish()
    }
}

impl Action {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ActionKind) -> Self {
        Action {
            id: id.into(),
            name: name.into(),
            requires_target_selection: false,
            default_target: TargetKind::Opponent,
            kind,
            presentation: None,
        }
    }

    /// An attack dealing exactly `power` damage
    pub fn attack(id: impl Into<String>, name: impl Into<String>, power: i32) -> Self {
        Self::new(id, name, ActionKind::Attack(Attack::fixed(power)))
    }

    pub fn item(id: impl Into<String>, name: impl Into<String>, item: Item) -> Self {
        Self::new(id, name, ActionKind::Item(item))
    }

    pub fn with_target_selection(mut self, required: bool) -> Self {
        self.requires_target_selection = required;
        self
    }

    pub fn with_default_target(mut self, target: TargetKind) -> Self {
        self.default_target = target;
        self
    }

    pub fn with_presentation(mut self, effect: Arc<dyn PresentationEffect>) -> Self {
        self.presentation = Some(effect);
        self
    }

    pub fn set_presentation(&mut self, effect: Option<Arc<dyn PresentationEffect>>) {
        self.presentation = effect;
    }

    pub fn presentation(&self) -> Option<&Arc<dyn PresentationEffect>> {
        self.presentation.as_ref()
    }

    pub fn as_attack(&self) -> Option<&Attack> {
        match &self.kind {
            ActionKind::Attack(attack) => Some(attack),
            ActionKind::Item(_) => None,
        }
    }

    pub fn as_item(&self) -> Option<&Item> {
        match &self.kind {
            ActionKind::Item(item) => Some(item),
            ActionKind::Attack(_) => None,
        }
    }

    pub fn is_consumable(&self) -> bool {
        self.as_item().is_some_and(|item| item.consumable)
    }

    /// Perform the action from `source` against `target`.
    ///
    /// All state changes happen before the presentation hook is awaited. A
    /// target that is already down makes this a no-op.
    pub async fn execute(&self, source: Side, target: Side, engine: &mut BattleEngine) {
        if !engine.combatant(target).is_alive() {
            debug!(action = %self.id, %target, "target is down, action skipped");
            return;
        }

        {
            let mut ctx = engine.turn_context();
            match &self.kind {
                ActionKind::Attack(attack) => attack.resolve(self, source, target, &mut ctx),
                ActionKind::Item(item) => item.resolve(self, source, target, &mut ctx),
            }
        }

        if let Some(effect) = &self.presentation {
            let engine: &BattleEngine = engine;
            effect
                .play(engine.combatant(source), engine.combatant(target), engine)
                .await;
        }
    }
}
