//! Combatant - A stateful participant in a battle

use crate::action::Action;
use crate::config::EffectMergePolicy;
use crate::effect::{StatusEffect, TurnStartOutcome};
use crate::log::BattleLog;
use crate::stats::{Stat, StatBlock};
use crate::types::Side;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How an incoming status effect was merged into a combatant's active set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectAttachment {
    /// New effect, on-apply fired
    Applied,
    /// Existing effect of the same name had its countdown extended
    Refreshed,
    /// Added alongside an existing effect of the same name
    Stacked,
    /// Dropped because an effect of the same name was already active
    Ignored,
}

/// Complete battle state for one participant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    // === Identity ===
    name: String,
    /// Opaque asset reference for presentation layers
    #[serde(default)]
    sprite: String,

    // === Vitals ===
    current_hp: i32,
    max_hp: i32,

    // === Stats ===
    stats: StatBlock,

    // === Battle State ===
    #[serde(default)]
    available_actions: Vec<Action>,
    #[serde(default)]
    active_effects: Vec<StatusEffect>,
    /// Slot assigned by the engine
    #[serde(skip)]
    side: Option<Side>,
}

impl Combatant {
    /// Create a combatant at full health
    pub fn new(name: impl Into<String>, max_hp: i32, stats: StatBlock) -> Self {
        let max_hp = max_hp.max(0);
        Combatant {
            name: name.into(),
            sprite: String::new(),
            current_hp: max_hp,
            max_hp,
            stats,
            available_actions: Vec::new(),
            active_effects: Vec::new(),
            side: None,
        }
    }

    pub fn with_sprite(mut self, sprite: impl Into<String>) -> Self {
        self.sprite = sprite.into();
        self
    }

    /// Start below full health
    pub fn with_current_hp(mut self, hp: i32) -> Self {
        self.current_hp = hp.clamp(0, self.max_hp);
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.add_action(action);
        self
    }

    pub fn with_actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        for action in actions {
            self.add_action(action);
        }
        self
    }

    // === Identity ===

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sprite(&self) -> &str {
        &self.sprite
    }

    pub fn side(&self) -> Option<Side> {
        self.side
    }

    pub(crate) fn set_side(&mut self, side: Side) {
        self.side = Some(side);
    }

    // === Vitals ===

    pub fn current_hp(&self) -> i32 {
        self.current_hp
    }

    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    /// Lose up to `amount` HP; returns the HP actually lost
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let applied = amount.max(0).min(self.current_hp);
        self.current_hp -= applied;
        applied
    }

    /// Recover up to `amount` HP without exceeding max; returns the HP actually recovered
    pub fn heal(&mut self, amount: i32) -> i32 {
        let applied = amount.max(0).min(self.max_hp - self.current_hp);
        self.current_hp += applied;
        applied
    }

    // === Stats ===

    pub fn base_stats(&self) -> &StatBlock {
        &self.stats
    }

    /// Effective stat: base value plus every active effect's modifier
    pub fn stat(&self, stat: Stat) -> i32 {
        self.active_effects
            .iter()
            .fold(self.stats.get(stat), |value, effect| effect.modified_stat(stat, value))
    }

    /// Permanently change a base stat; returns the new base value
    pub fn modify_stat(&mut self, stat: Stat, delta: i32) -> i32 {
        self.stats.apply_delta(stat, delta)
    }

    // === Actions ===

    pub fn available_actions(&self) -> &[Action] {
        &self.available_actions
    }

    pub fn find_action(&self, id: &str) -> Option<&Action> {
        self.available_actions.iter().find(|a| a.id == id)
    }

    /// Add an action; ids are unique per combatant so duplicates are dropped
    pub fn add_action(&mut self, action: Action) -> bool {
        if self.find_action(&action.id).is_some() {
            warn!(combatant = %self.name, action = %action.id, "duplicate action ignored");
            return false;
        }
        self.available_actions.push(action);
        true
    }

    /// Remove an action by id; removing an absent action is a no-op
    pub fn remove_action(&mut self, id: &str) -> bool {
        match self.available_actions.iter().position(|a| a.id == id) {
            Some(index) => {
                self.available_actions.remove(index);
                true
            }
            None => false,
        }
    }

    // === Status Effects ===

    pub fn active_effects(&self) -> &[StatusEffect] {
        &self.active_effects
    }

    pub fn effect(&self, name: &str) -> Option<&StatusEffect> {
        self.active_effects.iter().find(|e| e.name == name)
    }

    pub fn has_effect(&self, name: &str) -> bool {
        self.effect(name).is_some()
    }

    /// Attach an effect, merging with an existing effect of the same name per `policy`
    pub fn add_status_effect(
        &mut self,
        mut effect: StatusEffect,
        policy: EffectMergePolicy,
        log: &mut BattleLog,
    ) -> EffectAttachment {
        let existing = self.active_effects.iter().position(|e| e.name == effect.name);

        match (existing, policy) {
            (Some(index), EffectMergePolicy::Refresh) => {
                let current = &mut self.active_effects[index];
                let before = current.remaining_turns;
                current.refresh(effect.duration);
                // An extended countdown restarts with the owner's next turn
                if effect.is_fresh() && !current.is_permanent() && current.remaining_turns != before {
                    current.mark_fresh();
                }
                log.push(format!("{}'s {} is refreshed.", self.name, effect.name));
                EffectAttachment::Refreshed
            }
            (Some(_), EffectMergePolicy::Ignore) => {
                log.push(format!(
                    "{} is already affected by {}; it has no effect.",
                    self.name, effect.name
                ));
                EffectAttachment::Ignored
            }
            (existing, _) => {
                effect.apply(self, log);
                self.active_effects.push(effect);
                if existing.is_some() {
                    EffectAttachment::Stacked
                } else {
                    EffectAttachment::Applied
                }
            }
        }
    }

    /// Force-remove the first effect named `name`, firing its on-remove hook
    pub fn remove_status_effect(&mut self, name: &str, log: &mut BattleLog) -> bool {
        let Some(index) = self.active_effects.iter().position(|e| e.name == name) else {
            debug!(combatant = %self.name, effect = name, "no such effect to remove");
            return false;
        };
        let mut effect = self.active_effects.remove(index);
        effect.remove(self, log)
    }

    /// Run every active effect's turn-start hook
    pub fn process_status_effects_turn_start(&mut self, log: &mut BattleLog) -> TurnStartOutcome {
        let mut effects = std::mem::take(&mut self.active_effects);
        let mut outcome = TurnStartOutcome::default();
        for effect in effects.iter_mut() {
            outcome = outcome.merge(effect.process_turn_start(self, log));
        }
        effects.append(&mut self.active_effects);
        self.active_effects = effects;
        outcome
    }

    /// Run every active effect's turn-end hook, then sweep expired effects
    pub fn process_status_effects_turn_end(&mut self, log: &mut BattleLog) {
        let mut effects = std::mem::take(&mut self.active_effects);
        for effect in effects.iter_mut() {
            effect.process_turn_end(self, log);
        }
        effects.append(&mut self.active_effects);

        let (expired, active): (Vec<_>, Vec<_>) =
            effects.into_iter().partition(StatusEffect::is_expired);
        self.active_effects = active;
        for mut effect in expired {
            effect.remove(self, log);
        }
    }
}
