//! StatusEffect - A timed modifier attached to one combatant

use super::types::{EffectBehavior, TurnStartOutcome};
use crate::combatant::Combatant;
use crate::log::BattleLog;
use crate::stats::Stat;
use crate::types::Side;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Duration value marking an effect that never expires
pub const PERMANENT: i32 = -1;

/// An effect instance owned by exactly one combatant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    /// Display name; also the merge key when the same effect lands twice
    pub name: String,
    /// Total duration in turns, or [`PERMANENT`]
    pub duration: i32,
    /// Turns left before expiry
    pub remaining_turns: i32,
    /// Flat stat modifiers while active
    #[serde(default)]
    pub modifiers: BTreeMap<Stat, i32>,
    pub behavior: EffectBehavior,
    /// Side of the owning combatant, set when applied
    #[serde(default)]
    owner: Option<Side>,
    #[serde(default)]
    removed: bool,
    /// Landed on its owner during the owner's own turn; skips that turn's end phase
    #[serde(default)]
    fresh: bool,
}

impl StatusEffect {
    pub fn new(name: impl Into<String>, duration: i32, behavior: EffectBehavior) -> Self {
        StatusEffect {
            name: name.into(),
            duration,
            remaining_turns: duration,
            modifiers: BTreeMap::new(),
            behavior,
            owner: None,
            removed: false,
            fresh: false,
        }
    }

    pub fn permanent(name: impl Into<String>, behavior: EffectBehavior) -> Self {
        Self::new(name, PERMANENT, behavior)
    }

    /// Add a stat modifier
    pub fn with_modifier(mut self, stat: Stat, amount: i32) -> Self {
        let slot = self.modifiers.entry(stat).or_insert(0);
        *slot = slot.saturating_add(amount);
        self
    }

    pub fn poison(damage: i32, turns: i32) -> Self {
        Self::new("Poison", turns, EffectBehavior::Poison { damage })
    }

    /// Burn deals damage each turn and lowers DEF while active
    pub fn burn(damage: i32, def_penalty: i32, turns: i32) -> Self {
        let effect = Self::new("Burn", turns, EffectBehavior::Burn { damage });
        if def_penalty != 0 {
            effect.with_modifier(Stat::Def, -def_penalty)
        } else {
            effect
        }
    }

    pub fn freeze(turns: i32) -> Self {
        Self::new("Freeze", turns, EffectBehavior::Freeze)
    }

    pub fn regeneration(heal: i32, turns: i32) -> Self {
        Self::new("Regeneration", turns, EffectBehavior::Regeneration { heal })
    }

    /// Pure stat modifier; `turns` of `None` never expires
    pub fn modifier(name: impl Into<String>, turns: Option<i32>, modifiers: BTreeMap<Stat, i32>) -> Self {
        let mut effect = Self::new(name, turns.unwrap_or(PERMANENT), EffectBehavior::Modifier);
        effect.modifiers = modifiers;
        effect
    }

    pub fn is_permanent(&self) -> bool {
        self.duration < 0
    }

    /// Finite and out of turns
    pub fn is_expired(&self) -> bool {
        !self.is_permanent() && self.remaining_turns <= 0
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Still waiting for its owner's first full turn
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// Hold off the first turn-end tick until the owner's next turn
    pub(crate) fn mark_fresh(&mut self) {
        self.fresh = true;
    }

    pub fn owner(&self) -> Option<Side> {
        self.owner
    }

    /// `base` adjusted by this effect's modifier for `stat`
    pub fn modified_stat(&self, stat: Stat, base: i32) -> i32 {
        base.saturating_add(self.modifiers.get(&stat).copied().unwrap_or(0))
    }

    /// Bind to `owner` and fire the on-apply hook
    pub fn apply(&mut self, owner: &mut Combatant, log: &mut BattleLog) {
        self.owner = owner.side();
        self.removed = false;
        self.behavior.on_apply(&self.name, owner, log);
    }

    pub fn process_turn_start(&mut self, owner: &mut Combatant, log: &mut BattleLog) -> TurnStartOutcome {
        if self.removed {
            return TurnStartOutcome::default();
        }
        self.behavior.on_turn_start(owner, log)
    }

    /// Fire the on-turn-end hook, then count down one turn.
    ///
    /// A fresh effect sits this phase out and only loses its fresh mark. The
    /// owner sweeps expired effects right after this phase.
    pub fn process_turn_end(&mut self, owner: &mut Combatant, log: &mut BattleLog) {
        if self.removed {
            return;
        }
        if self.fresh {
            self.fresh = false;
            return;
        }
        self.behavior.on_turn_end(&self.name, owner, log);
        if !self.is_permanent() {
            self.remaining_turns -= 1;
        }
    }

    /// Fire the on-remove hook and detach from the owner.
    ///
    /// Returns false if the effect was already removed.
    pub fn remove(&mut self, owner: &mut Combatant, log: &mut BattleLog) -> bool {
        if self.removed {
            return false;
        }
        self.removed = true;
        self.behavior.on_remove(&self.name, owner, log);
        self.owner = None;
        true
    }

    /// Extend the countdown for a re-application; never shortens it
    pub fn refresh(&mut self, turns: i32) {
        if self.is_permanent() {
            return;
        }
        if turns < 0 {
            self.duration = PERMANENT;
            self.remaining_turns = PERMANENT;
            return;
        }
        self.remaining_turns = self.remaining_turns.max(turns);
        self.duration = self.duration.max(turns);
    }
}
