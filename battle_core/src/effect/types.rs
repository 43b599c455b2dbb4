//! Status effect definitions: behaviors, durations and recipes

use super::StatusEffect;
use crate::combatant::Combatant;
use crate::log::BattleLog;
use crate::stats::Stat;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// What an effect does at each point of its lifecycle.
///
/// Each variant carries only data; the hook methods below are the behavior
/// table, so effects stay serializable and can be exercised without an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectBehavior {
    /// Damage at the end of each of the owner's turns
    Poison { damage: i32 },
    /// Damage at the end of each turn; usually paired with a DEF modifier
    Burn { damage: i32 },
    /// Healing at the end of each turn
    Regeneration { heal: i32 },
    /// Owner cannot act while this is active
    Freeze,
    /// Stat modifiers only
    Modifier,
}

/// Result of the turn-start hooks of one or more effects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnStartOutcome {
    /// An effect asked for the owner's action to be skipped this turn
    pub prevents_action: bool,
}

impl TurnStartOutcome {
    pub fn merge(self, other: TurnStartOutcome) -> TurnStartOutcome {
        TurnStartOutcome {
            prevents_action: self.prevents_action || other.prevents_action,
        }
    }
}

impl EffectBehavior {
    pub fn on_apply(&self, effect_name: &str, owner: &mut Combatant, log: &mut BattleLog) {
        let line = match self {
            EffectBehavior::Poison { .. } => format!("{} is poisoned!", owner.name()),
            EffectBehavior::Burn { .. } => format!("{} is burned!", owner.name()),
            EffectBehavior::Regeneration { .. } => format!("{} begins to regenerate.", owner.name()),
            EffectBehavior::Freeze => format!("{} is frozen solid!", owner.name()),
            EffectBehavior::Modifier => format!("{} is affected by {}.", owner.name(), effect_name),
        };
        log.push(line);
    }

    pub fn on_turn_start(&self, _owner: &mut Combatant, _log: &mut BattleLog) -> TurnStartOutcome {
        match self {
            EffectBehavior::Freeze => TurnStartOutcome {
                prevents_action: true,
            },
            _ => TurnStartOutcome::default(),
        }
    }

    pub fn on_turn_end(&self, effect_name: &str, owner: &mut Combatant, log: &mut BattleLog) {
        // Nothing ticks on a combatant that is already down
        if !owner.is_alive() {
            return;
        }

        match self {
            EffectBehavior::Poison { damage } | EffectBehavior::Burn { damage } => {
                let dealt = owner.take_damage(*damage);
                log.push(format!(
                    "{} takes {} damage from {}.",
                    owner.name(),
                    dealt,
                    effect_name
                ));
                if !owner.is_alive() {
                    log.push(format!("{} was defeated!", owner.name()));
                }
            }
            EffectBehavior::Regeneration { heal } => {
                let healed = owner.heal(*heal);
                if healed > 0 {
                    log.push(format!("{} regenerates {} HP.", owner.name(), healed));
                }
            }
            EffectBehavior::Freeze | EffectBehavior::Modifier => {}
        }
    }

    pub fn on_remove(&self, effect_name: &str, owner: &mut Combatant, log: &mut BattleLog) {
        let line = match self {
            EffectBehavior::Freeze => format!("{} is no longer frozen.", owner.name()),
            _ => format!("{}'s {} wore off.", owner.name(), effect_name),
        };
        log.push(line);
    }
}

/// Inclusive range of turns an effect lasts, rolled when the effect is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRange {
    pub min: i32,
    pub max: i32,
}

impl TurnRange {
    pub fn new(min: i32, max: i32) -> Self {
        TurnRange { min, max }
    }

    pub fn fixed(turns: i32) -> Self {
        TurnRange {
            min: turns,
            max: turns,
        }
    }

    /// Draw a duration from the range
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        if self.min >= self.max {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }

    pub fn contains(&self, turns: i32) -> bool {
        (self.min..=self.max).contains(&turns)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.min < 1 {
            return Err(format!("turn range minimum must be at least 1, got {}", self.min));
        }
        if self.max < self.min {
            return Err(format!(
                "turn range maximum {} is below minimum {}",
                self.max, self.min
            ));
        }
        Ok(())
    }
}

fn default_burn_def_penalty() -> i32 {
    2
}

/// Data description of a status effect that an item or mystery branch creates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectRecipe {
    Poison {
        damage: i32,
        turns: TurnRange,
    },
    Burn {
        damage: i32,
        #[serde(default = "default_burn_def_penalty")]
        def_penalty: i32,
        turns: TurnRange,
    },
    Freeze {
        turns: TurnRange,
    },
    Regeneration {
        heal: i32,
        turns: TurnRange,
    },
    /// Pure stat modifiers; permanent when `turns` is absent
    Modifier {
        name: String,
        #[serde(default)]
        turns: Option<TurnRange>,
        modifiers: BTreeMap<String, i32>,
    },
}

impl EffectRecipe {
    /// Create the effect, drawing its duration from `rng`
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> StatusEffect {
        match self {
            EffectRecipe::Poison { damage, turns } => StatusEffect::poison(*damage, turns.roll(rng)),
            EffectRecipe::Burn {
                damage,
                def_penalty,
                turns,
            } => StatusEffect::burn(*damage, *def_penalty, turns.roll(rng)),
            EffectRecipe::Freeze { turns } => StatusEffect::freeze(turns.roll(rng)),
            EffectRecipe::Regeneration { heal, turns } => {
                StatusEffect::regeneration(*heal, turns.roll(rng))
            }
            EffectRecipe::Modifier {
                name,
                turns,
                modifiers,
            } => {
                let mut parsed = BTreeMap::new();
                for (stat_name, amount) in modifiers {
                    match stat_name.parse::<Stat>() {
                        Ok(stat) => {
                            let slot = parsed.entry(stat).or_insert(0);
                            *slot = i32::saturating_add(*slot, *amount);
                        }
                        Err(err) => warn!(effect = %name, "{}; modifier ignored", err),
                    }
                }
                StatusEffect::modifier(name.clone(), turns.map(|range| range.roll(rng)), parsed)
            }
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            EffectRecipe::Poison { turns, .. }
            | EffectRecipe::Burn { turns, .. }
            | EffectRecipe::Freeze { turns }
            | EffectRecipe::Regeneration { turns, .. } => turns.validate(),
            EffectRecipe::Modifier { turns, .. } => turns.map_or(Ok(()), |t| t.validate()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatBlock;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn dummy() -> Combatant {
        Combatant::new("Dummy", 50, StatBlock::new(5, 5, 5))
    }

    #[test]
    fn test_turn_range_roll_stays_in_bounds() {
        let range = TurnRange::new(2, 5);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            assert!(range.contains(range.roll(&mut rng)));
        }
    }

    #[test]
    fn test_turn_range_fixed_ignores_rng() {
        let mut rng = StepRng::new(u64::MAX, 1);
        assert_eq!(TurnRange::fixed(3).roll(&mut rng), 3);
    }

    #[test]
    fn test_turn_range_validation() {
        assert!(TurnRange::new(2, 5).validate().is_ok());
        assert!(TurnRange::new(0, 5).validate().is_err());
        assert!(TurnRange::new(4, 2).validate().is_err());
    }

    #[test]
    fn test_poison_ticks_until_down() {
        let mut target = dummy();
        let mut log = BattleLog::new();
        let poison = EffectBehavior::Poison { damage: 30 };

        poison.on_turn_end("Poison", &mut target, &mut log);
        poison.on_turn_end("Poison", &mut target, &mut log);
        assert_eq!(target.current_hp(), 0);
        assert!(log.contains("was defeated"));

        // A downed combatant takes no further ticks
        let lines = log.len();
        poison.on_turn_end("Poison", &mut target, &mut log);
        assert_eq!(log.len(), lines);
    }

    #[test]
    fn test_regeneration_logs_actual_heal() {
        let mut target = dummy();
        target.take_damage(4);
        let mut log = BattleLog::new();

        EffectBehavior::Regeneration { heal: 10 }.on_turn_end("Regeneration", &mut target, &mut log);
        assert_eq!(target.current_hp(), 50);
        assert_eq!(log.last(), Some("Dummy regenerates 4 HP."));

        // Already at full health: nothing changed, nothing logged
        EffectBehavior::Regeneration { heal: 10 }.on_turn_end("Regeneration", &mut target, &mut log);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_freeze_prevents_action() {
        let mut target = dummy();
        let mut log = BattleLog::new();
        let outcome = EffectBehavior::Freeze.on_turn_start(&mut target, &mut log);
        assert!(outcome.prevents_action);
        assert!(!EffectBehavior::Modifier
            .on_turn_start(&mut target, &mut log)
            .prevents_action);
    }

    #[test]
    fn test_modifier_recipe_skips_unknown_stats() {
        let mut modifiers = BTreeMap::new();
        modifiers.insert("ATK".to_string(), 3);
        modifiers.insert("charm".to_string(), 9);
        let recipe = EffectRecipe::Modifier {
            name: "Lucky Break".to_string(),
            turns: Some(TurnRange::fixed(2)),
            modifiers,
        };

        let effect = recipe.build(&mut StepRng::new(0, 0));
        assert_eq!(effect.modifiers.len(), 1);
        assert_eq!(effect.modified_stat(Stat::Atk, 10), 13);
        assert_eq!(effect.remaining_turns, 2);
    }

    #[test]
    fn test_permanent_modifier_recipe() {
        let recipe = EffectRecipe::Modifier {
            name: "Blessing".to_string(),
            turns: None,
            modifiers: BTreeMap::new(),
        };
        assert!(recipe.build(&mut StepRng::new(0, 0)).is_permanent());
    }

    #[test]
    fn test_recipe_toml() {
        let recipe: EffectRecipe =
            toml::from_str("kind = \"burn\"\ndamage = 8\nturns = { min = 2, max = 3 }").unwrap();
        assert_eq!(
            recipe,
            EffectRecipe::Burn {
                damage: 8,
                def_penalty: 2,
                turns: TurnRange::new(2, 3),
            }
        );
    }
}
