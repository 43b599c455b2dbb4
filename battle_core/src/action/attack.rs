//! Attack - Direct damage from source to target

use super::Action;
use crate::combatant::Combatant;
use crate::engine::TurnContext;
use crate::stats::Stat;
use crate::types::Side;
use serde::{Deserialize, Serialize};

/// How an attack turns its power into damage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageFormula {
    /// Damage is exactly the power
    #[default]
    Fixed,
    /// power - target DEF
    PowerVsDefense,
    /// source ATK + power - target DEF
    AttackVsDefense,
}

/// Delivery of an attack; descriptive only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackRange {
    #[default]
    Melee,
    Ranged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attack {
    pub power: i32,
    #[serde(default)]
    pub formula: DamageFormula,
    #[serde(default)]
    pub range: AttackRange,
}

impl Attack {
    pub fn new(power: i32, formula: DamageFormula) -> Self {
        Attack {
            power,
            formula,
            range: AttackRange::Melee,
        }
    }

    pub fn fixed(power: i32) -> Self {
        Self::new(power, DamageFormula::Fixed)
    }

    pub fn with_range(mut self, range: AttackRange) -> Self {
        self.range = range;
        self
    }

    /// Damage before the minimum-damage floor; saturates at the `i32` bounds
    pub fn raw_damage(&self, attacker: &Combatant, defender: &Combatant) -> i32 {
        match self.formula {
            DamageFormula::Fixed => self.power,
            DamageFormula::PowerVsDefense => self.power.saturating_sub(defender.stat(Stat::Def)),
            DamageFormula::AttackVsDefense => attacker
                .stat(Stat::Atk)
                .saturating_add(self.power)
                .saturating_sub(defender.stat(Stat::Def)),
        }
    }

    /// Damage after flooring at `min_damage` (itself never below zero)
    pub fn damage(&self, attacker: &Combatant, defender: &Combatant, min_damage: i32) -> i32 {
        self.raw_damage(attacker, defender).max(min_damage.max(0))
    }

    pub(crate) fn resolve(&self, action: &Action, source: Side, target: Side, ctx: &mut TurnContext<'_>) {
        let damage = self.damage(
            ctx.combatant(source),
            ctx.combatant(target),
            ctx.config.min_damage,
        );
        let attacker = ctx.combatant(source).name().to_string();

        let defender = ctx.combatant_mut(target);
        let dealt = defender.take_damage(damage);
        let hit = format!(
            "{} uses {} on {} for {} damage.",
            attacker,
            action.name,
            defender.name(),
            dealt
        );
        let defeat = (!defender.is_alive()).then(|| format!("{} was defeated!", defender.name()));

        ctx.log.push(hit);
        if let Some(line) = defeat {
            ctx.log.push(line);
        }
    }
}
