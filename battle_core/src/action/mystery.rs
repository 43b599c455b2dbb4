//! Mystery items - Weighted random outcomes, optionally biased by LUCK

use super::Action;
use crate::effect::EffectRecipe;
use crate::engine::TurnContext;
use crate::stats::Stat;
use crate::types::Side;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Who receives a mystery branch's effect, relative to the item's use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recipient {
    #[default]
    Target,
    User,
}

/// One possible outcome of a mystery item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MysteryBranch {
    /// Shown in the log when this branch is drawn
    pub label: String,
    pub weight: f64,
    /// Good for the user; luck shifts weight toward favorable branches
    #[serde(default)]
    pub favorable: bool,
    #[serde(default)]
    pub recipient: Recipient,
    pub effect: EffectRecipe,
}

fn default_luck_bias() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MysteryTable {
    /// Shift weights by the LUCK difference between user and target
    #[serde(default = "default_luck_bias")]
    pub luck_bias: bool,
    pub branches: Vec<MysteryBranch>,
}

impl MysteryTable {
    pub fn new(branches: Vec<MysteryBranch>) -> Self {
        MysteryTable {
            luck_bias: true,
            branches,
        }
    }

    /// Effective branch weights.
    ///
    /// With luck bias on, `luck_difference * luck_weight` is added to favorable
    /// branches and taken from unfavorable ones, floored at zero.
    pub fn weights(&self, luck_difference: i32, luck_weight: f64) -> Vec<f64> {
        let shift = if self.luck_bias {
            f64::from(luck_difference) * luck_weight
        } else {
            0.0
        };

        self.branches
            .iter()
            .map(|branch| {
                let weight = if branch.favorable {
                    branch.weight + shift
                } else {
                    branch.weight - shift
                };
                weight.max(0.0)
            })
            .collect()
    }

    /// Draw a branch; falls back to the first branch when no weight is positive
    pub fn choose<R: Rng + ?Sized>(
        &self,
        luck_difference: i32,
        luck_weight: f64,
        rng: &mut R,
    ) -> Option<&MysteryBranch> {
        if self.branches.is_empty() {
            return None;
        }

        let weights = self.weights(luck_difference, luck_weight);
        let index = match WeightedIndex::new(&weights) {
            Ok(distribution) => distribution.sample(rng),
            Err(err) => {
                debug!(%err, "no drawable mystery weights, using first branch");
                0
            }
        };
        self.branches.get(index)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.branches.is_empty() {
            return Err("mystery table has no branches".to_string());
        }
        for branch in &self.branches {
            if !branch.weight.is_finite() || branch.weight < 0.0 {
                return Err(format!(
                    "mystery branch `{}` has invalid weight {}",
                    branch.label, branch.weight
                ));
            }
            branch
                .effect
                .validate()
                .map_err(|err| format!("mystery branch `{}`: {}", branch.label, err))?;
        }
        Ok(())
    }

    pub(crate) fn resolve(&self, action: &Action, source: Side, target: Side, ctx: &mut TurnContext<'_>) {
        let luck_difference = ctx
            .combatant(source)
            .stat(Stat::Luck)
            .saturating_sub(ctx.combatant(target).stat(Stat::Luck));
        let luck_weight = ctx.config.luck_weight;

        let Some(branch) = self.choose(luck_difference, luck_weight, &mut *ctx.rng) else {
            warn!(item = %action.id, "mystery item has no outcomes");
            return;
        };

        let recipient = match branch.recipient {
            Recipient::Target => target,
            Recipient::User => source,
        };
        ctx.log.push(format!("The {} swirls... {}!", action.name, branch.label));

        let effect = branch.effect.build(&mut *ctx.rng);
        ctx.attach_effect(recipient, effect);
    }
}
