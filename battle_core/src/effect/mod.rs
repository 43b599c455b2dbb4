//! Status effects: timed modifiers and behaviors attached to combatants

mod active;
mod types;

pub use active::{StatusEffect, PERMANENT};
pub use types::{EffectBehavior, EffectRecipe, TurnRange, TurnStartOutcome};
