//! Prelude module for convenient imports
//!
//! ```rust
//! use battle_core::prelude::*;
//! ```

// Core types
pub use crate::stats::{Stat, StatBlock};
pub use crate::types::{BattlePhase, Side, TargetKind};

// Combatants and effects
pub use crate::combatant::Combatant;
pub use crate::effect::{EffectRecipe, StatusEffect, TurnRange};

// Actions
pub use crate::action::{
    Action, Attack, DamageFormula, Item, ItemEffect, ItemPayload, MysteryBranch, MysteryTable, Recipient,
};
pub use crate::catalog::ActionCatalog;

// Battle
pub use crate::engine::{BattleEngine, BattleOutcome};
pub use crate::error::BattleError;
pub use crate::hooks::{PresentationEffect, TargetCandidate, TargetSelector};
pub use crate::log::BattleLog;
pub use crate::sequence::{BattleOutcomeHandle, BattleSequence};

// Config
pub use crate::config::{default_action_catalog, default_combatants, BattleConfig, EffectMergePolicy};
