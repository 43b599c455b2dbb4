//! battle_core - Turn-based combat between two combatants
//!
//! This library provides:
//! - Combatant: HP, stats, actions and status effects of one fighter
//! - Action: attacks and items (poison, burn, freeze, regeneration, mystery)
//! - StatusEffect: timed modifiers with turn-start and turn-end behavior
//! - BattleEngine: the turn pipeline, battle log and outcome channel
//! - BattleSequence: target resolution and outcome delivery for callers
//! - Config: TOML loading for battle settings, the action catalog and combatant templates

pub mod action;
pub mod catalog;
pub mod combatant;
pub mod config;
pub mod effect;
pub mod engine;
pub mod error;
pub mod hooks;
pub mod log;
pub mod prelude;
pub mod sequence;
pub mod stats;
pub mod types;

// Re-export core types for convenience
pub use action::{
    Action, ActionKind, Attack, AttackRange, DamageFormula, Item, ItemEffect, ItemPayload, MysteryBranch,
    MysteryTable, Recipient,
};
pub use catalog::{ActionCatalog, AttackDefinition, ItemDefinition};
pub use combatant::{Combatant, EffectAttachment};
pub use config::{default_action_catalog, default_combatants, BattleConfig, CombatantTemplate, EffectMergePolicy};
pub use effect::{EffectBehavior, EffectRecipe, StatusEffect, TurnRange, TurnStartOutcome, PERMANENT};
pub use engine::{BattleEngine, BattleOutcome, BattleRng, OutcomeReceiver};
pub use error::{BattleError, ConfigError};
pub use hooks::{PresentationEffect, TargetCandidate, TargetSelector};
pub use log::BattleLog;
pub use sequence::{BattleOutcomeHandle, BattleSequence};
pub use stats::{Stat, StatBlock, UnknownStat};
pub use types::{BattlePhase, Side, TargetKind};
