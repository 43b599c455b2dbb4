//! Caller-supplied async hooks: presentation effects and target selection
//!
//! These are the only places a battle suspends. The core never starts a timer
//! or a task of its own; it awaits whatever future the hook hands back, so any
//! timeout belongs inside the hook.

use crate::action::Action;
use crate::combatant::Combatant;
use crate::engine::BattleEngine;
use crate::types::Side;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An animation, sound or other slow presentation step tied to an action.
///
/// Called after the action has changed game state; the returned future must
/// resolve before the turn continues.
#[async_trait]
pub trait PresentationEffect: Send + Sync {
    async fn play(&self, source: &Combatant, target: &Combatant, engine: &BattleEngine);
}

/// Summary of a combatant offered to a [`TargetSelector`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetCandidate {
    pub side: Side,
    pub name: String,
    pub current_hp: i32,
    pub max_hp: i32,
}

impl TargetCandidate {
    pub fn new(side: Side, combatant: &Combatant) -> Self {
        TargetCandidate {
            side,
            name: combatant.name().to_string(),
            current_hp: combatant.current_hp(),
            max_hp: combatant.max_hp(),
        }
    }
}

/// Picks a target for actions that require selection, typically by asking a human.
///
/// Must return the side of one of the supplied candidates.
#[async_trait]
pub trait TargetSelector: Send + Sync {
    async fn select_target(&self, action: &Action, candidates: &[TargetCandidate]) -> Side;
}

/// Plain functions and closures work as immediate selectors
#[async_trait]
impl<F> TargetSelector for F
where
    F: Fn(&Action, &[TargetCandidate]) -> Side + Send + Sync,
{
    async fn select_target(&self, action: &Action, candidates: &[TargetCandidate]) -> Side {
        self(action, candidates)
    }
}
