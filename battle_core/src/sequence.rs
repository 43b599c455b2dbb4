//! BattleSequence - Caller-facing wrapper around the engine
//!
//! The sequence owns one [`BattleEngine`], resolves who an action lands on
//! (asking the [`TargetSelector`] when an action needs a choice) and hands out
//! a [`BattleOutcomeHandle`] that resolves once the battle is decided.

use crate::action::Action;
use crate::combatant::Combatant;
use crate::config::BattleConfig;
use crate::engine::{BattleEngine, BattleOutcome, OutcomeReceiver};
use crate::error::BattleError;
use crate::hooks::TargetSelector;
use crate::log::BattleLog;
use crate::types::{BattlePhase, Side};
use rand::RngCore;
use std::sync::Arc;
use tracing::debug;

pub struct BattleSequence {
    engine: BattleEngine,
    target_selector: Option<Arc<dyn TargetSelector>>,
}

impl BattleSequence {
    pub fn new(a: Combatant, b: Combatant) -> Self {
        BattleSequence {
            engine: BattleEngine::new(a, b),
            target_selector: None,
        }
    }

    pub fn with_config(mut self, config: BattleConfig) -> Self {
        self.engine = self.engine.with_config(config);
        self
    }

    pub fn with_rng<R: RngCore + Send + Sync + 'static>(mut self, rng: R) -> Self {
        self.engine = self.engine.with_rng(rng);
        self
    }

    pub fn with_target_selector(mut self, selector: Arc<dyn TargetSelector>) -> Self {
        self.target_selector = Some(selector);
        self
    }

    /// Start the battle and get a handle to its eventual outcome
    pub fn start(&mut self) -> Result<BattleOutcomeHandle, BattleError> {
        if self.engine.phase() != BattlePhase::Pending {
            return Err(BattleError::AlreadyStarted);
        }

        let receiver = self.engine.subscribe();
        self.engine.start_battle();
        Ok(BattleOutcomeHandle { receiver })
    }

    /// Run one turn of `actor` using `action`.
    ///
    /// Before start or after the end this does nothing and returns `Ok`. For
    /// actions that need a target choice the selector is consulted and
    /// `target` is ignored; otherwise `target` falls back to the action's
    /// default target.
    pub async fn process_turn(
        &mut self,
        actor: Side,
        action: &Action,
        target: Option<Side>,
    ) -> Result<(), BattleError> {
        if !self.engine.is_battle_active() {
            debug!(%actor, action = %action.id, "turn ignored: battle not active");
            return Ok(());
        }
        if !self.engine.combatant(actor).is_alive() {
            debug!(%actor, action = %action.id, "turn ignored: actor is down");
            return Ok(());
        }

        let target = if action.requires_target_selection {
            self.select_target(action).await?
        } else {
            target.unwrap_or_else(|| action.default_target.resolve(actor))
        };

        self.engine.process_turn(actor, Some(action), target).await;
        Ok(())
    }

    /// Run a turn with one of the actor's own actions, looked up by id
    pub async fn process_turn_by_id(
        &mut self,
        actor: Side,
        action_id: &str,
        target: Option<Side>,
    ) -> Result<(), BattleError> {
        let action = self
            .engine
            .combatant(actor)
            .find_action(action_id)
            .cloned()
            .ok_or_else(|| BattleError::UnknownAction {
                side: actor,
                action: action_id.to_string(),
            })?;
        self.process_turn(actor, &action, target).await
    }

    /// Let `actor` skip its action; its status effects still tick
    pub async fn pass_turn(&mut self, actor: Side) {
        self.engine.process_turn(actor, None, actor.opponent()).await;
    }

    async fn select_target(&self, action: &Action) -> Result<Side, BattleError> {
        let selector = self
            .target_selector
            .clone()
            .ok_or_else(|| BattleError::MissingTargetSelector {
                action: action.name.clone(),
            })?;

        let candidates = self.engine.target_candidates();
        let chosen = selector.select_target(action, &candidates).await;
        if candidates.iter().any(|candidate| candidate.side == chosen) {
            Ok(chosen)
        } else {
            Err(BattleError::InvalidTarget {
                action: action.name.clone(),
                chosen,
            })
        }
    }

    pub fn engine(&self) -> &BattleEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut BattleEngine {
        &mut self.engine
    }

    pub fn log(&self) -> &BattleLog {
        self.engine.log()
    }

    pub fn next_actor(&self) -> Option<Side> {
        self.engine.next_actor()
    }

    pub fn is_finished(&self) -> bool {
        self.engine.phase() == BattlePhase::Ended
    }
}

/// Resolves once with the battle's outcome
#[derive(Debug, Clone)]
pub struct BattleOutcomeHandle {
    receiver: OutcomeReceiver,
}

impl BattleOutcomeHandle {
    /// The outcome if the battle has already ended
    pub fn try_outcome(&self) -> Option<BattleOutcome> {
        self.receiver.borrow().clone()
    }

    /// Wait for the battle to end
    pub async fn outcome(mut self) -> Result<BattleOutcome, BattleError> {
        let published = self
            .receiver
            .wait_for(Option::is_some)
            .await
            .map_err(|_| BattleError::OutcomeDropped)?;
        published.clone().ok_or(BattleError::OutcomeDropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::TargetCandidate;
    use crate::stats::StatBlock;

    fn sequence() -> BattleSequence {
        BattleSequence::new(
            Combatant::new("Hero", 100, StatBlock::new(14, 6, 14)).with_action(Action::attack("strike", "Strike", 10)),
            Combatant::new("Goblin", 80, StatBlock::new(12, 4, 10)).with_action(Action::attack("strike", "Strike", 8)),
        )
    }

    #[test]
    fn test_start_twice_errors() {
        let mut sequence = sequence();
        assert!(sequence.start().is_ok());
        assert_eq!(sequence.start().err(), Some(BattleError::AlreadyStarted));
    }

    #[tokio::test]
    async fn test_turn_before_start_is_ok_noop() {
        let mut sequence = sequence();
        let strike = Action::attack("strike", "Strike", 10);
        sequence.process_turn(Side::A, &strike, None).await.unwrap();
        assert!(sequence.log().is_empty());
    }

    #[tokio::test]
    async fn test_default_target_is_opponent() {
        let mut sequence = sequence();
        sequence.start().unwrap();
        sequence.process_turn_by_id(Side::A, "strike", None).await.unwrap();
        assert_eq!(sequence.engine().combatant(Side::B).current_hp(), 70);
    }

    #[tokio::test]
    async fn test_unknown_action_id() {
        let mut sequence = sequence();
        sequence.start().unwrap();
        let err = sequence.process_turn_by_id(Side::A, "fireball", None).await.unwrap_err();
        assert!(matches!(err, BattleError::UnknownAction { side: Side::A, .. }));
    }

    #[tokio::test]
    async fn test_missing_selector() {
        let mut sequence = sequence();
        sequence.start().unwrap();
        let aimed = Action::attack("aimed", "Aimed Shot", 5).with_target_selection(true);
        let err = sequence.process_turn(Side::A, &aimed, Some(Side::B)).await.unwrap_err();
        assert!(matches!(err, BattleError::MissingTargetSelector { .. }));
        assert_eq!(sequence.engine().turns_taken(), 0);
    }

    #[tokio::test]
    async fn test_selector_choice_is_used() {
        let selector = |_: &Action, candidates: &[TargetCandidate]| {
            candidates.iter().find(|c| c.name == "Hero").map(|c| c.side).unwrap_or(Side::B)
        };
        let mut sequence = sequence().with_target_selector(Arc::new(selector));
        sequence.start().unwrap();

        let aimed = Action::attack("aimed", "Aimed Shot", 5).with_target_selection(true);
        sequence.process_turn(Side::A, &aimed, Some(Side::B)).await.unwrap();
        assert_eq!(sequence.engine().combatant(Side::A).current_hp(), 95);
        assert_eq!(sequence.engine().combatant(Side::B).current_hp(), 80);
    }

    #[tokio::test]
    async fn test_outcome_handle_resolves() {
        let mut sequence = sequence();
        let handle = sequence.start().unwrap();
        assert!(handle.try_outcome().is_none());

        let finisher = Action::attack("finisher", "Finisher", 500);
        sequence.process_turn(Side::A, &finisher, None).await.unwrap();
        assert!(sequence.is_finished());

        let outcome = handle.outcome().await.unwrap();
        assert_eq!(outcome.loser_side, Side::B);
    }

    #[tokio::test]
    async fn test_dropped_battle_reports_error() {
        let mut sequence = sequence();
        let handle = sequence.start().unwrap();
        drop(sequence);
        assert_eq!(handle.outcome().await.err(), Some(BattleError::OutcomeDropped));
    }
}
