//! BattleEngine - The turn-sequencing state machine
//!
//! The engine owns both combatants for the duration of one battle and moves
//! through `Pending -> Active -> Ended`. It never chooses actions itself: every
//! turn is driven by a caller invoking [`BattleEngine::process_turn`], which runs
//! the fixed pipeline
//!
//! 1. turn-start status effects of the acting combatant
//! 2. the supplied action, awaited including its presentation hook
//! 3. turn-end status effects (damage over time, expiry)
//! 4. the termination check
//!
//! Turn order is computed once from SPD when the battle starts and is not
//! recomputed when SPD changes later.

use crate::action::Action;
use crate::combatant::{Combatant, EffectAttachment};
use crate::config::BattleConfig;
use crate::effect::StatusEffect;
use crate::hooks::TargetCandidate;
use crate::log::BattleLog;
use crate::stats::Stat;
use crate::types::{BattlePhase, Side};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use tokio::sync::watch;
use tracing::{debug, info};

/// The one-time result of a finished battle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleOutcome {
    pub winner: Combatant,
    pub loser: Combatant,
    /// Slot the loser was originally supplied in
    pub loser_side: Side,
}

impl BattleOutcome {
    pub fn winner_side(&self) -> Side {
        self.loser_side.opponent()
    }
}

/// Receiving end of the outcome channel; any number may exist
pub type OutcomeReceiver = watch::Receiver<Option<BattleOutcome>>;

/// Random source used for effect durations and mystery draws
pub type BattleRng = Box<dyn RngCore + Send + Sync>;

/// Split borrow of the engine handed to actions while they mutate state
pub(crate) struct TurnContext<'a> {
    combatants: &'a mut [Combatant; 2],
    pub(crate) log: &'a mut BattleLog,
    pub(crate) rng: &'a mut (dyn RngCore + Send + Sync),
    pub(crate) config: &'a BattleConfig,
    acting: Option<Side>,
}

impl TurnContext<'_> {
    pub(crate) fn combatant(&self, side: Side) -> &Combatant {
        &self.combatants[side.index()]
    }

    pub(crate) fn combatant_mut(&mut self, side: Side) -> &mut Combatant {
        &mut self.combatants[side.index()]
    }

    /// Attach an effect using the battle's merge policy.
    ///
    /// An effect the acting combatant puts on itself is marked fresh, so its
    /// countdown starts with the actor's next turn rather than this one.
    pub(crate) fn attach_effect(&mut self, side: Side, mut effect: StatusEffect) -> EffectAttachment {
        if self.acting == Some(side) {
            effect.mark_fresh();
        }
        let policy = self.config.merge_policy;
        self.combatants[side.index()].add_status_effect(effect, policy, self.log)
    }
}

pub struct BattleEngine {
    combatants: [Combatant; 2],
    turn_order: Vec<Side>,
    turns_taken: u32,
    /// Side currently inside `process_turn`
    acting: Option<Side>,
    log: BattleLog,
    phase: BattlePhase,
    config: BattleConfig,
    rng: BattleRng,
    outcome: watch::Sender<Option<BattleOutcome>>,
}

impl BattleEngine {
    /// Create a pending battle between `a` and `b` with default config and an entropy-seeded RNG
    pub fn new(mut a: Combatant, mut b: Combatant) -> Self {
        a.set_side(Side::A);
        b.set_side(Side::B);
        let (outcome, _) = watch::channel(None);

        BattleEngine {
            combatants: [a, b],
            turn_order: Vec::new(),
            turns_taken: 0,
            acting: None,
            log: BattleLog::new(),
            phase: BattlePhase::Pending,
            config: BattleConfig::default(),
            rng: Box::new(StdRng::from_entropy()),
            outcome,
        }
    }

    pub fn with_config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_rng<R: RngCore + Send + Sync + 'static>(self, rng: R) -> Self {
        self.with_boxed_rng(Box::new(rng))
    }

    pub fn with_boxed_rng(mut self, rng: BattleRng) -> Self {
        self.rng = rng;
        self
    }

    /// Observe the outcome. Subscribe before starting to be sure not to miss it;
    /// late subscribers still see a published outcome.
    pub fn subscribe(&self) -> OutcomeReceiver {
        self.outcome.subscribe()
    }

    // === Accessors ===

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn is_battle_active(&self) -> bool {
        self.phase == BattlePhase::Active
    }

    pub fn combatant(&self, side: Side) -> &Combatant {
        &self.combatants[side.index()]
    }

    /// Direct access for setup and scripted scenarios between turns
    pub fn combatant_mut(&mut self, side: Side) -> &mut Combatant {
        &mut self.combatants[side.index()]
    }

    pub fn combatants(&self) -> &[Combatant; 2] {
        &self.combatants
    }

    pub fn log(&self) -> &BattleLog {
        &self.log
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// The injected random source, for callers that want draws from the same stream
    pub fn rng(&mut self) -> &mut (dyn RngCore + Send + Sync) {
        &mut *self.rng
    }

    /// Order fixed at battle start; empty before that
    pub fn turn_order(&self) -> &[Side] {
        &self.turn_order
    }

    pub fn turns_taken(&self) -> u32 {
        self.turns_taken
    }

    /// Who should act next when cycling the fixed turn order
    pub fn next_actor(&self) -> Option<Side> {
        if !self.is_battle_active() || self.turn_order.is_empty() {
            return None;
        }
        let index = self.turns_taken as usize % self.turn_order.len();
        self.turn_order.get(index).copied()
    }

    pub fn alive_combatants(&self) -> Vec<Side> {
        Side::both()
            .into_iter()
            .filter(|side| self.combatant(*side).is_alive())
            .collect()
    }

    pub fn target_candidates(&self) -> Vec<TargetCandidate> {
        self.alive_combatants()
            .into_iter()
            .map(|side| TargetCandidate::new(side, self.combatant(side)))
            .collect()
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.outcome.borrow().clone()
    }

    pub(crate) fn turn_context(&mut self) -> TurnContext<'_> {
        TurnContext {
            combatants: &mut self.combatants,
            log: &mut self.log,
            rng: &mut *self.rng,
            config: &self.config,
            acting: self.acting,
        }
    }

    // === State Machine ===

    /// Pending -> Active: reset the log, fix the turn order, announce the battle
    pub fn start_battle(&mut self) {
        if self.phase != BattlePhase::Pending {
            debug!(phase = ?self.phase, "start_battle ignored");
            return;
        }

        self.log.clear();
        self.turns_taken = 0;
        self.turn_order = compute_turn_order(&self.combatants, self.config.tie_breaker);
        self.phase = BattlePhase::Active;

        let [a, b] = &self.combatants;
        let banner = format!("Battle start: {} vs {}!", a.name(), b.name());
        let order = self
            .turn_order
            .iter()
            .map(|side| self.combatant(*side).name())
            .collect::<Vec<_>>()
            .join(", ");
        self.log.push(banner);
        self.log.push(format!("Turn order: {}.", order));

        // A battle can be decided before anyone acts
        self.check_battle_end();
    }

    /// Run one turn for `actor`.
    ///
    /// A no-op when the battle is not active or `actor` is down. With `action`
    /// set to `None` the actor passes but status effects still tick.
    pub async fn process_turn(&mut self, actor: Side, action: Option<&Action>, target: Side) {
        if !self.is_battle_active() {
            debug!(%actor, phase = ?self.phase, "turn ignored: battle not active");
            return;
        }
        if !self.combatant(actor).is_alive() {
            debug!(%actor, "turn ignored: actor is down");
            return;
        }

        self.turns_taken += 1;
        self.acting = Some(actor);
        let name = self.combatant(actor).name().to_string();
        self.log.push(format!("Turn {}: {}'s turn.", self.turns_taken, name));

        let start = self.combatants[actor.index()].process_status_effects_turn_start(&mut self.log);

        if let Some(action) = action {
            if start.prevents_action && self.config.enforce_action_prevention {
                self.log.push(format!("{} cannot act!", name));
            } else {
                action.execute(actor, target, self).await;
            }
        }

        self.combatants[actor.index()].process_status_effects_turn_end(&mut self.log);
        self.check_battle_end();
        self.acting = None;
    }

    /// Active -> Ended once either combatant is down; publishes the outcome once.
    ///
    /// Returns true only on the call that ended the battle. When both are down
    /// the acting combatant wins, since its opponent fell first in the turn
    /// pipeline; outside a turn, side A is treated as the loser.
    pub fn check_battle_end(&mut self) -> bool {
        if !self.is_battle_active() {
            return false;
        }

        let a_down = !self.combatant(Side::A).is_alive();
        let b_down = !self.combatant(Side::B).is_alive();
        let loser_side = match (a_down, b_down) {
            (false, false) => return false,
            (true, false) => Side::A,
            (false, true) => Side::B,
            (true, true) => self.acting.map(Side::opponent).unwrap_or(Side::A),
        };
        let winner_side = loser_side.opponent();

        self.phase = BattlePhase::Ended;
        let winner = self.combatant(winner_side).clone();
        let loser = self.combatant(loser_side).clone();
        self.log.push(format!("{} wins the battle!", winner.name()));
        info!(winner = %winner.name(), loser = %loser.name(), turns = self.turns_taken, "battle ended");

        self.outcome.send_replace(Some(BattleOutcome {
            winner,
            loser,
            loser_side,
        }));
        true
    }
}

/// Faster combatant first; equal SPD goes to `tie_breaker`
fn compute_turn_order(combatants: &[Combatant; 2], tie_breaker: Side) -> Vec<Side> {
    let mut order = vec![tie_breaker, tie_breaker.opponent()];
    order.sort_by_key(|side| Reverse(combatants[side.index()].stat(Stat::Spd)));
    order
}
