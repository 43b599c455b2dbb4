//! Error types surfaced to callers driving a battle

use crate::types::Side;
use thiserror::Error;

pub use crate::config::ConfigError;

/// Misuse of a [`BattleSequence`](crate::sequence::BattleSequence)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BattleError {
    #[error("action `{action}` requires target selection but no target selector is installed")]
    MissingTargetSelector { action: String },
    #[error("target selector chose side {chosen}, which is not a valid target for `{action}`")]
    InvalidTarget { action: String, chosen: Side },
    #[error("combatant on side {side} has no action `{action}`")]
    UnknownAction { side: Side, action: String },
    #[error("battle has already been started")]
    AlreadyStarted,
    #[error("battle was dropped before an outcome was published")]
    OutcomeDropped,
}
