//! Core types shared across the battle simulation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the two battle slots a combatant occupies.
///
/// The side is the combatant's identity for the lifetime of a battle: actions,
/// effects and outcomes refer to combatants by side rather than by reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    #[default]
    A,
    B,
}

impl Side {
    /// Both sides, in slot order
    pub fn both() -> [Side; 2] {
        [Side::A, Side::B]
    }

    /// Slot index (A = 0, B = 1)
    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    /// The other side
    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

/// Who an action lands on when the caller does not name a target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    #[default]
    Opponent,
    User,
}

impl TargetKind {
    /// Resolve to a concrete side relative to the acting combatant
    pub fn resolve(self, actor: Side) -> Side {
        match self {
            TargetKind::Opponent => actor.opponent(),
            TargetKind::User => actor,
        }
    }
}

/// Lifecycle of a battle engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattlePhase {
    #[default]
    Pending,
    Active,
    Ended,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::A.opponent(), Side::B);
        assert_eq!(Side::B.opponent(), Side::A);
        assert_eq!(Side::A.opponent().opponent(), Side::A);
    }

    #[test]
    fn test_side_display() {
        assert_eq!(Side::A.to_string(), "A");
        assert_eq!(Side::B.to_string(), "B");
    }

    #[test]
    fn test_target_kind_resolve() {
        assert_eq!(TargetKind::Opponent.resolve(Side::A), Side::B);
        assert_eq!(TargetKind::User.resolve(Side::B), Side::B);
    }
}
