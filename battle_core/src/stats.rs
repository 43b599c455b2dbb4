//! Combat stats

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A named combat attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Stat {
    Atk,
    Def,
    Spd,
    Luck,
}

impl Stat {
    /// Get all stats
    pub fn all() -> &'static [Stat] {
        &[Stat::Atk, Stat::Def, Stat::Spd, Stat::Luck]
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stat::Atk => "ATK",
            Stat::Def => "DEF",
            Stat::Spd => "SPD",
            Stat::Luck => "LUCK",
        };
        f.write_str(name)
    }
}

/// Raised when data names a stat the simulation does not know
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown stat `{0}`")]
pub struct UnknownStat(pub String);

impl FromStr for Stat {
    type Err = UnknownStat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ATK" | "ATTACK" => Ok(Stat::Atk),
            "DEF" | "DEFENSE" => Ok(Stat::Def),
            "SPD" | "SPEED" => Ok(Stat::Spd),
            "LUCK" | "LCK" => Ok(Stat::Luck),
            _ => Err(UnknownStat(s.to_string())),
        }
    }
}

/// Base stat values of a combatant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    pub atk: i32,
    pub def: i32,
    pub spd: i32,
    #[serde(default)]
    pub luck: i32,
}

impl StatBlock {
    /// Create a stat block with zero luck
    pub fn new(atk: i32, def: i32, spd: i32) -> Self {
        StatBlock {
            atk,
            def,
            spd,
            luck: 0,
        }
    }

    /// Set the luck value
    pub fn with_luck(mut self, luck: i32) -> Self {
        self.luck = luck;
        self
    }

    /// Read a stat
    pub fn get(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Atk => self.atk,
            Stat::Def => self.def,
            Stat::Spd => self.spd,
            Stat::Luck => self.luck,
        }
    }

    fn slot_mut(&mut self, stat: Stat) -> &mut i32 {
        match stat {
            Stat::Atk => &mut self.atk,
            Stat::Def => &mut self.def,
            Stat::Spd => &mut self.spd,
            Stat::Luck => &mut self.luck,
        }
    }

    /// Overwrite a stat
    pub fn set(&mut self, stat: Stat, value: i32) {
        *self.slot_mut(stat) = value;
    }

    /// Add a delta to a stat, returning the new value
    pub fn apply_delta(&mut self, stat: Stat, delta: i32) -> i32 {
        let slot = self.slot_mut(stat);
        *slot = slot.saturating_add(delta);
        *slot
    }
}
