//! BattleLog - Ordered record of everything that happened in a battle

use serde::{Deserialize, Serialize};
use tracing::info;

/// Append-only, ordered list of human-readable battle events.
///
/// Every line is mirrored to `tracing` at `info` level so a subscriber sees the
/// same narrative as the log's readers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleLog {
    entries: Vec<String>,
}

impl BattleLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line
    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        info!(target: "battle_core::log", "{}", line);
        self.entries.push(line);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    /// Count lines containing `needle`
    pub fn count_matching(&self, needle: &str) -> usize {
        self.entries.iter().filter(|e| e.contains(needle)).count()
    }

    /// Whether any line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.count_matching(needle) > 0
    }

    /// Only the engine resets the log, when a battle starts
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_preserves_order() {
        let mut log = BattleLog::new();
        log.push("first");
        log.push(String::from("second"));
        log.push(format!("{}", "third"));

        assert_eq!(log.entries(), &["first", "second", "third"]);
        assert_eq!(log.last(), Some("third"));
    }

    #[test]
    fn test_log_matching() {
        let mut log = BattleLog::new();
        log.push("Hero takes 10 damage.");
        log.push("Goblin takes 5 poison damage.");

        assert_eq!(log.count_matching("damage"), 2);
        assert!(log.contains("poison"));
        assert!(!log.contains("wins"));
    }

    #[test]
    fn test_log_clear() {
        let mut log = BattleLog::new();
        log.push("line");
        log.clear();
        assert!(log.is_empty());
    }
}
