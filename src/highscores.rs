//! Session high scores
//!
//! Lives only as long as the page; a reload starts fresh.

use serde::{Deserialize, Serialize};

use crate::sim::state::{Difficulty, GameMode};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    /// Session the score came from
    pub session_id: u32,
}

/// Best score plus a short leaderboard of finished runs
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionScores {
    best: u64,
    pub entries: Vec<HighScoreEntry>,
}

impl SessionScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Best score seen so far (live score included)
    pub fn best(&self) -> u64 {
        self.best
    }

    /// Fold a live score into the best. Returns true if it is a new best.
    pub fn observe(&mut self, score: u64) -> bool {
        if score > self.best {
            self.best = score;
            true
        } else {
            false
        }
    }

    /// Nonzero and either the board has room or it beats the last entry
    pub fn qualifies(&self, score: u64) -> bool {
        score > 0
            && (self.entries.len() < MAX_HIGH_SCORES
                || self.entries.last().is_none_or(|last| score > last.score))
    }

    /// Fold a finished run into the board. Returns its 1-based rank, or None
    /// when it did not make the board.
    pub fn record_run(&mut self, entry: HighScoreEntry) -> Option<usize> {
        self.observe(entry.score);
        if !self.qualifies(entry.score) {
            return None;
        }
        // Descending; ties keep arrival order
        let index = self
            .entries
            .partition_point(|existing| existing.score >= entry.score);
        self.entries.insert(index, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(index + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best finished run on the board
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|entry| entry.score)
    }
}
