//! High score leaderboard
//!
//! Persisted to LocalStorage, tracks the top 10 victories. Each entry keeps
//! the metadata string the director submits with the score (the numerals
//! of the weapons claimed during the run).

use serde::{Deserialize, Serialize};

use crate::error::LeaderboardError;
use crate::platform::Leaderboard;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Total XP collected during the run
    pub score: u64,
    /// Claimed weapons, e.g. "I III VII XII"
    pub metadata: String,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "felix_clock_highscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, score: u64, metadata: &str, timestamp: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            score,
            metadata: metadata.to_string(),
            timestamp,
        };

        // Sorted descending by score; ties keep the older entry first
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(scores) = serde_json::from_str::<HighScores>(&json) {
                    log::info!("Loaded {} high scores", scores.entries.len());
                    return scores;
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) -> Result<(), LeaderboardError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| LeaderboardError::Storage("no LocalStorage".into()))?;

        let json = serde_json::to_string(self)
            .map_err(|err| LeaderboardError::Storage(err.to_string()))?;
        storage
            .set_item(Self::STORAGE_KEY, &json)
            .map_err(|err| LeaderboardError::Storage(format!("{err:?}")))?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) -> Result<(), LeaderboardError> {
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

impl Leaderboard for HighScores {
    fn submit(&mut self, score: u64, metadata: &str) -> Result<usize, LeaderboardError> {
        let rank = self
            .add_score(score, metadata, now_ms())
            .ok_or(LeaderboardError::NotRanked { score })?;
        self.save()?;
        log::info!("score {score} placed #{rank}");
        Ok(rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_sorted_and_trimmed() {
        let mut scores = HighScores::new();
        for score in 1..=12 {
            scores.add_score(score * 10, "I", score as f64);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_score(), Some(120));
        assert_eq!(scores.entries.last().map(|e| e.score), Some(30));
        assert!(!scores.qualifies(30));
        assert_eq!(scores.potential_rank(55), Some(7));
    }

    #[test]
    fn test_submit_reports_rank() {
        let mut scores = HighScores::new();
        assert_eq!(scores.submit(300, "I V XII"), Ok(1));
        assert_eq!(scores.submit(500, "II"), Ok(1));
        assert_eq!(scores.submit(100, ""), Ok(3));
        assert_eq!(scores.entries[1].metadata, "I V XII");
    }

    #[test]
    fn test_zero_score_is_rejected() {
        let mut scores = HighScores::new();
        assert_eq!(
            scores.submit(0, ""),
            Err(LeaderboardError::NotRanked { score: 0 })
        );
        assert!(scores.is_empty());
    }
}
