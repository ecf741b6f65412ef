//! JSON log of every evaluated brain
//!
//! Level 4 - file I/O

use std::path::Path;

use anyhow::{Context, Result};
use morris_core::Brain;
use serde::{Deserialize, Serialize};

use crate::fitness::Outcome;

/// One self-play game of one population member
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub generation: u32,
    /// Raw weights; checked for length only when selected
    pub brain: Vec<f32>,
    pub outcome: Outcome,
    pub plies: u32,
    pub score: f32,
}

/// Which record `BrainLog::select` picks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrainSelector {
    /// Highest score, earliest on ties
    Best,
    /// Most recently appended
    Latest,
    /// Most recent record that won on score
    LastPositive,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BrainLog {
    pub records: Vec<GameRecord>,
}

impl BrainLog {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read brain log: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse brain log: {}", path.display()))
    }

    /// Like [`BrainLog::load`], but a missing or broken file gives an empty log
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no brain log yet, starting fresh");
            return Self::default();
        }
        match Self::load(path) {
            Ok(log) => log,
            Err(err) => {
                tracing::warn!(path = %path.display(), "ignoring unreadable brain log: {:#}", err);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write brain log: {}", path.display()))?;
        Ok(())
    }

    pub fn append(&mut self, record: GameRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last_generation(&self) -> Option<u32> {
        self.records.iter().map(|r| r.generation).max()
    }

    /// Pick a brain; records with a malformed weight vector are skipped
    pub fn select(&self, selector: BrainSelector) -> Option<Brain> {
        let mut valid = self.records.iter().filter_map(|r| match Brain::from_weights(&r.brain) {
            Ok(brain) => Some((brain, r.score)),
            Err(err) => {
                tracing::warn!(generation = r.generation, "skipping brain record: {}", err);
                None
            }
        });
        match selector {
            BrainSelector::Latest => valid.last().map(|(brain, _)| brain),
            BrainSelector::LastPositive => valid.filter(|&(_, score)| score > 0.0).last().map(|(brain, _)| brain),
            BrainSelector::Best => valid
                .fold(None, |best: Option<(Brain, f32)>, (brain, score)| match best {
                    Some((_, best_score)) if best_score >= score => best,
                    _ => Some((brain, score)),
                })
                .map(|(brain, _)| brain),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morris_core::BRAIN_SIZE;
    use std::path::PathBuf;

    fn record(generation: u32, weight: f32, score: f32) -> GameRecord {
        GameRecord {
            generation,
            brain: vec![weight; BRAIN_SIZE],
            outcome: if score > 0.0 { Outcome::Win } else { Outcome::Loss },
            plies: 60,
            score,
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("morris-store-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_select() {
        let mut log = BrainLog::default();
        assert_eq!(log.select(BrainSelector::Best), None);

        log.append(record(1, 1.0, -2.0));
        log.append(record(1, 2.0, 3.0));
        log.append(record(2, 3.0, 5.0));
        log.append(record(2, 4.0, 5.0));
        log.append(GameRecord {
            brain: vec![9.0; 4],
            ..record(3, 0.0, 50.0)
        });
        log.append(record(3, 6.0, -1.0));

        let weight = |b: Option<Brain>| b.map(|b| b.as_array()[0]);
        assert_eq!(weight(log.select(BrainSelector::Best)), Some(3.0));
        // the malformed record scores 50 but is skipped
        assert_eq!(weight(log.select(BrainSelector::LastPositive)), Some(4.0));
        assert_eq!(weight(log.select(BrainSelector::Latest)), Some(6.0));
        assert_eq!(log.last_generation(), Some(3));
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("roundtrip");
        let mut log = BrainLog::default();
        log.append(record(1, 0.5, 2.0));
        log.save(&path).unwrap();

        let loaded = BrainLog::load(&path).unwrap();
        assert_eq!(loaded, log);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_or_broken_file_gives_empty_log() {
        let missing = temp_path("missing");
        assert!(BrainLog::load_or_default(&missing).is_empty());

        let broken = temp_path("broken");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(BrainLog::load(&broken).is_err());
        assert!(BrainLog::load_or_default(&broken).is_empty());
        std::fs::remove_file(&broken).ok();
    }
}
