//! Adventure completion rules.
//!
//! An adventure is complete once the party has worked through enough
//! encounters, puzzles, discoveries and side quests for the campaign's
//! difficulty tier. Thresholds are static per tier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Named preset controlling how much content makes up a complete adventure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Deadly,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Deadly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Deadly => "deadly",
        }
    }

    pub fn requirements(&self) -> AdventureCounts {
        match self {
            Self::Easy => AdventureCounts {
                combat_encounters: 2,
                trap_encounters: 1,
                treasure_encounters: 1,
                puzzles_solved: 1,
                discoveries: 2,
                subquests_completed: 0,
            },
            Self::Medium => AdventureCounts {
                combat_encounters: 3,
                trap_encounters: 1,
                treasure_encounters: 2,
                puzzles_solved: 1,
                discoveries: 3,
                subquests_completed: 1,
            },
            Self::Hard => AdventureCounts {
                combat_encounters: 4,
                trap_encounters: 2,
                treasure_encounters: 2,
                puzzles_solved: 2,
                discoveries: 4,
                subquests_completed: 2,
            },
            Self::Deadly => AdventureCounts {
                combat_encounters: 6,
                trap_encounters: 3,
                treasure_encounters: 3,
                puzzles_solved: 3,
                discoveries: 5,
                subquests_completed: 3,
            },
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" | "normal" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            "deadly" => Ok(Self::Deadly),
            other => Err(DomainError::parse(format!("Unknown difficulty: {}", other))),
        }
    }
}

/// Kind of encounter the party can face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncounterType {
    Combat,
    Trap,
    Treasure,
    Puzzle,
    Social,
}

/// One tracked dimension of adventure progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressCounter {
    CombatEncounters,
    TrapEncounters,
    TreasureEncounters,
    PuzzlesSolved,
    Discoveries,
    SubquestsCompleted,
}

impl ProgressCounter {
    pub const ALL: [ProgressCounter; 6] = [
        ProgressCounter::CombatEncounters,
        ProgressCounter::TrapEncounters,
        ProgressCounter::TreasureEncounters,
        ProgressCounter::PuzzlesSolved,
        ProgressCounter::Discoveries,
        ProgressCounter::SubquestsCompleted,
    ];

    /// Counter credited when an encounter of this type is resolved.
    /// Social encounters do not count toward completion.
    pub fn for_encounter(encounter_type: EncounterType) -> Option<Self> {
        match encounter_type {
            EncounterType::Combat => Some(Self::CombatEncounters),
            EncounterType::Trap => Some(Self::TrapEncounters),
            EncounterType::Treasure => Some(Self::TreasureEncounters),
            EncounterType::Puzzle => Some(Self::PuzzlesSolved),
            EncounterType::Social => None,
        }
    }
}

/// Counts per progress dimension. Used for progress, thresholds and the
/// remaining breakdown alike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdventureCounts {
    pub combat_encounters: u32,
    pub trap_encounters: u32,
    pub treasure_encounters: u32,
    pub puzzles_solved: u32,
    pub discoveries: u32,
    pub subquests_completed: u32,
}

impl AdventureCounts {
    pub fn get(&self, counter: ProgressCounter) -> u32 {
        match counter {
            ProgressCounter::CombatEncounters => self.combat_encounters,
            ProgressCounter::TrapEncounters => self.trap_encounters,
            ProgressCounter::TreasureEncounters => self.treasure_encounters,
            ProgressCounter::PuzzlesSolved => self.puzzles_solved,
            ProgressCounter::Discoveries => self.discoveries,
            ProgressCounter::SubquestsCompleted => self.subquests_completed,
        }
    }

    fn slot(&mut self, counter: ProgressCounter) -> &mut u32 {
        match counter {
            ProgressCounter::CombatEncounters => &mut self.combat_encounters,
            ProgressCounter::TrapEncounters => &mut self.trap_encounters,
            ProgressCounter::TreasureEncounters => &mut self.treasure_encounters,
            ProgressCounter::PuzzlesSolved => &mut self.puzzles_solved,
            ProgressCounter::Discoveries => &mut self.discoveries,
            ProgressCounter::SubquestsCompleted => &mut self.subquests_completed,
        }
    }

    pub fn increment(&mut self, counter: ProgressCounter) {
        let slot = self.slot(counter);
        *slot = slot.saturating_add(1);
    }

    pub fn total(&self) -> u32 {
        ProgressCounter::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

/// Progress counters for a campaign's current adventure.
pub type AdventureProgress = AdventureCounts;

/// Result of comparing progress against the difficulty thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdventureCompletion {
    pub difficulty: Difficulty,
    pub is_complete: bool,
    /// 0..=100
    pub percent_complete: u8,
    pub requirements: AdventureCounts,
    pub remaining: AdventureCounts,
}

pub fn check_adventure_completion(
    progress: &AdventureProgress,
    difficulty: Difficulty,
) -> AdventureCompletion {
    let requirements = difficulty.requirements();
    let mut remaining = AdventureCounts::default();
    let mut achieved: u32 = 0;

    for counter in ProgressCounter::ALL {
        let required = requirements.get(counter);
        let capped = progress.get(counter).min(required);
        achieved += capped;
        *remaining.slot(counter) = required - capped;
    }

    let total_required = requirements.total();
    let percent_complete = if total_required == 0 {
        100
    } else {
        let ratio = f64::from(achieved) / f64::from(total_required);
        (ratio * 100.0).round().clamp(0.0, 100.0) as u8
    };

    AdventureCompletion {
        difficulty,
        is_complete: remaining.total() == 0,
        percent_complete,
        requirements,
        remaining,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress_meeting(difficulty: Difficulty) -> AdventureProgress {
        difficulty.requirements()
    }

    #[test]
    fn empty_progress_is_zero_percent() {
        let result = check_adventure_completion(&AdventureProgress::default(), Difficulty::Medium);
        assert!(!result.is_complete);
        assert_eq!(result.percent_complete, 0);
        assert_eq!(result.remaining, Difficulty::Medium.requirements());
    }

    #[test]
    fn complete_exactly_when_every_threshold_met() {
        for difficulty in Difficulty::ALL {
            let progress = progress_meeting(difficulty);
            let result = check_adventure_completion(&progress, difficulty);
            assert!(result.is_complete, "{difficulty} should be complete");
            assert_eq!(result.percent_complete, 100);
            assert_eq!(result.remaining.total(), 0);

            for counter in ProgressCounter::ALL {
                if difficulty.requirements().get(counter) == 0 {
                    continue;
                }
                let mut short = progress;
                *short.slot(counter) -= 1;
                let result = check_adventure_completion(&short, difficulty);
                assert!(!result.is_complete, "{difficulty} short on {counter:?}");
                assert_eq!(result.remaining.get(counter), 1);
            }
        }
    }

    #[test]
    fn excess_progress_is_capped() {
        let progress = AdventureProgress {
            combat_encounters: 50,
            ..Default::default()
        };
        let result = check_adventure_completion(&progress, Difficulty::Medium);
        // 3 of 11 requirements
        assert_eq!(result.percent_complete, 27);
        assert!(!result.is_complete);
        assert_eq!(result.remaining.combat_encounters, 0);
    }

    #[test]
    fn percent_is_rounded_ratio_of_capped_progress() {
        let progress = AdventureProgress {
            combat_encounters: 2,
            trap_encounters: 1,
            discoveries: 1,
            ..Default::default()
        };
        // easy requires 7 total; 4 achieved -> 57.14
        let result = check_adventure_completion(&progress, Difficulty::Easy);
        assert_eq!(result.percent_complete, 57);
    }

    #[test]
    fn easy_tier_needs_no_subquests() {
        let mut progress = progress_meeting(Difficulty::Easy);
        progress.subquests_completed = 0;
        assert!(check_adventure_completion(&progress, Difficulty::Easy).is_complete);
    }

    #[test]
    fn increment_and_encounter_mapping() {
        let mut progress = AdventureProgress::default();
        if let Some(counter) = ProgressCounter::for_encounter(EncounterType::Trap) {
            progress.increment(counter);
        }
        assert_eq!(progress.trap_encounters, 1);
        assert_eq!(ProgressCounter::for_encounter(EncounterType::Social), None);
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!("normal".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert!("impossible".parse::<Difficulty>().is_err());
    }
}
