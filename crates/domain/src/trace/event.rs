//! Typed gameplay events recorded in a CAMLTrace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::entities::QuestStatus;
use crate::error::DomainError;
use crate::rules::{EncounterType, ProgressCounter};
use crate::{CharacterId, SessionId, ToolkitId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncounterOutcome {
    /// The party prevailed
    Success,
    /// The party got past it without fighting it out (sneaking, talking, ...)
    Avoided,
    Failure,
}

/// Event payload, discriminated by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum TraceEventPayload {
    SessionStarted {
        session_id: SessionId,
        session_number: u32,
    },
    SessionEnded {
        session_id: SessionId,
        #[serde(default)]
        summary: Option<String>,
    },
    EncounterStarted {
        name: String,
        encounter_type: EncounterType,
        #[serde(default)]
        encounter_id: Option<ToolkitId>,
    },
    EncounterResolved {
        name: String,
        encounter_type: EncounterType,
        outcome: EncounterOutcome,
        #[serde(default)]
        encounter_id: Option<ToolkitId>,
    },
    StateChanged {
        entity: String,
        field: String,
        #[serde(default)]
        from: Option<String>,
        to: String,
    },
    DiceRolled {
        #[serde(default)]
        character_id: Option<CharacterId>,
        formula: String,
        rolls: Vec<i32>,
        total: i32,
        #[serde(default)]
        purpose: Option<String>,
    },
    Damage {
        target: String,
        amount: u32,
        #[serde(default)]
        damage_type: Option<String>,
        #[serde(default)]
        source: Option<String>,
    },
    Heal {
        target: String,
        amount: u32,
        #[serde(default)]
        source: Option<String>,
    },
    QuestProgress {
        quest_title: String,
        status: QuestStatus,
        #[serde(default)]
        quest_id: Option<ToolkitId>,
        #[serde(default)]
        is_subquest: bool,
        #[serde(default)]
        note: Option<String>,
    },
    Discovery {
        description: String,
        #[serde(default)]
        is_puzzle: bool,
    },
    Narration {
        #[serde(default)]
        session_id: Option<SessionId>,
        excerpt: String,
        #[serde(default)]
        stalling: bool,
    },
}

/// Event kind without payload, stored alongside each event for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceEventKind {
    SessionStarted,
    SessionEnded,
    EncounterStarted,
    EncounterResolved,
    StateChanged,
    DiceRolled,
    Damage,
    Heal,
    QuestProgress,
    Discovery,
    Narration,
}

impl TraceEventKind {
    pub const ALL: [TraceEventKind; 11] = [
        TraceEventKind::SessionStarted,
        TraceEventKind::SessionEnded,
        TraceEventKind::EncounterStarted,
        TraceEventKind::EncounterResolved,
        TraceEventKind::StateChanged,
        TraceEventKind::DiceRolled,
        TraceEventKind::Damage,
        TraceEventKind::Heal,
        TraceEventKind::QuestProgress,
        TraceEventKind::Discovery,
        TraceEventKind::Narration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SessionStarted => "session_started",
            Self::SessionEnded => "session_ended",
            Self::EncounterStarted => "encounter_started",
            Self::EncounterResolved => "encounter_resolved",
            Self::StateChanged => "state_changed",
            Self::DiceRolled => "dice_rolled",
            Self::Damage => "damage",
            Self::Heal => "heal",
            Self::QuestProgress => "quest_progress",
            Self::Discovery => "discovery",
            Self::Narration => "narration",
        }
    }
}

impl fmt::Display for TraceEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TraceEventKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| DomainError::parse(format!("Unknown trace event kind: {}", s)))
    }
}

impl TraceEventPayload {
    pub fn kind(&self) -> TraceEventKind {
        match self {
            Self::SessionStarted { .. } => TraceEventKind::SessionStarted,
            Self::SessionEnded { .. } => TraceEventKind::SessionEnded,
            Self::EncounterStarted { .. } => TraceEventKind::EncounterStarted,
            Self::EncounterResolved { .. } => TraceEventKind::EncounterResolved,
            Self::StateChanged { .. } => TraceEventKind::StateChanged,
            Self::DiceRolled { .. } => TraceEventKind::DiceRolled,
            Self::Damage { .. } => TraceEventKind::Damage,
            Self::Heal { .. } => TraceEventKind::Heal,
            Self::QuestProgress { .. } => TraceEventKind::QuestProgress,
            Self::Discovery { .. } => TraceEventKind::Discovery,
            Self::Narration { .. } => TraceEventKind::Narration,
        }
    }

    /// Adventure counter this event advances, if any.
    ///
    /// Failed encounters and quests that are not completed side quests do
    /// not count.
    pub fn progress_counter(&self) -> Option<ProgressCounter> {
        match self {
            Self::EncounterResolved {
                encounter_type,
                outcome: EncounterOutcome::Success | EncounterOutcome::Avoided,
                ..
            } => ProgressCounter::for_encounter(*encounter_type),
            Self::Discovery { is_puzzle: true, .. } => Some(ProgressCounter::PuzzlesSolved),
            Self::Discovery { .. } => Some(ProgressCounter::Discoveries),
            Self::QuestProgress {
                status: QuestStatus::Completed,
                is_subquest: true,
                ..
            } => Some(ProgressCounter::SubquestsCompleted),
            _ => None,
        }
    }
}

/// One entry in the append-only log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// `evt.%06d`
    pub id: String,
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub payload: TraceEventPayload,
}
