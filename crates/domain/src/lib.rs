//! Everdice domain: entity records, rules data, the narrative prompt builder,
//! the CAMLTrace event schema and adventure scoring.
//!
//! Everything here is pure: no I/O, no clocks, no randomness. Callers inject
//! the current time and dice sources.

pub mod entities;
pub mod error;
pub mod ids;
pub mod narrative;
pub mod rules;
pub mod trace;
pub mod value_objects;

pub use entities::{
    Campaign, Character, DiceRoll, Encounter, HitPoints, InventoryItem, Location, Monster, Npc,
    Quest, QuestStatus, Reward, Session, ToolkitEntry, ToolkitKind, ToolkitRecord, MAX_LEVEL,
};

pub use error::DomainError;

pub use ids::{CampaignId, CharacterId, DiceRollId, SessionId, ToolkitId};

pub use narrative::{
    build_enhanced_prompt, check_for_stalling, EnhancedPrompt, NarrativeContext, StallingReport,
    StallingTrigger,
};

pub use rules::{
    check_adventure_completion, AdventureCompletion, AdventureCounts, AdventureProgress,
    Difficulty, EncounterType, ProgressCounter,
};

pub use trace::{
    generate_event_id, generate_module_id, generate_trace_id, CamlTrace, EncounterOutcome,
    TraceEvent, TraceEventKind, TraceEventPayload,
};

pub use value_objects::{
    ability_modifier, parse_modifier, proficiency_bonus, Ability, AbilityScores, DiceFormula,
    DiceParseError, DiceRollResult,
};
