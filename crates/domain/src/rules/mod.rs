//! Static rules data: skills, conditions and adventure difficulty tables.

mod adventure;
mod conditions;
mod skills;

pub use adventure::{
    check_adventure_completion, AdventureCompletion, AdventureCounts, AdventureProgress,
    Difficulty, EncounterType, ProgressCounter,
};
pub use conditions::{find_condition, ConditionDefinition, CONDITIONS};
pub use skills::{find_skill, skill_bonus, SkillDefinition, SKILLS};
