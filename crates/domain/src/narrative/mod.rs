//! Narrative helpers for the AI Dungeon Master: prompt assembly and
//! stalling detection.

mod prompt;
mod stalling;

pub use prompt::{
    build_enhanced_prompt, build_system_prompt, build_user_prompt, EnhancedPrompt,
    NarrativeContext, MAX_PREVIOUS_NARRATIVE_CHARS,
};
pub use stalling::{
    check_for_stalling, split_segments, StallingReport, StallingTrigger, STALLING_PHRASE,
    STALLING_RATIO_THRESHOLD,
};
