//! Value objects - immutable data without identity

mod abilities;
mod dice;

pub use abilities::{
    ability_modifier, format_modifier, parse_modifier, proficiency_bonus, Ability,
    AbilityScores, MAX_ABILITY_SCORE, MIN_ABILITY_SCORE,
};
pub use dice::{DiceFormula, DiceParseError, DiceRollResult};
