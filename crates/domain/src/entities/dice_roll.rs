use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::DiceRollResult;
use crate::{CampaignId, CharacterId, DiceRollId};

/// A dice roll made during play, kept so the DM can react to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub id: DiceRollId,
    pub campaign_id: CampaignId,
    pub character_id: Option<CharacterId>,
    /// Denormalized for prompt summaries
    pub character_name: Option<String>,
    pub formula: String,
    pub rolls: Vec<i32>,
    pub modifier: i32,
    pub total: i32,
    /// What the roll was for ("Attack", "Stealth check", ...)
    pub purpose: Option<String>,
    pub rolled_at: DateTime<Utc>,
}

impl DiceRoll {
    pub fn from_result(
        campaign_id: CampaignId,
        result: &DiceRollResult,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: DiceRollId::new(),
            campaign_id,
            character_id: None,
            character_name: None,
            formula: result.formula.to_string(),
            rolls: result.individual_rolls.clone(),
            modifier: result.formula.modifier,
            total: result.total,
            purpose: None,
            rolled_at: now,
        }
    }

    /// "Thorin rolled 1d20+5 for Attack: 19"
    pub fn summary(&self) -> String {
        let who = self.character_name.as_deref().unwrap_or("The party");
        match self.purpose.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            Some(purpose) => format!(
                "{} rolled {} for {}: {}",
                who, self.formula, purpose, self.total
            ),
            None => format!("{} rolled {}: {}", who, self.formula, self.total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::DiceFormula;

    #[test]
    fn summary_with_and_without_purpose() {
        let result = DiceFormula::parse("1d20+5").unwrap().roll_with(|_, _| 14);
        let mut roll = DiceRoll::from_result(CampaignId::new(), &result, Utc::now());
        assert_eq!(roll.summary(), "The party rolled 1d20+5: 19");

        roll.character_name = Some("Thorin".into());
        roll.purpose = Some("Attack".into());
        assert_eq!(roll.summary(), "Thorin rolled 1d20+5 for Attack: 19");
    }
}
