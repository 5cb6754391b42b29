//! Character entity - a player character taking part in campaigns

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::AbilityScores;
use crate::{CampaignId, CharacterId};

pub const MAX_LEVEL: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPoints {
    pub current: i32,
    pub max: i32,
}

impl HitPoints {
    pub fn full(max: i32) -> Self {
        Self { current: max, max }
    }

    pub fn is_down(&self) -> bool {
        self.current <= 0
    }
}

/// A player character.
///
/// Plain data record; `validate` checks the ranges the rules allow. A
/// character joins a campaign by having `campaign_id` set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub campaign_id: Option<CampaignId>,
    pub name: String,
    pub race: String,
    pub class: String,
    pub background: Option<String>,
    pub level: u8,
    pub abilities: AbilityScores,
    pub hit_points: HitPoints,
    pub armor_class: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Character {
    pub fn new(
        name: impl Into<String>,
        race: impl Into<String>,
        class: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: CharacterId::new(),
            campaign_id: None,
            name: name.into(),
            race: race.into(),
            class: class.into(),
            background: None,
            level: 1,
            abilities: AbilityScores::default(),
            hit_points: HitPoints::full(10),
            armor_class: 10,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("Character name cannot be empty"));
        }
        if !(1..=MAX_LEVEL).contains(&self.level) {
            return Err(DomainError::validation(format!(
                "Level {} is outside 1..={}",
                self.level, MAX_LEVEL
            )));
        }
        if self.hit_points.max < 1 {
            return Err(DomainError::validation("Maximum HP must be at least 1"));
        }
        if self.hit_points.current > self.hit_points.max {
            return Err(DomainError::validation("Current HP cannot exceed maximum HP"));
        }
        if self.armor_class < 0 {
            return Err(DomainError::validation("Armor class cannot be negative"));
        }
        self.abilities.validate()
    }

    /// Apply damage, never dropping below 0 HP. Returns the HP actually lost.
    pub fn apply_damage(&mut self, amount: u32, now: DateTime<Utc>) -> i32 {
        let before = self.hit_points.current;
        let amount = i32::try_from(amount).unwrap_or(i32::MAX);
        self.hit_points.current = before.saturating_sub(amount).max(0);
        self.updated_at = now;
        before - self.hit_points.current
    }

    /// Heal up to maximum HP. Returns the HP actually restored.
    pub fn heal(&mut self, amount: u32, now: DateTime<Utc>) -> i32 {
        let before = self.hit_points.current;
        let amount = i32::try_from(amount).unwrap_or(i32::MAX);
        self.hit_points.current = before.saturating_add(amount).min(self.hit_points.max);
        self.updated_at = now;
        self.hit_points.current - before
    }

    /// One-line summary used in DM prompts.
    pub fn roster_line(&self) -> String {
        format!(
            "{} ({} {}, level {}, HP {}/{}, AC {})",
            self.name,
            self.race,
            self.class,
            self.level,
            self.hit_points.current,
            self.hit_points.max,
            self.armor_class
        )
    }
}
