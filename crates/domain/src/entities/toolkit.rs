//! DM toolkit records - campaign-scoped prep material a DM keeps at hand
//!
//! Monsters, quests, items, locations, NPCs, encounters and rewards are all
//! simple data records. They share storage and CRUD plumbing through the
//! [`ToolkitEntry`] trait; [`ToolkitKind`] names the collection.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::rules::{Difficulty, EncounterType};
use crate::value_objects::AbilityScores;
use crate::{CampaignId, CharacterId, ToolkitId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolkitKind {
    Monster,
    Quest,
    Item,
    Location,
    Npc,
    Encounter,
    Reward,
}

impl ToolkitKind {
    pub const ALL: [ToolkitKind; 7] = [
        ToolkitKind::Monster,
        ToolkitKind::Quest,
        ToolkitKind::Item,
        ToolkitKind::Location,
        ToolkitKind::Npc,
        ToolkitKind::Encounter,
        ToolkitKind::Reward,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monster => "monster",
            Self::Quest => "quest",
            Self::Item => "item",
            Self::Location => "location",
            Self::Npc => "npc",
            Self::Encounter => "encounter",
            Self::Reward => "reward",
        }
    }

    /// Collection name used in URLs (`/api/dm-toolkit/monsters`).
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Monster => "monsters",
            Self::Quest => "quests",
            Self::Item => "items",
            Self::Location => "locations",
            Self::Npc => "npcs",
            Self::Encounter => "encounters",
            Self::Reward => "rewards",
        }
    }
}

impl fmt::Display for ToolkitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolkitKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s || k.plural() == s)
            .ok_or_else(|| DomainError::parse(format!("Unknown toolkit kind: {}", s)))
    }
}

/// Shared behaviour of every toolkit record type.
pub trait ToolkitEntry:
    Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static
{
    const KIND: ToolkitKind;

    /// Name shown in listings; also stored as a searchable column.
    fn display_name(&self) -> &str;

    fn validate(&self) -> Result<(), DomainError> {
        if self.display_name().trim().is_empty() {
            return Err(DomainError::validation(format!(
                "{} name cannot be empty",
                Self::KIND
            )));
        }
        Ok(())
    }
}

/// A stored toolkit record: identity and ownership plus the typed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolkitRecord<T> {
    pub id: ToolkitId,
    pub campaign_id: CampaignId,
    #[serde(flatten)]
    pub data: T,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<T: ToolkitEntry> ToolkitRecord<T> {
    pub fn new(campaign_id: CampaignId, data: T, now: DateTime<Utc>) -> Self {
        Self {
            id: ToolkitId::new(),
            campaign_id,
            data,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Record types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub name: String,
    #[serde(default)]
    pub monster_type: Option<String>,
    /// Kept as text so fractional ratings ("1/4") survive unchanged
    #[serde(default)]
    pub challenge_rating: Option<String>,
    pub armor_class: i32,
    pub hit_points: i32,
    #[serde(default)]
    pub abilities: Option<AbilityScores>,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ToolkitEntry for Monster {
    const KIND: ToolkitKind = ToolkitKind::Monster;

    fn display_name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("monster name cannot be empty"));
        }
        if self.hit_points < 1 {
            return Err(DomainError::validation("Monster HP must be at least 1"));
        }
        if let Some(abilities) = &self.abilities {
            abilities.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestStatus {
    #[default]
    Active,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: QuestStatus,
    #[serde(default)]
    pub giver: Option<String>,
    #[serde(default)]
    pub objectives: Vec<String>,
    /// Side quests count toward adventure completion
    #[serde(default)]
    pub is_subquest: bool,
}

impl ToolkitEntry for Quest {
    const KIND: ToolkitKind = ToolkitKind::Quest;

    fn display_name(&self) -> &str {
        &self.title
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub weight: Option<f32>,
    #[serde(default)]
    pub value_gp: Option<u32>,
    #[serde(default)]
    pub magical: bool,
    /// Carrying character, if any
    #[serde(default)]
    pub character_id: Option<CharacterId>,
}

fn default_quantity() -> u32 {
    1
}

impl ToolkitEntry for InventoryItem {
    const KIND: ToolkitKind = ToolkitKind::Item;

    fn display_name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("item name cannot be empty"));
        }
        if self.quantity == 0 {
            return Err(DomainError::validation("Item quantity must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub points_of_interest: Vec<String>,
}

impl ToolkitEntry for Location {
    const KIND: ToolkitKind = ToolkitKind::Location;

    fn display_name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    pub name: String,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub disposition: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl ToolkitEntry for Npc {
    const KIND: ToolkitKind = ToolkitKind::Npc;

    fn display_name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    pub name: String,
    pub encounter_type: EncounterType,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub monster_ids: Vec<ToolkitId>,
    #[serde(default)]
    pub resolved: bool,
}

impl ToolkitEntry for Encounter {
    const KIND: ToolkitKind = ToolkitKind::Encounter;

    fn display_name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub gold: u32,
    #[serde(default)]
    pub experience: u32,
    #[serde(default)]
    pub item_names: Vec<String>,
}

impl ToolkitEntry for Reward {
    const KIND: ToolkitKind = ToolkitKind::Reward;

    fn display_name(&self) -> &str {
        &self.name
    }
}
