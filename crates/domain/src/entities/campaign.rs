use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::rules::Difficulty;
use crate::CampaignId;

/// A campaign: the shared story a group of characters plays through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub title: String,
    pub description: Option<String>,
    /// Setting or world flavour text ("Forgotten Realms", "post-apocalyptic swamp", ...)
    pub setting: Option<String>,
    pub difficulty: Difficulty,
    pub current_location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    pub fn new(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: CampaignId::new(),
            title: title.into(),
            description: None,
            setting: None,
            difficulty: Difficulty::default(),
            current_location: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("Campaign title cannot be empty"));
        }
        Ok(())
    }
}
