//! Character CRUD operations.

use std::sync::Arc;

use everdice_domain::{AbilityScores, CampaignId, Character, CharacterId, HitPoints};
use serde::Deserialize;

use crate::infrastructure::ports::{CampaignRepo, CharacterRepo, ClockPort};

use super::{normalize_optional, ManagementError};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCharacterInput {
    pub name: String,
    pub race: String,
    pub class: String,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub level: Option<u8>,
    #[serde(default)]
    pub abilities: Option<AbilityScores>,
    #[serde(default)]
    pub max_hp: Option<i32>,
    #[serde(default)]
    pub current_hp: Option<i32>,
    #[serde(default)]
    pub armor_class: Option<i32>,
    #[serde(default)]
    pub campaign_id: Option<CampaignId>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateCharacterInput {
    pub name: Option<String>,
    pub race: Option<String>,
    pub class: Option<String>,
    pub background: Option<String>,
    pub level: Option<u8>,
    pub abilities: Option<AbilityScores>,
    pub max_hp: Option<i32>,
    pub current_hp: Option<i32>,
    pub armor_class: Option<i32>,
}

pub struct CharacterCrud {
    character: Arc<dyn CharacterRepo>,
    campaign: Arc<dyn CampaignRepo>,
    clock: Arc<dyn ClockPort>,
}

impl CharacterCrud {
    pub fn new(
        character: Arc<dyn CharacterRepo>,
        campaign: Arc<dyn CampaignRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            character,
            campaign,
            clock,
        }
    }

    pub async fn list(&self) -> Result<Vec<Character>, ManagementError> {
        Ok(self.character.list().await?)
    }

    pub async fn get(&self, id: CharacterId) -> Result<Option<Character>, ManagementError> {
        Ok(self.character.get(id).await?)
    }

    pub async fn create(&self, input: CreateCharacterInput) -> Result<Character, ManagementError> {
        if let Some(campaign_id) = input.campaign_id {
            self.require_campaign(campaign_id).await?;
        }

        let now = self.clock.now();
        let mut character = Character::new(
            input.name.trim(),
            input.race.trim(),
            input.class.trim(),
            now,
        );
        character.campaign_id = input.campaign_id;
        character.background = normalize_optional(input.background);
        if let Some(level) = input.level {
            character.level = level;
        }
        if let Some(abilities) = input.abilities {
            character.abilities = abilities;
        }
        if let Some(max) = input.max_hp {
            character.hit_points = HitPoints::full(max);
        }
        if let Some(current) = input.current_hp {
            character.hit_points.current = current;
        }
        if let Some(armor_class) = input.armor_class {
            character.armor_class = armor_class;
        }

        character.validate()?;
        self.character.save(&character).await?;

        tracing::info!(character_id = %character.id, name = %character.name, "Character created");
        Ok(character)
    }

    pub async fn update(
        &self,
        id: CharacterId,
        input: UpdateCharacterInput,
    ) -> Result<Character, ManagementError> {
        let mut character = self
            .character
            .get(id)
            .await?
            .ok_or_else(|| ManagementError::not_found("Character", id))?;

        if let Some(name) = input.name {
            character.name = name.trim().to_string();
        }
        if let Some(race) = input.race {
            character.race = race.trim().to_string();
        }
        if let Some(class) = input.class {
            character.class = class.trim().to_string();
        }
        if input.background.is_some() {
            character.background = normalize_optional(input.background);
        }
        if let Some(level) = input.level {
            character.level = level;
        }
        if let Some(abilities) = input.abilities {
            character.abilities = abilities;
        }
        if let Some(max) = input.max_hp {
            character.hit_points.max = max;
            character.hit_points.current = character.hit_points.current.min(max);
        }
        if let Some(current) = input.current_hp {
            character.hit_points.current = current;
        }
        if let Some(armor_class) = input.armor_class {
            character.armor_class = armor_class;
        }
        character.updated_at = self.clock.now();

        character.validate()?;
        self.character.save(&character).await?;
        Ok(character)
    }

    pub async fn delete(&self, id: CharacterId) -> Result<(), ManagementError> {
        self.character.delete(id).await?;
        Ok(())
    }

    /// Move a character into a campaign, replacing any previous membership.
    pub async fn join_campaign(
        &self,
        campaign_id: CampaignId,
        character_id: CharacterId,
    ) -> Result<Character, ManagementError> {
        self.require_campaign(campaign_id).await?;

        let mut character = self
            .character
            .get(character_id)
            .await?
            .ok_or_else(|| ManagementError::not_found("Character", character_id))?;

        if character.campaign_id == Some(campaign_id) {
            return Ok(character);
        }

        character.campaign_id = Some(campaign_id);
        character.updated_at = self.clock.now();
        self.character.save(&character).await?;

        tracing::info!(
            character_id = %character_id,
            campaign_id = %campaign_id,
            "Character joined campaign"
        );
        Ok(character)
    }

    pub async fn list_in_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<Character>, ManagementError> {
        self.require_campaign(campaign_id).await?;
        Ok(self.character.list_in_campaign(campaign_id).await?)
    }

    async fn require_campaign(&self, campaign_id: CampaignId) -> Result<(), ManagementError> {
        match self.campaign.get(campaign_id).await? {
            Some(_) => Ok(()),
            None => Err(ManagementError::not_found("Campaign", campaign_id)),
        }
    }
}
