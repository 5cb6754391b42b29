//! Campaign CRUD operations.

use std::sync::Arc;

use everdice_domain::{Campaign, CampaignId, Difficulty};
use serde::Deserialize;

use crate::infrastructure::ports::{CampaignRepo, ClockPort};

use super::{normalize_optional, ManagementError};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaignInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub setting: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub current_location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateCampaignInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub setting: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub current_location: Option<String>,
}

pub struct CampaignCrud {
    campaign: Arc<dyn CampaignRepo>,
    clock: Arc<dyn ClockPort>,
}

impl CampaignCrud {
    pub fn new(campaign: Arc<dyn CampaignRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { campaign, clock }
    }

    pub async fn list(&self) -> Result<Vec<Campaign>, ManagementError> {
        Ok(self.campaign.list().await?)
    }

    pub async fn get(&self, id: CampaignId) -> Result<Option<Campaign>, ManagementError> {
        Ok(self.campaign.get(id).await?)
    }

    pub async fn create(&self, input: CreateCampaignInput) -> Result<Campaign, ManagementError> {
        let mut campaign = Campaign::new(input.title.trim(), self.clock.now());
        campaign.description = normalize_optional(input.description);
        campaign.setting = normalize_optional(input.setting);
        campaign.current_location = normalize_optional(input.current_location);
        if let Some(difficulty) = input.difficulty {
            campaign.difficulty = difficulty;
        }

        campaign.validate()?;
        self.campaign.save(&campaign).await?;

        tracing::info!(
            campaign_id = %campaign.id,
            difficulty = %campaign.difficulty,
            "Campaign created"
        );
        Ok(campaign)
    }

    pub async fn update(
        &self,
        id: CampaignId,
        input: UpdateCampaignInput,
    ) -> Result<Campaign, ManagementError> {
        let mut campaign = self
            .campaign
            .get(id)
            .await?
            .ok_or_else(|| ManagementError::not_found("Campaign", id))?;

        if let Some(title) = input.title {
            campaign.title = title.trim().to_string();
        }
        if input.description.is_some() {
            campaign.description = normalize_optional(input.description);
        }
        if input.setting.is_some() {
            campaign.setting = normalize_optional(input.setting);
        }
        if input.current_location.is_some() {
            campaign.current_location = normalize_optional(input.current_location);
        }
        if let Some(difficulty) = input.difficulty {
            campaign.difficulty = difficulty;
        }
        campaign.updated_at = self.clock.now();

        campaign.validate()?;
        self.campaign.save(&campaign).await?;
        Ok(campaign)
    }

    /// Deleting a campaign drops its sessions, rolls, toolkit and trace;
    /// member characters are kept and released.
    pub async fn delete(&self, id: CampaignId) -> Result<(), ManagementError> {
        self.campaign.delete(id).await?;
        tracing::info!(campaign_id = %id, "Campaign deleted");
        Ok(())
    }
}
