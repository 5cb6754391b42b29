//! Adventure progress and completion.

use std::sync::Arc;

use everdice_domain::{
    check_adventure_completion, AdventureCompletion, AdventureProgress, Campaign, CampaignId,
};
use serde::Serialize;

use crate::infrastructure::ports::{AdventureRepo, CampaignRepo};
use crate::use_cases::management::ManagementError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdventureStatus {
    pub campaign_id: CampaignId,
    pub progress: AdventureProgress,
    pub completion: AdventureCompletion,
}

pub struct AdventureOps {
    adventure: Arc<dyn AdventureRepo>,
    campaign: Arc<dyn CampaignRepo>,
}

impl AdventureOps {
    pub fn new(adventure: Arc<dyn AdventureRepo>, campaign: Arc<dyn CampaignRepo>) -> Self {
        Self {
            adventure,
            campaign,
        }
    }

    /// Current counters scored against the campaign's difficulty. A campaign
    /// with no recorded progress starts from zero.
    pub async fn status(&self, campaign_id: CampaignId) -> Result<AdventureStatus, ManagementError> {
        let campaign = self.load_campaign(campaign_id).await?;
        let progress = self
            .adventure
            .get_progress(campaign_id)
            .await?
            .unwrap_or_default();
        Ok(score(&campaign, progress))
    }

    /// Overwrite the counters, for DM corrections.
    pub async fn set_progress(
        &self,
        campaign_id: CampaignId,
        progress: AdventureProgress,
    ) -> Result<AdventureStatus, ManagementError> {
        let campaign = self.load_campaign(campaign_id).await?;
        self.adventure.save_progress(campaign_id, &progress).await?;
        Ok(score(&campaign, progress))
    }

    async fn load_campaign(&self, campaign_id: CampaignId) -> Result<Campaign, ManagementError> {
        self.campaign
            .get(campaign_id)
            .await?
            .ok_or_else(|| ManagementError::not_found("Campaign", campaign_id))
    }
}

fn score(campaign: &Campaign, progress: AdventureProgress) -> AdventureStatus {
    AdventureStatus {
        campaign_id: campaign.id,
        completion: check_adventure_completion(&progress, campaign.difficulty),
        progress,
    }
}
