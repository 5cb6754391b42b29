//! Session bookkeeping outside of narration.

use std::sync::Arc;

use everdice_domain::{CampaignId, Session, SessionId};
use serde::Deserialize;

use crate::infrastructure::ports::{CampaignRepo, ClockPort, SessionRepo};
use crate::use_cases::management::{normalize_optional, ManagementError};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateSessionInput {
    pub narrative: String,
    pub location: Option<String>,
    pub hooks: Vec<String>,
}

pub struct SessionOps {
    session: Arc<dyn SessionRepo>,
    campaign: Arc<dyn CampaignRepo>,
    clock: Arc<dyn ClockPort>,
}

impl SessionOps {
    pub fn new(
        session: Arc<dyn SessionRepo>,
        campaign: Arc<dyn CampaignRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            session,
            campaign,
            clock,
        }
    }

    /// Store a session under the next session number for the campaign.
    pub async fn create(
        &self,
        campaign_id: CampaignId,
        input: CreateSessionInput,
    ) -> Result<Session, ManagementError> {
        self.require_campaign(campaign_id).await?;

        let next_number = self
            .session
            .latest_for_campaign(campaign_id)
            .await?
            .map_or(1, |s| s.session_number + 1);

        let mut session = Session::new(campaign_id, next_number, input.narrative, self.clock.now());
        session.location = normalize_optional(input.location);
        session.hooks = input
            .hooks
            .into_iter()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .collect();

        self.session.save(&session).await?;
        Ok(session)
    }

    pub async fn list(&self, campaign_id: CampaignId) -> Result<Vec<Session>, ManagementError> {
        self.require_campaign(campaign_id).await?;
        Ok(self.session.list_for_campaign(campaign_id).await?)
    }

    pub async fn get(&self, id: SessionId) -> Result<Option<Session>, ManagementError> {
        Ok(self.session.get(id).await?)
    }

    async fn require_campaign(&self, campaign_id: CampaignId) -> Result<(), ManagementError> {
        match self.campaign.get(campaign_id).await? {
            Some(_) => Ok(()),
            None => Err(ManagementError::not_found("Campaign", campaign_id)),
        }
    }
}
