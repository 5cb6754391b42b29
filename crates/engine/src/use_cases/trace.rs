//! CAMLTrace recording.
//!
//! Every campaign has one trace, created lazily on first use. Recording an
//! event appends it under the next sequence number; the repository folds it
//! into the campaign's adventure progress in the same transaction.

use std::sync::Arc;

use everdice_domain::{Campaign, CampaignId, CamlTrace, TraceEvent, TraceEventPayload};

use crate::infrastructure::ports::{CampaignRepo, ClockPort, RepoError, TraceRepo};

#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("Campaign not found: {0}")]
    CampaignNotFound(CampaignId),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

pub struct TraceService {
    trace: Arc<dyn TraceRepo>,
    campaign: Arc<dyn CampaignRepo>,
    clock: Arc<dyn ClockPort>,
}

impl TraceService {
    pub fn new(
        trace: Arc<dyn TraceRepo>,
        campaign: Arc<dyn CampaignRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            trace,
            campaign,
            clock,
        }
    }

    /// The campaign's trace, created if it does not exist yet.
    pub async fn get(&self, campaign_id: CampaignId) -> Result<CamlTrace, TraceError> {
        let campaign = self.load_campaign(campaign_id).await?;
        self.get_or_create(&campaign).await
    }

    pub async fn get_or_create(&self, campaign: &Campaign) -> Result<CamlTrace, TraceError> {
        if let Some(trace) = self.trace.get_for_campaign(campaign.id).await? {
            return Ok(trace);
        }

        let trace = CamlTrace::new(campaign.id, &campaign.title, self.clock.now());
        self.trace.create(&trace).await?;
        tracing::debug!(campaign_id = %campaign.id, trace_id = %trace.trace_id, "Trace created");
        Ok(trace)
    }

    pub async fn record(
        &self,
        campaign_id: CampaignId,
        payload: TraceEventPayload,
    ) -> Result<TraceEvent, TraceError> {
        let campaign = self.load_campaign(campaign_id).await?;
        self.record_for(&campaign, payload).await
    }

    /// Record against an already loaded campaign.
    pub async fn record_for(
        &self,
        campaign: &Campaign,
        payload: TraceEventPayload,
    ) -> Result<TraceEvent, TraceError> {
        let trace = self.get_or_create(campaign).await?;
        let event = self
            .trace
            .append_event(&trace.trace_id, &payload, self.clock.now())
            .await?;

        tracing::debug!(
            campaign_id = %campaign.id,
            event_id = %event.id,
            kind = %payload.kind(),
            "Trace event recorded"
        );
        Ok(event)
    }

    async fn load_campaign(&self, campaign_id: CampaignId) -> Result<Campaign, TraceError> {
        self.campaign
            .get(campaign_id)
            .await?
            .ok_or(TraceError::CampaignNotFound(campaign_id))
    }
}
