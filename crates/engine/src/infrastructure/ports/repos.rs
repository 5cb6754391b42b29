//! Repository port traits for database access.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use everdice_domain::{
    AdventureProgress, Campaign, CampaignId, CamlTrace, Character, CharacterId, DiceRoll, Session,
    SessionId, ToolkitId, ToolkitKind, TraceEvent, TraceEventPayload,
};

use super::error::RepoError;
use super::types::StoredToolkitRecord;

// =============================================================================
// Database Ports (one per entity type)
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterRepo: Send + Sync {
    async fn get(&self, id: CharacterId) -> Result<Option<Character>, RepoError>;
    async fn save(&self, character: &Character) -> Result<(), RepoError>;
    async fn delete(&self, id: CharacterId) -> Result<(), RepoError>;
    async fn list(&self) -> Result<Vec<Character>, RepoError>;
    async fn list_in_campaign(&self, campaign_id: CampaignId) -> Result<Vec<Character>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CampaignRepo: Send + Sync {
    async fn get(&self, id: CampaignId) -> Result<Option<Campaign>, RepoError>;
    async fn save(&self, campaign: &Campaign) -> Result<(), RepoError>;
    /// Characters that joined the campaign are released, not deleted.
    async fn delete(&self, id: CampaignId) -> Result<(), RepoError>;
    async fn list(&self) -> Result<Vec<Campaign>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepo: Send + Sync {
    async fn get(&self, id: SessionId) -> Result<Option<Session>, RepoError>;
    async fn save(&self, session: &Session) -> Result<(), RepoError>;
    /// Oldest first.
    async fn list_for_campaign(&self, campaign_id: CampaignId) -> Result<Vec<Session>, RepoError>;
    /// Session with the highest session number.
    async fn latest_for_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Session>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiceRollRepo: Send + Sync {
    async fn save(&self, roll: &DiceRoll) -> Result<(), RepoError>;
    /// Newest first.
    async fn list_recent(
        &self,
        campaign_id: CampaignId,
        limit: u32,
    ) -> Result<Vec<DiceRoll>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ToolkitRepo: Send + Sync {
    async fn get(
        &self,
        kind: ToolkitKind,
        id: ToolkitId,
    ) -> Result<Option<StoredToolkitRecord>, RepoError>;
    async fn save(&self, record: &StoredToolkitRecord) -> Result<(), RepoError>;
    async fn delete(&self, kind: ToolkitKind, id: ToolkitId) -> Result<(), RepoError>;
    /// All records of a kind, optionally narrowed to one campaign. Ordered by name.
    async fn list(
        &self,
        kind: ToolkitKind,
        campaign_id: Option<CampaignId>,
    ) -> Result<Vec<StoredToolkitRecord>, RepoError>;
}

// =============================================================================
// CAMLTrace Storage
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TraceRepo: Send + Sync {
    /// The campaign's trace with all events in sequence order.
    async fn get_for_campaign(&self, campaign_id: CampaignId)
        -> Result<Option<CamlTrace>, RepoError>;

    /// Store a new trace header. A campaign keeps its first trace; creating
    /// again is a no-op.
    async fn create(&self, trace: &CamlTrace) -> Result<(), RepoError>;

    /// Append under the next sequence number and fold the payload into the
    /// owning campaign's adventure progress, both in one write transaction.
    async fn append_event(
        &self,
        trace_id: &str,
        payload: &TraceEventPayload,
        timestamp: DateTime<Utc>,
    ) -> Result<TraceEvent, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdventureRepo: Send + Sync {
    async fn get_progress(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<AdventureProgress>, RepoError>;
    async fn save_progress(
        &self,
        campaign_id: CampaignId,
        progress: &AdventureProgress,
    ) -> Result<(), RepoError>;
}
