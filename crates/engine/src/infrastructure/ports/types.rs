//! Storage shapes shared between ports and adapters.

use chrono::{DateTime, Utc};
use everdice_domain::{CampaignId, ToolkitId, ToolkitKind};
use serde::{Deserialize, Serialize};

/// A DM toolkit record as storage sees it: the typed payload is kept as JSON
/// so one table serves every kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToolkitRecord {
    pub id: ToolkitId,
    pub kind: ToolkitKind,
    pub campaign_id: CampaignId,
    pub name: String,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
