//! Session entity - one chapter of narration within a campaign

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CampaignId, SessionId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub campaign_id: CampaignId,
    /// 1-based, increasing per campaign
    pub session_number: u32,
    pub narrative: String,
    pub location: Option<String>,
    /// Unresolved narrative threads carried into later sessions
    pub hooks: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        campaign_id: CampaignId,
        session_number: u32,
        narrative: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SessionId::new(),
            campaign_id,
            session_number,
            narrative: narrative.into(),
            location: None,
            hooks: Vec::new(),
            created_at: now,
        }
    }

    /// Hooks with blank entries and duplicates removed, in original order.
    pub fn open_hooks(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.hooks
            .iter()
            .map(|h| h.trim())
            .filter(|h| !h.is_empty())
            .filter(|h| seen.insert(h.to_lowercase()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_hooks_skips_blank_and_duplicates() {
        let mut session = Session::new(CampaignId::new(), 1, "", Utc::now());
        session.hooks = vec![
            "The missing caravan".into(),
            " ".into(),
            "the missing caravan".into(),
            "Who hired the assassins?".into(),
        ];
        assert_eq!(
            session.open_hooks(),
            vec!["The missing caravan", "Who hired the assassins?"]
        );
    }
}
