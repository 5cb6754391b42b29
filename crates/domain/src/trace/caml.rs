use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::{TraceEvent, TraceEventKind, TraceEventPayload};
use super::ids::{generate_module_id, generate_trace_id, EventIdSequence};
use crate::rules::AdventureProgress;
use crate::CampaignId;

pub const CAML_SCHEMA_VERSION: &str = "1.0";

/// Append-only log of gameplay events for one campaign module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CamlTrace {
    pub trace_id: String,
    pub module_id: String,
    pub campaign_id: CampaignId,
    pub name: String,
    pub schema_version: String,
    pub created_at: DateTime<Utc>,
    pub events: Vec<TraceEvent>,
}

impl CamlTrace {
    pub fn new(campaign_id: CampaignId, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        let name = name.into();
        Self {
            trace_id: generate_trace_id(campaign_id, &name),
            module_id: generate_module_id(campaign_id, &name),
            campaign_id,
            name,
            schema_version: CAML_SCHEMA_VERSION.to_string(),
            created_at: now,
            events: Vec::new(),
        }
    }

    pub fn last_sequence(&self) -> u64 {
        self.events.last().map_or(0, |e| e.sequence)
    }

    /// Append an event under the next sequence number.
    pub fn append(&mut self, payload: TraceEventPayload, now: DateTime<Utc>) -> &TraceEvent {
        let (sequence, id) = EventIdSequence::starting_after(self.last_sequence()).next_id();
        self.events.push(TraceEvent {
            id,
            sequence,
            timestamp: now,
            payload,
        });
        &self.events[self.events.len() - 1]
    }

    pub fn events_of_kind(&self, kind: TraceEventKind) -> impl Iterator<Item = &TraceEvent> {
        self.events.iter().filter(move |e| e.payload.kind() == kind)
    }

    /// Adventure progress implied by the events in this trace.
    pub fn progress(&self) -> AdventureProgress {
        let mut progress = AdventureProgress::default();
        for counter in self
            .events
            .iter()
            .filter_map(|e| e.payload.progress_counter())
        {
            progress.increment(counter);
        }
        progress
    }
}
