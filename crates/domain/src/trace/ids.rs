//! Identifier generation for traces, modules and events.
//!
//! Event ids are `evt.` followed by the zero-padded sequence (`evt.000042`).
//! Trace and module ids are derived from the campaign id and a name. The name
//! is escaped injectively (ASCII alphanumerics and `-` pass through, every
//! other byte becomes `_xx`), so distinct inputs never share an id.

use std::fmt::Write as _;

use crate::CampaignId;

pub const EVENT_ID_PREFIX: &str = "evt.";
pub const TRACE_ID_PREFIX: &str = "trace.";
pub const MODULE_ID_PREFIX: &str = "module.";

pub fn generate_event_id(sequence: u64) -> String {
    format!("{}{:06}", EVENT_ID_PREFIX, sequence)
}

/// Inverse of [`generate_event_id`].
pub fn parse_event_sequence(event_id: &str) -> Option<u64> {
    let digits = event_id.strip_prefix(EVENT_ID_PREFIX)?;
    if digits.len() < 6 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

pub fn generate_trace_id(campaign_id: CampaignId, name: &str) -> String {
    format!("{}{}.{}", TRACE_ID_PREFIX, campaign_id, escape_name(name))
}

pub fn generate_module_id(campaign_id: CampaignId, name: &str) -> String {
    format!("{}{}.{}", MODULE_ID_PREFIX, campaign_id, escape_name(name))
}

fn escape_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            out.push(char::from(byte));
        } else {
            // Writing to a String cannot fail
            let _ = write!(out, "_{:02x}", byte);
        }
    }
    out
}

/// Hands out monotonically increasing event ids for one trace.
#[derive(Debug, Clone, Default)]
pub struct EventIdSequence {
    last: u64,
}

impl EventIdSequence {
    /// Continue numbering after an existing last sequence number.
    pub fn starting_after(last: u64) -> Self {
        Self { last }
    }

    pub fn last(&self) -> u64 {
        self.last
    }

    /// Returns `(sequence, id)` for the next event.
    pub fn next_id(&mut self) -> (u64, String) {
        self.last += 1;
        (self.last, generate_event_id(self.last))
    }
}
