//! CAMLTrace - structured, append-only log of gameplay events
//!
//! A trace belongs to one campaign module. Every event gets a monotonically
//! increasing `evt.%06d` id and carries a payload discriminated by kind
//! (session lifecycle, encounters, state changes, dice, damage/heal, quest
//! progress, discoveries, narration).

mod caml;
mod event;
mod ids;

pub use caml::{CamlTrace, CAML_SCHEMA_VERSION};
pub use event::{EncounterOutcome, TraceEvent, TraceEventKind, TraceEventPayload};
pub use ids::{
    generate_event_id, generate_module_id, generate_trace_id, parse_event_sequence,
    EventIdSequence,
};
