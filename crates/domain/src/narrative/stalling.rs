//! Stalling/repetition heuristic for DM narration.
//!
//! Narration is split into sentence/line segments. A segment is a duplicate
//! when an equal segment (case- and whitespace-insensitive) appeared earlier.
//! The narrative is stalling when duplicates make up more than 40% of the
//! segments, or when the stock hand-back phrase shows up.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const STALLING_RATIO_THRESHOLD: f64 = 0.4;
pub const STALLING_PHRASE: &str = "what would you like to do";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StallingTrigger {
    Repetition,
    StockPhrase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StallingReport {
    pub is_stalling: bool,
    pub repetition_ratio: f64,
    pub duplicate_segments: usize,
    pub total_segments: usize,
    pub triggers: Vec<StallingTrigger>,
}

/// Split text on sentence terminators and line breaks into normalized segments.
pub fn split_segments(text: &str) -> Vec<String> {
    text.split(['.', '!', '?', '\n', '\r'])
        .map(|segment| {
            segment
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase()
        })
        .filter(|segment| !segment.is_empty())
        .collect()
}

pub fn check_for_stalling(text: &str) -> StallingReport {
    let segments = split_segments(text);
    let mut seen = HashSet::with_capacity(segments.len());
    let duplicate_segments = segments
        .iter()
        .filter(|segment| !seen.insert(segment.as_str()))
        .count();

    let total_segments = segments.len();
    let repetition_ratio = if total_segments == 0 {
        0.0
    } else {
        duplicate_segments as f64 / total_segments as f64
    };

    let mut triggers = Vec::new();
    if repetition_ratio > STALLING_RATIO_THRESHOLD {
        triggers.push(StallingTrigger::Repetition);
    }
    if text.to_lowercase().contains(STALLING_PHRASE) {
        triggers.push(StallingTrigger::StockPhrase);
    }

    StallingReport {
        is_stalling: !triggers.is_empty(),
        repetition_ratio,
        duplicate_segments,
        total_segments,
        triggers,
    }
}
