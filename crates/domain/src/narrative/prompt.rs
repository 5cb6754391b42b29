//! Dungeon Master prompt construction.
//!
//! The system prompt fixes who the DM is talking to (campaign, location,
//! party roster). The user prompt carries what just happened: the tail of
//! the previous session, recent dice rolls, unresolved threads and the
//! player's action. Every part is optional; missing context just produces a
//! sparser prompt.

use serde::{Deserialize, Serialize};

use super::stalling::{check_for_stalling, StallingReport};
use crate::entities::{Campaign, Character, DiceRoll, Session};

/// Maximum characters of prior narrative carried into the prompt.
pub const MAX_PREVIOUS_NARRATIVE_CHARS: usize = 2_000;

const STYLE_GUIDANCE: &str = "Narrate in vivid second person, a few paragraphs at most. \
Respect the dice: successes and failures must change the story. \
End on a concrete situation the players can act on, never a generic question \
such as \"What would you like to do?\".";

const ANTI_STALL_DIRECTIVE: &str = "The story has been circling. Do not repeat earlier \
descriptions. Introduce a new development now: an arrival, a revelation, a threat or a \
consequence of an earlier choice.";

const OPENING_REQUEST: &str = "Begin the adventure with an opening scene that introduces \
the party to the current location and presents an immediate hook.";

/// Everything the prompt builder may use. All fields are optional apart from
/// the campaign title.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NarrativeContext {
    pub campaign_title: String,
    pub campaign_description: Option<String>,
    pub setting: Option<String>,
    pub location: Option<String>,
    /// One line per character, see [`Character::roster_line`]
    pub roster: Vec<String>,
    pub previous_narrative: Option<String>,
    /// Human-readable roll summaries, oldest first
    pub recent_rolls: Vec<String>,
    pub open_threads: Vec<String>,
    pub player_action: Option<String>,
}

impl NarrativeContext {
    /// Assemble context from stored campaign state.
    ///
    /// The latest session's location wins over the campaign's; `recent_rolls`
    /// is expected newest first (as storage returns it) and is reversed so the
    /// prompt reads chronologically.
    pub fn from_campaign(
        campaign: &Campaign,
        characters: &[Character],
        latest_session: Option<&Session>,
        recent_rolls: &[DiceRoll],
    ) -> Self {
        Self {
            campaign_title: campaign.title.clone(),
            campaign_description: campaign.description.clone(),
            setting: campaign.setting.clone(),
            location: latest_session
                .and_then(|s| s.location.clone())
                .or_else(|| campaign.current_location.clone()),
            roster: characters.iter().map(Character::roster_line).collect(),
            previous_narrative: latest_session.map(|s| s.narrative.clone()),
            recent_rolls: recent_rolls.iter().rev().map(DiceRoll::summary).collect(),
            open_threads: latest_session
                .map(|s| s.open_hooks().into_iter().map(str::to_string).collect())
                .unwrap_or_default(),
            player_action: None,
        }
    }

    pub fn with_player_action(mut self, action: impl Into<String>) -> Self {
        self.player_action = Some(action.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedPrompt {
    pub system_prompt: String,
    pub user_prompt: String,
    /// Stalling check of the previous narrative, when there was one
    pub previous_stalling: Option<StallingReport>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Last `max_chars` characters of `text`, cut on a char boundary.
fn tail_chars(text: &str, max_chars: usize) -> &str {
    let count = text.chars().count();
    if count <= max_chars {
        return text;
    }
    let skip = count - max_chars;
    match text.char_indices().nth(skip) {
        Some((byte_index, _)) => &text[byte_index..],
        None => text,
    }
}

pub fn build_system_prompt(ctx: &NarrativeContext) -> String {
    let mut prompt = format!(
        "You are the Dungeon Master for the campaign \"{}\".\n",
        ctx.campaign_title.trim()
    );

    if let Some(description) = non_blank(&ctx.campaign_description) {
        prompt.push_str(description);
        prompt.push('\n');
    }
    if let Some(setting) = non_blank(&ctx.setting) {
        prompt.push_str(&format!("Setting: {}\n", setting));
    }
    prompt.push_str(&format!(
        "Current location: {}\n",
        non_blank(&ctx.location).unwrap_or("Unknown")
    ));

    prompt.push_str("\nParty:\n");
    if ctx.roster.is_empty() {
        prompt.push_str("- No characters have joined yet.\n");
    } else {
        for line in &ctx.roster {
            prompt.push_str(&format!("- {}\n", line));
        }
    }

    prompt.push('\n');
    prompt.push_str(STYLE_GUIDANCE);
    prompt
}

pub fn build_user_prompt(ctx: &NarrativeContext) -> (String, Option<StallingReport>) {
    let mut sections: Vec<String> = Vec::new();
    let previous = non_blank(&ctx.previous_narrative);

    if let Some(previous) = previous {
        sections.push(format!(
            "Previously:\n{}",
            tail_chars(previous, MAX_PREVIOUS_NARRATIVE_CHARS)
        ));
    }

    let rolls: Vec<&str> = ctx
        .recent_rolls
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .collect();
    if !rolls.is_empty() {
        sections.push(format!("Recent dice rolls:\n- {}", rolls.join("\n- ")));
    }

    let threads: Vec<&str> = ctx
        .open_threads
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    if !threads.is_empty() {
        sections.push(format!("Unresolved threads:\n- {}", threads.join("\n- ")));
    }

    let stalling = previous.map(check_for_stalling);
    if stalling.as_ref().is_some_and(|report| report.is_stalling) {
        sections.push(ANTI_STALL_DIRECTIVE.to_string());
    }

    match non_blank(&ctx.player_action) {
        Some(action) => sections.push(format!("Player action: {}", action)),
        None if previous.is_none() => sections.push(OPENING_REQUEST.to_string()),
        None => sections.push("Continue the story from where it left off.".to_string()),
    }

    (sections.join("\n\n"), stalling)
}

pub fn build_enhanced_prompt(ctx: &NarrativeContext) -> EnhancedPrompt {
    let (user_prompt, previous_stalling) = build_user_prompt(ctx);
    EnhancedPrompt {
        system_prompt: build_system_prompt(ctx),
        user_prompt,
        previous_stalling,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn context() -> NarrativeContext {
        NarrativeContext {
            campaign_title: "The Lost Mine".into(),
            location: Some("Phandalin".into()),
            roster: vec!["Thorin (Dwarf Fighter, level 3, HP 20/28, AC 16)".into()],
            ..Default::default()
        }
    }

    #[test]
    fn system_prompt_has_title_location_and_roster() {
        let prompt = build_system_prompt(&context());
        assert!(prompt.contains("\"The Lost Mine\""));
        assert!(prompt.contains("Current location: Phandalin"));
        assert!(prompt.contains("- Thorin (Dwarf Fighter"));
    }

    #[test]
    fn sparse_context_produces_opening_request() {
        let ctx = NarrativeContext {
            campaign_title: "Untitled".into(),
            ..Default::default()
        };
        let prompt = build_enhanced_prompt(&ctx);
        assert!(prompt.system_prompt.contains("Current location: Unknown"));
        assert!(prompt.system_prompt.contains("No characters have joined yet"));
        assert_eq!(prompt.user_prompt, OPENING_REQUEST);
        assert!(prompt.previous_stalling.is_none());
    }

    #[test]
    fn user_prompt_sections_in_order() {
        let mut ctx = context().with_player_action("I search the chest");
        ctx.previous_narrative = Some("The goblins fled into the cave.".into());
        ctx.recent_rolls = vec!["Thorin rolled 1d20+3 for Investigation: 17".into()];
        ctx.open_threads = vec!["Who leads the goblins?".into(), " ".into()];

        let prompt = build_enhanced_prompt(&ctx);
        let user = &prompt.user_prompt;
        let previously = user.find("Previously:").unwrap();
        let rolls = user.find("Recent dice rolls:").unwrap();
        let threads = user.find("Unresolved threads:").unwrap();
        let action = user.find("Player action: I search the chest").unwrap();
        assert!(previously < rolls && rolls < threads && threads < action);
        assert!(!user.contains("- \n"));
        assert!(!user.contains(ANTI_STALL_DIRECTIVE));
    }

    #[test]
    fn stalling_previous_narrative_adds_directive() {
        let mut ctx = context();
        ctx.previous_narrative =
            Some("The fog is thick. The fog is thick. The fog is thick.".into());
        let prompt = build_enhanced_prompt(&ctx);
        assert!(prompt.user_prompt.contains(ANTI_STALL_DIRECTIVE));
        assert!(prompt.previous_stalling.unwrap().is_stalling);
        assert!(prompt
            .user_prompt
            .ends_with("Continue the story from where it left off."));
    }

    #[test]
    fn previous_narrative_is_truncated_to_tail() {
        let mut ctx = context();
        let long = format!("{}END", "é".repeat(MAX_PREVIOUS_NARRATIVE_CHARS + 50));
        ctx.previous_narrative = Some(long);
        let prompt = build_enhanced_prompt(&ctx);
        let previously = prompt.user_prompt.split("\n\n").next().unwrap();
        let body = previously.trim_start_matches("Previously:\n");
        assert_eq!(body.chars().count(), MAX_PREVIOUS_NARRATIVE_CHARS);
        assert!(body.ends_with("END"));
    }

    #[test]
    fn from_campaign_prefers_session_location() {
        let now = Utc::now();
        let mut campaign = Campaign::new("The Lost Mine", now);
        campaign.current_location = Some("Neverwinter".into());

        let mut session = Session::new(campaign.id, 1, "You reach the town.", now);
        session.location = Some("Phandalin".into());
        session.hooks = vec!["Find Gundren".into()];

        let ctx = NarrativeContext::from_campaign(&campaign, &[], Some(&session), &[]);
        assert_eq!(ctx.location.as_deref(), Some("Phandalin"));
        assert_eq!(ctx.open_threads, vec!["Find Gundren".to_string()]);
        assert_eq!(ctx.previous_narrative.as_deref(), Some("You reach the town."));

        let ctx = NarrativeContext::from_campaign(&campaign, &[], None, &[]);
        assert_eq!(ctx.location.as_deref(), Some("Neverwinter"));
        assert!(ctx.previous_narrative.is_none());
    }
}
