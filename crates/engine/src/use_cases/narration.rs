//! DM narration.
//!
//! One call gathers the campaign state, builds the prompt, asks the LLM for
//! the next stretch of story and stores it as a new session.

use std::sync::Arc;

use everdice_domain::{
    build_enhanced_prompt, check_for_stalling, CampaignId, NarrativeContext, Session,
    StallingReport, TraceEventPayload,
};
use serde::{Deserialize, Serialize};

use crate::infrastructure::ports::{
    CampaignRepo, CharacterRepo, ChatMessage, ClockPort, DiceRollRepo, LlmError, LlmPort,
    LlmRequest, RepoError, SessionRepo,
};
use crate::use_cases::trace::{TraceError, TraceService};

/// Number of recent rolls shown to the DM.
pub const RECENT_ROLL_COUNT: u32 = 5;

const NARRATION_TEMPERATURE: f32 = 0.8;
const NARRATION_MAX_TOKENS: u32 = 1024;
const EXCERPT_CHARS: usize = 280;

#[derive(Debug, thiserror::Error)]
pub enum NarrationError {
    #[error("Campaign not found: {0}")]
    CampaignNotFound(CampaignId),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("Trace error: {0}")]
    Trace(#[from] TraceError),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NarrateInput {
    pub player_action: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NarrationResult {
    pub narration: String,
    pub session: Session,
    pub stalling: StallingReport,
}

pub struct Narrate {
    campaign: Arc<dyn CampaignRepo>,
    character: Arc<dyn CharacterRepo>,
    session: Arc<dyn SessionRepo>,
    dice_roll: Arc<dyn DiceRollRepo>,
    llm: Arc<dyn LlmPort>,
    trace: Arc<TraceService>,
    clock: Arc<dyn ClockPort>,
}

impl Narrate {
    pub fn new(
        campaign: Arc<dyn CampaignRepo>,
        character: Arc<dyn CharacterRepo>,
        session: Arc<dyn SessionRepo>,
        dice_roll: Arc<dyn DiceRollRepo>,
        llm: Arc<dyn LlmPort>,
        trace: Arc<TraceService>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            campaign,
            character,
            session,
            dice_roll,
            llm,
            trace,
            clock,
        }
    }

    pub async fn execute(
        &self,
        campaign_id: CampaignId,
        input: NarrateInput,
    ) -> Result<NarrationResult, NarrationError> {
        let campaign = self
            .campaign
            .get(campaign_id)
            .await?
            .ok_or(NarrationError::CampaignNotFound(campaign_id))?;
        let characters = self.character.list_in_campaign(campaign_id).await?;
        let latest = self.session.latest_for_campaign(campaign_id).await?;
        let rolls = self
            .dice_roll
            .list_recent(campaign_id, RECENT_ROLL_COUNT)
            .await?;

        let mut context =
            NarrativeContext::from_campaign(&campaign, &characters, latest.as_ref(), &rolls);
        if let Some(action) = input
            .player_action
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
        {
            context = context.with_player_action(action);
        }
        let prompt = build_enhanced_prompt(&context);

        if prompt
            .previous_stalling
            .as_ref()
            .is_some_and(|report| report.is_stalling)
        {
            tracing::debug!(campaign_id = %campaign_id, "Previous session was stalling");
        }

        let request = LlmRequest::new(vec![ChatMessage::user(prompt.user_prompt)])
            .with_system_prompt(prompt.system_prompt)
            .with_temperature(NARRATION_TEMPERATURE)
            .with_max_tokens(Some(NARRATION_MAX_TOKENS));

        tracing::debug!(
            campaign_id = %campaign_id,
            characters = characters.len(),
            rolls = rolls.len(),
            "Requesting DM narration"
        );

        let response = self.llm.generate(request).await?;
        let narration = response.content.trim().to_string();
        if narration.is_empty() {
            return Err(LlmError::InvalidResponse("Empty narration".to_string()).into());
        }

        let stalling = check_for_stalling(&narration);
        if stalling.is_stalling {
            tracing::warn!(
                campaign_id = %campaign_id,
                ratio = stalling.repetition_ratio,
                triggers = ?stalling.triggers,
                "DM narration is stalling"
            );
        }

        let session_number = latest.as_ref().map_or(1, |s| s.session_number + 1);
        let mut session = Session::new(campaign_id, session_number, &narration, self.clock.now());
        session.location = campaign
            .current_location
            .clone()
            .or_else(|| latest.as_ref().and_then(|s| s.location.clone()));
        session.hooks = latest
            .as_ref()
            .map(|s| s.open_hooks().into_iter().map(str::to_string).collect())
            .unwrap_or_default();
        self.session.save(&session).await?;

        if session_number == 1 {
            self.trace
                .record_for(
                    &campaign,
                    TraceEventPayload::SessionStarted {
                        session_id: session.id,
                        session_number,
                    },
                )
                .await?;
        }
        self.trace
            .record_for(
                &campaign,
                TraceEventPayload::Narration {
                    session_id: Some(session.id),
                    excerpt: excerpt(&narration),
                    stalling: stalling.is_stalling,
                },
            )
            .await?;

        tracing::info!(
            campaign_id = %campaign_id,
            session_number,
            stalling = stalling.is_stalling,
            "Narration stored"
        );

        Ok(NarrationResult {
            narration,
            session,
            stalling,
        })
    }
}

fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
