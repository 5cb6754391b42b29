//! Dice rolling for a campaign.

use std::sync::Arc;

use everdice_domain::{CampaignId, CharacterId, DiceFormula, DiceRoll, TraceEventPayload};
use serde::Deserialize;

use crate::infrastructure::ports::{
    CampaignRepo, CharacterRepo, ClockPort, DiceRollRepo, RandomPort,
};
use crate::use_cases::management::{normalize_optional, ManagementError};
use crate::use_cases::trace::TraceService;

/// Default and maximum page size for roll history.
pub const DEFAULT_ROLL_HISTORY: u32 = 20;
pub const MAX_ROLL_HISTORY: u32 = 200;

#[derive(Debug, Clone, Deserialize)]
pub struct RollDiceInput {
    pub formula: String,
    #[serde(default)]
    pub character_id: Option<CharacterId>,
    #[serde(default)]
    pub purpose: Option<String>,
}

pub struct DiceOps {
    dice_roll: Arc<dyn DiceRollRepo>,
    campaign: Arc<dyn CampaignRepo>,
    character: Arc<dyn CharacterRepo>,
    trace: Arc<TraceService>,
    random: Arc<dyn RandomPort>,
    clock: Arc<dyn ClockPort>,
}

impl DiceOps {
    pub fn new(
        dice_roll: Arc<dyn DiceRollRepo>,
        campaign: Arc<dyn CampaignRepo>,
        character: Arc<dyn CharacterRepo>,
        trace: Arc<TraceService>,
        random: Arc<dyn RandomPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            dice_roll,
            campaign,
            character,
            trace,
            random,
            clock,
        }
    }

    /// Roll, store the result and log it to the campaign trace.
    pub async fn roll(
        &self,
        campaign_id: CampaignId,
        input: RollDiceInput,
    ) -> Result<DiceRoll, ManagementError> {
        let campaign = self
            .campaign
            .get(campaign_id)
            .await?
            .ok_or_else(|| ManagementError::not_found("Campaign", campaign_id))?;

        let formula = DiceFormula::parse(&input.formula)
            .map_err(|e| ManagementError::InvalidInput(e.to_string()))?;

        let character_name = match input.character_id {
            Some(character_id) => Some(
                self.character
                    .get(character_id)
                    .await?
                    .ok_or_else(|| ManagementError::not_found("Character", character_id))?
                    .name,
            ),
            None => None,
        };

        let result = formula.roll_with(|min, max| self.random.gen_range(min, max));
        let mut roll = DiceRoll::from_result(campaign_id, &result, self.clock.now());
        roll.character_id = input.character_id;
        roll.character_name = character_name;
        roll.purpose = normalize_optional(input.purpose);

        self.dice_roll.save(&roll).await?;

        self.trace
            .record_for(
                &campaign,
                TraceEventPayload::DiceRolled {
                    character_id: roll.character_id,
                    formula: roll.formula.clone(),
                    rolls: roll.rolls.clone(),
                    total: roll.total,
                    purpose: roll.purpose.clone(),
                },
            )
            .await?;

        tracing::info!(
            campaign_id = %campaign_id,
            formula = %roll.formula,
            total = roll.total,
            "Dice rolled"
        );
        Ok(roll)
    }

    /// Most recent rolls first.
    pub async fn list(
        &self,
        campaign_id: CampaignId,
        limit: Option<u32>,
    ) -> Result<Vec<DiceRoll>, ManagementError> {
        if self.campaign.get(campaign_id).await?.is_none() {
            return Err(ManagementError::not_found("Campaign", campaign_id));
        }
        let limit = limit
            .unwrap_or(DEFAULT_ROLL_HISTORY)
            .clamp(1, MAX_ROLL_HISTORY);
        Ok(self.dice_roll.list_recent(campaign_id, limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::{FixedClock, FixedRandom};
    use crate::infrastructure::ports::{
        MockCampaignRepo, MockCharacterRepo, MockDiceRollRepo, MockTraceRepo,
    };
    use chrono::{TimeZone, Utc};
    use everdice_domain::{Campaign, CamlTrace, Character, TraceEvent};

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn campaign_repo(campaign: Option<Campaign>) -> Arc<MockCampaignRepo> {
        let mut repo = MockCampaignRepo::new();
        repo.expect_get().returning(move |_| Ok(campaign.clone()));
        Arc::new(repo)
    }

    /// Trace service that must not be touched.
    fn idle_trace(campaign: &Campaign) -> Arc<TraceService> {
        Arc::new(TraceService::new(
            Arc::new(MockTraceRepo::new()),
            campaign_repo(Some(campaign.clone())),
            Arc::new(FixedClock(now())),
        ))
    }

    /// Trace service whose repo accepts one dice event.
    fn recording_trace(campaign: &Campaign) -> Arc<TraceService> {
        let existing = CamlTrace::new(campaign.id, &campaign.title, now());
        let mut trace_repo = MockTraceRepo::new();
        trace_repo
            .expect_get_for_campaign()
            .returning(move |_| Ok(Some(existing.clone())));
        trace_repo
            .expect_append_event()
            .withf(|_, payload, _| matches!(payload, TraceEventPayload::DiceRolled { .. }))
            .times(1)
            .returning(|_, payload, ts| {
                Ok(TraceEvent {
                    id: "evt.000001".into(),
                    sequence: 1,
                    timestamp: ts,
                    payload: payload.clone(),
                })
            });

        Arc::new(TraceService::new(
            Arc::new(trace_repo),
            campaign_repo(Some(campaign.clone())),
            Arc::new(FixedClock(now())),
        ))
    }

    #[tokio::test]
    async fn roll_uses_random_source_and_records() {
        let campaign = Campaign::new("The Lost Mine", now());
        let campaign_id = campaign.id;
        let thorin = Character::new("Thorin", "Dwarf", "Fighter", now());
        let thorin_id = thorin.id;

        let mut character_repo = MockCharacterRepo::new();
        character_repo
            .expect_get()
            .withf(move |id| *id == thorin_id)
            .returning(move |_| Ok(Some(thorin.clone())));

        let mut dice_repo = MockDiceRollRepo::new();
        dice_repo
            .expect_save()
            .withf(|r| r.total == 19 && r.rolls == vec![14])
            .times(1)
            .returning(|_| Ok(()));

        let ops = DiceOps::new(
            Arc::new(dice_repo),
            campaign_repo(Some(campaign.clone())),
            Arc::new(character_repo),
            recording_trace(&campaign),
            Arc::new(FixedRandom(14)),
            Arc::new(FixedClock(now())),
        );

        let roll = ops
            .roll(
                campaign_id,
                RollDiceInput {
                    formula: "1d20+5".into(),
                    character_id: Some(thorin_id),
                    purpose: Some("Attack".into()),
                },
            )
            .await
            .unwrap();

        assert_eq!(roll.summary(), "Thorin rolled 1d20+5 for Attack: 19");
    }

    #[tokio::test]
    async fn bad_formula_is_invalid_input() {
        let campaign = Campaign::new("The Lost Mine", now());
        let campaign_id = campaign.id;
        let ops = DiceOps::new(
            Arc::new(MockDiceRollRepo::new()),
            campaign_repo(Some(campaign.clone())),
            Arc::new(MockCharacterRepo::new()),
            idle_trace(&campaign),
            Arc::new(FixedRandom(1)),
            Arc::new(FixedClock(now())),
        );

        let result = ops
            .roll(
                campaign_id,
                RollDiceInput {
                    formula: "2x6".into(),
                    character_id: None,
                    purpose: None,
                },
            )
            .await;
        assert!(matches!(result, Err(ManagementError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn list_clamps_limit() {
        let campaign = Campaign::new("The Lost Mine", now());
        let campaign_id = campaign.id;

        let mut dice_repo = MockDiceRollRepo::new();
        dice_repo
            .expect_list_recent()
            .withf(|_, limit| *limit == MAX_ROLL_HISTORY)
            .returning(|_, _| Ok(vec![]));

        let ops = DiceOps::new(
            Arc::new(dice_repo),
            campaign_repo(Some(campaign.clone())),
            Arc::new(MockCharacterRepo::new()),
            idle_trace(&campaign),
            Arc::new(FixedRandom(1)),
            Arc::new(FixedClock(now())),
        );
        assert!(ops.list(campaign_id, Some(10_000)).await.unwrap().is_empty());
    }
}
