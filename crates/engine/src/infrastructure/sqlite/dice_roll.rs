use async_trait::async_trait;
use everdice_domain::{CampaignId, CharacterId, DiceRoll};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::{from_json, parse_id, parse_timestamp, to_json};
use crate::infrastructure::ports::{DiceRollRepo, RepoError};

pub struct SqliteDiceRollRepo {
    pool: SqlitePool,
}

impl SqliteDiceRollRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_roll(row: &SqliteRow) -> Result<DiceRoll, RepoError> {
    let id: String = row.get("id");
    let campaign_id: String = row.get("campaign_id");
    let character_id: Option<String> = row.get("character_id");
    let rolls_json: String = row.get("rolls_json");
    let rolled_at: String = row.get("rolled_at");

    Ok(DiceRoll {
        id: parse_id(&id)?,
        campaign_id: parse_id(&campaign_id)?,
        character_id: character_id
            .as_deref()
            .map(parse_id::<CharacterId>)
            .transpose()?,
        character_name: row.get("character_name"),
        formula: row.get("formula"),
        rolls: from_json(&rolls_json)?,
        modifier: row.get("modifier"),
        total: row.get("total"),
        purpose: row.get("purpose"),
        rolled_at: parse_timestamp(&rolled_at)?,
    })
}

#[async_trait]
impl DiceRollRepo for SqliteDiceRollRepo {
    async fn save(&self, roll: &DiceRoll) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO dice_rolls (
                id, campaign_id, character_id, character_name, formula, rolls_json,
                modifier, total, purpose, rolled_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(roll.id.to_string())
        .bind(roll.campaign_id.to_string())
        .bind(roll.character_id.map(|id| id.to_string()))
        .bind(&roll.character_name)
        .bind(&roll.formula)
        .bind(to_json(&roll.rolls)?)
        .bind(roll.modifier)
        .bind(roll.total)
        .bind(&roll.purpose)
        .bind(roll.rolled_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("dice_roll.save", e))?;

        Ok(())
    }

    async fn list_recent(
        &self,
        campaign_id: CampaignId,
        limit: u32,
    ) -> Result<Vec<DiceRoll>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT id, campaign_id, character_id, character_name, formula, rolls_json,
                   modifier, total, purpose, rolled_at
            FROM dice_rolls
            WHERE campaign_id = ?
            ORDER BY rolled_at DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(campaign_id.to_string())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("dice_roll.list_recent", e))?;

        rows.iter().map(row_to_roll).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::sqlite::test_support::{fixed_now, seed_campaign, test_pool};
    use everdice_domain::DiceFormula;

    #[tokio::test]
    async fn list_recent_is_newest_first_and_limited() {
        let (_dir, pool) = test_pool().await;
        let campaign = seed_campaign(&pool, "The Lost Mine").await;
        let repo = SqliteDiceRollRepo::new(pool);

        let formula = DiceFormula::parse("1d20+2").unwrap();
        let mut saved = Vec::new();
        for (offset, face) in [(0, 3), (1, 11), (2, 18)] {
            let result = formula.roll_with(|_, _| face);
            let mut roll = DiceRoll::from_result(
                campaign.id,
                &result,
                fixed_now() + chrono::Duration::seconds(offset),
            );
            roll.character_name = Some("Thorin".into());
            repo.save(&roll).await.unwrap();
            saved.push(roll);
        }

        let recent = repo.list_recent(campaign.id, 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0], saved[2]);
        assert_eq!(recent[1], saved[1]);
        assert_eq!(recent[0].total, 20);
    }
}
