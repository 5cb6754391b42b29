use async_trait::async_trait;
use everdice_domain::{Campaign, CampaignId, Difficulty};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::{parse_id, parse_timestamp};
use crate::infrastructure::ports::{CampaignRepo, RepoError};

const SELECT_COLUMNS: &str = "SELECT id, title, description, setting, difficulty, \
     current_location, created_at, updated_at FROM campaigns";

pub struct SqliteCampaignRepo {
    pool: SqlitePool,
}

impl SqliteCampaignRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_campaign(row: &SqliteRow) -> Result<Campaign, RepoError> {
    let id: String = row.get("id");
    let difficulty: String = row.get("difficulty");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Campaign {
        id: parse_id(&id)?,
        title: row.get("title"),
        description: row.get("description"),
        setting: row.get("setting"),
        difficulty: difficulty
            .parse::<Difficulty>()
            .map_err(RepoError::serialization)?,
        current_location: row.get("current_location"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

#[async_trait]
impl CampaignRepo for SqliteCampaignRepo {
    async fn get(&self, id: CampaignId) -> Result<Option<Campaign>, RepoError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("campaign.get", e))?;

        row.as_ref().map(row_to_campaign).transpose()
    }

    async fn save(&self, campaign: &Campaign) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO campaigns (
                id, title, description, setting, difficulty, current_location,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                setting = excluded.setting,
                difficulty = excluded.difficulty,
                current_location = excluded.current_location,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(campaign.id.to_string())
        .bind(&campaign.title)
        .bind(&campaign.description)
        .bind(&campaign.setting)
        .bind(campaign.difficulty.as_str())
        .bind(&campaign.current_location)
        .bind(campaign.created_at.to_rfc3339())
        .bind(campaign.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("campaign.save", e))?;

        Ok(())
    }

    async fn delete(&self, id: CampaignId) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM campaigns WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("campaign.delete", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Campaign", id));
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Campaign>, RepoError> {
        let rows = sqlx::query(&format!("{} ORDER BY created_at DESC, title", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("campaign.list", e))?;

        rows.iter().map(row_to_campaign).collect()
    }
}
