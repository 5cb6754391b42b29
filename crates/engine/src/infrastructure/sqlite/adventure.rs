use std::sync::Arc;

use async_trait::async_trait;
use everdice_domain::{AdventureProgress, CampaignId};
use sqlx::{Row, SqlitePool};

use super::{from_json, to_json};
use crate::infrastructure::ports::{AdventureRepo, ClockPort, RepoError};

/// Stores the adventure counters as one JSON document per campaign.
pub struct SqliteAdventureRepo {
    pool: SqlitePool,
    clock: Arc<dyn ClockPort>,
}

impl SqliteAdventureRepo {
    pub fn new(pool: SqlitePool, clock: Arc<dyn ClockPort>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl AdventureRepo for SqliteAdventureRepo {
    async fn get_progress(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<AdventureProgress>, RepoError> {
        let row = sqlx::query("SELECT progress_json FROM adventure_progress WHERE campaign_id = ?")
            .bind(campaign_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("adventure.get_progress", e))?;

        row.map(|row| {
            let json: String = row.get("progress_json");
            from_json(&json)
        })
        .transpose()
    }

    async fn save_progress(
        &self,
        campaign_id: CampaignId,
        progress: &AdventureProgress,
    ) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO adventure_progress (campaign_id, progress_json, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(campaign_id) DO UPDATE SET
                progress_json = excluded.progress_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(campaign_id.to_string())
        .bind(to_json(progress)?)
        .bind(self.clock.now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("adventure.save_progress", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::sqlite::test_support::{fixed_now, seed_campaign, test_pool};

    #[tokio::test]
    async fn progress_upserts() {
        let (_dir, pool) = test_pool().await;
        let campaign = seed_campaign(&pool, "The Lost Mine").await;
        let repo = SqliteAdventureRepo::new(pool, Arc::new(FixedClock(fixed_now())));

        assert!(repo.get_progress(campaign.id).await.unwrap().is_none());

        let mut progress = AdventureProgress::default();
        progress.discoveries = 2;
        repo.save_progress(campaign.id, &progress).await.unwrap();
        progress.combat_encounters = 1;
        repo.save_progress(campaign.id, &progress).await.unwrap();

        assert_eq!(repo.get_progress(campaign.id).await.unwrap(), Some(progress));
    }
}
