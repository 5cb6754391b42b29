use async_trait::async_trait;
use everdice_domain::{CampaignId, ToolkitId, ToolkitKind};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::{from_json, parse_id, parse_timestamp, to_json};
use crate::infrastructure::ports::{RepoError, StoredToolkitRecord, ToolkitRepo};

const SELECT_COLUMNS: &str =
    "SELECT id, kind, campaign_id, name, data_json, created_at, updated_at FROM toolkit_records";

/// One table for every toolkit kind; the typed payload lives in `data_json`.
pub struct SqliteToolkitRepo {
    pool: SqlitePool,
}

impl SqliteToolkitRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_record(row: &SqliteRow) -> Result<StoredToolkitRecord, RepoError> {
    let id: String = row.get("id");
    let kind: String = row.get("kind");
    let campaign_id: String = row.get("campaign_id");
    let data_json: String = row.get("data_json");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(StoredToolkitRecord {
        id: parse_id(&id)?,
        kind: kind.parse().map_err(RepoError::serialization)?,
        campaign_id: parse_id(&campaign_id)?,
        name: row.get("name"),
        data: from_json(&data_json)?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

#[async_trait]
impl ToolkitRepo for SqliteToolkitRepo {
    async fn get(
        &self,
        kind: ToolkitKind,
        id: ToolkitId,
    ) -> Result<Option<StoredToolkitRecord>, RepoError> {
        let row = sqlx::query(&format!("{} WHERE id = ? AND kind = ?", SELECT_COLUMNS))
            .bind(id.to_string())
            .bind(kind.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("toolkit.get", e))?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn save(&self, record: &StoredToolkitRecord) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO toolkit_records (
                id, kind, campaign_id, name, data_json, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                data_json = excluded.data_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.kind.as_str())
        .bind(record.campaign_id.to_string())
        .bind(&record.name)
        .bind(to_json(&record.data)?)
        .bind(record.created_at.to_rfc3339())
        .bind(record.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("toolkit.save", e))?;

        Ok(())
    }

    async fn delete(&self, kind: ToolkitKind, id: ToolkitId) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM toolkit_records WHERE id = ? AND kind = ?")
            .bind(id.to_string())
            .bind(kind.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("toolkit.delete", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found(kind.as_str(), id));
        }
        Ok(())
    }

    async fn list(
        &self,
        kind: ToolkitKind,
        campaign_id: Option<CampaignId>,
    ) -> Result<Vec<StoredToolkitRecord>, RepoError> {
        let mut query = format!("{} WHERE kind = ?", SELECT_COLUMNS);
        if campaign_id.is_some() {
            query.push_str(" AND campaign_id = ?");
        }
        query.push_str(" ORDER BY name COLLATE NOCASE, created_at");

        let mut q = sqlx::query(&query).bind(kind.as_str());
        if let Some(campaign_id) = campaign_id {
            q = q.bind(campaign_id.to_string());
        }

        let rows = q
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("toolkit.list", e))?;

        rows.iter().map(row_to_record).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::sqlite::test_support::{fixed_now, seed_campaign, test_pool};
    use serde_json::json;

    fn record(kind: ToolkitKind, campaign_id: CampaignId, name: &str) -> StoredToolkitRecord {
        StoredToolkitRecord {
            id: ToolkitId::new(),
            kind,
            campaign_id,
            name: name.to_string(),
            data: json!({ "name": name }),
            created_at: fixed_now(),
            updated_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn kinds_are_kept_apart() {
        let (_dir, pool) = test_pool().await;
        let campaign = seed_campaign(&pool, "The Lost Mine").await;
        let repo = SqliteToolkitRepo::new(pool);

        let goblin = record(ToolkitKind::Monster, campaign.id, "Goblin");
        let sildar = record(ToolkitKind::Npc, campaign.id, "Sildar");
        repo.save(&goblin).await.unwrap();
        repo.save(&sildar).await.unwrap();

        assert_eq!(
            repo.get(ToolkitKind::Monster, goblin.id).await.unwrap(),
            Some(goblin.clone())
        );
        assert!(repo.get(ToolkitKind::Npc, goblin.id).await.unwrap().is_none());
        assert!(repo
            .delete(ToolkitKind::Npc, goblin.id)
            .await
            .unwrap_err()
            .is_not_found());

        let monsters = repo.list(ToolkitKind::Monster, None).await.unwrap();
        assert_eq!(monsters, vec![goblin]);
    }

    #[tokio::test]
    async fn list_filters_by_campaign_and_sorts_by_name() {
        let (_dir, pool) = test_pool().await;
        let mine = seed_campaign(&pool, "The Lost Mine").await;
        let other = seed_campaign(&pool, "Curse of Strahd").await;
        let repo = SqliteToolkitRepo::new(pool);

        repo.save(&record(ToolkitKind::Monster, mine.id, "wolf"))
            .await
            .unwrap();
        repo.save(&record(ToolkitKind::Monster, mine.id, "Bugbear"))
            .await
            .unwrap();
        repo.save(&record(ToolkitKind::Monster, other.id, "Vampire spawn"))
            .await
            .unwrap();

        let names: Vec<String> = repo
            .list(ToolkitKind::Monster, Some(mine.id))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Bugbear", "wolf"]);
        assert_eq!(repo.list(ToolkitKind::Monster, None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn update_replaces_payload() {
        let (_dir, pool) = test_pool().await;
        let campaign = seed_campaign(&pool, "The Lost Mine").await;
        let repo = SqliteToolkitRepo::new(pool);

        let mut quest = record(ToolkitKind::Quest, campaign.id, "Find Gundren");
        repo.save(&quest).await.unwrap();
        quest.data = json!({ "title": "Find Gundren", "status": "completed" });
        repo.save(&quest).await.unwrap();

        let loaded = repo.get(ToolkitKind::Quest, quest.id).await.unwrap().unwrap();
        assert_eq!(loaded.data["status"], "completed");
    }
}
