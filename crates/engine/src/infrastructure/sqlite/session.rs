use async_trait::async_trait;
use everdice_domain::{CampaignId, Session, SessionId};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::{from_json, parse_id, parse_timestamp, to_json};
use crate::infrastructure::ports::{RepoError, SessionRepo};

const SELECT_COLUMNS: &str = "SELECT id, campaign_id, session_number, narrative, location, \
     hooks_json, created_at FROM sessions";

pub struct SqliteSessionRepo {
    pool: SqlitePool,
}

impl SqliteSessionRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_session(row: &SqliteRow) -> Result<Session, RepoError> {
    let id: String = row.get("id");
    let campaign_id: String = row.get("campaign_id");
    let session_number: i64 = row.get("session_number");
    let hooks_json: String = row.get("hooks_json");
    let created_at: String = row.get("created_at");

    Ok(Session {
        id: parse_id(&id)?,
        campaign_id: parse_id(&campaign_id)?,
        session_number: u32::try_from(session_number).map_err(|_| {
            RepoError::serialization(format!("Invalid session number {}", session_number))
        })?,
        narrative: row.get("narrative"),
        location: row.get("location"),
        hooks: from_json(&hooks_json)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

#[async_trait]
impl SessionRepo for SqliteSessionRepo {
    async fn get(&self, id: SessionId) -> Result<Option<Session>, RepoError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("session.get", e))?;

        row.as_ref().map(row_to_session).transpose()
    }

    async fn save(&self, session: &Session) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"
            INSERT INTO sessions (
                id, campaign_id, session_number, narrative, location, hooks_json, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                narrative = excluded.narrative,
                location = excluded.location,
                hooks_json = excluded.hooks_json
            "#,
        )
        .bind(session.id.to_string())
        .bind(session.campaign_id.to_string())
        .bind(i64::from(session.session_number))
        .bind(&session.narrative)
        .bind(&session.location)
        .bind(to_json(&session.hooks)?)
        .bind(session.created_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(RepoError::constraint(format!(
                    "Session {} already exists for campaign {}",
                    session.session_number, session.campaign_id
                )))
            }
            Err(e) => Err(RepoError::database("session.save", e)),
        }
    }

    async fn list_for_campaign(&self, campaign_id: CampaignId) -> Result<Vec<Session>, RepoError> {
        let rows = sqlx::query(&format!(
            "{} WHERE campaign_id = ? ORDER BY session_number ASC",
            SELECT_COLUMNS
        ))
        .bind(campaign_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("session.list_for_campaign", e))?;

        rows.iter().map(row_to_session).collect()
    }

    async fn latest_for_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Session>, RepoError> {
        let row = sqlx::query(&format!(
            "{} WHERE campaign_id = ? ORDER BY session_number DESC LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(campaign_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("session.latest_for_campaign", e))?;

        row.as_ref().map(row_to_session).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::sqlite::test_support::{fixed_now, seed_campaign, test_pool};

    #[tokio::test]
    async fn latest_is_highest_session_number() {
        let (_dir, pool) = test_pool().await;
        let campaign = seed_campaign(&pool, "The Lost Mine").await;
        let repo = SqliteSessionRepo::new(pool);

        let mut first = Session::new(campaign.id, 1, "You meet in a tavern.", fixed_now());
        first.hooks = vec!["A stranger watches from the corner".into()];
        let mut second = Session::new(campaign.id, 2, "The road north is dark.", fixed_now());
        second.location = Some("Triboar Trail".into());
        repo.save(&second).await.unwrap();
        repo.save(&first).await.unwrap();

        let latest = repo.latest_for_campaign(campaign.id).await.unwrap().unwrap();
        assert_eq!(latest, second);

        let all = repo.list_for_campaign(campaign.id).await.unwrap();
        assert_eq!(all, vec![first.clone(), second]);
        assert_eq!(repo.get(first.id).await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn duplicate_session_number_is_constraint_violation() {
        let (_dir, pool) = test_pool().await;
        let campaign = seed_campaign(&pool, "The Lost Mine").await;
        let repo = SqliteSessionRepo::new(pool);

        repo.save(&Session::new(campaign.id, 1, "One", fixed_now()))
            .await
            .unwrap();
        let err = repo
            .save(&Session::new(campaign.id, 1, "Also one", fixed_now()))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn empty_campaign_has_no_latest_session() {
        let (_dir, pool) = test_pool().await;
        let campaign = seed_campaign(&pool, "Fresh").await;
        let repo = SqliteSessionRepo::new(pool);
        assert!(repo.latest_for_campaign(campaign.id).await.unwrap().is_none());
    }
}
