use async_trait::async_trait;
use chrono::{DateTime, Utc};
use everdice_domain::trace::EventIdSequence;
use everdice_domain::{AdventureProgress, CampaignId, CamlTrace, TraceEvent, TraceEventPayload};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Row, SqlitePool};

use super::{from_json, parse_id, parse_timestamp, to_json};
use crate::infrastructure::ports::{RepoError, TraceRepo};

pub struct SqliteTraceRepo {
    pool: SqlitePool,
}

impl SqliteTraceRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_event(row: &SqliteRow) -> Result<TraceEvent, RepoError> {
    let sequence: i64 = row.get("sequence");
    let payload_json: String = row.get("payload_json");
    let timestamp: String = row.get("timestamp");

    Ok(TraceEvent {
        id: row.get("event_id"),
        sequence: u64::try_from(sequence)
            .map_err(|_| RepoError::serialization(format!("Invalid sequence {}", sequence)))?,
        timestamp: parse_timestamp(&timestamp)?,
        payload: from_json(&payload_json)?,
    })
}

fn to_sequence(value: u64) -> Result<i64, RepoError> {
    i64::try_from(value)
        .map_err(|_| RepoError::serialization(format!("Sequence {} out of range", value)))
}

#[async_trait]
impl TraceRepo for SqliteTraceRepo {
    async fn get_for_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<CamlTrace>, RepoError> {
        let Some(header) = sqlx::query(
            r#"
            SELECT trace_id, module_id, campaign_id, name, schema_version, created_at
            FROM traces
            WHERE campaign_id = ?
            "#,
        )
        .bind(campaign_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("trace.get_for_campaign", e))?
        else {
            return Ok(None);
        };

        let trace_id: String = header.get("trace_id");
        let stored_campaign: String = header.get("campaign_id");
        let created_at: String = header.get("created_at");

        let rows = sqlx::query(
            r#"
            SELECT event_id, sequence, payload_json, timestamp
            FROM trace_events
            WHERE trace_id = ?
            ORDER BY sequence ASC
            "#,
        )
        .bind(&trace_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("trace.list_events", e))?;

        let events = rows
            .iter()
            .map(row_to_event)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(CamlTrace {
            trace_id,
            module_id: header.get("module_id"),
            campaign_id: parse_id(&stored_campaign)?,
            name: header.get("name"),
            schema_version: header.get("schema_version"),
            created_at: parse_timestamp(&created_at)?,
            events,
        }))
    }

    async fn create(&self, trace: &CamlTrace) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO traces (
                trace_id, campaign_id, module_id, name, schema_version, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&trace.trace_id)
        .bind(trace.campaign_id.to_string())
        .bind(&trace.module_id)
        .bind(&trace.name)
        .bind(&trace.schema_version)
        .bind(trace.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("trace.create", e))?;

        Ok(())
    }

    async fn append_event(
        &self,
        trace_id: &str,
        payload: &TraceEventPayload,
        timestamp: DateTime<Utc>,
    ) -> Result<TraceEvent, RepoError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| RepoError::database("trace.append_event", e))?;

        // Take the write lock up front so concurrent appends queue on the
        // busy timeout instead of failing on a read-to-write upgrade.
        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut *conn)
            .await
            .map_err(|e| RepoError::database("trace.append_event", e))?;

        match append_locked(&mut *conn, trace_id, payload, timestamp).await {
            Ok(event) => {
                if let Err(e) = sqlx::query("COMMIT").execute(&mut *conn).await {
                    let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                    return Err(RepoError::database("trace.append_event", e));
                }
                Ok(event)
            }
            Err(e) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                Err(e)
            }
        }
    }
}

/// Allocate the next sequence, insert the event and fold it into the
/// campaign's adventure progress. Runs inside the caller's write transaction.
async fn append_locked(
    conn: &mut SqliteConnection,
    trace_id: &str,
    payload: &TraceEventPayload,
    timestamp: DateTime<Utc>,
) -> Result<TraceEvent, RepoError> {
    let payload_json = to_json(payload)?;

    let campaign_id: Option<String> =
        sqlx::query_scalar("SELECT campaign_id FROM traces WHERE trace_id = ?")
            .bind(trace_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| RepoError::database("trace.append_event", e))?;
    let Some(campaign_id) = campaign_id else {
        return Err(RepoError::not_found("Trace", trace_id));
    };

    let last: Option<i64> =
        sqlx::query_scalar("SELECT MAX(sequence) FROM trace_events WHERE trace_id = ?")
            .bind(trace_id)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| RepoError::database("trace.append_event", e))?;
    let last = u64::try_from(last.unwrap_or(0))
        .map_err(|_| RepoError::serialization("Negative sequence in trace_events"))?;

    let (sequence, event_id) = EventIdSequence::starting_after(last).next_id();

    sqlx::query(
        r#"
        INSERT INTO trace_events (trace_id, sequence, event_id, kind, payload_json, timestamp)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(trace_id)
    .bind(to_sequence(sequence)?)
    .bind(&event_id)
    .bind(payload.kind().as_str())
    .bind(&payload_json)
    .bind(timestamp.to_rfc3339())
    .execute(&mut *conn)
    .await
    .map_err(|e| RepoError::database("trace.append_event", e))?;

    if let Some(counter) = payload.progress_counter() {
        let stored: Option<String> = sqlx::query_scalar(
            "SELECT progress_json FROM adventure_progress WHERE campaign_id = ?",
        )
        .bind(&campaign_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| RepoError::database("trace.append_event", e))?;

        let mut progress: AdventureProgress = match stored {
            Some(json) => from_json(&json)?,
            None => AdventureProgress::default(),
        };
        progress.increment(counter);

        sqlx::query(
            r#"
            INSERT INTO adventure_progress (campaign_id, progress_json, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(campaign_id) DO UPDATE SET
                progress_json = excluded.progress_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&campaign_id)
        .bind(to_json(&progress)?)
        .bind(timestamp.to_rfc3339())
        .execute(&mut *conn)
        .await
        .map_err(|e| RepoError::database("trace.append_event", e))?;
    }

    Ok(TraceEvent {
        id: event_id,
        sequence,
        timestamp,
        payload: payload.clone(),
    })
}
