//! SQLite persistence.
//!
//! One pool shared by every repository. The schema is created on startup with
//! `CREATE TABLE IF NOT EXISTS`; ids and timestamps are stored as TEXT (UUID,
//! RFC 3339) and nested structures as JSON text.

mod adventure;
mod campaign;
mod character;
mod dice_roll;
mod session;
mod toolkit;
mod trace;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;

use crate::infrastructure::ports::{ClockPort, RepoError};

pub use adventure::SqliteAdventureRepo;
pub use campaign::SqliteCampaignRepo;
pub use character::SqliteCharacterRepo;
pub use dice_roll::SqliteDiceRollRepo;
pub use session::SqliteSessionRepo;
pub use toolkit::SqliteToolkitRepo;
pub use trace::SqliteTraceRepo;

/// How long a writer waits for the database lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Default database location when `DATABASE_URL` is unset.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:everdice.db?mode=rwc";

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS campaigns (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        setting TEXT,
        difficulty TEXT NOT NULL,
        current_location TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS characters (
        id TEXT PRIMARY KEY,
        campaign_id TEXT REFERENCES campaigns(id) ON DELETE SET NULL,
        name TEXT NOT NULL,
        race TEXT NOT NULL,
        class TEXT NOT NULL,
        background TEXT,
        level INTEGER NOT NULL,
        abilities_json TEXT NOT NULL,
        hp_current INTEGER NOT NULL,
        hp_max INTEGER NOT NULL,
        armor_class INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_characters_campaign ON characters(campaign_id)",
    r#"
    CREATE TABLE IF NOT EXISTS sessions (
        id TEXT PRIMARY KEY,
        campaign_id TEXT NOT NULL REFERENCES campaigns(id) ON DELETE CASCADE,
        session_number INTEGER NOT NULL,
        narrative TEXT NOT NULL,
        location TEXT,
        hooks_json TEXT NOT NULL,
        created_at TEXT NOT NULL,
        UNIQUE (campaign_id, session_number)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS dice_rolls (
        id TEXT PRIMARY KEY,
        campaign_id TEXT NOT NULL REFERENCES campaigns(id) ON DELETE CASCADE,
        character_id TEXT,
        character_name TEXT,
        formula TEXT NOT NULL,
        rolls_json TEXT NOT NULL,
        modifier INTEGER NOT NULL,
        total INTEGER NOT NULL,
        purpose TEXT,
        rolled_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_dice_rolls_campaign ON dice_rolls(campaign_id, rolled_at)",
    r#"
    CREATE TABLE IF NOT EXISTS toolkit_records (
        id TEXT PRIMARY KEY,
        kind TEXT NOT NULL,
        campaign_id TEXT NOT NULL REFERENCES campaigns(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        data_json TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_toolkit_kind_campaign ON toolkit_records(kind, campaign_id)",
    r#"
    CREATE TABLE IF NOT EXISTS traces (
        trace_id TEXT PRIMARY KEY,
        campaign_id TEXT NOT NULL UNIQUE REFERENCES campaigns(id) ON DELETE CASCADE,
        module_id TEXT NOT NULL,
        name TEXT NOT NULL,
        schema_version TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS trace_events (
        trace_id TEXT NOT NULL REFERENCES traces(trace_id) ON DELETE CASCADE,
        sequence INTEGER NOT NULL,
        event_id TEXT NOT NULL,
        kind TEXT NOT NULL,
        payload_json TEXT NOT NULL,
        timestamp TEXT NOT NULL,
        PRIMARY KEY (trace_id, sequence)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS adventure_progress (
        campaign_id TEXT PRIMARY KEY REFERENCES campaigns(id) ON DELETE CASCADE,
        progress_json TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
];

/// Open a pool for `database_url` (`sqlite:path?mode=rwc`, `sqlite::memory:`, ...).
pub async fn connect(database_url: &str) -> Result<SqlitePool, RepoError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| RepoError::database("connect", e))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(BUSY_TIMEOUT);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| RepoError::database("connect", e))
}

pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), RepoError> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| RepoError::database("ensure_schema", e))?;
    }
    Ok(())
}

/// All SQLite-backed repositories over one pool.
pub struct SqliteRepositories {
    pub character: Arc<SqliteCharacterRepo>,
    pub campaign: Arc<SqliteCampaignRepo>,
    pub session: Arc<SqliteSessionRepo>,
    pub dice_roll: Arc<SqliteDiceRollRepo>,
    pub toolkit: Arc<SqliteToolkitRepo>,
    pub trace: Arc<SqliteTraceRepo>,
    pub adventure: Arc<SqliteAdventureRepo>,
}

impl SqliteRepositories {
    pub fn new(pool: SqlitePool, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            character: Arc::new(SqliteCharacterRepo::new(pool.clone())),
            campaign: Arc::new(SqliteCampaignRepo::new(pool.clone())),
            session: Arc::new(SqliteSessionRepo::new(pool.clone())),
            dice_roll: Arc::new(SqliteDiceRollRepo::new(pool.clone())),
            toolkit: Arc::new(SqliteToolkitRepo::new(pool.clone())),
            trace: Arc::new(SqliteTraceRepo::new(pool.clone())),
            adventure: Arc::new(SqliteAdventureRepo::new(pool, clock)),
        }
    }
}

// =============================================================================
// Column conversion helpers
// =============================================================================

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepoError::serialization(format!("Invalid timestamp '{}': {}", value, e)))
}

pub(crate) fn parse_id<T>(value: &str) -> Result<T, RepoError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| RepoError::serialization(format!("Invalid id '{}': {}", value, e)))
}

pub(crate) fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, RepoError> {
    serde_json::to_string(value).map_err(RepoError::serialization)
}

pub(crate) fn from_json<T: serde::de::DeserializeOwned>(value: &str) -> Result<T, RepoError> {
    serde_json::from_str(value).map_err(RepoError::serialization)
}
