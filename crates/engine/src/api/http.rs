//! HTTP routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use everdice_domain::rules::{ConditionDefinition, SkillDefinition, CONDITIONS, SKILLS};
use everdice_domain::{
    AdventureCounts, AdventureProgress, Campaign, CampaignId, CamlTrace, Character, CharacterId,
    DiceRoll, Difficulty, DomainError, Session, SessionId, TraceEvent, TraceEventPayload,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::toolkit;
use crate::app::App;
use crate::infrastructure::ports::RepoError;
use crate::use_cases::management::{
    CreateCampaignInput, CreateCharacterInput, UpdateCampaignInput, UpdateCharacterInput,
};
use crate::use_cases::{
    AdventureStatus, CreateSessionInput, ManagementError, NarrateInput, NarrationError,
    NarrationResult, RollDiceInput, TraceError,
};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        // Characters
        .route("/api/characters", get(list_characters).post(create_character))
        .route(
            "/api/characters/{id}",
            get(get_character)
                .put(update_character)
                .delete(delete_character),
        )
        // Campaigns
        .route("/api/campaigns", get(list_campaigns).post(create_campaign))
        .route(
            "/api/campaigns/{id}",
            get(get_campaign).put(update_campaign).delete(delete_campaign),
        )
        .route("/api/campaigns/{id}/join", post(join_campaign))
        .route("/api/campaigns/{id}/characters", get(list_campaign_characters))
        // Sessions
        .route(
            "/api/campaigns/{id}/sessions",
            get(list_sessions).post(create_session),
        )
        .route("/api/sessions/{id}", get(get_session))
        // Dice
        .route("/api/campaigns/{id}/rolls", get(list_rolls).post(roll_dice))
        // Narration
        .route("/api/campaigns/{id}/narrate", post(narrate))
        // Trace and adventure progress
        .route("/api/campaigns/{id}/trace", get(get_trace))
        .route("/api/campaigns/{id}/trace/events", post(record_trace_event))
        .route(
            "/api/campaigns/{id}/adventure",
            get(get_adventure).put(set_adventure_progress),
        )
        // Rules reference
        .route("/api/rules/skills", get(list_skills))
        .route("/api/rules/conditions", get(list_conditions))
        .route("/api/rules/difficulties", get(list_difficulties))
        .merge(toolkit::routes())
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Characters
// =============================================================================

async fn list_characters(State(app): State<Arc<App>>) -> Result<Json<Vec<Character>>, ApiError> {
    let characters = app.use_cases.management.character.list().await?;
    Ok(Json(characters))
}

async fn create_character(
    State(app): State<Arc<App>>,
    Json(input): Json<CreateCharacterInput>,
) -> Result<(StatusCode, Json<Character>), ApiError> {
    let character = app.use_cases.management.character.create(input).await?;
    Ok((StatusCode::CREATED, Json(character)))
}

async fn get_character(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Character>, ApiError> {
    let character = app
        .use_cases
        .management
        .character
        .get(CharacterId::from_uuid(id))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(character))
}

async fn update_character(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateCharacterInput>,
) -> Result<Json<Character>, ApiError> {
    let character = app
        .use_cases
        .management
        .character
        .update(CharacterId::from_uuid(id), input)
        .await?;
    Ok(Json(character))
}

async fn delete_character(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app.use_cases
        .management
        .character
        .delete(CharacterId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Campaigns
// =============================================================================

async fn list_campaigns(State(app): State<Arc<App>>) -> Result<Json<Vec<Campaign>>, ApiError> {
    let campaigns = app.use_cases.management.campaign.list().await?;
    Ok(Json(campaigns))
}

async fn create_campaign(
    State(app): State<Arc<App>>,
    Json(input): Json<CreateCampaignInput>,
) -> Result<(StatusCode, Json<Campaign>), ApiError> {
    let campaign = app.use_cases.management.campaign.create(input).await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

async fn get_campaign(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Campaign>, ApiError> {
    let campaign = app
        .use_cases
        .management
        .campaign
        .get(CampaignId::from_uuid(id))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(campaign))
}

async fn update_campaign(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateCampaignInput>,
) -> Result<Json<Campaign>, ApiError> {
    let campaign = app
        .use_cases
        .management
        .campaign
        .update(CampaignId::from_uuid(id), input)
        .await?;
    Ok(Json(campaign))
}

async fn delete_campaign(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app.use_cases
        .management
        .campaign
        .delete(CampaignId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct JoinCampaignRequest {
    character_id: CharacterId,
}

async fn join_campaign(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Json(request): Json<JoinCampaignRequest>,
) -> Result<Json<Character>, ApiError> {
    let character = app
        .use_cases
        .management
        .character
        .join_campaign(CampaignId::from_uuid(id), request.character_id)
        .await?;
    Ok(Json(character))
}

async fn list_campaign_characters(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Character>>, ApiError> {
    let characters = app
        .use_cases
        .management
        .character
        .list_in_campaign(CampaignId::from_uuid(id))
        .await?;
    Ok(Json(characters))
}

// =============================================================================
// Sessions
// =============================================================================

async fn list_sessions(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Session>>, ApiError> {
    let sessions = app
        .use_cases
        .session
        .list(CampaignId::from_uuid(id))
        .await?;
    Ok(Json(sessions))
}

async fn create_session(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Json(input): Json<CreateSessionInput>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let session = app
        .use_cases
        .session
        .create(CampaignId::from_uuid(id), input)
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn get_session(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, ApiError> {
    let session = app
        .use_cases
        .session
        .get(SessionId::from_uuid(id))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(session))
}

// =============================================================================
// Dice
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct RollHistoryQuery {
    limit: Option<u32>,
}

async fn list_rolls(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Query(query): Query<RollHistoryQuery>,
) -> Result<Json<Vec<DiceRoll>>, ApiError> {
    let rolls = app
        .use_cases
        .dice
        .list(CampaignId::from_uuid(id), query.limit)
        .await?;
    Ok(Json(rolls))
}

async fn roll_dice(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Json(input): Json<RollDiceInput>,
) -> Result<(StatusCode, Json<DiceRoll>), ApiError> {
    let roll = app
        .use_cases
        .dice
        .roll(CampaignId::from_uuid(id), input)
        .await?;
    Ok((StatusCode::CREATED, Json(roll)))
}

// =============================================================================
// Narration
// =============================================================================

async fn narrate(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Json(input): Json<NarrateInput>,
) -> Result<Json<NarrationResult>, ApiError> {
    let result = app
        .use_cases
        .narrate
        .execute(CampaignId::from_uuid(id), input)
        .await?;
    Ok(Json(result))
}

// =============================================================================
// Trace and adventure
// =============================================================================

async fn get_trace(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CamlTrace>, ApiError> {
    let trace = app.use_cases.trace.get(CampaignId::from_uuid(id)).await?;
    Ok(Json(trace))
}

async fn record_trace_event(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TraceEventPayload>,
) -> Result<(StatusCode, Json<TraceEvent>), ApiError> {
    let event = app
        .use_cases
        .trace
        .record(CampaignId::from_uuid(id), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

async fn get_adventure(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<AdventureStatus>, ApiError> {
    let status = app
        .use_cases
        .adventure
        .status(CampaignId::from_uuid(id))
        .await?;
    Ok(Json(status))
}

async fn set_adventure_progress(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Json(progress): Json<AdventureProgress>,
) -> Result<Json<AdventureStatus>, ApiError> {
    let status = app
        .use_cases
        .adventure
        .set_progress(CampaignId::from_uuid(id), progress)
        .await?;
    Ok(Json(status))
}

// =============================================================================
// Rules reference
// =============================================================================

async fn list_skills() -> Json<&'static [SkillDefinition]> {
    Json(SKILLS)
}

async fn list_conditions() -> Json<&'static [ConditionDefinition]> {
    Json(CONDITIONS)
}

#[derive(Serialize)]
struct DifficultyTier {
    difficulty: Difficulty,
    requirements: AdventureCounts,
}

async fn list_difficulties() -> Json<Vec<DifficultyTier>> {
    Json(
        Difficulty::ALL
            .into_iter()
            .map(|difficulty| DifficultyTier {
                difficulty,
                requirements: difficulty.requirements(),
            })
            .collect(),
    )
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    BadRequest(String),
    Internal(String),
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response()
            }
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound { .. } => ApiError::NotFound,
            RepoError::ConstraintViolation(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound { .. } => ApiError::NotFound,
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<TraceError> for ApiError {
    fn from(e: TraceError) -> Self {
        match e {
            TraceError::CampaignNotFound(_) => ApiError::NotFound,
            TraceError::Repo(e) => e.into(),
        }
    }
}

impl From<ManagementError> for ApiError {
    fn from(e: ManagementError) -> Self {
        match e {
            ManagementError::NotFound { .. } => ApiError::NotFound,
            ManagementError::InvalidInput(msg) => ApiError::BadRequest(msg),
            ManagementError::Repo(e) => e.into(),
            ManagementError::Domain(e) => e.into(),
            ManagementError::Trace(e) => e.into(),
        }
    }
}

impl From<NarrationError> for ApiError {
    fn from(e: NarrationError) -> Self {
        match e {
            NarrationError::CampaignNotFound(_) => ApiError::NotFound,
            NarrationError::Repo(e) => e.into(),
            NarrationError::Trace(e) => e.into(),
            NarrationError::Llm(e) => ApiError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::app::test_support::test_app;
    use crate::test_fixtures::ScriptedLlm;

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let (status, bytes) = send_raw(router, request).await;
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn send_text(router: &Router, request: Request<Body>) -> (StatusCode, String) {
        let (status, bytes) = send_raw(router, request).await;
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn send_raw(router: &Router, request: Request<Body>) -> (StatusCode, axum::body::Bytes) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_req(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn router_with(llm: ScriptedLlm) -> (tempfile::TempDir, Router) {
        let (dir, app) = test_app(Arc::new(llm)).await;
        (dir, routes().with_state(app))
    }

    async fn router() -> (tempfile::TempDir, Router) {
        router_with(ScriptedLlm::replying("The road is quiet.")).await
    }

    async fn create_campaign(router: &Router, title: &str) -> String {
        let (status, body) = send(
            router,
            json_req("POST", "/api/campaigns", json!({ "title": title, "difficulty": "easy" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let (_dir, router) = router().await;
        let response = router.oneshot(get_req("/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn character_crud_and_join() {
        let (_dir, router) = router().await;
        let campaign_id = create_campaign(&router, "The Lost Mine").await;

        let (status, character) = send(
            &router,
            json_req(
                "POST",
                "/api/characters",
                json!({ "name": "Thorin", "race": "Dwarf", "class": "Fighter", "max_hp": 12 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let character_id = character["id"].as_str().unwrap().to_string();
        assert_eq!(character["hit_points"]["current"], 12);

        let (status, joined) = send(
            &router,
            json_req(
                "POST",
                &format!("/api/campaigns/{}/join", campaign_id),
                json!({ "character_id": character_id }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(joined["campaign_id"], campaign_id.as_str());

        let (_, members) = send(
            &router,
            get_req(&format!("/api/campaigns/{}/characters", campaign_id)),
        )
        .await;
        assert_eq!(members.as_array().unwrap().len(), 1);

        let (status, updated) = send(
            &router,
            json_req(
                "PUT",
                &format!("/api/characters/{}", character_id),
                json!({ "level": 5 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["level"], 5);

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/characters/{}", character_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let (status, _) = send(&router, get_req(&format!("/api/characters/{}", character_id))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_input_is_bad_request() {
        let (_dir, router) = router().await;
        let (status, _) = send(
            &router,
            json_req(
                "POST",
                "/api/characters",
                json!({ "name": "Thorin", "race": "Dwarf", "class": "Fighter", "level": 25 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let campaign_id = create_campaign(&router, "The Lost Mine").await;
        let (status, _) = send(
            &router,
            json_req(
                "POST",
                &format!("/api/campaigns/{}/rolls", campaign_id),
                json!({ "formula": "banana" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send_text(
            &router,
            json_req(
                "POST",
                &format!("/api/campaigns/{}/rolls", campaign_id),
                json!({ "formula": "1d20+2147483647" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Modifier value overflow"), "{body}");
    }

    #[tokio::test]
    async fn unknown_campaign_is_not_found() {
        let (_dir, router) = router().await;
        let missing = CampaignId::new();
        for uri in [
            format!("/api/campaigns/{}", missing),
            format!("/api/campaigns/{}/sessions", missing),
            format!("/api/campaigns/{}/trace", missing),
            format!("/api/campaigns/{}/adventure", missing),
        ] {
            let (status, _) = send(&router, get_req(&uri)).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn roll_is_stored_and_traced() {
        let (_dir, router) = router().await;
        let campaign_id = create_campaign(&router, "The Lost Mine").await;

        let (status, roll) = send(
            &router,
            json_req(
                "POST",
                &format!("/api/campaigns/{}/rolls", campaign_id),
                json!({ "formula": "2d6+1", "purpose": "Damage" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let total = roll["total"].as_i64().unwrap();
        assert!((3..=13).contains(&total));

        let (_, history) = send(
            &router,
            get_req(&format!("/api/campaigns/{}/rolls?limit=5", campaign_id)),
        )
        .await;
        assert_eq!(history.as_array().unwrap().len(), 1);

        let (_, trace) = send(&router, get_req(&format!("/api/campaigns/{}/trace", campaign_id))).await;
        assert_eq!(trace["events"][0]["id"], "evt.000001");
        assert_eq!(trace["events"][0]["payload"]["kind"], "dice_rolled");
    }

    #[tokio::test]
    async fn narrate_creates_sessions_in_order() {
        let (_dir, router) =
            router_with(ScriptedLlm::replying("Goblins burst from the brush!")).await;
        let campaign_id = create_campaign(&router, "The Lost Mine").await;
        let uri = format!("/api/campaigns/{}/narrate", campaign_id);

        let (status, first) = send(&router, json_req("POST", &uri, json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["narration"], "Goblins burst from the brush!");
        assert_eq!(first["session"]["session_number"], 1);
        assert_eq!(first["stalling"]["is_stalling"], false);

        let (_, second) = send(
            &router,
            json_req("POST", &uri, json!({ "player_action": "I draw my axe" })),
        )
        .await;
        assert_eq!(second["session"]["session_number"], 2);

        let (_, sessions) = send(
            &router,
            get_req(&format!("/api/campaigns/{}/sessions", campaign_id)),
        )
        .await;
        assert_eq!(sessions.as_array().unwrap().len(), 2);

        let (_, trace) = send(&router, get_req(&format!("/api/campaigns/{}/trace", campaign_id))).await;
        let kinds: Vec<&str> = trace["events"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["payload"]["kind"].as_str().unwrap())
            .collect();
        assert_eq!(kinds, vec!["session_started", "narration", "narration"]);
    }

    #[tokio::test]
    async fn narrate_llm_failure_is_internal_error() {
        let (_dir, router) = router_with(ScriptedLlm::failing(
            crate::infrastructure::ports::LlmError::RequestFailed("down".into()),
        ))
        .await;
        let campaign_id = create_campaign(&router, "The Lost Mine").await;

        let (status, body) = send_text(
            &router,
            json_req(
                "POST",
                &format!("/api/campaigns/{}/narrate", campaign_id),
                json!({}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("LLM request failed: down"), "{body}");
    }

    #[tokio::test]
    async fn trace_events_drive_adventure_progress() {
        let (_dir, router) = router().await;
        let campaign_id = create_campaign(&router, "The Lost Mine").await;
        let events_uri = format!("/api/campaigns/{}/trace/events", campaign_id);

        for outcome in ["success", "avoided", "failure"] {
            let (status, _) = send(
                &router,
                json_req(
                    "POST",
                    &events_uri,
                    json!({
                        "kind": "encounter_resolved",
                        "data": { "name": "Wolves", "encounter_type": "combat", "outcome": outcome }
                    }),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, status) = send(
            &router,
            get_req(&format!("/api/campaigns/{}/adventure", campaign_id)),
        )
        .await;
        assert_eq!(status["progress"]["combat_encounters"], 2);
        assert_eq!(status["completion"]["difficulty"], "easy");
        assert_eq!(status["completion"]["remaining"]["combat_encounters"], 0);
        assert_eq!(status["completion"]["is_complete"], false);

        let (code, replaced) = send(
            &router,
            json_req(
                "PUT",
                &format!("/api/campaigns/{}/adventure", campaign_id),
                serde_json::to_value(Difficulty::Easy.requirements()).unwrap(),
            ),
        )
        .await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(replaced["completion"]["is_complete"], true);
        assert_eq!(replaced["completion"]["percent_complete"], 100);
    }

    #[tokio::test]
    async fn rules_reference_lists() {
        let (_dir, router) = router().await;

        let (_, skills) = send(&router, get_req("/api/rules/skills")).await;
        assert_eq!(skills.as_array().unwrap().len(), 18);

        let (_, conditions) = send(&router, get_req("/api/rules/conditions")).await;
        assert_eq!(conditions.as_array().unwrap().len(), 15);

        let (_, tiers) = send(&router, get_req("/api/rules/difficulties")).await;
        assert_eq!(tiers[3]["difficulty"], "deadly");
        assert_eq!(tiers[3]["requirements"]["combat_encounters"], 6);
    }
}
