//! DM toolkit routes: the same five endpoints mounted once per record kind.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use everdice_domain::{
    CampaignId, Encounter, InventoryItem, Location, Monster, Npc, Quest, Reward, ToolkitEntry,
    ToolkitId, ToolkitRecord,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::http::ApiError;
use crate::app::App;
use crate::use_cases::NewToolkitRecord;

pub(super) fn routes() -> Router<Arc<App>> {
    Router::new()
        .merge(kind_routes::<Monster>())
        .merge(kind_routes::<Quest>())
        .merge(kind_routes::<InventoryItem>())
        .merge(kind_routes::<Location>())
        .merge(kind_routes::<Npc>())
        .merge(kind_routes::<Encounter>())
        .merge(kind_routes::<Reward>())
}

fn kind_routes<T: ToolkitEntry>() -> Router<Arc<App>> {
    let base = format!("/api/dm-toolkit/{}", T::KIND.plural());
    Router::new()
        .route(&base, get(list_records::<T>).post(create_record::<T>))
        .route(
            &format!("{base}/{{id}}"),
            get(get_record::<T>)
                .put(update_record::<T>)
                .delete(delete_record::<T>),
        )
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    campaign_id: Option<Uuid>,
}

async fn list_records<T: ToolkitEntry>(
    State(app): State<Arc<App>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ToolkitRecord<T>>>, ApiError> {
    let records = app
        .use_cases
        .toolkit
        .crud::<T>()
        .list(query.campaign_id.map(CampaignId::from_uuid))
        .await?;
    Ok(Json(records))
}

async fn create_record<T: ToolkitEntry>(
    State(app): State<Arc<App>>,
    Json(input): Json<NewToolkitRecord<T>>,
) -> Result<(StatusCode, Json<ToolkitRecord<T>>), ApiError> {
    let record = app.use_cases.toolkit.crud::<T>().create(input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn get_record<T: ToolkitEntry>(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ToolkitRecord<T>>, ApiError> {
    let record = app
        .use_cases
        .toolkit
        .crud::<T>()
        .get(ToolkitId::from_uuid(id))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(record))
}

async fn update_record<T: ToolkitEntry>(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Json(data): Json<T>,
) -> Result<Json<ToolkitRecord<T>>, ApiError> {
    let record = app
        .use_cases
        .toolkit
        .crud::<T>()
        .update(ToolkitId::from_uuid(id), data)
        .await?;
    Ok(Json(record))
}

async fn delete_record<T: ToolkitEntry>(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app.use_cases
        .toolkit
        .crud::<T>()
        .delete(ToolkitId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
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

    async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn setup() -> (tempfile::TempDir, Router, String) {
        let (dir, app) = test_app(Arc::new(ScriptedLlm::replying("..."))).await;
        let router = crate::api::http::routes().with_state(app);
        let (_, campaign) = call(
            &router,
            "POST",
            "/api/campaigns",
            Some(json!({ "title": "Curse of Strahd" })),
        )
        .await;
        let campaign_id = campaign["id"].as_str().unwrap().to_string();
        (dir, router, campaign_id)
    }

    #[tokio::test]
    async fn monster_lifecycle() {
        let (_dir, router, campaign_id) = setup().await;

        let (status, created) = call(
            &router,
            "POST",
            "/api/dm-toolkit/monsters",
            Some(json!({
                "campaign_id": campaign_id,
                "name": "Goblin",
                "challenge_rating": "1/4",
                "armor_class": 15,
                "hit_points": 7
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["challenge_rating"], "1/4");
        let id = created["id"].as_str().unwrap().to_string();
        let uri = format!("/api/dm-toolkit/monsters/{}", id);

        let (status, updated) = call(
            &router,
            "PUT",
            &uri,
            Some(json!({ "name": "Goblin Boss", "armor_class": 17, "hit_points": 21 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "Goblin Boss");
        assert_eq!(updated["created_at"], created["created_at"]);

        let (_, listed) = call(
            &router,
            "GET",
            &format!("/api/dm-toolkit/monsters?campaign_id={}", campaign_id),
            None,
        )
        .await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (status, _) = call(&router, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&router, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn kinds_do_not_leak_into_each_other() {
        let (_dir, router, campaign_id) = setup().await;

        let (_, quest) = call(
            &router,
            "POST",
            "/api/dm-toolkit/quests",
            Some(json!({ "campaign_id": campaign_id, "title": "Find the Amulet" })),
        )
        .await;
        assert_eq!(quest["status"], "active");

        let (status, _) = call(
            &router,
            "GET",
            &format!("/api/dm-toolkit/npcs/{}", quest["id"].as_str().unwrap()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, npcs) = call(&router, "GET", "/api/dm-toolkit/npcs", None).await;
        assert!(npcs.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_or_orphaned_records_are_rejected() {
        let (_dir, router, campaign_id) = setup().await;

        let (status, _) = call(
            &router,
            "POST",
            "/api/dm-toolkit/items",
            Some(json!({ "campaign_id": campaign_id, "name": "Rope", "quantity": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &router,
            "POST",
            "/api/dm-toolkit/locations",
            Some(json!({ "campaign_id": CampaignId::new(), "name": "Barovia" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
