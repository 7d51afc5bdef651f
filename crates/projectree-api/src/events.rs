use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use projectree_types::api::{Claims, CreateEventRequest, DeleteEventRequest, EventResponse};

use crate::auth::AppState;
use crate::convert::event_response;
use crate::error::{ApiError, ApiJson, run_blocking};

pub async fn create_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<CreateEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::bad_request("title is required"));
    }

    let event_id = Uuid::new_v4();
    let db = state.clone();
    let uid = claims.sub.to_string();
    let starts_at = req.starts_at.to_rfc3339();
    run_blocking(move || {
        db.db.insert_event(
            &event_id.to_string(),
            &uid,
            &req.title,
            req.description.as_deref(),
            req.location.as_deref(),
            &starts_at,
        )?;
        Ok(())
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": event_id, "success": true })),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsQuery {
    pub user_id: Option<Uuid>,
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
    Extension(_claims): Extension<Claims>,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    let db = state.clone();
    let owner = query.user_id.map(|id| id.to_string());
    let rows = run_blocking(move || Ok(db.db.list_events(owner.as_deref())?)).await?;

    Ok(Json(rows.iter().map(event_response).collect()))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<DeleteEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let uid = claims.sub.to_string();
    let eid = req.id.to_string();
    run_blocking(move || {
        let event = db
            .db
            .get_event(&eid)?
            .ok_or_else(|| ApiError::not_found("Event not found"))?;

        if event.user_id != uid {
            return Err(ApiError::Forbidden);
        }

        db.db.delete_event(&eid)?;
        Ok(())
    })
    .await?;

    Ok(Json(json!({ "success": true })))
}
