use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use projectree_types::api::{
    Claims, CreateProjectRequest, DeleteProjectRequest, ProjectResponse,
};

use crate::auth::AppState;
use crate::convert::project_response;
use crate::error::{ApiError, ApiJson, run_blocking};

pub async fn create_project(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<CreateProjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::bad_request("title is required"));
    }

    let project_id = Uuid::new_v4();
    let db = state.clone();
    let uid = claims.sub.to_string();
    let title = req.title.clone();
    run_blocking(move || {
        db.db.insert_project(
            &project_id.to_string(),
            &uid,
            &title,
            req.description.as_deref(),
            req.link.as_deref(),
            req.image.as_deref(),
        )?;
        Ok(())
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": project_id, "success": true })),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProjectsQuery {
    pub user_id: Option<Uuid>,
}

pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ListProjectsQuery>,
    Extension(_claims): Extension<Claims>,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    let db = state.clone();
    let owner = query.user_id.map(|id| id.to_string());
    let rows = run_blocking(move || Ok(db.db.list_projects(owner.as_deref())?)).await?;

    Ok(Json(rows.iter().map(project_response).collect()))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<DeleteProjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let uid = claims.sub.to_string();
    let pid = req.id.to_string();
    run_blocking(move || {
        let project = db
            .db
            .get_project(&pid)?
            .ok_or_else(|| ApiError::not_found("Project not found"))?;

        if project.user_id != uid {
            return Err(ApiError::Forbidden);
        }

        db.db.delete_project(&pid)?;
        Ok(())
    })
    .await?;

    Ok(Json(json!({ "success": true })))
}
