use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use projectree_types::api::{SearchResponse, UserSearchHit};

use crate::auth::AppState;
use crate::convert::{event_response, parse_id, project_response};
use crate::error::{ApiError, run_blocking};

const RESULT_CAP: u32 = 20;
const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Cross-entity search over projects, events and users. Public; queries
/// under two characters come back empty rather than erroring.
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let q = query.q.as_deref().unwrap_or("").trim().to_string();
    if q.chars().count() < MIN_QUERY_CHARS {
        return Ok(Json(SearchResponse {
            projects: vec![],
            events: vec![],
            users: vec![],
        }));
    }

    let db = state.clone();
    let (projects, events, users) = run_blocking(move || {
        let projects = db.db.search_projects(&q, RESULT_CAP)?;
        let events = db.db.search_events(&q, RESULT_CAP)?;
        let users = db.db.search_users(&q, RESULT_CAP)?;
        Ok((projects, events, users))
    })
    .await?;

    Ok(Json(SearchResponse {
        projects: projects.iter().map(project_response).collect(),
        events: events.iter().map(event_response).collect(),
        users: users
            .iter()
            .map(|u| UserSearchHit {
                id: parse_id(&u.id, "user id"),
                username: u.username.clone(),
                name: u.name.clone(),
                image: u.image.clone(),
            })
            .collect(),
    }))
}
