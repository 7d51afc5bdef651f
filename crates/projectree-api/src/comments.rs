use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use projectree_types::api::{Claims, CommentResponse, CreateCommentRequest, DeleteCommentRequest};

use crate::auth::AppState;
use crate::convert::comment_response;
use crate::error::{ApiError, ApiJson, run_blocking};

/// A comment hangs off exactly one of project/event.
#[derive(Debug, PartialEq)]
enum Parent {
    Project(String),
    Event(String),
}

fn parent_of(project_id: Option<Uuid>, event_id: Option<Uuid>) -> Result<Parent, ApiError> {
    match (project_id, event_id) {
        (Some(p), None) => Ok(Parent::Project(p.to_string())),
        (None, Some(e)) => Ok(Parent::Event(e.to_string())),
        _ => Err(ApiError::bad_request(
            "Exactly one of projectId or eventId is required",
        )),
    }
}

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.content.trim().is_empty() {
        return Err(ApiError::bad_request("content is required"));
    }
    let parent = parent_of(req.project_id, req.event_id)?;

    let comment_id = Uuid::new_v4();
    let db = state.clone();
    let uid = claims.sub.to_string();
    let comment = run_blocking(move || {
        let (project_id, event_id) = match &parent {
            Parent::Project(pid) => {
                if db.db.get_project(pid)?.is_none() {
                    return Err(ApiError::not_found("Project not found"));
                }
                (Some(pid.as_str()), None)
            }
            Parent::Event(eid) => {
                if db.db.get_event(eid)?.is_none() {
                    return Err(ApiError::not_found("Event not found"));
                }
                (None, Some(eid.as_str()))
            }
        };

        db.db.insert_comment(
            &comment_id.to_string(),
            &uid,
            project_id,
            event_id,
            &req.content,
        )?;

        db.db
            .get_comment(&comment_id.to_string())?
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("comment vanished after insert")))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(comment_response(&comment))))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<DeleteCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let uid = claims.sub.to_string();
    let cid = req.id.to_string();
    run_blocking(move || {
        let comment = db
            .db
            .get_comment(&cid)?
            .ok_or_else(|| ApiError::not_found("Comment not found"))?;

        // owner-only delete
        if comment.user_id != uid {
            return Err(ApiError::Forbidden);
        }

        db.db.delete_comment(&cid)?;
        Ok(())
    })
    .await?;

    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCommentsQuery {
    pub project_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
}

pub async fn list_comments(
    State(state): State<AppState>,
    Query(query): Query<ListCommentsQuery>,
    Extension(_claims): Extension<Claims>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let parent = parent_of(query.project_id, query.event_id)?;

    let db = state.clone();
    let rows = run_blocking(move || {
        let rows = match &parent {
            Parent::Project(pid) => db.db.comments_for_project(pid)?,
            Parent::Event(eid) => db.db.comments_for_event(eid)?,
        };
        Ok(rows)
    })
    .await?;

    Ok(Json(rows.iter().map(comment_response).collect()))
}

#[cfg(test)]
mod tests {
    use super::{Parent, parent_of};
    use uuid::Uuid;

    #[test]
    fn exactly_one_parent_is_required() {
        let id = Uuid::from_u128(7);
        assert_eq!(parent_of(Some(id), None).unwrap(), Parent::Project(id.to_string()));
        assert_eq!(parent_of(None, Some(id)).unwrap(), Parent::Event(id.to_string()));
        assert!(parent_of(None, None).is_err());
        assert!(parent_of(Some(id), Some(id)).is_err());
    }
}
