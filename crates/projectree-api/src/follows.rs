use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use projectree_types::api::{Claims, FollowRequest, FollowStatusResponse};

use crate::auth::AppState;
use crate::error::{ApiError, ApiJson, run_blocking};

pub async fn create_follow(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<FollowRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.following_id == claims.sub {
        return Err(ApiError::bad_request("Cannot follow yourself"));
    }

    let follow_id = Uuid::new_v4();
    let db = state.clone();
    let follower = claims.sub.to_string();
    let following = req.following_id.to_string();
    run_blocking(move || {
        if db.db.get_user_by_id(&following)?.is_none() {
            return Err(ApiError::not_found("User not found"));
        }
        if db.db.is_following(&follower, &following)? {
            return Err(ApiError::conflict("Already following this user"));
        }
        db.db.insert_follow(&follow_id.to_string(), &follower, &following)?;
        Ok(())
    })
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "success": true }))))
}

pub async fn delete_follow(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<FollowRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let follower = claims.sub.to_string();
    let following = req.following_id.to_string();
    let removed = run_blocking(move || Ok(db.db.delete_follow(&follower, &following)?)).await?;

    if !removed {
        return Err(ApiError::not_found("Not following this user"));
    }
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowStatusQuery {
    pub following_id: Option<String>,
}

pub async fn follow_status(
    State(state): State<AppState>,
    Query(query): Query<FollowStatusQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<FollowStatusResponse>, ApiError> {
    let following: Uuid = query
        .following_id
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("followingId is required"))?
        .parse()
        .map_err(|_| ApiError::bad_request("followingId is not a valid id"))?;

    let db = state.clone();
    let follower = claims.sub.to_string();
    let following = following.to_string();
    let is_following =
        run_blocking(move || Ok(db.db.is_following(&follower, &following)?)).await?;

    Ok(Json(FollowStatusResponse { is_following }))
}
