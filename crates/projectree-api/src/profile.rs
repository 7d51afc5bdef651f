use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde_json::to_string;

use projectree_db::models::UserRow;
use projectree_types::api::{Claims, ProfileResponse, PublicProfileResponse, UpdateProfileRequest};

use crate::auth::{AppState, valid_username};
use crate::convert::{parse_id, parse_timestamp, social_links};
use crate::error::{ApiError, ApiJson, run_blocking};

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let db = state.clone();
    let uid = claims.sub.to_string();
    let (user, followers, following) = run_blocking(move || {
        let user = db
            .db
            .get_user_by_id(&uid)?
            .ok_or_else(|| ApiError::not_found("User not found"))?;
        // independent counts, no ordering dependency between them
        let followers = db.db.follower_count(&uid)?;
        let following = db.db.following_count(&uid)?;
        Ok((user, followers, following))
    })
    .await?;

    Ok(Json(profile_response(user, followers, following)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    if let Some(username) = req.username.as_deref() {
        if !valid_username(username) {
            return Err(ApiError::bad_request(
                "Username must be 3-32 characters of a-z, 0-9 or _",
            ));
        }
    }

    let db = state.clone();
    let uid = claims.sub.to_string();
    let (user, followers, following) = run_blocking(move || {
        let current = db
            .db
            .get_user_by_id(&uid)?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        if let Some(username) = req.username.as_deref() {
            if db.db.username_taken_by_other(username, &uid)? {
                return Err(ApiError::conflict("Username already taken"));
            }
        }

        // partial update: absent fields keep their current value
        let username = req.username.or(current.username);
        let name = req.name.or(current.name);
        let bio = req.bio.or(current.bio);
        let image = req.image.or(current.image);
        let social = match req.social_links {
            Some(map) => Some(
                to_string(&map)
                    .map_err(|e| ApiError::Internal(anyhow::anyhow!("social links encode: {}", e)))?,
            ),
            None => current.social_links,
        };

        db.db.update_profile(
            &uid,
            username.as_deref(),
            name.as_deref(),
            bio.as_deref(),
            image.as_deref(),
            social.as_deref(),
        )?;

        let user = db
            .db
            .get_user_by_id(&uid)?
            .ok_or_else(|| ApiError::not_found("User not found"))?;
        let followers = db.db.follower_count(&uid)?;
        let following = db.db.following_count(&uid)?;
        Ok((user, followers, following))
    })
    .await?;

    Ok(Json(profile_response(user, followers, following)))
}

/// Public profile by username; no session required.
pub async fn public_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<PublicProfileResponse>, ApiError> {
    let db = state.clone();
    let (user, followers, following) = run_blocking(move || {
        let user = db
            .db
            .get_user_by_username(&username)?
            .ok_or_else(|| ApiError::not_found("User not found"))?;
        let followers = db.db.follower_count(&user.id)?;
        let following = db.db.following_count(&user.id)?;
        Ok((user, followers, following))
    })
    .await?;

    Ok(Json(PublicProfileResponse {
        id: parse_id(&user.id, "user id"),
        username: user.username,
        name: user.name,
        image: user.image,
        bio: user.bio,
        social_links: social_links(user.social_links.as_deref()),
        followers,
        following,
    }))
}

fn profile_response(user: UserRow, followers: u32, following: u32) -> ProfileResponse {
    ProfileResponse {
        id: parse_id(&user.id, "user id"),
        username: user.username,
        name: user.name,
        email: user.email,
        image: user.image,
        bio: user.bio,
        social_links: social_links(user.social_links.as_deref()),
        followers,
        following,
        created_at: parse_timestamp(&user.created_at, "user"),
        updated_at: parse_timestamp(&user.updated_at, "user"),
    }
}
