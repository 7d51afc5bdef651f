use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use projectree_db::models::MessageRow;
use projectree_types::api::{
    Claims, MarkReadRequest, MessagePageResponse, MessageResponse, SendMessageRequest,
};

use crate::auth::AppState;
use crate::convert::message_response;
use crate::error::{ApiError, ApiJson, run_blocking};

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesQuery {
    /// The conversation partner.
    pub user_id: Option<String>,
    // page/limit arrive as raw strings so a non-numeric value answers the
    // standard 400 error body instead of the framework rejection
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// One page of the pairwise history with a named partner, delivered
/// oldest-first. Side effect: every outstanding unread message from that
/// partner is marked read — all of them, not only the fetched page. Viewing
/// any page of a conversation clears the partner's unread count.
pub async fn get_messages(
    State(state): State<AppState>,
    Query(query): Query<MessagesQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<MessagePageResponse>, ApiError> {
    let partner_id = parse_user_id(query.user_id.as_deref())?;
    let page = parse_bounded(query.page.as_deref(), "page", DEFAULT_PAGE, 1, u32::MAX)?;
    let limit = parse_bounded(query.limit.as_deref(), "limit", DEFAULT_LIMIT, 1, MAX_LIMIT)?;

    let offset = (page - 1)
        .checked_mul(limit)
        .ok_or_else(|| ApiError::bad_request("page is out of range"))?;

    let db = state.clone();
    let uid = claims.sub.to_string();
    let pid = partner_id.to_string();
    let rows = run_blocking(move || {
        let rows = db.db.get_message_page(&uid, &pid, limit, offset)?;

        // Not transactional with the fetch above; a message sent between the
        // two statements can be flipped to read before the requester saw it.
        // Accepted race.
        db.db.mark_messages_read(&uid, &pid)?;

        Ok(rows)
    })
    .await?;

    let (rows, has_more) = shape_page(rows, limit);
    let messages: Vec<MessageResponse> = rows.iter().map(message_response).collect();

    Ok(Json(MessagePageResponse { messages, page, has_more }))
}

/// Turns one newest-first fetch into the delivered page. A page that exactly
/// fills `limit` is assumed to have more history, even when the next page
/// would come back empty. Known imprecision, kept on purpose.
fn shape_page(mut rows: Vec<MessageRow>, limit: u32) -> (Vec<MessageRow>, bool) {
    let has_more = rows.len() as u32 == limit;

    // Fetched newest-first for the OFFSET walk; delivered oldest-first.
    rows.reverse();
    (rows, has_more)
}

pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.content.trim().is_empty() {
        return Err(ApiError::bad_request("content is required"));
    }
    if req.receiver_id == claims.sub {
        return Err(ApiError::bad_request("Cannot message yourself"));
    }

    let message_id = Uuid::new_v4();
    let db = state.clone();
    let sender = claims.sub.to_string();
    let receiver = req.receiver_id.to_string();
    let content = req.content.clone();
    run_blocking(move || {
        if db.db.get_user_by_id(&receiver)?.is_none() {
            return Err(ApiError::not_found("Recipient not found"));
        }
        db.db.insert_message(&message_id.to_string(), &sender, &receiver, &content)?;
        Ok(())
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            id: message_id,
            sender_id: claims.sub,
            receiver_id: req.receiver_id,
            content: req.content,
            read: false,
            created_at: chrono::Utc::now(),
        }),
    ))
}

/// Explicit acknowledgement: clears every unread message from the named
/// partner without fetching a page.
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<MarkReadRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let uid = claims.sub.to_string();
    let pid = req.user_id.to_string();
    let updated = run_blocking(move || Ok(db.db.mark_messages_read(&uid, &pid)?)).await?;

    Ok(Json(json!({ "updated": updated })))
}

fn parse_user_id(raw: Option<&str>) -> Result<Uuid, ApiError> {
    let raw = raw.ok_or_else(|| ApiError::bad_request("userId is required"))?;
    raw.parse().map_err(|_| ApiError::bad_request("userId is not a valid id"))
}

fn parse_bounded(
    raw: Option<&str>,
    name: &str,
    default: u32,
    min: u32,
    max: u32,
) -> Result<u32, ApiError> {
    let value = match raw {
        None => default,
        Some(s) => s
            .parse::<u32>()
            .map_err(|_| ApiError::bad_request(format!("{name} must be an integer")))?,
    };
    if value < min || value > max {
        return Err(ApiError::bad_request(format!("{name} must be between {min} and {max}")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT, parse_bounded, parse_user_id, shape_page};
    use projectree_db::models::MessageRow;

    fn row(id: &str) -> MessageRow {
        MessageRow {
            id: id.to_string(),
            sender_id: "a".to_string(),
            receiver_id: "b".to_string(),
            content: format!("msg {id}"),
            read: None,
            created_at: "2026-01-01 10:00:00".to_string(),
        }
    }

    #[test]
    fn page_is_delivered_oldest_first() {
        // fetched newest-first
        let rows = vec![row("m3"), row("m2"), row("m1")];
        let (rows, _) = shape_page(rows, 50);
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["m1", "m2", "m3"]);
    }

    #[test]
    fn exact_fill_reports_more_even_when_history_ends() {
        let rows = vec![row("m2"), row("m1")];
        let (_, has_more) = shape_page(rows, 2);
        assert!(has_more);
    }

    #[test]
    fn partial_fill_reports_no_more() {
        let (_, has_more) = shape_page(vec![row("m1")], 2);
        assert!(!has_more);

        let (rows, has_more) = shape_page(vec![], 2);
        assert!(rows.is_empty());
        assert!(!has_more);
    }

    #[test]
    fn pagination_defaults_apply_when_absent() {
        assert_eq!(parse_bounded(None, "page", DEFAULT_PAGE, 1, u32::MAX).unwrap(), 1);
        assert_eq!(parse_bounded(None, "limit", DEFAULT_LIMIT, 1, MAX_LIMIT).unwrap(), 50);
    }

    #[test]
    fn out_of_bounds_pagination_is_rejected() {
        assert!(parse_bounded(Some("0"), "page", DEFAULT_PAGE, 1, u32::MAX).is_err());
        assert!(parse_bounded(Some("0"), "limit", DEFAULT_LIMIT, 1, MAX_LIMIT).is_err());
        assert!(parse_bounded(Some("101"), "limit", DEFAULT_LIMIT, 1, MAX_LIMIT).is_err());
        assert!(parse_bounded(Some("100"), "limit", DEFAULT_LIMIT, 1, MAX_LIMIT).is_ok());
    }

    #[test]
    fn non_numeric_pagination_is_rejected() {
        assert!(parse_bounded(Some("abc"), "page", DEFAULT_PAGE, 1, u32::MAX).is_err());
        assert!(parse_bounded(Some("1.5"), "page", DEFAULT_PAGE, 1, u32::MAX).is_err());
        assert!(parse_bounded(Some("-1"), "page", DEFAULT_PAGE, 1, u32::MAX).is_err());
    }

    #[test]
    fn partner_id_is_required_and_validated() {
        assert!(parse_user_id(None).is_err());
        assert!(parse_user_id(Some("not-a-uuid")).is_err());
        assert!(parse_user_id(Some("00000000-0000-0000-0000-000000000001")).is_ok());
    }
}
