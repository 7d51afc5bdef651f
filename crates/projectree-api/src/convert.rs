//! Row-to-response shaping shared across handlers. SQLite hands back TEXT
//! ids and timestamps; corrupt values are logged and defaulted rather than
//! failing the whole page.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use projectree_db::models::{CommentRow, EventRow, MessageRow, ProjectRow};
use projectree_types::api::{
    CommentResponse, EventResponse, MessageResponse, ProjectResponse, UserSummary,
};

pub(crate) fn parse_id(raw: &str, context: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}': {}", context, raw, e);
        Uuid::default()
    })
}

pub(crate) fn parse_timestamp(raw: &str, context: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
            // Parse as naive UTC and convert.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on {}: {}", raw, context, e);
            DateTime::default()
        })
}

pub(crate) fn message_response(row: &MessageRow) -> MessageResponse {
    MessageResponse {
        id: parse_id(&row.id, "message id"),
        sender_id: parse_id(&row.sender_id, "sender_id"),
        receiver_id: parse_id(&row.receiver_id, "receiver_id"),
        content: row.content.clone(),
        read: row.read.unwrap_or(false),
        created_at: parse_timestamp(&row.created_at, "message"),
    }
}

pub(crate) fn project_response(row: &ProjectRow) -> ProjectResponse {
    ProjectResponse {
        id: parse_id(&row.id, "project id"),
        user_id: parse_id(&row.user_id, "project user_id"),
        title: row.title.clone(),
        description: row.description.clone(),
        link: row.link.clone(),
        image: row.image.clone(),
        created_at: parse_timestamp(&row.created_at, "project"),
    }
}

pub(crate) fn event_response(row: &EventRow) -> EventResponse {
    EventResponse {
        id: parse_id(&row.id, "event id"),
        user_id: parse_id(&row.user_id, "event user_id"),
        title: row.title.clone(),
        description: row.description.clone(),
        location: row.location.clone(),
        starts_at: parse_timestamp(&row.starts_at, "event starts_at"),
        created_at: parse_timestamp(&row.created_at, "event"),
    }
}

pub(crate) fn comment_response(row: &CommentRow) -> CommentResponse {
    CommentResponse {
        id: parse_id(&row.id, "comment id"),
        author: UserSummary {
            id: parse_id(&row.user_id, "comment user_id"),
            name: row.author_name.clone(),
            image: row.author_image.clone(),
        },
        project_id: row.project_id.as_deref().map(|id| parse_id(id, "comment project_id")),
        event_id: row.event_id.as_deref().map(|id| parse_id(id, "comment event_id")),
        content: row.content.clone(),
        created_at: parse_timestamp(&row.created_at, "comment"),
    }
}

/// Social links are stored as one JSON object column; anything unreadable
/// degrades to an empty map.
pub(crate) fn social_links(raw: Option<&str>) -> BTreeMap<String, String> {
    raw.and_then(|s| serde_json::from_str(s).ok()).unwrap_or_default()
}
