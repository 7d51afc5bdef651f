/// Database row types — these map directly to SQLite rows.
/// Distinct from projectree-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub username: Option<String>,
    pub password: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    pub bio: Option<String>,
    pub social_links: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub struct MessageRow {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub read: Option<bool>,
    pub created_at: String,
}

/// One message with both participants' public projections joined in, as
/// produced by the full-history scan behind the conversation list. The
/// aggregation picks whichever side is the requester's counterpart.
pub struct ConversationScanRow {
    pub message: MessageRow,
    pub sender_name: Option<String>,
    pub sender_image: Option<String>,
    pub receiver_name: Option<String>,
    pub receiver_image: Option<String>,
}

pub struct CommentRow {
    pub id: String,
    pub user_id: String,
    pub project_id: Option<String>,
    pub event_id: Option<String>,
    pub content: String,
    pub created_at: String,
    pub author_name: Option<String>,
    pub author_image: Option<String>,
}

pub struct ProjectRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub link: Option<String>,
    pub image: Option<String>,
    pub created_at: String,
}

pub struct EventRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: String,
    pub created_at: String,
}
