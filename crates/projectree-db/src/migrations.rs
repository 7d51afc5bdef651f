use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id            TEXT PRIMARY KEY,
            username      TEXT UNIQUE,
            password      TEXT NOT NULL,
            name          TEXT,
            email         TEXT UNIQUE,
            image         TEXT,
            bio           TEXT,
            social_links  TEXT,
            created_at    TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at    TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- read is deliberately nullable: unset / 0 / 1 (tri-state carried
        -- over from the original data model; unset and 0 both count as unread)
        CREATE TABLE IF NOT EXISTS messages (
            id           TEXT PRIMARY KEY,
            sender_id    TEXT NOT NULL REFERENCES users(id),
            receiver_id  TEXT NOT NULL REFERENCES users(id),
            content      TEXT NOT NULL,
            read         INTEGER,
            created_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_messages_sender
            ON messages(sender_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_messages_receiver
            ON messages(receiver_id, created_at);

        CREATE TABLE IF NOT EXISTS follows (
            id            TEXT PRIMARY KEY,
            follower_id   TEXT NOT NULL REFERENCES users(id),
            following_id  TEXT NOT NULL REFERENCES users(id),
            created_at    TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(follower_id, following_id)
        );

        CREATE TABLE IF NOT EXISTS projects (
            id           TEXT PRIMARY KEY,
            user_id      TEXT NOT NULL REFERENCES users(id),
            title        TEXT NOT NULL,
            description  TEXT,
            link         TEXT,
            image        TEXT,
            created_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_projects_user
            ON projects(user_id, created_at);

        CREATE TABLE IF NOT EXISTS events (
            id           TEXT PRIMARY KEY,
            user_id      TEXT NOT NULL REFERENCES users(id),
            title        TEXT NOT NULL,
            description  TEXT,
            location     TEXT,
            starts_at    TEXT NOT NULL,
            created_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_events_user
            ON events(user_id, created_at);

        -- A comment belongs to exactly one of project/event; enforced at the
        -- handler layer, not by the schema. The parent columns carry no
        -- REFERENCES clause: deleting a project or event leaves its comments
        -- behind with dangling ids, and parent lookups answer 404 from then on.
        CREATE TABLE IF NOT EXISTS comments (
            id           TEXT PRIMARY KEY,
            user_id      TEXT NOT NULL REFERENCES users(id),
            project_id   TEXT,
            event_id     TEXT,
            content      TEXT NOT NULL,
            created_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_comments_project
            ON comments(project_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_comments_event
            ON comments(event_id, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
