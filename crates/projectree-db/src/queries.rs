use crate::Database;
use crate::models::{
    CommentRow, ConversationScanRow, EventRow, MessageRow, ProjectRow, UserRow,
};
use anyhow::Result;
use rusqlite::Connection;

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        password_hash: &str,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, password, name, email) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, username, password_hash, name, email],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username = ?1", username))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", id))
    }

    /// True if another user already holds this username.
    pub fn username_taken_by_other(&self, username: &str, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let count: u32 = conn.query_row(
                "SELECT COUNT(*) FROM users WHERE username = ?1 AND id != ?2",
                rusqlite::params![username, user_id],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    /// Overwrites the mutable profile columns. The handler resolves partial
    /// updates against the current row before calling this.
    pub fn update_profile(
        &self,
        id: &str,
        username: Option<&str>,
        name: Option<&str>,
        bio: Option<&str>,
        image: Option<&str>,
        social_links: Option<&str>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users
                 SET username = ?2, name = ?3, bio = ?4, image = ?5, social_links = ?6,
                     updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![id, username, name, bio, image, social_links],
            )?;
            Ok(())
        })
    }

    // -- Messages --

    pub fn insert_message(
        &self,
        id: &str,
        sender_id: &str,
        receiver_id: &str,
        content: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            // read left NULL (unset) on insert
            conn.execute(
                "INSERT INTO messages (id, sender_id, receiver_id, content) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, sender_id, receiver_id, content],
            )?;
            Ok(())
        })
    }

    /// Full message history involving one user, most recent first, with both
    /// participants' public projections joined in. Feeds the conversation
    /// aggregation, which keeps the first-seen message per partner.
    pub fn conversation_scan(&self, user_id: &str) -> Result<Vec<ConversationScanRow>> {
        self.with_conn(|conn| query_conversation_scan(conn, user_id))
    }

    /// One page of the pairwise history, most recent first.
    pub fn get_message_page(
        &self,
        user_id: &str,
        partner_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| query_message_page(conn, user_id, partner_id, limit, offset))
    }

    /// Flips read on every unread message from `sender_id` to `receiver_id`.
    /// Not scoped to any page: viewing a conversation clears all outstanding
    /// unread from that partner. Returns the number of rows updated.
    pub fn mark_messages_read(&self, receiver_id: &str, sender_id: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE messages SET read = 1
                 WHERE sender_id = ?1 AND receiver_id = ?2 AND IFNULL(read, 0) = 0",
                rusqlite::params![sender_id, receiver_id],
            )?;
            Ok(updated)
        })
    }

    // -- Follows --

    pub fn insert_follow(&self, id: &str, follower_id: &str, following_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO follows (id, follower_id, following_id) VALUES (?1, ?2, ?3)",
                rusqlite::params![id, follower_id, following_id],
            )?;
            Ok(())
        })
    }

    /// Returns true if a follow edge was removed.
    pub fn delete_follow(&self, follower_id: &str, following_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM follows WHERE follower_id = ?1 AND following_id = ?2",
                rusqlite::params![follower_id, following_id],
            )?;
            Ok(deleted > 0)
        })
    }

    pub fn is_following(&self, follower_id: &str, following_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let count: u32 = conn.query_row(
                "SELECT COUNT(*) FROM follows WHERE follower_id = ?1 AND following_id = ?2",
                rusqlite::params![follower_id, following_id],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    pub fn follower_count(&self, user_id: &str) -> Result<u32> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM follows WHERE following_id = ?1",
                [user_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    pub fn following_count(&self, user_id: &str) -> Result<u32> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM follows WHERE follower_id = ?1",
                [user_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    // -- Comments --

    pub fn insert_comment(
        &self,
        id: &str,
        user_id: &str,
        project_id: Option<&str>,
        event_id: Option<&str>,
        content: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO comments (id, user_id, project_id, event_id, content)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, user_id, project_id, event_id, content],
            )?;
            Ok(())
        })
    }

    pub fn get_comment(&self, id: &str) -> Result<Option<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{COMMENT_SELECT} WHERE c.id = ?1"))?;
            let row = stmt.query_row([id], map_comment_row).optional()?;
            Ok(row)
        })
    }

    pub fn delete_comment(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM comments WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }

    /// Comments under one project, oldest first.
    pub fn comments_for_project(&self, project_id: &str) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| query_comments(conn, "c.project_id = ?1", project_id))
    }

    /// Comments under one event, oldest first.
    pub fn comments_for_event(&self, event_id: &str) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| query_comments(conn, "c.event_id = ?1", event_id))
    }

    // -- Projects --

    pub fn insert_project(
        &self,
        id: &str,
        user_id: &str,
        title: &str,
        description: Option<&str>,
        link: Option<&str>,
        image: Option<&str>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO projects (id, user_id, title, description, link, image)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, user_id, title, description, link, image],
            )?;
            Ok(())
        })
    }

    pub fn get_project(&self, id: &str) -> Result<Option<ProjectRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{PROJECT_SELECT} WHERE id = ?1"))?;
            let row = stmt.query_row([id], map_project_row).optional()?;
            Ok(row)
        })
    }

    /// Projects, newest first; optionally restricted to one owner.
    pub fn list_projects(&self, user_id: Option<&str>) -> Result<Vec<ProjectRow>> {
        self.with_conn(|conn| match user_id {
            Some(uid) => {
                let mut stmt = conn.prepare(&format!(
                    "{PROJECT_SELECT} WHERE user_id = ?1 ORDER BY created_at DESC"
                ))?;
                let rows = stmt
                    .query_map([uid], map_project_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(rows)
            }
            None => {
                let mut stmt =
                    conn.prepare(&format!("{PROJECT_SELECT} ORDER BY created_at DESC"))?;
                let rows = stmt
                    .query_map([], map_project_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(rows)
            }
        })
    }

    pub fn delete_project(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM projects WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }

    // -- Events --

    pub fn insert_event(
        &self,
        id: &str,
        user_id: &str,
        title: &str,
        description: Option<&str>,
        location: Option<&str>,
        starts_at: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO events (id, user_id, title, description, location, starts_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, user_id, title, description, location, starts_at],
            )?;
            Ok(())
        })
    }

    pub fn get_event(&self, id: &str) -> Result<Option<EventRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{EVENT_SELECT} WHERE id = ?1"))?;
            let row = stmt.query_row([id], map_event_row).optional()?;
            Ok(row)
        })
    }

    pub fn list_events(&self, user_id: Option<&str>) -> Result<Vec<EventRow>> {
        self.with_conn(|conn| match user_id {
            Some(uid) => {
                let mut stmt = conn.prepare(&format!(
                    "{EVENT_SELECT} WHERE user_id = ?1 ORDER BY created_at DESC"
                ))?;
                let rows = stmt
                    .query_map([uid], map_event_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(rows)
            }
            None => {
                let mut stmt = conn.prepare(&format!("{EVENT_SELECT} ORDER BY created_at DESC"))?;
                let rows = stmt
                    .query_map([], map_event_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(rows)
            }
        })
    }

    pub fn delete_event(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM events WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }

    // -- Search --

    pub fn search_projects(&self, query: &str, limit: u32) -> Result<Vec<ProjectRow>> {
        self.with_conn(|conn| {
            let pattern = like_pattern(query);
            let mut stmt = conn.prepare(&format!(
                "{PROJECT_SELECT}
                 WHERE title LIKE ?1 ESCAPE '\\' OR description LIKE ?1 ESCAPE '\\'
                 ORDER BY created_at DESC LIMIT ?2"
            ))?;
            let rows = stmt
                .query_map(rusqlite::params![pattern, limit], map_project_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn search_events(&self, query: &str, limit: u32) -> Result<Vec<EventRow>> {
        self.with_conn(|conn| {
            let pattern = like_pattern(query);
            let mut stmt = conn.prepare(&format!(
                "{EVENT_SELECT}
                 WHERE title LIKE ?1 ESCAPE '\\' OR description LIKE ?1 ESCAPE '\\'
                 ORDER BY created_at DESC LIMIT ?2"
            ))?;
            let rows = stmt
                .query_map(rusqlite::params![pattern, limit], map_event_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn search_users(&self, query: &str, limit: u32) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let pattern = like_pattern(query);
            let mut stmt = conn.prepare(&format!(
                "{USER_SELECT}
                 WHERE username LIKE ?1 ESCAPE '\\' OR name LIKE ?1 ESCAPE '\\'
                 ORDER BY username LIMIT ?2"
            ))?;
            let rows = stmt
                .query_map(rusqlite::params![pattern, limit], map_user_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

const USER_SELECT: &str = "SELECT id, username, password, name, email, image, bio, social_links, created_at, updated_at FROM users";

const PROJECT_SELECT: &str =
    "SELECT id, user_id, title, description, link, image, created_at FROM projects";

const EVENT_SELECT: &str =
    "SELECT id, user_id, title, description, location, starts_at, created_at FROM events";

const COMMENT_SELECT: &str = "SELECT c.id, c.user_id, c.project_id, c.event_id, c.content, c.created_at, u.name, u.image
     FROM comments c
     LEFT JOIN users u ON c.user_id = u.id";

fn map_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        name: row.get(3)?,
        email: row.get(4)?,
        image: row.get(5)?,
        bio: row.get(6)?,
        social_links: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn map_project_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProjectRow> {
    Ok(ProjectRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        link: row.get(4)?,
        image: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn map_event_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EventRow> {
    Ok(EventRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        location: row.get(4)?,
        starts_at: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn map_comment_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        project_id: row.get(2)?,
        event_id: row.get(3)?,
        content: row.get(4)?,
        created_at: row.get(5)?,
        author_name: row.get(6)?,
        author_image: row.get(7)?,
    })
}

fn query_user(conn: &Connection, predicate: &str, value: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("{USER_SELECT} WHERE {predicate}"))?;
    let row = stmt.query_row([value], map_user_row).optional()?;
    Ok(row)
}

fn query_conversation_scan(conn: &Connection, user_id: &str) -> Result<Vec<ConversationScanRow>> {
    // JOIN users on both sides so the aggregation never goes back for the
    // partner projection (eliminates N+1)
    let mut stmt = conn.prepare(
        "SELECT m.id, m.sender_id, m.receiver_id, m.content, m.read, m.created_at,
                s.name, s.image, r.name, r.image
         FROM messages m
         LEFT JOIN users s ON m.sender_id = s.id
         LEFT JOIN users r ON m.receiver_id = r.id
         WHERE m.sender_id = ?1 OR m.receiver_id = ?1
         ORDER BY m.created_at DESC",
    )?;

    let rows = stmt
        .query_map([user_id], |row| {
            Ok(ConversationScanRow {
                message: MessageRow {
                    id: row.get(0)?,
                    sender_id: row.get(1)?,
                    receiver_id: row.get(2)?,
                    content: row.get(3)?,
                    read: row.get(4)?,
                    created_at: row.get(5)?,
                },
                sender_name: row.get(6)?,
                sender_image: row.get(7)?,
                receiver_name: row.get(8)?,
                receiver_image: row.get(9)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_message_page(
    conn: &Connection,
    user_id: &str,
    partner_id: &str,
    limit: u32,
    offset: u32,
) -> Result<Vec<MessageRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, sender_id, receiver_id, content, read, created_at
         FROM messages
         WHERE (sender_id = ?1 AND receiver_id = ?2)
            OR (sender_id = ?2 AND receiver_id = ?1)
         ORDER BY created_at DESC
         LIMIT ?3 OFFSET ?4",
    )?;

    let rows = stmt
        .query_map(rusqlite::params![user_id, partner_id, limit, offset], |row| {
            Ok(MessageRow {
                id: row.get(0)?,
                sender_id: row.get(1)?,
                receiver_id: row.get(2)?,
                content: row.get(3)?,
                read: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_comments(conn: &Connection, predicate: &str, value: &str) -> Result<Vec<CommentRow>> {
    let mut stmt = conn.prepare(&format!(
        "{COMMENT_SELECT} WHERE {predicate} ORDER BY c.created_at ASC"
    ))?;
    let rows = stmt
        .query_map([value], map_comment_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Escapes LIKE wildcards in user input and wraps it for substring match.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("%{escaped}%")
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn seed_user(db: &Database, id: &str, username: &str, name: &str) {
        db.create_user(id, username, "hash", Some(name), None).unwrap();
    }

    /// Inserts a message with an explicit timestamp so ordering is
    /// deterministic (datetime('now') only has second granularity).
    fn seed_message(db: &Database, id: &str, sender: &str, receiver: &str, at: &str) {
        db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, sender_id, receiver_id, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, sender, receiver, format!("msg {id}"), at],
            )?;
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn conversation_scan_is_descending_with_partner_projection() {
        let db = db();
        seed_user(&db, "a", "alice", "Alice");
        seed_user(&db, "b", "bob", "Bob");

        seed_message(&db, "m1", "a", "b", "2026-01-01 10:00:00");
        seed_message(&db, "m2", "b", "a", "2026-01-01 10:00:01");
        seed_message(&db, "m3", "a", "b", "2026-01-01 10:00:02");

        let rows = db.conversation_scan("a").unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.message.id.as_str()).collect();
        assert_eq!(ids, ["m3", "m2", "m1"]);

        assert_eq!(rows[0].sender_name.as_deref(), Some("Alice"));
        assert_eq!(rows[0].receiver_name.as_deref(), Some("Bob"));
        assert_eq!(rows[1].sender_name.as_deref(), Some("Bob"));
    }

    #[test]
    fn scan_excludes_unrelated_users() {
        let db = db();
        seed_user(&db, "a", "alice", "Alice");
        seed_user(&db, "b", "bob", "Bob");
        seed_user(&db, "c", "carol", "Carol");

        seed_message(&db, "m1", "a", "b", "2026-01-01 10:00:00");
        seed_message(&db, "m2", "b", "c", "2026-01-01 10:00:01");

        let rows = db.conversation_scan("a").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].message.id, "m1");
    }

    #[test]
    fn message_page_offsets_and_limits() {
        let db = db();
        seed_user(&db, "a", "alice", "Alice");
        seed_user(&db, "b", "bob", "Bob");
        for i in 0..5 {
            seed_message(&db, &format!("m{i}"), "a", "b", &format!("2026-01-01 10:00:0{i}"));
        }

        let page = db.get_message_page("a", "b", 2, 2).unwrap();
        let ids: Vec<&str> = page.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["m2", "m1"]);

        let last = db.get_message_page("a", "b", 2, 4).unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].id, "m0");
    }

    #[test]
    fn mark_read_clears_every_unread_from_partner() {
        let db = db();
        seed_user(&db, "a", "alice", "Alice");
        seed_user(&db, "b", "bob", "Bob");
        for i in 0..3 {
            seed_message(&db, &format!("m{i}"), "b", "a", &format!("2026-01-01 10:00:0{i}"));
        }
        // a -> b stays unread for b, untouched by a's mark
        seed_message(&db, "out", "a", "b", "2026-01-01 10:00:03");

        let updated = db.mark_messages_read("a", "b").unwrap();
        assert_eq!(updated, 3);

        let rows = db.get_message_page("a", "b", 10, 0).unwrap();
        for row in &rows {
            if row.receiver_id == "a" {
                assert_eq!(row.read, Some(true));
            } else {
                assert_eq!(row.read, None);
            }
        }

        // idempotent: nothing left to update
        assert_eq!(db.mark_messages_read("a", "b").unwrap(), 0);
    }

    #[test]
    fn follow_edges_and_counts() {
        let db = db();
        seed_user(&db, "a", "alice", "Alice");
        seed_user(&db, "b", "bob", "Bob");
        seed_user(&db, "c", "carol", "Carol");

        db.insert_follow("f1", "a", "b").unwrap();
        db.insert_follow("f2", "c", "b").unwrap();

        assert!(db.is_following("a", "b").unwrap());
        assert!(!db.is_following("b", "a").unwrap());
        assert_eq!(db.follower_count("b").unwrap(), 2);
        assert_eq!(db.following_count("a").unwrap(), 1);

        // pair is unique
        assert!(db.insert_follow("f3", "a", "b").is_err());

        assert!(db.delete_follow("a", "b").unwrap());
        assert!(!db.delete_follow("a", "b").unwrap());
        assert_eq!(db.follower_count("b").unwrap(), 1);
    }

    #[test]
    fn comment_lookup_carries_author_projection() {
        let db = db();
        seed_user(&db, "a", "alice", "Alice");
        db.insert_project("p1", "a", "Solar tracker", None, None, None).unwrap();
        db.insert_comment("c1", "a", Some("p1"), None, "Nice!").unwrap();

        let comment = db.get_comment("c1").unwrap().unwrap();
        assert_eq!(comment.user_id, "a");
        assert_eq!(comment.project_id.as_deref(), Some("p1"));
        assert_eq!(comment.author_name.as_deref(), Some("Alice"));

        assert_eq!(db.comments_for_project("p1").unwrap().len(), 1);
        assert!(db.delete_comment("c1").unwrap());
        assert!(db.get_comment("c1").unwrap().is_none());
    }

    #[test]
    fn deleting_a_commented_project_leaves_the_comment_dangling() {
        let db = db();
        seed_user(&db, "a", "alice", "Alice");
        seed_user(&db, "b", "bob", "Bob");
        db.insert_project("p1", "a", "Solar tracker", None, None, None).unwrap();
        db.insert_comment("c1", "b", Some("p1"), None, "Nice!").unwrap();

        assert!(db.delete_project("p1").unwrap());
        assert!(db.get_project("p1").unwrap().is_none());

        // comment survives with a dangling parent id
        let comment = db.get_comment("c1").unwrap().unwrap();
        assert_eq!(comment.project_id.as_deref(), Some("p1"));
    }

    #[test]
    fn deleting_a_commented_event_leaves_the_comment_dangling() {
        let db = db();
        seed_user(&db, "a", "alice", "Alice");
        db.insert_event("e1", "a", "Hack night", None, None, "2026-02-01T18:00:00+00:00")
            .unwrap();
        db.insert_comment("c1", "a", None, Some("e1"), "See you there").unwrap();

        assert!(db.delete_event("e1").unwrap());
        assert!(db.get_event("e1").unwrap().is_none());
        assert!(db.get_comment("c1").unwrap().is_some());
    }

    #[test]
    fn search_escapes_like_wildcards() {
        let db = db();
        seed_user(&db, "a", "alice", "Alice");
        db.insert_project("p1", "a", "100% Rust", None, None, None).unwrap();
        db.insert_project("p2", "a", "100x Rust", None, None, None).unwrap();

        let hits = db.search_projects("100%", 20).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "p1");
    }

    #[test]
    fn search_users_matches_username_and_name() {
        let db = db();
        seed_user(&db, "a", "alice", "Alice Smith");
        seed_user(&db, "b", "bob", "Bob Jones");

        let by_username = db.search_users("ali", 20).unwrap();
        assert_eq!(by_username.len(), 1);
        assert_eq!(by_username[0].id, "a");

        let by_name = db.search_users("Jones", 20).unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, "b");
    }
}
