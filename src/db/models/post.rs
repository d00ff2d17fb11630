// src/db/models/post.rs

//! Post rows (`<prefix>posts` with `post_type` post or page)

use crate::db::TablePrefix;
use crate::error::{Error, Result};
use crate::migrate::{ContentRecord, RecordId, RecordKind};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

/// A content row from the posts table
#[derive(Debug, Clone)]
pub struct Post {
    pub id: Option<i64>,
    pub post_type: String,
    pub title: String,
    pub content: String,
}

impl Post {
    pub fn new(post_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            post_type: post_type.into(),
            title: String::new(),
            content: content.into(),
        }
    }

    /// Insert this post and return its id
    pub fn insert(&mut self, conn: &Connection, prefix: &TablePrefix) -> Result<i64> {
        conn.execute(
            &format!(
                "INSERT INTO {} (post_type, post_title, post_content) VALUES (?1, ?2, ?3)",
                prefix.posts()
            ),
            params![&self.post_type, &self.title, &self.content],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    pub fn find_by_id(conn: &Connection, prefix: &TablePrefix, id: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT ID, post_type, post_title, post_content FROM {} WHERE ID = ?1",
            prefix.posts()
        ))?;

        let post = stmt.query_row([id], Self::from_row).optional()?;
        Ok(post)
    }

    /// Posts and pages whose content matches `like_pattern`, ordered by id,
    /// starting after `after`
    pub fn find_with_shortcode(
        conn: &Connection,
        prefix: &TablePrefix,
        like_pattern: &str,
        after: Option<i64>,
        limit: usize,
    ) -> Result<Vec<Self>> {
        let sql = format!(
            "SELECT ID, post_type, post_title, post_content FROM {}
             WHERE post_type IN ('post', 'page')
               AND post_content LIKE ?1
               AND ID > ?2
             ORDER BY ID ASC
             LIMIT ?3",
            prefix.posts()
        );
        debug!("Querying posts like '{}' after {:?}", like_pattern, after);

        let mut stmt = conn.prepare(&sql)?;
        let posts = stmt
            .query_map(
                params![like_pattern, after.unwrap_or(i64::MIN), limit as i64],
                Self::from_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(posts)
    }

    /// Replace the content of post `id`; false when no such row exists
    pub fn update_content(
        conn: &Connection,
        prefix: &TablePrefix,
        id: i64,
        content: &str,
    ) -> Result<bool> {
        let modified = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let updated = conn.execute(
            &format!(
                "UPDATE {} SET post_content = ?1, post_modified = ?2 WHERE ID = ?3",
                prefix.posts()
            ),
            params![content, modified, id],
        )?;
        Ok(updated > 0)
    }

    /// Convert into the migration core's record type
    pub fn into_record(self) -> Result<ContentRecord> {
        let id = self
            .id
            .ok_or_else(|| Error::ParseError("post row without an id".to_string()))?;
        let kind = self
            .post_type
            .parse::<RecordKind>()
            .map_err(Error::ParseError)?;
        Ok(ContentRecord::new(RecordId(id), kind, self.content))
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            post_type: row.get(1)?,
            title: row.get(2)?,
            content: row.get(3)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;
    use tempfile::NamedTempFile;

    fn create_test_db() -> (NamedTempFile, Connection, TablePrefix) {
        let temp_file = NamedTempFile::new().unwrap();
        let conn = Connection::open(temp_file.path()).unwrap();
        let prefix = TablePrefix::default();
        schema::create_tables(&conn, &prefix).unwrap();
        (temp_file, conn, prefix)
    }

    #[test]
    fn test_post_crud() {
        let (_temp, conn, prefix) = create_test_db();

        let mut post = Post::new("page", "hello [singlepic=3]");
        post.title = "About".to_string();
        let id = post.insert(&conn, &prefix).unwrap();
        assert!(id > 0);

        let found = Post::find_by_id(&conn, &prefix, id).unwrap().unwrap();
        assert_eq!(found.title, "About");
        assert_eq!(found.post_type, "page");

        assert!(Post::update_content(&conn, &prefix, id, "hello").unwrap());
        let found = Post::find_by_id(&conn, &prefix, id).unwrap().unwrap();
        assert_eq!(found.content, "hello");

        assert!(!Post::update_content(&conn, &prefix, id + 100, "x").unwrap());
    }

    #[test]
    fn test_find_with_shortcode_filters_and_pages() {
        let (_temp, conn, prefix) = create_test_db();

        let a = Post::new("post", "[singlepic=1]").insert(&conn, &prefix).unwrap();
        Post::new("post", "plain text").insert(&conn, &prefix).unwrap();
        Post::new("revision", "[singlepic=1]").insert(&conn, &prefix).unwrap();
        let b = Post::new("page", "x [singlepic=2 w=1] y").insert(&conn, &prefix).unwrap();
        let c = Post::new("post", "[singlepic=3]").insert(&conn, &prefix).unwrap();

        let like = "%[singlepic%]%";
        let first = Post::find_with_shortcode(&conn, &prefix, like, None, 2).unwrap();
        let ids: Vec<_> = first.iter().map(|p| p.id.unwrap()).collect();
        assert_eq!(ids, vec![a, b]);

        let rest = Post::find_with_shortcode(&conn, &prefix, like, Some(b), 2).unwrap();
        let ids: Vec<_> = rest.iter().map(|p| p.id.unwrap()).collect();
        assert_eq!(ids, vec![c]);
    }

    #[test]
    fn test_into_record() {
        let (_temp, conn, prefix) = create_test_db();
        let id = Post::new("page", "body").insert(&conn, &prefix).unwrap();

        let record = Post::find_by_id(&conn, &prefix, id)
            .unwrap()
            .unwrap()
            .into_record()
            .unwrap();
        assert_eq!(record.id, RecordId(id));
        assert_eq!(record.kind, RecordKind::Page);
        assert_eq!(record.body, "body");

        let mut attachment = Post::new("attachment", "");
        attachment.id = Some(9);
        let err = attachment.into_record().unwrap_err();
        assert!(matches!(err, Error::ParseError(_)));
    }
}
