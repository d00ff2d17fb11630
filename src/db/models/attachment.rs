// src/db/models/attachment.rs

//! Attachment posts: an `attachment` row in the posts table plus the
//! `_wp_attached_file` meta row pointing at the uploaded file

use crate::db::TablePrefix;
use crate::error::Result;
use rusqlite::{Connection, OptionalExtension, params};

/// Meta key holding the upload-relative file path
pub const ATTACHED_FILE_META_KEY: &str = "_wp_attached_file";

#[derive(Debug, Clone)]
pub struct Attachment {
    pub id: Option<i64>,
    /// Post the attachment belongs to
    pub parent: i64,
    pub title: String,
    pub mime_type: String,
    /// Path relative to the uploads directory, e.g. `2024/05/beach.jpg`
    pub attached_file: String,
    /// Public URL of the file
    pub guid: String,
}

impl Attachment {
    pub fn new(
        parent: i64,
        title: impl Into<String>,
        mime_type: impl Into<String>,
        attached_file: impl Into<String>,
        guid: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            parent,
            title: title.into(),
            mime_type: mime_type.into(),
            attached_file: attached_file.into(),
            guid: guid.into(),
        }
    }

    /// Insert the attachment post and its file meta row
    ///
    /// Callers wanting both rows or neither should run this in a transaction.
    pub fn insert(&mut self, conn: &Connection, prefix: &TablePrefix) -> Result<i64> {
        let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        conn.execute(
            &format!(
                "INSERT INTO {} (post_date, post_modified, post_title, post_name, post_status,
                                 post_parent, guid, post_type, post_mime_type)
                 VALUES (?1, ?1, ?2, ?3, 'inherit', ?4, ?5, 'attachment', ?6)",
                prefix.posts()
            ),
            params![
                now,
                &self.title,
                self.title.to_lowercase(),
                self.parent,
                &self.guid,
                &self.mime_type,
            ],
        )?;
        let id = conn.last_insert_rowid();

        conn.execute(
            &format!(
                "INSERT INTO {} (post_id, meta_key, meta_value) VALUES (?1, ?2, ?3)",
                prefix.postmeta()
            ),
            params![id, ATTACHED_FILE_META_KEY, &self.attached_file],
        )?;

        self.id = Some(id);
        Ok(id)
    }

    pub fn find_by_id(conn: &Connection, prefix: &TablePrefix, id: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT p.ID, p.post_parent, p.post_title, p.post_mime_type, m.meta_value, p.guid
             FROM {posts} p
             JOIN {meta} m ON m.post_id = p.ID AND m.meta_key = ?2
             WHERE p.ID = ?1 AND p.post_type = 'attachment'",
            posts = prefix.posts(),
            meta = prefix.postmeta(),
        ))?;

        let attachment = stmt
            .query_row(params![id, ATTACHED_FILE_META_KEY], |row| {
                Ok(Self {
                    id: Some(row.get(0)?),
                    parent: row.get(1)?,
                    title: row.get(2)?,
                    mime_type: row.get(3)?,
                    attached_file: row.get(4)?,
                    guid: row.get(5)?,
                })
            })
            .optional()?;
        Ok(attachment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;

    #[test]
    fn test_attachment_crud() {
        let conn = Connection::open_in_memory().unwrap();
        let prefix = TablePrefix::default();
        schema::create_tables(&conn, &prefix).unwrap();

        let mut attachment = Attachment::new(
            7,
            "Beach",
            "image/jpeg",
            "2024/05/beach.jpg",
            "https://example.com/wp-content/uploads/2024/05/beach.jpg",
        );
        let id = attachment.insert(&conn, &prefix).unwrap();
        assert_eq!(attachment.id, Some(id));

        let found = Attachment::find_by_id(&conn, &prefix, id).unwrap().unwrap();
        assert_eq!(found.parent, 7);
        assert_eq!(found.title, "Beach");
        assert_eq!(found.attached_file, "2024/05/beach.jpg");
        assert_eq!(found.mime_type, "image/jpeg");

        assert!(Attachment::find_by_id(&conn, &prefix, id + 1).unwrap().is_none());
    }
}
