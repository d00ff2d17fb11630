// src/db/models/mod.rs

//! Row models for the CMS tables
//!
//! Each struct mirrors the columns the migration needs from one table and
//! carries its own queries. Table names come from a [`TablePrefix`].
//!
//! [`TablePrefix`]: crate::db::TablePrefix

mod attachment;
mod gallery;
mod post;

pub use attachment::{ATTACHED_FILE_META_KEY, Attachment};
pub use gallery::{NggGallery, NggPicture};
pub use post::Post;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{TablePrefix, schema};
    use rusqlite::Connection;
    use tempfile::NamedTempFile;

    fn create_test_db() -> (NamedTempFile, Connection, TablePrefix) {
        let temp_file = NamedTempFile::new().unwrap();
        let conn = Connection::open(temp_file.path()).unwrap();
        let prefix = TablePrefix::default();
        schema::create_tables(&conn, &prefix).unwrap();
        (temp_file, conn, prefix)
    }

    #[test]
    fn test_attachment_is_not_a_content_record() {
        let (_temp, conn, prefix) = create_test_db();

        let post_id = Post::new("post", "[singlepic=1]")
            .insert(&conn, &prefix)
            .unwrap();
        let mut attachment =
            Attachment::new(post_id, "a", "image/jpeg", "2024/05/a.jpg", "http://x/a.jpg");
        attachment.insert(&conn, &prefix).unwrap();

        // Attachments never show up in the shortcode scan, even with a
        // marker in their content column.
        conn.execute(
            &format!("UPDATE {} SET post_content = '[singlepic=2]' WHERE post_type = 'attachment'", prefix.posts()),
            [],
        )
        .unwrap();

        let found = Post::find_with_shortcode(&conn, &prefix, "%[singlepic%]%", None, 10).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, Some(post_id));
    }

    #[test]
    fn test_picture_gallery_chain() {
        let (_temp, conn, prefix) = create_test_db();

        let gid = NggGallery::new("wp-content/gallery/trip")
            .insert(&conn, &prefix)
            .unwrap();
        let pid = NggPicture::new(gid, "beach.jpg").insert(&conn, &prefix).unwrap();

        let picture = NggPicture::find_by_id(&conn, &prefix, pid).unwrap().unwrap();
        let gallery = NggGallery::find_by_id(&conn, &prefix, picture.gallery_id)
            .unwrap()
            .unwrap();
        assert_eq!(gallery.path, "wp-content/gallery/trip");
        assert_eq!(picture.filename, "beach.jpg");
    }
}
