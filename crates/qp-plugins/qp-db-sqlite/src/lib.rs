//! # qp-db-sqlite
//!
//! Durable SQLite implementation of the storage ports, mapping between the
//! relational schema and the `qp-core` domain models.
//!
//! Post ids come from a persistent sequence row so a deleted id is never
//! handed out again; comment ids come from a per-post counter column on the
//! owning post, bumped in the same transaction as the comment insert.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use qp_core::error::{AppError, Result};
use qp_core::models::{Comment, NewComment, NewPost, Post};
use qp_core::traits::{CommentStore, PostStore};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

const SCHEMA: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS posts (
        id              INTEGER PRIMARY KEY,
        author          TEXT    NOT NULL,
        title           TEXT    NOT NULL,
        body            TEXT    NOT NULL,
        clap_count      INTEGER NOT NULL DEFAULT 0,
        next_comment_id INTEGER NOT NULL DEFAULT 0,
        date_created    TEXT    NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS comments (
        post_id      INTEGER NOT NULL REFERENCES posts (id),
        comment_id   INTEGER NOT NULL,
        author       TEXT    NOT NULL,
        body         TEXT    NOT NULL,
        clap_count   INTEGER NOT NULL DEFAULT 0,
        date_created TEXT    NOT NULL,
        PRIMARY KEY (post_id, comment_id)
    )",
    "CREATE TABLE IF NOT EXISTS id_sequences (
        name    TEXT PRIMARY KEY,
        next_id INTEGER NOT NULL
    )",
    "INSERT OR IGNORE INTO id_sequences (name, next_id) VALUES ('posts', 0)",
];

/// Opens a pool against the given SQLite URL and prepares the schema.
///
/// Foreign keys are enabled on every connection. A `:memory:` database
/// exists per connection, so the pool is capped at one connection there to
/// make every handle see the same data.
pub async fn connect(url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)
        .map_err(AppError::storage)?
        .create_if_missing(true)
        .foreign_keys(true);

    let max_connections = if url.contains(":memory:") { 1 } else { 5 };
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .map_err(AppError::storage)?;

    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .map_err(AppError::storage)?;
    }

    log::debug!("sqlite schema ready at {url}");
    Ok(pool)
}

fn row_to_post(row: &SqliteRow) -> Post {
    Post {
        id: row.get("id"),
        author: row.get("author"),
        title: row.get("title"),
        body: row.get("body"),
        clap_count: row.get("clap_count"),
        date_created: row.get("date_created"),
    }
}

fn row_to_comment(row: &SqliteRow) -> Comment {
    Comment {
        id: row.get("comment_id"),
        post_id: row.get("post_id"),
        author: row.get("author"),
        body: row.get("body"),
        clap_count: row.get("clap_count"),
        date_created: row.get("date_created"),
    }
}

/// SQLite-backed [`PostStore`]. Shares its pool with the comment store.
pub struct SqlitePostStore {
    pool: SqlitePool,
}

impl SqlitePostStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for SqlitePostStore {
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        let row = sqlx::query(
            "SELECT id, author, title, body, clap_count, date_created \
             FROM posts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::storage)?;

        Ok(row.as_ref().map(row_to_post))
    }

    async fn get_all(&self) -> Result<Vec<Post>> {
        let rows = sqlx::query(
            "SELECT id, author, title, body, clap_count, date_created \
             FROM posts ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::storage)?;

        Ok(rows.iter().map(row_to_post).collect())
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::storage)?;

        Ok(row.is_some())
    }

    /// Allocates the next post id from the sequence row and inserts the
    /// record, both inside one transaction. The single-statement
    /// `UPDATE ... RETURNING` allocation cannot hand the same id to two
    /// concurrent writers.
    async fn save(&self, new_post: NewPost) -> Result<Post> {
        let mut tx = self.pool.begin().await.map_err(AppError::storage)?;

        let id: i64 = sqlx::query(
            "UPDATE id_sequences SET next_id = next_id + 1 \
             WHERE name = 'posts' RETURNING next_id - 1 AS id",
        )
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::storage)?
        .get("id");

        let date_created = Utc::now();
        sqlx::query(
            "INSERT INTO posts (id, author, title, body, date_created) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&new_post.author)
        .bind(&new_post.title)
        .bind(&new_post.body)
        .bind(date_created)
        .execute(&mut *tx)
        .await
        .map_err(AppError::storage)?;

        tx.commit().await.map_err(AppError::storage)?;

        Ok(Post {
            id,
            author: new_post.author,
            title: new_post.title,
            body: new_post.body,
            clap_count: 0,
            date_created,
        })
    }

    async fn increment_clap(&self, id: i64) -> Result<()> {
        // One atomic statement; no read-modify-write round trip to lose.
        sqlx::query("UPDATE posts SET clap_count = clap_count + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::storage)?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::storage)?;
        Ok(())
    }
}

/// SQLite-backed [`CommentStore`].
pub struct SqliteCommentStore {
    pool: SqlitePool,
}

impl SqliteCommentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentStore for SqliteCommentStore {
    async fn get_by_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT post_id, comment_id, author, body, clap_count, date_created \
             FROM comments WHERE post_id = ? ORDER BY comment_id",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::storage)?;

        Ok(rows.iter().map(row_to_comment).collect())
    }

    async fn count_for_post(&self, post_id: i64) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM comments WHERE post_id = ?")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::storage)?;

        Ok(row.get("n"))
    }

    async fn exists(&self, post_id: i64, comment_id: i64) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM comments WHERE post_id = ? AND comment_id = ?")
            .bind(post_id)
            .bind(comment_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::storage)?;

        Ok(row.is_some())
    }

    /// Bumps the owning post's comment counter and inserts the comment in
    /// one transaction, so the assigned id is unique within the post even
    /// under concurrent writers.
    async fn save(&self, post_id: i64, new_comment: NewComment) -> Result<Comment> {
        let mut tx = self.pool.begin().await.map_err(AppError::storage)?;

        let row = sqlx::query(
            "UPDATE posts SET next_comment_id = next_comment_id + 1 \
             WHERE id = ? RETURNING next_comment_id - 1 AS comment_id",
        )
        .bind(post_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::storage)?;

        // The service checks post existence before calling save; a post that
        // vanished in between surfaces as a storage error, never as an
        // orphaned comment.
        let comment_id: i64 = match row {
            Some(row) => row.get("comment_id"),
            None => {
                return Err(AppError::storage(format!(
                    "cannot number a comment for missing post {post_id}"
                )))
            }
        };

        let date_created = Utc::now();
        sqlx::query(
            "INSERT INTO comments (post_id, comment_id, author, body, date_created) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(post_id)
        .bind(comment_id)
        .bind(&new_comment.author)
        .bind(&new_comment.body)
        .bind(date_created)
        .execute(&mut *tx)
        .await
        .map_err(AppError::storage)?;

        tx.commit().await.map_err(AppError::storage)?;

        Ok(Comment {
            id: comment_id,
            post_id,
            author: new_comment.author,
            body: new_comment.body,
            clap_count: 0,
            date_created,
        })
    }

    async fn increment_clap(&self, post_id: i64, comment_id: i64) -> Result<()> {
        sqlx::query(
            "UPDATE comments SET clap_count = clap_count + 1 \
             WHERE post_id = ? AND comment_id = ?",
        )
        .bind(post_id)
        .bind(comment_id)
        .execute(&self.pool)
        .await
        .map_err(AppError::storage)?;
        Ok(())
    }

    async fn delete(&self, post_id: i64, comment_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM comments WHERE post_id = ? AND comment_id = ?")
            .bind(post_id)
            .bind(comment_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::storage)?;
        Ok(())
    }

    async fn delete_all_for_post(&self, post_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM comments WHERE post_id = ?")
            .bind(post_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::storage)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn stores() -> (SqlitePostStore, SqliteCommentStore) {
        let pool = connect("sqlite::memory:").await.expect("connect");
        (
            SqlitePostStore::new(pool.clone()),
            SqliteCommentStore::new(pool),
        )
    }

    #[tokio::test]
    async fn test_save_and_get_roundtrip() {
        let (posts, _) = stores().await;

        let saved = posts
            .save(NewPost::new("ada", "Hello", "First post."))
            .await
            .expect("save post");
        assert_eq!(saved.id, 0);
        assert_eq!(saved.clap_count, 0);

        let loaded = posts.get_by_id(saved.id).await.unwrap().expect("post exists");
        assert_eq!(loaded, saved);
        assert!(posts.exists(saved.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_post_ids_survive_deletion_of_the_maximum() {
        let (posts, _) = stores().await;

        posts.save(NewPost::new("a", "t", "b")).await.unwrap();
        let second = posts.save(NewPost::new("a", "t", "b")).await.unwrap();
        posts.delete(second.id).await.unwrap();

        let third = posts.save(NewPost::new("a", "t", "b")).await.unwrap();
        assert_eq!(third.id, 2);
    }

    #[tokio::test]
    async fn test_comment_numbering_is_per_post_and_transactional() {
        let (posts, comments) = stores().await;

        let first = posts.save(NewPost::new("a", "t", "b")).await.unwrap();
        let second = posts.save(NewPost::new("a", "t", "b")).await.unwrap();

        let c1 = comments.save(first.id, NewComment::new("x", "y")).await.unwrap();
        let c2 = comments.save(second.id, NewComment::new("x", "y")).await.unwrap();
        let c3 = comments.save(first.id, NewComment::new("x", "z")).await.unwrap();

        assert_eq!(c1.id, 0);
        assert_eq!(c2.id, 0);
        assert_eq!(c3.id, 1);
        assert_eq!(comments.count_for_post(first.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_clap_updates_are_atomic_statements() {
        let (posts, comments) = stores().await;

        let post = posts.save(NewPost::new("a", "t", "b")).await.unwrap();
        let comment = comments.save(post.id, NewComment::new("x", "y")).await.unwrap();

        for _ in 0..3 {
            posts.increment_clap(post.id).await.unwrap();
        }
        comments.increment_clap(post.id, comment.id).await.unwrap();

        assert_eq!(posts.get_by_id(post.id).await.unwrap().unwrap().clap_count, 3);
        assert_eq!(comments.get_by_post(post.id).await.unwrap()[0].clap_count, 1);
    }

    #[tokio::test]
    async fn test_delete_all_for_post_clears_only_that_post() {
        let (posts, comments) = stores().await;

        let keep = posts.save(NewPost::new("a", "t", "b")).await.unwrap();
        let doomed = posts.save(NewPost::new("a", "t", "b")).await.unwrap();
        comments.save(keep.id, NewComment::new("x", "y")).await.unwrap();
        comments.save(doomed.id, NewComment::new("x", "y")).await.unwrap();

        comments.delete_all_for_post(doomed.id).await.unwrap();
        posts.delete(doomed.id).await.unwrap();

        assert_eq!(comments.count_for_post(keep.id).await.unwrap(), 1);
        assert!(comments.get_by_post(doomed.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_saving_a_comment_for_a_missing_post_is_a_storage_error() {
        let (_, comments) = stores().await;

        let err = comments
            .save(99, NewComment::new("x", "y"))
            .await
            .expect_err("no post to own the comment");
        assert!(matches!(err, AppError::Storage(_)));
    }
}
