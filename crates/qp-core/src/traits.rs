//! # Storage Ports
//!
//! Any storage backend must implement these traits to be usable by the
//! content service. Stores hold no cross-entity knowledge: referential
//! integrity between posts and comments is enforced one layer up.

use crate::error::Result;
use crate::models::{Comment, NewComment, NewPost, Post};
use async_trait::async_trait;

#[cfg(feature = "testing")]
use mockall::automock;

/// Keyed persistence contract for posts.
#[cfg_attr(feature = "testing", automock)]
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Fetches a post by id, `None` if absent.
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// Returns all posts as a snapshot; mutating the result does not touch
    /// the store. Order is unspecified.
    async fn get_all(&self) -> Result<Vec<Post>>;

    /// True iff a post with the given id is currently stored.
    async fn exists(&self, id: i64) -> Result<bool>;

    /// Assigns the next id, the creation timestamp and a zero clap count,
    /// stores the record and returns it in full. Ids start at 0 and are
    /// never reused within a store instance, deletions included.
    async fn save(&self, new_post: NewPost) -> Result<Post>;

    /// Adds exactly 1 to the post's clap count. Assumes the post exists;
    /// callers check [`exists`](Self::exists) first. A missing id is a
    /// silent no-op, never a panic.
    async fn increment_clap(&self, id: i64) -> Result<()>;

    /// Removes the post. Assumes the post exists; a missing id is a no-op.
    async fn delete(&self, id: i64) -> Result<()>;
}

/// Keyed persistence contract for comments. Every operation is additionally
/// scoped by the owning post's id.
#[cfg_attr(feature = "testing", automock)]
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// All comments owned by the given post. Empty when the post has no
    /// comments or does not exist; the store does not distinguish the two.
    async fn get_by_post(&self, post_id: i64) -> Result<Vec<Comment>>;

    /// Count of comments currently owned by the given post.
    async fn count_for_post(&self, post_id: i64) -> Result<i64>;

    /// True iff the given post currently owns a comment with the given id.
    async fn exists(&self, post_id: i64, comment_id: i64) -> Result<bool>;

    /// Assigns the next comment id for this post (starting at 0, never
    /// reused within the post), the creation timestamp and a zero clap
    /// count, then stores and returns the record.
    async fn save(&self, post_id: i64, new_comment: NewComment) -> Result<Comment>;

    /// Adds exactly 1 to the comment's clap count. Assumes the comment
    /// exists. A missing id pair is a silent no-op.
    async fn increment_clap(&self, post_id: i64, comment_id: i64) -> Result<()>;

    /// Removes a single comment. Assumes the comment exists.
    async fn delete(&self, post_id: i64, comment_id: i64) -> Result<()>;

    /// Removes every comment owned by the given post.
    async fn delete_all_for_post(&self, post_id: i64) -> Result<()>;
}
