//! # qp-store-memory
//!
//! Map-backed implementation of the storage ports, used for tests and demo
//! seeding. Each store serializes every read-modify-write sequence behind a
//! single mutex, so id assignment and exists-then-mutate pairs cannot race
//! within a store instance.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use qp_core::error::{AppError, Result};
use qp_core::models::{Comment, NewComment, NewPost, Post};
use qp_core::traits::{CommentStore, PostStore};

#[derive(Default)]
struct PostsInner {
    /// Next id to hand out. Monotonic; does not rewind when posts are
    /// deleted, so an id is never reused within this store instance.
    next_id: i64,
    posts: BTreeMap<i64, Post>,
}

/// In-memory [`PostStore`].
#[derive(Default)]
pub struct MemoryPostStore {
    inner: Mutex<PostsInner>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, PostsInner>> {
        self.inner
            .lock()
            .map_err(|_| AppError::storage("post store mutex poisoned"))
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        Ok(self.lock()?.posts.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Post>> {
        Ok(self.lock()?.posts.values().cloned().collect())
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        Ok(self.lock()?.posts.contains_key(&id))
    }

    async fn save(&self, new_post: NewPost) -> Result<Post> {
        let mut inner = self.lock()?;
        let id = inner.next_id;
        inner.next_id += 1;

        let post = Post {
            id,
            author: new_post.author,
            title: new_post.title,
            body: new_post.body,
            clap_count: 0,
            date_created: Utc::now(),
        };
        inner.posts.insert(id, post.clone());
        Ok(post)
    }

    async fn increment_clap(&self, id: i64) -> Result<()> {
        if let Some(post) = self.lock()?.posts.get_mut(&id) {
            post.clap_count += 1;
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.lock()?.posts.remove(&id);
        Ok(())
    }
}

#[derive(Default)]
struct PostComments {
    /// Per-post comment numbering, starting at 0. Survives comment deletion
    /// so comment ids are never reused within a post.
    next_id: i64,
    comments: BTreeMap<i64, Comment>,
}

/// In-memory [`CommentStore`]: a map of post ids to that post's own comment
/// map, mirroring the per-post id scope.
#[derive(Default)]
pub struct MemoryCommentStore {
    inner: Mutex<HashMap<i64, PostComments>>,
}

impl MemoryCommentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<i64, PostComments>>> {
        self.inner
            .lock()
            .map_err(|_| AppError::storage("comment store mutex poisoned"))
    }
}

#[async_trait]
impl CommentStore for MemoryCommentStore {
    async fn get_by_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        Ok(self
            .lock()?
            .get(&post_id)
            .map(|entry| entry.comments.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn count_for_post(&self, post_id: i64) -> Result<i64> {
        Ok(self
            .lock()?
            .get(&post_id)
            .map_or(0, |entry| entry.comments.len() as i64))
    }

    async fn exists(&self, post_id: i64, comment_id: i64) -> Result<bool> {
        Ok(self
            .lock()?
            .get(&post_id)
            .is_some_and(|entry| entry.comments.contains_key(&comment_id)))
    }

    async fn save(&self, post_id: i64, new_comment: NewComment) -> Result<Comment> {
        let mut map = self.lock()?;
        let entry = map.entry(post_id).or_default();
        let id = entry.next_id;
        entry.next_id += 1;

        let comment = Comment {
            id,
            post_id,
            author: new_comment.author,
            body: new_comment.body,
            clap_count: 0,
            date_created: Utc::now(),
        };
        entry.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn increment_clap(&self, post_id: i64, comment_id: i64) -> Result<()> {
        if let Some(entry) = self.lock()?.get_mut(&post_id) {
            if let Some(comment) = entry.comments.get_mut(&comment_id) {
                comment.clap_count += 1;
            }
        }
        Ok(())
    }

    async fn delete(&self, post_id: i64, comment_id: i64) -> Result<()> {
        if let Some(entry) = self.lock()?.get_mut(&post_id) {
            entry.comments.remove(&comment_id);
        }
        Ok(())
    }

    async fn delete_all_for_post(&self, post_id: i64) -> Result<()> {
        // Dropping the whole entry also drops the per-post counter; that is
        // fine because post ids themselves are never reused.
        self.lock()?.remove(&post_id);
        Ok(())
    }
}
