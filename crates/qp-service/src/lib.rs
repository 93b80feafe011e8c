//! # qp-service
//!
//! The content service: the single entry point callers use to read and
//! mutate posts and comments. It enforces referential integrity between the
//! two stores (a comment cannot exist without its post), guards required
//! fields, and derives the list-view projection.
//!
//! Every operation is a self-contained check-then-act sequence; the service
//! holds no state beyond the injected store instances.

use std::sync::Arc;

use log::debug;
use qp_core::error::{AppError, Result};
use qp_core::models::{Comment, NewComment, NewPost, Post, PostSummary};
use qp_core::traits::{CommentStore, PostStore};

/// Maximum number of characters of a post body shown in list views.
const PREVIEW_MAX_LENGTH: usize = 50;

pub struct ContentService {
    posts: Arc<dyn PostStore>,
    comments: Arc<dyn CommentStore>,
}

impl ContentService {
    /// Creates a service over the given store instances. Stores are injected
    /// once at process start; there is no process-wide singleton state.
    pub fn new(posts: Arc<dyn PostStore>, comments: Arc<dyn CommentStore>) -> Self {
        Self { posts, comments }
    }

    async fn check_post_exists(&self, post_id: i64) -> Result<()> {
        if !self.posts.exists(post_id).await? {
            return Err(AppError::PostNotFound(post_id));
        }
        Ok(())
    }

    async fn check_comment_exists(&self, post_id: i64, comment_id: i64) -> Result<()> {
        if !self.comments.exists(post_id, comment_id).await? {
            return Err(AppError::CommentNotFound {
                post_id,
                comment_id,
            });
        }
        Ok(())
    }

    /// Lists every post as a summary: the body truncated to a preview and
    /// the comment count recomputed from the comment store.
    pub async fn list_posts(&self) -> Result<Vec<PostSummary>> {
        let posts = self.posts.get_all().await?;

        let mut summaries = Vec::with_capacity(posts.len());
        for post in posts {
            let comment_count = self.comments.count_for_post(post.id).await?;
            summaries.push(PostSummary {
                id: post.id,
                author: post.author,
                title: post.title,
                preview: body_preview(&post.body),
                clap_count: post.clap_count,
                comment_count,
                date_created: post.date_created,
            });
        }
        Ok(summaries)
    }

    /// Returns the full post record.
    pub async fn get_post(&self, post_id: i64) -> Result<Post> {
        self.posts
            .get_by_id(post_id)
            .await?
            .ok_or(AppError::PostNotFound(post_id))
    }

    /// Returns the (possibly empty) comment list of an existing post.
    pub async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        self.check_post_exists(post_id).await?;
        self.comments.get_by_post(post_id).await
    }

    pub async fn create_post(&self, new_post: NewPost) -> Result<()> {
        require_non_empty("author", &new_post.author)?;
        require_non_empty("title", &new_post.title)?;
        require_non_empty("body", &new_post.body)?;

        let post = self.posts.save(new_post).await?;
        debug!("created post {}", post.id);
        Ok(())
    }

    /// Creates a comment under an existing post. The comment store is never
    /// touched when the post is missing.
    pub async fn create_comment(&self, post_id: i64, new_comment: NewComment) -> Result<()> {
        self.check_post_exists(post_id).await?;
        require_non_empty("author", &new_comment.author)?;
        require_non_empty("body", &new_comment.body)?;

        let comment = self.comments.save(post_id, new_comment).await?;
        debug!("created comment {} under post {}", comment.id, post_id);
        Ok(())
    }

    pub async fn clap_post(&self, post_id: i64) -> Result<()> {
        self.check_post_exists(post_id).await?;
        self.posts.increment_clap(post_id).await
    }

    pub async fn clap_comment(&self, post_id: i64, comment_id: i64) -> Result<()> {
        self.check_post_exists(post_id).await?;
        self.check_comment_exists(post_id, comment_id).await?;
        self.comments.increment_clap(post_id, comment_id).await
    }

    /// Deletes a post and everything it owns. Comments go first so an
    /// interruption between the two steps can never leave comments
    /// referencing a missing post.
    pub async fn delete_post(&self, post_id: i64) -> Result<()> {
        self.check_post_exists(post_id).await?;

        self.comments.delete_all_for_post(post_id).await?;
        self.posts.delete(post_id).await?;
        debug!("deleted post {post_id} and its comments");
        Ok(())
    }

    pub async fn delete_comment(&self, post_id: i64, comment_id: i64) -> Result<()> {
        self.check_post_exists(post_id).await?;
        self.check_comment_exists(post_id, comment_id).await?;
        self.comments.delete(post_id, comment_id).await
    }
}

/// First [`PREVIEW_MAX_LENGTH`] characters of the body, or the whole body if
/// it is shorter. Counted in characters so a multi-byte code point can never
/// be split.
fn body_preview(body: &str) -> String {
    body.chars().take(PREVIEW_MAX_LENGTH).collect()
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}
