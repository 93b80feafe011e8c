//! # Domain Models
//!
//! These structs represent the core entities of Quillpost.
//! Identifiers are store-assigned integers: globally unique for posts,
//! scoped to the owning post for comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A top-level content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub author: String,
    pub title: String,
    pub body: String,
    /// Incremented once per "clap"; never decremented.
    pub clap_count: i64,
    /// Assigned by the store at creation time; immutable afterwards.
    pub date_created: DateTime<Utc>,
}

/// A reply attached to exactly one post.
///
/// Comment ids are only unique within the owning post: two posts may each
/// have a comment with id 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author: String,
    pub body: String,
    pub clap_count: i64,
    pub date_created: DateTime<Utc>,
}

/// Read model for post list views: carries a body preview and the derived
/// comment count instead of the full body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: i64,
    pub author: String,
    pub title: String,
    /// Prefix of the post body, at most 50 characters.
    pub preview: String,
    pub clap_count: i64,
    /// Count of comments currently owned by the post, recomputed on read.
    pub comment_count: i64,
    pub date_created: DateTime<Utc>,
}

/// Caller-supplied fields for a new post. The id, creation timestamp and
/// clap count are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPost {
    pub author: String,
    pub title: String,
    pub body: String,
}

impl NewPost {
    pub fn new(
        author: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Caller-supplied fields for a new comment. The owning post id is passed
/// separately so it can be verified before the store is touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewComment {
    pub author: String,
    pub body: String,
}

impl NewComment {
    pub fn new(author: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            body: body.into(),
        }
    }
}
