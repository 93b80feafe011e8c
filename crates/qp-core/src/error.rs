//! # AppError
//!
//! Centralized error handling for the Quillpost core.
//! Callers pattern-match the variants instead of comparing messages.

use thiserror::Error;

/// The primary error type for all qp-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Referenced post does not exist.
    #[error("no post with ID {0} exists")]
    PostNotFound(i64),

    /// Referenced comment does not exist under the given post.
    #[error("no comment with ID {comment_id} exists under post {post_id}")]
    CommentNotFound { post_id: i64, comment_id: i64 },

    /// A required field is missing or empty.
    #[error("validation error: {0}")]
    Validation(String),

    /// The underlying backend could not complete an operation
    /// (connectivity, constraint violation).
    #[error("storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Wraps a backend failure, keeping the driver's message.
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }
}

/// A specialized Result type for Quillpost logic.
pub type Result<T> = std::result::Result<T, AppError>;
