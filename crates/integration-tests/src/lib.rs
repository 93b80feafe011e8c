//! Shared fixtures for the end-to-end suite: the same scenarios run against
//! every storage backend, since both must satisfy identical externally
//! observable semantics.

use std::sync::Arc;

use qp_core::models::{NewComment, NewPost};
use qp_db_sqlite::{connect, SqliteCommentStore, SqlitePostStore};
use qp_service::ContentService;
use qp_store_memory::{MemoryCommentStore, MemoryPostStore};

/// Content service over fresh in-memory stores.
pub fn memory_service() -> ContentService {
    ContentService::new(
        Arc::new(MemoryPostStore::new()),
        Arc::new(MemoryCommentStore::new()),
    )
}

/// Content service over a fresh, private SQLite database.
pub async fn sqlite_service() -> ContentService {
    let pool = connect("sqlite::memory:").await.expect("sqlite pool");
    ContentService::new(
        Arc::new(SqlitePostStore::new(pool.clone())),
        Arc::new(SqliteCommentStore::new(pool)),
    )
}

/// Every backend behind the contract, labeled for assertion messages.
pub async fn all_backends() -> Vec<(&'static str, ContentService)> {
    vec![
        ("memory", memory_service()),
        ("sqlite", sqlite_service().await),
    ]
}

/// Seeds `post_count` posts, each with `id % 4` comments, strictly through
/// the public create contract.
pub async fn seed_posts(service: &ContentService, post_count: i64) {
    for i in 0..post_count {
        service
            .create_post(NewPost::new(
                format!("author{i}"),
                format!("Post number {i}"),
                format!("This is the body of post number {i}. ").repeat(3),
            ))
            .await
            .expect("seed post");
    }

    for summary in service.list_posts().await.expect("list seeded posts") {
        for c in 0..(summary.id % 4) {
            service
                .create_comment(
                    summary.id,
                    NewComment::new(format!("commenter{c}"), format!("Reply {c}")),
                )
                .await
                .expect("seed comment");
        }
    }
}
