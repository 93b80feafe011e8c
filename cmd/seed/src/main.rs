//! # Seed Binary
//!
//! Populates a Quillpost backend with demo posts, comments and claps,
//! strictly through the regular ContentService contract. Additive: running
//! it twice adds another batch of posts.
//!
//! Environment:
//! - `DATABASE_URL`     SQLite url, defaults to `sqlite:quillpost.db`
//! - `SEED_BACKEND`     set to `memory` for a dry run against the map store
//! - `SEED_POST_COUNT`  number of posts to create, defaults to 15

use std::sync::Arc;

use anyhow::Context;
use qp_core::models::{NewComment, NewPost};
use qp_db_sqlite::{connect, SqliteCommentStore, SqlitePostStore};
use qp_service::ContentService;
use qp_store_memory::{MemoryCommentStore, MemoryPostStore};

const DEFAULT_POST_COUNT: usize = 15;
const DEFAULT_DATABASE_URL: &str = "sqlite:quillpost.db";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let post_count = match std::env::var("SEED_POST_COUNT") {
        Ok(raw) => raw
            .parse::<usize>()
            .context("SEED_POST_COUNT must be a non-negative integer")?,
        Err(_) => DEFAULT_POST_COUNT,
    };

    let service = match std::env::var("SEED_BACKEND").as_deref() {
        Ok("memory") => {
            log::info!("seeding an in-memory backend (dry run)");
            ContentService::new(
                Arc::new(MemoryPostStore::new()),
                Arc::new(MemoryCommentStore::new()),
            )
        }
        _ => {
            let url = std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
            log::info!("seeding {url}");
            let pool = connect(&url).await?;
            ContentService::new(
                Arc::new(SqlitePostStore::new(pool.clone())),
                Arc::new(SqliteCommentStore::new(pool)),
            )
        }
    };

    seed(&service, post_count).await?;

    let summaries = service.list_posts().await?;
    let comment_total: i64 = summaries.iter().map(|s| s.comment_count).sum();
    log::info!(
        "backend now holds {} posts and {} comments",
        summaries.len(),
        comment_total
    );
    Ok(())
}

/// Creates `post_count` posts, then attaches a deterministic spread of
/// comments and claps to posts that have none yet.
async fn seed(service: &ContentService, post_count: usize) -> anyhow::Result<()> {
    for i in 0..post_count {
        service
            .create_post(NewPost::new(
                format!("author{i}"),
                format!("Post number {i}"),
                format!(
                    "This is the body of post number {i}. It rambles on long \
                     enough to exercise the preview truncation in list views."
                ),
            ))
            .await?;
    }
    log::info!("created {post_count} posts");

    // Ids are store-assigned, so fetch them back through the listing.
    for summary in service.list_posts().await? {
        if summary.comment_count == 0 {
            for c in 0..(summary.id % 4) {
                service
                    .create_comment(
                        summary.id,
                        NewComment::new(format!("commenter{c}"), format!("Reply number {c}")),
                    )
                    .await?;
            }
        }
        if summary.clap_count == 0 {
            for _ in 0..(summary.id % 5) {
                service.clap_post(summary.id).await?;
            }
        }
    }
    log::info!("attached demo comments and claps");
    Ok(())
}
