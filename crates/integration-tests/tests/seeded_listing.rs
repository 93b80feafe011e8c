//! List-view properties over a seeded dataset, the way the demo seeder
//! populates one.

use integration_tests::{all_backends, seed_posts};

const SEED_POST_COUNT: i64 = 15;

#[tokio::test]
async fn seeded_posts_list_with_sound_summaries() {
    for (backend, service) in all_backends().await {
        seed_posts(&service, SEED_POST_COUNT).await;

        let summaries = service.list_posts().await.unwrap();
        assert_eq!(summaries.len(), SEED_POST_COUNT as usize, "backend {backend}");

        for summary in summaries {
            assert!(summary.id >= 0, "backend {backend}");
            assert!(!summary.author.is_empty(), "backend {backend}");
            assert!(!summary.title.is_empty(), "backend {backend}");
            assert!(summary.clap_count >= 0, "backend {backend}");
            assert_eq!(
                summary.comment_count,
                summary.id % 4,
                "backend {backend}: seeder attaches id % 4 comments"
            );

            // The preview is a prefix of the body, at most 50 characters and
            // never longer than the body itself.
            let body = service.get_post(summary.id).await.unwrap().body;
            assert!(
                summary.preview.chars().count() <= 50.min(body.chars().count()),
                "backend {backend}"
            );
            assert!(
                body.starts_with(&summary.preview),
                "backend {backend}"
            );
        }
    }
}

#[tokio::test]
async fn seeded_comments_carry_their_post_id() {
    for (backend, service) in all_backends().await {
        seed_posts(&service, SEED_POST_COUNT).await;

        for summary in service.list_posts().await.unwrap() {
            for comment in service.list_comments(summary.id).await.unwrap() {
                assert_eq!(comment.post_id, summary.id, "backend {backend}");
                assert!(comment.id >= 0, "backend {backend}");
                assert!(!comment.author.is_empty(), "backend {backend}");
                assert!(!comment.body.is_empty(), "backend {backend}");
                assert_eq!(comment.clap_count, 0, "backend {backend}");
            }
        }
    }
}
