//! Startup seeding of sample posts

use chrono::Utc;
use resource_shaping::prelude::*;

use crate::post::{Post, PostFilter};

/// Number of posts written into an empty store
pub const SEED_POST_COUNT: usize = 8;

const SEED_AUTHOR: &str = "Dave";

/// Write the sample posts when the store is empty
///
/// Each failed attempt is logged and retried after `config.retry_delay()`,
/// up to `config.max_retries` attempts in total.
///
/// # Errors
///
/// Returns [`Error::SeedExhausted`] once every attempt has failed.
pub async fn seed<S>(store: &S, config: &SeedConfig) -> Result<()>
where
    S: Storage<i32, Post, PostFilter>,
{
    let attempts = config.max_retries.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        match try_seed(store).await {
            Ok(0) => {
                tracing::debug!("Store already holds posts, skipping seed");
                return Ok(());
            }
            Ok(added) => {
                tracing::info!(added, attempt, "Seeded sample posts");
                return Ok(());
            }
            Err(err) => {
                tracing::error!(
                    attempt,
                    max_retries = attempts,
                    error = %err,
                    "Seeding posts failed"
                );
                last_error = err.to_string();
                if attempt < attempts {
                    tokio::time::sleep(config.retry_delay()).await;
                }
            }
        }
    }

    Err(Error::SeedExhausted {
        attempts,
        last_error,
    })
}

async fn try_seed<S>(store: &S) -> Result<usize>
where
    S: Storage<i32, Post, PostFilter>,
{
    if store.count(&PostFilter::default()).await? > 0 {
        return Ok(0);
    }

    let now = Utc::now();
    for n in 1..=SEED_POST_COUNT {
        store
            .add(Post {
                id: 0,
                title: format!("Post Title {n}"),
                body: format!("Post Body {n}"),
                author: SEED_AUTHOR.to_string(),
                last_modified: now,
                remark: None,
            })
            .await?;
    }

    if !store.commit().await? {
        return Err(Error::SaveFailed("seed posts".to_string()));
    }
    Ok(SEED_POST_COUNT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryPostStore;

    fn quick(max_retries: u32) -> SeedConfig {
        SeedConfig {
            max_retries,
            retry_delay_ms: 1,
        }
    }

    #[tokio::test]
    async fn test_seeds_empty_store() {
        let store = InMemoryPostStore::new();
        seed(&store.unit_of_work(), &quick(3)).await.unwrap();
        assert_eq!(store.len().await, SEED_POST_COUNT);

        let first = store.get(1).await.unwrap();
        assert_eq!(first.title, "Post Title 1");
        assert_eq!(first.body, "Post Body 1");
        assert_eq!(first.author, "Dave");
    }

    #[tokio::test]
    async fn test_second_seed_is_noop() {
        let store = InMemoryPostStore::new();
        seed(&store.unit_of_work(), &quick(3)).await.unwrap();
        seed(&store.unit_of_work(), &quick(3)).await.unwrap();
        assert_eq!(store.len().await, SEED_POST_COUNT);
    }

    #[tokio::test]
    async fn test_retries_after_failed_commit() {
        let store = InMemoryPostStore::new();
        store.fail_next_commits(2);
        seed(&store.unit_of_work(), &quick(3)).await.unwrap();
        assert_eq!(store.len().await, SEED_POST_COUNT);
    }

    #[tokio::test]
    async fn test_exhaustion_is_reported() {
        let store = InMemoryPostStore::new();
        store.fail_next_commits(5);
        let err = seed(&store.unit_of_work(), &quick(3)).await.unwrap_err();
        assert!(matches!(err, Error::SeedExhausted { attempts: 3, .. }));
        assert!(store.is_empty().await);
    }
}
