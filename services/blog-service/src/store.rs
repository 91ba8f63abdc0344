//! In-memory post storage with per-request units of work
//!
//! [`InMemoryPostStore`] holds the committed posts shared by every request.
//! Each request stages its changes in its own [`PostUnitOfWork`]; `commit`
//! validates that unit's staged changes against the current committed state
//! and applies them together. A rejected or failed commit discards only that
//! unit's staged changes.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};

use resource_shaping::prelude::*;
use tokio::sync::{Mutex, RwLock};

use crate::post::{Post, PostFilter, REMARK_MAX_LEN};

#[derive(Debug)]
enum Change {
    Add(Post),
    Update(Post),
    Remove(i32),
}

/// Post store backed by an ordered map
#[derive(Debug)]
pub struct InMemoryPostStore {
    committed: RwLock<BTreeMap<i32, Post>>,
    next_id: AtomicI32,
    failing_commits: AtomicU32,
}

impl Default for InMemoryPostStore {
    fn default() -> Self {
        Self {
            committed: RwLock::new(BTreeMap::new()),
            next_id: AtomicI32::new(1),
            failing_commits: AtomicU32::new(0),
        }
    }
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a unit of work with an empty set of staged changes
    pub fn unit_of_work(&self) -> PostUnitOfWork<'_> {
        PostUnitOfWork {
            store: self,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Make the next `count` commits report failure
    pub fn fail_next_commits(&self, count: u32) {
        self.failing_commits.store(count, Ordering::SeqCst);
    }

    /// Number of committed posts
    pub async fn len(&self) -> usize {
        self.committed.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.committed.read().await.is_empty()
    }

    /// Committed post by id
    pub async fn get(&self, id: i32) -> Option<Post> {
        self.committed.read().await.get(&id).cloned()
    }

    fn take_failure(&self) -> bool {
        self.failing_commits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

fn check_constraints(post: &Post) -> RepositoryResult<()> {
    match &post.remark {
        Some(remark) if remark.chars().count() > REMARK_MAX_LEN => Err(RepositoryError::new(
            RepositoryOperation::Commit,
            RepositoryErrorKind::ConstraintViolation,
            format!("remark exceeds {REMARK_MAX_LEN} characters"),
        )
        .with_entity("Post", post.id.to_string())),
        _ => Ok(()),
    }
}

fn check_exists(committed: &BTreeMap<i32, Post>, id: i32) -> RepositoryResult<()> {
    if committed.contains_key(&id) {
        Ok(())
    } else {
        Err(RepositoryError::not_found("Post", id.to_string()))
    }
}

/// Staged changes of one request against the shared store
///
/// Reads see committed state only.
#[derive(Debug)]
pub struct PostUnitOfWork<'a> {
    store: &'a InMemoryPostStore,
    pending: Mutex<Vec<Change>>,
}

impl PostUnitOfWork<'_> {
    /// Number of staged changes
    pub async fn pending(&self) -> usize {
        self.pending.lock().await.len()
    }
}

impl Storage<i32, Post, PostFilter> for PostUnitOfWork<'_> {
    async fn count(&self, filter: &PostFilter) -> RepositoryResult<u64> {
        let committed = self.store.committed.read().await;
        Ok(committed.values().filter(|p| filter.matches(p)).count() as u64)
    }

    async fn fetch_page(
        &self,
        filter: &PostFilter,
        sort: &[SortStep],
        pagination: Pagination,
    ) -> RepositoryResult<Vec<Post>> {
        let mut posts: Vec<Post> = {
            let committed = self.store.committed.read().await;
            committed
                .values()
                .filter(|p| filter.matches(p))
                .cloned()
                .collect()
        };
        apply_sort(&mut posts, sort, "id")?;

        let offset = usize::try_from(pagination.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(pagination.limit).unwrap_or(usize::MAX);
        Ok(posts.into_iter().skip(offset).take(limit).collect())
    }

    async fn fetch_by_id(&self, id: &i32) -> RepositoryResult<Option<Post>> {
        Ok(self.store.get(*id).await)
    }

    async fn add(&self, mut post: Post) -> RepositoryResult<Post> {
        post.id = self.store.next_id.fetch_add(1, Ordering::SeqCst);
        self.pending.lock().await.push(Change::Add(post.clone()));
        Ok(post)
    }

    async fn remove(&self, post: &Post) -> RepositoryResult<()> {
        self.pending.lock().await.push(Change::Remove(post.id));
        Ok(())
    }

    async fn mark_updated(&self, post: Post) -> RepositoryResult<()> {
        self.pending.lock().await.push(Change::Update(post));
        Ok(())
    }

    async fn commit(&self) -> RepositoryResult<bool> {
        let pending = std::mem::take(&mut *self.pending.lock().await);
        let mut committed = self.store.committed.write().await;

        if self.store.take_failure() {
            tracing::error!(discarded = pending.len(), "Commit failed");
            return Ok(false);
        }

        for change in &pending {
            match change {
                Change::Add(post) => check_constraints(post)?,
                Change::Update(post) => {
                    check_constraints(post)?;
                    check_exists(&committed, post.id)?;
                }
                Change::Remove(id) => check_exists(&committed, *id)?,
            }
        }

        let applied = pending.len();
        for change in pending {
            match change {
                Change::Add(post) | Change::Update(post) => {
                    committed.insert(post.id, post);
                }
                Change::Remove(id) => {
                    committed.remove(&id);
                }
            }
        }
        tracing::debug!(applied, total = committed.len(), "Committed changes");
        Ok(true)
    }
}
