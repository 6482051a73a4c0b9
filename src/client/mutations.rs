use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use super::cache::{QueryCache, QueryKey, Snapshot};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Failed(String),
}

/// The network seam. Tests substitute a stub; real frontends wire this to
/// an HTTP client hitting the routes in `create_router`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(&self, method: &str, params: Value) -> Result<Value, TransportError>;
}

/// Mutation hooks implementing the optimistic-update protocol: cancel
/// pending refetches for every affected key, patch the cached values with
/// the anticipated server state, then run the call. On failure every
/// snapshot is restored verbatim; on success the patch stays in place.
pub struct MutationHooks<T> {
    cache: QueryCache,
    transport: T,
}

struct PendingPatches<'a> {
    cache: &'a QueryCache,
    snapshots: Vec<Snapshot>,
}

impl<'a> PendingPatches<'a> {
    fn new(cache: &'a QueryCache) -> Self {
        PendingPatches {
            cache,
            snapshots: Vec::new(),
        }
    }

    fn apply<F>(&mut self, key: &QueryKey, patch: F)
    where
        F: FnOnce(&mut Value),
    {
        // Cancel-before-patch: a refetch already in flight must not land
        // on top of the optimistic value.
        self.cache.cancel_pending(key);
        if let Some(snapshot) = self.cache.patch(key.clone(), patch) {
            self.snapshots.push(snapshot);
        }
    }

    fn rollback(self) {
        for snapshot in self.snapshots.into_iter().rev() {
            self.cache.restore(snapshot);
        }
    }

    fn commit(self) {
        // Keeping the optimistic values; snapshots are simply dropped.
    }
}

impl<T: Transport> MutationHooks<T> {
    pub fn new(cache: QueryCache, transport: T) -> Self {
        MutationHooks { cache, transport }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    async fn run(
        &self,
        patches: PendingPatches<'_>,
        method: &str,
        params: Value,
    ) -> Result<Value, TransportError> {
        match self.transport.call(method, params).await {
            Ok(response) => {
                patches.commit();
                Ok(response)
            }
            Err(e) => {
                patches.rollback();
                Err(e)
            }
        }
    }

    /// Likes a post, appending a synthetic like record for the acting user
    /// to the post's like list in every affected cached query.
    pub async fn like_post(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        affected: &[QueryKey],
    ) -> Result<Value, TransportError> {
        let mut patches = PendingPatches::new(&self.cache);
        for key in affected {
            patches.apply(key, |value| {
                with_post(value, post_id, |post| {
                    if let Some(likes) = post["likes"].as_array_mut() {
                        likes.push(json!({ "postId": post_id, "userId": user_id }));
                    }
                })
            });
        }
        self.run(patches, "post.like", json!({ "postId": post_id })).await
    }

    pub async fn unlike_post(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        affected: &[QueryKey],
    ) -> Result<Value, TransportError> {
        let mut patches = PendingPatches::new(&self.cache);
        for key in affected {
            patches.apply(key, |value| {
                with_post(value, post_id, |post| {
                    if let Some(likes) = post["likes"].as_array_mut() {
                        likes.retain(|like| like["userId"] != json!(user_id));
                    }
                })
            });
        }
        self.run(patches, "post.unlike", json!({ "postId": post_id }))
            .await
    }

    /// Casts a vote, adjusting the cached score by the anticipated delta
    /// (create, switch or undo, mirroring the server's tri-state rules).
    pub async fn cast_vote(
        &self,
        post_id: Uuid,
        vote_type: i16,
        previous: Option<i16>,
        affected: &[QueryKey],
    ) -> Result<Value, TransportError> {
        let delta = match previous {
            None => i64::from(vote_type),
            Some(prev) if prev == vote_type => -i64::from(prev),
            Some(prev) => i64::from(vote_type) - i64::from(prev),
        };
        let mut patches = PendingPatches::new(&self.cache);
        for key in affected {
            patches.apply(key, |value| {
                with_post(value, post_id, |post| {
                    if let Some(score) = post["score"].as_i64() {
                        post["score"] = json!(score + delta);
                    }
                })
            });
        }
        self.run(
            patches,
            "vote.create",
            json!({ "postId": post_id, "voteType": vote_type }),
        )
        .await
    }
}

/// Applies `f` to the cached representation of a post, whether the value is
/// the post object itself or a list containing it.
fn with_post<F>(value: &mut Value, post_id: Uuid, f: F)
where
    F: FnOnce(&mut Value),
{
    let id = json!(post_id);
    match value {
        Value::Array(items) => {
            if let Some(post) = items.iter_mut().find(|p| p["id"] == id) {
                f(post);
            }
        }
        other => {
            if other["id"] == id {
                f(other);
            }
        }
    }
}
