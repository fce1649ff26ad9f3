//! Ordered-chain maintenance.
//!
//! Columns within a project and tasks within a column are ordered by a
//! `child_id` pointer to the next sibling instead of a position column. The
//! [`ChainManager`] performs the pointer surgery for every structural change
//! through a [`ChainStore`], which is expected to be bound to a single
//! transaction holding the container lock for the whole operation.

mod order;

#[cfg(test)]
mod memory;

use async_trait::async_trait;

pub use order::{order_chain, verify_chain, ChainLink, ChainViolation, OrderedChain};

use crate::error::CoreError;
use crate::types::DbId;

/// Store access needed by the chain manager, scoped to one entity kind.
#[async_trait]
pub trait ChainStore: Send {
    type Item: ChainLink + Clone + Send + Sync;
    /// Field values for a new member, everything except scope and pointer.
    type Draft: Send;

    /// Entity name used in error messages (`"Column"`, `"Task"`).
    fn entity(&self) -> &'static str;

    async fn find(&mut self, id: DbId) -> Result<Option<Self::Item>, CoreError>;

    /// The member of `scope` whose `child_id` is null, ignoring `exclude`.
    async fn find_tail(
        &mut self,
        scope: DbId,
        exclude: Option<DbId>,
    ) -> Result<Option<Self::Item>, CoreError>;

    /// The member of `scope` whose `child_id` equals `id`.
    async fn find_predecessor(
        &mut self,
        scope: DbId,
        id: DbId,
    ) -> Result<Option<Self::Item>, CoreError>;

    /// Every member of `scope`, in store order.
    async fn list(&mut self, scope: DbId) -> Result<Vec<Self::Item>, CoreError>;

    /// Insert a new member of `scope` with a null `child_id`.
    async fn insert(&mut self, scope: DbId, draft: Self::Draft) -> Result<Self::Item, CoreError>;

    async fn set_child(&mut self, id: DbId, child_id: Option<DbId>) -> Result<(), CoreError>;

    /// Move a member to another container without touching its pointer.
    async fn set_scope(&mut self, id: DbId, scope: DbId) -> Result<(), CoreError>;

    async fn delete(&mut self, id: DbId) -> Result<(), CoreError>;
}

/// Chain operations shared by columns and tasks.
pub struct ChainManager;

impl ChainManager {
    /// Members of `scope` head to tail, degrading to store order when the
    /// chain is malformed.
    pub async fn list_ordered<S: ChainStore>(
        store: &mut S,
        scope: DbId,
    ) -> Result<OrderedChain<S::Item>, CoreError> {
        let items = store.list(scope).await?;
        Ok(order_chain(items))
    }

    /// Insert a new member as the tail of `scope`.
    pub async fn append_tail<S: ChainStore>(
        store: &mut S,
        scope: DbId,
        draft: S::Draft,
    ) -> Result<S::Item, CoreError> {
        let tail = store.find_tail(scope, None).await?;
        let item = store.insert(scope, draft).await?;
        if let Some(tail) = tail {
            store.set_child(tail.id(), Some(item.id())).await?;
        }
        Ok(item)
    }

    /// Close the gap left by `item`. Returns the relinked predecessor.
    ///
    /// The pointer surgery works on the stored row, so a stale `item` copy
    /// cannot relink the predecessor to an outdated successor.
    pub async fn detach<S: ChainStore>(
        store: &mut S,
        item: &S::Item,
    ) -> Result<Option<S::Item>, CoreError> {
        let current = Self::reload(store, item.id()).await?;
        let predecessor = store
            .find_predecessor(current.scope_id(), current.id())
            .await?;
        if let Some(pred) = &predecessor {
            store.set_child(pred.id(), current.child_id()).await?;
        }
        Ok(predecessor)
    }

    /// Move `item` so it directly precedes `new_next`, or becomes the tail
    /// when `new_next` is `None`. `in_scope` decides whether the target may
    /// be linked to `item`.
    pub async fn reposition<S, V>(
        store: &mut S,
        item: &S::Item,
        new_next: Option<DbId>,
        in_scope: V,
    ) -> Result<(), CoreError>
    where
        S: ChainStore,
        V: Fn(&S::Item) -> bool + Send + Sync,
    {
        let item = &Self::reload(store, item.id()).await?;
        if new_next == item.child_id() {
            return Ok(());
        }
        if let Some(next_id) = new_next {
            Self::check_target(store, item.id(), next_id, &in_scope).await?;
        }
        Self::splice(store, item, new_next).await
    }

    /// Move `item` into another container, appending it as the tail and then
    /// positioning it before `new_next` when given.
    pub async fn relocate<S, V>(
        store: &mut S,
        item: &S::Item,
        new_scope: DbId,
        new_next: Option<DbId>,
        in_scope: V,
    ) -> Result<S::Item, CoreError>
    where
        S: ChainStore,
        V: Fn(&S::Item) -> bool + Send + Sync,
    {
        let item = &Self::reload(store, item.id()).await?;
        if new_scope == item.scope_id() {
            Self::reposition(store, item, new_next, in_scope).await?;
            return Self::reload(store, item.id()).await;
        }
        if let Some(next_id) = new_next {
            Self::check_target(store, item.id(), next_id, &in_scope).await?;
        }

        Self::detach(store, item).await?;
        let tail = store.find_tail(new_scope, None).await?;
        store.set_scope(item.id(), new_scope).await?;
        store.set_child(item.id(), None).await?;
        if let Some(tail) = tail {
            store.set_child(tail.id(), Some(item.id())).await?;
        }

        let moved = Self::reload(store, item.id()).await?;
        if new_next.is_some() {
            Self::splice(store, &moved, new_next).await?;
            return Self::reload(store, item.id()).await;
        }
        Ok(moved)
    }

    /// Unlink `item` and delete it.
    pub async fn remove<S: ChainStore>(store: &mut S, item: &S::Item) -> Result<(), CoreError> {
        let item = &Self::reload(store, item.id()).await?;
        Self::detach(store, item).await?;
        store.delete(item.id()).await
    }

    async fn check_target<S, V>(
        store: &mut S,
        item_id: DbId,
        next_id: DbId,
        in_scope: &V,
    ) -> Result<(), CoreError>
    where
        S: ChainStore,
        V: Fn(&S::Item) -> bool + Send + Sync,
    {
        if next_id == item_id {
            return Err(CoreError::Validation(format!(
                "{} {item_id} cannot precede itself",
                store.entity()
            )));
        }
        let entity = store.entity();
        let next = store
            .find(next_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity,
                id: next_id,
            })?;
        if !in_scope(&next) {
            return Err(CoreError::Validation(format!(
                "{entity} {next_id} belongs to a different container"
            )));
        }
        Ok(())
    }

    /// Detach `item` and relink it before `new_next` within its own scope.
    async fn splice<S: ChainStore>(
        store: &mut S,
        item: &S::Item,
        new_next: Option<DbId>,
    ) -> Result<(), CoreError> {
        Self::detach(store, item).await?;

        let new_predecessor = match new_next {
            Some(next_id) => store.find_predecessor(item.scope_id(), next_id).await?,
            None => store.find_tail(item.scope_id(), Some(item.id())).await?,
        };
        if let Some(pred) = new_predecessor {
            store.set_child(pred.id(), Some(item.id())).await?;
        }
        store.set_child(item.id(), new_next).await
    }

    async fn reload<S: ChainStore>(store: &mut S, id: DbId) -> Result<S::Item, CoreError> {
        let entity = store.entity();
        store
            .find(id)
            .await?
            .ok_or(CoreError::NotFound { entity, id })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use uuid::Uuid;

    use super::memory::{MemoryChain, Node};
    use super::*;

    fn same_scope(item: &Node) -> impl Fn(&Node) -> bool + Send + Sync {
        let scope = item.scope;
        move |other: &Node| other.scope == scope
    }

    async fn build(store: &mut MemoryChain, scope: DbId, titles: &[&str]) -> Vec<Node> {
        let mut nodes = Vec::new();
        for title in titles {
            nodes.push(
                ChainManager::append_tail(store, scope, title.to_string())
                    .await
                    .unwrap(),
            );
        }
        nodes
    }

    async fn titles(store: &mut MemoryChain, scope: DbId) -> Vec<String> {
        let ordered = ChainManager::list_ordered(store, scope).await.unwrap();
        assert!(ordered.violation.is_none());
        assert_eq!(verify_chain(&ordered.items), Ok(()));
        ordered.items.into_iter().map(|n| n.title).collect()
    }

    #[tokio::test]
    async fn append_tail_links_previous_tail() {
        let mut store = MemoryChain::default();
        let scope = Uuid::new_v4();

        let a = ChainManager::append_tail(&mut store, scope, "A".into()).await.unwrap();
        assert_eq!(a.child, None);

        let b = ChainManager::append_tail(&mut store, scope, "B".into()).await.unwrap();
        assert_eq!(b.child, None);
        assert_eq!(store.get(a.id).child, Some(b.id));

        assert_eq!(titles(&mut store, scope).await, ["A", "B"]);
    }

    #[tokio::test]
    async fn reposition_before_later_sibling() {
        let mut store = MemoryChain::default();
        let scope = Uuid::new_v4();
        let nodes = build(&mut store, scope, &["A", "B", "C"]).await;
        let a = store.get(nodes[0].id);

        ChainManager::reposition(&mut store, &a, Some(nodes[2].id), same_scope(&a))
            .await
            .unwrap();

        assert_eq!(titles(&mut store, scope).await, ["B", "A", "C"]);
    }

    #[tokio::test]
    async fn reposition_to_tail_and_head() {
        let mut store = MemoryChain::default();
        let scope = Uuid::new_v4();
        let nodes = build(&mut store, scope, &["A", "B", "C", "D"]).await;

        let b = store.get(nodes[1].id);
        ChainManager::reposition(&mut store, &b, None, same_scope(&b))
            .await
            .unwrap();
        assert_eq!(titles(&mut store, scope).await, ["A", "C", "D", "B"]);

        let d = store.get(nodes[3].id);
        ChainManager::reposition(&mut store, &d, Some(nodes[0].id), same_scope(&d))
            .await
            .unwrap();
        assert_eq!(titles(&mut store, scope).await, ["D", "A", "C", "B"]);
    }

    #[tokio::test]
    async fn reposition_to_current_next_is_noop() {
        let mut store = MemoryChain::default();
        let scope = Uuid::new_v4();
        let nodes = build(&mut store, scope, &["A", "B"]).await;
        let writes = store.writes();

        let a = store.get(nodes[0].id);
        ChainManager::reposition(&mut store, &a, Some(nodes[1].id), same_scope(&a))
            .await
            .unwrap();
        let b = store.get(nodes[1].id);
        ChainManager::reposition(&mut store, &b, None, same_scope(&b))
            .await
            .unwrap();

        assert_eq!(store.writes(), writes);
        assert_eq!(titles(&mut store, scope).await, ["A", "B"]);
    }

    #[tokio::test]
    async fn reposition_rejects_unknown_and_foreign_targets() {
        let mut store = MemoryChain::default();
        let scope = Uuid::new_v4();
        let other = Uuid::new_v4();
        let nodes = build(&mut store, scope, &["A", "B"]).await;
        let foreign = build(&mut store, other, &["X"]).await;
        let a = store.get(nodes[0].id);

        let missing = Uuid::new_v4();
        let err = ChainManager::reposition(&mut store, &a, Some(missing), same_scope(&a))
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::NotFound { id, .. } if id == missing);

        let err = ChainManager::reposition(&mut store, &a, Some(foreign[0].id), same_scope(&a))
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(_));

        let err = ChainManager::reposition(&mut store, &a, Some(a.id), same_scope(&a))
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(_));

        assert_eq!(titles(&mut store, scope).await, ["A", "B"]);
        assert_eq!(titles(&mut store, other).await, ["X"]);
    }

    #[tokio::test]
    async fn remove_relinks_predecessor() {
        let mut store = MemoryChain::default();
        let scope = Uuid::new_v4();
        let nodes = build(&mut store, scope, &["A", "B", "C"]).await;

        let b = store.get(nodes[1].id);
        ChainManager::remove(&mut store, &b).await.unwrap();

        assert!(store.find_node(b.id).is_none());
        assert_eq!(store.get(nodes[0].id).child, Some(nodes[2].id));
        assert_eq!(titles(&mut store, scope).await, ["A", "C"]);

        let c = store.get(nodes[2].id);
        ChainManager::remove(&mut store, &c).await.unwrap();
        let a = store.get(nodes[0].id);
        ChainManager::remove(&mut store, &a).await.unwrap();
        assert!(titles(&mut store, scope).await.is_empty());
    }

    #[tokio::test]
    async fn stale_copies_do_not_cut_the_chain() {
        let mut store = MemoryChain::default();
        let scope = Uuid::new_v4();
        let nodes = build(&mut store, scope, &["A", "B"]).await;
        // Captured while B was still the tail.
        let stale_b = nodes[1].clone();
        assert_eq!(stale_b.child, None);
        build(&mut store, scope, &["C", "D"]).await;

        ChainManager::remove(&mut store, &stale_b).await.unwrap();
        assert_eq!(titles(&mut store, scope).await, ["A", "C", "D"]);

        let stale_a = nodes[0].clone();
        ChainManager::reposition(&mut store, &stale_a, None, same_scope(&stale_a))
            .await
            .unwrap();
        assert_eq!(titles(&mut store, scope).await, ["C", "D", "A"]);
    }

    #[tokio::test]
    async fn relocate_moves_between_containers() {
        let mut store = MemoryChain::default();
        let source = Uuid::new_v4();
        let target = Uuid::new_v4();
        let src = build(&mut store, source, &["A", "B", "C"]).await;
        let dst = build(&mut store, target, &["X", "Y"]).await;

        let b = store.get(src[1].id);
        let moved = ChainManager::relocate(&mut store, &b, target, None, |n: &Node| {
            n.scope == target
        })
        .await
        .unwrap();
        assert_eq!(moved.scope, target);
        assert_eq!(moved.child, None);
        assert_eq!(titles(&mut store, source).await, ["A", "C"]);
        assert_eq!(titles(&mut store, target).await, ["X", "Y", "B"]);

        let a = store.get(src[0].id);
        let moved = ChainManager::relocate(&mut store, &a, target, Some(dst[1].id), |n: &Node| {
            n.scope == target
        })
        .await
        .unwrap();
        assert_eq!(moved.child, Some(dst[1].id));
        assert_eq!(titles(&mut store, source).await, ["C"]);
        assert_eq!(titles(&mut store, target).await, ["X", "A", "Y", "B"]);
    }

    #[tokio::test]
    async fn relocate_into_empty_container() {
        let mut store = MemoryChain::default();
        let source = Uuid::new_v4();
        let target = Uuid::new_v4();
        let src = build(&mut store, source, &["A"]).await;

        let a = store.get(src[0].id);
        ChainManager::relocate(&mut store, &a, target, None, |n: &Node| n.scope == target)
            .await
            .unwrap();

        assert!(titles(&mut store, source).await.is_empty());
        assert_eq!(titles(&mut store, target).await, ["A"]);
    }

    #[tokio::test]
    async fn relocate_rejects_target_outside_destination_without_side_effects() {
        let mut store = MemoryChain::default();
        let source = Uuid::new_v4();
        let target = Uuid::new_v4();
        let src = build(&mut store, source, &["A", "B"]).await;
        build(&mut store, target, &["X"]).await;

        let a = store.get(src[0].id);
        let err = ChainManager::relocate(&mut store, &a, target, Some(src[1].id), |n: &Node| {
            n.scope == target
        })
        .await
        .unwrap_err();

        assert_matches!(err, CoreError::Validation(_));
        assert_eq!(titles(&mut store, source).await, ["A", "B"]);
        assert_eq!(titles(&mut store, target).await, ["X"]);
    }

    #[tokio::test]
    async fn invariants_hold_across_mixed_operations() {
        let mut store = MemoryChain::default();
        let left = Uuid::new_v4();
        let right = Uuid::new_v4();
        let l = build(&mut store, left, &["A", "B", "C", "D", "E"]).await;
        let r = build(&mut store, right, &["V", "W"]).await;

        // Deterministic pseudo-random walk over the supported operations.
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move |bound: usize| {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            (seed % bound as u64) as usize
        };

        let all: Vec<DbId> = l.iter().chain(r.iter()).map(|n| n.id).collect();
        for _ in 0..200 {
            let id = all[next(all.len())];
            let Some(item) = store.find_node(id) else { continue };
            let scopes = [left, right];
            let dest = scopes[next(2)];
            let siblings: Vec<DbId> = store
                .nodes_in(dest)
                .into_iter()
                .filter(|n| n.id != item.id)
                .map(|n| n.id)
                .collect();
            let target = if siblings.is_empty() || next(3) == 0 {
                None
            } else {
                Some(siblings[next(siblings.len())])
            };

            ChainManager::relocate(&mut store, &item, dest, target, move |n: &Node| n.scope == dest)
                .await
                .unwrap();

            for scope in [left, right] {
                assert_eq!(verify_chain(&store.nodes_in(scope)), Ok(()));
            }
        }

        let total = store.nodes_in(left).len() + store.nodes_in(right).len();
        assert_eq!(total, all.len());
    }
}
