//! In-memory [`ChainStore`] used by the chain manager tests.

use async_trait::async_trait;
use uuid::Uuid;

use super::{ChainLink, ChainStore};
use crate::error::CoreError;
use crate::types::DbId;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: DbId,
    pub scope: DbId,
    pub child: Option<DbId>,
    pub title: String,
}

impl ChainLink for Node {
    fn id(&self) -> DbId {
        self.id
    }
    fn child_id(&self) -> Option<DbId> {
        self.child
    }
    fn scope_id(&self) -> DbId {
        self.scope
    }
}

/// Rows kept in insertion order, like an unordered table scan.
#[derive(Debug, Default)]
pub struct MemoryChain {
    rows: Vec<Node>,
    writes: usize,
}

impl MemoryChain {
    pub fn find_node(&self, id: DbId) -> Option<Node> {
        self.rows.iter().find(|n| n.id == id).cloned()
    }

    pub fn get(&self, id: DbId) -> Node {
        self.find_node(id).expect("node should exist")
    }

    pub fn nodes_in(&self, scope: DbId) -> Vec<Node> {
        self.rows.iter().filter(|n| n.scope == scope).cloned().collect()
    }

    /// Number of mutating calls made so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    fn row_mut(&mut self, id: DbId) -> Result<&mut Node, CoreError> {
        self.rows
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(CoreError::NotFound { entity: "Node", id })
    }
}

#[async_trait]
impl ChainStore for MemoryChain {
    type Item = Node;
    type Draft = String;

    fn entity(&self) -> &'static str {
        "Node"
    }

    async fn find(&mut self, id: DbId) -> Result<Option<Node>, CoreError> {
        Ok(self.find_node(id))
    }

    async fn find_tail(
        &mut self,
        scope: DbId,
        exclude: Option<DbId>,
    ) -> Result<Option<Node>, CoreError> {
        Ok(self
            .rows
            .iter()
            .find(|n| n.scope == scope && n.child.is_none() && Some(n.id) != exclude)
            .cloned())
    }

    async fn find_predecessor(&mut self, scope: DbId, id: DbId) -> Result<Option<Node>, CoreError> {
        Ok(self
            .rows
            .iter()
            .find(|n| n.scope == scope && n.child == Some(id))
            .cloned())
    }

    async fn list(&mut self, scope: DbId) -> Result<Vec<Node>, CoreError> {
        Ok(self.nodes_in(scope))
    }

    async fn insert(&mut self, scope: DbId, title: String) -> Result<Node, CoreError> {
        self.writes += 1;
        let node = Node {
            id: Uuid::new_v4(),
            scope,
            child: None,
            title,
        };
        self.rows.push(node.clone());
        Ok(node)
    }

    async fn set_child(&mut self, id: DbId, child_id: Option<DbId>) -> Result<(), CoreError> {
        self.writes += 1;
        self.row_mut(id)?.child = child_id;
        Ok(())
    }

    async fn set_scope(&mut self, id: DbId, scope: DbId) -> Result<(), CoreError> {
        self.writes += 1;
        self.row_mut(id)?.scope = scope;
        Ok(())
    }

    async fn delete(&mut self, id: DbId) -> Result<(), CoreError> {
        self.writes += 1;
        self.rows.retain(|n| n.id != id);
        Ok(())
    }
}
