//! Chain traversal and integrity checks.
//!
//! These functions work on an already-loaded snapshot of one container and
//! never touch the store.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::types::DbId;

/// A sibling in a singly-linked chain, ordered through `child_id`.
pub trait ChainLink {
    fn id(&self) -> DbId;
    /// The next sibling, or `None` for the tail.
    fn child_id(&self) -> Option<DbId>;
    /// The container the chain belongs to (project for columns, column for tasks).
    fn scope_id(&self) -> DbId;
}

/// A broken chain invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainViolation {
    /// Every member is referenced by a sibling.
    NoHead,
    MultipleHeads(usize),
    NoTail,
    MultipleTails(usize),
    /// Two members point at the same sibling.
    SharedChild(DbId),
    /// Walking from the head came back to an already-visited member.
    Cycle(DbId),
    /// Members not reachable from the head.
    Unreachable(usize),
}

impl fmt::Display for ChainViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainViolation::NoHead => write!(f, "chain has no head"),
            ChainViolation::MultipleHeads(n) => write!(f, "chain has {n} heads"),
            ChainViolation::NoTail => write!(f, "chain has no tail"),
            ChainViolation::MultipleTails(n) => write!(f, "chain has {n} tails"),
            ChainViolation::SharedChild(id) => write!(f, "{id} is the child of several members"),
            ChainViolation::Cycle(id) => write!(f, "chain cycles back to {id}"),
            ChainViolation::Unreachable(n) => write!(f, "{n} members are unreachable from the head"),
        }
    }
}

/// Result of ordering a container's members.
#[derive(Debug, Clone)]
pub struct OrderedChain<T> {
    pub items: Vec<T>,
    /// Set when the snapshot was malformed and `items` is a best-effort order.
    pub violation: Option<ChainViolation>,
}

impl<T> OrderedChain<T> {
    pub fn is_degraded(&self) -> bool {
        self.violation.is_some()
    }
}

/// Order a container's members head to tail.
///
/// A snapshot without a head is returned in its original order. With several
/// heads the first one (in snapshot order) is walked. The walk stops at the
/// first revisited member, and any member it did not reach is appended in
/// snapshot order, so a malformed chain never loses rows and never loops.
pub fn order_chain<T: ChainLink>(items: Vec<T>) -> OrderedChain<T> {
    if items.is_empty() {
        return OrderedChain {
            items,
            violation: None,
        };
    }

    let children: HashSet<DbId> = items.iter().filter_map(ChainLink::child_id).collect();
    let heads: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| !children.contains(&item.id()))
        .map(|(idx, _)| idx)
        .collect();

    let Some(&head) = heads.first() else {
        return OrderedChain {
            items,
            violation: Some(ChainViolation::NoHead),
        };
    };
    let mut violation = (heads.len() > 1).then(|| ChainViolation::MultipleHeads(heads.len()));

    let position: HashMap<DbId, usize> = items
        .iter()
        .enumerate()
        .map(|(idx, item)| (item.id(), idx))
        .collect();

    let mut walk = Vec::with_capacity(items.len());
    let mut visited = vec![false; items.len()];
    let mut cursor = Some(head);
    while let Some(idx) = cursor {
        if visited[idx] {
            violation.get_or_insert(ChainViolation::Cycle(items[idx].id()));
            break;
        }
        visited[idx] = true;
        walk.push(idx);
        cursor = items[idx]
            .child_id()
            .and_then(|child| position.get(&child).copied());
    }

    let unreachable = visited.iter().filter(|seen| !**seen).count();
    if unreachable > 0 {
        violation.get_or_insert(ChainViolation::Unreachable(unreachable));
        walk.extend((0..items.len()).filter(|idx| !visited[*idx]));
    }

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let items = walk
        .into_iter()
        .filter_map(|idx| slots[idx].take())
        .collect();

    OrderedChain { items, violation }
}

/// Check every chain invariant on a container snapshot.
pub fn verify_chain<T: ChainLink>(items: &[T]) -> Result<(), ChainViolation> {
    if items.is_empty() {
        return Ok(());
    }

    let mut children = HashSet::new();
    for child in items.iter().filter_map(ChainLink::child_id) {
        if !children.insert(child) {
            return Err(ChainViolation::SharedChild(child));
        }
    }

    match items.iter().filter(|item| item.child_id().is_none()).count() {
        0 => return Err(ChainViolation::NoTail),
        1 => {}
        n => return Err(ChainViolation::MultipleTails(n)),
    }

    match items.iter().filter(|item| !children.contains(&item.id())).count() {
        0 => return Err(ChainViolation::NoHead),
        1 => {}
        n => return Err(ChainViolation::MultipleHeads(n)),
    }

    let position: HashMap<DbId, usize> = items
        .iter()
        .enumerate()
        .map(|(idx, item)| (item.id(), idx))
        .collect();
    let head = items
        .iter()
        .position(|item| !children.contains(&item.id()))
        .ok_or(ChainViolation::NoHead)?;

    let mut seen = 0;
    let mut cursor = Some(head);
    while let Some(idx) = cursor {
        seen += 1;
        if seen > items.len() {
            return Err(ChainViolation::Cycle(items[idx].id()));
        }
        cursor = items[idx]
            .child_id()
            .and_then(|child| position.get(&child).copied());
    }

    if seen < items.len() {
        return Err(ChainViolation::Unreachable(items.len() - seen));
    }
    Ok(())
}
