//! Node storage for the search tree.
//!
//! Nodes live in an arena keyed by [`NodeId`]; a node refers to its parent by
//! id only. Each slot counts the children that are still alive. A node that
//! is closed and has no live children is released, and the release cascades
//! up the tree, so the arena only ever holds open nodes plus the paths from
//! the root down to them.

use std::collections::HashMap;

use super::{BoundChange, NodeId, NodeStatus, SearchNode};
use crate::error::{BnbError, BnbResult};
use crate::relax::Restrictions;

struct Slot {
    node: SearchNode,
    live_children: usize,
}

/// Arena owning every live search node.
pub struct NodeArena {
    slots: HashMap<NodeId, Slot>,

    /// Next node id to hand out.
    next_id: u64,

    /// Nodes released so far.
    released: u64,
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            next_id: 0,
            released: 0,
        }
    }

    /// Insert the root node and return its id.
    pub fn create_root(&mut self) -> NodeId {
        let mut root = SearchNode::root();
        root.id = self.allocate_id();
        let id = root.id;
        self.slots.insert(
            id,
            Slot {
                node: root,
                live_children: 0,
            },
        );
        id
    }

    /// Create a child of `parent` carrying one extra bound change.
    pub fn create_child(&mut self, parent: NodeId, change: BoundChange) -> BnbResult<NodeId> {
        let id = NodeId(self.next_id);
        let slot = self
            .slots
            .get_mut(&parent)
            .ok_or_else(|| missing("create_child", parent))?;
        let child = slot.node.child(id, change);
        slot.live_children += 1;
        self.next_id += 1;
        self.slots.insert(
            id,
            Slot {
                node: child,
                live_children: 0,
            },
        );
        Ok(id)
    }

    /// Look up a live node.
    pub fn get(&self, id: NodeId) -> Option<&SearchNode> {
        self.slots.get(&id).map(|s| &s.node)
    }

    /// Look up a live node mutably.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SearchNode> {
        self.slots.get_mut(&id).map(|s| &mut s.node)
    }

    /// Look up a live node, failing if it was released.
    pub fn node(&self, id: NodeId) -> BnbResult<&SearchNode> {
        self.get(id).ok_or_else(|| missing("node", id))
    }

    /// Number of live children of `id`.
    pub fn live_children(&self, id: NodeId) -> Option<usize> {
        self.slots.get(&id).map(|s| s.live_children)
    }

    /// Accumulated restrictions from the root down to `id`.
    ///
    /// Bound changes are applied root first, so a change made closer to the
    /// node replaces one made higher up for the same variable.
    pub fn restrictions(&self, id: NodeId) -> BnbResult<Restrictions> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            let node = self.node(cur)?;
            path.push(node);
            current = node.parent;
        }

        let mut restrictions = Restrictions::new();
        for node in path.iter().rev() {
            for bc in &node.bound_changes {
                restrictions.set(bc.var, bc.new_lb, bc.new_ub);
            }
        }
        Ok(restrictions)
    }

    /// Give `id` its final status and release whatever is no longer needed.
    ///
    /// Returns the number of nodes released.
    pub fn close(&mut self, id: NodeId, status: NodeStatus) -> BnbResult<usize> {
        if !status.is_closed() {
            return Err(BnbError::Internal(format!(
                "node {} cannot be closed with status {:?}",
                id, status
            )));
        }
        let slot = self.slots.get_mut(&id).ok_or_else(|| missing("close", id))?;
        slot.node.status = status;
        if status == NodeStatus::Branched {
            slot.node.release_assignment();
        }
        Ok(self.release_from(id))
    }

    /// Release `id` and its closed ancestors while they have no live children.
    fn release_from(&mut self, id: NodeId) -> usize {
        let mut released = 0;
        let mut current = Some(id);
        while let Some(cur) = current {
            let removable = self
                .slots
                .get(&cur)
                .is_some_and(|s| s.live_children == 0 && s.node.status.is_closed());
            if !removable {
                break;
            }
            let parent = self.slots.remove(&cur).and_then(|s| s.node.parent);
            released += 1;
            if let Some(p) = parent {
                if let Some(ps) = self.slots.get_mut(&p) {
                    ps.live_children = ps.live_children.saturating_sub(1);
                }
            }
            current = parent;
        }
        self.released += released as u64;
        released
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True if no node is alive.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Total nodes ever created.
    pub fn total_created(&self) -> u64 {
        self.next_id
    }

    /// Total nodes released.
    pub fn total_released(&self) -> u64 {
        self.released
    }

    fn allocate_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }
}

fn missing(op: &str, id: NodeId) -> BnbError {
    BnbError::Internal(format!("{}: node {} is not in the arena", op, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::PruneReason;

    #[test]
    fn test_create_and_walk() {
        let mut arena = NodeArena::new();
        let root = arena.create_root();
        assert_eq!(root, NodeId(0));

        let a = arena
            .create_child(root, BoundChange::down_branch(0, 0.0, 4.0, 2.5))
            .unwrap();
        let b = arena
            .create_child(a, BoundChange::up_branch(1, 0.0, 1.0, 0.5))
            .unwrap();
        // Tighten x0 again deeper in the tree
        let c = arena
            .create_child(b, BoundChange::up_branch(0, 0.0, 2.0, 1.5))
            .unwrap();

        assert_eq!(arena.len(), 4);
        assert_eq!(arena.node(c).unwrap().depth, 3);

        let r = arena.restrictions(c).unwrap();
        assert_eq!(r.get(0), Some((2.0, 2.0)));
        assert_eq!(r.get(1), Some((1.0, 1.0)));

        let r = arena.restrictions(a).unwrap();
        assert_eq!(r.get(0), Some((0.0, 2.0)));
        assert_eq!(r.get(1), None);

        assert!(arena.restrictions(root).unwrap().is_empty());
    }

    #[test]
    fn test_release_cascades() {
        let mut arena = NodeArena::new();
        let root = arena.create_root();
        let down = arena
            .create_child(root, BoundChange::down_branch(0, 0.0, 1.0, 0.5))
            .unwrap();
        let up = arena
            .create_child(root, BoundChange::up_branch(0, 0.0, 1.0, 0.5))
            .unwrap();
        assert_eq!(arena.live_children(root), Some(2));

        // Branched root stays while children are alive
        assert_eq!(arena.close(root, NodeStatus::Branched).unwrap(), 0);
        assert!(arena.get(root).is_some());

        assert_eq!(
            arena.close(down, NodeStatus::Pruned(PruneReason::Infeasible)).unwrap(),
            1
        );
        assert_eq!(arena.live_children(root), Some(1));

        // Last child releases the root as well
        assert_eq!(arena.close(up, NodeStatus::AcceptedIncumbent).unwrap(), 2);
        assert!(arena.is_empty());
        assert_eq!(arena.total_created(), 3);
        assert_eq!(arena.total_released(), 3);
    }

    #[test]
    fn test_close_rejects_open_status() {
        let mut arena = NodeArena::new();
        let root = arena.create_root();
        assert!(arena.close(root, NodeStatus::Solved).is_err());
        assert!(arena.close(NodeId(7), NodeStatus::Branched).is_err());
    }

    #[test]
    fn test_missing_parent() {
        let mut arena = NodeArena::new();
        let err = arena.create_child(NodeId(3), BoundChange::down_branch(0, 0.0, 1.0, 0.5));
        assert!(matches!(err, Err(BnbError::Internal(_))));
    }
}
