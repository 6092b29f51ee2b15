//! Node priority queue for B&B tree exploration.

use std::cmp::Ordering;
use std::fmt;

use super::{NodeId, SearchNode};
use crate::settings::NodeSelection;

/// What the frontier knows about a pending node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeKey {
    /// Node id.
    pub id: NodeId,

    /// Dual bound in minimization space.
    pub bound: f64,

    /// Depth in the tree.
    pub depth: usize,

    /// Insertion sequence number (0 for the first push).
    pub seq: u64,
}

/// Caller-supplied exploration order.
///
/// `Ordering::Less` means `a` is explored before `b`. Pairs the comparator
/// reports as `Equal` are explored in insertion order.
pub trait NodeComparator: Send + Sync {
    /// Compare two pending nodes.
    fn compare(&self, a: &NodeKey, b: &NodeKey) -> Ordering;

    /// Name used in log messages.
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> NodeComparator for F
where
    F: Fn(&NodeKey, &NodeKey) -> Ordering + Send + Sync,
{
    fn compare(&self, a: &NodeKey, b: &NodeKey) -> Ordering {
        self(a, b)
    }
}

impl fmt::Debug for dyn NodeComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeComparator({})", self.name())
    }
}

/// Priority queue for B&B nodes.
///
/// A binary heap over [`NodeKey`]s. Every ordering ends with the insertion
/// sequence, so the order of exploration is total and reproducible.
pub struct Frontier {
    /// Node selection strategy.
    strategy: NodeSelection,

    /// Heap storage; `heap[0]` is the next node to explore.
    heap: Vec<NodeKey>,

    /// Count of nodes added.
    nodes_added: u64,

    /// Count of nodes popped.
    nodes_popped: u64,
}

impl Frontier {
    /// Create a new frontier with the given strategy.
    pub fn new(strategy: NodeSelection) -> Self {
        Self {
            strategy,
            heap: Vec::new(),
            nodes_added: 0,
            nodes_popped: 0,
        }
    }

    /// Add a node to the frontier.
    pub fn push(&mut self, node: &SearchNode) -> NodeKey {
        let key = NodeKey {
            id: node.id,
            bound: node.dual_bound,
            depth: node.depth,
            seq: self.nodes_added,
        };
        self.nodes_added += 1;
        self.heap.push(key);
        self.sift_up(self.heap.len() - 1);
        key
    }

    /// Get the next node to process.
    pub fn pop(&mut self) -> Option<NodeKey> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        let key = self.heap.pop();
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        self.nodes_popped += 1;
        key
    }

    /// Peek at the next node without removing it.
    pub fn peek(&self) -> Option<&NodeKey> {
        self.heap.first()
    }

    /// Best (lowest) dual bound in the frontier, +inf if empty.
    pub fn best_bound(&self) -> f64 {
        self.heap
            .iter()
            .map(|k| k.bound)
            .fold(f64::INFINITY, f64::min)
    }

    /// Remove nodes that cannot beat an incumbent with objective
    /// `incumbent_obj` (minimization space).
    ///
    /// Returns the removed keys in insertion order.
    pub fn prune_by_bound(&mut self, incumbent_obj: f64, tol: f64) -> Vec<NodeKey> {
        let (mut pruned, kept): (Vec<NodeKey>, Vec<NodeKey>) = self
            .heap
            .drain(..)
            .partition(|k| k.bound >= incumbent_obj - tol);
        self.heap = kept;
        self.heapify();
        pruned.sort_by_key(|k| k.seq);
        pruned
    }

    /// Check if the frontier is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Get the number of nodes in the frontier.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Get the total number of nodes added.
    pub fn total_added(&self) -> u64 {
        self.nodes_added
    }

    /// Get the total number of nodes popped.
    pub fn total_popped(&self) -> u64 {
        self.nodes_popped
    }

    /// Ordering used by the strategy; `Less` is explored first.
    fn order(&self, a: &NodeKey, b: &NodeKey) -> Ordering {
        match self.strategy {
            NodeSelection::BestBound => a
                .bound
                .total_cmp(&b.bound)
                .then(a.depth.cmp(&b.depth))
                .then(a.seq.cmp(&b.seq)),
            NodeSelection::DepthFirst => b
                .depth
                .cmp(&a.depth)
                .then(a.bound.total_cmp(&b.bound))
                .then(b.seq.cmp(&a.seq)),
            NodeSelection::BreadthFirst => a.depth.cmp(&b.depth).then(a.seq.cmp(&b.seq)),
            NodeSelection::Custom(ref cmp) => cmp.compare(a, b).then(a.seq.cmp(&b.seq)),
        }
    }

    fn before(&self, i: usize, j: usize) -> bool {
        self.order(&self.heap[i], &self.heap[j]) == Ordering::Less
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.before(i, parent) {
                break;
            }
            self.heap.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let n = self.heap.len();
        loop {
            let left = 2 * i + 1;
            let right = left + 1;
            let mut first = i;
            if left < n && self.before(left, first) {
                first = left;
            }
            if right < n && self.before(right, first) {
                first = right;
            }
            if first == i {
                break;
            }
            self.heap.swap(i, first);
            i = first;
        }
    }

    fn heapify(&mut self) {
        for i in (0..self.heap.len() / 2).rev() {
            self.sift_down(i);
        }
    }
}
