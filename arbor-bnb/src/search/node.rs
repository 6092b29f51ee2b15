//! Search node representation.

use std::fmt;

use crate::relax::RelaxationResult;

/// Identifier of a node in the search tree.
///
/// Ids are assigned in creation order starting from 0 for the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u64);

impl NodeId {
    /// The root node.
    pub const ROOT: NodeId = NodeId(0);
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why a node was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneReason {
    /// Relaxation infeasible.
    Infeasible,

    /// Relaxation unbounded.
    Unbounded,

    /// Bound no better than the incumbent.
    Bound,

    /// Relaxation solver failed.
    SolverError,

    /// Restrictions left some variable without any admissible value.
    EmptyDomain,
}

/// Status of a search node.
///
/// Nodes move `Pending -> Solved -> {Pruned, Branched, AcceptedIncumbent}`;
/// a pending node may also be pruned by bound before it is solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    /// Node is waiting to be processed.
    Pending,

    /// Relaxation solved, decision not made yet.
    Solved,

    /// Node was discarded.
    Pruned(PruneReason),

    /// Node was branched (children created).
    Branched,

    /// Node produced an integer-feasible solution that became the incumbent.
    AcceptedIncumbent,
}

impl NodeStatus {
    /// True once a final decision has been made.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            NodeStatus::Pruned(_) | NodeStatus::Branched | NodeStatus::AcceptedIncumbent
        )
    }
}

/// A bound change from branching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundChange {
    /// Variable index.
    pub var: usize,

    /// Previous lower bound.
    pub old_lb: f64,

    /// Previous upper bound.
    pub old_ub: f64,

    /// New lower bound.
    pub new_lb: f64,

    /// New upper bound.
    pub new_ub: f64,

    /// Relaxation value of the variable when the branch was made.
    pub value: f64,
}

impl BoundChange {
    /// Create a "down" branch: x <= floor(value).
    pub fn down_branch(var: usize, old_lb: f64, old_ub: f64, value: f64) -> Self {
        Self {
            var,
            old_lb,
            old_ub,
            new_lb: old_lb,
            new_ub: value.floor().min(old_ub),
            value,
        }
    }

    /// Create an "up" branch: x >= ceil(value).
    pub fn up_branch(var: usize, old_lb: f64, old_ub: f64, value: f64) -> Self {
        Self {
            var,
            old_lb,
            old_ub,
            new_lb: value.ceil().max(old_lb),
            new_ub: old_ub,
            value,
        }
    }

    /// Check if the bound change creates an empty domain.
    pub fn is_infeasible(&self) -> bool {
        self.new_lb > self.new_ub + 1e-9
    }

    /// True for an "up" branch (lower bound raised).
    pub fn is_up(&self) -> bool {
        self.new_lb > self.old_lb
    }

    /// Distance the branch moves the variable away from `value`.
    pub fn distance(&self) -> f64 {
        if self.is_up() {
            self.new_lb - self.value
        } else {
            self.value - self.new_ub
        }
    }
}

/// A node in the B&B search tree.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// Unique node identifier.
    pub id: NodeId,

    /// Parent node ID (None for root).
    pub parent: Option<NodeId>,

    /// Depth in the tree (0 for root).
    pub depth: usize,

    /// Bound changes from parent to this node.
    pub bound_changes: Vec<BoundChange>,

    /// Dual bound in minimization space.
    ///
    /// Inherited from the parent until the node's own relaxation is solved.
    pub dual_bound: f64,

    /// Parent's dual bound at creation time (-inf for the root).
    pub parent_bound: f64,

    /// Node processing status.
    pub status: NodeStatus,

    /// Relaxation result, set once when the node is solved.
    result: Option<RelaxationResult>,
}

impl SearchNode {
    /// Create the root node.
    pub fn root() -> Self {
        Self {
            id: NodeId::ROOT,
            parent: None,
            depth: 0,
            bound_changes: Vec::new(),
            dual_bound: f64::NEG_INFINITY,
            parent_bound: f64::NEG_INFINITY,
            status: NodeStatus::Pending,
            result: None,
        }
    }

    /// Create a child node from a bound change.
    pub fn child(&self, id: NodeId, bound_change: BoundChange) -> Self {
        Self {
            id,
            parent: Some(self.id),
            depth: self.depth + 1,
            bound_changes: vec![bound_change],
            dual_bound: self.dual_bound, // Inherit parent's bound initially
            parent_bound: self.dual_bound,
            status: NodeStatus::Pending,
            result: None,
        }
    }

    /// Relaxation result, if solved.
    pub fn result(&self) -> Option<&RelaxationResult> {
        self.result.as_ref()
    }

    /// Record the relaxation result.
    ///
    /// Returns false (and changes nothing) if the node was already solved.
    pub fn set_result(&mut self, result: RelaxationResult, normalized_obj: f64) -> bool {
        if self.result.is_some() || self.status != NodeStatus::Pending {
            return false;
        }
        if result.is_optimal() {
            // A child's region is a subset of its parent's, so its bound
            // never improves on the inherited one.
            self.dual_bound = self.dual_bound.max(normalized_obj);
        }
        self.result = Some(result);
        self.status = NodeStatus::Solved;
        true
    }

    /// Drop the stored assignment once nothing needs it anymore.
    pub fn release_assignment(&mut self) {
        if let Some(ref mut res) = self.result {
            res.x = Vec::new();
        }
    }

    /// Check if this node can be pruned by an incumbent.
    ///
    /// A node can be pruned if its dual bound >= incumbent objective - tol
    /// (both in minimization space).
    pub fn can_prune(&self, incumbent_obj: f64, tol: f64) -> bool {
        self.dual_bound >= incumbent_obj - tol
    }
}
