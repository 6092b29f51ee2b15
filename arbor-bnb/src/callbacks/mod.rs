//! Node callbacks: heuristics and observers plugged into the search.
//!
//! A callback runs right after a node's relaxation is solved and before the
//! engine decides what to do with the node. It sees the node through a
//! read-only [`NodeView`] and may hand back a [`Proposal`]. The engine checks
//! every proposal (see [`check_proposal`]) and installs it through the same
//! strictly-better path as an integral relaxation solution, so a callback can
//! never touch the frontier, the arena or the incumbent directly.

mod contract;
mod rounding;

use std::fmt;

pub use contract::{check_proposal, ContractViolation};
pub use rounding::RoundingHeuristic;

use arbor_core::ObjectiveSense;

use crate::model::MipProblem;
use crate::relax::{RelaxationResult, Restrictions};
use crate::search::{NodeId, NodeStatus};

/// Read-only view of a solved node.
///
/// Objective values are in the problem's own direction.
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'v> {
    /// Node id.
    pub id: NodeId,

    /// Parent node (None for the root).
    pub parent: Option<NodeId>,

    /// Depth in the tree.
    pub depth: usize,

    /// Bound inherited from the parent.
    pub parent_bound: f64,

    /// The node's relaxation result.
    pub result: &'v RelaxationResult,

    /// Accumulated bound restrictions of the node.
    pub restrictions: &'v Restrictions,

    /// The problem being solved.
    pub problem: &'v MipProblem,

    /// Direction the search optimizes in.
    pub sense: ObjectiveSense,

    /// Objective of the current incumbent, if any.
    pub incumbent_obj: Option<f64>,
}

/// A candidate incumbent proposed by a callback.
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    /// Full assignment.
    pub x: Vec<f64>,

    /// Objective value the callback computed for `x`.
    pub obj_val: f64,
}

impl Proposal {
    /// Proposal with an explicitly reported objective.
    pub fn new(x: Vec<f64>, obj_val: f64) -> Self {
        Self { x, obj_val }
    }

    /// Proposal whose objective is computed from the problem.
    pub fn evaluated(problem: &MipProblem, x: Vec<f64>) -> Self {
        let obj_val = problem.objective(&x);
        Self { x, obj_val }
    }
}

/// Trace of a node once its final status is known.
///
/// Bounds are in the problem's own direction.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    /// Node id.
    pub id: NodeId,

    /// Parent node (None for the root).
    pub parent: Option<NodeId>,

    /// Depth in the tree.
    pub depth: usize,

    /// Bound inherited from the parent.
    pub parent_bound: f64,

    /// Final dual bound of the node.
    pub dual_bound: f64,

    /// Relaxation objective, if the relaxation was solved to optimality.
    pub relaxation_obj: Option<f64>,

    /// Final status.
    pub status: NodeStatus,
}

/// Extension point invoked by the engine.
pub trait NodeCallback {
    /// Called once per solved node, before pruning or branching.
    fn on_node_solved(&mut self, node: &NodeView<'_>, candidates: &[usize]) -> Option<Proposal>;

    /// Called when a node receives its final status.
    fn on_node_closed(&mut self, _record: &NodeRecord) {}

    /// Name used in logs and as the incumbent source.
    fn name(&self) -> &str;
}

impl fmt::Debug for dyn NodeCallback + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeCallback({})", self.name())
    }
}

/// Callbacks in registration order.
#[derive(Debug, Default)]
pub struct CallbackRegistry<'a> {
    callbacks: Vec<Box<dyn NodeCallback + 'a>>,
}

impl<'a> CallbackRegistry<'a> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    /// Append a callback.
    pub fn register<C: NodeCallback + 'a>(&mut self, callback: C) {
        self.callbacks.push(Box::new(callback));
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Name of the callback at `index`.
    pub fn name(&self, index: usize) -> &str {
        self.callbacks.get(index).map_or("", |cb| cb.name())
    }

    /// Run the callback at `index` on a solved node.
    pub fn invoke(
        &mut self,
        index: usize,
        node: &NodeView<'_>,
        candidates: &[usize],
    ) -> Option<Proposal> {
        self.callbacks
            .get_mut(index)
            .and_then(|cb| cb.on_node_solved(node, candidates))
    }

    /// Tell every callback that a node was closed.
    pub fn notify_closed(&mut self, record: &NodeRecord) {
        for cb in &mut self.callbacks {
            cb.on_node_closed(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::{ConeSpec, ProblemData, VarType};

    struct Fixed {
        x: Vec<f64>,
        calls: usize,
    }

    impl NodeCallback for Fixed {
        fn on_node_solved(&mut self, _node: &NodeView<'_>, _c: &[usize]) -> Option<Proposal> {
            self.calls += 1;
            Some(Proposal::new(self.x.clone(), 0.0))
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct Closed<'r>(&'r mut Vec<NodeId>);

    impl NodeCallback for Closed<'_> {
        fn on_node_solved(&mut self, _node: &NodeView<'_>, _c: &[usize]) -> Option<Proposal> {
            None
        }

        fn on_node_closed(&mut self, record: &NodeRecord) {
            self.0.push(record.id);
        }

        fn name(&self) -> &str {
            "closed"
        }
    }

    fn problem() -> MipProblem {
        let prob = ProblemData::from_triplets(
            vec![2.0, 3.0],
            &[(0, 0, 1.0), (0, 1, 1.0)],
            vec![1.0],
            vec![ConeSpec::NonNeg { dim: 1 }],
        )
        .with_integrality(vec![VarType::Binary, VarType::Binary]);
        MipProblem::new(prob).unwrap()
    }

    #[test]
    fn test_registry_order_and_names() {
        let mip = problem();
        let result = RelaxationResult::optimal(vec![0.5, 0.5], 2.5);
        let restrictions = Restrictions::new();
        let view = NodeView {
            id: NodeId::ROOT,
            parent: None,
            depth: 0,
            parent_bound: f64::NEG_INFINITY,
            result: &result,
            restrictions: &restrictions,
            problem: &mip,
            sense: ObjectiveSense::Minimize,
            incumbent_obj: None,
        };

        let mut closed = Vec::new();
        {
            let mut registry = CallbackRegistry::new();
            assert!(registry.is_empty());
            registry.register(Fixed {
                x: vec![1.0, 0.0],
                calls: 0,
            });
            registry.register(Closed(&mut closed));
            assert_eq!(registry.len(), 2);
            assert_eq!(registry.name(0), "fixed");
            assert_eq!(registry.name(1), "closed");
            assert_eq!(registry.name(9), "");

            let p = registry.invoke(0, &view, &[0, 1]).unwrap();
            assert_eq!(p.x, vec![1.0, 0.0]);
            assert!(registry.invoke(1, &view, &[0, 1]).is_none());
            assert!(registry.invoke(2, &view, &[0, 1]).is_none());

            registry.notify_closed(&NodeRecord {
                id: NodeId(4),
                parent: Some(NodeId(1)),
                depth: 2,
                parent_bound: 1.0,
                dual_bound: 1.5,
                relaxation_obj: Some(1.5),
                status: NodeStatus::Branched,
            });
            assert!(format!("{:?}", registry).contains("NodeCallback(fixed)"));
        }
        assert_eq!(closed, vec![NodeId(4)]);
    }

    #[test]
    fn test_evaluated_proposal() {
        let mip = problem();
        let p = Proposal::evaluated(&mip, vec![0.0, 1.0]);
        assert_eq!(p.obj_val, 3.0);
    }
}
