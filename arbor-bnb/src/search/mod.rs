//! Branch-and-bound search tree management.

mod arena;
mod branching;
mod node;
mod queue;
mod termination;
mod tree;

pub use arena::NodeArena;
pub use branching::{BranchDecision, BranchingStrategy, FirstFractional, MostFractional, Pseudocost};
pub use node::{BoundChange, NodeId, NodeStatus, PruneReason, SearchNode};
pub use queue::{Frontier, NodeComparator, NodeKey};
pub use termination::{TerminationController, TerminationReason};
pub use tree::{solve_mip, BranchAndBound};
