//! End-to-end tests on small generalized assignment problems.
//!
//! Items are assigned to knapsacks; variable `x[k * items + j]` is 1 when
//! item `j` goes to knapsack `k`. Every item is assigned exactly once and
//! each knapsack has a weight capacity.

use std::cell::Cell;
use std::sync::Arc;

use arbor_bnb::{
    solve_mip, BnbSettings, BnbStatus, BranchAndBound, IncumbentSource, MipProblem, NodeCallback,
    NodeKey, NodeSelection, NodeView, Proposal, Pseudocost, RoundingHeuristic, SimplexRelaxation,
};
use arbor_core::{ConeSpec, ProblemData, SolverSettings, VarBound, VarType};

/// Known optimum of [`reference_instance`].
const REFERENCE_OPT: f64 = 16.0;

struct Gap {
    cost: Vec<Vec<f64>>,
    weight: Vec<Vec<f64>>,
    capacity: Vec<f64>,
}

impl Gap {
    fn knapsacks(&self) -> usize {
        self.capacity.len()
    }

    fn items(&self) -> usize {
        self.cost[0].len()
    }

    fn var(&self, k: usize, j: usize) -> usize {
        k * self.items() + j
    }

    /// Rows: one equality per item, then one capacity row per knapsack.
    fn to_problem(&self) -> MipProblem {
        let (m, n) = (self.knapsacks(), self.items());
        let mut q = vec![0.0; m * n];
        let mut triplets = Vec::new();
        for k in 0..m {
            for j in 0..n {
                let v = self.var(k, j);
                q[v] = self.cost[k][j];
                triplets.push((j, v, 1.0));
                triplets.push((n + k, v, self.weight[k][j]));
            }
        }
        let mut b = vec![1.0; n];
        b.extend_from_slice(&self.capacity);

        let bounds = (0..m * n)
            .map(|var| VarBound {
                var,
                lower: Some(0.0),
                upper: Some(1.0),
            })
            .collect();
        let prob = ProblemData::from_triplets(
            q,
            &triplets,
            b,
            vec![ConeSpec::Zero { dim: n }, ConeSpec::NonNeg { dim: m }],
        )
        .with_bounds(bounds)
        .with_integrality(vec![VarType::Integer; m * n]);
        MipProblem::new(prob).unwrap()
    }

    /// Enumerate every assignment; None if none fits.
    fn brute_force(&self) -> Option<f64> {
        let (m, n) = (self.knapsacks(), self.items());
        let mut best: Option<f64> = None;
        let mut assign = vec![0usize; n];
        loop {
            let mut load = vec![0.0; m];
            let mut cost = 0.0;
            for (j, &k) in assign.iter().enumerate() {
                load[k] += self.weight[k][j];
                cost += self.cost[k][j];
            }
            if load.iter().zip(&self.capacity).all(|(l, c)| l <= c) {
                best = Some(best.map_or(cost, |b: f64| b.min(cost)));
            }

            // Next assignment in base m
            let mut pos = 0;
            while pos < n {
                assign[pos] += 1;
                if assign[pos] < m {
                    break;
                }
                assign[pos] = 0;
                pos += 1;
            }
            if pos == n {
                return best;
            }
        }
    }
}

fn reference_instance() -> Gap {
    Gap {
        cost: vec![vec![3.0, 2.0, 4.0, 2.0], vec![6.0, 5.0, 6.0, 7.0]],
        weight: vec![vec![4.0, 5.0, 3.0, 6.0], vec![4.0, 5.0, 3.0, 6.0]],
        capacity: vec![11.0, 20.0],
    }
}

fn all_candidates(mip: &MipProblem) -> Vec<usize> {
    (0..mip.num_vars()).collect()
}

fn assert_assignment(gap: &Gap, x: &[f64]) {
    for j in 0..gap.items() {
        let total: f64 = (0..gap.knapsacks()).map(|k| x[gap.var(k, j)]).sum();
        assert!((total - 1.0).abs() < 1e-6, "item {} assigned {} times", j, total);
    }
    for v in x {
        assert!(v.abs() < 1e-6 || (v - 1.0).abs() < 1e-6, "non-binary value {}", v);
    }
}

/// Counts its invocations and never proposes anything.
struct Counter<'c>(&'c Cell<usize>);

impl NodeCallback for Counter<'_> {
    fn on_node_solved(&mut self, _node: &NodeView<'_>, _c: &[usize]) -> Option<Proposal> {
        self.0.set(self.0.get() + 1);
        None
    }

    fn name(&self) -> &str {
        "counter"
    }
}

/// Proposes the all-zero assignment on every node.
struct AllZero;

impl NodeCallback for AllZero {
    fn on_node_solved(&mut self, node: &NodeView<'_>, _c: &[usize]) -> Option<Proposal> {
        Some(Proposal::new(vec![0.0; node.problem.num_vars()], 0.0))
    }

    fn name(&self) -> &str {
        "all-zero"
    }
}

#[test]
fn test_reference_optimum_by_enumeration() {
    assert_eq!(reference_instance().brute_force(), Some(REFERENCE_OPT));
}

#[test]
fn test_root_relaxation_is_fractional() {
    let gap = reference_instance();
    let mip = gap.to_problem();
    let sol = solve_mip(&mip, all_candidates(&mip), BnbSettings::default().with_node_limit(1))
        .unwrap();

    assert_eq!(sol.status, BnbStatus::NodeLimitReached);
    assert_eq!(sol.stats.nodes_processed, 1);
    assert_eq!(sol.stats.nodes_open, 2);
    // LP bound 24 - (5 + 3 + 2/3)
    assert!((sol.stats.best_bound - 46.0 / 3.0).abs() < 1e-6);
}

#[test]
fn test_reference_optimal() {
    let gap = reference_instance();
    let mip = gap.to_problem();
    let sol = solve_mip(&mip, all_candidates(&mip), BnbSettings::default()).unwrap();

    assert_eq!(sol.status, BnbStatus::Optimal);
    assert!((sol.obj_val().unwrap() - REFERENCE_OPT).abs() < 1e-9);
    assert_assignment(&gap, sol.x().unwrap());

    let inc = sol.incumbent.as_ref().unwrap();
    assert_eq!(inc.source, IncumbentSource::Relaxation);
    assert_eq!(sol.stats.nodes_open, 0);
    assert_eq!(sol.stats.solver_errors, 0);
    assert_eq!(sol.stats.gap, 0.0);
    assert!(sol.stats.nodes_branched >= 1);
}

#[test]
fn test_every_node_selection_finds_optimum() {
    let gap = reference_instance();
    let mip = gap.to_problem();
    let worst_first = |a: &NodeKey, b: &NodeKey| b.bound.total_cmp(&a.bound);

    for selection in [
        NodeSelection::BestBound,
        NodeSelection::DepthFirst,
        NodeSelection::BreadthFirst,
        NodeSelection::Custom(Arc::new(worst_first)),
    ] {
        let settings = BnbSettings::default().with_node_selection(selection.clone());
        let sol = solve_mip(&mip, all_candidates(&mip), settings).unwrap();
        assert_eq!(sol.status, BnbStatus::Optimal, "{:?}", selection);
        assert!((sol.obj_val().unwrap() - REFERENCE_OPT).abs() < 1e-9, "{:?}", selection);
    }
}

#[test]
fn test_pseudocost_and_rounding() {
    let gap = reference_instance();
    let mip = gap.to_problem();
    let relax = SimplexRelaxation::new(&mip, SolverSettings::default());
    let mut bnb = BranchAndBound::new(&mip, all_candidates(&mip), relax, BnbSettings::default())
        .unwrap()
        .with_branching(Pseudocost::new());
    bnb.add_callback(RoundingHeuristic::new());
    let sol = bnb.solve().unwrap();

    assert_eq!(sol.status, BnbStatus::Optimal);
    assert!((sol.obj_val().unwrap() - REFERENCE_OPT).abs() < 1e-9);
    assert_assignment(&gap, sol.x().unwrap());
}

#[test]
fn test_infeasible_root() {
    let gap = Gap {
        capacity: vec![2.0, 2.0],
        ..reference_instance()
    };
    assert_eq!(gap.brute_force(), None);

    let mip = gap.to_problem();
    let sol = solve_mip(&mip, all_candidates(&mip), BnbSettings::default()).unwrap();

    assert_eq!(sol.status, BnbStatus::Infeasible);
    assert!(!sol.has_solution());
    assert_eq!(sol.stats.nodes_processed, 1);
    assert_eq!(sol.stats.nodes_infeasible, 1);
}

#[test]
fn test_integer_infeasible_after_search() {
    // Total weight fits the total capacity, but knapsack 0 holds one item and
    // knapsack 1 holds two.
    let gap = Gap {
        cost: vec![vec![1.0; 4], vec![2.0; 4]],
        weight: vec![vec![4.0; 4], vec![4.0; 4]],
        capacity: vec![6.0, 10.0],
    };
    assert_eq!(gap.brute_force(), None);

    let mip = gap.to_problem();
    let sol = solve_mip(&mip, all_candidates(&mip), BnbSettings::default()).unwrap();

    assert_eq!(sol.status, BnbStatus::Infeasible);
    assert!(sol.incumbent.is_none());
    assert!(sol.stats.nodes_processed > 1);
    assert!(sol.stats.nodes_branched >= 1);
}

#[test]
fn test_all_zero_proposals_rejected() {
    let gap = reference_instance();
    let mip = gap.to_problem();

    let plain = solve_mip(&mip, all_candidates(&mip), BnbSettings::default()).unwrap();

    let relax = SimplexRelaxation::new(&mip, SolverSettings::default());
    let mut bnb =
        BranchAndBound::new(&mip, all_candidates(&mip), relax, BnbSettings::default()).unwrap();
    bnb.add_callback(AllZero);
    let sol = bnb.solve().unwrap();

    assert_eq!(sol.status, BnbStatus::Optimal);
    assert!((sol.obj_val().unwrap() - REFERENCE_OPT).abs() < 1e-9);
    assert_eq!(
        sol.incumbent.as_ref().unwrap().source,
        IncumbentSource::Relaxation
    );
    assert!(sol.stats.callback_rejections > 0);

    // Rejected proposals leave the search untouched
    assert_eq!(sol.stats.incumbent_updates, plain.stats.incumbent_updates);
    assert_eq!(sol.stats.nodes_processed, plain.stats.nodes_processed);
}

#[test]
fn test_node_limit_zero_pops_nothing() {
    let gap = reference_instance();
    let mip = gap.to_problem();
    let calls = Cell::new(0);

    let relax = SimplexRelaxation::new(&mip, SolverSettings::default());
    let mut bnb = BranchAndBound::new(
        &mip,
        all_candidates(&mip),
        relax,
        BnbSettings::default().with_node_limit(0),
    )
    .unwrap();
    bnb.add_callback(Counter(&calls));
    let sol = bnb.solve().unwrap();

    assert_eq!(sol.status, BnbStatus::NodeLimitReached);
    assert_eq!(sol.stats.nodes_processed, 0);
    assert_eq!(sol.stats.nodes_open, 1);
    assert!(!sol.has_solution());
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_zero_time_limit() {
    let gap = reference_instance();
    let mip = gap.to_problem();
    let settings = BnbSettings::default().with_time_limit(0.0);
    let sol = solve_mip(&mip, all_candidates(&mip), settings).unwrap();

    assert_eq!(sol.status, BnbStatus::TimeLimitReached);
    assert_eq!(sol.stats.nodes_processed, 0);
    assert!(!sol.has_solution());
}

#[test]
fn test_callbacks_see_every_solved_node() {
    let gap = reference_instance();
    let mip = gap.to_problem();
    let calls = Cell::new(0);

    let relax = SimplexRelaxation::new(&mip, SolverSettings::default());
    let mut bnb =
        BranchAndBound::new(&mip, all_candidates(&mip), relax, BnbSettings::default()).unwrap();
    bnb.add_callback(Counter(&calls));
    let sol = bnb.solve().unwrap();

    assert!(calls.get() >= 1);
    assert!(calls.get() as u64 <= sol.stats.nodes_processed);
}

#[test]
fn test_search_is_reproducible() {
    let gap = reference_instance();
    let mip = gap.to_problem();

    for selection in [NodeSelection::BestBound, NodeSelection::DepthFirst] {
        let run = || {
            let settings = BnbSettings::default().with_node_selection(selection.clone());
            solve_mip(&mip, all_candidates(&mip), settings).unwrap()
        };
        let (a, b) = (run(), run());

        assert_eq!(a.status, b.status);
        assert_eq!(
            a.obj_val().unwrap().to_bits(),
            b.obj_val().unwrap().to_bits()
        );
        assert_eq!(a.x(), b.x());
        assert_eq!(a.stats.nodes_processed, b.stats.nodes_processed);
        assert_eq!(a.stats.nodes_created, b.stats.nodes_created);
    }
}

#[test]
fn test_candidate_subset_leaves_others_fractional() {
    // Branch only on knapsack 0; knapsack 1 follows from the equalities.
    let gap = reference_instance();
    let mip = gap.to_problem();
    let candidates: Vec<usize> = (0..gap.items()).map(|j| gap.var(0, j)).collect();
    let sol = solve_mip(&mip, candidates, BnbSettings::default()).unwrap();

    assert_eq!(sol.status, BnbStatus::Optimal);
    assert!((sol.obj_val().unwrap() - REFERENCE_OPT).abs() < 1e-9);
    assert_assignment(&gap, sol.x().unwrap());
}
