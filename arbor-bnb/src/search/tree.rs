//! Branch-and-bound tree controller.

use arbor_core::ObjectiveSense;

use super::{
    BranchingStrategy, Frontier, MostFractional, NodeArena, NodeId, NodeStatus, PruneReason,
    TerminationController,
};
use crate::callbacks::{check_proposal, CallbackRegistry, NodeCallback, NodeRecord, NodeView};
use crate::error::{BnbError, BnbResult};
use crate::model::{
    BnbSolution, BnbStatus, Incumbent, IncumbentSource, IncumbentTracker, MipProblem, SearchStats,
};
use crate::relax::{
    RelaxationResult, RelaxationSolver, RelaxationStatus, Restrictions, SimplexRelaxation,
};
use crate::settings::BnbSettings;

/// Branch-and-bound tree controller.
///
/// Owns the node arena, the frontier, the incumbent and the statistics of one
/// search. The search loop is
///
/// termination check → pop → prune against the inherited bound → solve →
/// callbacks → bound check → integrality check → accept or branch.
///
/// Objective values are compared in minimization space
/// ([`ObjectiveSense::normalize`]); everything reported back uses the
/// problem's own direction.
pub struct BranchAndBound<'a, R: RelaxationSolver> {
    /// Problem being solved.
    problem: &'a MipProblem,

    /// Variables the branching strategy may choose, in caller order.
    candidates: Vec<usize>,

    /// Relaxation solver adapter.
    relaxation: R,

    /// Branching variable selector.
    branching: Box<dyn BranchingStrategy + 'a>,

    /// Registered callbacks.
    callbacks: CallbackRegistry<'a>,

    /// Node storage.
    arena: NodeArena,

    /// Pending nodes.
    frontier: Frontier,

    /// Incumbent solution tracker.
    incumbent: IncumbentTracker,

    /// Search statistics.
    stats: SearchStats,

    /// Set once a subtree is dropped without a proof (solver error, unbounded).
    incomplete: bool,

    /// Settings.
    settings: BnbSettings,
}

impl<'a, R: RelaxationSolver> BranchAndBound<'a, R> {
    /// Create a new B&B controller.
    ///
    /// Fails with [`BnbError::InvalidConfiguration`] if the settings are
    /// invalid, a candidate is out of range or repeated, the candidate set is
    /// empty while the problem has integer variables, the relaxation solver
    /// disagrees with the problem on the number of variables, or
    /// `settings.sense` asks for the opposite direction of the problem.
    pub fn new(
        problem: &'a MipProblem,
        candidates: Vec<usize>,
        relaxation: R,
        settings: BnbSettings,
    ) -> BnbResult<Self> {
        settings.validate()?;

        let n = problem.num_vars();
        let mut seen = vec![false; n];
        for &var in &candidates {
            if var >= n {
                return Err(BnbError::InvalidConfiguration(format!(
                    "branching candidate {} out of range (problem has {} variables)",
                    var, n
                )));
            }
            if seen[var] {
                return Err(BnbError::InvalidConfiguration(format!(
                    "branching candidate {} listed twice",
                    var
                )));
            }
            seen[var] = true;
        }
        if candidates.is_empty() && problem.num_integers() > 0 {
            return Err(BnbError::InvalidConfiguration(format!(
                "empty candidate set but the problem has {} integer variables",
                problem.num_integers()
            )));
        }
        if relaxation.num_vars() != n {
            return Err(BnbError::InvalidConfiguration(format!(
                "relaxation solver '{}' has {} variables, problem has {}",
                relaxation.name(),
                relaxation.num_vars(),
                n
            )));
        }

        // The relaxation optimizes in the problem's direction; a different
        // search direction would bound against the wrong side.
        let sense = problem.sense();
        if let Some(requested) = settings.sense {
            if requested != sense {
                return Err(BnbError::InvalidConfiguration(format!(
                    "search direction {} differs from the problem's {}; use solve_mip or set the direction on the problem",
                    requested, sense
                )));
            }
        }

        Ok(Self {
            problem,
            candidates,
            relaxation,
            branching: Box::new(MostFractional),
            callbacks: CallbackRegistry::new(),
            arena: NodeArena::new(),
            frontier: Frontier::new(settings.node_selection.clone()),
            incumbent: IncumbentTracker::new(sense),
            stats: SearchStats::default(),
            incomplete: false,
            settings,
        })
    }

    /// Replace the branching strategy.
    pub fn with_branching<B: BranchingStrategy + 'a>(mut self, branching: B) -> Self {
        self.branching = Box::new(branching);
        self
    }

    /// Register a callback; callbacks run in registration order.
    pub fn add_callback<C: NodeCallback + 'a>(&mut self, callback: C) {
        self.callbacks.register(callback);
    }

    /// Optimization direction of this search.
    pub fn sense(&self) -> ObjectiveSense {
        self.incumbent.sense
    }

    /// Run the search to completion or until a limit is hit.
    ///
    /// Per-node failures are recovered locally; the only error after start
    /// is [`BnbError::EngineAborted`] once relaxation failures exceed
    /// `max_solver_errors`.
    pub fn solve(mut self) -> BnbResult<BnbSolution> {
        let termination = TerminationController::from_settings(&self.settings);

        if self.settings.verbose {
            log::info!(
                "B&B start: {} vars, {} rows, {} candidates, relaxation={}, branching={}, callbacks={}, sense={}",
                self.problem.num_vars(),
                self.problem.num_constraints(),
                self.candidates.len(),
                self.relaxation.name(),
                self.branching.name(),
                self.callbacks.len(),
                self.sense(),
            );
        }

        let root = self.arena.create_root();
        self.frontier.push(self.arena.node(root)?);
        self.stats.nodes_created = 1;

        let status = loop {
            if let Some(reason) = termination.check(self.stats.nodes_processed) {
                if self.settings.verbose {
                    log::info!("Stopping on {} after {} nodes", reason, self.stats.nodes_processed);
                }
                break reason.status();
            }
            let Some(key) = self.frontier.pop() else {
                break self.exhausted_status();
            };

            self.process_node(key.id)?;
            self.log_progress(&termination);
        };

        Ok(self.finalize(status, &termination))
    }

    /// Status when the frontier ran empty.
    fn exhausted_status(&self) -> BnbStatus {
        if self.incomplete {
            BnbStatus::Unsolved
        } else if self.incumbent.has_incumbent() {
            BnbStatus::Optimal
        } else {
            BnbStatus::Infeasible
        }
    }

    /// Process one popped node.
    fn process_node(&mut self, id: NodeId) -> BnbResult<()> {
        self.stats.nodes_processed += 1;
        let tol = self.settings.tolerance;

        let node = self.arena.node(id)?;
        self.stats.max_depth = self.stats.max_depth.max(node.depth);

        // The inherited bound may already be dominated
        if self.incumbent.has_incumbent() && node.can_prune(self.incumbent.normalized(), tol) {
            log::trace!("node {} pruned before solve (bound {:.6e})", id, node.dual_bound);
            self.stats.nodes_pruned += 1;
            return self.close(id, NodeStatus::Pruned(PruneReason::Bound));
        }

        let restrictions = self.arena.restrictions(id)?;
        if let Some(var) = restrictions.empty_domain(tol) {
            log::debug!("node {} has an empty domain for x[{}]", id, var);
            self.stats.nodes_infeasible += 1;
            return self.close(id, NodeStatus::Pruned(PruneReason::EmptyDomain));
        }

        let result = self.checked_solve(&restrictions);
        let normalized = self.sense().normalize(result.obj_val);
        let status = result.status;
        let message = result.message.clone();

        let node = self
            .arena
            .get_mut(id)
            .ok_or_else(|| BnbError::Internal(format!("node {} vanished during solve", id)))?;
        if !node.set_result(result, normalized) {
            return Err(BnbError::Internal(format!("node {} solved twice", id)));
        }
        let gain = (status == RelaxationStatus::Optimal).then(|| node.dual_bound - node.parent_bound);
        if node.parent.is_some() {
            if let Some(change) = node.bound_changes.first() {
                self.branching.on_child_solved(change, gain);
            }
        }

        self.run_callbacks(id, &restrictions)?;

        match status {
            RelaxationStatus::SolverError => {
                self.stats.solver_errors += 1;
                self.incomplete = true;
                log::warn!(
                    "relaxation failed at node {}: {}",
                    id,
                    message.as_deref().unwrap_or("unknown error")
                );
                self.close(id, NodeStatus::Pruned(PruneReason::SolverError))?;
                if let Some(max) = self.settings.max_solver_errors {
                    if self.stats.solver_errors > max {
                        return Err(BnbError::EngineAborted {
                            solver_errors: self.stats.solver_errors,
                            nodes_processed: self.stats.nodes_processed,
                            incumbent: self.incumbent.best.clone().map(Box::new),
                        });
                    }
                }
                Ok(())
            }
            RelaxationStatus::Infeasible => {
                log::trace!("node {} infeasible", id);
                self.stats.nodes_infeasible += 1;
                self.close(id, NodeStatus::Pruned(PruneReason::Infeasible))
            }
            RelaxationStatus::Unbounded => {
                log::debug!("node {} relaxation unbounded", id);
                self.stats.nodes_unbounded += 1;
                self.incomplete = true;
                self.close(id, NodeStatus::Pruned(PruneReason::Unbounded))
            }
            RelaxationStatus::Optimal => self.bound_or_branch(id),
        }
    }

    /// Solve the relaxation and turn malformed answers into solver errors.
    fn checked_solve(&mut self, restrictions: &Restrictions) -> RelaxationResult {
        let result = self.relaxation.solve(restrictions);
        if !result.is_optimal() {
            return result;
        }
        let n = self.problem.num_vars();
        if result.x.len() != n {
            return RelaxationResult::error(format!(
                "relaxation returned {} values for {} variables",
                result.x.len(),
                n
            ));
        }
        if !result.obj_val.is_finite() || result.x.iter().any(|v| !v.is_finite()) {
            return RelaxationResult::error("relaxation returned non-finite values");
        }
        result
    }

    /// Offer the solved node to every callback, in registration order.
    fn run_callbacks(&mut self, id: NodeId, restrictions: &Restrictions) -> BnbResult<()> {
        for index in 0..self.callbacks.len() {
            let proposal = {
                let node = self.arena.node(id)?;
                let Some(result) = node.result() else {
                    return Err(BnbError::Internal(format!("node {} has no result", id)));
                };
                let sense = self.incumbent.sense;
                let view = NodeView {
                    id,
                    parent: node.parent,
                    depth: node.depth,
                    parent_bound: sense.normalize(node.parent_bound),
                    result,
                    restrictions,
                    problem: self.problem,
                    sense,
                    incumbent_obj: self.incumbent.best.as_ref().map(|inc| inc.obj_val),
                };
                self.callbacks.invoke(index, &view, &self.candidates)
            };
            let Some(proposal) = proposal else {
                continue;
            };

            let name = self.callbacks.name(index).to_string();
            match check_proposal(
                self.problem,
                &self.candidates,
                &proposal,
                &self.incumbent,
                &self.settings,
            ) {
                Ok(obj_val) => {
                    self.install(Incumbent {
                        obj_val,
                        x: proposal.x,
                        source: IncumbentSource::Heuristic(name),
                        node: id,
                        found_at_node: self.stats.nodes_processed,
                    })?;
                }
                Err(violation) => {
                    self.stats.callback_rejections += 1;
                    log::warn!("rejected proposal from '{}' at node {}: {}", name, id, violation);
                }
            }
        }
        Ok(())
    }

    /// Decide an optimally solved node: prune, accept or branch.
    fn bound_or_branch(&mut self, id: NodeId) -> BnbResult<()> {
        let tol = self.settings.tolerance;
        let node = self.arena.node(id)?;

        if self.incumbent.has_incumbent() && node.can_prune(self.incumbent.normalized(), tol) {
            log::trace!("node {} pruned by bound {:.6e}", id, node.dual_bound);
            self.stats.nodes_pruned += 1;
            return self.close(id, NodeStatus::Pruned(PruneReason::Bound));
        }

        let Some(result) = node.result() else {
            return Err(BnbError::Internal(format!("node {} has no result", id)));
        };
        let fractional =
            self.problem
                .fractional_candidates(&result.x, &self.candidates, self.settings.int_feas_tol);

        if fractional.is_empty() {
            let candidate = Incumbent {
                obj_val: result.obj_val,
                x: result.x.clone(),
                source: IncumbentSource::Relaxation,
                node: id,
                found_at_node: self.stats.nodes_processed,
            };
            return if self.install(candidate)? {
                self.close(id, NodeStatus::AcceptedIncumbent)
            } else {
                self.stats.nodes_pruned += 1;
                self.close(id, NodeStatus::Pruned(PruneReason::Bound))
            };
        }

        let mut lb = self.problem.var_lb.clone();
        let mut ub = self.problem.var_ub.clone();
        self.arena.restrictions(id)?.apply_to(&mut lb, &mut ub);

        let decision = self
            .branching
            .select(
                &result.x,
                &self.candidates,
                self.problem,
                (&lb, &ub),
                self.settings.int_feas_tol,
            )
            .ok_or_else(|| {
                BnbError::Internal(format!(
                    "branching strategy '{}' found nothing to branch on at node {} ({} fractional candidates)",
                    self.branching.name(),
                    id,
                    fractional.len()
                ))
            })?;
        if !self.candidates.contains(&decision.var) {
            return Err(BnbError::Internal(format!(
                "branching strategy '{}' chose x[{}], which is not a candidate",
                self.branching.name(),
                decision.var
            )));
        }

        let mut created = 0;
        for change in decision.children() {
            let child = self.arena.create_child(id, change)?;
            self.frontier.push(self.arena.node(child)?);
            created += 1;
        }
        self.stats.nodes_created += created;

        if created == 0 {
            log::debug!("node {}: both children of x[{}] are empty", id, decision.var);
            self.stats.nodes_infeasible += 1;
            return self.close(id, NodeStatus::Pruned(PruneReason::EmptyDomain));
        }

        log::trace!(
            "node {} branched on x[{}] = {:.6} (score {:.3e}), {} children",
            id,
            decision.var,
            decision.value,
            decision.score,
            created
        );
        self.stats.nodes_branched += 1;
        self.close(id, NodeStatus::Branched)
    }

    /// Install a candidate incumbent if it is strictly better.
    ///
    /// This is the only place the incumbent changes. On success the frontier
    /// is pruned against the new value.
    fn install(&mut self, candidate: Incumbent) -> BnbResult<bool> {
        let obj = candidate.obj_val;
        let source = candidate.source.clone();
        if !self.incumbent.update(candidate, self.settings.tolerance) {
            return Ok(false);
        }
        self.stats.incumbent_updates += 1;

        let pruned = self
            .frontier
            .prune_by_bound(self.incumbent.normalized(), self.settings.tolerance);
        self.stats.nodes_pruned += pruned.len() as u64;
        for key in &pruned {
            self.close(key.id, NodeStatus::Pruned(PruneReason::Bound))?;
        }

        if self.settings.verbose {
            log::info!(
                "New incumbent: obj={:.6e} ({}), pruned {} nodes",
                obj,
                source,
                pruned.len()
            );
        }
        Ok(true)
    }

    /// Close a node, report it to the callbacks and release what the arena no
    /// longer needs.
    fn close(&mut self, id: NodeId, status: NodeStatus) -> BnbResult<()> {
        let sense = self.incumbent.sense;
        let node = self.arena.node(id)?;
        let record = NodeRecord {
            id,
            parent: node.parent,
            depth: node.depth,
            parent_bound: sense.normalize(node.parent_bound),
            dual_bound: sense.normalize(node.dual_bound),
            relaxation_obj: node
                .result()
                .filter(|r| r.is_optimal())
                .map(|r| r.obj_val),
            status,
        };
        self.arena.close(id, status)?;
        self.callbacks.notify_closed(&record);
        Ok(())
    }

    /// Best bound over the open nodes and the incumbent, minimization space.
    fn global_bound(&self) -> f64 {
        self.frontier.best_bound().min(self.incumbent.normalized())
    }

    /// Log progress (if verbose).
    fn log_progress(&self, termination: &TerminationController) {
        if !self.settings.verbose {
            return;
        }

        if self.stats.nodes_processed % self.settings.log_freq != 0 {
            return;
        }

        let bound = self.sense().normalize(self.global_bound());
        log::info!(
            "Nodes: {} ({} open) | Bound: {:.6e} | Incumbent: {:.6e} | Gap: {:.2}% | Time: {:.1}s",
            self.stats.nodes_processed,
            self.frontier.len(),
            bound,
            self.incumbent.obj_val(),
            self.incumbent.gap(bound) * 100.0,
            termination.elapsed().as_secs_f64(),
        );
    }

    /// Finalize the solve and return the solution.
    fn finalize(mut self, status: BnbStatus, termination: &TerminationController) -> BnbSolution {
        let bound = positive_zero(self.sense().normalize(self.global_bound()));
        self.stats.nodes_open = self.frontier.len() as u64;
        self.stats.best_bound = bound;
        self.stats.gap = self.incumbent.gap(bound);
        self.stats.elapsed = termination.elapsed();

        if self.settings.verbose {
            log::info!(
                "B&B finished: {} | obj={:.6e} | nodes={} (created {}, pruned {}, infeasible {}) | errors={} | rejected proposals={} | {:.3}s",
                status,
                self.incumbent.obj_val(),
                self.stats.nodes_processed,
                self.stats.nodes_created,
                self.stats.nodes_pruned,
                self.stats.nodes_infeasible,
                self.stats.solver_errors,
                self.stats.callback_rejections,
                self.stats.elapsed.as_secs_f64(),
            );
        }

        let mut incumbent = self.incumbent.best;
        if let Some(inc) = incumbent.as_mut() {
            inc.obj_val = positive_zero(inc.obj_val);
        }

        BnbSolution {
            status,
            incumbent,
            stats: self.stats,
        }
    }
}

/// Map `-0.0` to `0.0`; negating a zero objective for maximization leaves
/// the sign bit set.
fn positive_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

/// Solve a MIP with the built-in simplex relaxation and default branching.
///
/// `settings.sense`, when set, overrides the direction stored on the problem
/// for both the relaxation and the search.
pub fn solve_mip(
    problem: &MipProblem,
    candidates: Vec<usize>,
    settings: BnbSettings,
) -> BnbResult<BnbSolution> {
    let redirected;
    let problem = match settings.sense {
        Some(sense) if sense != problem.sense() => {
            let mut p = problem.clone();
            p.lp.sense = sense;
            redirected = p;
            &redirected
        }
        _ => problem,
    };
    let relaxation = SimplexRelaxation::new(problem, settings.relaxation.clone());
    let solution = BranchAndBound::new(problem, candidates, relaxation, settings)?.solve();
    solution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::Proposal;
    use crate::search::FirstFractional;
    use arbor_core::{ConeSpec, ProblemData, VarType};

    // min -5x0 - 4x1  s.t. 6x0 + 4x1 <= 9, x binary.  Optimum: x = (1, 0), obj -5.
    fn knapsack() -> MipProblem {
        let prob = ProblemData::from_triplets(
            vec![-5.0, -4.0],
            &[(0, 0, 6.0), (0, 1, 4.0)],
            vec![9.0],
            vec![ConeSpec::NonNeg { dim: 1 }],
        )
        .with_integrality(vec![VarType::Binary, VarType::Binary]);
        MipProblem::new(prob).unwrap()
    }

    /// Relaxation that always fails.
    struct Broken(usize);

    impl RelaxationSolver for Broken {
        fn solve(&mut self, _r: &Restrictions) -> RelaxationResult {
            RelaxationResult::error("singular basis")
        }

        fn num_vars(&self) -> usize {
            self.0
        }
    }

    #[test]
    fn test_knapsack_optimal() {
        let mip = knapsack();
        let sol = solve_mip(&mip, vec![0, 1], BnbSettings::default()).unwrap();

        assert_eq!(sol.status, BnbStatus::Optimal);
        assert_eq!(sol.obj_val(), Some(-5.0));
        let x = sol.x().unwrap();
        assert!((x[0] - 1.0).abs() < 1e-9 && x[1].abs() < 1e-9);
        assert!(sol.stats.nodes_processed >= 3);
        assert_eq!(sol.stats.nodes_open, 0);
        assert_eq!(sol.stats.gap, 0.0);
        assert_eq!(sol.stats.best_bound, -5.0);
    }

    #[test]
    fn test_first_fractional_agrees() {
        let mip = knapsack();
        let relax = SimplexRelaxation::new(&mip, Default::default());
        let sol = BranchAndBound::new(&mip, vec![0, 1], relax, BnbSettings::default())
            .unwrap()
            .with_branching(FirstFractional)
            .solve()
            .unwrap();
        assert_eq!(sol.status, BnbStatus::Optimal);
        assert_eq!(sol.obj_val(), Some(-5.0));
    }

    #[test]
    fn test_invalid_candidates() {
        let mip = knapsack();
        let relax = || SimplexRelaxation::new(&mip, Default::default());

        for candidates in [vec![0, 2], vec![1, 1], vec![]] {
            let err = BranchAndBound::new(&mip, candidates, relax(), BnbSettings::default());
            assert!(matches!(err, Err(BnbError::InvalidConfiguration(_))));
        }

        let err = BranchAndBound::new(&mip, vec![0], Broken(3), BnbSettings::default());
        assert!(matches!(err, Err(BnbError::InvalidConfiguration(_))));

        let err = BranchAndBound::new(
            &mip,
            vec![0, 1],
            relax(),
            BnbSettings::default().with_time_limit(-1.0),
        );
        assert!(matches!(err, Err(BnbError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_solver_errors_make_search_unsolved() {
        let mip = knapsack();
        let sol = BranchAndBound::new(&mip, vec![0, 1], Broken(2), BnbSettings::default())
            .unwrap()
            .solve()
            .unwrap();
        assert_eq!(sol.status, BnbStatus::Unsolved);
        assert!(!sol.has_solution());
        assert_eq!(sol.stats.solver_errors, 1);
        assert_eq!(sol.stats.nodes_processed, 1);
    }

    #[test]
    fn test_solver_error_threshold_aborts() {
        let mip = knapsack();
        let settings = BnbSettings::default().with_max_solver_errors(0);
        let err = BranchAndBound::new(&mip, vec![0, 1], Broken(2), settings)
            .unwrap()
            .solve()
            .unwrap_err();
        match err {
            BnbError::EngineAborted {
                solver_errors,
                nodes_processed,
                incumbent,
            } => {
                assert_eq!(solver_errors, 1);
                assert_eq!(nodes_processed, 1);
                assert!(incumbent.is_none());
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_heuristic_incumbent_recorded() {
        struct Propose;

        impl NodeCallback for Propose {
            fn on_node_solved(&mut self, node: &NodeView<'_>, _c: &[usize]) -> Option<Proposal> {
                (node.id == NodeId::ROOT).then(|| Proposal::new(vec![0.0, 1.0], -4.0))
            }

            fn name(&self) -> &str {
                "propose"
            }
        }

        let mip = knapsack();
        let relax = SimplexRelaxation::new(&mip, Default::default());
        let mut bnb = BranchAndBound::new(&mip, vec![0, 1], relax, BnbSettings::default()).unwrap();
        bnb.add_callback(Propose);
        let sol = bnb.solve().unwrap();

        assert_eq!(sol.status, BnbStatus::Optimal);
        assert_eq!(sol.obj_val(), Some(-5.0));
        assert_eq!(sol.stats.incumbent_updates, 2);
        assert_eq!(sol.stats.callback_rejections, 0);
    }

    #[test]
    fn test_sense_override() {
        // Same data read as a maximization: max -5x0 - 4x1 gives x = 0, obj 0
        let mip = knapsack();
        let settings = BnbSettings::default().with_sense(ObjectiveSense::Maximize);
        let sol = solve_mip(&mip, vec![0, 1], settings).unwrap();
        assert_eq!(sol.status, BnbStatus::Optimal);
        assert_eq!(sol.obj_val(), Some(0.0));
        // No negative zero leaks out of the sign flip
        assert_eq!(sol.obj_val().unwrap().to_bits(), 0.0f64.to_bits());
        assert_eq!(sol.stats.best_bound.to_bits(), 0.0f64.to_bits());
        assert!(sol.x().unwrap().iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn test_engine_rejects_opposite_direction() {
        let mip = knapsack();
        let relax = SimplexRelaxation::new(&mip, Default::default());
        let settings = BnbSettings::default().with_sense(ObjectiveSense::Maximize);
        let err = BranchAndBound::new(&mip, vec![0, 1], relax, settings);
        assert!(matches!(err, Err(BnbError::InvalidConfiguration(_))));

        // Restating the problem's own direction is fine
        let relax = SimplexRelaxation::new(&mip, Default::default());
        let settings = BnbSettings::default().with_sense(ObjectiveSense::Minimize);
        let sol = BranchAndBound::new(&mip, vec![0, 1], relax, settings)
            .unwrap()
            .solve()
            .unwrap();
        assert_eq!(sol.obj_val(), Some(-5.0));
    }

    #[test]
    fn test_redirected_problem_is_solved_in_requested_direction() {
        // max 5x0 + 4x1  s.t. 6x0 + 4x1 <= 9 fits one item; x0 is worth more
        let prob = ProblemData::from_triplets(
            vec![5.0, 4.0],
            &[(0, 0, 6.0), (0, 1, 4.0)],
            vec![9.0],
            vec![ConeSpec::NonNeg { dim: 1 }],
        )
        .with_integrality(vec![VarType::Binary, VarType::Binary]);
        let mip = MipProblem::new(prob).unwrap();

        let settings = BnbSettings::default().with_sense(ObjectiveSense::Maximize);
        let sol = solve_mip(&mip, vec![0, 1], settings).unwrap();
        assert_eq!(sol.status, BnbStatus::Optimal);
        assert!((sol.obj_val().unwrap() - 5.0).abs() < 1e-9);
        assert!(sol.stats.best_bound >= 5.0 - 1e-9);

        // The caller's problem keeps its own direction
        assert_eq!(mip.sense(), ObjectiveSense::Minimize);
    }

    #[test]
    fn test_huge_time_limit_means_no_limit() {
        let mip = knapsack();
        let sol = solve_mip(&mip, vec![0, 1], BnbSettings::default().with_time_limit(1e20)).unwrap();
        assert_eq!(sol.status, BnbStatus::Optimal);
        assert_eq!(sol.obj_val(), Some(-5.0));
    }
}
