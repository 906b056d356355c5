use log::{debug, info};

use super::{Snapshot, Solution, Solver};
use crate::error::{MdpError, MdpResult};
use crate::report::Reporter;
use crate::transition::Action;

impl Solver<'_> {
    /// Value iteration: Bellman-update sweeps until the largest per-state
    /// change falls below `ε(1-γ)/γ`
    ///
    /// Each sweep reads the previous sweep's utilities and writes a fresh
    /// table, so the result never depends on the order states are visited.
    /// The threshold is the contraction-mapping bound: stopping there leaves
    /// every utility within ε of the optimum. The reporter sees a snapshot
    /// after every sweep.
    pub fn value_iteration<R: Reporter>(&self, reporter: &mut R) -> MdpResult<Solution> {
        let gamma = self.config.discount;
        let threshold = self.config.error_bound * (1.0 - gamma) / gamma;

        let mut utilities = vec![0.0; self.grid.size()];
        let mut policy = vec![Action::Up; self.grid.size()];

        for sweep in 1..=self.config.max_sweeps {
            let mut next = utilities.clone();
            let mut delta: f64 = 0.0;

            for pos in self.grid.states() {
                let i = self.grid.offset(pos);
                let (action, expected) = self.best_action(pos, &utilities);
                let updated = self.grid.reward(pos)? + gamma * expected;
                delta = delta.max((updated - utilities[i]).abs());
                next[i] = updated;
                policy[i] = action;
            }

            utilities = next;
            reporter.sweep(
                self.grid,
                &Snapshot {
                    sweep,
                    utilities: &utilities,
                    policy: &policy,
                },
            );
            debug!("value iteration sweep {sweep}: max utility change {delta:.6}");

            if delta < threshold {
                info!("value iteration converged after {sweep} sweeps");
                return Ok(Solution {
                    width: self.grid.width(),
                    utilities,
                    policy,
                    sweeps: sweep,
                });
            }
        }

        Err(MdpError::NonConvergence(self.config.max_sweeps))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{toy_grid, Trace};
    use super::*;
    use crate::grid::{Grid, Rewards};
    use crate::report::NoopReporter;
    use crate::solver::SolveConfig;

    fn config(discount: f64, error_bound: f64) -> SolveConfig {
        SolveConfig {
            discount,
            error_bound,
            ..SolveConfig::default()
        }
    }

    #[test]
    fn single_state_converges_to_closed_form() {
        // every move from the lone square resolves back onto it, so the
        // optimal utility is the geometric series r/(1-γ)
        let grid = Grid::parse("G", Rewards::default()).unwrap();
        let solver = Solver::new(&grid, config(0.9, 0.01)).unwrap();
        let solution = solver.value_iteration(&mut NoopReporter).unwrap();

        assert!(
            (solution.utility((0, 0)) - 10.0).abs() < 0.01,
            "utility {} should be within ε of 1/(1-0.9)",
            solution.utility((0, 0))
        );
        assert_eq!(solution.action((0, 0)), Action::Up, "all actions tie");
        assert!(solution.sweeps() > 1, "contraction takes multiple sweeps");
    }

    #[test]
    fn sweeps_read_the_previous_snapshot() {
        // on G- the first sweep must see all-zero utilities everywhere: the
        // neutral square lands exactly on its own reward, unpolluted by the
        // reward square's update from the same sweep
        let grid = Grid::parse("G -", Rewards::default()).unwrap();
        let solver = Solver::new(&grid, config(0.9, 0.01)).unwrap();
        let mut trace = Trace::default();
        solver.value_iteration(&mut trace).unwrap();

        assert_eq!(trace.utilities[0], vec![1.0, -0.04]);
    }

    #[test]
    fn equal_actions_resolve_to_up() {
        // a uniform grid makes every action's expected utility identical in
        // every sweep, so the recorded policy is the first variant throughout
        let grid = Grid::parse("- -\n- -\n", Rewards::default()).unwrap();
        let solver = Solver::new(&grid, config(0.5, 0.1)).unwrap();
        let solution = solver.value_iteration(&mut NoopReporter).unwrap();

        assert!(solution.policy().iter().all(|&a| a == Action::Up));
    }

    #[test]
    fn utility_changes_fall_below_threshold() {
        let grid = toy_grid();
        let solver = Solver::new(&grid, config(0.9, 0.01)).unwrap();
        let mut trace = Trace::default();
        let solution = solver.value_iteration(&mut trace).unwrap();

        assert_eq!(trace.sweeps.len() as u32, solution.sweeps());
        assert_eq!(
            trace.sweeps,
            (1..=solution.sweeps()).collect::<Vec<_>>(),
            "snapshots are emitted once per sweep, in order"
        );

        // reconstruct Δ per sweep from consecutive snapshots
        let mut previous = vec![0.0; grid.size()];
        let mut deltas = Vec::new();
        for utilities in &trace.utilities {
            let delta = utilities
                .iter()
                .zip(&previous)
                .map(|(new, old)| (new - old).abs())
                .fold(0.0f64, f64::max);
            deltas.push(delta);
            previous.clone_from(utilities);
        }

        let threshold = 0.01 * (1.0 - 0.9) / 0.9;
        assert!(deltas.iter().all(|&d| d >= 0.0));
        assert!(*deltas.last().unwrap() < threshold);
        assert!(deltas[0] > threshold, "the first sweep moves utilities");
    }

    #[test]
    fn toy_grid_routes_toward_reward() {
        let grid = toy_grid();
        let solver = Solver::new(&grid, config(0.9, 0.01)).unwrap();
        let solution = solver.value_iteration(&mut NoopReporter).unwrap();

        // neighbors of the reward square point at it
        assert_eq!(solution.action((1, 0)), Action::Left);
        assert_eq!(solution.action((0, 1)), Action::Up);
        // neighbors of the penalty square walk away from it
        assert_eq!(solution.action((2, 1)), Action::Up);
        assert_eq!(solution.action((1, 2)), Action::Left);
        // proximity to the reward is worth more than proximity to the penalty
        assert!(solution.utility((1, 0)) > solution.utility((2, 1)));
    }

    #[test]
    fn sweep_cap_is_fatal() {
        let grid = toy_grid();
        let tight = SolveConfig {
            discount: 0.9,
            error_bound: 0.01,
            max_sweeps: 2,
            ..SolveConfig::default()
        };
        let solver = Solver::new(&grid, tight).unwrap();
        let err = solver.value_iteration(&mut NoopReporter).unwrap_err();
        assert_eq!(err, MdpError::NonConvergence(2));
    }
}
