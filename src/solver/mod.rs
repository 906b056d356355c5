mod policy_iteration;
mod value_iteration;

use strum::VariantArray;

use crate::error::{MdpError, MdpResult};
use crate::grid::{Grid, Pos};
use crate::transition::{Action, TransitionModel};

/// Solve parameters shared by both algorithms
#[derive(Debug, Clone)]
pub struct SolveConfig {
    /// Discount factor γ, exclusive on both ends of `(0, 1)`
    pub discount: f64,
    /// Error bound ε for value iteration's termination threshold
    pub error_bound: f64,
    /// Evaluation sweeps per policy-iteration pass
    pub eval_rounds: u32,
    /// Hard cap on sweeps (value iteration) or passes (policy iteration)
    pub max_sweeps: u32,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            discount: 0.99,
            error_bound: 1.0,
            eval_rounds: 4,
            max_sweeps: 10_000,
        }
    }
}

impl SolveConfig {
    fn validate(&self) -> MdpResult<()> {
        // γ = 1 would zero the contraction threshold ε(1-γ)/γ
        if !(self.discount > 0.0 && self.discount < 1.0) {
            return Err(MdpError::Configuration(format!(
                "discount factor must lie in (0, 1), got {}",
                self.discount
            )));
        }
        if !(self.error_bound > 0.0) {
            return Err(MdpError::Configuration(format!(
                "error bound must be positive, got {}",
                self.error_bound
            )));
        }
        if self.eval_rounds == 0 {
            return Err(MdpError::Configuration(
                "policy evaluation needs at least one sweep per pass".into(),
            ));
        }
        if self.max_sweeps == 0 {
            return Err(MdpError::Configuration(
                "sweep cap must be at least one".into(),
            ));
        }
        Ok(())
    }
}

/// Read-only view of one sweep's results, handed to a reporter
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    /// 1-based sweep (value iteration) or pass (policy iteration) index
    pub sweep: u32,
    /// Row-major utilities; blocked squares hold 0.0
    pub utilities: &'a [f64],
    /// Row-major policy; blocked squares hold the initial [`Action::Up`]
    pub policy: &'a [Action],
}

/// Converged output of a solve
#[derive(Debug, Clone)]
pub struct Solution {
    width: usize,
    utilities: Vec<f64>,
    policy: Vec<Action>,
    sweeps: u32,
}

impl Solution {
    /// Utility of the square at `pos`
    pub fn utility(&self, (col, row): Pos) -> f64 {
        self.utilities[row * self.width + col]
    }

    /// Policy action for the square at `pos`
    pub fn action(&self, (col, row): Pos) -> Action {
        self.policy[row * self.width + col]
    }

    /// Row-major utility table
    pub fn utilities(&self) -> &[f64] {
        &self.utilities
    }

    /// Row-major policy table
    pub fn policy(&self) -> &[Action] {
        &self.policy
    }

    /// Sweeps (or passes) taken to converge
    pub fn sweeps(&self) -> u32 {
        self.sweeps
    }
}

/// Dynamic-programming solver for a gridworld MDP
///
/// Holds only the immutable grid, its transition model, and the validated
/// configuration. Each solve call owns its utility and policy tables for the
/// duration of the call, so independent solves over one grid never share
/// mutable state.
#[derive(Debug)]
pub struct Solver<'a> {
    grid: &'a Grid,
    model: TransitionModel<'a>,
    config: SolveConfig,
}

impl<'a> Solver<'a> {
    /// Wrap a grid with a validated configuration
    ///
    /// All configuration errors surface here; the solve methods themselves
    /// only fail on non-convergence.
    pub fn new(grid: &'a Grid, config: SolveConfig) -> MdpResult<Self> {
        config.validate()?;
        Ok(Self {
            grid,
            model: TransitionModel::new(grid),
            config,
        })
    }

    /// Greedy action at `pos` against a utility snapshot
    ///
    /// Scans actions in declaration order and keeps the first maximum, which
    /// is the crate-wide tie-break rule.
    fn best_action(&self, pos: Pos, utilities: &[f64]) -> (Action, f64) {
        let mut best = (Action::Up, f64::NEG_INFINITY);
        for &action in Action::VARIANTS {
            let expected = self.model.expected_utility(pos, action, utilities);
            if expected > best.1 {
                best = (action, expected);
            }
        }
        best
    }
}
