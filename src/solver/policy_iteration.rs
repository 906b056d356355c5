use log::{debug, info};

use super::{Snapshot, Solution, Solver};
use crate::error::{MdpError, MdpResult};
use crate::report::Reporter;
use crate::transition::Action;

impl Solver<'_> {
    /// Policy iteration: fixed-policy evaluation sweeps followed by a greedy
    /// improvement pass, repeated until the policy is stable
    ///
    /// Evaluation runs `eval_rounds` synchronous sweeps under the current
    /// policy. Improvement adopts the argmax action only where it strictly
    /// beats the current action's expected utility, so termination is
    /// structural: every adopted change improves the policy, the number of
    /// distinct policies is finite, and a pass with no change is the fixed
    /// point. No Δ threshold is involved. The reporter sees one snapshot per
    /// pass.
    pub fn policy_iteration<R: Reporter>(&self, reporter: &mut R) -> MdpResult<Solution> {
        let gamma = self.config.discount;

        let mut utilities = vec![0.0; self.grid.size()];
        let mut policy = vec![Action::Up; self.grid.size()];

        for pass in 1..=self.config.max_sweeps {
            for _ in 0..self.config.eval_rounds {
                let mut next = utilities.clone();
                for pos in self.grid.states() {
                    let i = self.grid.offset(pos);
                    let expected = self.model.expected_utility(pos, policy[i], &utilities);
                    next[i] = self.grid.reward(pos)? + gamma * expected;
                }
                utilities = next;
            }

            let mut changed = false;
            for pos in self.grid.states() {
                let i = self.grid.offset(pos);
                let (best, best_expected) = self.best_action(pos, &utilities);
                let current = self.model.expected_utility(pos, policy[i], &utilities);
                if best_expected > current {
                    policy[i] = best;
                    changed = true;
                }
            }

            reporter.sweep(
                self.grid,
                &Snapshot {
                    sweep: pass,
                    utilities: &utilities,
                    policy: &policy,
                },
            );
            debug!(
                "policy iteration pass {pass}: {}",
                if changed { "policy changed" } else { "policy stable" }
            );

            if !changed {
                info!("policy iteration converged after {pass} passes");
                return Ok(Solution {
                    width: self.grid.width(),
                    utilities,
                    policy,
                    sweeps: pass,
                });
            }
        }

        Err(MdpError::NonConvergence(self.config.max_sweeps))
    }
}
